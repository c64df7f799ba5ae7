// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Splits channel data chunks into output lines.

use std::collections::VecDeque;

/// Accumulates raw channel data and hands out complete lines.
///
/// Chunks arrive with arbitrary boundaries; a line is released once its
/// `\n` terminator has been seen. Terminators (`\n` or `\r\n`) are stripped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
    ready: VecDeque<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        let mut start = 0;
        for (i, byte) in data.iter().enumerate() {
            if *byte == b'\n' {
                self.partial.extend_from_slice(&data[start..i]);
                let line = std::mem::take(&mut self.partial);
                self.ready.push_back(decode(line));
                start = i + 1;
            }
        }
        self.partial.extend_from_slice(&data[start..]);
    }

    /// Next complete line, if any.
    pub fn pop_line(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// Remaining lines at end of stream, including an unterminated tail.
    pub fn finish(&mut self) -> Option<String> {
        if let Some(line) = self.ready.pop_front() {
            return Some(line);
        }
        if self.partial.is_empty() {
            return None;
        }
        Some(decode(std::mem::take(&mut self.partial)))
    }

    pub fn clear(&mut self) {
        self.partial.clear();
        self.ready.clear();
    }
}

fn decode(mut line: Vec<u8>) -> String {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"first li");
        assert_eq!(buffer.pop_line(), None);

        buffer.push(b"ne\nsecond\nthi");
        assert_eq!(buffer.pop_line().as_deref(), Some("first line"));
        assert_eq!(buffer.pop_line().as_deref(), Some("second"));
        assert_eq!(buffer.pop_line(), None);

        buffer.push(b"rd\n");
        assert_eq!(buffer.pop_line().as_deref(), Some("third"));
    }

    #[test]
    fn test_crlf_is_stripped() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"windows\r\n\r\n");
        assert_eq!(buffer.pop_line().as_deref(), Some("windows"));
        assert_eq!(buffer.pop_line().as_deref(), Some(""));
    }

    #[test]
    fn test_finish_flushes_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"done\nno newline");
        assert_eq!(buffer.finish().as_deref(), Some("done"));
        assert_eq!(buffer.finish().as_deref(), Some("no newline"));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buffer = LineBuffer::new();
        buffer.push(&[0x66, 0x6f, 0xff, b'\n']);
        assert_eq!(buffer.pop_line().as_deref(), Some("fo\u{fffd}"));
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"a\nb");
        buffer.clear();
        assert_eq!(buffer.finish(), None);
    }
}
