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

//! Output sinks for displayed command lines.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Destination for displayed lines.
///
/// Sinks may be shared between connections, so each write must be atomic
/// with respect to other writers.
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Discards everything. The default sink of a connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl OutputSink for NullOutput {
    fn write_line(&self, _line: &str) {}
}

/// Writes lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}") {
            tracing::debug!("Failed to write to stdout: {}", e);
        }
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutputSink for BufferedOutput {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_output_keeps_order() {
        let output = BufferedOutput::new();
        output.write_line("first");
        output.write_line("second");
        assert_eq!(output.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_null_output_accepts_lines() {
        NullOutput.write_line("ignored");
    }
}
