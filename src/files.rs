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

//! Local file reading used to load private key material.

use std::io;
use std::path::Path;

/// Reads the full contents of a local file.
pub trait FileReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileReader`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileReader for LocalFiles {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
