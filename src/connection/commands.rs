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

use serde::{Deserialize, Serialize};

/// One command or a sequence of commands run as a single `&&` chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Commands {
    Single(String),
    Sequence(Vec<String>),
}

impl Commands {
    /// The shell command line actually sent to the host.
    pub fn command_line(&self) -> String {
        match self {
            Commands::Single(command) => command.clone(),
            Commands::Sequence(commands) => commands.join(" && "),
        }
    }
}

impl From<&str> for Commands {
    fn from(command: &str) -> Self {
        Commands::Single(command.to_string())
    }
}

impl From<String> for Commands {
    fn from(command: String) -> Self {
        Commands::Single(command)
    }
}

impl From<Vec<String>> for Commands {
    fn from(commands: Vec<String>) -> Self {
        Commands::Sequence(commands)
    }
}

impl From<&[&str]> for Commands {
    fn from(commands: &[&str]) -> Self {
        Commands::Sequence(commands.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Commands {
    fn from(commands: [&str; N]) -> Self {
        Commands::Sequence(commands.iter().map(|c| c.to_string()).collect())
    }
}
