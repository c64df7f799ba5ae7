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

//! The transport capability set a [`Connection`](crate::connection::Connection)
//! drives.
//!
//! The production implementation is [`SshGateway`](crate::ssh::SshGateway);
//! [`mock::MockGateway`] scripts the same surface in memory.

pub mod auth;
pub mod host;
pub mod lines;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

pub use auth::{Credentials, LoginCredential};
pub use host::HostAddress;

/// Default read and connect timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Remote session operations.
///
/// Every operation except [`connected`](Gateway::connected) and
/// [`status`](Gateway::status) may touch the network. Callers are expected
/// to log in with [`connect`](Gateway::connect) first.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Log in as `username`.
    ///
    /// Returns `Ok(false)` when the server rejected the credential and `Err`
    /// when no credential is configured or the transport failed.
    async fn connect(&mut self, username: &str) -> Result<bool>;

    fn connected(&self) -> bool;

    /// Start `command` without waiting for it to finish.
    async fn run(&mut self, command: &str) -> Result<()>;

    /// Next line of output of the running command, `None` once it ended.
    async fn next_line(&mut self) -> Result<Option<String>>;

    async fn get(&mut self, remote: &str, local: &Path) -> Result<()>;

    async fn get_string(&mut self, remote: &str) -> Result<String>;

    async fn put(&mut self, local: &Path, remote: &str) -> Result<()>;

    async fn put_string(&mut self, remote: &str, contents: &str) -> Result<()>;

    async fn exists(&mut self, remote: &str) -> Result<bool>;

    /// Returns `Ok(false)` when the server refused the rename.
    async fn rename(&mut self, remote: &str, new_remote: &str) -> Result<bool>;

    /// Returns `Ok(false)` when the server refused the removal.
    async fn delete(&mut self, remote: &str) -> Result<bool>;

    /// Exit status of the last command.
    fn status(&self) -> ExitStatus;
}

/// Exit status reported for the last command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitStatus {
    Code(u32),
    /// No command ran yet, or the server never reported a status.
    #[default]
    Unavailable,
}

impl ExitStatus {
    pub fn code(&self) -> Option<u32> {
        match self {
            ExitStatus::Code(code) => Some(*code),
            ExitStatus::Unavailable => None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Code(code) => write!(f, "{code}"),
            ExitStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Timeout in whole seconds; zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeout(u64);

impl Timeout {
    pub const UNLIMITED: Timeout = Timeout(0);

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Option<Duration> {
        (self.0 > 0).then(|| Duration::from_secs(self.0))
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self(DEFAULT_TIMEOUT_SECS)
    }
}
