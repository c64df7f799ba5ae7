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

//! In-memory [`Gateway`] with scripted output and a recorded call log.
//!
//! Clones share state, so a test can keep one handle while the
//! connection owns another:
//!
//! ```
//! use sshgate::gateway::mock::{Call, MockGateway};
//! use sshgate::Connection;
//!
//! # tokio_test_block(async {
//! let gateway = MockGateway::new().with_lines(["hello"]);
//! let mut connection =
//!     Connection::with_gateway("web", "example.com", "deploy", Box::new(gateway.clone()));
//!
//! connection.run("echo hello", None).await.unwrap();
//! assert!(gateway.calls().contains(&Call::Run("echo hello".to_string())));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ExitStatus, Gateway};
use crate::error::{Error, Result};

/// A gateway operation as seen by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Run(String),
    NextLine,
    Get(String),
    GetString(String),
    Put(String),
    PutString(String, String),
    Exists(String),
    Rename(String, String),
    Delete(String),
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<Call>,
    connected: bool,
    accept_login: bool,
    lines: VecDeque<String>,
    files: HashMap<String, String>,
    status: ExitStatus,
}

#[derive(Debug, Clone)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// A gateway that accepts any login and produces no output.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                accept_login: true,
                ..MockState::default()
            })),
        }
    }

    /// Lines returned by `next_line` after the next `run`, in order.
    pub fn with_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `connect` reports a successful login.
    pub fn with_login(self, accept: bool) -> Self {
        self.state().accept_login = accept;
        self
    }

    /// Start out already logged in.
    pub fn with_connected(self, connected: bool) -> Self {
        self.state().connected = connected;
        self
    }

    pub fn with_status(self, status: ExitStatus) -> Self {
        self.state().status = status;
        self
    }

    pub fn with_file(self, remote: impl Into<String>, contents: impl Into<String>) -> Self {
        self.state().files.insert(remote.into(), contents.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn file(&self, remote: &str) -> Option<String> {
        self.state().files.get(remote).cloned()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) -> MutexGuard<'_, MockState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn connect(&mut self, username: &str) -> Result<bool> {
        let mut state = self.record(Call::Connect(username.to_string()));
        state.connected = state.accept_login;
        Ok(state.accept_login)
    }

    fn connected(&self) -> bool {
        self.state().connected
    }

    async fn run(&mut self, command: &str) -> Result<()> {
        self.state().calls.push(Call::Run(command.to_string()));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.record(Call::NextLine).lines.pop_front())
    }

    async fn get(&mut self, remote: &str, local: &Path) -> Result<()> {
        let contents = self
            .record(Call::Get(remote.to_string()))
            .files
            .get(remote)
            .cloned()
            .ok_or_else(|| not_found(remote))?;
        tokio::fs::write(local, contents).await?;
        Ok(())
    }

    async fn get_string(&mut self, remote: &str) -> Result<String> {
        self.record(Call::GetString(remote.to_string()))
            .files
            .get(remote)
            .cloned()
            .ok_or_else(|| not_found(remote))
    }

    async fn put(&mut self, local: &Path, remote: &str) -> Result<()> {
        let contents = tokio::fs::read_to_string(local).await?;
        self.record(Call::Put(remote.to_string()))
            .files
            .insert(remote.to_string(), contents);
        Ok(())
    }

    async fn put_string(&mut self, remote: &str, contents: &str) -> Result<()> {
        self.record(Call::PutString(remote.to_string(), contents.to_string()))
            .files
            .insert(remote.to_string(), contents.to_string());
        Ok(())
    }

    async fn exists(&mut self, remote: &str) -> Result<bool> {
        Ok(self
            .record(Call::Exists(remote.to_string()))
            .files
            .contains_key(remote))
    }

    async fn rename(&mut self, remote: &str, new_remote: &str) -> Result<bool> {
        let mut state = self.record(Call::Rename(remote.to_string(), new_remote.to_string()));
        match state.files.remove(remote) {
            Some(contents) => {
                state.files.insert(new_remote.to_string(), contents);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&mut self, remote: &str) -> Result<bool> {
        Ok(self
            .record(Call::Delete(remote.to_string()))
            .files
            .remove(remote)
            .is_some())
    }

    fn status(&self) -> ExitStatus {
        self.state().status
    }
}

fn not_found(remote: &str) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no such remote file: {remote}"),
    ))
}
