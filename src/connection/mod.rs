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

//! Named remote connections with tasks and line-by-line command output.

mod commands;

pub use commands::Commands;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::files::LocalFiles;
use crate::gateway::{Credentials, ExitStatus, Gateway, Timeout};
use crate::output::{NullOutput, OutputSink};
use crate::ssh::SshGateway;

/// Receives each output line together with the connection that produced it.
pub type LineCallback<'a> = dyn FnMut(&str, &Connection) + Send + 'a;

/// A named remote host.
///
/// The gateway is created up front but only logs in when the first
/// operation needs it; once connected it is never reconnected.
pub struct Connection {
    name: String,
    host: String,
    username: String,
    tasks: HashMap<String, Commands>,
    gateway: Box<dyn Gateway>,
    output: Arc<dyn OutputSink>,
}

impl Connection {
    /// A connection backed by an [`SshGateway`].
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        credentials: Credentials,
        timeout: Timeout,
    ) -> Result<Self> {
        let host = host.into();
        let gateway = SshGateway::new(&host, credentials, timeout, Arc::new(LocalFiles))?;
        Ok(Self::with_gateway(name, host, username, Box::new(gateway)))
    }

    pub fn with_gateway(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        gateway: Box<dyn Gateway>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            tasks: HashMap::new(),
            gateway,
            output: Arc::new(NullOutput),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Register a task, replacing any task of the same name.
    pub fn define(&mut self, task: impl Into<String>, commands: impl Into<Commands>) {
        self.tasks.insert(task.into(), commands.into());
    }

    pub fn has_task(&self, task: &str) -> bool {
        self.tasks.contains_key(task)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Commands)> {
        self.tasks.iter().map(|(name, commands)| (name.as_str(), commands))
    }

    /// Run a registered task. Unknown tasks do nothing.
    pub async fn task(&mut self, task: &str, callback: Option<&mut LineCallback<'_>>) -> Result<()> {
        let Some(commands) = self.tasks.get(task).cloned() else {
            tracing::debug!("Task '{}' is not defined on '{}'", task, self.name);
            return Ok(());
        };
        self.run(commands, callback).await
    }

    /// Run `commands` as one `&&` chain and hand every output line to
    /// `callback`, or to [`Connection::display_line`] when none is given.
    ///
    /// Lines are delivered in order as they arrive; returns once the
    /// command's output has ended.
    pub async fn run(
        &mut self,
        commands: impl Into<Commands>,
        callback: Option<&mut LineCallback<'_>>,
    ) -> Result<()> {
        let command = commands.into().command_line();
        self.gateway().await?.run(&command).await?;

        let mut display = Self::display_line;
        let callback: &mut LineCallback<'_> = match callback {
            Some(callback) => callback,
            None => &mut display,
        };

        while let Some(line) = self.gateway.next_line().await? {
            callback(&line, &*self);
        }
        Ok(())
    }

    pub async fn get(&mut self, remote: &str, local: &Path) -> Result<()> {
        self.gateway().await?.get(remote, local).await
    }

    pub async fn get_string(&mut self, remote: &str) -> Result<String> {
        self.gateway().await?.get_string(remote).await
    }

    pub async fn put(&mut self, local: &Path, remote: &str) -> Result<()> {
        self.gateway().await?.put(local, remote).await
    }

    pub async fn put_string(&mut self, remote: &str, contents: &str) -> Result<()> {
        self.gateway().await?.put_string(remote, contents).await
    }

    pub async fn exists(&mut self, remote: &str) -> Result<bool> {
        self.gateway().await?.exists(remote).await
    }

    pub async fn rename(&mut self, remote: &str, new_remote: &str) -> Result<bool> {
        self.gateway().await?.rename(remote, new_remote).await
    }

    pub async fn delete(&mut self, remote: &str) -> Result<bool> {
        self.gateway().await?.delete(remote).await
    }

    /// Exit status of the last command. Never connects.
    pub fn status(&self) -> ExitStatus {
        self.gateway.status()
    }

    /// The gateway, logged in.
    ///
    /// Connects first when not yet connected and fails with
    /// [`Error::ConnectFailed`] when the login is rejected.
    pub async fn gateway(&mut self) -> Result<&mut dyn Gateway> {
        if !self.gateway.connected() {
            tracing::debug!("Connecting '{}' as {}", self.name, self.username);
            if !self.gateway.connect(&self.username).await? {
                return Err(Error::ConnectFailed {
                    username: self.username.clone(),
                    host: self.host.clone(),
                });
            }
        }
        Ok(self.gateway.as_mut())
    }

    /// Write `line` to the output sink, prefixed with user, host and name.
    pub fn display(&self, line: &str) {
        self.output.write_line(&format!(
            "[{}@{}] ({}) {}",
            self.username, self.host, self.name, line
        ));
    }

    /// The default line callback of [`Connection::run`].
    pub fn display_line(line: &str, connection: &Connection) {
        connection.display(line);
    }

    pub fn set_output(&mut self, output: Arc<dyn OutputSink>) {
        self.output = output;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("tasks", &self.tasks)
            .finish()
    }
}
