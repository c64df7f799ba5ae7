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

//! Registry building one [`Connection`] per configured name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Config, ConnectionConfig};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::files::{FileReader, LocalFiles};
use crate::gateway::Gateway;
use crate::output::{NullOutput, OutputSink};
use crate::ssh::{SshGateway, StrictHostKeyChecking};

/// Builds gateways for configured connections.
pub type GatewayFactory = dyn Fn(&ConnectionConfig) -> Result<Box<dyn Gateway>> + Send + Sync;

/// Named connections from a [`Config`], created on first use and cached.
pub struct RemoteManager {
    config: Config,
    connections: HashMap<String, Connection>,
    output: Arc<dyn OutputSink>,
    factory: Box<GatewayFactory>,
}

impl RemoteManager {
    /// A manager creating [`SshGateway`]s.
    ///
    /// `strict_override` replaces the host key checking mode of every
    /// connection when given.
    pub fn new(config: Config, strict_override: Option<StrictHostKeyChecking>) -> Self {
        let files: Arc<dyn FileReader> = Arc::new(LocalFiles);
        Self::with_factory(
            config,
            Box::new(move |connection: &ConnectionConfig| -> Result<Box<dyn Gateway>> {
                let strict_mode = strict_override
                    .or(connection.strict_host_key_checking)
                    .unwrap_or_default();
                let gateway = SshGateway::new(
                    &connection.resolved_host(),
                    connection.resolved_credentials(),
                    connection.timeout,
                    files.clone(),
                )?
                .with_host_key_checking(strict_mode);
                Ok(Box::new(gateway))
            }),
        )
    }

    pub fn with_factory(config: Config, factory: Box<GatewayFactory>) -> Self {
        Self {
            config,
            connections: HashMap::new(),
            output: Arc::new(NullOutput),
            factory,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn default_connection(&self) -> Option<&str> {
        self.config.default_connection()
    }

    /// Configured connection names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.config.connections.keys().map(String::as_str).collect()
    }

    /// Application root of a connection, if configured.
    pub fn root(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.config.connection(name)?.root.as_deref())
    }

    /// Output sink attached to every connection.
    pub fn set_output(&mut self, output: Arc<dyn OutputSink>) {
        for connection in self.connections.values_mut() {
            connection.set_output(output.clone());
        }
        self.output = output;
    }

    /// The connection called `name`, or the default connection.
    pub fn connection(&mut self, name: Option<&str>) -> Result<&mut Connection> {
        let name = self.config.resolve_name(name)?.to_string();

        if !self.connections.contains_key(&name) {
            let connection = self.build(&name)?;
            self.connections.insert(name.clone(), connection);
        }

        self.connections
            .get_mut(&name)
            .ok_or(Error::UnknownConnection(name))
    }

    fn build(&self, name: &str) -> Result<Connection> {
        let settings = self.config.connection(name)?;
        tracing::debug!("Creating connection '{}' to {}", name, settings.host);

        let gateway = (self.factory)(settings)?;
        let mut connection = Connection::with_gateway(
            name,
            settings.resolved_host(),
            settings.resolved_username(),
            gateway,
        );
        for (task, commands) in &settings.tasks {
            connection.define(task.clone(), commands.clone());
        }
        connection.set_output(self.output.clone());
        Ok(connection)
    }
}
