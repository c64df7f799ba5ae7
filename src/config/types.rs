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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::utils::{expand_env_vars, expand_tilde, get_current_username};
use crate::connection::Commands;
use crate::error::{Error, Result};
use crate::gateway::{Credentials, Timeout};
use crate::ssh::StrictHostKeyChecking;

/// Main configuration structure.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Connection used when no name is given.
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

/// One named remote host.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// `host`, `host:port`, `[ipv6]`, `[ipv6]:port` or a bare IPv6 address.
    pub host: String,

    /// Login name; defaults to the local user.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(flatten)]
    pub credentials: Credentials,

    /// Seconds; 0 disables the timeout.
    #[serde(default)]
    pub timeout: Timeout,

    /// Application root on the remote host.
    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,

    #[serde(default)]
    pub tasks: HashMap<String, Commands>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: None,
            credentials: Credentials::default(),
            timeout: Timeout::default(),
            root: None,
            strict_host_key_checking: None,
            tasks: HashMap::new(),
        }
    }

    /// Host with environment variables expanded.
    pub fn resolved_host(&self) -> String {
        expand_env_vars(&self.host)
    }

    /// Username with environment variables expanded, or the local user.
    pub fn resolved_username(&self) -> String {
        self.username
            .as_deref()
            .map(expand_env_vars)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(get_current_username)
    }

    /// Credentials with `~` expanded in the key path and environment
    /// variables expanded in the secrets.
    pub fn resolved_credentials(&self) -> Credentials {
        let mut credentials = self.credentials.clone();
        credentials.key = credentials.key.as_deref().map(expand_tilde);
        credentials.password = credentials.password.as_deref().map(expand_env_vars);
        credentials.keyphrase = credentials.keyphrase.as_deref().map(expand_env_vars);
        credentials
    }
}

impl Config {
    /// Name of the connection used when none is given explicitly.
    ///
    /// A configuration with exactly one connection uses it as the default.
    pub fn default_connection(&self) -> Option<&str> {
        if let Some(name) = self.default.as_deref() {
            return Some(name);
        }
        match self.connections.len() {
            1 => self.connections.keys().next().map(String::as_str),
            _ => None,
        }
    }

    pub fn connection(&self, name: &str) -> Result<&ConnectionConfig> {
        self.connections
            .get(name)
            .ok_or_else(|| Error::UnknownConnection(name.to_string()))
    }

    /// Resolve an optional name into a configured connection name.
    pub fn resolve_name<'a>(&'a self, name: Option<&'a str>) -> Result<&'a str> {
        let name = match name {
            Some(name) => name,
            None => self.default_connection().ok_or(Error::NoDefaultConnection)?,
        };
        if !self.connections.contains_key(name) {
            return Err(Error::UnknownConnection(name.to_string()));
        }
        Ok(name)
    }
}
