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

//! Error types shared by the gateway, connection and configuration layers.
//!
//! # Error Categories
//!
//! - Configuration: no usable credential, unreadable key, malformed host,
//!   unknown connection name, unreadable or invalid config file
//! - Connection: transport failures and rejected logins
//! - Transfer: SFTP and local I/O failures

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No agent flag, key or password was configured.
    #[error("password / key is required")]
    CredentialRequired,

    /// The configured key file could not be read.
    #[error("failed to read key file {path:?}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("remote connection '{0}' is not defined")]
    UnknownConnection(String),

    #[error("no connection name given and no default connection is configured")]
    NoDefaultConnection,

    #[error("failed to read configuration file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Raised by the lazy connect guard when login was not accepted.
    #[error("unable to connect to remote server {username}@{host}")]
    ConnectFailed { username: String, host: String },

    /// An operation that needs an authenticated session was issued without one.
    #[error("gateway is not connected")]
    NotConnected,

    #[error("connection to {host}:{port} timed out after {seconds} seconds")]
    Timeout { host: String, port: u16, seconds: u64 },

    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("invalid private key: {0}")]
    KeyInvalid(#[from] russh::keys::Error),

    #[error("failed to connect to SSH agent; is SSH_AUTH_SOCK set?")]
    AgentConnectionFailed,

    #[error("failed to request identities from SSH agent")]
    AgentRequestIdentitiesFailed,

    #[error("SSH agent has no identities")]
    AgentNoIdentities,

    #[error("server host key verification failed")]
    ServerCheckFailed,

    #[error("sftp error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error stems from configuration rather than the network.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::CredentialRequired
                | Error::KeyRead { .. }
                | Error::InvalidHost { .. }
                | Error::UnknownConnection(_)
                | Error::NoDefaultConnection
                | Error::ConfigRead { .. }
                | Error::ConfigParse { .. }
        )
    }
}
