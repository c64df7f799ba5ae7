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

//! Credential descriptors and login credential resolution.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::files::FileReader;

/// Authentication settings of a connection, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Authenticate with the identities held by the SSH agent.
    #[serde(default)]
    pub agent: bool,
    /// Path to a private key file.
    #[serde(default)]
    pub key: Option<PathBuf>,
    /// Private key material given inline.
    #[serde(default)]
    pub keytext: Option<String>,
    /// Passphrase for an encrypted private key.
    #[serde(default)]
    pub keyphrase: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// The credential a login is attempted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCredential {
    Agent,
    PrivateKey {
        /// entire contents of the private key
        key_data: Zeroizing<String>,
        passphrase: Option<Zeroizing<String>>,
    },
    Password(Zeroizing<String>),
}

impl Credentials {
    pub fn with_agent(mut self, agent: bool) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_key(mut self, key: impl Into<PathBuf>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_keytext(mut self, keytext: impl Into<String>) -> Self {
        self.keytext = Some(keytext.into());
        self
    }

    pub fn with_keyphrase(mut self, keyphrase: impl Into<String>) -> Self {
        self.keyphrase = Some(keyphrase.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Whether a key file or inline key is configured.
    pub fn has_private_key(&self) -> bool {
        self.key_path().is_some() || self.inline_key().is_some()
    }

    /// Resolve the credential to log in with.
    ///
    /// Priority:
    /// 1. SSH agent, when the agent flag is set
    /// 2. Private key; a key file wins over inline key text
    /// 3. Password
    ///
    /// Fails with [`Error::CredentialRequired`] when none is configured, and
    /// with [`Error::KeyRead`] when the key file cannot be read.
    pub fn resolve(&self, files: &dyn FileReader) -> Result<LoginCredential> {
        if self.agent {
            tracing::debug!("Using SSH agent for authentication");
            return Ok(LoginCredential::Agent);
        }

        if self.has_private_key() {
            let key_data = match self.key_path() {
                Some(path) => {
                    tracing::debug!("Loading private key from {:?}", path);
                    files.read_to_string(path).map_err(|source| Error::KeyRead {
                        path: path.clone(),
                        source,
                    })?
                }
                None => self.inline_key().unwrap_or_default().to_string(),
            };

            let passphrase = self
                .keyphrase
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| Zeroizing::new(p.to_string()));

            return Ok(LoginCredential::PrivateKey {
                key_data: Zeroizing::new(key_data),
                passphrase,
            });
        }

        if let Some(password) = &self.password {
            tracing::debug!("Using password authentication");
            return Ok(LoginCredential::Password(Zeroizing::new(password.clone())));
        }

        Err(Error::CredentialRequired)
    }

    fn key_path(&self) -> Option<&PathBuf> {
        self.key
            .as_ref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
    }

    fn inline_key(&self) -> Option<&str> {
        self.keytext.as_deref().filter(|text| !text.trim().is_empty())
    }
}
