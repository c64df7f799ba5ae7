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

use russh::client::Handler;

use super::known_hosts::{get_default_known_hosts_path, StrictHostKeyChecking};
use crate::error::Error;

/// russh client handler verifying the server host key.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    hostname: String,
    port: u16,
    strict_mode: StrictHostKeyChecking,
}

impl ClientHandler {
    pub fn new(hostname: String, port: u16, strict_mode: StrictHostKeyChecking) -> Self {
        Self {
            hostname,
            port,
            strict_mode,
        }
    }
}

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match self.strict_mode {
            StrictHostKeyChecking::No => {
                tracing::debug!("Host key checking disabled for {}", self.hostname);
                Ok(true)
            }
            StrictHostKeyChecking::Yes => {
                russh::keys::check_known_hosts(&self.hostname, self.port, server_public_key)
                    .map_err(|_| Error::ServerCheckFailed)
            }
            StrictHostKeyChecking::AcceptNew => {
                match russh::keys::check_known_hosts(&self.hostname, self.port, server_public_key)
                {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        tracing::info!(
                            "Adding host key for {}:{} to {:?}",
                            self.hostname,
                            self.port,
                            get_default_known_hosts_path()
                        );
                        if let Err(e) = russh::keys::known_hosts::learn_known_hosts(
                            &self.hostname,
                            self.port,
                            server_public_key,
                        ) {
                            tracing::warn!("Failed to record host key: {}", e);
                        }
                        Ok(true)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Host key verification failed for {}:{}: {}",
                            self.hostname,
                            self.port,
                            e
                        );
                        Err(Error::ServerCheckFailed)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh::keys::ssh_key::public::{Ed25519PublicKey, KeyData};
    use russh::keys::PublicKey;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::TempDir;

    fn host_key(seed: u8) -> PublicKey {
        PublicKey::new(KeyData::Ed25519(Ed25519PublicKey([seed; 32])), "")
    }

    fn client(mode: StrictHostKeyChecking) -> ClientHandler {
        ClientHandler::new("web.example.com".to_string(), 2222, mode)
    }

    /// Runs `f` with `HOME` pointing at a fresh directory containing `.ssh`.
    async fn with_home<F, Fut>(f: F)
    where
        F: FnOnce(std::path::PathBuf) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(".ssh")).unwrap();
        let original_home = std::env::var("HOME").ok();
        std::env::set_var("HOME", temp_dir.path());

        f(temp_dir.path().join(".ssh").join("known_hosts")).await;

        if let Some(home) = original_home {
            std::env::set_var("HOME", home);
        } else {
            std::env::remove_var("HOME");
        }
    }

    fn read_known_hosts(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap_or_default()
    }

    #[tokio::test]
    #[serial]
    async fn test_no_accepts_any_key() {
        with_home(|path| async move {
            let mut handler = client(StrictHostKeyChecking::No);
            assert!(handler.check_server_key(&host_key(1)).await.unwrap());
            assert!(handler.check_server_key(&host_key(2)).await.unwrap());
            assert!(!path.exists());
        })
        .await;
    }

    #[tokio::test]
    #[serial]
    async fn test_yes_rejects_unknown_key() {
        with_home(|path| async move {
            let mut handler = client(StrictHostKeyChecking::Yes);
            assert!(!handler.check_server_key(&host_key(1)).await.unwrap());
            assert!(!path.exists());
        })
        .await;
    }

    #[tokio::test]
    #[serial]
    async fn test_accept_new_records_unknown_key() {
        with_home(|path| async move {
            let mut handler = client(StrictHostKeyChecking::AcceptNew);
            assert!(handler.check_server_key(&host_key(1)).await.unwrap());
            assert!(read_known_hosts(&path).contains("[web.example.com]:2222"));

            // Recorded key now passes strict checking
            let mut strict = client(StrictHostKeyChecking::Yes);
            assert!(strict.check_server_key(&host_key(1)).await.unwrap());
        })
        .await;
    }

    #[tokio::test]
    #[serial]
    async fn test_changed_key_is_rejected() {
        with_home(|_path| async move {
            let mut learner = client(StrictHostKeyChecking::AcceptNew);
            assert!(learner.check_server_key(&host_key(1)).await.unwrap());

            for mode in [StrictHostKeyChecking::AcceptNew, StrictHostKeyChecking::Yes] {
                let mut handler = client(mode);
                assert!(matches!(
                    handler.check_server_key(&host_key(2)).await.unwrap_err(),
                    Error::ServerCheckFailed
                ));
            }
        })
        .await;
    }
}
