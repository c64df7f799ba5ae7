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

use async_trait::async_trait;
use russh::client::{Config, Handle, Msg};
use russh::{Channel, ChannelMsg};
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::OpenFlags;
use std::fmt::{self, Debug};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::handler::ClientHandler;
use super::known_hosts::StrictHostKeyChecking;
use crate::error::{Error, Result};
use crate::files::FileReader;
use crate::gateway::lines::LineBuffer;
use crate::gateway::{Credentials, ExitStatus, Gateway, HostAddress, LoginCredential, Timeout};

/// An SSH transport handle and the SFTP subsystem opened on it.
struct Session {
    handle: Handle<ClientHandler>,
    authenticated: bool,
    sftp: Option<SftpSession>,
}

/// [`Gateway`] over a russh client session.
///
/// The TCP connection and SSH handshake happen on the first
/// [`connect`](Gateway::connect); later calls only retry the login.
pub struct SshGateway {
    address: HostAddress,
    credentials: Credentials,
    timeout: Timeout,
    strict_mode: StrictHostKeyChecking,
    files: Arc<dyn FileReader>,
    session: Option<Session>,
    channel: Option<Channel<Msg>>,
    lines: LineBuffer,
    status: ExitStatus,
}

impl SshGateway {
    /// Create a gateway for `host`; nothing touches the network yet.
    pub fn new(
        host: &str,
        credentials: Credentials,
        timeout: Timeout,
        files: Arc<dyn FileReader>,
    ) -> Result<Self> {
        Ok(Self {
            address: HostAddress::parse(host)?,
            credentials,
            timeout,
            strict_mode: StrictHostKeyChecking::default(),
            files,
            session: None,
            channel: None,
            lines: LineBuffer::new(),
            status: ExitStatus::Unavailable,
        })
    }

    pub fn with_host_key_checking(mut self, strict_mode: StrictHostKeyChecking) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn address(&self) -> &HostAddress {
        &self.address
    }

    /// Open the transport session unless one exists already.
    async fn init_session(&mut self) -> Result<&mut Session> {
        if self.session.is_none() {
            let handle = self.open_handle().await?;
            self.session = Some(Session {
                handle,
                authenticated: false,
                sftp: None,
            });
        }
        self.session.as_mut().ok_or(Error::NotConnected)
    }

    async fn open_handle(&self) -> Result<Handle<ClientHandler>> {
        let host = self.address.socket_host();
        let port = self.address.port();
        tracing::debug!("Connecting to {}", self.address);

        let config = Arc::new(Config::default());
        let handler = ClientHandler::new(host.to_string(), port, self.strict_mode);
        let connect = russh::client::connect(config, (host, port), handler);

        match self.timeout.as_duration() {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| Error::Timeout {
                    host: self.address.host().to_string(),
                    port,
                    seconds: self.timeout.secs(),
                })?,
            None => connect.await,
        }
    }

    fn handle(&self) -> Result<&Handle<ClientHandler>> {
        self.session
            .as_ref()
            .filter(|session| session.authenticated)
            .map(|session| &session.handle)
            .ok_or(Error::NotConnected)
    }

    async fn sftp(&mut self) -> Result<&SftpSession> {
        let session = self
            .session
            .as_mut()
            .filter(|session| session.authenticated)
            .ok_or(Error::NotConnected)?;

        if session.sftp.is_none() {
            tracing::debug!("Initializing SFTP channel");
            let channel = session.handle.channel_open_session().await?;
            channel.request_subsystem(true, "sftp").await?;
            session.sftp = Some(SftpSession::new(channel.into_stream()).await?);
        }

        session.sftp.as_ref().ok_or(Error::NotConnected)
    }

    async fn read_remote(&mut self, remote: &str) -> Result<Vec<u8>> {
        let mut file = self
            .sftp()
            .await?
            .open_with_flags(remote, OpenFlags::READ)
            .await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;
        Ok(contents)
    }

    async fn write_remote(&mut self, remote: &str, contents: &[u8]) -> Result<()> {
        let mut file = self
            .sftp()
            .await?
            .open_with_flags(
                remote,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.shutdown().await?;
        Ok(())
    }
}

impl Debug for SshGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshGateway")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("strict_mode", &self.strict_mode)
            .field("connected", &self.connected())
            .field("status", &self.status)
            .finish()
    }
}

#[async_trait]
impl Gateway for SshGateway {
    async fn connect(&mut self, username: &str) -> Result<bool> {
        let credential = self.credentials.resolve(self.files.as_ref())?;
        let session = self.init_session().await?;

        let accepted = authenticate(&mut session.handle, username, credential).await?;
        session.authenticated = accepted;
        if accepted {
            tracing::debug!("Authenticated as {}", username);
        } else {
            tracing::warn!("Login rejected for {}", username);
        }
        Ok(accepted)
    }

    fn connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.authenticated && !session.handle.is_closed())
    }

    async fn run(&mut self, command: &str) -> Result<()> {
        tracing::debug!("Executing command: {}", command);
        let channel = self.handle()?.channel_open_session().await?;
        channel.exec(true, command).await?;

        self.lines.clear();
        self.status = ExitStatus::Unavailable;
        self.channel = Some(channel);
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        let limit = self.timeout.as_duration();

        loop {
            if let Some(line) = self.lines.pop_line() {
                return Ok(Some(line));
            }

            let Some(channel) = self.channel.as_mut() else {
                return Ok(self.lines.finish());
            };

            let message = match limit {
                Some(limit) => match tokio::time::timeout(limit, channel.wait()).await {
                    Ok(message) => message,
                    Err(_) => {
                        tracing::warn!(
                            "No output from {} within {} seconds, ending read",
                            self.address,
                            self.timeout.secs()
                        );
                        None
                    }
                },
                None => channel.wait().await,
            };

            match message {
                Some(ChannelMsg::Data { data }) => self.lines.push(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.lines.push(&data),
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    self.status = ExitStatus::Code(exit_status);
                }
                // EOF may precede trailing data; only a closed channel ends the read
                Some(_) => {}
                None => self.channel = None,
            }
        }
    }

    async fn get(&mut self, remote: &str, local: &Path) -> Result<()> {
        let contents = self.read_remote(remote).await?;
        let mut local_file = tokio::fs::File::create(local).await?;
        local_file.write_all(&contents).await?;
        local_file.flush().await?;
        Ok(())
    }

    async fn get_string(&mut self, remote: &str) -> Result<String> {
        let contents = self.read_remote(remote).await?;
        Ok(String::from_utf8_lossy(&contents).into_owned())
    }

    async fn put(&mut self, local: &Path, remote: &str) -> Result<()> {
        let contents = tokio::fs::read(local).await?;
        self.write_remote(remote, &contents).await
    }

    async fn put_string(&mut self, remote: &str, contents: &str) -> Result<()> {
        self.write_remote(remote, contents.as_bytes()).await
    }

    async fn exists(&mut self, remote: &str) -> Result<bool> {
        Ok(self.sftp().await?.try_exists(remote).await?)
    }

    async fn rename(&mut self, remote: &str, new_remote: &str) -> Result<bool> {
        let result = self.sftp().await?.rename(remote, new_remote).await;
        refused_as_false(result)
    }

    async fn delete(&mut self, remote: &str) -> Result<bool> {
        let sftp = self.sftp().await?;
        let metadata = match sftp.metadata(remote).await {
            Ok(metadata) => metadata,
            Err(SftpError::Status(status)) => {
                tracing::debug!("Cannot stat {}: {:?}", remote, status);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let result = if metadata.is_dir() {
            sftp.remove_dir(remote).await
        } else {
            sftp.remove_file(remote).await
        };
        refused_as_false(result)
    }

    fn status(&self) -> ExitStatus {
        self.status
    }
}

/// Map an SFTP status reply to `Ok(false)`, keeping transport failures.
fn refused_as_false(result: std::result::Result<(), SftpError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(SftpError::Status(status)) => {
            tracing::debug!("Server refused request: {:?}", status);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Attempt a login; `Ok(false)` when the server rejects it.
async fn authenticate(
    handle: &mut Handle<ClientHandler>,
    username: &str,
    credential: LoginCredential,
) -> Result<bool> {
    match credential {
        LoginCredential::Password(password) => {
            let result = handle.authenticate_password(username, &**password).await?;
            Ok(result.success())
        }
        LoginCredential::PrivateKey {
            key_data,
            passphrase,
        } => {
            let key = russh::keys::decode_secret_key(&key_data, passphrase.as_ref().map(|p| &***p))?;
            let result = handle
                .authenticate_publickey(
                    username,
                    russh::keys::PrivateKeyWithHashAlg::new(
                        Arc::new(key),
                        handle.best_supported_rsa_hash().await?.flatten(),
                    ),
                )
                .await?;
            Ok(result.success())
        }
        LoginCredential::Agent => authenticate_with_agent(handle, username).await,
    }
}

#[cfg(not(target_os = "windows"))]
async fn authenticate_with_agent(
    handle: &mut Handle<ClientHandler>,
    username: &str,
) -> Result<bool> {
    let mut agent = russh::keys::agent::client::AgentClient::connect_env()
        .await
        .map_err(|_| Error::AgentConnectionFailed)?;

    let identities = agent
        .request_identities()
        .await
        .map_err(|_| Error::AgentRequestIdentitiesFailed)?;

    if identities.is_empty() {
        return Err(Error::AgentNoIdentities);
    }

    for identity in identities {
        let result = handle
            .authenticate_publickey_with(
                username,
                identity.clone(),
                handle.best_supported_rsa_hash().await?.flatten(),
                &mut agent,
            )
            .await;

        if let Ok(auth_result) = result {
            if auth_result.success() {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

#[cfg(target_os = "windows")]
async fn authenticate_with_agent(
    _handle: &mut Handle<ClientHandler>,
    _username: &str,
) -> Result<bool> {
    Err(Error::AgentConnectionFailed)
}
