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

//! Host string parsing.
//!
//! Accepted formats:
//! - `host`
//! - `host:port`
//! - `[ipv6]` and `[ipv6]:port`
//! - `ipv6` and `ipv6:port` (unbracketed, port only when the remainder is
//!   itself an IPv6 address)
//!
//! IPv6 hosts are normalized and kept in bracketed form.

use std::fmt;
use std::net::Ipv6Addr;

use crate::error::{Error, Result};

pub const DEFAULT_SSH_PORT: u16 = 22;

/// A host and port parsed from a raw host string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    host: String,
    port: u16,
}

impl HostAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let colons = raw.matches(':').count();

        if colons == 0 {
            return Ok(Self::new(non_empty(raw, raw)?, DEFAULT_SSH_PORT));
        }

        if colons == 1 {
            let (host, port) = raw.split_once(':').unwrap_or((raw, ""));
            return Ok(Self::new(non_empty(raw, host)?, parse_port(raw, port)?));
        }

        if let Some(rest) = raw.strip_prefix('[') {
            let Some((address, tail)) = rest.split_once(']') else {
                return Err(invalid(raw, "missing closing bracket"));
            };
            let host = bracketed(raw, address)?;
            let port = match tail {
                "" => DEFAULT_SSH_PORT,
                _ => match tail.strip_prefix(':') {
                    Some(port) => parse_port(raw, port)?,
                    None => return Err(invalid(raw, "unexpected text after closing bracket")),
                },
            };
            return Ok(Self { host, port });
        }

        if let Ok(address) = raw.parse::<Ipv6Addr>() {
            return Ok(Self::new(format!("[{address}]"), DEFAULT_SSH_PORT));
        }

        // Trailing `:port` on an unbracketed IPv6 address
        if let Some((address, port)) = raw.rsplit_once(':') {
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(address) = address.parse::<Ipv6Addr>() {
                    return Ok(Self::new(format!("[{address}]"), parse_port(raw, port)?));
                }
            }
        }

        Err(invalid(raw, "not a valid IPv6 address"))
    }

    /// The host as configured, IPv6 addresses in brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The host in the form socket resolution expects (brackets removed).
    pub fn socket_host(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn bracketed(raw: &str, address: &str) -> Result<String> {
    let address: Ipv6Addr = address
        .parse()
        .map_err(|_| invalid(raw, "not a valid IPv6 address"))?;
    Ok(format!("[{address}]"))
}

fn non_empty<'a>(raw: &str, host: &'a str) -> Result<&'a str> {
    if host.trim().is_empty() {
        return Err(invalid(raw, "missing host"));
    }
    Ok(host)
}

fn parse_port(raw: &str, port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| invalid(raw, &format!("invalid port '{port}'")))
}

fn invalid(raw: &str, reason: &str) -> Error {
    Error::InvalidHost {
        host: raw.to_string(),
        reason: reason.to_string(),
    }
}
