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

//! Follow the newest application log, locally or on a remote host.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::connection::Connection;
use crate::manager::RemoteManager;
use crate::utils::escape_shell_arg;

pub const DEFAULT_TAIL_LINES: usize = 20;

/// Log directory relative to the application root.
pub const LOG_DIR: &str = "storage/logs";

/// Where the log directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLocation {
    Local(PathBuf),
    Remote { connection: String, path: String },
}

/// Decide which directory to tail.
///
/// Without a connection the local `storage/logs` is used. For a remote
/// connection the path is `<root>/storage/logs`. An explicit path wins in
/// both cases.
pub fn resolve_log_path(
    connection: Option<&str>,
    explicit: Option<&str>,
    root: Option<&str>,
) -> Result<LogLocation> {
    let Some(connection) = connection else {
        let path = explicit.map_or_else(|| PathBuf::from(LOG_DIR), PathBuf::from);
        return Ok(LogLocation::Local(path));
    };

    let path = match (explicit, root) {
        (Some(path), _) => path.to_string(),
        (None, Some(root)) => format!("{}/{}", root.trim_end_matches('/'), LOG_DIR),
        (None, None) => bail!("Could not determine path to log file."),
    };
    Ok(LogLocation::Remote {
        connection: connection.to_string(),
        path,
    })
}

/// Shell command following the most recently modified file in `path`.
pub fn remote_tail_command(path: &str, lines: usize) -> String {
    format!(
        "cd {} && tail -f $(ls -t | head -n 1) -n {}",
        escape_shell_arg(path),
        lines
    )
}

/// The most recently modified `*.log` file in `dir`.
pub fn newest_log_file(dir: &Path) -> Result<PathBuf> {
    let pattern = dir.join("*.log");
    let pattern = pattern.to_string_lossy();

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid log path: {pattern}"))? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("Skipping unreadable log entry: {}", e);
                continue;
            }
        };
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time of {path:?}"))?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .with_context(|| format!("No log files found in {}", dir.display()))
}

pub async fn tail(
    manager: &mut RemoteManager,
    connection: Option<&str>,
    explicit: Option<&str>,
    lines: usize,
) -> Result<()> {
    let root = match connection {
        Some(name) => manager.root(name)?,
        None => None,
    };

    match resolve_log_path(connection, explicit, root)? {
        LogLocation::Local(dir) => tail_local(&dir, lines).await,
        LogLocation::Remote { connection, path } => {
            tail_remote(manager.connection(Some(&connection))?, &path, lines).await
        }
    }
}

pub async fn tail_remote(connection: &mut Connection, path: &str, lines: usize) -> Result<()> {
    let command = remote_tail_command(path, lines);
    tracing::debug!("Tailing {} on '{}'", path, connection.name());

    let mut print = |line: &str, _: &Connection| println!("{line}");
    connection
        .run(command, Some(&mut print))
        .await
        .with_context(|| format!("Failed to tail logs on '{}'", connection.name()))
}

pub async fn tail_local(dir: &Path, lines: usize) -> Result<()> {
    let file = newest_log_file(dir)?;
    tracing::debug!("Tailing local log {:?}", file);

    let mut child = Command::new("tail")
        .arg("-f")
        .arg("-n")
        .arg(lines.to_string())
        .arg(&file)
        .stdout(Stdio::piped())
        .spawn()
        .context("Failed to start tail")?;

    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout).lines();
        while let Some(line) = reader.next_line().await? {
            println!("{line}");
        }
    }

    child.wait().await.context("tail did not exit cleanly")?;
    Ok(())
}
