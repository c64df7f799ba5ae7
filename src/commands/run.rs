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

use anyhow::{Context, Result};

use crate::connection::Commands;
use crate::gateway::ExitStatus;
use crate::manager::RemoteManager;

/// Process exit code used when the remote status is unknown.
pub const UNAVAILABLE_EXIT_CODE: i32 = 255;

/// Run `commands` as one `&&` chain, printing lines through the
/// connection's display routine.
pub async fn run_commands(
    manager: &mut RemoteManager,
    name: Option<&str>,
    commands: &[String],
) -> Result<ExitStatus> {
    let connection = manager.connection(name)?;
    let commands = Commands::from(commands.to_vec());
    connection
        .run(commands, None)
        .await
        .with_context(|| format!("Failed to run commands on '{}'", connection.name()))?;
    Ok(connection.status())
}

/// Run a configured task. An unknown task only produces a warning.
pub async fn run_task(
    manager: &mut RemoteManager,
    name: Option<&str>,
    task: &str,
) -> Result<ExitStatus> {
    let connection = manager.connection(name)?;
    if !connection.has_task(task) {
        tracing::warn!(
            "Task '{}' is not defined for connection '{}'",
            task,
            connection.name()
        );
        return Ok(ExitStatus::Unavailable);
    }
    connection
        .task(task, None)
        .await
        .with_context(|| format!("Failed to run task '{task}' on '{}'", connection.name()))?;
    Ok(connection.status())
}

/// Map a remote exit status onto a process exit code.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => i32::try_from(code & 0xff).unwrap_or(UNAVAILABLE_EXIT_CODE),
        None => UNAVAILABLE_EXIT_CODE,
    }
}
