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
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::Path;

use crate::manager::RemoteManager;

pub async fn download(
    manager: &mut RemoteManager,
    name: Option<&str>,
    remote: &str,
    local: &Path,
) -> Result<()> {
    let connection = manager.connection(name)?;
    connection
        .get(remote, local)
        .await
        .with_context(|| format!("Failed to download {remote} from '{}'", connection.name()))?;
    println!(
        "{} {} {} {}",
        "✓".green(),
        "Downloaded".bold(),
        remote,
        format!("→ {}", local.display()).dimmed()
    );
    Ok(())
}

pub async fn upload(
    manager: &mut RemoteManager,
    name: Option<&str>,
    local: &Path,
    remote: &str,
) -> Result<()> {
    let connection = manager.connection(name)?;
    connection
        .put(local, remote)
        .await
        .with_context(|| format!("Failed to upload {:?} to '{}'", local, connection.name()))?;
    println!(
        "{} {} {} {}",
        "✓".green(),
        "Uploaded".bold(),
        local.display(),
        format!("→ {remote}").dimmed()
    );
    Ok(())
}

/// Write a remote file's contents to stdout.
pub async fn cat(manager: &mut RemoteManager, name: Option<&str>, remote: &str) -> Result<()> {
    let connection = manager.connection(name)?;
    let contents = connection
        .get_string(remote)
        .await
        .with_context(|| format!("Failed to read {remote} on '{}'", connection.name()))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(contents.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub async fn exists(manager: &mut RemoteManager, name: Option<&str>, remote: &str) -> Result<bool> {
    let connection = manager.connection(name)?;
    let found = connection
        .exists(remote)
        .await
        .with_context(|| format!("Failed to check {remote} on '{}'", connection.name()))?;
    if found {
        println!("{} {}", "✓".green(), remote);
    } else {
        println!("{} {} {}", "✗".red(), remote, "(not found)".dimmed());
    }
    Ok(found)
}

pub async fn rename(
    manager: &mut RemoteManager,
    name: Option<&str>,
    remote: &str,
    new_remote: &str,
) -> Result<bool> {
    let connection = manager.connection(name)?;
    let renamed = connection
        .rename(remote, new_remote)
        .await
        .with_context(|| format!("Failed to rename {remote} on '{}'", connection.name()))?;
    report(renamed, "Renamed", &format!("{remote} → {new_remote}"));
    Ok(renamed)
}

pub async fn delete(manager: &mut RemoteManager, name: Option<&str>, remote: &str) -> Result<bool> {
    let connection = manager.connection(name)?;
    let deleted = connection
        .delete(remote)
        .await
        .with_context(|| format!("Failed to delete {remote} on '{}'", connection.name()))?;
    report(deleted, "Deleted", remote);
    Ok(deleted)
}

fn report(done: bool, action: &str, subject: &str) {
    if done {
        println!("{} {} {}", "✓".green(), action.bold(), subject);
    } else {
        eprintln!(
            "{} {} {} {}",
            "✗".red(),
            action.bold(),
            subject,
            "(refused by server)".dimmed()
        );
    }
}
