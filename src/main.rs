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
use clap::Parser;
use owo_colors::OwoColorize;
use std::sync::Arc;

use sshgate::{
    cli::{Cli, Commands},
    commands::{
        list::list_connections,
        run::{exit_code, run_commands, run_task},
        tail::tail,
        transfer,
    },
    config::Config,
    output::ConsoleOutput,
    utils::init_logging,
    RemoteManager,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if is_configuration_error(&e) {
                eprintln!(
                    "{}",
                    "Check the connection settings in the configuration file (see --help for its location)."
                        .dimmed()
                );
            }
            std::process::exit(1);
        }
    }
}

fn is_configuration_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<sshgate::Error>())
        .any(sshgate::Error::is_configuration)
}

/// Run the selected subcommand and return the process exit code.
async fn dispatch(cli: Cli) -> Result<i32> {
    let config = Config::load_with_priority(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    if cli.command == Commands::List {
        list_connections(&config);
        return Ok(0);
    }

    let mut manager = RemoteManager::new(config, cli.strict_host_key_checking);
    manager.set_output(Arc::new(ConsoleOutput));
    let name = cli.connection.as_deref();

    let code = match &cli.command {
        Commands::Run { commands } => exit_code(run_commands(&mut manager, name, commands).await?),
        Commands::Task { task } => exit_code(run_task(&mut manager, name, task).await?),
        Commands::Tail {
            target,
            path,
            lines,
        } => {
            tail(&mut manager, target.as_deref(), path.as_deref(), *lines).await?;
            0
        }
        Commands::Get { remote, local } => {
            transfer::download(&mut manager, name, remote, local).await?;
            0
        }
        Commands::Put { local, remote } => {
            transfer::upload(&mut manager, name, local, remote).await?;
            0
        }
        Commands::Cat { remote } => {
            transfer::cat(&mut manager, name, remote).await?;
            0
        }
        Commands::Exists { remote } => i32::from(!transfer::exists(&mut manager, name, remote).await?),
        Commands::Rename { remote, new_remote } => {
            i32::from(!transfer::rename(&mut manager, name, remote, new_remote).await?)
        }
        Commands::Delete { remote } => i32::from(!transfer::delete(&mut manager, name, remote).await?),
        Commands::List => 0,
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_found_through_context() {
        let err = anyhow::Error::from(sshgate::Error::NoDefaultConnection)
            .context("Failed to open connection");
        assert!(is_configuration_error(&err));

        let err = anyhow::Error::from(sshgate::Error::NotConnected).context("Failed to run");
        assert!(!is_configuration_error(&err));

        assert!(!is_configuration_error(&anyhow::anyhow!("plain failure")));
    }
}
