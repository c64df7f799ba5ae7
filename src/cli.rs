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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::tail::DEFAULT_TAIL_LINES;
use crate::ssh::StrictHostKeyChecking;

#[derive(Parser, Debug)]
#[command(
    name = "sshgate",
    version,
    about = "Named SSH connections with reusable tasks and SFTP helpers",
    long_about = "sshgate runs commands and configured tasks on named remote hosts over SSH.\nCommand output is streamed line by line, prefixed with the user, host and connection name.\nFiles are transferred over SFTP. Connections are authenticated with an SSH agent,\na private key (file or inline, optionally encrypted) or a password.",
    after_help = "EXAMPLES:\n  Run a command:               sshgate -c production run \"uptime\"\n  Chain commands with &&:      sshgate run \"cd /var/www\" \"git pull\"\n  Run a configured task:       sshgate -c production task deploy\n  Follow the remote log:       sshgate tail production\n  Upload a file:               sshgate put ./.env /var/www/app/.env\n  Print a remote file:         sshgate cat /etc/hostname"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        help = "Configuration file path\nConfig loading priority:\n  1. This flag's value\n  2. Current directory (./sshgate.yaml)\n  3. User config (~/.config/sshgate/config.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Connection name from the configuration file [default: the configured default]"
    )]
    pub connection: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        help = "Host key checking mode (yes/no/accept-new), overrides the configuration\n  yes        - Strict checking against known_hosts (most secure)\n  no         - Accept all host keys (insecure, testing only)\n  accept-new - Accept new hosts, reject changed keys (default)"
    )]
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    #[command(
        about = "Run commands on a remote host",
        long_about = "Runs the given commands as one chain joined with &&, so later commands only run\nwhen earlier ones succeed. Output lines are streamed as they arrive.\n\nExit code: the exit status of the remote command (255 when unavailable)"
    )]
    Run {
        #[arg(required = true, help = "Commands to run, one per argument")]
        commands: Vec<String>,
    },

    #[command(about = "Run a task defined for the connection")]
    Task {
        #[arg(help = "Task name from the connection's tasks")]
        task: String,
    },

    #[command(
        about = "Follow the newest log file",
        long_about = "Follows the most recently modified log file.\nWithout a connection the local storage/logs directory is used; with one,\n<root>/storage/logs on the remote host."
    )]
    Tail {
        #[arg(
            value_name = "CONNECTION",
            help = "Remote connection name (local logs when omitted)"
        )]
        target: Option<String>,

        #[arg(long, help = "Log directory, overrides the derived path")]
        path: Option<String>,

        #[arg(long, default_value_t = DEFAULT_TAIL_LINES, help = "Number of lines to show")]
        lines: usize,
    },

    #[command(about = "Download a remote file")]
    Get {
        remote: String,
        local: PathBuf,
    },

    #[command(about = "Upload a local file")]
    Put {
        local: PathBuf,
        remote: String,
    },

    #[command(about = "Print a remote file to stdout")]
    Cat { remote: String },

    #[command(
        about = "Check whether a remote path exists",
        long_about = "Checks whether a remote path exists.\n\nExit codes: 0 (exists), 1 (missing)"
    )]
    Exists { remote: String },

    #[command(about = "Rename a remote file")]
    Rename { remote: String, new_remote: String },

    #[command(about = "Delete a remote file or empty directory")]
    Delete { remote: String },

    #[command(about = "List configured connections")]
    List,
}
