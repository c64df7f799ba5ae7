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

use owo_colors::OwoColorize;

use crate::config::Config;

pub fn list_connections(config: &Config) {
    if config.connections.is_empty() {
        println!("{}", "No connections configured".dimmed());
        return;
    }

    let default = config.default_connection();

    println!("\n{} {}\n", "▶".cyan(), "Available connections".bold());
    for (name, connection) in &config.connections {
        let marker = if default == Some(name.as_str()) {
            format!(" {}", "(default)".green())
        } else {
            String::new()
        };
        println!(
            "  {} {}{} {}",
            "●".blue(),
            name.bold(),
            marker,
            format!("{}@{}", connection.resolved_username(), connection.host).dimmed()
        );

        let mut tasks: Vec<_> = connection.tasks.keys().collect();
        tasks.sort();
        for task in tasks {
            println!("    {} {}", "•".dimmed(), task.yellow());
        }
    }
    println!();
}
