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

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::Config;
use super::utils::expand_tilde;
use crate::error::{Error, Result};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "sshgate.yaml";

impl Config {
    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration from a file. A missing file yields an empty
    /// configuration.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        if !expanded_path.exists() {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path)
            .await
            .map_err(|source| Error::ConfigRead {
                path: expanded_path.clone(),
                source,
            })?;

        Self::from_yaml(&content).map_err(|source| Error::ConfigParse {
            path: expanded_path,
            source,
        })
    }

    /// Load configuration with priority order:
    /// 1. Explicit --config path
    /// 2. `sshgate.yaml` in the current directory
    /// 3. User config directory (`~/.config/sshgate/config.yaml` on Linux)
    pub async fn load_with_priority(cli_config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_config_path {
            tracing::debug!("Using explicitly specified config file: {:?}", path);
            return Self::load(path).await;
        }

        for candidate in Self::standard_locations() {
            if candidate.exists() {
                tracing::debug!("Found config at {:?}", candidate);
                return Self::load(&candidate).await;
            }
        }

        tracing::debug!("No config file found, using default empty configuration");
        Ok(Self::default())
    }

    fn standard_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dirs) = ProjectDirs::from("", "", "sshgate") {
            locations.push(dirs.config_dir().join("config.yaml"));
        }
        locations
    }
}
