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

use serial_test::serial;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::types::{Config, ConnectionConfig};
use super::utils::{expand_env_vars, expand_tilde};
use crate::error::Error;
use crate::gateway::Timeout;
use crate::ssh::StrictHostKeyChecking;

#[test]
#[serial]
fn test_expand_env_vars() {
    std::env::set_var("SSHGATE_TEST_VAR", "test_value");
    std::env::set_var("SSHGATE_TEST_USER", "testuser");

    assert_eq!(
        expand_env_vars("Hello ${SSHGATE_TEST_VAR}!"),
        "Hello test_value!"
    );
    assert_eq!(expand_env_vars("$SSHGATE_TEST_USER@host"), "testuser@host");
    assert_eq!(
        expand_env_vars("${SSHGATE_TEST_USER}:$SSHGATE_TEST_VAR"),
        "testuser:test_value"
    );

    // Unset variables stay as written
    assert_eq!(
        expand_env_vars("${SSHGATE_NONEXISTENT}"),
        "${SSHGATE_NONEXISTENT}"
    );
    assert_eq!(expand_env_vars("$SSHGATE_NONEXISTENT"), "$SSHGATE_NONEXISTENT");

    assert_eq!(expand_env_vars("cost: 5$ and ${"), "cost: 5$ and ${");
    assert_eq!(expand_env_vars("no variables here"), "no variables here");
}

#[test]
#[serial]
fn test_expand_tilde() {
    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", "/home/user");

    let expanded = expand_tilde(Path::new("~/.ssh/id_rsa"));
    let untouched = expand_tilde(Path::new("/etc/ssh/key"));

    if let Some(home) = original_home {
        std::env::set_var("HOME", home);
    } else {
        std::env::remove_var("HOME");
    }

    assert_eq!(expanded, PathBuf::from("/home/user/.ssh/id_rsa"));
    assert_eq!(untouched, PathBuf::from("/etc/ssh/key"));
}

#[test]
fn test_config_parsing() {
    let yaml = r#"
default: production

connections:
  production:
    host: "203.0.113.10:2222"
    username: deploy
    key: /home/deploy/.ssh/id_rsa
    keyphrase: secret
    timeout: 30
    root: /var/www/app
    strict_host_key_checking: "no"
    tasks:
      deploy:
        - cd /var/www/app
        - git pull
      uptime: uptime

  staging:
    host: staging.example.com
    password: hunter2
"#;

    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.default_connection(), Some("production"));
    assert_eq!(config.connections.len(), 2);

    let production = config.connection("production").unwrap();
    assert_eq!(production.host, "203.0.113.10:2222");
    assert_eq!(production.username.as_deref(), Some("deploy"));
    assert_eq!(
        production.credentials.key,
        Some(PathBuf::from("/home/deploy/.ssh/id_rsa"))
    );
    assert_eq!(production.credentials.keyphrase.as_deref(), Some("secret"));
    assert_eq!(production.timeout, Timeout::from_secs(30));
    assert_eq!(production.root.as_deref(), Some("/var/www/app"));
    assert_eq!(
        production.strict_host_key_checking,
        Some(StrictHostKeyChecking::No)
    );
    assert_eq!(
        production.tasks["deploy"].command_line(),
        "cd /var/www/app && git pull"
    );
    assert_eq!(production.tasks["uptime"].command_line(), "uptime");

    let staging = config.connection("staging").unwrap();
    assert_eq!(staging.credentials.password.as_deref(), Some("hunter2"));
    assert_eq!(staging.timeout, Timeout::default());
    assert!(!staging.credentials.agent);
    assert!(staging.tasks.is_empty());
}

#[test]
fn test_default_connection_resolution() {
    let mut config = Config::default();
    assert_eq!(config.default_connection(), None);
    assert!(matches!(
        config.resolve_name(None).unwrap_err(),
        Error::NoDefaultConnection
    ));

    config
        .connections
        .insert("only".to_string(), ConnectionConfig::new("example.com"));
    assert_eq!(config.default_connection(), Some("only"));
    assert_eq!(config.resolve_name(None).unwrap(), "only");

    config
        .connections
        .insert("second".to_string(), ConnectionConfig::new("example.org"));
    assert_eq!(config.default_connection(), None);
    assert_eq!(config.resolve_name(Some("second")).unwrap(), "second");
}

#[test]
fn test_unknown_connection() {
    let config = Config::from_yaml("default: missing\n").unwrap();
    assert!(matches!(
        config.resolve_name(None).unwrap_err(),
        Error::UnknownConnection(name) if name == "missing"
    ));
    assert!(matches!(
        config.connection("nope").unwrap_err(),
        Error::UnknownConnection(_)
    ));
}

#[test]
#[serial]
fn test_resolved_values_are_expanded() {
    std::env::set_var("SSHGATE_TEST_HOST", "10.0.0.5");
    std::env::set_var("SSHGATE_TEST_SECRET", "s3cret");
    let original_home = std::env::var("HOME").ok();
    std::env::set_var("HOME", "/home/user");

    let config = Config::from_yaml(
        r#"
connections:
  web:
    host: "${SSHGATE_TEST_HOST}:2200"
    key: ~/.ssh/id_ed25519
    keyphrase: "$SSHGATE_TEST_SECRET"
"#,
    )
    .unwrap();
    let web = config.connection("web").unwrap();
    let host = web.resolved_host();
    let credentials = web.resolved_credentials();

    if let Some(home) = original_home {
        std::env::set_var("HOME", home);
    } else {
        std::env::remove_var("HOME");
    }

    assert_eq!(host, "10.0.0.5:2200");
    assert_eq!(
        credentials.key,
        Some(PathBuf::from("/home/user/.ssh/id_ed25519"))
    );
    assert_eq!(credentials.keyphrase.as_deref(), Some("s3cret"));
}

#[test]
#[serial]
fn test_username_defaults_to_local_user() {
    std::env::set_var("USER", "localuser");
    let connection = ConnectionConfig::new("example.com");
    assert_eq!(connection.resolved_username(), "localuser");
}

#[test]
fn test_empty_document_is_empty_config() {
    assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    assert_eq!(Config::from_yaml("   \n").unwrap(), Config::default());
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    assert!(Config::from_yaml("connections: [unclosed").is_err());
    assert!(Config::from_yaml("connections:\n  web:\n    username: x\n").is_err());
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load(&temp_dir.path().join("missing.yaml"))
        .await
        .unwrap();
    assert!(config.connections.is_empty());
}

#[tokio::test]
async fn test_load_reports_parse_errors_with_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sshgate.yaml");
    std::fs::write(&path, "connections: [unclosed").unwrap();

    let err = Config::load(&path).await.unwrap_err();
    assert!(matches!(err, Error::ConfigParse { path: p, .. } if p == path));
}

#[tokio::test]
async fn test_load_with_priority_prefers_explicit_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("explicit.yaml");
    std::fs::write(&path, "connections:\n  web:\n    host: example.com\n").unwrap();

    let config = Config::load_with_priority(Some(&path)).await.unwrap();
    assert!(config.connections.contains_key("web"));
}
