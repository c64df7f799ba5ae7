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

use sshgate::config::ConnectionConfig;
use sshgate::gateway::mock::{Call, MockGateway};
use sshgate::{BufferedOutput, Config, Error, Gateway, RemoteManager};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const CONFIG: &str = r#"
default: web
connections:
  web:
    host: web.example.com
    username: deploy
    password: secret
    tasks:
      deploy: ["cd /var/www/app", "git pull"]
  worker:
    host: "[2001:db8::7]:2222"
    username: queue
    agent: true
"#;

/// Hands out one shared mock per connection host.
fn manager_with_mocks() -> (RemoteManager, Arc<Mutex<HashMap<String, MockGateway>>>) {
    let mocks: Arc<Mutex<HashMap<String, MockGateway>>> = Arc::default();
    let registry = mocks.clone();
    let manager = RemoteManager::with_factory(
        Config::from_yaml(CONFIG).unwrap(),
        Box::new(move |settings: &ConnectionConfig| -> sshgate::Result<Box<dyn Gateway>> {
            let gateway = MockGateway::new().with_lines(["ok"]);
            registry
                .lock()
                .unwrap()
                .insert(settings.host.clone(), gateway.clone());
            Ok(Box::new(gateway))
        }),
    );
    (manager, mocks)
}

#[tokio::test]
async fn test_configured_tasks_are_defined() {
    let (mut manager, mocks) = manager_with_mocks();

    manager
        .connection(Some("web"))
        .unwrap()
        .task("deploy", None)
        .await
        .unwrap();

    let gateway = mocks.lock().unwrap()["web.example.com"].clone();
    assert!(gateway
        .calls()
        .contains(&Call::Run("cd /var/www/app && git pull".to_string())));
}

#[tokio::test]
async fn test_shared_output_receives_display_lines() {
    let (mut manager, _mocks) = manager_with_mocks();
    let output = Arc::new(BufferedOutput::new());
    manager.set_output(output.clone());

    manager
        .connection(Some("worker"))
        .unwrap()
        .run("uptime", None)
        .await
        .unwrap();

    assert_eq!(
        output.lines(),
        vec!["[queue@[2001:db8::7]:2222] (worker) ok"]
    );
}

#[test]
fn test_connections_are_cached() {
    let (mut manager, mocks) = manager_with_mocks();

    manager.connection(None).unwrap();
    manager.connection(Some("web")).unwrap();

    assert_eq!(mocks.lock().unwrap().len(), 1);
}

#[test]
fn test_no_default_connection() {
    let config = Config::from_yaml(
        "connections:\n  a:\n    host: a.example.com\n  b:\n    host: b.example.com\n",
    )
    .unwrap();
    let mut manager = RemoteManager::new(config, None);

    assert!(matches!(
        manager.connection(None).unwrap_err(),
        Error::NoDefaultConnection
    ));
}
