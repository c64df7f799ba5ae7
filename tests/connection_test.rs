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

use sshgate::gateway::mock::{Call, MockGateway};
use sshgate::{BufferedOutput, Connection, Credentials, Error, ExitStatus, Timeout};
use std::sync::Arc;
use tempfile::TempDir;

fn connection(gateway: &MockGateway) -> Connection {
    Connection::with_gateway(
        "production",
        "127.0.0.1",
        "taylor",
        Box::new(gateway.clone()),
    )
}

#[tokio::test]
async fn test_run_delivers_lines_in_order() {
    let gateway = MockGateway::new().with_lines(["first", "second", "third"]);
    let mut connection = connection(&gateway);

    let mut seen = Vec::new();
    let mut collect = |line: &str, connection: &Connection| {
        seen.push(format!("{}:{}", connection.name(), line));
    };
    connection
        .run(["cd /var/www", "git pull", "composer install"], Some(&mut collect))
        .await
        .unwrap();

    assert_eq!(
        seen,
        vec!["production:first", "production:second", "production:third"]
    );
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Connect("taylor".to_string()),
            Call::Run("cd /var/www && git pull && composer install".to_string()),
            Call::NextLine,
            Call::NextLine,
            Call::NextLine,
            Call::NextLine,
        ]
    );
}

#[tokio::test]
async fn test_run_with_no_output_never_calls_back() {
    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);

    let mut count = 0;
    let mut counter = |_: &str, _: &Connection| count += 1;
    connection.run("true", Some(&mut counter)).await.unwrap();

    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_default_display_writes_prefixed_lines() {
    let gateway = MockGateway::new().with_lines(["hello world"]);
    let output = Arc::new(BufferedOutput::new());
    let mut connection = connection(&gateway);
    connection.set_output(output.clone());

    connection.run("echo hello world", None).await.unwrap();

    assert_eq!(
        output.lines(),
        vec!["[taylor@127.0.0.1] (production) hello world"]
    );
}

#[tokio::test]
async fn test_task_runs_joined_commands() {
    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);
    connection.define("deploy", ["git pull", "php artisan migrate"]);

    connection.task("deploy", None).await.unwrap();

    assert!(gateway
        .calls()
        .contains(&Call::Run("git pull && php artisan migrate".to_string())));
}

#[tokio::test]
async fn test_unknown_task_has_no_gateway_interaction() {
    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);

    connection.task("missing", None).await.unwrap();

    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_login_is_connect_failed() {
    let gateway = MockGateway::new().with_login(false);
    let mut connection = connection(&gateway);

    let err = connection.run("uptime", None).await.unwrap_err();

    assert!(matches!(
        err,
        Error::ConnectFailed { ref username, ref host } if username == "taylor" && host == "127.0.0.1"
    ));
    assert_eq!(gateway.calls(), vec![Call::Connect("taylor".to_string())]);
}

#[tokio::test]
async fn test_connected_gateway_is_not_reconnected() {
    let gateway = MockGateway::new().with_connected(true);
    let mut connection = connection(&gateway);

    connection.exists("/var/www").await.unwrap();

    assert_eq!(gateway.calls(), vec![Call::Exists("/var/www".to_string())]);
}

#[tokio::test]
async fn test_connects_only_once_across_operations() {
    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);

    connection.run("uptime", None).await.unwrap();
    connection.put_string("/tmp/a", "x").await.unwrap();
    connection.exists("/tmp/a").await.unwrap();

    let connects = gateway
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::Connect(_)))
        .count();
    assert_eq!(connects, 1);
}

#[tokio::test]
async fn test_string_transfer_round_trip() {
    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);

    connection
        .put_string("/var/www/.env", "APP_ENV=production\n")
        .await
        .unwrap();

    assert!(connection.exists("/var/www/.env").await.unwrap());
    assert_eq!(
        connection.get_string("/var/www/.env").await.unwrap(),
        "APP_ENV=production\n"
    );
}

#[tokio::test]
async fn test_file_transfer_through_local_paths() {
    let temp_dir = TempDir::new().unwrap();
    let upload = temp_dir.path().join("upload.txt");
    let download = temp_dir.path().join("download.txt");
    std::fs::write(&upload, "payload").unwrap();

    let gateway = MockGateway::new();
    let mut connection = connection(&gateway);

    connection.put(&upload, "/srv/payload.txt").await.unwrap();
    connection.get("/srv/payload.txt", &download).await.unwrap();

    assert_eq!(std::fs::read_to_string(&download).unwrap(), "payload");
    assert_eq!(gateway.file("/srv/payload.txt").as_deref(), Some("payload"));
}

#[tokio::test]
async fn test_rename_and_delete_pass_results_through() {
    let gateway = MockGateway::new().with_file("/srv/old", "x");
    let mut connection = connection(&gateway);

    assert!(!connection.rename("/srv/missing", "/srv/new").await.unwrap());
    assert!(connection.rename("/srv/old", "/srv/new").await.unwrap());
    assert!(connection.delete("/srv/new").await.unwrap());
    assert!(!connection.delete("/srv/new").await.unwrap());
}

#[tokio::test]
async fn test_status_passes_through_without_connecting() {
    let gateway = MockGateway::new().with_status(ExitStatus::Code(1));
    let connection = connection(&gateway);

    assert_eq!(connection.status(), ExitStatus::Code(1));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_missing_credentials_fail_before_network() {
    // TEST-NET-1 address; a connection attempt would time out instead
    let mut connection = Connection::new(
        "production",
        "192.0.2.1:22",
        "taylor",
        Credentials::default(),
        Timeout::default(),
    )
    .unwrap();

    let err = connection.run("uptime", None).await.unwrap_err();
    assert!(matches!(err, Error::CredentialRequired));
}

#[test]
fn test_invalid_host_rejected_at_construction() {
    let err = Connection::new(
        "production",
        "[::1",
        "taylor",
        Credentials::default().with_password("secret"),
        Timeout::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidHost { .. }));
}
