use delight_core::testkit::{error_body, poll_body, submit_body};
use delight_core::{
    CancellationToken, ChatRequest, DelightClient, DelightConfig, DelightError, PollResult,
};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &TempDir, server: &MockServer, max_attempts: u32) -> PathBuf {
    let file = dir.path().join("config.toml");
    let text = format!(
        r#"
[client]
base_url = "{}"
max_attempts = {}
poll_interval_ms = 10
request_timeout_secs = 5

[logging]
level = "debug"
"#,
        server.uri(),
        max_attempts
    );
    std::fs::write(&file, text).unwrap();
    file
}

fn client_from_file(dir: &TempDir, server: &MockServer, max_attempts: u32) -> DelightClient {
    let file = write_config(dir, server, max_attempts);
    let config = DelightConfig::load_from_paths(vec![file]).unwrap();
    DelightClient::new(config.client).unwrap()
}

async fn mount_submit(server: &MockServer, webhook: &str, poll_path: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/webhook/webwidget/{webhook}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_body("", poll_path)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_config_file_drives_full_conversation() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_submit(&server, "support", "/poll/conv-1").await;
    Mock::given(method("GET"))
        .and(path("/poll/conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body("conv-1", false, None)))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/poll/conv-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(poll_body(
                "conv-1",
                true,
                Some("Your ticket is open."),
            )),
        )
        .mount(&server)
        .await;

    let client = client_from_file(&dir, &server, 10);
    assert_eq!(client.config().poll_interval(), Duration::from_millis(10));

    let request = ChatRequest::new("Open a ticket", "support", "u-7", "bob");
    let result = client.send_and_await_reply(&request).await.unwrap();

    assert_eq!(result.uuid, "conv-1");
    assert_eq!(result.reply(), Some("Your ticket is open."));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 5);
    assert_eq!(received[0].method.as_str(), "POST");
    assert!(received[1..].iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_attempt_budget_from_config_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_submit(&server, "slow", "/poll/never").await;
    Mock::given(method("GET"))
        .and(path("/poll/never"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body("never", false, None)))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_from_file(&dir, &server, 3);
    let err = client
        .send_and_await_reply(&ChatRequest::new("hello", "slow", "u", "n"))
        .await
        .unwrap_err();

    assert!(matches!(err, DelightError::AttemptsExhausted { attempts: 3 }));
    assert_eq!(err.error_code(), "E2004");
}

#[tokio::test]
async fn test_api_error_surfaces_payload() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/webhook/webwidget/gone/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(
            "Webhook not found",
            "invalid_request_error",
            Some("webhook_not_found"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_from_file(&dir, &server, 5);
    let err = client
        .send_and_await_reply(&ChatRequest::new("hi", "gone", "u", "n"))
        .await
        .unwrap_err();

    let payload = err.api_payload().unwrap();
    assert_eq!(payload.message, "Webhook not found");
    assert_eq!(payload.code.as_deref(), Some("webhook_not_found"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_cancel_stops_waiting() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_submit(&server, "bot", "/poll/c").await;
    Mock::given(method("GET"))
        .and(path("/poll/c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body("c", false, None)))
        .mount(&server)
        .await;

    let client = client_from_file(&dir, &server, 1_000);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let options = client.poll_options();
    let err = client
        .send_and_await_reply_with(&ChatRequest::new("hi", "bot", "u", "n"), &options, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, DelightError::Cancelled));
    let polls = server.received_requests().await.unwrap().len() - 1;
    assert!(polls < 1_000);
}

#[tokio::test]
async fn test_callback_delivers_reply() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_submit(&server, "echo", "/poll/e").await;
    Mock::given(method("GET"))
        .and(path("/poll/e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body("e", true, Some("echo: hi"))))
        .mount(&server)
        .await;

    let client = client_from_file(&dir, &server, 5);
    let (tx, rx) = oneshot::channel::<PollResult>();

    let handle = client.send_and_await_reply_callback(
        ChatRequest::new("hi", "echo", "u", "n"),
        move |result| {
            if let Ok(reply) = result {
                let _ = tx.send(reply);
            }
        },
    );
    assert!(handle.is_some());

    let reply = rx.await.unwrap();
    assert_eq!(reply.reply(), Some("echo: hi"));
}
