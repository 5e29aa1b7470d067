//! Test helpers: mock backend, API client wiring and fixture files.
//!
//! Run from workspace root: `cargo test -p bowlers-api-client`.
//! The mockito server plays both the backend and the storage provider.

#![allow(dead_code)]

pub mod fixtures;

use bowlers_api_client::{ApiClient, RetryPolicy};
use bowlers_core::models::UploadTicket;
use bowlers_core::ClientConfig;
use mockito::{Matcher, Mock, ServerGuard};
use std::net::SocketAddr;
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_USER_UID: &str = "u-42";

/// Path on the mock server standing in for the presigned storage URL.
pub const STORAGE_PATH: &str = "/storage/uploads/lane3.jpg";

pub fn fast_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

pub fn client_for(server: &ServerGuard, token: Option<&str>) -> ApiClient {
    let config = ClientConfig {
        api_url: server.url(),
        token: token.map(str::to_string),
        user_uid: Some(TEST_USER_UID.to_string()),
        ..Default::default()
    };
    ApiClient::new(&config)
        .expect("client")
        .with_retry_policy(fast_retries(0))
}

pub fn ticket_for(server: &ServerGuard, key: &str) -> UploadTicket {
    UploadTicket {
        key: key.to_string(),
        public_url: format!("https://cdn.bowlersnetwork.com/{}", key),
        presigned_url: format!("{}{}?X-Amz-Signature=abc123", server.url(), STORAGE_PATH),
    }
}

/// Initiate endpoint answering with `ticket` for the given file name.
pub async fn mock_initiate(server: &mut ServerGuard, file_name: &str, ticket: &UploadTicket) -> Mock {
    server
        .mock("POST", "/api/cloud/upload/singlepart/requests/initiate")
        .match_header("authorization", format!("Bearer {}", TEST_TOKEN).as_str())
        .match_body(Matcher::Json(serde_json::json!({
            "bucket": "cdn",
            "file_name": file_name,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(ticket).expect("ticket json"))
        .create_async()
        .await
}

/// Storage PUT answering with `status`. Must not carry the bearer token.
pub async fn mock_storage_put(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("PUT", Matcher::Regex(format!("^{}", regex_escape(STORAGE_PATH))))
        .match_header("authorization", Matcher::Missing)
        .with_status(status)
        .create_async()
        .await
}

pub async fn mock_abort(server: &mut ServerGuard, key: &str) -> Mock {
    server
        .mock("POST", "/api/cloud/upload/singlepart/requests/abort")
        .match_header("authorization", format!("Bearer {}", TEST_TOKEN).as_str())
        .match_body(Matcher::Json(serde_json::json!({
            "bucket": "cdn",
            "params": { "key": key },
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await
}

/// A v4 UUID in the idempotency key header.
pub fn idempotency_header() -> Matcher {
    Matcher::Regex("^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$".to_string())
}

/// Storage endpoint that accepts the connection but never answers.
///
/// The socket is held for `hold` so the client keeps blocking on the PUT.
pub async fn stalled_storage(hold: Duration) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stalled storage");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(hold).await;
            drop(socket);
        }
    });
    addr
}

fn regex_escape(path: &str) -> String {
    path.replace('.', "\\.")
}
