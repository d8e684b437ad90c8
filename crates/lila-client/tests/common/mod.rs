//! Shared fixtures for the HTTP backend tests

#![allow(dead_code)]

use lila_config::BackendConfig;
use lila_client::HttpBackend;
use lila_core::{Attachment, AttachmentManager, AttachmentPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CHAT_PATH: &str = "/api/chat-stream";
pub const UPLOAD_PATH: &str = "/api/files/upload";
pub const ANALYZE_PATH: &str = "/api/homeport/analyze";

pub fn backend_for(server: &MockServer) -> HttpBackend {
    let config = BackendConfig {
        base_url: server.uri(),
        timeout_secs: Some(5),
        ..Default::default()
    };
    HttpBackend::new(&config).expect("client should build")
}

pub fn workbook(name: &str) -> Attachment {
    let mut manager = AttachmentManager::new(AttachmentPolicy::default());
    manager
        .select(name, b"PK\x03\x04 workbook bytes".to_vec())
        .expect("fixture should validate")
        .clone()
}

/// Body of a streamed reply made of one message frame per answer
pub fn stream_body(answers: &[&str], conversation_id: &str) -> String {
    let mut body = String::new();
    for answer in answers {
        let frame = serde_json::json!({
            "event": "message",
            "answer": answer,
            "conversation_id": conversation_id,
        });
        body.push_str(&format!("data: {}\n\n", frame));
    }
    body.push_str(&format!(
        "data: {}\n\n",
        serde_json::json!({"event": "message_end", "conversation_id": conversation_id})
    ));
    body
}

pub async fn chat_server(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;
    server
}
