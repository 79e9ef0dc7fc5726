//! HTTP transport against an in-process axum server.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use webchat_panel::panel::MessageInput;
use webchat_panel::panel::memory::MemoryPanel;
use webchat_panel::{ChatPanel, ChatTransport, Error, HttpTransport, Message, SelectedFile};

/// What the stub server received.
#[derive(Debug, Default, Clone)]
struct Seen {
    chat_bodies: Vec<Value>,
    chat_content_types: Vec<String>,
    uploads: Vec<(String, String, Option<String>, Vec<u8>)>,
}

type Shared = Arc<Mutex<Seen>>;

async fn webchat(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    {
        let mut seen = seen.lock().unwrap();
        seen.chat_content_types.push(
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        );
        seen.chat_bodies.push(body);
    }
    Json(json!({ "reply": format!("echo: {text}") }))
}

async fn upload(State(seen): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    let mut stored = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        if name == "file" {
            stored = Some(format!("1700000000_{filename}"));
        }
        seen.lock()
            .unwrap()
            .uploads
            .push((name, filename, content_type, data));
    }
    match stored {
        Some(filename) => Json(json!({
            "ok": true,
            "filename": filename,
            "url": format!("/files/{filename}"),
        })),
        None => Json(json!({ "ok": false, "error": "No file" })),
    }
}

async fn rejecting_upload() -> Json<Value> {
    Json(json!({ "ok": false, "error": "No file" }))
}

async fn html_error() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Internal Server Error</body></html>",
    )
}

async fn json_with_bad_status() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "reply": "Send some text." })),
    )
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn stub_server() -> (String, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/webchat", post(webchat))
        .route("/upload", post(upload))
        .with_state(Arc::clone(&seen));
    (spawn_server(app).await, seen)
}

#[tokio::test]
async fn test_send_text_posts_json() {
    let (base, seen) = stub_server().await;
    let transport = HttpTransport::new(&base).unwrap();

    let reply = transport.send_text("hello server").await.unwrap();
    assert_eq!(reply.reply, "echo: hello server");

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.chat_bodies, vec![json!({ "text": "hello server" })]);
    assert_eq!(seen.chat_content_types, vec!["application/json".to_string()]);
}

#[tokio::test]
async fn test_upload_posts_multipart_file_field() {
    let (base, seen) = stub_server().await;
    let transport = HttpTransport::new(&base).unwrap();

    let result = transport
        .upload(SelectedFile::new("cat.png", b"png-bytes".to_vec()))
        .await
        .unwrap();
    assert!(result.ok);
    assert_eq!(result.filename.as_deref(), Some("1700000000_cat.png"));
    assert_eq!(result.url.as_deref(), Some("/files/1700000000_cat.png"));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.uploads.len(), 1);
    let (field, filename, content_type, data) = &seen.uploads[0];
    assert_eq!(field, "file");
    assert_eq!(filename, "cat.png");
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(data, b"png-bytes");
}

#[tokio::test]
async fn test_non_json_body_is_json_error() {
    let app = Router::new()
        .route("/webchat", post(html_error))
        .route("/upload", post(html_error));
    let base = spawn_server(app).await;
    let transport = HttpTransport::new(&base).unwrap();

    let err = transport.send_text("hi").await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {err:?}");

    let err = transport
        .upload(SelectedFile::new("a.png", vec![1]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn test_json_body_parsed_despite_error_status() {
    let app = Router::new().route("/webchat", post(json_with_bad_status));
    let base = spawn_server(app).await;
    let transport = HttpTransport::new(&base).unwrap();

    let reply = transport.send_text("  ").await.unwrap();
    assert_eq!(reply.reply, "Send some text.");
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{addr}")).unwrap();
    let err = transport.send_text("anyone?").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn test_panel_end_to_end() {
    let (base, _seen) = stub_server().await;
    let handles = MemoryPanel::new();
    let panel = ChatPanel::new(
        handles.handles(),
        Arc::new(HttpTransport::new(&base).unwrap()),
    );

    handles.input.set_value("what is this?");
    panel.send().await.unwrap();

    handles
        .file_input
        .select(SelectedFile::new("dog.jpg", b"jpeg".to_vec()));
    panel.upload_file().await.unwrap();

    assert_eq!(
        handles.chat.messages(),
        vec![
            Message::me("what is this?"),
            Message::bot("echo: what is this?"),
            Message::me("Uploaded image: 1700000000_dog.jpg"),
            Message::bot("To ask about this image, type: img:1700000000_dog.jpg Your question"),
        ]
    );
}

#[tokio::test]
async fn test_panel_renders_rejected_upload() {
    let app = Router::new().route("/upload", post(rejecting_upload));
    let base = spawn_server(app).await;
    let handles = MemoryPanel::new();
    let panel = ChatPanel::new(
        handles.handles(),
        Arc::new(HttpTransport::new(&base).unwrap()),
    );

    handles
        .file_input
        .select(SelectedFile::new("dog.jpg", b"jpeg".to_vec()));
    panel.upload_file().await.unwrap();

    assert_eq!(handles.chat.messages(), vec![Message::bot("Upload failed")]);
}
