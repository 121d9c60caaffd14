use super::*;
use axum::{extract::Multipart, extract::State, http::StatusCode, routing::post, Router};
use shared::domain::{Attachment, Draft, FieldName};
use std::sync::Arc;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedPart {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<Vec<ReceivedPart>>>>>,
    status: StatusCode,
}

async fn handle_contact_form(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, &'static str) {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(ReceivedPart {
            name,
            filename,
            content_type,
            bytes,
        });
    }
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(parts);
    }
    let body = if state.status.is_success() {
        "Message received"
    } else {
        "Failed to upload attachment"
    };
    (state.status, body)
}

async fn spawn_contact_server(
    status: StatusCode,
) -> (Url, oneshot::Receiver<Vec<ReceivedPart>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
        status,
    };
    let app = Router::new()
        .route("/api/messages", post(handle_contact_form))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let url = Url::parse(&format!("http://{addr}/api/messages")).expect("url");
    (url, rx)
}

fn sample_draft() -> Draft {
    let mut draft = Draft::default();
    draft.set_field(FieldName::FirstName, "Ann");
    draft.set_field(FieldName::LastName, "Lee");
    draft.set_field(FieldName::Email, "a@x.com");
    draft.set_field(FieldName::Subject, "Hi");
    draft.set_field(FieldName::Message, "Hello");
    draft
}

#[tokio::test]
async fn posts_text_fields_as_multipart_without_attachment() {
    let (endpoint, parts_rx) = spawn_contact_server(StatusCode::OK).await;
    let transport = HttpMessageTransport::new(endpoint);

    let ack = transport
        .send(FormPayload::from_draft(&sample_draft()))
        .await
        .expect("send");
    assert_eq!(ack.body(), "Message received");

    let parts = parts_rx.await.expect("parts");
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["firstName", "lastName", "email", "subject", "message"]);
    assert_eq!(parts[0].bytes, b"Ann");
    assert_eq!(parts[4].bytes, b"Hello");
    assert!(parts.iter().all(|p| p.filename.is_none()));
}

#[tokio::test]
async fn attachment_part_keeps_filename_and_mime_type() {
    let (endpoint, parts_rx) = spawn_contact_server(StatusCode::OK).await;
    let transport = HttpMessageTransport::new(endpoint);
    let mut draft = sample_draft();
    draft.attachment = Some(Attachment::new("report.pdf", b"%PDF-1.7".to_vec()));

    transport
        .send(FormPayload::from_draft(&draft))
        .await
        .expect("send");

    let parts = parts_rx.await.expect("parts");
    let attachment = parts
        .iter()
        .find(|p| p.name == "attachment")
        .expect("attachment part");
    assert_eq!(attachment.filename.as_deref(), Some("report.pdf"));
    assert_eq!(attachment.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(attachment.bytes, b"%PDF-1.7");
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let (endpoint, _parts_rx) = spawn_contact_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let transport = HttpMessageTransport::new(endpoint);

    let err = transport
        .send(FormPayload::from_draft(&sample_draft()))
        .await
        .expect_err("500 must fail");
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Failed to upload attachment");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let transport =
        HttpMessageTransport::new(Url::parse(&format!("http://{addr}/api/messages")).expect("url"));
    let err = transport
        .send(FormPayload::from_draft(&sample_draft()))
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, TransportError::Request(_)));
}

/// Answers one request with a 200 whose body is shorter than its `Content-Length`.
async fn spawn_truncating_server() -> Url {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
            let finished = request.windows(4).any(|w| w == b"--\r\n")
                && (request.ends_with(b"--\r\n") || request.ends_with(b"0\r\n\r\n"));
            if finished {
                break;
            }
        }
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\ncontent-type: text/plain\r\n\r\npartial")
            .await;
        let _ = socket.flush().await;
    });
    Url::parse(&format!("http://{addr}/api/messages")).expect("url")
}

#[tokio::test]
async fn truncated_success_body_is_a_body_error() {
    let transport = HttpMessageTransport::new(spawn_truncating_server().await);

    let err = transport
        .send(FormPayload::from_draft(&sample_draft()))
        .await
        .expect_err("truncated body must fail");
    assert!(matches!(err, TransportError::Body(_)), "unexpected error: {err}");
}

#[test]
fn invalid_mime_type_is_rejected_before_sending() {
    let mut draft = sample_draft();
    draft.attachment = Some(Attachment {
        filename: "odd.bin".to_string(),
        mime_type: Some("not a mime".to_string()),
        bytes: vec![0],
    });
    let err = build_form(FormPayload::from_draft(&draft)).expect_err("bad mime");
    assert!(matches!(err, TransportError::InvalidMime { .. }));
}

#[test]
fn from_settings_uses_configured_endpoint() {
    let settings = ClientSettings {
        endpoint: "https://contact.example.com/api/messages".to_string(),
        request_timeout_secs: Some(10),
    };
    let transport = HttpMessageTransport::from_settings(&settings).expect("transport");
    assert_eq!(
        transport.endpoint().as_str(),
        "https://contact.example.com/api/messages"
    );
}
