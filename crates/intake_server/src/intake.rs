//! Receives contact form submissions and keeps the most recent ones in an
//! in-memory inbox. Meant as a local development receiver: `GET` lists stored
//! messages without authentication.

use std::{collections::VecDeque, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use shared::{
    domain::{Draft, FieldName, FALLBACK_ATTACHMENT_NAME},
    error::{ApiError, ErrorCode},
    protocol::{ATTACHMENT_PART, MESSAGES_PATH, RECEIVED_RESPONSE},
};
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info, warn};

const MAX_FILENAME_BYTES: usize = 180;
pub const DEFAULT_INBOX_CAPACITY: usize = 100;

type ApiRejection = (StatusCode, Json<ApiError>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedAttachment {
    pub filename: String,
    pub mime_type: Option<String>,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub attachment: Option<ReceivedAttachment>,
}

struct Inbox {
    messages: VecDeque<ReceivedMessage>,
    next_id: u64,
}

pub struct AppState {
    inbox: Mutex<Inbox>,
    capacity: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }
}

impl AppState {
    /// Keeps at most `capacity` messages, dropping the oldest first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inbox: Mutex::new(Inbox {
                messages: VecDeque::with_capacity(capacity),
                next_id: 1,
            }),
            capacity: capacity.max(1),
        }
    }

    pub async fn messages(&self) -> Vec<ReceivedMessage> {
        self.inbox.lock().await.messages.iter().cloned().collect()
    }
}

pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(MESSAGES_PATH, post(receive_message).get(list_messages))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_messages(State(state): State<Arc<AppState>>) -> Json<Vec<ReceivedMessage>> {
    Json(state.messages().await)
}

async fn receive_message(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<&'static str, ApiRejection> {
    let mut draft = Draft::default();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_rejection)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == ATTACHMENT_PART {
            let filename = field.file_name().map(str::to_string);
            let mime_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_rejection)?;
            if bytes.is_empty() {
                debug!("empty attachment part ignored");
                continue;
            }
            attachment = Some(ReceivedAttachment {
                filename: validate_filename(filename.as_deref())?,
                mime_type,
                size_bytes: bytes.len(),
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_rejection)?;
        match name.parse::<FieldName>() {
            Ok(field_name) => draft.set_field(field_name, value),
            Err(_) => debug!(field = %name, "ignoring unknown form field"),
        }
    }

    draft.validate().map_err(|err| {
        warn!(missing = %err, "rejecting incomplete contact form");
        (StatusCode::BAD_REQUEST, Json(ApiError::from(err)))
    })?;

    let mut inbox = state.inbox.lock().await;
    let record = ReceivedMessage {
        id: inbox.next_id,
        first_name: draft.first_name,
        last_name: draft.last_name,
        email: draft.email,
        subject: draft.subject,
        message: draft.message,
        attachment,
    };
    info!(
        id = record.id,
        email = %record.email,
        subject = %record.subject,
        attachment = record.attachment.as_ref().map(|a| a.filename.as_str()),
        "contact message received"
    );
    inbox.next_id += 1;
    if inbox.messages.len() >= state.capacity {
        if let Some(dropped) = inbox.messages.pop_front() {
            debug!(id = dropped.id, "inbox full, dropping oldest message");
        }
    }
    inbox.messages.push_back(record);

    Ok(RECEIVED_RESPONSE)
}

fn validate_filename(filename: Option<&str>) -> Result<String, ApiRejection> {
    let Some(name) = filename.map(str::trim).filter(|name| !name.is_empty()) else {
        return Ok(FALLBACK_ATTACHMENT_NAME.to_string());
    };
    if name.len() > MAX_FILENAME_BYTES {
        return Err(validation_rejection("filename is too long"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(validation_rejection(
            "filename must not contain path separators",
        ));
    }
    Ok(name.to_string())
}

fn validation_rejection(message: &str) -> ApiRejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn multipart_rejection(err: MultipartError) -> ApiRejection {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PayloadTooLarge
    } else {
        ErrorCode::Validation
    };
    warn!(%status, error = %err.body_text(), "malformed contact form upload");
    (status, Json(ApiError::new(code, err.body_text())))
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;
