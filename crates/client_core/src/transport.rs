//! Outbound delivery of a submitted form.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{FormPayload, ATTACHMENT_PART};
use tracing::{debug, warn};
use url::Url;

use crate::{config::ClientSettings, error::TransportError};

/// Opaque success signal. The response text is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    body: String,
}

impl Ack {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, payload: FormPayload) -> Result<Ack, TransportError>;
}

/// Posts payloads as `multipart/form-data` to one fixed endpoint.
pub struct HttpMessageTransport {
    http: Client,
    endpoint: Url,
}

impl HttpMessageTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let endpoint = settings.endpoint_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::Client)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MessageTransport for HttpMessageTransport {
    async fn send(&self, payload: FormPayload) -> Result<Ack, TransportError> {
        let has_attachment = payload.attachment.is_some();
        let form = build_form(payload)?;
        debug!(endpoint = %self.endpoint, has_attachment, "posting contact form");

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(endpoint = %self.endpoint, error = %err, "failed to read rejection body");
                    String::new()
                }
            };
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "contact endpoint rejected submission");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(TransportError::Body)?;
        Ok(Ack::new(body))
    }
}

pub(crate) fn build_form(payload: FormPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in payload.fields {
        form = form.text(name.wire_name(), value);
    }

    if let Some(attachment) = payload.attachment {
        let mut part = Part::bytes(attachment.bytes).file_name(attachment.filename);
        if let Some(mime_type) = attachment.mime_type {
            part = part
                .mime_str(&mime_type)
                .map_err(|source| TransportError::InvalidMime { mime_type, source })?;
        }
        form = form.part(ATTACHMENT_PART, part);
    }

    Ok(form)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
