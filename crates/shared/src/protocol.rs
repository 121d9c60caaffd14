use crate::domain::{Attachment, Draft, FieldName};

pub const ATTACHMENT_PART: &str = "attachment";
pub const MESSAGES_PATH: &str = "/api/messages";
pub const RECEIVED_RESPONSE: &str = "Message received";

/// Transport-neutral form of a submitted draft: one text part per required field
/// in submission order, plus the attachment part when a file was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPayload {
    pub fields: Vec<(FieldName, String)>,
    pub attachment: Option<Attachment>,
}

impl FormPayload {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            fields: FieldName::ALL
                .into_iter()
                .map(|name| (name, draft.field(name).to_string()))
                .collect(),
            attachment: draft.attachment.clone(),
        }
    }

    pub fn field(&self, name: FieldName) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}
