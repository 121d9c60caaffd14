use std::{fmt, fs, path::Path, str::FromStr};

use thiserror::Error;

use crate::error::{AttachmentError, ValidationError};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(AttemptId);

pub const STATUS_INCOMPLETE: &str = "Please fill out all fields!";
pub const STATUS_SENT: &str = "Message sent successfully!";
pub const STATUS_FAILED: &str = "Failed to send message.";
pub const STATUS_READY: &str = "Ready to send your message!";

pub const FALLBACK_ATTACHMENT_NAME: &str = "attachment.bin";

/// One of the five required text fields of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    FirstName,
    LastName,
    Email,
    Subject,
    Message,
}

impl FieldName {
    /// Submission order, which is also the multipart part order.
    pub const ALL: [FieldName; 5] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Email,
        FieldName::Subject,
        FieldName::Message,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::Email => "email",
            FieldName::Subject => "subject",
            FieldName::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::FirstName => "First name",
            FieldName::LastName => "Last name",
            FieldName::Email => "Email",
            FieldName::Subject => "Subject",
            FieldName::Message => "Message",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownFieldName(pub String);

impl FromStr for FieldName {
    type Err = UnknownFieldName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "firstName" => Ok(FieldName::FirstName),
            "lastName" => Ok(FieldName::LastName),
            "email" => Ok(FieldName::Email),
            "subject" => Ok(FieldName::Subject),
            "message" => Ok(FieldName::Message),
            other => Err(UnknownFieldName(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_raw()
            .map(str::to_string);
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    /// Reads a picked file into memory, keeping its original file name.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let bytes = fs::read(path).map_err(|source| AttachmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_ATTACHMENT_NAME);
        Ok(Self::new(filename, bytes))
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// In-progress form data. Values are kept exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub attachment: Option<Attachment>,
}

impl Draft {
    pub fn field(&self, name: FieldName) -> &str {
        match name {
            FieldName::FirstName => &self.first_name,
            FieldName::LastName => &self.last_name,
            FieldName::Email => &self.email,
            FieldName::Subject => &self.subject,
            FieldName::Message => &self.message,
        }
    }

    pub fn set_field(&mut self, name: FieldName, value: impl Into<String>) {
        let slot = match name {
            FieldName::FirstName => &mut self.first_name,
            FieldName::LastName => &mut self.last_name,
            FieldName::Email => &mut self.email,
            FieldName::Subject => &mut self.subject,
            FieldName::Message => &mut self.message,
        };
        *slot = value.into();
    }

    /// Every required field must contain something other than whitespace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<FieldName> = FieldName::ALL
            .into_iter()
            .filter(|name| self.field(*name).trim().is_empty())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    pub fn is_empty(&self) -> bool {
        FieldName::ALL
            .into_iter()
            .all(|name| self.field(name).is_empty())
            && self.attachment.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    None,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionOutcome {
    pub status_text: String,
    pub severity: Severity,
}

impl SubmissionOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn incomplete() -> Self {
        Self::error(STATUS_INCOMPLETE)
    }

    pub fn sent() -> Self {
        Self {
            status_text: STATUS_SENT.to_string(),
            severity: Severity::Success,
        }
    }

    pub fn failed() -> Self {
        Self::error(STATUS_FAILED)
    }

    fn error(text: &str) -> Self {
        Self {
            status_text: text.to_string(),
            severity: Severity::Error,
        }
    }

    pub fn is_none(&self) -> bool {
        self.severity == Severity::None
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
