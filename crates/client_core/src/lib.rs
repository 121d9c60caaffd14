//! Contact form client: the draft-owning Form Controller and the HTTP Transport it submits through.

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use controller::{FormController, FormEvent};
pub use error::{SubmitError, TransportError};
pub use transport::{Ack, HttpMessageTransport, MessageTransport};
