//! Data model shared by the contact form client, its front ends and the intake server.

pub mod domain;
pub mod error;
pub mod protocol;
