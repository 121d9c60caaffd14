//! UI layer for the contact form: app shell and severity theming.

pub mod app;
pub mod theme;

pub use app::ContactFormApp;
