//! Async runtime the UI hands network work to.

pub mod runtime;
