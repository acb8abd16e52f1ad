#![deny(missing_docs)]

//! Core library for the student records service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Concurrent in-memory record store.
pub mod store;
/// Summary generation through an external text-generation service.
pub mod summarization;
