//! MathBot Orchestrator Service Library
//!
//! This library contains the session orchestrator for the MathBot learning
//! chatbot: the per-user session registry, the curriculum state machine
//! driving each operation, the HTTP handlers and routing, and the service
//! configuration. The binaries under `bin/` are thin wrappers around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod router;
pub mod sessions;
pub mod state;
