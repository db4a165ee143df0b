//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared
//! orchestrator and the startup configuration.

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<Config>,
}
