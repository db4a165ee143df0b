//! MathBot Core Library
//!
//! Domain model and collaborator contracts for the MathBot session
//! orchestrator: user progress and course content types, the error
//! taxonomy, and the client abstractions for the two external services
//! the orchestrator depends on (the record store and the answer judge).
//! The `services/api` crate builds the orchestration logic on top of
//! these seams.

pub mod course;
pub mod error;
pub mod judge;
pub mod progress;
pub mod store;
