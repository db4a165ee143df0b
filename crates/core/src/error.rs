//! Error taxonomy for orchestrator operations.
//!
//! Every collaborator failure is mapped to one of these kinds at the
//! operation boundary; raw transport errors never escape to callers.

use std::fmt;

use crate::store::StoreError;

/// Which kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Course,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::User => write!(f, "user"),
            Resource::Course => write!(f, "course"),
        }
    }
}

/// The failure kinds an orchestrator operation can report.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Malformed or missing caller data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unknown user or course.
    #[error("{0} not found")]
    NotFound(Resource),
    /// Valid user, but no active course. Distinct from `NotFound`.
    #[error("user has no active course")]
    NotEnrolled,
    /// Duplicate registration.
    #[error("user is already registered")]
    Conflict,
    /// Unexpected collaborator response, content mismatch, or a store
    /// write failure. Never retried automatically.
    #[error("internal failure: {0}")]
    Internal(#[source] anyhow::Error),
}

impl BotError {
    /// Maps a store failure at a read boundary, naming the record the
    /// operation was looking for.
    pub fn from_store(err: StoreError, missing: Resource) -> Self {
        match err {
            StoreError::NotFound => BotError::NotFound(missing),
            StoreError::Conflict => BotError::Conflict,
            StoreError::InvalidInput(msg) => BotError::InvalidInput(msg),
            other => BotError::internal(other),
        }
    }

    /// Wraps any collaborator failure as an internal one. Used for write
    /// failures after a successful read and for unexpected responses,
    /// where a "not found" no longer means anything the caller can act on.
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        BotError::Internal(err.into())
    }
}
