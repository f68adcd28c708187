//! Error types.
//!
//! Malformed slider or pH input is not an error: it is dropped where it is
//! parsed. Everything here is an internal failure or a client mistake at
//! the HTTP boundary.

use thiserror::Error;
use uuid::Uuid;

/// Lifecycle entry points called out of order, or preload failing.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("preload has already run")]
    AlreadyPreloaded,

    #[error("setup called before preload")]
    NotPreloaded,

    #[error("setup has already run")]
    AlreadySetUp,

    #[error("frame called before setup")]
    NotSetUp,

    #[error("preload failed: {0}")]
    Preload(#[from] AssetError),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("sprite encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("sprite cache poisoned")]
    CachePoisoned,

    #[error("unknown sprite '{name}'")]
    UnknownSprite { name: String },
}

/// Errors surfaced by the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session {id} not found")]
    SessionNotFound { id: Uuid },

    #[error("session table poisoned")]
    SessionsPoisoned,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

pub type ApiResult<T> = Result<T, ApiError>;
