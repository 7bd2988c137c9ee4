//! Surface error types

use thiserror::Error;

/// Surface adapter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface has no loaded document yet
    #[error("Surface not loaded")]
    NotLoaded,

    /// The document exists but cannot be instrumented (cross-boundary restriction)
    #[error("Surface inaccessible: {0}")]
    Inaccessible(String),

    /// Nothing in the document could receive the dispatched input
    #[error("No dispatch target in the current document")]
    NoTarget,

    /// The subscription was already torn down
    #[error("Input subscription not attached")]
    Detached,

    /// Any backend-specific error
    #[error("Surface error: {0}")]
    Other(String),
}

/// Result type for surface operations
pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;
