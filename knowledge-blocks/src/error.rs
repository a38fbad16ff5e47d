//! Error types for block and comment operations
//!
//! This module defines all error types that can occur while creating,
//! mutating, or traversing blocks and their discussion threads. Every
//! variant is recoverable at the caller; the transport layer maps them to
//! responses via [`BlockError::status_code`].

use thiserror::Error;
use uuid::Uuid;

/// Block document model error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    /// Referenced block does not exist
    #[error("Block not found: {0}")]
    NotFound(Uuid),

    /// Referenced comment does not exist under the block
    #[error("Comment not found: {0}")]
    CommentNotFound(Uuid),

    /// Block body does not match the shape expected for its type
    #[error("Invalid block body: {0}")]
    InvalidBody(String),

    /// Numeric type tag outside the closed set of recognized kinds
    #[error("Unknown block type tag: {0}")]
    UnknownBlockType(u8),

    /// Optimistic-concurrency mismatch on a block update
    #[error("Version conflict: expected {expected}, block is at {actual}")]
    VersionConflict {
        /// Version the caller last read
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Non-cascading delete attempted on a comment with replies
    #[error("Comment {0} has replies")]
    HasChildren(Uuid),

    /// Comment edit attempted by someone other than its author
    #[error("Only the comment author may edit it")]
    Forbidden,
}

/// Result type for block and comment operations.
pub type BlockResult<T> = Result<T, BlockError>;

impl BlockError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            BlockError::NotFound(_) | BlockError::CommentNotFound(_) => 404,
            BlockError::InvalidBody(_) | BlockError::UnknownBlockType(_) => 400,
            BlockError::VersionConflict { .. } | BlockError::HasChildren(_) => 409,
            BlockError::Forbidden => 403,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            BlockError::NotFound(_) => "BLOCK_NOT_FOUND",
            BlockError::CommentNotFound(_) => "COMMENT_NOT_FOUND",
            BlockError::InvalidBody(_) => "INVALID_BODY",
            BlockError::UnknownBlockType(_) => "UNKNOWN_BLOCK_TYPE",
            BlockError::VersionConflict { .. } => "VERSION_CONFLICT",
            BlockError::HasChildren(_) => "HAS_CHILDREN",
            BlockError::Forbidden => "FORBIDDEN",
        }
    }
}
