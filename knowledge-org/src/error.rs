//! Error types for department hierarchy operations
//!
//! This module defines all error types that can occur while mutating or
//! traversing the department hierarchy. Every variant is recoverable at the
//! caller; the transport layer maps them to responses via [`OrgError::status_code`].

use thiserror::Error;
use uuid::Uuid;

/// Department hierarchy error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrgError {
    /// Referenced department does not exist
    #[error("Department not found: {0}")]
    NotFound(Uuid),

    /// Operation crosses a company boundary
    #[error("Department {department} belongs to a different company than {company}")]
    CrossTenant {
        /// Department on the far side of the boundary
        department: Uuid,
        /// Company the caller was operating in
        company: Uuid,
    },

    /// Reparent would create (or traversal found) a cycle
    #[error("Reparenting department {0} would create a cycle")]
    CycleDetected(Uuid),

    /// Non-cascading delete attempted on a department with children
    #[error("Department {0} has child departments")]
    HasChildren(Uuid),
}

/// Result type for department hierarchy operations.
pub type OrgResult<T> = Result<T, OrgError>;

impl OrgError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OrgError::NotFound(_) => 404,
            OrgError::CrossTenant { .. } => 403,
            OrgError::CycleDetected(_) => 409,
            OrgError::HasChildren(_) => 409,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrgError::NotFound(_) => "DEPARTMENT_NOT_FOUND",
            OrgError::CrossTenant { .. } => "CROSS_TENANT",
            OrgError::CycleDetected(_) => "CYCLE_DETECTED",
            OrgError::HasChildren(_) => "HAS_CHILDREN",
        }
    }
}
