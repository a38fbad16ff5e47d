//! # Knowledge Org (Department Hierarchy)
//!
//! This crate provides the company-scoped department hierarchy for the
//! knowledge platform. Departments form a forest per company; every
//! structural mutation re-validates company scoping and acyclicity.
//!
//! ## Overview
//!
//! The knowledge-org crate handles:
//! - **Departments**: Organizational units with an owner and an optional parent
//! - **Directory**: The thread-safe engine holding the hierarchy and enforcing
//!   its invariants on create, reparent, and delete
//!
//! ## Architecture
//!
//! ```text
//! DepartmentDirectory
//!   └─ Company (tenant scope)
//!        └─ Department
//!             ├─ Department
//!             │    └─ Department
//!             └─ Department
//! ```
//!
//! Invariants enforced on every mutation:
//! - A department's parent belongs to the same company
//! - No department is ever its own transitive ancestor
//! - `id` and `company_id` never change after creation
//!
//! ## Usage
//!
//! ```rust
//! use knowledge_org::DepartmentDirectory;
//! use uuid::Uuid;
//!
//! let directory = DepartmentDirectory::new();
//! let company_id = Uuid::now_v7();
//! let owner_id = Uuid::now_v7();
//!
//! let engineering = directory
//!     .create(company_id, owner_id, None, "Engineering", "Builds the product")
//!     .unwrap();
//! let platform = directory
//!     .create(company_id, owner_id, Some(engineering.id), "Platform", "Core infrastructure")
//!     .unwrap();
//!
//! let subtree = directory.subtree(engineering.id).unwrap();
//! assert_eq!(subtree.len(), 2);
//! assert_eq!(subtree[1].id, platform.id);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `knowledge-core`: Identity and timestamp primitives
//! - `knowledge-blocks`: The block document model (independent of the hierarchy)

pub mod department;
pub mod directory;
pub mod error;

// Re-export main types for convenience
pub use department::Department;
pub use directory::DepartmentDirectory;
pub use error::{OrgError, OrgResult};
