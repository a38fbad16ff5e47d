//! # Knowledge Core
//!
//! This crate provides the identity and timestamp primitives shared by the
//! knowledge platform domain crates (`knowledge-org`, `knowledge-blocks`).
//!
//! ## Overview
//!
//! The knowledge-core crate handles:
//! - **Stamps**: A wall-clock instant attributed to an author
//! - **Audit stamps**: Versioned created/updated metadata for mutable entities
//!
//! ## Architecture
//!
//! ```text
//! Entity (department, block, comment)
//!   └─ AuditStamps
//!        ├─ created: Stamp { at, author }
//!        └─ updated: Stamp { at, author }   (monotonically non-decreasing)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use knowledge_core::AuditStamps;
//! use uuid::Uuid;
//!
//! let author = Uuid::now_v7();
//! let mut stamps = AuditStamps::new(author);
//! assert_eq!(stamps.created, stamps.updated);
//!
//! let editor = Uuid::now_v7();
//! stamps.touch(editor);
//! assert_eq!(stamps.updated.author, editor);
//! assert!(stamps.updated.at >= stamps.created.at);
//! ```

pub mod stamp;

// Re-export main types for convenience
pub use stamp::{AuditStamps, Stamp};
