//! # Knowledge Blocks (Block Document Model)
//!
//! This crate provides the block document model for the knowledge platform:
//! standalone typed content blocks, each with a polymorphic body shaped by
//! its kind, versioned authorship metadata, and a threaded discussion.
//!
//! ## Overview
//!
//! The knowledge-blocks crate handles:
//! - **Block kinds**: The closed set of six content kinds with stable tags
//! - **Bodies**: Per-kind payloads validated by a single shape policy
//! - **Comments**: An ordered forest of nested comments per block
//! - **Store**: The thread-safe engine with optimistic-concurrency updates
//!
//! ## Architecture
//!
//! ```text
//! BlockStore
//!   └─ Block
//!        ├─ BlockKind (immutable; text/title/table/img/math/chem)
//!        ├─ BlockBody (tagged by kind, shape-validated)
//!        ├─ AuditStamps + version (optimistic concurrency)
//!        └─ CommentForest
//!             └─ Comment
//!                  └─ Comment (replies, unbounded depth)
//! ```
//!
//! Blocks are independently addressable; nothing here orders blocks into a
//! larger document, and authorization beyond the comment-author check is a
//! collaborator's concern.
//!
//! ## Usage
//!
//! ```rust
//! use knowledge_blocks::{BlockBody, BlockKind, BlockStore};
//! use uuid::Uuid;
//!
//! let store = BlockStore::new();
//! let author = Uuid::now_v7();
//!
//! let block = store
//!     .create(
//!         BlockKind::Table,
//!         BlockBody::Table {
//!             rows: vec![vec!["name".into(), "owner".into()]],
//!         },
//!         author,
//!     )
//!     .unwrap();
//! assert_eq!(block.type_name(), "table");
//!
//! let comment = store.add_comment(block.id, None, author, "nice table").unwrap();
//! store.add_comment(block.id, Some(comment.id), author, "thanks").unwrap();
//! assert_eq!(store.thread(block.id).unwrap().len(), 2);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `knowledge-core`: Identity and timestamp primitives
//! - `knowledge-org`: The department hierarchy (independent of blocks)

pub mod block;
pub mod body;
pub mod comment;
pub mod error;
pub mod store;

// Re-export main types for convenience
pub use block::{Block, BlockKind};
pub use body::BlockBody;
pub use comment::{Comment, CommentForest};
pub use error::{BlockError, BlockResult};
pub use store::BlockStore;
