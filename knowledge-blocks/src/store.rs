//! Block store engine
//!
//! This module provides the thread-safe engine that owns blocks and routes
//! comment operations to the right block's forest. Body updates use
//! optimistic concurrency: callers pass the version they last read, and a
//! stale token is rejected with a conflict instead of silently losing an
//! update.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::block::{Block, BlockKind};
use crate::body::BlockBody;
use crate::comment::Comment;
use crate::error::{BlockError, BlockResult};

/// In-memory block store.
///
/// This is suitable for single-process applications and testing. A
/// persistence backend only needs to keep blocks addressable by ID; which
/// engine backs that is out of scope here.
///
/// The store is cheap to clone: clones share the same underlying state,
/// so one handle can be given to each request handler.
///
/// # Examples
///
/// ```
/// use knowledge_blocks::{BlockBody, BlockKind, BlockStore};
/// use uuid::Uuid;
///
/// let store = BlockStore::new();
/// let author = Uuid::now_v7();
/// let block = store
///     .create(BlockKind::Text, BlockBody::Text { text: "hello".into() }, author)
///     .unwrap();
///
/// let updated = store
///     .update_body(
///         block.id,
///         BlockBody::Text { text: "hello, world".into() },
///         author,
///         block.version,
///     )
///     .unwrap();
/// assert_eq!(updated.version, block.version + 1);
/// ```
#[derive(Clone, Default)]
pub struct BlockStore {
    blocks: Arc<RwLock<HashMap<Uuid, Block>>>,
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore").finish_non_exhaustive()
    }
}

impl BlockStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the read lock, recovering from poisoning.
    ///
    /// Every mutation leaves the map consistent before releasing the lock,
    /// so continuing with the inner state after a panicked writer is safe.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Block>> {
        self.blocks.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Acquire the write lock, recovering from poisoning.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Block>> {
        self.blocks.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a block.
    ///
    /// Both stamps are set to the creation instant/author; the version
    /// token starts at 1.
    ///
    /// # Errors
    ///
    /// [`BlockError::InvalidBody`] if `body` is not shaped for `kind`.
    pub fn create(&self, kind: BlockKind, body: BlockBody, author: Uuid) -> BlockResult<Block> {
        let block = Block::new(kind, body, author)?;
        self.write().insert(block.id, block.clone());
        info!(block = %block.id, kind = %kind, "block created");
        Ok(block)
    }

    /// Get a block by ID.
    pub fn get(&self, block_id: Uuid) -> BlockResult<Block> {
        self.read()
            .get(&block_id)
            .cloned()
            .ok_or(BlockError::NotFound(block_id))
    }

    /// Replace a block's body, guarded by an optimistic version token.
    ///
    /// `expected_version` is the version the caller last read. A mismatch
    /// is [`BlockError::VersionConflict`]: someone else committed first,
    /// and the caller must re-read and retry with the fresh token. On
    /// success the version is bumped and `stamps.updated` refreshed.
    ///
    /// # Errors
    ///
    /// - [`BlockError::NotFound`] if the block is missing
    /// - [`BlockError::VersionConflict`] if `expected_version` is stale
    /// - [`BlockError::InvalidBody`] if `new_body` is not shaped for the
    ///   block's (immutable) kind
    pub fn update_body(
        &self,
        block_id: Uuid,
        new_body: BlockBody,
        author: Uuid,
        expected_version: u64,
    ) -> BlockResult<Block> {
        let mut blocks = self.write();
        let block = blocks
            .get_mut(&block_id)
            .ok_or(BlockError::NotFound(block_id))?;
        if block.version != expected_version {
            return Err(BlockError::VersionConflict {
                expected: expected_version,
                actual: block.version,
            });
        }
        block.set_body(new_body, author)?;
        debug!(block = %block_id, version = block.version, "block body updated");
        Ok(block.clone())
    }

    /// Delete a block.
    ///
    /// Blocks are standalone, so deletion takes the discussion with it and
    /// affects nothing else.
    pub fn delete(&self, block_id: Uuid) -> BlockResult<()> {
        self.write()
            .remove(&block_id)
            .map(|_| info!(block = %block_id, "block deleted"))
            .ok_or(BlockError::NotFound(block_id))
    }

    /// Add a comment to a block's discussion.
    ///
    /// With `parent_comment_id` absent the comment becomes a new root of
    /// the block's forest; otherwise it is appended under that comment.
    /// Comment mutations do not bump the block's version — the token
    /// guards the body only.
    ///
    /// # Errors
    ///
    /// - [`BlockError::NotFound`] if the block is missing
    /// - [`BlockError::CommentNotFound`] if the parent comment is missing
    pub fn add_comment(
        &self,
        block_id: Uuid,
        parent_comment_id: Option<Uuid>,
        author_id: Uuid,
        text: impl Into<String>,
    ) -> BlockResult<Comment> {
        let mut blocks = self.write();
        let block = blocks
            .get_mut(&block_id)
            .ok_or(BlockError::NotFound(block_id))?;
        let comment = block.comments.add(parent_comment_id, author_id, text)?;
        debug!(block = %block_id, comment = %comment.id, "comment added");
        Ok(comment)
    }

    /// Edit a comment's text.
    ///
    /// # Errors
    ///
    /// - [`BlockError::NotFound`] / [`BlockError::CommentNotFound`]
    /// - [`BlockError::Forbidden`] if `editor` is not the comment's author
    pub fn edit_comment(
        &self,
        block_id: Uuid,
        comment_id: Uuid,
        new_text: impl Into<String>,
        editor: Uuid,
    ) -> BlockResult<Comment> {
        let mut blocks = self.write();
        let block = blocks
            .get_mut(&block_id)
            .ok_or(BlockError::NotFound(block_id))?;
        block.comments.edit(comment_id, new_text, editor)
    }

    /// Delete a comment (optionally with its reply subtree).
    ///
    /// # Errors
    ///
    /// - [`BlockError::NotFound`] / [`BlockError::CommentNotFound`]
    /// - [`BlockError::HasChildren`] if `cascade` is false and replies exist
    pub fn delete_comment(
        &self,
        block_id: Uuid,
        comment_id: Uuid,
        cascade: bool,
    ) -> BlockResult<()> {
        let mut blocks = self.write();
        let block = blocks
            .get_mut(&block_id)
            .ok_or(BlockError::NotFound(block_id))?;
        block.comments.delete(comment_id, cascade)
    }

    /// Flatten a block's discussion depth-first, pre-order.
    ///
    /// Roots in insertion order, each comment immediately followed by its
    /// replies, recursively. Calling this twice with no intervening
    /// mutation returns identical sequences.
    pub fn thread(&self, block_id: Uuid) -> BlockResult<Vec<Comment>> {
        let blocks = self.read();
        let block = blocks.get(&block_id).ok_or(BlockError::NotFound(block_id))?;
        Ok(block.comments.iter().cloned().collect())
    }

    /// Total number of blocks in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Uuid {
        Uuid::now_v7()
    }

    fn text_body(s: &str) -> BlockBody {
        BlockBody::Text { text: s.into() }
    }

    #[test]
    fn test_create_and_get() {
        let store = BlockStore::new();
        let block = store
            .create(BlockKind::Text, text_body("hello"), author())
            .unwrap();

        let fetched = store.get(block.id).unwrap();
        assert_eq!(fetched, block);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_rejects_mismatched_body() {
        let store = BlockStore::new();
        let err = store
            .create(BlockKind::Table, text_body("not a grid"), author())
            .unwrap_err();
        assert!(matches!(err, BlockError::InvalidBody(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_missing_block_fails() {
        let store = BlockStore::new();
        let ghost = Uuid::now_v7();
        assert_eq!(store.get(ghost).unwrap_err(), BlockError::NotFound(ghost));
    }

    #[test]
    fn test_update_body_bumps_version() {
        let store = BlockStore::new();
        let alice = author();
        let block = store
            .create(BlockKind::Text, text_body("v1"), alice)
            .unwrap();

        let updated = store
            .update_body(block.id, text_body("v2"), alice, block.version)
            .unwrap();

        assert_eq!(updated.version, 2);
        assert!(updated.stamps.updated.at >= block.stamps.updated.at);
        assert_eq!(updated.body, text_body("v2"));
    }

    #[test]
    fn test_update_with_stale_version_conflicts() {
        let store = BlockStore::new();
        let alice = author();
        let bob = author();
        let block = store
            .create(BlockKind::Text, text_body("v1"), alice)
            .unwrap();

        // Both editors read version 1; Alice commits first.
        store
            .update_body(block.id, text_body("alice"), alice, 1)
            .unwrap();

        let err = store
            .update_body(block.id, text_body("bob"), bob, 1)
            .unwrap_err();
        assert_eq!(
            err,
            BlockError::VersionConflict {
                expected: 1,
                actual: 2
            }
        );
        // Bob re-reads and retries with the fresh token.
        let fresh = store.get(block.id).unwrap();
        store
            .update_body(block.id, text_body("bob"), bob, fresh.version)
            .unwrap();
        assert_eq!(store.get(block.id).unwrap().version, 3);
    }

    #[test]
    fn test_update_cannot_change_kind() {
        let store = BlockStore::new();
        let block = store
            .create(BlockKind::Text, text_body("prose"), author())
            .unwrap();

        let err = store
            .update_body(
                block.id,
                BlockBody::Math {
                    expression: "x^2".into(),
                },
                author(),
                block.version,
            )
            .unwrap_err();
        assert!(matches!(err, BlockError::InvalidBody(_)));
        assert_eq!(store.get(block.id).unwrap().version, 1);
    }

    #[test]
    fn test_delete_block() {
        let store = BlockStore::new();
        let block = store
            .create(BlockKind::Text, text_body("bye"), author())
            .unwrap();

        store.delete(block.id).unwrap();
        assert_eq!(
            store.delete(block.id).unwrap_err(),
            BlockError::NotFound(block.id)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_comment_flow_does_not_bump_version() {
        let store = BlockStore::new();
        let alice = author();
        let block = store
            .create(BlockKind::Text, text_body("discuss"), alice)
            .unwrap();

        let root = store.add_comment(block.id, None, alice, "root1").unwrap();
        store
            .add_comment(block.id, Some(root.id), alice, "child1")
            .unwrap();

        let after = store.get(block.id).unwrap();
        assert_eq!(after.version, block.version);
        assert_eq!(after.comments.len(), 2);
    }

    #[test]
    fn test_thread_is_preorder_and_idempotent() {
        let store = BlockStore::new();
        let alice = author();
        let block = store
            .create(BlockKind::Text, text_body("discuss"), alice)
            .unwrap();

        let a = store.add_comment(block.id, None, alice, "A").unwrap();
        let b = store.add_comment(block.id, None, alice, "B").unwrap();
        let c = store.add_comment(block.id, Some(a.id), alice, "C").unwrap();

        let first: Vec<Uuid> = store
            .thread(block.id)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(first, vec![a.id, c.id, b.id]);

        let second: Vec<Uuid> = store
            .thread(block.id)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_comment_ops_on_missing_block_fail() {
        let store = BlockStore::new();
        let ghost = Uuid::now_v7();
        assert_eq!(
            store
                .add_comment(ghost, None, author(), "hello?")
                .unwrap_err(),
            BlockError::NotFound(ghost)
        );
        assert_eq!(store.thread(ghost).unwrap_err(), BlockError::NotFound(ghost));
    }

    #[test]
    fn test_edit_comment_enforces_authorship() {
        let store = BlockStore::new();
        let alice = author();
        let mallory = author();
        let block = store
            .create(BlockKind::Text, text_body("discuss"), alice)
            .unwrap();
        let comment = store.add_comment(block.id, None, alice, "mine").unwrap();

        assert_eq!(
            store
                .edit_comment(block.id, comment.id, "stolen", mallory)
                .unwrap_err(),
            BlockError::Forbidden
        );
        let edited = store
            .edit_comment(block.id, comment.id, "still mine", alice)
            .unwrap();
        assert_eq!(edited.text, "still mine");
    }

    #[test]
    fn test_concurrent_comments_under_same_parent_both_survive() {
        let store = BlockStore::new();
        let alice = author();
        let block = store
            .create(BlockKind::Text, text_body("busy"), alice)
            .unwrap();
        let root = store.add_comment(block.id, None, alice, "root").unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let block_id = block.id;
            let parent = root.id;
            handles.push(std::thread::spawn(move || {
                store
                    .add_comment(block_id, Some(parent), Uuid::now_v7(), format!("reply {i}"))
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // No reply lost, regardless of interleaving.
        let thread = store.thread(block.id).unwrap();
        assert_eq!(thread.len(), 9);
    }
}
