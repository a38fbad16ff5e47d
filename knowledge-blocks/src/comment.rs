//! Threaded comments
//!
//! This module provides the discussion attached to a block: an ordered
//! forest of comments, each with an ordered sequence of nested replies.
//! Nodes are only ever created fresh and attached at creation time, never
//! re-attached, so the forest is acyclic by construction. Sibling order is
//! insertion order and is preserved by every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use knowledge_core::stamp::touch_instant;

use crate::error::{BlockError, BlockResult};

/// A single comment in a block's discussion.
///
/// # Examples
///
/// ```
/// use knowledge_blocks::CommentForest;
/// use uuid::Uuid;
///
/// let mut forest = CommentForest::default();
/// let author = Uuid::now_v7();
/// let root = forest.add(None, author, "first!").unwrap();
/// let reply = forest.add(Some(root.id), author, "replying").unwrap();
/// assert_eq!(forest.get(reply.id).unwrap().text, "replying");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier, unique within the owning block
    pub id: Uuid,

    /// User ID of the comment author
    pub author_id: Uuid,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,

    /// When the comment text was last edited
    pub updated_at: DateTime<Utc>,

    /// The comment text
    pub text: String,

    /// Replies, in insertion order
    #[serde(default)]
    pub children: Vec<Comment>,
}

impl Comment {
    fn new(author_id: Uuid, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            author_id,
            created_at: now,
            updated_at: now,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Check if this comment has replies.
    pub fn has_replies(&self) -> bool {
        !self.children.is_empty()
    }
}

// The derived drop glue recurses once per reply level; drain the subtree
// onto a work list instead so deep threads drop in constant stack space.
impl Drop for Comment {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut comment) = stack.pop() {
            stack.append(&mut comment.children);
        }
    }
}

/// The ordered forest of comments attached to one block.
///
/// Roots are comments posted directly on the block; replies hang under
/// their parent comment at unbounded depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForest {
    /// Top-level comments, in insertion order
    #[serde(default)]
    roots: Vec<Comment>,
}

impl CommentForest {
    /// Add a comment.
    ///
    /// With `parent_id` absent the comment becomes a new root of the
    /// forest; otherwise it is appended to the parent's replies. Both
    /// timestamps are set to the current instant.
    ///
    /// # Errors
    ///
    /// [`BlockError::CommentNotFound`] if `parent_id` references no comment
    /// in this forest.
    pub fn add(
        &mut self,
        parent_id: Option<Uuid>,
        author_id: Uuid,
        text: impl Into<String>,
    ) -> BlockResult<Comment> {
        let comment = Comment::new(author_id, text);
        let slot = match parent_id {
            None => &mut self.roots,
            Some(parent_id) => {
                &mut find_mut(&mut self.roots, parent_id)
                    .ok_or(BlockError::CommentNotFound(parent_id))?
                    .children
            }
        };
        slot.push(comment.clone());
        Ok(comment)
    }

    /// Edit a comment's text.
    ///
    /// Only the original author may edit; richer authorization policy is a
    /// collaborator's concern, but mismatched editors are rejected here as
    /// a structural check. Refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// - [`BlockError::CommentNotFound`] if the comment is missing
    /// - [`BlockError::Forbidden`] if `editor` is not the author
    pub fn edit(
        &mut self,
        comment_id: Uuid,
        new_text: impl Into<String>,
        editor: Uuid,
    ) -> BlockResult<Comment> {
        let comment = find_mut(&mut self.roots, comment_id)
            .ok_or(BlockError::CommentNotFound(comment_id))?;
        if comment.author_id != editor {
            return Err(BlockError::Forbidden);
        }
        comment.text = new_text.into();
        comment.updated_at = touch_instant(comment.updated_at);
        Ok(comment.clone())
    }

    /// Delete a comment.
    ///
    /// Without `cascade` the comment must have no replies; with `cascade`
    /// the whole reply subtree goes with it.
    ///
    /// # Errors
    ///
    /// - [`BlockError::CommentNotFound`] if the comment is missing
    /// - [`BlockError::HasChildren`] if `cascade` is false and replies exist
    pub fn delete(&mut self, comment_id: Uuid, cascade: bool) -> BlockResult<()> {
        delete_in(&mut self.roots, comment_id, cascade)
            .unwrap_or(Err(BlockError::CommentNotFound(comment_id)))
    }

    /// Get a comment by ID.
    pub fn get(&self, comment_id: Uuid) -> Option<&Comment> {
        self.iter().find(|c| c.id == comment_id)
    }

    /// Top-level comments, in insertion order.
    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    /// Flatten the forest depth-first, pre-order.
    ///
    /// Roots in insertion order, each comment immediately followed by its
    /// replies in insertion order, recursively. Iterative (explicit stack),
    /// so arbitrarily deep threads cannot overflow the call stack.
    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        let mut stack: Vec<&Comment> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let comment = stack.pop()?;
            stack.extend(comment.children.iter().rev());
            Some(comment)
        })
    }

    /// Total number of comments in the forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check whether the forest has no comments.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Find a comment anywhere in `nodes` by ID, mutably.
///
/// Iterative (explicit work stack), like [`CommentForest::iter`]: thread
/// depth is bounded by memory, not by call-stack size.
fn find_mut(nodes: &mut [Comment], id: Uuid) -> Option<&mut Comment> {
    let mut stack: Vec<&mut Comment> = nodes.iter_mut().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter_mut());
    }
    None
}

/// Delete `id` from `roots` or any reply list below it.
///
/// Iterative over the reply lists, for the same reason as [`find_mut`].
/// `None` means the comment was not found anywhere in the forest.
fn delete_in(roots: &mut Vec<Comment>, id: Uuid, cascade: bool) -> Option<BlockResult<()>> {
    let mut stack: Vec<&mut Vec<Comment>> = vec![roots];
    while let Some(nodes) = stack.pop() {
        if let Some(pos) = nodes.iter().position(|c| c.id == id) {
            if !cascade && nodes[pos].has_replies() {
                return Some(Err(BlockError::HasChildren(id)));
            }
            nodes.remove(pos);
            return Some(Ok(()));
        }
        stack.extend(nodes.iter_mut().map(|node| &mut node.children));
    }
    None
}
