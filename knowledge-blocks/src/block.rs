//! Block domain model
//!
//! This module provides the typed content block: a standalone addressable
//! document unit with a fixed content kind, a polymorphic body shaped by
//! that kind, versioned authorship metadata, and a threaded discussion.
//! Blocks do not belong to a larger "document" aggregate; composition of
//! blocks into pages is a concern of some future collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use knowledge_core::AuditStamps;

use crate::body::BlockBody;
use crate::comment::CommentForest;
use crate::error::{BlockError, BlockResult};

/// Content kind of a block.
///
/// A closed set: the platform recognizes exactly these six kinds, keyed by
/// stable numeric tags 1..=6 for compact storage. The serialized form at
/// the API boundary is always the canonical lowercase name from
/// [`BlockKind::as_str`], never the numeric tag, so internal renumbering
/// cannot break the wire format.
///
/// # Examples
///
/// ```
/// use knowledge_blocks::BlockKind;
///
/// assert_eq!(BlockKind::from_tag(3).unwrap(), BlockKind::Table);
/// assert_eq!(BlockKind::Table.as_str(), "table");
/// assert!(BlockKind::from_tag(7).is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Plain prose content
    Text = 1,

    /// Heading content
    Title = 2,

    /// Rectangular grid of cells
    Table = 3,

    /// Image reference with dimensions
    #[serde(rename = "img")]
    Image = 4,

    /// Mathematical expression
    Math = 5,

    /// Chemical formula
    #[serde(rename = "chem")]
    Chemistry = 6,
}

impl BlockKind {
    /// Resolve a numeric type tag to its kind.
    ///
    /// Total over the closed set 1..=6; anything else is
    /// [`BlockError::UnknownBlockType`] rather than a sentinel value a
    /// caller could mistake for data.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowledge_blocks::BlockKind;
    ///
    /// assert_eq!(BlockKind::from_tag(1).unwrap(), BlockKind::Text);
    /// assert_eq!(BlockKind::from_tag(6).unwrap(), BlockKind::Chemistry);
    /// assert!(BlockKind::from_tag(0).is_err());
    /// ```
    pub fn from_tag(tag: u8) -> BlockResult<Self> {
        match tag {
            1 => Ok(Self::Text),
            2 => Ok(Self::Title),
            3 => Ok(Self::Table),
            4 => Ok(Self::Image),
            5 => Ok(Self::Math),
            6 => Ok(Self::Chemistry),
            other => Err(BlockError::UnknownBlockType(other)),
        }
    }

    /// Get the stable numeric tag for this kind.
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Parse a kind from its canonical name.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(BlockKind)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use knowledge_blocks::BlockKind;
    ///
    /// assert_eq!(BlockKind::parse("img"), Some(BlockKind::Image));
    /// assert_eq!(BlockKind::parse("TABLE"), Some(BlockKind::Table));
    /// assert_eq!(BlockKind::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "title" => Some(Self::Title),
            "table" => Some(Self::Table),
            "img" => Some(Self::Image),
            "math" => Some(Self::Math),
            "chem" => Some(Self::Chemistry),
            _ => None,
        }
    }

    /// Get the canonical lowercase name of the kind.
    ///
    /// This is the serialized form at the API boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Title => "title",
            Self::Table => "table",
            Self::Image => "img",
            Self::Math => "math",
            Self::Chemistry => "chem",
        }
    }

    /// Get a human-readable display name for the kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Title => "Title",
            Self::Table => "Table",
            Self::Image => "Image",
            Self::Math => "Math",
            Self::Chemistry => "Chemistry",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A standalone typed content block.
///
/// The kind is fixed at creation; only the body (and the discussion
/// attached to the block) mutate afterwards. Every body mutation bumps
/// `version` and refreshes `stamps.updated`, which is what the optimistic
/// concurrency check in [`crate::BlockStore::update_body`] keys on.
///
/// # Examples
///
/// ```
/// use knowledge_blocks::{Block, BlockBody, BlockKind};
/// use uuid::Uuid;
///
/// let author = Uuid::now_v7();
/// let block = Block::new(
///     BlockKind::Text,
///     BlockBody::Text { text: "hello".into() },
///     author,
/// )
/// .unwrap();
/// assert_eq!(block.version, 1);
/// assert_eq!(block.stamps.created, block.stamps.updated);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlockRecord")]
pub struct Block {
    /// Unique identifier for the block
    pub id: Uuid,

    /// Content kind (immutable after creation)
    pub kind: BlockKind,

    /// Version token for optimistic concurrency, starting at 1
    pub version: u64,

    /// Created/updated authorship stamps
    pub stamps: AuditStamps,

    /// Polymorphic payload, shaped by `kind`
    pub body: BlockBody,

    /// Threaded discussion attached to the block
    pub comments: CommentForest,
}

/// Raw persisted form of a [`Block`].
///
/// Deserialization goes through this record so the kind/body shape check
/// holds on every construction path, not just [`Block::new`].
#[derive(Deserialize)]
struct BlockRecord {
    id: Uuid,
    kind: BlockKind,
    version: u64,
    stamps: AuditStamps,
    body: BlockBody,
    #[serde(default)]
    comments: CommentForest,
}

impl TryFrom<BlockRecord> for Block {
    type Error = BlockError;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        record.body.validate_for(record.kind)?;
        Ok(Self {
            id: record.id,
            kind: record.kind,
            version: record.version,
            stamps: record.stamps,
            body: record.body,
            comments: record.comments,
        })
    }
}

impl Block {
    /// Creates a new block.
    ///
    /// Both stamps are set to the creation instant/author and the version
    /// starts at 1.
    ///
    /// # Errors
    ///
    /// [`BlockError::InvalidBody`] if `body` is not shaped for `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowledge_blocks::{Block, BlockBody, BlockKind};
    /// use uuid::Uuid;
    ///
    /// let err = Block::new(
    ///     BlockKind::Table,
    ///     BlockBody::Text { text: "not a grid".into() },
    ///     Uuid::now_v7(),
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.error_code(), "INVALID_BODY");
    /// ```
    pub fn new(kind: BlockKind, body: BlockBody, author: Uuid) -> BlockResult<Self> {
        body.validate_for(kind)?;
        Ok(Self {
            id: Uuid::now_v7(),
            kind,
            version: 1,
            stamps: AuditStamps::new(author),
            body,
            comments: CommentForest::default(),
        })
    }

    /// Replace the block's body.
    ///
    /// The kind is immutable, so the new body must be shaped for the
    /// existing `kind`. On success the version is bumped and
    /// `stamps.updated` refreshed. The version *token* check against a
    /// caller-supplied expected version lives in
    /// [`crate::BlockStore::update_body`]; this method is the unconditional
    /// mutation beneath it.
    pub fn set_body(&mut self, body: BlockBody, author: Uuid) -> BlockResult<()> {
        body.validate_for(self.kind)?;
        self.body = body;
        self.version += 1;
        self.stamps.touch(author);
        Ok(())
    }

    /// Canonical lowercase name of the block's kind.
    pub fn type_name(&self) -> &'static str {
        self.kind.as_str()
    }
}
