//! Block body payloads
//!
//! This module provides the polymorphic block payload as a tagged union
//! keyed by the block's content kind, plus the single shape-validation
//! policy applied on every create and update. The set of shapes is closed:
//! one variant per [`BlockKind`], no open "any" payload.

use serde::{Deserialize, Serialize};

use crate::block::BlockKind;
use crate::error::{BlockError, BlockResult};

/// Polymorphic block payload.
///
/// Each variant corresponds to exactly one [`BlockKind`]; the JSON
/// representation carries the canonical kind name in a `kind` tag, matching
/// the wire form of the kind itself.
///
/// # Examples
///
/// ```
/// use knowledge_blocks::{BlockBody, BlockKind};
///
/// let body = BlockBody::Table {
///     rows: vec![vec!["h1".into(), "h2".into()]],
/// };
/// assert_eq!(body.kind(), BlockKind::Table);
/// assert!(body.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockBody {
    /// Plain prose
    Text {
        /// The prose content (may be empty)
        text: String,
    },

    /// Heading
    Title {
        /// Heading text
        text: String,
        /// Heading level, 1..=6
        level: u8,
    },

    /// Rectangular grid of cells
    Table {
        /// Rows of cells; all rows must have the same width
        rows: Vec<Vec<String>>,
    },

    /// Image reference
    #[serde(rename = "img")]
    Image {
        /// Where the image lives (URL or storage key)
        src: String,
        /// Display width in pixels
        width: u32,
        /// Display height in pixels
        height: u32,
    },

    /// Mathematical expression
    Math {
        /// The expression source (e.g. TeX)
        expression: String,
    },

    /// Chemical formula
    #[serde(rename = "chem")]
    Chemistry {
        /// The formula source
        formula: String,
    },
}

impl BlockBody {
    /// The content kind this payload is shaped for.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text { .. } => BlockKind::Text,
            Self::Title { .. } => BlockKind::Title,
            Self::Table { .. } => BlockKind::Table,
            Self::Image { .. } => BlockKind::Image,
            Self::Math { .. } => BlockKind::Math,
            Self::Chemistry { .. } => BlockKind::Chemistry,
        }
    }

    /// Validate the per-kind shape policy.
    ///
    /// - `Text` is unconstrained
    /// - `Title` needs non-empty text and a level in 1..=6
    /// - `Table` rows must all have the same width
    /// - `Image` needs a non-empty `src` and non-zero dimensions
    /// - `Math` / `Chemistry` need non-empty sources
    ///
    /// # Errors
    ///
    /// [`BlockError::InvalidBody`] describing the failed constraint.
    pub fn validate(&self) -> BlockResult<()> {
        match self {
            Self::Text { .. } => Ok(()),
            Self::Title { text, level } => {
                if text.is_empty() {
                    return Err(BlockError::InvalidBody("title text is empty".into()));
                }
                if !(1..=6).contains(level) {
                    return Err(BlockError::InvalidBody(format!(
                        "title level {level} is outside 1..=6"
                    )));
                }
                Ok(())
            }
            Self::Table { rows } => {
                let width = rows.first().map(Vec::len).unwrap_or(0);
                if rows.iter().any(|row| row.len() != width) {
                    return Err(BlockError::InvalidBody(
                        "table rows must all have the same width".into(),
                    ));
                }
                Ok(())
            }
            Self::Image { src, width, height } => {
                if src.is_empty() {
                    return Err(BlockError::InvalidBody("image src is empty".into()));
                }
                if *width == 0 || *height == 0 {
                    return Err(BlockError::InvalidBody(format!(
                        "image dimensions {width}x{height} are degenerate"
                    )));
                }
                Ok(())
            }
            Self::Math { expression } => {
                if expression.is_empty() {
                    return Err(BlockError::InvalidBody("math expression is empty".into()));
                }
                Ok(())
            }
            Self::Chemistry { formula } => {
                if formula.is_empty() {
                    return Err(BlockError::InvalidBody(
                        "chemistry formula is empty".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Validate this payload for a block of kind `kind`.
    ///
    /// Fails when the payload's variant does not match `kind`, then applies
    /// [`BlockBody::validate`].
    pub fn validate_for(&self, kind: BlockKind) -> BlockResult<()> {
        if self.kind() != kind {
            return Err(BlockError::InvalidBody(format!(
                "body is shaped for kind '{}', block is '{}'",
                self.kind(),
                kind
            )));
        }
        self.validate()
    }
}
