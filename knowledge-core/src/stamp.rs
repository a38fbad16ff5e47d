//! Authorship stamps
//!
//! This module provides the timestamp/attribution primitives used by every
//! mutable entity on the platform: a single authored instant ([`Stamp`]) and
//! the created/updated pair carried by entities ([`AuditStamps`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Next value for an entity's update clock.
///
/// Returns the current instant, clamped so it never moves backwards
/// relative to `previous`. Every `updated_at` field on the platform is
/// advanced through this, which keeps update clocks monotonically
/// non-decreasing even when the wall clock steps backwards.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use knowledge_core::stamp::touch_instant;
///
/// let future = Utc::now() + Duration::hours(1);
/// assert_eq!(touch_instant(future), future);
/// ```
pub fn touch_instant(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}

/// A wall-clock instant attributed to an author.
///
/// Stamps record *who* did something and *when*. They are plain data and
/// never interpreted beyond ordering on `at`.
///
/// # Examples
///
/// ```
/// use knowledge_core::Stamp;
/// use uuid::Uuid;
///
/// let author = Uuid::now_v7();
/// let stamp = Stamp::now(author);
/// assert_eq!(stamp.author, author);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// When the action happened
    pub at: DateTime<Utc>,

    /// User ID of the actor
    pub author: Uuid,
}

impl Stamp {
    /// Creates a stamp for the current instant.
    ///
    /// # Arguments
    ///
    /// * `author` - The user ID performing the action
    pub fn now(author: Uuid) -> Self {
        Self {
            at: Utc::now(),
            author,
        }
    }
}

/// Created/updated metadata for a mutable entity.
///
/// The `updated` stamp is refreshed on every content mutation and is
/// monotonically non-decreasing: if the wall clock steps backwards between
/// mutations, the previous `updated.at` is kept rather than moving time
/// backwards.
///
/// # Examples
///
/// ```
/// use knowledge_core::AuditStamps;
/// use uuid::Uuid;
///
/// let author = Uuid::now_v7();
/// let mut stamps = AuditStamps::new(author);
/// let before = stamps.updated.at;
///
/// stamps.touch(author);
/// assert!(stamps.updated.at >= before);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamps {
    /// Who created the entity, and when
    pub created: Stamp,

    /// Who last mutated the entity, and when
    pub updated: Stamp,
}

impl AuditStamps {
    /// Creates audit stamps for a freshly constructed entity.
    ///
    /// Both stamps are set to the same creation instant and author, so a
    /// never-mutated entity satisfies `created == updated`.
    ///
    /// # Arguments
    ///
    /// * `author` - The user ID creating the entity
    pub fn new(author: Uuid) -> Self {
        let stamp = Stamp::now(author);
        Self {
            created: stamp,
            updated: stamp,
        }
    }

    /// Refresh the `updated` stamp for a mutation by `author`.
    ///
    /// `updated.at` never decreases: the new instant is clamped to the
    /// previous `updated.at` if the clock has stepped backwards.
    ///
    /// # Arguments
    ///
    /// * `author` - The user ID performing the mutation
    pub fn touch(&mut self, author: Uuid) {
        self.updated = Stamp {
            at: touch_instant(self.updated.at),
            author,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_stamps_are_equal() {
        let author = Uuid::now_v7();
        let stamps = AuditStamps::new(author);

        assert_eq!(stamps.created, stamps.updated);
        assert_eq!(stamps.created.author, author);
    }

    #[test]
    fn test_touch_updates_author() {
        let author = Uuid::now_v7();
        let editor = Uuid::now_v7();
        let mut stamps = AuditStamps::new(author);

        stamps.touch(editor);

        assert_eq!(stamps.created.author, author);
        assert_eq!(stamps.updated.author, editor);
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let author = Uuid::now_v7();
        let mut stamps = AuditStamps::new(author);

        // Simulate a prior update recorded in the future (clock skew).
        stamps.updated.at = Utc::now() + Duration::hours(1);
        let skewed = stamps.updated.at;

        stamps.touch(author);

        assert_eq!(stamps.updated.at, skewed);
    }

    #[test]
    fn test_touch_is_monotonic_across_calls() {
        let author = Uuid::now_v7();
        let mut stamps = AuditStamps::new(author);

        let mut previous = stamps.updated.at;
        for _ in 0..10 {
            stamps.touch(author);
            assert!(stamps.updated.at >= previous);
            previous = stamps.updated.at;
        }
    }

    #[test]
    fn test_stamp_serde_roundtrip() {
        let stamp = Stamp::now(Uuid::now_v7());
        let json = serde_json::to_string(&stamp).unwrap();
        let parsed: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(stamp, parsed);
    }

    #[test]
    fn test_audit_stamps_serde_roundtrip() {
        let stamps = AuditStamps::new(Uuid::now_v7());
        let json = serde_json::to_string(&stamps).unwrap();
        let parsed: AuditStamps = serde_json::from_str(&json).unwrap();
        assert_eq!(stamps, parsed);
    }
}
