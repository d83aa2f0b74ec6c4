//! Core knowledge-entry type definitions.
//!
//! Defines [`EntryType`] (the closed category set), [`KnowledgeEntry`] (a full
//! record), and the caller-facing input shapes [`NewEntry`] and [`EntryPatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relevance assigned when the caller does not provide one.
pub const DEFAULT_RELEVANCE: f64 = 0.5;

/// Provenance label assigned when the caller does not provide one.
pub const DEFAULT_SOURCE: &str = "Manual Entry";

/// Categorical tag for a knowledge entry. Closed set — anything else is
/// rejected at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Recurring habits and schedules.
    Routine,
    /// Project facts, decisions, and status notes.
    Project,
    /// Goals and their progress context.
    Goal,
    /// Calendar and scheduling knowledge.
    Calendar,
    /// Free-standing observations and lessons learned.
    Insight,
    /// Anything that fits no other category. The default.
    General,
}

impl EntryType {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Project => "project",
            Self::Goal => "goal",
            Self::Calendar => "calendar",
            Self::Insight => "insight",
            Self::General => "general",
        }
    }
}

impl Default for EntryType {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routine" => Ok(Self::Routine),
            "project" => Ok(Self::Project),
            "goal" => Ok(Self::Goal),
            "calendar" => Ok(Self::Calendar),
            "insight" => Ok(Self::Insight),
            "general" => Ok(Self::General),
            _ => Err(format!("unknown entry type: {s}")),
        }
    }
}

/// A knowledge entry record, matching the `entries` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// UUID v7 (time-sortable), assigned at creation, immutable.
    pub id: String,
    /// Identity of the owning user. Immutable; scopes every query.
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// Category of this entry.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Caller-assigned score in `[0.0, 1.0]`, independent of any query.
    pub relevance: f64,
    /// Ordered free-text labels.
    pub tags: Vec<String>,
    /// Provenance label (e.g. `"Manual Entry"`).
    pub source: String,
    /// Arbitrary JSON object, opaque to the retrieval core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Fixed-length vector derived from `title + " " + content`. Internal —
    /// never serialized to callers.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// Set to the read time on every successful fetch-by-id.
    pub last_accessed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    /// The text the embedding is derived from.
    pub fn embedded_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// Caller-supplied fields for a new entry. Unset optionals fall back to
/// documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub relevance: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

/// A partial update. Every field is optional; unset fields keep their stored
/// value. A patch with nothing set is rejected as `NoChanges` rather than
/// silently succeeding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub relevance: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

impl EntryPatch {
    /// `true` when no recognized field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.entry_type.is_none()
            && self.tags.is_none()
            && self.source.is_none()
            && self.relevance.is_none()
            && self.metadata.is_none()
    }

    /// `true` when the patch changes the embedded text.
    pub fn touches_text(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }

    /// The text the embedding must be recomputed from: the patched title and
    /// content where provided, the stored values where not. A caller may
    /// update only one of the two fields, so the payload alone is never
    /// enough.
    pub fn merged_text(&self, current: &KnowledgeEntry) -> String {
        let title = self.title.as_deref().unwrap_or(&current.title);
        let content = self.content.as_deref().unwrap_or(&current.content);
        format!("{title} {content}")
    }
}

/// Confirmation returned from a delete — the entry's prior identity, not its
/// content.
#[derive(Debug, Serialize)]
pub struct DeleteReceipt {
    pub id: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(title: &str, content: &str) -> KnowledgeEntry {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        KnowledgeEntry {
            id: "test-id".into(),
            owner_id: "owner".into(),
            title: title.into(),
            content: content.into(),
            entry_type: EntryType::General,
            relevance: DEFAULT_RELEVANCE,
            tags: vec![],
            source: DEFAULT_SOURCE.into(),
            metadata: None,
            embedding: vec![],
            last_accessed: t,
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn entry_type_round_trips_through_strings() {
        for t in [
            EntryType::Routine,
            EntryType::Project,
            EntryType::Goal,
            EntryType::Calendar,
            EntryType::Insight,
            EntryType::General,
        ] {
            assert_eq!(t.as_str().parse::<EntryType>().unwrap(), t);
        }
        assert!("reminder".parse::<EntryType>().is_err());
    }

    #[test]
    fn embedded_text_joins_title_and_content() {
        let e = entry("Morning Routine", "Consistency improves outcomes");
        assert_eq!(e.embedded_text(), "Morning Routine Consistency improves outcomes");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(EntryPatch::default().is_empty());
        let patch = EntryPatch {
            tags: Some(vec!["a".into()]),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(!patch.touches_text());
    }

    #[test]
    fn merged_text_overlays_patch_on_stored_values() {
        let current = entry("Old Title", "Old content");

        let title_only = EntryPatch {
            title: Some("New Title".into()),
            ..Default::default()
        };
        assert_eq!(title_only.merged_text(&current), "New Title Old content");

        let content_only = EntryPatch {
            content: Some("New content".into()),
            ..Default::default()
        };
        assert_eq!(content_only.merged_text(&current), "Old Title New content");

        let both = EntryPatch {
            title: Some("New Title".into()),
            content: Some("New content".into()),
            ..Default::default()
        };
        assert_eq!(both.merged_text(&current), "New Title New content");
    }

    #[test]
    fn embedding_is_not_serialized() {
        let mut e = entry("Title", "Content");
        e.embedding = vec![1.0; 4];
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["type"], "general");
    }
}
