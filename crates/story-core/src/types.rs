use crate::error::{Result, StoryError};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// One entry of the fixed category table. A category without a
/// `heading` has no section in the global index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub prefix: &'static str,
    pub name: &'static str,
    pub folder: &'static str,
    pub heading: Option<&'static str>,
}

const CATEGORIES: &[Category] = &[
    Category {
        prefix: "F",
        name: "Foundations",
        folder: "foundations",
        heading: Some("### \u{1F3D7} Foundations (F)"),
    },
    Category {
        prefix: "A",
        name: "ASR Integration",
        folder: "asr-integration",
        heading: Some("### \u{1F399} ASR Integration (A)"),
    },
    Category {
        prefix: "L",
        name: "LLM Integration",
        folder: "llm-integration",
        heading: Some("### \u{1F9E0} LLM Integration (L)"),
    },
    Category {
        prefix: "T",
        name: "TTS Integration",
        folder: "tts-integration",
        heading: Some("### \u{1F5E3} TTS Integration (T)"),
    },
    Category {
        prefix: "X",
        name: "Tools",
        folder: "tools",
        heading: Some("### \u{1F6E0} Tools (X)"),
    },
    Category {
        prefix: "O",
        name: "Orchestration",
        folder: "orchestration",
        heading: Some("### \u{1F3BC} Orchestration (O)"),
    },
    Category {
        prefix: "E",
        name: "Reliability",
        folder: "reliability",
        heading: None,
    },
    Category {
        prefix: "S",
        name: "Parakeet Starter",
        folder: "parakeet-starter",
        heading: None,
    },
];

impl Category {
    pub fn all() -> &'static [Category] {
        CATEGORIES
    }

    pub fn from_prefix(prefix: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.prefix == prefix)
    }

    /// Resolve the category for a story id by its leading `X.` prefix.
    pub fn for_story_id(id: &str) -> Result<&'static Category> {
        let prefix = id.split('.').next().unwrap_or_default();
        Self::from_prefix(prefix).ok_or_else(|| StoryError::UnknownCategory(prefix.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Status labels
// ---------------------------------------------------------------------------

pub const STATUS_COMPLETE: &str = "\u{2705} Complete";
pub const STATUS_IN_PROGRESS: &str = "\u{1F6A7} In Progress";
pub const STATUS_BLOCKED: &str = "\u{26D4}\u{FE0F} Blocked";
pub const STATUS_TO_DO: &str = "\u{1F6A7} To Do";

/// Checked in order; the first key contained in the normalized input wins.
const STATUS_VOCABULARY: &[(&str, &str)] = &[
    ("complete", STATUS_COMPLETE),
    ("implemented", STATUS_COMPLETE),
    ("in progress", STATUS_IN_PROGRESS),
    ("blocked", STATUS_BLOCKED),
    ("not started", STATUS_TO_DO),
    ("todo", STATUS_TO_DO),
    ("to do", STATUS_TO_DO),
];

/// Map a free-text status onto the index label vocabulary.
/// Unmatched input is returned unchanged.
pub fn status_label(status: &str) -> String {
    let normalized = status.trim().to_lowercase().replace(['-', '_'], " ");
    STATUS_VOCABULARY
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| status.to_string())
}

// ---------------------------------------------------------------------------
// UpsertOutcome
// ---------------------------------------------------------------------------

/// Serialized with the same spelling as `as_str`, so JSON and human output agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Exists,
    #[serde(rename = "missing index")]
    MissingIndex,
    #[serde(rename = "missing heading")]
    MissingHeading,
    #[serde(rename = "missing table")]
    MissingTable,
    Skipped,
}

impl UpsertOutcome {
    /// True when the index file content was changed.
    pub fn changed(self) -> bool {
        matches!(self, UpsertOutcome::Inserted | UpsertOutcome::Updated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Updated => "updated",
            UpsertOutcome::Exists => "exists",
            UpsertOutcome::MissingIndex => "missing index",
            UpsertOutcome::MissingHeading => "missing heading",
            UpsertOutcome::MissingTable => "missing table",
            UpsertOutcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
