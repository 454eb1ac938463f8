use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::chords::{ChordPart, parse_text_with_chords};
use crate::model::ids::StudentId;
use crate::model::link::{ResourceLink, deserialize_links};

//
// ─── ITEM STATUS ───────────────────────────────────────────────────────────────
//

/// Completion state of a single checklist task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ItemStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
}

impl ItemStatus {
    /// Parses a spreadsheet cell into a status.
    ///
    /// Only the three status labels are recognised. Matching ignores case,
    /// whitespace and separators, so `"in progress"`, `"In-Progress"` and
    /// `"IN_PROGRESS"` are equivalent. Anything else, including an empty cell
    /// or a near-synonym such as `"done"`, is `NotStarted`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "completed" => Self::Completed,
            "inprogress" => Self::InProgress,
            _ => Self::NotStarted,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::NotStarted => "Not Started",
        }
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::NotStarted, Self::parse_lenient))
    }
}

//
// ─── PROGRESS ITEM ─────────────────────────────────────────────────────────────
//

/// One checklist entry for a student within a grade.
///
/// Deserialization is lenient: missing fields default, and
/// `resource_links` accepts a delimited string, a list of URLs, or a list of
/// `{url, title}` records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressItem {
    #[serde(default)]
    pub student_id: StudentId,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub item_status: ItemStatus,
    #[serde(default, deserialize_with = "deserialize_links")]
    pub resource_links: Vec<ResourceLink>,
}

impl ProgressItem {
    /// `detail` split into plain text and inline chord markers.
    #[must_use]
    pub fn detail_parts(&self) -> Vec<ChordPart> {
        parse_text_with_chords(&self.detail)
    }

    /// Rows with neither a category nor a detail carry no task.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.category.trim().is_empty() && self.detail.trim().is_empty()
    }
}

// Serialized output carries the parsed `detail_parts` alongside `detail`.
impl Serialize for ProgressItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ProgressItem", 7)?;
        state.serialize_field("student_id", &self.student_id)?;
        state.serialize_field("grade", &self.grade)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("detail", &self.detail)?;
        state.serialize_field("detail_parts", &self.detail_parts())?;
        state.serialize_field("item_status", &self.item_status)?;
        state.serialize_field("resource_links", &self.resource_links)?;
        state.end()
    }
}
