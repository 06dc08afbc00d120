//! Append-only timeline records describing character changes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CharacterId;
use crate::error::RulesError;
use crate::mechanics::{ChapterOrder, MutationAction, StructuredAction};

/// One immutable entry in a character's mutation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MutationRecord", into = "MutationRecord")]
pub struct StateMutation {
    pub mutation_id: String,
    pub chapter_id: String,
    pub timestamp: DateTime<Utc>,
    /// Structured change; `None` for note-only entries.
    pub action: Option<StructuredAction>,
    pub note: String,
}

impl StateMutation {
    /// Build the id of the `n`-th mutation (1-based) of a character.
    pub fn mutation_id_for(character: &CharacterId, n: usize) -> String {
        format!("{}_{:04}", character, n)
    }

    /// Sort key of the chapter this mutation is attributed to.
    pub fn chapter_order(&self) -> ChapterOrder {
        ChapterOrder::of(&self.chapter_id)
    }

    /// Whether this entry changes the summary on replay.
    pub fn is_structured(&self) -> bool {
        self.action.is_some()
    }
}

/// Payload as stored on disk: a plain string, or the key/value map older logs used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PayloadField {
    Text(String),
    Map(BTreeMap<String, String>),
}

impl PayloadField {
    fn into_text(self, action: MutationAction) -> String {
        match self {
            PayloadField::Text(text) => text,
            PayloadField::Map(mut map) => {
                if let Some(raw) = map.remove("raw") {
                    return raw;
                }
                let key = match action {
                    MutationAction::Acquire | MutationAction::Use => "item",
                    MutationAction::Move => "location",
                    MutationAction::Health => "health",
                    MutationAction::Realm => "realm",
                    MutationAction::Flag => "flag",
                };
                map.remove(key).unwrap_or_default()
            }
        }
    }
}

/// On-disk shape of a mutation. Also accepts the older layout with a
/// payload map, a separate `reason` and naive ISO timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MutationRecord {
    mutation_id: String,
    chapter_id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<PayloadField>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    note: String,
    #[serde(default, skip_serializing)]
    reason: Option<String>,
}

impl TryFrom<MutationRecord> for StateMutation {
    type Error = RulesError;

    fn try_from(record: MutationRecord) -> Result<Self, Self::Error> {
        let action = match record.action.filter(|a| !a.trim().is_empty()) {
            Some(keyword) => {
                let action: MutationAction = keyword.parse()?;
                let payload = record
                    .payload
                    .map(|p| p.into_text(action))
                    .unwrap_or_default();
                Some(StructuredAction::new(action, payload.trim()))
            }
            None => None,
        };

        let note = if record.note.trim().is_empty() {
            record.reason.unwrap_or_default()
        } else {
            record.note
        };

        Ok(StateMutation {
            mutation_id: record.mutation_id,
            chapter_id: record.chapter_id,
            timestamp: parse_timestamp(&record.timestamp),
            action,
            note,
        })
    }
}

impl From<StateMutation> for MutationRecord {
    fn from(mutation: StateMutation) -> Self {
        let (action, payload) = match mutation.action {
            Some(action) => (
                Some(action.action.as_str().to_string()),
                Some(PayloadField::Text(action.payload)),
            ),
            None => (None, None),
        };
        MutationRecord {
            mutation_id: mutation.mutation_id,
            chapter_id: mutation.chapter_id,
            timestamp: mutation.timestamp.to_rfc3339(),
            action,
            payload,
            note: mutation.note,
            reason: None,
        }
    }
}

/// Parse an RFC 3339 or naive ISO timestamp; unreadable values fall back to the epoch.
fn parse_timestamp(text: &str) -> DateTime<Utc> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return ts.with_timezone(&Utc);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
