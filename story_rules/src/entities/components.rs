//! The mutable character summary and the items it holds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RulesError;
use crate::mechanics::{is_health_label, MutationAction, StructuredAction};

/// Realm label of a character nothing has happened to yet.
pub const DEFAULT_REALM: &str = "凡人";

/// Location of a character nothing has happened to yet.
pub const DEFAULT_LOCATION: &str = "未知";

/// A held item, rendered as a bare name or `name ×count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HeldItem {
    pub name: String,
    pub count: u32,
}

impl HeldItem {
    /// A single item.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
        }
    }

    /// A stack of `count` items.
    pub fn with_count(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }

    /// Parse the display form. Both `×` and the older ` x` separator are accepted;
    /// a suffix that is not a number stays part of the name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        for separator in [" ×", "×", " x"] {
            if let Some((name, count)) = text.rsplit_once(separator) {
                if let Ok(count) = count.trim().parse::<u32>() {
                    if !name.trim().is_empty() {
                        return Self::with_count(name.trim(), count);
                    }
                }
            }
        }
        Self::new(text)
    }
}

impl From<String> for HeldItem {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<HeldItem> for String {
    fn from(value: HeldItem) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for HeldItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 1 {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ×{}", self.name, self.count)
        }
    }
}

/// Materialized view of a character's state, derived from the mutation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub realm: String,
    pub location: String,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub items: Vec<HeldItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl Default for CharacterSummary {
    fn default() -> Self {
        Self {
            realm: DEFAULT_REALM.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            statuses: Vec::new(),
            items: Vec::new(),
            highlights: Vec::new(),
        }
    }
}

impl CharacterSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a structured action in place.
    ///
    /// On error the summary is left untouched.
    pub fn apply(&mut self, action: &StructuredAction) -> Result<(), RulesError> {
        let payload = action.payload.as_str();
        match action.action {
            MutationAction::Acquire => {
                let item = HeldItem::parse(payload);
                if !self.holds(&item.name) {
                    self.items.push(item);
                }
            }
            MutationAction::Use => {
                let index = self
                    .items
                    .iter()
                    .position(|item| item.name == payload)
                    .ok_or_else(|| RulesError::ItemNotHeld(payload.to_string()))?;
                self.items.remove(index);
            }
            MutationAction::Move => {
                self.location = payload.to_string();
            }
            MutationAction::Health => {
                self.statuses.retain(|tag| !is_health_label(tag));
                if !payload.is_empty() {
                    self.statuses.push(payload.to_string());
                }
            }
            MutationAction::Realm => {
                self.realm = payload.to_string();
            }
            MutationAction::Flag => {
                if !payload.is_empty() && !self.has_status(payload) {
                    self.statuses.push(payload.to_string());
                }
            }
        }
        Ok(())
    }

    /// Return a copy with the action applied.
    pub fn applied(&self, action: &StructuredAction) -> Result<Self, RulesError> {
        let mut next = self.clone();
        next.apply(action)?;
        Ok(next)
    }

    /// Check whether an item with this name is held.
    pub fn holds(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Held count for an item, zero if absent.
    pub fn item_count(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|item| item.name == name)
            .map(|item| item.count)
            .sum()
    }

    pub fn has_status(&self, tag: &str) -> bool {
        self.statuses.iter().any(|s| s == tag)
    }

    /// The current health label, if one has been recorded.
    pub fn health(&self) -> Option<&str> {
        self.statuses
            .iter()
            .map(String::as_str)
            .find(|tag| is_health_label(tag))
    }
}

/// State block written by older versions of the character card.
///
/// Only read, never written. Converted into [`CharacterSummary`] at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyState {
    #[serde(default = "LegacyState::default_health")]
    pub health: String,
    #[serde(default = "LegacyState::default_realm")]
    pub realm: String,
    #[serde(default = "LegacyState::default_mental_state")]
    pub mental_state: String,
    #[serde(default = "LegacyState::default_location")]
    pub location: String,
    #[serde(default)]
    pub inventory: BTreeMap<String, i64>,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl LegacyState {
    fn default_health() -> String {
        "健康".to_string()
    }

    fn default_realm() -> String {
        DEFAULT_REALM.to_string()
    }

    fn default_mental_state() -> String {
        "平稳".to_string()
    }

    fn default_location() -> String {
        DEFAULT_LOCATION.to_string()
    }
}

impl From<LegacyState> for CharacterSummary {
    fn from(state: LegacyState) -> Self {
        let mut summary = CharacterSummary {
            realm: if state.realm.is_empty() {
                DEFAULT_REALM.to_string()
            } else {
                state.realm
            },
            location: if state.location.is_empty() {
                DEFAULT_LOCATION.to_string()
            } else {
                state.location
            },
            ..CharacterSummary::default()
        };

        if !state.health.is_empty() && state.health != "健康" {
            summary.statuses.push(state.health);
        }
        if !state.mental_state.is_empty() && state.mental_state != "平稳" {
            summary.statuses.push(state.mental_state);
        }
        for flag in state.flags {
            if !flag.is_empty() && !summary.has_status(&flag) {
                summary.statuses.push(flag);
            }
        }
        for (name, count) in state.inventory {
            if count > 0 {
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                summary.items.push(HeldItem::with_count(name, count));
            }
        }
        summary
    }
}
