//! Story mechanics: structured mutation actions, health vocabulary and chapter ordering.

mod chapter;

pub use chapter::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RulesError;

/// Mutually exclusive health labels. Setting one removes the others.
pub const HEALTH_LABELS: [&str; 6] = ["健康", "轻伤", "重伤", "濒死", "死亡", "康复"];

/// Check whether a status tag belongs to the health vocabulary.
pub fn is_health_label(tag: &str) -> bool {
    HEALTH_LABELS.contains(&tag)
}

/// The closed set of state-changing verbs a mutation may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    /// Add an item unless one with the same name is held.
    Acquire,
    /// Remove a held item.
    Use,
    /// Set the current location.
    Move,
    /// Replace the health label.
    Health,
    /// Set the realm/rank label.
    Realm,
    /// Add a free-form status tag.
    Flag,
}

impl MutationAction {
    pub const ALL: [MutationAction; 6] = [
        MutationAction::Acquire,
        MutationAction::Use,
        MutationAction::Move,
        MutationAction::Health,
        MutationAction::Realm,
        MutationAction::Flag,
    ];

    /// The keyword used in `action:payload` expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Acquire => "acquire",
            MutationAction::Use => "use",
            MutationAction::Move => "move",
            MutationAction::Health => "health",
            MutationAction::Realm => "realm",
            MutationAction::Flag => "flag",
        }
    }

    /// Whether the action is meaningless without a payload.
    pub fn requires_payload(&self) -> bool {
        match self {
            MutationAction::Acquire
            | MutationAction::Use
            | MutationAction::Move
            | MutationAction::Realm => true,
            MutationAction::Health | MutationAction::Flag => false,
        }
    }
}

impl FromStr for MutationAction {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_lowercase();
        MutationAction::ALL
            .into_iter()
            .find(|action| action.as_str() == keyword)
            .ok_or(RulesError::UnsupportedAction(keyword))
    }
}

impl std::fmt::Display for MutationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `action:payload` expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredAction {
    pub action: MutationAction,
    pub payload: String,
}

impl StructuredAction {
    /// Create an action with the given payload.
    pub fn new(action: MutationAction, payload: impl Into<String>) -> Self {
        Self {
            action,
            payload: payload.into(),
        }
    }

    /// Parse an `action:payload` expression.
    ///
    /// The action keyword is trimmed and case-folded, the payload is trimmed.
    /// Only the first `:` separates the two halves.
    pub fn parse(expr: &str) -> Result<Self, RulesError> {
        let (action, payload) = expr
            .split_once(':')
            .ok_or_else(|| RulesError::MalformedExpression(expr.to_string()))?;
        let action: MutationAction = action.parse()?;
        let payload = payload.trim();

        if payload.is_empty() && action.requires_payload() {
            return Err(RulesError::EmptyPayload(action.as_str().to_string()));
        }

        Ok(Self::new(action, payload))
    }
}

impl FromStr for StructuredAction {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for StructuredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.action, self.payload)
    }
}
