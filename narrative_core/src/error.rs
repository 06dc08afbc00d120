//! Errors surfaced by the narrative engine.

use story_rules::RulesError;
use thiserror::Error;

use crate::foreshadowing::Status;

/// Errors from engine operations. Every variant is local to one call.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("character already exists: {0}")]
    CharacterExists(String),

    #[error("character not found: {0}")]
    CharacterNotFound(String),

    #[error("a mutation needs a structured change or a note")]
    EmptyMutation,

    #[error("foreshadowing node not found: {0}")]
    UnknownNode(String),

    #[error("edge target is neither a known node nor a recovery point: {0}")]
    UnknownEdgeTarget(String),

    #[error("status transition {from} -> {to} is not allowed")]
    ForbiddenTransition { from: Status, to: Status },

    #[error("unknown foreshadowing {kind}: {value}")]
    UnknownLabel { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, NarrativeError>;
