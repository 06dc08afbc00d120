//! Validation errors raised by the story rules.

use thiserror::Error;

/// Errors from validating structured actions and world graph writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("mutation expression must look like `action:payload`, got `{0}`")]
    MalformedExpression(String),

    #[error("unsupported mutation action: {0}")]
    UnsupportedAction(String),

    #[error("mutation action `{0}` needs a non-empty payload")]
    EmptyPayload(String),

    #[error("cannot use `{0}`: item is not held")]
    ItemNotHeld(String),

    #[error("weight must be between 1 and 10, got {0}")]
    WeightOutOfRange(i64),

    #[error("relation {role} entity does not exist: {id}")]
    UnknownEntity { role: &'static str, id: String },
}
