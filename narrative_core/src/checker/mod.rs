//! Consistency checker - validates a draft against constraints and annotations.
//!
//! Checks are stateless. Forbidden tokens are always errors and missing
//! required tokens always warnings; annotation findings are routed by the
//! per-call `strict` flag.

mod characters;
mod scenes;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use story_rules::{CharacterId, CharacterSummary};

use crate::annotations::ChapterAnnotations;
use crate::timeline::{CharacterRef, CharacterTimeline};

/// Verdict of one check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Tokens a draft must avoid or should mention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftConstraints {
    pub forbidden: Vec<String>,
    pub required: Vec<String>,
}

impl DraftConstraints {
    pub fn new<F, R>(forbidden: F, required: R) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            forbidden: forbidden.into_iter().map(Into::into).collect(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `|`-separated token lists. Blank entries are dropped.
    pub fn parse(forbidden: &str, required: &str) -> Self {
        Self {
            forbidden: split_tokens(forbidden),
            required: split_tokens(required),
        }
    }
}

fn split_tokens(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Current state of a character as seen by the checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub summary: CharacterSummary,
}

/// Read-only access to current character state.
pub trait CharacterStateReader {
    /// Look up a character by id or name; `None` if unknown.
    fn current_state(&self, reference: &str) -> Option<CharacterView>;
}

impl CharacterStateReader for CharacterTimeline {
    fn current_state(&self, reference: &str) -> Option<CharacterView> {
        let by_id = CharacterRef::id(reference);
        let by_name = CharacterRef::name(reference);
        let card = self.card(&by_id).or_else(|_| self.card(&by_name)).ok()?;
        let key = CharacterRef::Id(card.id().clone());
        match self.rebuild_state(&key, None) {
            Ok(summary) => Some(CharacterView {
                id: card.id().clone(),
                name: card.name().to_string(),
                summary,
            }),
            Err(err) => {
                warn!(character = %card.id(), error = %err, "could not replay character state");
                None
            }
        }
    }
}

/// Collects findings, routing annotation issues by severity mode.
#[derive(Debug, Default)]
struct Findings {
    strict: bool,
    outcome: CheckOutcome,
}

impl Findings {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            outcome: CheckOutcome::default(),
        }
    }

    fn error(&mut self, message: String) {
        self.outcome.errors.push(message);
    }

    fn warn(&mut self, message: String) {
        self.outcome.warnings.push(message);
    }

    /// Error in strict mode, warning otherwise.
    fn issue(&mut self, message: String) {
        if self.strict {
            self.error(message);
        } else {
            self.warn(message);
        }
    }
}

/// Check a draft.
///
/// Scene rules run whenever annotations are given; character rules also
/// need a `reader`.
pub fn check_draft(
    draft: &str,
    constraints: &DraftConstraints,
    annotations: Option<&ChapterAnnotations>,
    reader: Option<&dyn CharacterStateReader>,
    strict: bool,
) -> CheckOutcome {
    let mut findings = Findings::new(strict);

    for token in &constraints.forbidden {
        if draft.contains(token.as_str()) {
            findings.error(format!("forbidden element present: {}", token));
        }
    }
    for token in &constraints.required {
        if !draft.contains(token.as_str()) {
            findings.warn(format!("required element not mentioned: {}", token));
        }
    }

    if let Some(annotations) = annotations {
        scenes::check_scenes(&annotations.scenes, &mut findings);
        if let Some(reader) = reader {
            characters::check_characters(&annotations.characters, reader, &mut findings);
        }
    }

    let outcome = findings.outcome;
    debug!(
        strict,
        errors = outcome.errors.len(),
        warnings = outcome.warnings.len(),
        "draft checked"
    );
    outcome
}
