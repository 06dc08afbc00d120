//! Character mutation annotations checked against current state.

use story_rules::{MutationAction, RulesError, StructuredAction};

use super::{CharacterStateReader, Findings};
use crate::annotations::Annotation;

pub(super) fn check_characters(
    annotations: &[Annotation],
    reader: &dyn CharacterStateReader,
    findings: &mut Findings,
) {
    for annotation in annotations {
        let Some(mutation) = annotation.attr("mutation") else {
            continue;
        };

        let Some(reference) = annotation.attr("id").or_else(|| annotation.attr("ref")) else {
            findings.issue(format!("character mutation is missing id/ref: {}", mutation));
            continue;
        };

        let action = match StructuredAction::parse(mutation) {
            Ok(action) => action,
            Err(RulesError::UnsupportedAction(action)) => {
                findings.issue(format!("unsupported character mutation action: {}", action));
                continue;
            }
            Err(_) => {
                findings.issue(format!("character mutation is malformed: {}", mutation));
                continue;
            }
        };

        let Some(view) = reader.current_state(reference) else {
            findings.warn(format!(
                "character annotation references unknown character: {}",
                reference
            ));
            continue;
        };

        if action.action == MutationAction::Use && view.summary.item_count(&action.payload) == 0 {
            findings.issue(format!(
                "character {} attempts to use missing or insufficient item: {}",
                view.name, action.payload
            ));
        }
    }
}
