//! Draft writers - the pluggable prose stage of a simulation.

use serde::{Deserialize, Serialize};

use crate::context_assembler::AssembledContext;
use crate::error::Result;

/// Everything a writer gets for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct DraftRequest<'a> {
    pub chapter_id: &'a str,
    pub objective: &'a str,
    pub context: &'a AssembledContext,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Checker errors of the previous attempt.
    pub feedback: &'a [String],
}

/// A written draft and the beats it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub text: String,
    pub beats: Vec<String>,
}

/// Produces chapter drafts. Implementations may call out to a model.
pub trait DraftWriter {
    fn write_draft(&mut self, request: &DraftRequest<'_>) -> Result<Draft>;
}

/// Deterministic writer that lays out beats from the digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderWriter;

impl DraftWriter for PlaceholderWriter {
    fn write_draft(&mut self, request: &DraftRequest<'_>) -> Result<Draft> {
        let context = request.context;
        let mut beats = vec![format!("Opening: set the scene for {}", request.objective)];

        if let Some(lead) = context.characters.first() {
            beats.push(format!("Focus: {} at {}", lead.name, lead.location));
        }
        if let Some(thread) = context.pending.first() {
            beats.push(format!("Thread: advance {}", thread.id));
        }
        beats.push(format!("Conflict: raise the stakes of {}", request.objective));
        if request.attempt > 1 && !request.feedback.is_empty() {
            beats.push(format!(
                "Revision: address {} checker finding(s)",
                request.feedback.len()
            ));
        }
        beats.push("Hook: close on an open question".to_string());

        let mut text = format!("# {} draft\n\n", request.chapter_id);
        for (n, beat) in beats.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", n + 1, beat));
        }

        Ok(Draft { text, beats })
    }
}
