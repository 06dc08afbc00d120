//! Run planning for a chapter simulation.

use serde::{Deserialize, Serialize};

use crate::context_assembler::AssembledContext;
use crate::timeline::truncate_chars;

/// Characters of digest kept in a plan.
pub const PLAN_SUMMARY_CHARS: usize = 600;

pub const WRITER: &str = "writer";
pub const CONSISTENCY_CHECKER: &str = "consistency_checker";
pub const STYLIST: &str = "stylist";

/// Which stages run, and the notes they run under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorPlan {
    pub objective: String,
    pub chapter_id: String,
    pub required_agents: Vec<String>,
    pub context_summary: String,
    pub notes: Vec<String>,
}

impl DirectorPlan {
    pub fn uses(&self, agent: &str) -> bool {
        self.required_agents.iter().any(|a| a == agent)
    }
}

pub fn plan_chapter(context: &AssembledContext, use_stylist: bool, max_attempts: u32) -> DirectorPlan {
    let mut required_agents = vec![WRITER.to_string(), CONSISTENCY_CHECKER.to_string()];
    if use_stylist {
        required_agents.push(STYLIST.to_string());
    }

    let mut notes = vec![
        "outline and volume plans are read-only; this run only writes a draft".to_string(),
        "style polish never runs on a draft that failed the consistency check".to_string(),
    ];
    if !use_stylist {
        notes.push("stylist skipped by configuration".to_string());
    }
    if max_attempts > 1 {
        notes.push(format!("up to {} draft attempts", max_attempts));
    }

    DirectorPlan {
        objective: context.objective.clone(),
        chapter_id: context.chapter_id.clone(),
        required_agents,
        context_summary: truncate_chars(&context.summary_line(), PLAN_SUMMARY_CHARS),
        notes,
    }
}
