//! Chapter simulation - plan, draft, check, polish, record.
//!
//! A run assembles the chapter digest, asks a [`DraftWriter`] for a draft,
//! checks it, and retries up to the configured number of rewrites while the
//! check fails. A passing draft may be polished. The final draft and a JSON
//! report are written under the project root.

mod director;
mod stylist;
mod writer;

pub use director::*;
pub use stylist::*;
pub use writer::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::annotations::{AnnotationSource, ChapterAnnotations};
use crate::checker::{check_draft, CharacterStateReader, CheckOutcome, DraftConstraints};
use crate::context_assembler::{AssembledContext, ChapterBrief, ContextAssembler};
use crate::error::Result;
use crate::novel::Novel;
use crate::store::{write_json, write_text};

/// Per-run settings. Unset values fall back to the engine configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    pub objective: String,
    pub constraints: DraftConstraints,
    pub use_stylist: bool,
    pub banned_phrases: Vec<String>,
    pub strict: Option<bool>,
    pub max_rewrites: Option<u32>,
}

impl SimulationOptions {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            ..Self::default()
        }
    }

    pub fn with_constraints(mut self, constraints: DraftConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_stylist<I>(mut self, banned_phrases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.use_stylist = true;
        self.banned_phrases = banned_phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_max_rewrites(mut self, max_rewrites: u32) -> Self {
        self.max_rewrites = Some(max_rewrites);
        self
    }
}

/// Checker verdict of one draft attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub beat_count: usize,
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of [`ChapterSimulator::simulate_chapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    pub run_id: Uuid,
    pub chapter_id: String,
    pub passed: bool,
    pub attempts: u32,
    pub draft_file: PathBuf,
    pub report_file: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// The JSON record written for every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub novel_id: String,
    pub chapter_id: String,
    pub objective: String,
    pub plan: DirectorPlan,
    pub beats: Vec<String>,
    pub checker: CheckerReport,
    pub style: StyleReport,
    pub context: AssembledContext,
    pub annotations: ChapterAnnotations,
    pub draft_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerReport {
    pub strict: bool,
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleReport {
    pub enabled: bool,
    /// False when the stylist was requested but the draft failed its check.
    pub applied: bool,
    pub edits: Vec<String>,
}

/// Runs chapter simulations for one novel.
pub struct ChapterSimulator<'n, S, W> {
    novel: &'n Novel,
    source: S,
    writer: W,
    assembler: ContextAssembler,
}

impl<'n, S, W> ChapterSimulator<'n, S, W>
where
    S: AnnotationSource,
    W: DraftWriter,
{
    pub fn new(novel: &'n Novel, source: S, writer: W) -> Self {
        let assembler = ContextAssembler::new(novel.config().digest.clone());
        Self {
            novel,
            source,
            writer,
            assembler,
        }
    }

    pub fn simulate_chapter(
        &mut self,
        chapter_id: &str,
        options: &SimulationOptions,
    ) -> Result<SimulationResult> {
        let config = self.novel.config();
        let layout = self.novel.layout();
        let strict = options.strict.unwrap_or(config.strict_lore);
        let max_attempts = options
            .max_rewrites
            .unwrap_or(config.max_rewrites)
            .saturating_add(1);
        let run_id = Uuid::new_v4();

        let annotations = self.source.chapter_annotations(chapter_id)?;
        let outline = self.source.outline(chapter_id)?;
        let characters = self.novel.characters();
        let brief = ChapterBrief {
            chapter_id,
            objective: &options.objective,
            outline: outline.as_deref(),
            annotations: &annotations,
        };
        let context = self.assembler.assemble(
            brief,
            &characters,
            &self.novel.foreshadowing().graph()?,
            &self.novel.world().graph()?,
        )?;
        let plan = plan_chapter(&context, options.use_stylist, max_attempts);

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut feedback: Vec<String> = Vec::new();
        let (draft, outcome) = loop {
            let attempt = attempts.len() as u32 + 1;
            let draft = self.writer.write_draft(&DraftRequest {
                chapter_id,
                objective: &options.objective,
                context: &context,
                attempt,
                feedback: &feedback,
            })?;
            let outcome: CheckOutcome = check_draft(
                &draft.text,
                &options.constraints,
                Some(&annotations),
                Some(&characters as &dyn CharacterStateReader),
                strict,
            );

            info!(
                run = %run_id,
                chapter = chapter_id,
                attempt,
                passed = outcome.passed(),
                errors = outcome.errors.len(),
                "draft attempt checked"
            );
            attempts.push(AttemptRecord {
                attempt,
                beat_count: draft.beats.len(),
                passed: outcome.passed(),
                errors: outcome.errors.clone(),
                warnings: outcome.warnings.clone(),
            });

            if outcome.passed() || attempt >= max_attempts {
                break (draft, outcome);
            }
            feedback = outcome.errors;
        };

        let mut text = draft.text.clone();
        let mut style = StyleReport {
            enabled: options.use_stylist,
            applied: false,
            edits: Vec::new(),
        };
        if options.use_stylist && outcome.passed() {
            let polished = Stylist::new(options.banned_phrases.iter().cloned()).polish(&text);
            text = polished.text;
            style.applied = true;
            style.edits = polished.edits;
        }

        let draft_file = layout.drafts_dir().join(format!("{}_draft.md", chapter_id));
        write_text(&draft_file, &text)?;

        let timestamp = Utc::now();
        let run_tag = run_id.simple().to_string();
        let report_file = layout.simulation_logs_dir().join(format!(
            "{}_{}_{}.json",
            timestamp.format("%Y%m%d_%H%M%S"),
            chapter_id,
            &run_tag[..8]
        ));
        let report = SimulationReport {
            run_id,
            timestamp,
            novel_id: layout.novel_id().to_string(),
            chapter_id: chapter_id.to_string(),
            objective: options.objective.clone(),
            plan,
            beats: draft.beats,
            checker: CheckerReport {
                strict,
                passed: outcome.passed(),
                errors: outcome.errors.clone(),
                warnings: outcome.warnings.clone(),
                attempts,
            },
            style,
            context,
            annotations,
            draft_file: draft_file.clone(),
        };
        write_json(&report_file, &report)?;

        let attempt_count = report.checker.attempts.len() as u32;
        if outcome.passed() {
            info!(run = %run_id, chapter = chapter_id, attempts = attempt_count, "chapter simulated");
        } else {
            warn!(
                run = %run_id,
                chapter = chapter_id,
                attempts = attempt_count,
                errors = outcome.errors.len(),
                "chapter draft failed the consistency check"
            );
        }

        Ok(SimulationResult {
            run_id,
            chapter_id: chapter_id.to_string(),
            passed: outcome.passed(),
            attempts: attempt_count,
            draft_file,
            report_file,
            errors: outcome.errors,
            warnings: outcome.warnings,
        })
    }
}
