//! Deterministic fold of a mutation log into a summary.

use story_rules::{ChapterOrder, CharacterSummary, RulesError, StateMutation};

/// A stored mutation that could not be applied during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMutation {
    pub mutation_id: String,
    pub error: RulesError,
}

/// Result of folding a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub summary: CharacterSummary,
    pub skipped: Vec<SkippedMutation>,
}

impl Replay {
    /// First skip that `earlier` did not already have.
    pub fn new_failure_since(&self, earlier: &Replay) -> Option<&SkippedMutation> {
        self.skipped.iter().find(|skip| {
            !earlier
                .skipped
                .iter()
                .any(|old| old.mutation_id == skip.mutation_id)
        })
    }
}

/// Fold `mutations` (already in chapter order) over `baseline`.
///
/// Entries after `until` are ignored. Entries whose action fails are skipped
/// and reported; note-only entries never change the summary.
pub fn replay(
    baseline: &CharacterSummary,
    mutations: &[StateMutation],
    until: Option<&ChapterOrder>,
) -> Replay {
    let mut summary = baseline.clone();
    let mut skipped = Vec::new();

    for mutation in mutations {
        if until.is_some_and(|cutoff| mutation.chapter_order() > *cutoff) {
            continue;
        }
        let Some(action) = &mutation.action else {
            continue;
        };
        if let Err(error) = summary.apply(action) {
            skipped.push(SkippedMutation {
                mutation_id: mutation.mutation_id.clone(),
                error,
            });
        }
    }

    Replay { summary, skipped }
}

/// Index at which a mutation for `chapter_id` keeps the log in chapter order.
///
/// Entries of the same chapter keep their insertion order.
pub fn insertion_point(mutations: &[StateMutation], chapter_id: &str) -> usize {
    let order = ChapterOrder::of(chapter_id);
    mutations.partition_point(|m| m.chapter_order() <= order)
}
