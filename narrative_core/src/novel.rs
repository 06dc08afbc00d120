//! One novel's engine components, wired from a single configuration.

use crate::annotations::ChapterAnnotations;
use crate::checker::{check_draft, CharacterStateReader, CheckOutcome, DraftConstraints};
use crate::config::EngineConfig;
use crate::foreshadowing::ForeshadowingStore;
use crate::store::NovelLayout;
use crate::timeline::CharacterTimeline;
use crate::world::WorldStore;

/// Entry point for working with one novel.
#[derive(Debug, Clone)]
pub struct Novel {
    config: EngineConfig,
    layout: NovelLayout,
}

impl Novel {
    pub fn open(config: EngineConfig) -> Self {
        let layout = config.layout();
        Self { config, layout }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &NovelLayout {
        &self.layout
    }

    pub fn characters(&self) -> CharacterTimeline {
        CharacterTimeline::new(self.layout.clone())
    }

    pub fn foreshadowing(&self) -> ForeshadowingStore {
        ForeshadowingStore::new(&self.layout, self.config.transition_policy)
    }

    pub fn world(&self) -> WorldStore {
        WorldStore::new(&self.layout)
    }

    /// Check a draft against this novel's characters.
    ///
    /// `strict` falls back to the configured `strict_lore`.
    pub fn check_draft(
        &self,
        draft: &str,
        constraints: &DraftConstraints,
        annotations: Option<&ChapterAnnotations>,
        strict: Option<bool>,
    ) -> CheckOutcome {
        let characters = self.characters();
        check_draft(
            draft,
            constraints,
            annotations,
            Some(&characters as &dyn CharacterStateReader),
            strict.unwrap_or(self.config.strict_lore),
        )
    }
}
