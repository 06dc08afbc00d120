//! Context Assembler - builds the chapter digest handed to a draft writer.
//!
//! The digest is assembled in five parts:
//! 1. **Outline**: whitespace-collapsed excerpt of the chapter outline
//! 2. **Characters**: current realm, location, item count and profile excerpt
//! 3. **Pending threads**: open foreshadowing, heaviest first
//! 4. **Scenes**: count, tension range and emotion tags of the chapter
//! 5. **World**: bounded one-line summary of the world graph
//!
//! Every part is capped by [`DigestConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use story_rules::WorldGraph;

use crate::annotations::ChapterAnnotations;
use crate::config::DigestConfig;
use crate::error::Result;
use crate::foreshadowing::ForeshadowingGraph;
use crate::timeline::{truncate_chars, CharacterRef, CharacterTimeline};

/// What the chapter is about, as given by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ChapterBrief<'a> {
    pub chapter_id: &'a str,
    pub objective: &'a str,
    pub outline: Option<&'a str>,
    pub annotations: &'a ChapterAnnotations,
}

/// The context assembler builds chapter digests from stored state.
pub struct ContextAssembler {
    config: DigestConfig,
}

impl ContextAssembler {
    /// Create a new context assembler with the given limits.
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Create a context assembler with default limits.
    pub fn with_defaults() -> Self {
        Self::new(DigestConfig::default())
    }

    /// Assemble the complete digest for one chapter.
    pub fn assemble(
        &self,
        brief: ChapterBrief<'_>,
        characters: &CharacterTimeline,
        foreshadowing: &ForeshadowingGraph,
        world: &WorldGraph,
    ) -> Result<AssembledContext> {
        Ok(AssembledContext {
            chapter_id: brief.chapter_id.to_string(),
            objective: brief.objective.to_string(),
            outline: self.outline_excerpt(brief.outline),
            characters: self.character_context(characters)?,
            pending: self.pending_threads(foreshadowing, brief.annotations),
            scenes: SceneDigest::from_annotations(brief.annotations),
            world: world.summary(self.config.max_world_entities, self.config.max_world_relations),
        })
    }

    fn outline_excerpt(&self, outline: Option<&str>) -> String {
        let Some(outline) = outline else {
            return "no chapter outline found; following the default progression".to_string();
        };
        let compact = outline.split_whitespace().collect::<Vec<_>>().join(" ");
        if compact.is_empty() {
            return "chapter outline is empty".to_string();
        }
        truncate_chars(&compact, self.config.outline_chars)
    }

    /// Current state of the first characters in creation order.
    fn character_context(&self, timeline: &CharacterTimeline) -> Result<Vec<CharacterContext>> {
        timeline
            .list_characters()?
            .into_iter()
            .take(self.config.max_characters)
            .map(|entry| {
                let reference = CharacterRef::Id(entry.id);
                let card = timeline.card(&reference)?;
                let summary = timeline.rebuild_state(&reference, None)?;
                let excerpt = timeline
                    .stored_profile_excerpt(&reference, self.config.profile_excerpt_chars)?;
                Ok(CharacterContext {
                    name: card.name().to_string(),
                    realm: summary.realm,
                    location: summary.location,
                    item_count: summary.items.len(),
                    profile_excerpt: excerpt.filter(|e| !e.is_empty()),
                })
            })
            .collect()
    }

    /// Open threads from the graph, or the chapter's own tags when the graph has none.
    fn pending_threads(
        &self,
        graph: &ForeshadowingGraph,
        annotations: &ChapterAnnotations,
    ) -> Vec<PendingThread> {
        let from_graph: Vec<_> = graph
            .pending_nodes(self.config.min_pending_weight)
            .into_iter()
            .take(self.config.max_pending)
            .map(|node| PendingThread {
                id: node.id.clone(),
                weight: node.weight,
                layer: node.layer.to_string(),
                target_chapter: node.target_chapter.clone(),
                from_outline: false,
            })
            .collect();
        if !from_graph.is_empty() {
            return from_graph;
        }

        annotations
            .foreshadowings
            .iter()
            .take(self.config.max_pending)
            .map(|tag| PendingThread {
                id: tag.attr("id").unwrap_or("unknown").to_string(),
                weight: tag.attr("weight").and_then(|w| w.parse().ok()).unwrap_or(0),
                layer: tag.attr("layer").unwrap_or("unlabelled").to_string(),
                target_chapter: tag.attr("target").map(str::to_string),
                from_outline: true,
            })
            .collect()
    }
}

/// The assembled digest ready for prompt generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledContext {
    pub chapter_id: String,
    pub objective: String,

    /// Outline excerpt, or a note that there is none.
    pub outline: String,

    pub characters: Vec<CharacterContext>,
    pub pending: Vec<PendingThread>,
    pub scenes: SceneDigest,

    /// World graph summary.
    pub world: String,
}

impl AssembledContext {
    /// The whole digest on one line.
    pub fn summary_line(&self) -> String {
        format!(
            "objective: {}; chapter: {}; outline: {}; characters: {}; pending: {}; scenes: {}; world: {}",
            self.objective,
            self.chapter_id,
            self.outline,
            self.characters_line(),
            self.pending_line(),
            self.scenes,
            self.world
        )
    }

    fn characters_line(&self) -> String {
        if self.characters.is_empty() {
            return "no character records".to_string();
        }
        join(&self.characters)
    }

    fn pending_line(&self) -> String {
        if self.pending.is_empty() {
            return "no pending foreshadowing".to_string();
        }
        join(&self.pending)
    }

    /// Format the digest as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("## Objective\n");
        prompt.push_str(&format!("{} ({})\n\n", self.objective, self.chapter_id));

        prompt.push_str("## Outline\n");
        prompt.push_str(&self.outline);
        prompt.push_str("\n\n");

        prompt.push_str("## Characters\n");
        if self.characters.is_empty() {
            prompt.push_str("- none recorded\n");
        }
        for character in &self.characters {
            prompt.push_str(&format!("- {}\n", character));
        }
        prompt.push('\n');

        if !self.pending.is_empty() {
            prompt.push_str("## Pending Foreshadowing\n");
            for thread in &self.pending {
                prompt.push_str(&format!("- {}\n", thread));
            }
            prompt.push('\n');
        }

        prompt.push_str("## Scenes\n");
        prompt.push_str(&self.scenes.to_string());
        prompt.push_str("\n\n");

        prompt.push_str("## World\n");
        prompt.push_str(&self.world);
        prompt.push('\n');

        prompt
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Character context for the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterContext {
    pub name: String,
    pub realm: String,
    pub location: String,
    pub item_count: usize,
    pub profile_excerpt: Option<String>,
}

impl std::fmt::Display for CharacterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(realm={}, location={}, items={}",
            self.name, self.realm, self.location, self.item_count
        )?;
        if let Some(excerpt) = &self.profile_excerpt {
            write!(f, ", profile={}", excerpt)?;
        }
        f.write_str(")")
    }
}

/// An open foreshadowing thread listed in the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingThread {
    pub id: String,
    pub weight: u8,
    pub layer: String,
    pub target_chapter: Option<String>,
    /// Taken from the chapter's own tags rather than the stored graph.
    pub from_outline: bool,
}

impl std::fmt::Display for PendingThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(weight={}, layer={}, target={})",
            self.id,
            self.weight,
            self.layer,
            self.target_chapter.as_deref().unwrap_or("unset")
        )
    }
}

/// Pacing overview of the chapter's scene tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDigest {
    pub scene_count: usize,
    pub tension_range: Option<(i64, i64)>,
    /// Distinct emotion tags, sorted.
    pub emotions: Vec<String>,
}

impl SceneDigest {
    /// Summarize scene tags. Tensions that do not parse are left out.
    pub fn from_annotations(annotations: &ChapterAnnotations) -> Self {
        let tensions: Vec<i64> = annotations
            .scenes
            .iter()
            .filter_map(|scene| scene.attr("tension"))
            .filter_map(|raw| raw.parse().ok())
            .collect();
        let emotions: BTreeSet<&str> = annotations
            .scenes
            .iter()
            .filter_map(|scene| scene.attr("emotion"))
            .collect();

        let tension_range = tensions
            .iter()
            .min()
            .zip(tensions.iter().max())
            .map(|(lo, hi)| (*lo, *hi));

        Self {
            scene_count: annotations.scenes.len(),
            tension_range,
            emotions: emotions.into_iter().map(str::to_string).collect(),
        }
    }
}

impl std::fmt::Display for SceneDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scene_count == 0 {
            return f.write_str("no scene tension or emotion annotated");
        }
        write!(f, "scenes={}", self.scene_count)?;
        match self.tension_range {
            Some((lo, hi)) => write!(f, ", tension range={}-{}", lo, hi)?,
            None => f.write_str(", tension not annotated")?,
        }
        if self.emotions.is_empty() {
            f.write_str(", emotions not annotated")
        } else {
            write!(f, ", emotions={}", self.emotions.join(","))
        }
    }
}
