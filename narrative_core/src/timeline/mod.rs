//! Character timelines - identity cards, mutation logs and replay.
//!
//! Each character owns an append-only log of [`StateMutation`]s stored in
//! chapter order. The card's summary is a cache of replaying that log from
//! the card's baseline; the log is the source of truth.

mod profile;
mod replay;

pub use profile::*;
pub use replay::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use story_rules::{
    ChapterOrder, CharacterCard, CharacterId, CharacterIdentity, CharacterSummary, StateMutation,
    StructuredAction,
};

use crate::error::{NarrativeError, Result};
use crate::store::{read_json, write_json, write_text, NovelLayout};

/// A character looked up by id or by display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterRef {
    Id(CharacterId),
    Name(String),
}

impl CharacterRef {
    pub fn id(id: impl Into<CharacterId>) -> Self {
        CharacterRef::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        CharacterRef::Name(name.into())
    }
}

impl std::fmt::Display for CharacterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterRef::Id(id) => write!(f, "{}", id),
            CharacterRef::Name(name) => f.write_str(name),
        }
    }
}

/// One row of the character index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: CharacterId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl IndexEntry {
    /// Check whether the display name or one of the aliases matches.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CharacterIndex {
    #[serde(default)]
    characters: Vec<IndexEntry>,
}

impl CharacterIndex {
    fn find(&self, reference: &CharacterRef) -> Option<&IndexEntry> {
        self.characters.iter().find(|entry| match reference {
            CharacterRef::Id(id) => entry.id == *id,
            CharacterRef::Name(name) => entry.answers_to(name),
        })
    }
}

/// Fields accepted when creating a character.
#[derive(Debug, Clone, Default)]
pub struct NewCharacter {
    pub name: String,
    pub tier: Option<String>,
    pub faction: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub aliases: Vec<String>,
}

impl NewCharacter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn into_identity(self, id: CharacterId) -> CharacterIdentity {
        let mut identity = CharacterIdentity::new(id, self.name.trim());
        if let Some(tier) = self.tier.filter(|t| !t.trim().is_empty()) {
            identity = identity.with_tier(tier);
        }
        if let Some(faction) = self.faction {
            identity = identity.with_faction(faction);
        }
        if let Some(gender) = self.gender {
            identity = identity.with_gender(gender);
        }
        if let Some(age) = self.age {
            identity = identity.with_age(age);
        }
        for alias in self.aliases {
            let alias = alias.trim();
            if !alias.is_empty() {
                identity = identity.with_alias(alias);
            }
        }
        identity
    }
}

/// A change to record against a character.
#[derive(Debug, Clone, Default)]
pub struct MutationRequest {
    pub chapter_id: String,
    /// `action:payload` expression, if the change is structured.
    pub change: Option<String>,
    pub note: Option<String>,
    /// Older callers pass the note as a reason.
    pub reason: Option<String>,
}

impl MutationRequest {
    pub fn new(chapter_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            ..Self::default()
        }
    }

    pub fn with_change(mut self, expr: impl Into<String>) -> Self {
        self.change = Some(expr.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn note_text(&self) -> String {
        [&self.note, &self.reason]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    fn change_expr(&self) -> Option<&str> {
        self.change.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Owner of every character record of one novel.
#[derive(Debug, Clone)]
pub struct CharacterTimeline {
    layout: NovelLayout,
}

impl CharacterTimeline {
    pub fn new(layout: NovelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &NovelLayout {
        &self.layout
    }

    fn load_index(&self) -> Result<CharacterIndex> {
        Ok(read_json(&self.layout.character_index())?.unwrap_or_default())
    }

    /// Every character, in creation order.
    pub fn list_characters(&self) -> Result<Vec<IndexEntry>> {
        Ok(self.load_index()?.characters)
    }

    /// Create a character with an empty log, a card and a profile from the template.
    pub fn create_character(&self, new: NewCharacter) -> Result<CharacterCard> {
        let mut index = self.load_index()?;
        let name = new.name.trim().to_string();
        if index.find(&CharacterRef::Name(name.clone())).is_some() {
            return Err(NarrativeError::CharacterExists(name));
        }

        let id = CharacterId::from_sequence(index.characters.len() + 1);
        let card = CharacterCard::new(new.into_identity(id.clone()));

        write_json(&self.layout.card_path(&id), &card)?;
        write_json(&self.layout.mutation_log_path(&id), &Vec::<StateMutation>::new())?;
        self.ensure_profile(&card)?;

        index.characters.push(IndexEntry {
            id: id.clone(),
            name: name.clone(),
            aliases: card.identity.aliases.clone(),
        });
        write_json(&self.layout.character_index(), &index)?;

        info!(character = %id, name = %name, tier = %card.identity.tier, "character created");
        Ok(card)
    }

    /// Resolve a reference to a character id.
    pub fn resolve(&self, reference: &CharacterRef) -> Result<CharacterId> {
        if let Some(entry) = self.load_index()?.find(reference) {
            return Ok(entry.id.clone());
        }
        // Cards written before the index existed are still addressable by id.
        if let CharacterRef::Id(id) = reference {
            if self.layout.card_path(id).exists() {
                return Ok(id.clone());
            }
        }
        Err(NarrativeError::CharacterNotFound(reference.to_string()))
    }

    /// Load a card. Never writes.
    pub fn card(&self, reference: &CharacterRef) -> Result<CharacterCard> {
        let id = self.resolve(reference)?;
        read_json(&self.layout.card_path(&id))?
            .ok_or_else(|| NarrativeError::CharacterNotFound(id.to_string()))
    }

    fn save_card(&self, card: &CharacterCard) -> Result<()> {
        write_json(&self.layout.card_path(card.id()), card)
    }

    fn load_log(&self, id: &CharacterId) -> Result<Vec<StateMutation>> {
        let mut log: Vec<StateMutation> =
            read_json(&self.layout.mutation_log_path(id))?.unwrap_or_default();
        // Older logs were append-ordered; a stable sort keeps same-chapter order.
        log.sort_by_key(StateMutation::chapter_order);
        Ok(log)
    }

    /// Record a mutation and refresh the card summary.
    ///
    /// A structured change is applied to a trial replay of the whole log with
    /// the new entry in place. If it, or any entry it pushes out of validity,
    /// fails to apply, nothing is written.
    pub fn apply_mutation(
        &self,
        reference: &CharacterRef,
        request: MutationRequest,
    ) -> Result<StateMutation> {
        let note = request.note_text();
        let action = request
            .change_expr()
            .map(StructuredAction::parse)
            .transpose()?;
        if action.is_none() && note.is_empty() {
            return Err(NarrativeError::EmptyMutation);
        }

        let mut card = self.card(reference)?;
        let id = card.id().clone();
        let mut log = self.load_log(&id)?;

        let mutation = StateMutation {
            mutation_id: StateMutation::mutation_id_for(&id, log.len() + 1),
            chapter_id: request.chapter_id.trim().to_string(),
            timestamp: Utc::now(),
            action,
            note,
        };

        let before = replay(&card.baseline, &log, None);
        let position = insertion_point(&log, &mutation.chapter_id);
        log.insert(position, mutation.clone());

        if mutation.is_structured() {
            let after = replay(&card.baseline, &log, None);
            if let Some(failure) = after.new_failure_since(&before) {
                debug!(
                    character = %id,
                    mutation = %failure.mutation_id,
                    error = %failure.error,
                    "mutation rejected"
                );
                return Err(failure.error.clone().into());
            }
            card.summary = after.summary;
        }

        write_json(&self.layout.mutation_log_path(&id), &log)?;
        if mutation.is_structured() {
            self.save_card(&card)?;
        }

        info!(
            character = %id,
            mutation = %mutation.mutation_id,
            chapter = %mutation.chapter_id,
            "mutation recorded"
        );
        Ok(mutation)
    }

    /// The full log in chapter order.
    pub fn timeline(&self, reference: &CharacterRef) -> Result<Vec<StateMutation>> {
        let id = self.resolve(reference)?;
        self.load_log(&id)
    }

    /// Replay the log up to and including `until`, or to the end.
    ///
    /// Stored entries that no longer apply are skipped with a warning.
    pub fn rebuild_state(
        &self,
        reference: &CharacterRef,
        until: Option<&str>,
    ) -> Result<CharacterSummary> {
        let card = self.card(reference)?;
        let log = self.load_log(card.id())?;
        let cutoff = until.map(ChapterOrder::of);
        let result = replay(&card.baseline, &log, cutoff.as_ref());

        for skip in &result.skipped {
            warn!(
                character = %card.id(),
                mutation = %skip.mutation_id,
                error = %skip.error,
                "skipping mutation that no longer applies"
            );
        }
        Ok(result.summary)
    }

    /// Write a Markdown snapshot of the current state and point the card at it.
    pub fn create_snapshot(
        &self,
        reference: &CharacterRef,
        volume_id: &str,
        chapter_range: Option<&str>,
    ) -> Result<PathBuf> {
        let mut card = self.card(reference)?;
        let summary = self.rebuild_state(&CharacterRef::Id(card.id().clone()), None)?;

        let path = self.layout.snapshot_path(card.id(), volume_id);
        write_text(&path, &render_snapshot(&card, &summary, volume_id, chapter_range))?;

        card.current_snapshot = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.save_card(&card)?;

        info!(character = %card.id(), volume = volume_id, path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// Absolute path of a character's profile document, recreated from the
    /// template if it went missing.
    pub fn profile_path(&self, reference: &CharacterRef) -> Result<PathBuf> {
        let card = self.card(reference)?;
        self.ensure_profile(&card)?;
        Ok(self.layout.characters_dir().join(&card.dynamic_profile))
    }

    /// Author-written profile text, cut to `max_chars` characters.
    ///
    /// A missing profile is recreated from the template first.
    pub fn profile_excerpt(&self, reference: &CharacterRef, max_chars: usize) -> Result<String> {
        let card = self.card(reference)?;
        self.ensure_profile(&card)?;
        let text = fs::read_to_string(self.layout.characters_dir().join(&card.dynamic_profile))?;
        Ok(profile_excerpt(&text, card.name(), card.id(), max_chars))
    }

    /// Like [`Self::profile_excerpt`], but `None` when the profile is missing.
    pub fn stored_profile_excerpt(
        &self,
        reference: &CharacterRef,
        max_chars: usize,
    ) -> Result<Option<String>> {
        let card = self.card(reference)?;
        let path = self.layout.characters_dir().join(&card.dynamic_profile);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(profile_excerpt(&text, card.name(), card.id(), max_chars)))
    }

    fn ensure_profile(&self, card: &CharacterCard) -> Result<()> {
        let path = self.layout.characters_dir().join(&card.dynamic_profile);
        if !path.exists() {
            write_text(&path, &profile_template(card.name(), card.id()))?;
            debug!(character = %card.id(), path = %path.display(), "profile created from template");
        }
        Ok(())
    }
}

fn render_snapshot(
    card: &CharacterCard,
    summary: &CharacterSummary,
    volume_id: &str,
    chapter_range: Option<&str>,
) -> String {
    let identity = &card.identity;
    let or_missing = |value: &str, missing: &str| {
        if value.trim().is_empty() {
            missing.to_string()
        } else {
            value.to_string()
        }
    };

    let mut lines = vec![
        format!("# {} - {} 快照", identity.name, volume_id),
        String::new(),
        "## 基本信息".to_string(),
        format!("- 人物ID: {}", identity.id),
        format!("- 层级: {}", identity.tier),
        format!("- 势力: {}", or_missing(&identity.faction, "未设定")),
        format!("- 章节范围: {}", or_missing(chapter_range.unwrap_or_default(), "未提供")),
        format!("- 生成时间: {}", Utc::now().to_rfc3339()),
        String::new(),
        "## 简卡摘要".to_string(),
        format!("- 境界: {}", summary.realm),
        format!("- 位置: {}", summary.location),
        format!("- 动态档案: {}", card.dynamic_profile),
        String::new(),
        "## 状态标签".to_string(),
    ];
    push_bullets(&mut lines, summary.statuses.iter().map(String::clone));

    lines.push(String::new());
    lines.push("## 关键物品".to_string());
    push_bullets(&mut lines, summary.items.iter().map(|item| item.to_string()));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_bullets(lines: &mut Vec<String>, values: impl Iterator<Item = String>) {
    let start = lines.len();
    lines.extend(values.map(|value| format!("- {}", value)));
    if lines.len() == start {
        lines.push("- 无".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_rules::{HeldItem, RulesError};
    use tempfile::TempDir;

    fn timeline(dir: &TempDir) -> CharacterTimeline {
        CharacterTimeline::new(NovelLayout::new(dir.path(), "novel"))
    }

    fn li() -> CharacterRef {
        CharacterRef::name("李逍遥")
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);

        let first = timeline
            .create_character(NewCharacter::new("李逍遥").with_tier("主角"))
            .unwrap();
        let second = timeline.create_character(NewCharacter::new("赵灵儿")).unwrap();

        assert_eq!(first.id().as_str(), "char_001");
        assert_eq!(second.id().as_str(), "char_002");
        assert_eq!(second.identity.tier, "普通配角");
        assert_eq!(second.summary.realm, "凡人");
        assert_eq!(second.summary.location, "未知");
        assert_eq!(timeline.list_characters().unwrap().len(), 2);
        assert!(timeline.timeline(&li()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        let err = timeline
            .create_character(NewCharacter::new(" 李逍遥 "))
            .unwrap_err();
        assert!(matches!(err, NarrativeError::CharacterExists(name) if name == "李逍遥"));
        assert_eq!(timeline.list_characters().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_character() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        assert!(matches!(
            timeline.card(&CharacterRef::id("char_404")),
            Err(NarrativeError::CharacterNotFound(_))
        ));
    }

    #[test]
    fn test_mutations_update_summary() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_001").with_change("acquire:玉佩"))
            .unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_002").with_change("health:轻伤"))
            .unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_003").with_change("health:重伤"))
            .unwrap();

        let card = timeline.card(&li()).unwrap();
        assert!(card.summary.holds("玉佩"));
        assert_eq!(card.summary.statuses, vec!["重伤".to_string()]);
        assert_eq!(timeline.rebuild_state(&li(), None).unwrap(), card.summary);
    }

    #[test]
    fn test_use_of_missing_item_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        let err = timeline
            .apply_mutation(&li(), MutationRequest::new("ch_001").with_change("use:酒"))
            .unwrap_err();
        assert!(matches!(err, NarrativeError::Rules(RulesError::ItemNotHeld(_))));
        assert!(timeline.timeline(&li()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_and_empty_requests() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        assert!(matches!(
            timeline.apply_mutation(&li(), MutationRequest::new("ch_001").with_change("fly:天")),
            Err(NarrativeError::Rules(RulesError::UnsupportedAction(_)))
        ));
        assert!(matches!(
            timeline.apply_mutation(&li(), MutationRequest::new("ch_001").with_change("no colon")),
            Err(NarrativeError::Rules(RulesError::MalformedExpression(_)))
        ));
        assert!(matches!(
            timeline.apply_mutation(&li(), MutationRequest::new("ch_001").with_note("  ")),
            Err(NarrativeError::EmptyMutation)
        ));
    }

    #[test]
    fn test_note_only_entry_keeps_summary() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        let entry = timeline
            .apply_mutation(&li(), MutationRequest::new("ch_001").with_reason("初见灵儿"))
            .unwrap();
        assert_eq!(entry.note, "初见灵儿");
        assert!(!entry.is_structured());
        assert_eq!(entry.mutation_id, "char_001_0001");
        assert_eq!(timeline.card(&li()).unwrap().summary, CharacterSummary::default());
    }

    #[test]
    fn test_out_of_order_entries_replay_in_chapter_order() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_010").with_change("move:蜀山"))
            .unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_002").with_change("move:余杭镇"))
            .unwrap();

        let chapters: Vec<_> = timeline
            .timeline(&li())
            .unwrap()
            .into_iter()
            .map(|m| m.chapter_id)
            .collect();
        assert_eq!(chapters, vec!["ch_002", "ch_010"]);

        assert_eq!(timeline.rebuild_state(&li(), None).unwrap().location, "蜀山");
        assert_eq!(
            timeline.rebuild_state(&li(), Some("ch_005")).unwrap().location,
            "余杭镇"
        );
        assert_eq!(timeline.card(&li()).unwrap().summary.location, "蜀山");
    }

    #[test]
    fn test_backdated_use_before_acquire_is_rejected() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_005").with_change("acquire:剑"))
            .unwrap();
        assert!(timeline
            .apply_mutation(&li(), MutationRequest::new("ch_003").with_change("use:剑"))
            .is_err());
        assert!(timeline
            .apply_mutation(&li(), MutationRequest::new("ch_006").with_change("use:剑"))
            .is_ok());
    }

    #[test]
    fn test_snapshot_contents() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline
            .create_character(NewCharacter::new("李逍遥").with_faction("蜀山派"))
            .unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_001").with_change("acquire:铜钱 ×3"))
            .unwrap();

        let path = timeline
            .create_snapshot(&li(), "vol_01", Some("ch_001-ch_010"))
            .unwrap();
        assert!(path.ends_with("characters/timeline/snapshots/char_001_vol_01.md"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# 李逍遥 - vol_01 快照"));
        assert!(text.contains("- 势力: 蜀山派"));
        assert!(text.contains("- 章节范围: ch_001-ch_010"));
        assert!(text.contains(&format!("- {}", HeldItem::with_count("铜钱", 3))));
        assert!(text.contains("## 状态标签\n- 无"));

        let card = timeline.card(&li()).unwrap();
        assert_eq!(card.current_snapshot.as_deref(), Some("char_001_vol_01.md"));
    }

    #[test]
    fn test_profile_recreated_when_missing() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();

        let path = timeline.profile_path(&li()).unwrap();
        assert!(path.ends_with("characters/profiles/char_001.md"));
        fs::remove_file(&path).unwrap();

        assert_eq!(timeline.profile_excerpt(&li(), 80).unwrap(), "");
        assert!(path.exists());

        fs::write(&path, "# 档案\n\n天性 乐观\n").unwrap();
        assert_eq!(timeline.profile_excerpt(&li(), 80).unwrap(), "天性 乐观");
    }

    #[test]
    fn test_reads_leave_missing_profile_alone() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();
        let path = timeline.profile_path(&li()).unwrap();
        fs::remove_file(&path).unwrap();

        timeline.card(&li()).unwrap();
        timeline.timeline(&li()).unwrap();
        timeline.rebuild_state(&li(), Some("ch_001")).unwrap();
        assert_eq!(timeline.stored_profile_excerpt(&li(), 80).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_cutoff_rebuild_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        timeline.create_character(NewCharacter::new("李逍遥")).unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_001").with_change("acquire:神秘玉佩"))
            .unwrap();
        timeline
            .apply_mutation(&li(), MutationRequest::new("ch_002").with_change("move:青云镇"))
            .unwrap();

        let first = timeline.rebuild_state(&li(), Some("ch_001")).unwrap();
        let second = timeline.rebuild_state(&li(), Some("ch_001")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.location, "未知");
        assert!(first.holds("神秘玉佩"));

        let full = timeline.rebuild_state(&li(), None).unwrap();
        assert_eq!(full, timeline.rebuild_state(&li(), None).unwrap());
        assert_eq!(full.location, "青云镇");
        assert!(full.holds("神秘玉佩"));
    }

    #[test]
    fn test_alias_resolves_to_character() {
        let dir = TempDir::new().unwrap();
        let timeline = timeline(&dir);
        let card = timeline
            .create_character(NewCharacter::new("李逍遥").with_alias("逍遥哥哥").with_alias(" "))
            .unwrap();
        assert_eq!(card.identity.aliases, vec!["逍遥哥哥".to_string()]);

        let id = timeline.resolve(&CharacterRef::name("逍遥哥哥")).unwrap();
        assert_eq!(id.as_str(), "char_001");
        assert!(matches!(
            timeline.create_character(NewCharacter::new("逍遥哥哥")),
            Err(NarrativeError::CharacterExists(_))
        ));
    }
}
