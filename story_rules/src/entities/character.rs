//! Character definitions.

use serde::{Deserialize, Serialize};

use super::{CharacterId, CharacterSummary, LegacyState};

/// Tier given to characters created without one.
pub const DEFAULT_TIER: &str = "普通配角";

/// Immutable identity of a character. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterIdentity {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// 主角 / 重要配角 / 普通配角 / 炮灰
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default)]
    pub faction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub appearance: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personality: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub background: String,
}

fn default_tier() -> String {
    DEFAULT_TIER.to_string()
}

impl CharacterIdentity {
    /// Create a new identity with the given id and display name.
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            tier: default_tier(),
            faction: String::new(),
            gender: None,
            age: None,
            appearance: String::new(),
            personality: Vec::new(),
            background: String::new(),
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = faction.into();
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
}

/// The durable record of a character: identity, summary and profile pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CardRecord")]
pub struct CharacterCard {
    #[serde(rename = "static")]
    pub identity: CharacterIdentity,

    /// Summary replay starts from. Empty for every card created by this crate;
    /// non-empty only for cards migrated from the older state layout.
    #[serde(default, skip_serializing_if = "is_default_summary")]
    pub baseline: CharacterSummary,

    /// Materialized view of the mutation log.
    pub summary: CharacterSummary,

    /// Path of the free-text profile, relative to the characters directory.
    pub dynamic_profile: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_snapshot: Option<String>,
}

fn is_default_summary(summary: &CharacterSummary) -> bool {
    *summary == CharacterSummary::default()
}

impl CharacterCard {
    /// Create a card with an empty summary.
    pub fn new(identity: CharacterIdentity) -> Self {
        let dynamic_profile = Self::default_profile_path(&identity.id);
        Self {
            identity,
            baseline: CharacterSummary::default(),
            summary: CharacterSummary::default(),
            dynamic_profile,
            current_snapshot: None,
        }
    }

    /// Default location of the profile document for a character.
    pub fn default_profile_path(id: &CharacterId) -> String {
        format!("profiles/{}.md", id)
    }

    pub fn id(&self) -> &CharacterId {
        &self.identity.id
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }
}

/// On-disk card shape, including the older `initial_state` / `current_state` blocks.
#[derive(Deserialize)]
struct CardRecord {
    #[serde(rename = "static")]
    identity: CharacterIdentity,
    #[serde(default)]
    baseline: Option<CharacterSummary>,
    #[serde(default)]
    summary: Option<CharacterSummary>,
    #[serde(default)]
    initial_state: Option<LegacyState>,
    #[serde(default)]
    current_state: Option<LegacyState>,
    #[serde(default)]
    dynamic_profile: String,
    #[serde(default)]
    current_snapshot: Option<String>,
}

impl From<CardRecord> for CharacterCard {
    fn from(record: CardRecord) -> Self {
        let baseline = record
            .baseline
            .or_else(|| record.initial_state.map(CharacterSummary::from))
            .unwrap_or_default();
        let summary = record
            .summary
            .or_else(|| record.current_state.map(CharacterSummary::from))
            .unwrap_or_else(|| baseline.clone());
        let dynamic_profile = if record.dynamic_profile.is_empty() {
            CharacterCard::default_profile_path(&record.identity.id)
        } else {
            record.dynamic_profile
        };

        CharacterCard {
            identity: record.identity,
            baseline,
            summary,
            dynamic_profile,
            current_snapshot: record.current_snapshot.filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let identity = CharacterIdentity::new(CharacterId::from_sequence(1), "李逍遥")
            .with_tier("主角")
            .with_alias("逍遥哥哥");
        let card = CharacterCard::new(identity);

        assert_eq!(card.name(), "李逍遥");
        assert_eq!(card.identity.tier, "主角");
        assert_eq!(card.dynamic_profile, "profiles/char_001.md");
        assert_eq!(card.identity.aliases, vec!["逍遥哥哥".to_string()]);
        assert_eq!(card.summary, CharacterSummary::default());
    }

    #[test]
    fn test_card_roundtrip_keeps_baseline_out() {
        let card = CharacterCard::new(CharacterIdentity::new("char_002".into(), "赵灵儿"));
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("baseline").is_none());
        assert_eq!(json["static"]["name"], "赵灵儿");

        let back: CharacterCard = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn test_legacy_card_migrates() {
        let card: CharacterCard = serde_json::from_str(
            r#"{
                "static": {"id": "char_003", "name": "林月如", "tier": "重要配角"},
                "initial_state": {"realm": "练气", "inventory": {"长鞭": 1}},
                "current_state": {"realm": "筑基", "location": "苏州", "inventory": {"长鞭": 1}},
                "relationships": []
            }"#,
        )
        .unwrap();

        assert_eq!(card.baseline.realm, "练气");
        assert!(card.baseline.holds("长鞭"));
        assert_eq!(card.summary.realm, "筑基");
        assert_eq!(card.summary.location, "苏州");
        assert_eq!(card.dynamic_profile, "profiles/char_003.md");
    }
}
