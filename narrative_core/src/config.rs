//! Engine configuration, loadable from a TOML file.
//!
//! The project root is always given explicitly; nothing searches parent
//! directories for it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::foreshadowing::TransitionPolicy;
use crate::store::NovelLayout;

/// Limits for the context digest handed to the draft writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Characters included in the digest.
    pub max_characters: usize,

    /// Pending foreshadowing nodes included in the digest.
    pub max_pending: usize,

    /// Minimum weight for a pending node to be listed.
    pub min_pending_weight: u8,

    pub max_world_entities: usize,
    pub max_world_relations: usize,

    /// Characters of profile text quoted per character.
    pub profile_excerpt_chars: usize,

    /// Characters of chapter outline quoted.
    pub outline_chars: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_characters: 5,
            max_pending: 8,
            min_pending_weight: 1,
            max_world_entities: 6,
            max_world_relations: 8,
            profile_excerpt_chars: 80,
            outline_chars: 240,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding `data/novels/<novel_id>/`.
    pub project_root: PathBuf,

    pub novel_id: String,

    /// Default severity mode of the consistency checker.
    pub strict_lore: bool,

    /// Extra draft attempts after a failed check.
    pub max_rewrites: u32,

    pub transition_policy: TransitionPolicy,

    pub digest: DigestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            novel_id: "my_novel".to_string(),
            strict_lore: false,
            max_rewrites: 0,
            transition_policy: TransitionPolicy::default(),
            digest: DigestConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration for one novel under the given project root.
    pub fn new(project_root: impl Into<PathBuf>, novel_id: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            novel_id: novel_id.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// A relative `project_root` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if config.project_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.project_root = base.join(&config.project_root);
        }
        Ok(config)
    }

    /// On-disk layout of the configured novel.
    pub fn layout(&self) -> NovelLayout {
        NovelLayout::new(&self.project_root, &self.novel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.novel_id, "my_novel");
        assert!(!config.strict_lore);
        assert_eq!(config.digest.max_pending, 8);
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            novel_id = "仙剑"
            strict_lore = true
            transition_policy = "strict"

            [digest]
            max_characters = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.novel_id, "仙剑");
        assert!(config.strict_lore);
        assert_eq!(config.transition_policy, TransitionPolicy::Strict);
        assert_eq!(config.digest.max_characters, 2);
        assert_eq!(config.digest.max_world_relations, 8);
    }

    #[test]
    fn test_load_resolves_relative_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("novel.toml");
        std::fs::write(&path, "project_root = \"workspace\"\nnovel_id = \"demo\"\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.project_root, dir.path().join("workspace"));
        assert_eq!(
            config.layout().novel_dir(),
            dir.path().join("workspace/data/novels/demo")
        );
    }

    #[test]
    fn test_bad_toml() {
        assert!(EngineConfig::from_toml_str("strict_lore = \"maybe\"").is_err());
    }
}
