//! On-disk layout and whole-file JSON records.
//!
//! Every write loads the full record, mutates it in memory and writes it back
//! in full. There is no locking: two processes writing the same record race.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use story_rules::CharacterId;

use crate::error::Result;

/// Paths of every artifact belonging to one novel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelLayout {
    project_root: PathBuf,
    novel_id: String,
}

impl NovelLayout {
    pub fn new(project_root: impl Into<PathBuf>, novel_id: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            novel_id: novel_id.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn novel_id(&self) -> &str {
        &self.novel_id
    }

    pub fn novel_dir(&self) -> PathBuf {
        self.project_root.join("data").join("novels").join(&self.novel_id)
    }

    pub fn characters_dir(&self) -> PathBuf {
        self.novel_dir().join("characters")
    }

    pub fn character_index(&self) -> PathBuf {
        self.characters_dir().join("index.json")
    }

    pub fn card_path(&self, id: &CharacterId) -> PathBuf {
        self.characters_dir().join("cards").join(format!("{}.json", id))
    }

    pub fn mutation_log_path(&self, id: &CharacterId) -> PathBuf {
        self.characters_dir()
            .join("timeline")
            .join("logs")
            .join(format!("{}.json", id))
    }

    pub fn snapshot_path(&self, id: &CharacterId, volume_id: &str) -> PathBuf {
        self.characters_dir()
            .join("timeline")
            .join("snapshots")
            .join(format!("{}_{}.md", id, volume_id))
    }

    pub fn foreshadowing_file(&self) -> PathBuf {
        self.novel_dir().join("foreshadowing").join("dag.json")
    }

    pub fn world_file(&self) -> PathBuf {
        self.novel_dir().join("world").join("world_graph.json")
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.novel_dir().join("manuscript").join("drafts")
    }

    pub fn simulation_logs_dir(&self) -> PathBuf {
        self.project_root.join("logs").join("simulations")
    }
}

/// Read a JSON file, `None` if it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write a value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    write_text(path, &text)
}

/// Write a text file, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// A whole-file JSON record with load / modify / save semantics.
#[derive(Debug, Clone)]
pub struct RecordFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> RecordFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, or its default if the file does not exist yet.
    pub fn load(&self) -> Result<T> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, value: &T) -> Result<()> {
        write_json(&self.path, value)
    }

    /// Load, apply `f`, and save only if `f` succeeded.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut value = self.load()?;
        let result = f(&mut value)?;
        self.save(&value)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NarrativeError;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = NovelLayout::new("/work", "my_novel");
        let id = CharacterId::from_sequence(1);

        assert_eq!(layout.novel_dir(), PathBuf::from("/work/data/novels/my_novel"));
        assert_eq!(
            layout.card_path(&id),
            PathBuf::from("/work/data/novels/my_novel/characters/cards/char_001.json")
        );
        assert_eq!(
            layout.snapshot_path(&id, "vol_01"),
            PathBuf::from("/work/data/novels/my_novel/characters/timeline/snapshots/char_001_vol_01.md")
        );
        assert_eq!(layout.simulation_logs_dir(), PathBuf::from("/work/logs/simulations"));
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let file: RecordFile<BTreeMap<String, u32>> = RecordFile::new(dir.path().join("a/b.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_modify_saves_on_success_only() {
        let dir = TempDir::new().unwrap();
        let file: RecordFile<BTreeMap<String, u32>> = RecordFile::new(dir.path().join("nested/counts.json"));

        file.modify(|counts| {
            counts.insert("a".to_string(), 1);
            Ok(())
        })
        .unwrap();

        let result: Result<()> = file.modify(|counts| {
            counts.insert("b".to_string(), 2);
            Err(NarrativeError::EmptyMutation)
        });
        assert!(result.is_err());

        let counts = file.load().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["a"], 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let file: RecordFile<BTreeMap<String, u32>> = RecordFile::new(path);
        assert!(matches!(file.load(), Err(NarrativeError::Json(_))));
    }
}
