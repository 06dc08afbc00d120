//! Chapter annotations - structured tags the author embeds in outlines.
//!
//! Parsing the tags out of Markdown happens elsewhere; this module only
//! defines the shape the engine consumes and the seam it is read through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// One tag: its attributes and body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub content: String,
}

impl Annotation {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            content: content.into(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Trimmed attribute value; blank values count as absent.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Every annotation found in one chapter, grouped by tag kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterAnnotations {
    #[serde(default)]
    pub foreshadowings: Vec<Annotation>,
    #[serde(default)]
    pub recovers: Vec<Annotation>,
    #[serde(default)]
    pub characters: Vec<Annotation>,
    #[serde(default)]
    pub scenes: Vec<Annotation>,
}

impl ChapterAnnotations {
    pub fn is_empty(&self) -> bool {
        self.foreshadowings.is_empty()
            && self.recovers.is_empty()
            && self.characters.is_empty()
            && self.scenes.is_empty()
    }
}

/// Where chapter annotations and outline text come from.
pub trait AnnotationSource {
    /// Annotations of a chapter; empty if the chapter has none.
    fn chapter_annotations(&self, chapter_id: &str) -> Result<ChapterAnnotations>;

    /// Outline text of a chapter, if the source has one.
    fn outline(&self, _chapter_id: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// An in-memory source, keyed by chapter id.
#[derive(Debug, Clone, Default)]
pub struct StaticAnnotations {
    chapters: BTreeMap<String, (ChapterAnnotations, Option<String>)>,
}

impl StaticAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter(
        mut self,
        chapter_id: impl Into<String>,
        annotations: ChapterAnnotations,
        outline: Option<String>,
    ) -> Self {
        self.chapters.insert(chapter_id.into(), (annotations, outline));
        self
    }
}

impl AnnotationSource for StaticAnnotations {
    fn chapter_annotations(&self, chapter_id: &str) -> Result<ChapterAnnotations> {
        Ok(self
            .chapters
            .get(chapter_id)
            .map(|(annotations, _)| annotations.clone())
            .unwrap_or_default())
    }

    fn outline(&self, chapter_id: &str) -> Result<Option<String>> {
        Ok(self
            .chapters
            .get(chapter_id)
            .and_then(|(_, outline)| outline.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_attribute_is_absent() {
        let annotation = Annotation::new("")
            .with_attribute("id", "  ")
            .with_attribute("ref", " 李逍遥 ");
        assert_eq!(annotation.attr("id"), None);
        assert_eq!(annotation.attr("ref"), Some("李逍遥"));
    }

    #[test]
    fn test_static_source() {
        let mut chapter = ChapterAnnotations::default();
        chapter
            .scenes
            .push(Annotation::new("开场").with_attribute("tension", "4"));
        let source = StaticAnnotations::new().with_chapter(
            "ch_001",
            chapter,
            Some("李逍遥初遇灵儿".to_string()),
        );

        assert_eq!(source.chapter_annotations("ch_001").unwrap().scenes.len(), 1);
        assert!(source.chapter_annotations("ch_002").unwrap().is_empty());
        assert_eq!(source.outline("ch_002").unwrap(), None);
    }

    #[test]
    fn test_reads_parser_output_shape() {
        let json = r#"{"scenes": [{"attributes": {"tension": "7", "emotion": "紧张"}, "content": "夜探"}]}"#;
        let chapter: ChapterAnnotations = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.scenes[0].attr("emotion"), Some("紧张"));
        assert!(chapter.characters.is_empty());
    }
}
