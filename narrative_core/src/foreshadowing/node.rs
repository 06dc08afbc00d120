//! Foreshadowing nodes - planted story threads awaiting recovery.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NarrativeError;

/// Narrative layer of a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "主线")]
    Mainline,
    #[default]
    #[serde(rename = "支线")]
    Subplot,
    #[serde(rename = "彩蛋")]
    EasterEgg,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Mainline, Layer::Subplot, Layer::EasterEgg];

    /// Label used in stored files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Mainline => "主线",
            Layer::Subplot => "支线",
            Layer::EasterEgg => "彩蛋",
        }
    }
}

impl FromStr for Layer {
    type Err = NarrativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "主线" | "mainline" => Ok(Layer::Mainline),
            "支线" | "subplot" => Ok(Layer::Subplot),
            "彩蛋" | "easter-egg" | "easter_egg" => Ok(Layer::EasterEgg),
            other => Err(NarrativeError::UnknownLabel {
                kind: "layer",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a thread: planted, awaiting recovery, recovered, or dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "埋伏")]
    Planted,
    #[serde(rename = "待收")]
    Pending,
    #[serde(rename = "已收")]
    Resolved,
    #[serde(rename = "废弃")]
    Abandoned,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Planted,
        Status::Pending,
        Status::Resolved,
        Status::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Planted => "埋伏",
            Status::Pending => "待收",
            Status::Resolved => "已收",
            Status::Abandoned => "废弃",
        }
    }

    /// Still waiting to be paid off.
    pub fn is_open(&self) -> bool {
        matches!(self, Status::Planted | Status::Pending)
    }

    /// Forward-only lifecycle: `埋伏 -> 待收 -> 已收`, and anything may be abandoned.
    ///
    /// Setting the current status again is always accepted.
    pub fn can_advance_to(&self, next: Status) -> bool {
        *self == next
            || next == Status::Abandoned
            || matches!(
                (self, next),
                (Status::Planted, Status::Pending) | (Status::Pending, Status::Resolved)
            )
    }
}

impl FromStr for Status {
    type Err = NarrativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "埋伏" | "planted" => Ok(Status::Planted),
            "待收" | "pending" => Ok(Status::Pending),
            "已收" | "resolved" => Ok(Status::Resolved),
            "废弃" | "abandoned" => Ok(Status::Abandoned),
            other => Err(NarrativeError::UnknownLabel {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planted story thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeshadowingNode {
    pub id: String,

    /// What was planted, in the author's words.
    pub content: String,

    /// Importance from 1 to 10.
    pub weight: u8,

    pub layer: Layer,

    #[serde(default)]
    pub status: Status,

    /// Chapter where the thread was planted.
    #[serde(default)]
    pub created_at: String,

    /// Chapter where recovery is planned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chapter: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ForeshadowingNode {
    /// Create a planted subplot thread of weight 5.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            weight: 5,
            layer: Layer::default(),
            status: Status::default(),
            created_at: String::new(),
            target_chapter: None,
            tags: Vec::new(),
        }
    }

    /// Set the weight. Range is checked when the node enters a graph.
    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn planted_in(mut self, chapter_id: impl Into<String>) -> Self {
        self.created_at = chapter_id.into();
        self
    }

    pub fn with_target_chapter(mut self, chapter_id: impl Into<String>) -> Self {
        let chapter_id = chapter_id.into();
        self.target_chapter = (!chapter_id.trim().is_empty()).then_some(chapter_id);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_mainline(&self) -> bool {
        self.layer == Layer::Mainline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Layer::EasterEgg).unwrap();
        assert_eq!(json, "\"彩蛋\"");
        let status: Status = serde_json::from_str("\"待收\"").unwrap();
        assert_eq!(status, Status::Pending);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("主线".parse::<Layer>().unwrap(), Layer::Mainline);
        assert_eq!("subplot".parse::<Layer>().unwrap(), Layer::Subplot);
        assert_eq!("已收".parse::<Status>().unwrap(), Status::Resolved);
        assert!(matches!(
            "open".parse::<Status>(),
            Err(NarrativeError::UnknownLabel { kind: "status", .. })
        ));
    }

    #[test]
    fn test_open_statuses() {
        assert!(Status::Planted.is_open());
        assert!(Status::Pending.is_open());
        assert!(!Status::Resolved.is_open());
        assert!(!Status::Abandoned.is_open());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(Status::Planted.can_advance_to(Status::Pending));
        assert!(Status::Pending.can_advance_to(Status::Resolved));
        assert!(Status::Resolved.can_advance_to(Status::Abandoned));
        assert!(Status::Resolved.can_advance_to(Status::Resolved));

        assert!(!Status::Resolved.can_advance_to(Status::Planted));
        assert!(!Status::Planted.can_advance_to(Status::Resolved));
        assert!(!Status::Abandoned.can_advance_to(Status::Pending));
    }

    #[test]
    fn test_node_builder() {
        let node = ForeshadowingNode::new("fs_001", "玉佩来历")
            .with_weight(9)
            .with_layer(Layer::Mainline)
            .planted_in("ch_001")
            .with_target_chapter("  ");

        assert_eq!(node.weight, 9);
        assert!(node.is_mainline());
        assert_eq!(node.status, Status::Planted);
        assert_eq!(node.target_chapter, None);
    }
}
