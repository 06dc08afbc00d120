//! Typed edges between foreshadowing nodes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NarrativeError;

/// Suffixes marking an edge target as a recovery point rather than a node.
pub const RECOVERY_SUFFIXES: [&str; 2] = ["_recover", "-recover"];

/// Whether an edge target names a recovery point.
pub fn is_recovery_point(target: &str) -> bool {
    RECOVERY_SUFFIXES.iter().any(|suffix| target.ends_with(suffix))
}

/// How one thread relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Paying off `to` requires `from`.
    #[serde(rename = "依赖")]
    Depends,
    #[serde(rename = "强化")]
    Reinforces,
    #[serde(rename = "反转")]
    Reverses,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Depends => "依赖",
            EdgeType::Reinforces => "强化",
            EdgeType::Reverses => "反转",
        }
    }
}

impl FromStr for EdgeType {
    type Err = NarrativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "依赖" | "depends" => Ok(EdgeType::Depends),
            "强化" | "reinforces" => Ok(EdgeType::Reinforces),
            "反转" | "reverses" => Ok(EdgeType::Reverses),
            other => Err(NarrativeError::UnknownLabel {
                kind: "edge type",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeshadowingEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl ForeshadowingEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            edge_type,
        }
    }

    pub fn targets_recovery_point(&self) -> bool {
        is_recovery_point(&self.to)
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}
