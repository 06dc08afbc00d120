//! Foreshadowing graph - nodes, typed edges, lifecycle and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use story_rules::{check_weight, find_cycle, ChapterOrder};

use super::{EdgeType, ForeshadowingEdge, ForeshadowingNode, Layer, Status};
use crate::error::{NarrativeError, Result};

/// Weight at which a mainline thread is expected to have a recovery plan.
pub const KEY_THREAD_WEIGHT: u8 = 9;

/// Which status changes [`ForeshadowingGraph::update_status`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status may follow any other.
    #[default]
    Permissive,
    /// Only [`Status::can_advance_to`] moves are accepted.
    Strict,
}

/// Findings of [`ForeshadowingGraph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Counts returned by [`ForeshadowingGraph::statistics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_layer: BTreeMap<String, usize>,
    pub by_weight: BTreeMap<u8, usize>,
}

/// The foreshadowing graph of one novel.
///
/// Node status lives on the node only. Files written by older versions that
/// also carry a top-level `status` index are folded in at load time, the
/// index winning over the embedded value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GraphFile")]
pub struct ForeshadowingGraph {
    nodes: BTreeMap<String, ForeshadowingNode>,
    edges: Vec<ForeshadowingEdge>,
}

#[derive(Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: BTreeMap<String, ForeshadowingNode>,
    #[serde(default)]
    edges: Vec<ForeshadowingEdge>,
    #[serde(default)]
    status: BTreeMap<String, String>,
}

impl From<GraphFile> for ForeshadowingGraph {
    fn from(file: GraphFile) -> Self {
        let mut nodes = file.nodes;
        for (id, label) in file.status {
            if let (Some(node), Ok(status)) = (nodes.get_mut(&id), label.parse::<Status>()) {
                node.status = status;
            }
        }
        Self {
            nodes,
            edges: file.edges,
        }
    }
}

impl ForeshadowingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node as `埋伏`. Returns `false` and changes nothing if the id exists.
    pub fn create_node(&mut self, mut node: ForeshadowingNode) -> Result<bool> {
        if self.nodes.contains_key(&node.id) {
            return Ok(false);
        }
        check_weight(i64::from(node.weight))?;
        node.status = Status::Planted;
        self.nodes.insert(node.id.clone(), node);
        Ok(true)
    }

    /// Add an edge. `from` must be a node; `to` a node or a recovery point.
    pub fn create_edge(
        &mut self,
        from: &str,
        to: &str,
        edge_type: EdgeType,
    ) -> Result<&ForeshadowingEdge> {
        if !self.nodes.contains_key(from) {
            return Err(NarrativeError::UnknownNode(from.to_string()));
        }
        let edge = ForeshadowingEdge::new(from, to, edge_type);
        if !self.nodes.contains_key(to) && !edge.targets_recovery_point() {
            return Err(NarrativeError::UnknownEdgeTarget(to.to_string()));
        }
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Change a node's status, returning the previous one.
    pub fn update_status(
        &mut self,
        id: &str,
        status: Status,
        policy: TransitionPolicy,
    ) -> Result<Status> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| NarrativeError::UnknownNode(id.to_string()))?;
        let previous = node.status;
        if policy == TransitionPolicy::Strict && !previous.can_advance_to(status) {
            return Err(NarrativeError::ForbiddenTransition {
                from: previous,
                to: status,
            });
        }
        node.status = status;
        Ok(previous)
    }

    pub fn get_node(&self, id: &str) -> Option<&ForeshadowingNode> {
        self.nodes.get(id)
    }

    /// Nodes ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &ForeshadowingNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[ForeshadowingEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Open nodes at or above `min_weight`, heaviest first, ties by id.
    pub fn pending_nodes(&self, min_weight: u8) -> Vec<&ForeshadowingNode> {
        let mut pending: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.status.is_open() && n.weight >= min_weight)
            .collect();
        pending.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.id.cmp(&b.id)));
        pending
    }

    /// Open nodes with a planned recovery, in chapter order of that plan.
    pub fn recovery_timeline(&self) -> Vec<&ForeshadowingNode> {
        let mut planned: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.status.is_open())
            .filter_map(|n| n.target_chapter.as_deref().map(|t| (ChapterOrder::of(t), n)))
            .collect();
        planned.sort_by(|(a, na), (b, nb)| a.cmp(b).then_with(|| na.id.cmp(&nb.id)));
        planned.into_iter().map(|(_, n)| n).collect()
    }

    /// A loop among `依赖` edges between known nodes, if any.
    pub fn dependency_cycle(&self) -> Option<Vec<String>> {
        find_cycle(&self.edges, |edge| {
            (edge.edge_type == EdgeType::Depends && self.nodes.contains_key(&edge.to))
                .then(|| (edge.from.as_str(), edge.to.as_str()))
        })
    }

    /// Structural and policy checks over the whole graph.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.from) {
                report
                    .errors
                    .push(format!("edge references unknown source node: {}", edge.from));
            }
            if !self.nodes.contains_key(&edge.to) && !edge.targets_recovery_point() {
                report
                    .errors
                    .push(format!("edge references unknown target node: {}", edge.to));
            }
        }

        for node in self.nodes.values() {
            if !self.edges.iter().any(|e| e.touches(&node.id)) {
                report
                    .warnings
                    .push(format!("orphan foreshadowing node: {}", node.id));
            }

            let key_thread = node.is_mainline() && node.weight >= KEY_THREAD_WEIGHT;
            if key_thread && node.target_chapter.is_none() {
                report.warnings.push(format!(
                    "mainline foreshadowing {} (weight {}) has no target chapter",
                    node.id, node.weight
                ));
            }
            if key_thread && node.status == Status::Abandoned {
                report.warnings.push(format!(
                    "mainline foreshadowing {} (weight {}) is abandoned; confirm this is intentional",
                    node.id, node.weight
                ));
            }

            if node.status == Status::Resolved && node.target_chapter.is_none() {
                report.info.push(format!(
                    "resolved foreshadowing {} has no recorded target chapter",
                    node.id
                ));
            }
            if let Some(target) = node.target_chapter.as_deref().filter(|_| key_thread) {
                report.info.push(format!(
                    "mainline foreshadowing {} is planned for recovery in {}",
                    node.id, target
                ));
            }
        }

        if let Some(cycle) = self.dependency_cycle() {
            report
                .info
                .push(format!("dependency loop: {}", cycle.join(" -> ")));
        }

        report
    }

    /// Soft warnings for weights that do not fit their layer.
    pub fn weight_advisories(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter_map(|node| match node.layer {
                Layer::Mainline if node.weight < 7 => Some(format!(
                    "mainline foreshadowing {} has weight {}; 7 or above is expected",
                    node.id, node.weight
                )),
                Layer::EasterEgg if node.weight > 5 => Some(format!(
                    "easter-egg foreshadowing {} has weight {}; 5 or below is expected",
                    node.id, node.weight
                )),
                _ => None,
            })
            .collect()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            by_status: Status::ALL.iter().map(|s| (s.to_string(), 0)).collect(),
            by_layer: Layer::ALL.iter().map(|l| (l.to_string(), 0)).collect(),
            by_weight: BTreeMap::new(),
        };

        for node in self.nodes.values() {
            *stats.by_status.entry(node.status.to_string()).or_default() += 1;
            *stats.by_layer.entry(node.layer.to_string()).or_default() += 1;
            *stats.by_weight.entry(node.weight).or_default() += 1;
        }

        stats
    }
}
