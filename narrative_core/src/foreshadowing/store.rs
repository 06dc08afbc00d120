//! The foreshadowing graph file of one novel.

use tracing::{debug, info};

use super::{
    EdgeType, ForeshadowingEdge, ForeshadowingGraph, ForeshadowingNode, GraphStatistics, Status,
    TransitionPolicy, ValidationReport,
};
use crate::error::Result;
use crate::store::{NovelLayout, RecordFile};

/// Persistent front of [`ForeshadowingGraph`]. Every write is a whole-file rewrite.
#[derive(Debug, Clone)]
pub struct ForeshadowingStore {
    file: RecordFile<ForeshadowingGraph>,
    policy: TransitionPolicy,
}

impl ForeshadowingStore {
    pub fn new(layout: &NovelLayout, policy: TransitionPolicy) -> Self {
        Self {
            file: RecordFile::new(layout.foreshadowing_file()),
            policy,
        }
    }

    /// Current graph as stored.
    pub fn graph(&self) -> Result<ForeshadowingGraph> {
        self.file.load()
    }

    pub fn create_node(&self, node: ForeshadowingNode) -> Result<bool> {
        let id = node.id.clone();
        let created = self.file.modify(|graph| graph.create_node(node))?;
        if created {
            info!(node = %id, "foreshadowing node planted");
        } else {
            debug!(node = %id, "foreshadowing node already exists");
        }
        Ok(created)
    }

    pub fn create_edge(&self, from: &str, to: &str, edge_type: EdgeType) -> Result<ForeshadowingEdge> {
        let edge = self
            .file
            .modify(|graph| graph.create_edge(from, to, edge_type).cloned())?;
        info!(from, to, edge_type = %edge_type, "foreshadowing edge added");
        Ok(edge)
    }

    /// Change a node's status under the configured policy, returning the previous status.
    pub fn update_status(&self, id: &str, status: Status) -> Result<Status> {
        let policy = self.policy;
        let previous = self
            .file
            .modify(|graph| graph.update_status(id, status, policy))?;
        info!(node = id, from = %previous, to = %status, "foreshadowing status updated");
        Ok(previous)
    }

    pub fn pending_nodes(&self, min_weight: u8) -> Result<Vec<ForeshadowingNode>> {
        let graph = self.graph()?;
        Ok(graph.pending_nodes(min_weight).into_iter().cloned().collect())
    }

    pub fn validate(&self) -> Result<ValidationReport> {
        Ok(self.graph()?.validate())
    }

    pub fn statistics(&self) -> Result<GraphStatistics> {
        Ok(self.graph()?.statistics())
    }

    pub fn weight_advisories(&self) -> Result<Vec<String>> {
        Ok(self.graph()?.weight_advisories())
    }

    pub fn recovery_timeline(&self) -> Result<Vec<ForeshadowingNode>> {
        let graph = self.graph()?;
        Ok(graph.recovery_timeline().into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NarrativeError;
    use crate::foreshadowing::Layer;
    use tempfile::TempDir;

    fn store(dir: &TempDir, policy: TransitionPolicy) -> ForeshadowingStore {
        ForeshadowingStore::new(&NovelLayout::new(dir.path(), "novel"), policy)
    }

    #[test]
    fn test_writes_persist() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TransitionPolicy::Permissive);

        let node = ForeshadowingNode::new("fs_001", "神秘玉佩")
            .with_weight(9)
            .with_layer(Layer::Mainline)
            .planted_in("ch_001")
            .with_target_chapter("ch_050");
        assert!(store.create_node(node).unwrap());
        store
            .create_edge("fs_001", "fs_001_recover", EdgeType::Depends)
            .unwrap();
        store.update_status("fs_001", Status::Pending).unwrap();

        let reopened = ForeshadowingStore::new(
            &NovelLayout::new(dir.path(), "novel"),
            TransitionPolicy::Permissive,
        );
        let graph = reopened.graph().unwrap();
        assert_eq!(graph.get_node("fs_001").unwrap().status, Status::Pending);
        assert_eq!(graph.edges().len(), 1);
        assert!(dir
            .path()
            .join("data/novels/novel/foreshadowing/dag.json")
            .exists());
    }

    #[test]
    fn test_failed_write_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TransitionPolicy::Strict);
        store.create_node(ForeshadowingNode::new("a", "x")).unwrap();

        let err = store.update_status("a", Status::Resolved).unwrap_err();
        assert!(matches!(err, NarrativeError::ForbiddenTransition { .. }));
        assert_eq!(store.graph().unwrap().get_node("a").unwrap().status, Status::Planted);

        assert!(store.create_edge("a", "missing", EdgeType::Reverses).is_err());
        assert!(store.graph().unwrap().edges().is_empty());
    }

    #[test]
    fn test_empty_novel_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, TransitionPolicy::Permissive);
        assert!(store.pending_nodes(1).unwrap().is_empty());
        assert_eq!(store.statistics().unwrap().total_nodes, 0);
    }
}
