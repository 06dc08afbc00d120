//! The world graph file of one novel.

use chrono::Utc;
use tracing::{info, warn};

use story_rules::{ConflictReport, WorldEntity, WorldGraph, WorldRelation};

use crate::error::Result;
use crate::store::{NovelLayout, RecordFile};

/// Persistent front of [`WorldGraph`]. Every write restamps `updated_at`.
#[derive(Debug, Clone)]
pub struct WorldStore {
    file: RecordFile<WorldGraph>,
}

impl WorldStore {
    pub fn new(layout: &NovelLayout) -> Self {
        Self {
            file: RecordFile::new(layout.world_file()),
        }
    }

    pub fn graph(&self) -> Result<WorldGraph> {
        self.file.load()
    }

    pub fn upsert_entity(&self, entity: WorldEntity) -> Result<WorldEntity> {
        let stored = self.file.modify(|graph| {
            graph.updated_at = Some(Utc::now());
            Ok(graph.upsert_entity(entity).clone())
        })?;
        info!(entity = %stored.id, entity_type = %stored.entity_type, "world entity upserted");
        Ok(stored)
    }

    pub fn add_relation(&self, relation: WorldRelation) -> Result<WorldRelation> {
        let stored = self.file.modify(|graph| {
            let stored = graph.add_relation(relation)?.clone();
            graph.updated_at = Some(Utc::now());
            Ok(stored)
        })?;
        info!(
            source = %stored.source_id,
            relation = %stored.relation,
            target = %stored.target_id,
            "world relation added"
        );
        Ok(stored)
    }

    pub fn list_entities(&self, entity_type: Option<&str>) -> Result<Vec<WorldEntity>> {
        let graph = self.graph()?;
        Ok(graph.list_entities(entity_type).into_iter().cloned().collect())
    }

    pub fn list_relations(&self, relation: Option<&str>) -> Result<Vec<WorldRelation>> {
        let graph = self.graph()?;
        Ok(graph.list_relations(relation).into_iter().cloned().collect())
    }

    pub fn related_entities(
        &self,
        entity_id: &str,
        relation: Option<&str>,
    ) -> Result<Vec<(WorldRelation, WorldEntity)>> {
        let graph = self.graph()?;
        Ok(graph
            .related_entities(entity_id, relation)
            .into_iter()
            .map(|(r, e)| (r.clone(), e.clone()))
            .collect())
    }

    pub fn summary(&self, max_entities: usize, max_relations: usize) -> Result<String> {
        Ok(self.graph()?.summary(max_entities, max_relations))
    }

    pub fn check_conflicts(&self) -> Result<ConflictReport> {
        let report = self.graph()?.check_conflicts();
        if !report.is_valid() {
            warn!(errors = report.errors.len(), "world graph has conflicts");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NarrativeError;
    use story_rules::RulesError;
    use tempfile::TempDir;

    #[test]
    fn test_world_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = WorldStore::new(&NovelLayout::new(dir.path(), "novel"));

        store
            .upsert_entity(WorldEntity::new("shushan", "蜀山派").with_type("faction"))
            .unwrap();
        store
            .upsert_entity(WorldEntity::new("li", "李逍遥").with_type("character"))
            .unwrap();
        store
            .add_relation(WorldRelation::new("li", "member_of", "shushan").with_weight(8))
            .unwrap();

        let graph = store.graph().unwrap();
        assert!(graph.updated_at.is_some());
        assert_eq!(store.list_entities(Some("faction")).unwrap().len(), 1);

        let related = store.related_entities("li", None).unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].1.name, "蜀山派");
        assert!(store.check_conflicts().unwrap().is_valid());
    }

    #[test]
    fn test_relation_to_missing_entity_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let store = WorldStore::new(&NovelLayout::new(dir.path(), "novel"));
        store.upsert_entity(WorldEntity::new("a", "A")).unwrap();

        let err = store
            .add_relation(WorldRelation::new("a", "above", "ghost"))
            .unwrap_err();
        assert!(matches!(
            err,
            NarrativeError::Rules(RulesError::UnknownEntity { role: "target", .. })
        ));
        assert!(store.list_relations(None).unwrap().is_empty());
    }
}
