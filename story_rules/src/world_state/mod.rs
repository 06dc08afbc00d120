//! World graph - entities of the fictional world and directed, weighted relations between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::cycles::find_cycle;
use crate::error::RulesError;

/// Relation label that encodes a strict hierarchy (e.g. cultivation realms).
pub const HIERARCHY_RELATION: &str = "above";

/// Validate a weight on the 1-10 scale used by relations and foreshadowing nodes.
pub fn check_weight(weight: i64) -> Result<u8, RulesError> {
    if (1..=10).contains(&weight) {
        Ok(weight as u8)
    } else {
        Err(RulesError::WeightOutOfRange(weight))
    }
}

/// A node in the world graph: faction, location, concept, realm, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEntity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default = "WorldEntity::default_type")]
    pub entity_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl WorldEntity {
    /// Create a new entity of the default `concept` type.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: Self::default_type(),
            description: String::new(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    fn default_type() -> String {
        "concept".to_string()
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A directed relation between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRelation {
    pub source_id: String,
    pub target_id: String,
    pub relation: String,
    #[serde(default = "WorldRelation::default_weight")]
    pub weight: u8,
    #[serde(default)]
    pub note: String,
}

impl WorldRelation {
    /// Create a relation with weight 1 and no note.
    pub fn new(
        source_id: impl Into<String>,
        relation: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation: relation.into(),
            weight: Self::default_weight(),
            note: String::new(),
        }
    }

    fn default_weight() -> u8 {
        1
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// The `(source, relation, target)` triple used for ordering and duplicate detection.
    pub fn triple(&self) -> (&str, &str, &str) {
        (&self.source_id, &self.relation, &self.target_id)
    }
}

/// Batched result of [`WorldGraph::check_conflicts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub entity_count: usize,
    pub relation_count: usize,
}

impl ConflictReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The complete world graph of one novel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldGraph {
    #[serde(default)]
    pub entities: BTreeMap<String, WorldEntity>,
    #[serde(default)]
    pub relations: Vec<WorldRelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorldGraph {
    /// Create a new empty world graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any previous record with the same id.
    pub fn upsert_entity(&mut self, entity: WorldEntity) -> &WorldEntity {
        let id = entity.id.clone();
        self.entities.insert(id.clone(), entity);
        &self.entities[&id]
    }

    /// Append a relation. Both endpoints must already exist.
    ///
    /// Duplicate triples are accepted here and reported by [`Self::check_conflicts`].
    pub fn add_relation(&mut self, relation: WorldRelation) -> Result<&WorldRelation, RulesError> {
        check_weight(i64::from(relation.weight))?;
        if !self.entities.contains_key(&relation.source_id) {
            return Err(RulesError::UnknownEntity {
                role: "source",
                id: relation.source_id,
            });
        }
        if !self.entities.contains_key(&relation.target_id) {
            return Err(RulesError::UnknownEntity {
                role: "target",
                id: relation.target_id,
            });
        }
        self.relations.push(relation);
        Ok(&self.relations[self.relations.len() - 1])
    }

    pub fn get_entity(&self, id: &str) -> Option<&WorldEntity> {
        self.entities.get(id)
    }

    /// Entities ordered by id, optionally restricted to one type.
    pub fn list_entities(&self, entity_type: Option<&str>) -> Vec<&WorldEntity> {
        self.entities
            .values()
            .filter(|e| entity_type.map_or(true, |t| e.entity_type == t))
            .collect()
    }

    /// Relations ordered by `(source, relation, target)`, optionally restricted to one label.
    pub fn list_relations(&self, relation: Option<&str>) -> Vec<&WorldRelation> {
        let mut items: Vec<_> = self
            .relations
            .iter()
            .filter(|r| relation.map_or(true, |label| r.relation == label))
            .collect();
        items.sort_by(|a, b| a.triple().cmp(&b.triple()));
        items
    }

    /// Outgoing relations of an entity, paired with their resolved targets.
    pub fn related_entities(
        &self,
        entity_id: &str,
        relation: Option<&str>,
    ) -> Vec<(&WorldRelation, &WorldEntity)> {
        self.relations
            .iter()
            .filter(|r| r.source_id == entity_id)
            .filter(|r| relation.map_or(true, |label| r.relation == label))
            .filter_map(|r| self.entities.get(&r.target_id).map(|target| (r, target)))
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Bounded, deterministic one-line digest of the graph.
    pub fn summary(&self, max_entities: usize, max_relations: usize) -> String {
        if self.entities.is_empty() {
            return "no world graph yet".to_string();
        }

        let entity_part = self
            .entities
            .values()
            .take(max_entities)
            .map(|e| format!("{}<{}>", e.name, e.entity_type))
            .collect::<Vec<_>>()
            .join(", ");

        let mut relations: Vec<_> = self.relations.iter().collect();
        relations.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.relation.cmp(&b.relation)));

        let relation_parts: Vec<String> = relations
            .into_iter()
            .take(max_relations)
            .filter_map(|r| {
                let source = self.entities.get(&r.source_id)?;
                let target = self.entities.get(&r.target_id)?;
                Some(format!("{}-{}->{}", source.name, r.relation, target.name))
            })
            .collect();

        if relation_parts.is_empty() {
            format!("entities: {}; relations: none", entity_part)
        } else {
            format!("entities: {}; relations: {}", entity_part, relation_parts.join("; "))
        }
    }

    /// Report dangling endpoints, duplicate triples and cycles among `above` relations.
    pub fn check_conflicts(&self) -> ConflictReport {
        let mut report = ConflictReport {
            entity_count: self.entities.len(),
            relation_count: self.relations.len(),
            ..ConflictReport::default()
        };

        for rel in &self.relations {
            if !self.entities.contains_key(&rel.source_id) {
                report
                    .errors
                    .push(format!("relation source entity does not exist: {}", rel.source_id));
            }
            if !self.entities.contains_key(&rel.target_id) {
                report
                    .errors
                    .push(format!("relation target entity does not exist: {}", rel.target_id));
            }
        }

        let mut seen = HashSet::new();
        for rel in &self.relations {
            if !seen.insert(rel.triple()) {
                report.warnings.push(format!(
                    "duplicate relation: {}-{}->{}",
                    rel.source_id, rel.relation, rel.target_id
                ));
            }
        }

        let cycle = find_cycle(&self.relations, |r| {
            (r.relation == HIERARCHY_RELATION).then_some((r.source_id.as_str(), r.target_id.as_str()))
        });
        if let Some(path) = cycle {
            report.errors.push(format!(
                "hierarchy cycle in `{}` relations: {}",
                HIERARCHY_RELATION,
                path.join(" -> ")
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn realms() -> WorldGraph {
        let mut graph = WorldGraph::new();
        for (id, name) in [("a", "金丹"), ("b", "筑基"), ("c", "练气")] {
            graph.upsert_entity(WorldEntity::new(id, name).with_type("realm"));
        }
        graph
    }

    #[test]
    fn test_upsert_replaces() {
        let mut graph = WorldGraph::new();
        graph.upsert_entity(WorldEntity::new("qingyun", "青云门").with_type("faction"));
        graph.upsert_entity(
            WorldEntity::new("qingyun", "青云宗")
                .with_type("faction")
                .with_attribute("leader", "道玄"),
        );

        assert_eq!(graph.entity_count(), 1);
        let entity = graph.get_entity("qingyun").unwrap();
        assert_eq!(entity.name, "青云宗");
        assert_eq!(entity.attributes["leader"], "道玄");
    }

    #[test]
    fn test_add_relation_requires_endpoints() {
        let mut graph = realms();
        let err = graph
            .add_relation(WorldRelation::new("a", "above", "missing"))
            .unwrap_err();
        assert_eq!(
            err,
            RulesError::UnknownEntity {
                role: "target",
                id: "missing".to_string()
            }
        );
        assert_eq!(graph.relation_count(), 0);
    }

    #[test]
    fn test_add_relation_checks_weight() {
        let mut graph = realms();
        let err = graph
            .add_relation(WorldRelation::new("a", "above", "b").with_weight(11))
            .unwrap_err();
        assert_eq!(err, RulesError::WeightOutOfRange(11));
    }

    #[test]
    fn test_above_cycle_detected() {
        let mut graph = realms();
        graph.add_relation(WorldRelation::new("a", "above", "b")).unwrap();
        graph.add_relation(WorldRelation::new("b", "above", "c")).unwrap();
        graph.add_relation(WorldRelation::new("c", "above", "a")).unwrap();

        let report = graph.check_conflicts();
        assert!(!report.is_valid());
        let cycle_errors: Vec<_> = report.errors.iter().filter(|e| e.contains("cycle")).collect();
        assert_eq!(cycle_errors.len(), 1);
        let path = cycle_errors[0].rsplit(": ").next().unwrap();
        let members: Vec<_> = path.split(" -> ").collect();
        assert_eq!(members, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_removing_one_relation_breaks_cycle() {
        let edges = [("a", "b"), ("b", "c"), ("c", "a")];
        for skip in 0..edges.len() {
            let mut graph = realms();
            for (i, (s, t)) in edges.iter().enumerate() {
                if i != skip {
                    graph.add_relation(WorldRelation::new(*s, "above", *t)).unwrap();
                }
            }
            let report = graph.check_conflicts();
            assert!(report.errors.iter().all(|e| !e.contains("cycle")));
        }
    }

    #[test]
    fn test_cycle_in_other_labels_is_ignored() {
        let mut graph = realms();
        graph.add_relation(WorldRelation::new("a", "near", "b")).unwrap();
        graph.add_relation(WorldRelation::new("b", "near", "a")).unwrap();
        assert!(graph.check_conflicts().is_valid());
    }

    #[test]
    fn test_duplicates_and_dangling() {
        let mut graph = realms();
        graph.add_relation(WorldRelation::new("a", "protects", "b")).unwrap();
        graph.add_relation(WorldRelation::new("a", "protects", "b")).unwrap();
        // Hand-edited files can reference entities that no longer exist.
        graph.relations.push(WorldRelation::new("ghost", "located_in", "a"));

        let report = graph.check_conflicts();
        assert_eq!(report.warnings, vec!["duplicate relation: a-protects->b"]);
        assert_eq!(report.errors, vec!["relation source entity does not exist: ghost"]);
        assert_eq!(report.relation_count, 3);
        assert_eq!(report.entity_count, 3);
    }

    #[test]
    fn test_list_ordering_and_filters() {
        let mut graph = realms();
        graph.upsert_entity(WorldEntity::new("town", "青云镇").with_type("location"));
        graph.add_relation(WorldRelation::new("b", "above", "c")).unwrap();
        graph.add_relation(WorldRelation::new("a", "above", "b")).unwrap();
        graph.add_relation(WorldRelation::new("a", "near", "town")).unwrap();

        let ids: Vec<_> = graph.list_entities(Some("realm")).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let triples: Vec<_> = graph.list_relations(None).iter().map(|r| r.triple()).collect();
        assert_eq!(
            triples,
            vec![("a", "above", "b"), ("a", "near", "town"), ("b", "above", "c")]
        );
        assert_eq!(graph.list_relations(Some("near")).len(), 1);

        let related = graph.related_entities("a", Some("above"));
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].1.name, "筑基");
    }

    #[test]
    fn test_summary_is_bounded_and_ordered() {
        let mut graph = realms();
        graph.add_relation(WorldRelation::new("b", "above", "c").with_weight(3)).unwrap();
        graph.add_relation(WorldRelation::new("a", "above", "b").with_weight(9)).unwrap();

        assert_eq!(
            graph.summary(2, 1),
            "entities: 金丹<realm>, 筑基<realm>; relations: 金丹-above->筑基"
        );
        assert_eq!(WorldGraph::new().summary(5, 5), "no world graph yet");
    }

    #[test]
    fn test_summary_skips_dangling_relations() {
        let mut graph = realms();
        graph.relations.push(WorldRelation::new("ghost", "above", "a").with_weight(10));
        assert!(graph.summary(3, 3).ends_with("relations: none"));
    }
}
