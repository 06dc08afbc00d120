use story_rules::*;

#[test]
fn test_summary_follows_chapter_ordered_actions() {
    let mut log = vec![
        ("ch_10", "realm:筑基"),
        ("ch_2", "acquire:青锋剑"),
        ("prologue", "flag:失忆"),
        ("ch_2", "move:仙灵岛"),
        ("ch_5", "use:青锋剑"),
    ];
    log.sort_by_key(|(chapter, _)| ChapterOrder::of(chapter));

    let chapters: Vec<_> = log.iter().map(|(chapter, _)| *chapter).collect();
    assert_eq!(chapters, vec!["ch_2", "ch_2", "ch_5", "ch_10", "prologue"]);

    let mut summary = CharacterSummary::new();
    for (_, expr) in &log {
        summary.apply(&StructuredAction::parse(expr).unwrap()).unwrap();
    }
    assert_eq!(summary.realm, "筑基");
    assert_eq!(summary.location, "仙灵岛");
    assert!(!summary.holds("青锋剑"));
    assert!(summary.has_status("失忆"));
}

#[test]
fn test_failed_action_leaves_summary_untouched() {
    let mut summary = CharacterSummary::new();
    summary
        .apply(&StructuredAction::parse("acquire:灵药 ×3").unwrap())
        .unwrap();
    let before = summary.clone();

    let err = summary
        .apply(&StructuredAction::parse("use:仙丹").unwrap())
        .unwrap_err();
    assert_eq!(err, RulesError::ItemNotHeld("仙丹".to_string()));
    assert_eq!(summary, before);
    assert_eq!(summary.item_count("灵药"), 3);
}

#[test]
fn test_world_graph_round_trip_keeps_conflicts() {
    let mut graph = WorldGraph::new();
    graph.upsert_entity(WorldEntity::new("tang", "唐门").with_type("faction"));
    graph.upsert_entity(WorldEntity::new("dian", "点苍").with_type("faction"));
    graph
        .add_relation(WorldRelation::new("tang", "above", "dian").with_weight(3))
        .unwrap();
    graph
        .add_relation(WorldRelation::new("dian", "above", "tang"))
        .unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let loaded: WorldGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded.relation_count(), 2);
    let report = loaded.check_conflicts();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("tang"));
    assert_eq!(
        loaded.summary(1, 1),
        "entities: 点苍<faction>; relations: 唐门-above->点苍"
    );
}
