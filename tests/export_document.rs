//! Document builder behavior over an in-memory schema source.
//!
//! These tests drive the same builder the `export` and `sample` commands
//! use, without a live database.

use serde_json::json;

use catx::export::{build_document, write_document};
use catx::models::{ExportDocument, ExportInfo};
use catx::path::LEVELS;
use catx::progress::NoProgress;
use catx::sample::{build_sample, SampleInfo};
use catx::schema::{
    ExplanationRow, HardLogicRow, HierarchyRow, LevelRow, MemorySchemaSource, SoftLogicRow,
};

fn info() -> ExportInfo {
    ExportInfo {
        timestamp: "2026-08-24T00:00:00+00:00".to_string(),
        database: "aicategorymapping".to_string(),
        description: "Complete export of all categories and related data".to_string(),
    }
}

fn sample_info() -> SampleInfo {
    SampleInfo {
        timestamp: "2026-08-24T00:00:00+00:00".to_string(),
        database: "aicategorymapping".to_string(),
        export_type: "simple_export".to_string(),
    }
}

/// A left-packed hierarchy row from `(id, name)` pairs.
fn chain(pairs: &[(i32, &str)]) -> HierarchyRow {
    let mut row = HierarchyRow::default();
    for (slot, (id, name)) in row.levels.iter_mut().zip(pairs) {
        *slot = Some((*id, name.to_string()));
    }
    row
}

/// Per-level names with the listed (1-based level, name) entries set.
fn names(entries: &[(usize, &str)]) -> [Option<String>; LEVELS] {
    let mut names: [Option<String>; LEVELS] = Default::default();
    for (level, name) in entries {
        names[level - 1] = Some(name.to_string());
    }
    names
}

fn level_row(id: i32, name: &str) -> LevelRow {
    LevelRow {
        id,
        name: name.to_string(),
    }
}

/// The two-level scenario: Electronics > Phones plus one hard-logic rule.
fn electronics_source() -> MemorySchemaSource {
    let mut source = MemorySchemaSource::new();
    source.levels[0].push(level_row(1, "Electronics"));
    source.levels[1].push(level_row(10, "Phones"));
    source.hierarchy.push(chain(&[(1, "Electronics"), (10, "Phones")]));
    source.hard_logic.push(HardLogicRow {
        word: "iphone".to_string(),
        is_pattern: false,
        level_names: names(&[(1, "Electronics"), (2, "Phones")]),
    });
    source
}

async fn build(source: &MemorySchemaSource) -> ExportDocument {
    build_document(source, info(), &NoProgress).await.unwrap()
}

#[tokio::test]
async fn two_level_scenario_produces_expected_records() {
    let document = build(&electronics_source()).await;

    assert_eq!(document.categories.hierarchical.len(), 1);
    let path = serde_json::to_value(&document.categories.hierarchical[0]).unwrap();
    assert_eq!(
        path,
        json!({
            "level1": {"id": 1, "name": "Electronics"},
            "level2": {"id": 10, "name": "Phones"},
            "level3": null,
            "level4": null,
            "level5": null,
            "level6": null,
            "level7": null,
            "path": "Electronics > Phones",
            "depth": 2
        })
    );

    assert_eq!(document.logic_rules.hard_logic.len(), 1);
    let rule = serde_json::to_value(&document.logic_rules.hard_logic[0]).unwrap();
    assert_eq!(
        rule,
        json!({
            "word": "iphone",
            "is_pattern": false,
            "category_path": "Electronics > Phones",
            "levels": {
                "level1": "Electronics",
                "level2": "Phones",
                "level3": null,
                "level4": null,
                "level5": null,
                "level6": null,
                "level7": null
            }
        })
    );
}

#[tokio::test]
async fn childless_root_yields_depth_one_path() {
    let mut source = MemorySchemaSource::new();
    source.levels[0].push(level_row(1, "Electronics"));
    source.hierarchy.push(chain(&[(1, "Electronics")]));

    let document = build(&source).await;

    assert_eq!(document.categories.hierarchical.len(), 1);
    let path = &document.categories.hierarchical[0];
    assert_eq!(path.path, "Electronics");
    assert_eq!(path.depth, 1);
    assert!(path.level2.is_none());

    let by_level = document.categories.by_level.as_array();
    assert_eq!(by_level[0].len(), 1);
    for list in &by_level[1..] {
        assert!(list.is_empty());
    }
}

#[tokio::test]
async fn empty_source_builds_an_empty_document() {
    let document = build(&MemorySchemaSource::new()).await;

    assert!(document.categories.hierarchical.is_empty());
    assert!(document
        .categories
        .by_level
        .as_array()
        .iter()
        .all(|list| list.is_empty()));
    assert!(document.logic_rules.hard_logic.is_empty());
    assert!(document.logic_rules.soft_logic.is_empty());
    assert!(document.explanations.is_empty());

    let stats = serde_json::to_value(&document.statistics).unwrap();
    assert_eq!(stats["total_hierarchical_paths"], 0);
    assert_eq!(stats["total_hard_logic_rules"], 0);
    assert_eq!(stats["total_soft_logic_rules"], 0);
    assert_eq!(stats["total_explanations"], 0);
    assert_eq!(stats["pattern_rules"], 0);
    assert_eq!(stats["word_rules"], 0);
}

#[tokio::test]
async fn rebuild_is_identical_except_for_the_timestamp() {
    let source = electronics_source();

    let first = serde_json::to_string_pretty(&build(&source).await).unwrap();
    let second = serde_json::to_string_pretty(&build(&source).await).unwrap();
    assert_eq!(first, second);

    let mut other_info = info();
    other_info.timestamp = "2026-08-25T12:00:00+00:00".to_string();
    let third = build_document(&source, other_info, &NoProgress)
        .await
        .unwrap();

    let mut first_value: serde_json::Value = serde_json::from_str(&first).unwrap();
    let mut third_value = serde_json::to_value(&third).unwrap();
    first_value["export_info"]["timestamp"] = json!("");
    third_value["export_info"]["timestamp"] = json!("");
    assert_eq!(first_value, third_value);
}

#[tokio::test]
async fn depth_counts_a_contiguous_prefix_of_levels() {
    let mut source = MemorySchemaSource::new();
    source.hierarchy.push(chain(&[(1, "Electronics")]));
    source
        .hierarchy
        .push(chain(&[(1, "Electronics"), (10, "Phones"), (100, "Android")]));
    source.hierarchy.push(chain(&[
        (2, "Home"),
        (20, "Kitchen"),
        (200, "Appliances"),
        (2000, "Ovens"),
        (20000, "Built-in"),
        (200000, "Electric"),
        (2000000, "Single"),
    ]));

    let document = build(&source).await;

    for path in &document.categories.hierarchical {
        let nodes = path.nodes();
        let present = nodes.iter().filter(|node| node.is_some()).count();
        assert_eq!(path.depth, present);
        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(node.is_some(), i < path.depth, "gap in {}", path.path);
        }
    }
}

#[tokio::test]
async fn category_path_is_null_iff_every_level_is_null() {
    let mut source = MemorySchemaSource::new();
    source.hard_logic.push(HardLogicRow {
        word: "unmapped".to_string(),
        is_pattern: false,
        level_names: Default::default(),
    });
    source.soft_logic.push(SoftLogicRow {
        keyword: "vague".to_string(),
        level_names: Default::default(),
    });
    source.explanations.push(ExplanationRow {
        id: 1,
        explanation: "attached to level 2 only".to_string(),
        level_names: names(&[(2, "Phones")]),
    });

    let document = build(&source).await;

    let rule = &document.logic_rules.hard_logic[0];
    assert!(rule.category_path.is_none());
    assert!(rule.levels.as_array().iter().all(|name| name.is_none()));

    assert!(document.logic_rules.soft_logic[0].category_path.is_none());

    let explanation = &document.explanations[0];
    assert_eq!(explanation.category_path.as_deref(), Some("Phones"));
}

#[tokio::test]
async fn gapped_rule_paths_skip_missing_levels() {
    let mut source = MemorySchemaSource::new();
    source.hard_logic.push(HardLogicRow {
        word: "blender".to_string(),
        is_pattern: false,
        level_names: names(&[(2, "Kitchen"), (4, "Blenders")]),
    });

    let document = build(&source).await;

    let rule = &document.logic_rules.hard_logic[0];
    assert_eq!(rule.category_path.as_deref(), Some("Kitchen > Blenders"));
    assert!(rule.levels.level1.is_none());
    assert_eq!(rule.levels.level2.as_deref(), Some("Kitchen"));
    assert_eq!(rule.levels.level4.as_deref(), Some("Blenders"));
}

#[tokio::test]
async fn level_lists_are_sorted_by_name_and_duplicate_free() {
    let mut source = MemorySchemaSource::new();
    source.levels[0].push(level_row(3, "Home"));
    source.levels[0].push(level_row(1, "Electronics"));
    source.levels[0].push(level_row(2, "Garden"));

    let document = build(&source).await;

    let level1 = &document.categories.by_level.level1;
    let names: Vec<&str> = level1.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, ["Electronics", "Garden", "Home"]);

    let mut ids: Vec<i32> = level1.iter().map(|node| node.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), level1.len());
}

#[tokio::test]
async fn statistics_are_a_pure_function_of_the_collections() {
    let mut source = electronics_source();
    source.hard_logic.push(HardLogicRow {
        word: "^galaxy.*".to_string(),
        is_pattern: true,
        level_names: names(&[(1, "Electronics")]),
    });
    source.soft_logic.push(SoftLogicRow {
        keyword: "smartphone".to_string(),
        level_names: names(&[(1, "Electronics"), (2, "Phones")]),
    });
    source.explanations.push(ExplanationRow {
        id: 7,
        explanation: "phones are electronics".to_string(),
        level_names: names(&[(1, "Electronics")]),
    });

    let document = build(&source).await;
    let stats = &document.statistics;

    assert_eq!(
        stats.total_hierarchical_paths,
        document.categories.hierarchical.len()
    );
    assert_eq!(
        stats.total_hard_logic_rules,
        document.logic_rules.hard_logic.len()
    );
    assert_eq!(
        stats.pattern_rules + stats.word_rules,
        stats.total_hard_logic_rules
    );
    assert_eq!(stats.pattern_rules, 1);
    assert_eq!(stats.word_rules, 1);
    assert_eq!(stats.total_soft_logic_rules, 1);
    assert_eq!(stats.total_explanations, 1);
    assert_eq!(stats.categories_by_level.level1, 1);
    assert_eq!(stats.categories_by_level.level2, 1);
    assert_eq!(stats.categories_by_level.level3, 0);
}

#[tokio::test]
async fn hierarchical_paths_are_ordered_by_id_per_level() {
    let mut source = MemorySchemaSource::new();
    source
        .hierarchy
        .push(chain(&[(2, "Home"), (21, "Kitchen")]));
    source
        .hierarchy
        .push(chain(&[(1, "Electronics"), (11, "TVs")]));
    source
        .hierarchy
        .push(chain(&[(1, "Electronics"), (10, "Phones")]));
    source.hierarchy.push(chain(&[(2, "Home")]));

    let document = build(&source).await;

    let paths: Vec<&str> = document
        .categories
        .hierarchical
        .iter()
        .map(|p| p.path.as_str())
        .collect();
    assert_eq!(
        paths,
        [
            "Electronics > Phones",
            "Electronics > TVs",
            "Home > Kitchen",
            "Home"
        ]
    );
}

#[tokio::test]
async fn rules_and_explanations_are_ordered_by_natural_key() {
    let mut source = MemorySchemaSource::new();
    for word in ["zebra", "apple", "mango"] {
        source.hard_logic.push(HardLogicRow {
            word: word.to_string(),
            is_pattern: false,
            level_names: Default::default(),
        });
    }
    for id in [30, 10, 20] {
        source.explanations.push(ExplanationRow {
            id,
            explanation: format!("explanation {}", id),
            level_names: Default::default(),
        });
    }

    let document = build(&source).await;

    let words: Vec<&str> = document
        .logic_rules
        .hard_logic
        .iter()
        .map(|r| r.word.as_str())
        .collect();
    assert_eq!(words, ["apple", "mango", "zebra"]);

    let ids: Vec<i32> = document.explanations.iter().map(|e| e.id).collect();
    assert_eq!(ids, [10, 20, 30]);
}

#[tokio::test]
async fn sample_document_has_expected_shape() {
    let mut source = MemorySchemaSource::new();
    source.levels[0].push(level_row(1, "Electronics"));
    source.levels[1].push(level_row(10, "Phones"));
    source.levels[2].push(level_row(100, "Android"));
    source
        .hierarchy
        .push(chain(&[(1, "Electronics"), (10, "Phones"), (100, "Android")]));

    let document = build_sample(&source, sample_info(), 50, &NoProgress)
        .await
        .unwrap();

    assert_eq!(document.hierarchical_sample.len(), 1);
    let entry = serde_json::to_value(&document.hierarchical_sample[0]).unwrap();
    assert_eq!(
        entry,
        json!({
            "level1": "Electronics",
            "level2": "Phones",
            "level3": "Android",
            "path": "Electronics > Phones > Android",
            "depth": 3
        })
    );

    assert_eq!(document.statistics.level1_count, 1);
    assert_eq!(document.statistics.total_categories, 3);
    assert_eq!(document.statistics.hierarchical_sample_count, 1);

    // The type discriminator serializes under its JSON name.
    let doc_value = serde_json::to_value(&document).unwrap();
    assert_eq!(doc_value["export_info"]["type"], "simple_export");
}

#[tokio::test]
async fn sample_respects_the_limit() {
    let mut source = MemorySchemaSource::new();
    for id in 1..=10 {
        source.hierarchy.push(chain(&[(id, &format!("Cat{:02}", id))]));
    }

    let document = build_sample(&source, sample_info(), 3, &NoProgress)
        .await
        .unwrap();
    assert_eq!(document.hierarchical_sample.len(), 3);
    assert_eq!(document.statistics.hierarchical_sample_count, 3);
}

#[tokio::test]
async fn written_document_round_trips_through_disk() {
    let document = build(&electronics_source()).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("categories_export.json");
    write_document(&document, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["export_info"]["database"], "aicategorymapping");
    assert_eq!(value["statistics"]["total_hierarchical_paths"], 1);
    assert_eq!(
        value["categories"]["hierarchical"][0]["path"],
        "Electronics > Phones"
    );
}
