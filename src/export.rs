//! The full export: build the document and write it out.
//!
//! Orchestrates the schema source and path assembler into the five sections
//! of the export document, recomputes the statistics block from the
//! assembled collections, serializes the whole thing as pretty JSON, and
//! prints a summary. All or nothing: any fetch failure aborts the run and
//! no file is written.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::config::Config;
use crate::db;
use crate::error::ExportError;
use crate::models::{
    ByLevel, Categories, CategoryNode, Explanation, ExportDocument, ExportInfo, HardLogicRule,
    LevelCounts, LogicRules, SoftLogicRule, Statistics,
};
use crate::path::{assemble_hierarchy, join_names, GapPolicy, LEVELS};
use crate::progress::{ExportProgressEvent, ExportProgressReporter};
use crate::schema::{PgSchemaSource, SchemaSource};

const SECTION_HIERARCHICAL: &str = "hierarchical";
const SECTION_LEVELS: [&str; LEVELS] = [
    "level1", "level2", "level3", "level4", "level5", "level6", "level7",
];
const SECTION_HARD_LOGIC: &str = "hard_logic";
const SECTION_SOFT_LOGIC: &str = "soft_logic";
const SECTION_EXPLANATIONS: &str = "explanations";

/// Build the export document from a schema source.
///
/// `info` is supplied by the caller so the build itself is a deterministic
/// function of the source data — two builds with the same `info` against
/// unchanged data produce identical documents.
pub async fn build_document(
    source: &dyn SchemaSource,
    info: ExportInfo,
    progress: &dyn ExportProgressReporter,
) -> Result<ExportDocument, ExportError> {
    progress.report(ExportProgressEvent::Section {
        name: SECTION_HIERARCHICAL,
    });
    let hierarchical: Vec<_> = source
        .hierarchy()
        .await?
        .into_iter()
        .map(|row| assemble_hierarchy(row.levels).into())
        .collect();
    progress.report(ExportProgressEvent::SectionDone {
        name: SECTION_HIERARCHICAL,
        rows: hierarchical.len(),
    });

    let mut by_level = ByLevel::default();
    for level in 1..=LEVELS {
        let name = SECTION_LEVELS[level - 1];
        progress.report(ExportProgressEvent::Section { name });
        let nodes: Vec<CategoryNode> = source
            .level_categories(level)
            .await?
            .into_iter()
            .map(|row| CategoryNode {
                id: row.id,
                name: row.name,
            })
            .collect();
        progress.report(ExportProgressEvent::SectionDone {
            name,
            rows: nodes.len(),
        });
        by_level.set_level(level, nodes);
    }

    progress.report(ExportProgressEvent::Section {
        name: SECTION_HARD_LOGIC,
    });
    let hard_logic: Vec<HardLogicRule> = source
        .hard_logic()
        .await?
        .into_iter()
        .map(|row| HardLogicRule {
            word: row.word,
            is_pattern: row.is_pattern,
            category_path: join_names(&row.level_names, GapPolicy::SkipNulls),
            levels: row.level_names.into(),
        })
        .collect();
    progress.report(ExportProgressEvent::SectionDone {
        name: SECTION_HARD_LOGIC,
        rows: hard_logic.len(),
    });

    progress.report(ExportProgressEvent::Section {
        name: SECTION_SOFT_LOGIC,
    });
    let soft_logic: Vec<SoftLogicRule> = source
        .soft_logic()
        .await?
        .into_iter()
        .map(|row| SoftLogicRule {
            keyword: row.keyword,
            category_path: join_names(&row.level_names, GapPolicy::SkipNulls),
            levels: row.level_names.into(),
        })
        .collect();
    progress.report(ExportProgressEvent::SectionDone {
        name: SECTION_SOFT_LOGIC,
        rows: soft_logic.len(),
    });

    progress.report(ExportProgressEvent::Section {
        name: SECTION_EXPLANATIONS,
    });
    let explanations: Vec<Explanation> = source
        .explanations()
        .await?
        .into_iter()
        .map(|row| Explanation {
            id: row.id,
            explanation: row.explanation,
            category_path: join_names(&row.level_names, GapPolicy::SkipNulls),
            levels: row.level_names.into(),
        })
        .collect();
    progress.report(ExportProgressEvent::SectionDone {
        name: SECTION_EXPLANATIONS,
        rows: explanations.len(),
    });

    let categories = Categories {
        hierarchical,
        by_level,
    };
    let logic_rules = LogicRules {
        hard_logic,
        soft_logic,
    };
    let statistics = compute_statistics(&categories, &logic_rules, &explanations);

    Ok(ExportDocument {
        export_info: info,
        categories,
        logic_rules,
        explanations,
        statistics,
    })
}

/// Recompute the statistics block from the assembled collections. A pure
/// aggregate of the document's own content, so it cannot drift.
pub fn compute_statistics(
    categories: &Categories,
    logic_rules: &LogicRules,
    explanations: &[Explanation],
) -> Statistics {
    let level_lists = categories.by_level.as_array();
    let pattern_rules = logic_rules
        .hard_logic
        .iter()
        .filter(|rule| rule.is_pattern)
        .count();

    Statistics {
        total_hierarchical_paths: categories.hierarchical.len(),
        categories_by_level: LevelCounts {
            level1: level_lists[0].len(),
            level2: level_lists[1].len(),
            level3: level_lists[2].len(),
            level4: level_lists[3].len(),
            level5: level_lists[4].len(),
            level6: level_lists[5].len(),
            level7: level_lists[6].len(),
        },
        total_hard_logic_rules: logic_rules.hard_logic.len(),
        total_soft_logic_rules: logic_rules.soft_logic.len(),
        total_explanations: explanations.len(),
        pattern_rules,
        word_rules: logic_rules.hard_logic.len() - pattern_rules,
    }
}

/// Serialize a document as pretty JSON and write it to `path`.
pub fn write_document<T: serde::Serialize>(document: &T, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(document)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Run the export command: connect, build, write, summarize.
pub async fn run_export(
    config: &Config,
    output: Option<&Path>,
    progress: &dyn ExportProgressReporter,
) -> Result<()> {
    let pool = db::connect(&config.database).await?;
    let source = PgSchemaSource::new(pool.clone());

    let info = ExportInfo {
        timestamp: Utc::now().to_rfc3339(),
        database: config.database.dbname.clone(),
        description: config.export.description.clone(),
    };

    // Close the pool on every exit path, including a failed build.
    let result = build_document(&source, info, progress).await;
    pool.close().await;
    let document = result?;

    let path = output.unwrap_or(&config.export.output);
    write_document(&document, path)?;

    println!("Exported category taxonomy to {}", path.display());
    print_summary(&document.statistics);

    Ok(())
}

/// Print the statistics block the way `stats` prints counts.
fn print_summary(stats: &Statistics) {
    println!();
    println!("  Hierarchical paths:   {}", stats.total_hierarchical_paths);
    let counts = &stats.categories_by_level;
    for (name, count) in SECTION_LEVELS.iter().zip([
        counts.level1,
        counts.level2,
        counts.level3,
        counts.level4,
        counts.level5,
        counts.level6,
        counts.level7,
    ]) {
        println!("  Categories {}:    {}", name, count);
    }
    println!(
        "  Hard logic rules:     {} ({} patterns, {} words)",
        stats.total_hard_logic_rules, stats.pattern_rules, stats.word_rules
    );
    println!("  Soft logic keywords:  {}", stats.total_soft_logic_rules);
    println!("  Explanations:         {}", stats.total_explanations);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LevelNames;

    fn rule(word: &str, is_pattern: bool) -> HardLogicRule {
        HardLogicRule {
            word: word.to_string(),
            is_pattern,
            category_path: None,
            levels: LevelNames::default(),
        }
    }

    #[test]
    fn statistics_split_pattern_and_word_rules() {
        let categories = Categories {
            hierarchical: vec![],
            by_level: ByLevel::default(),
        };
        let logic_rules = LogicRules {
            hard_logic: vec![rule("iphone", false), rule("^galaxy.*", true), rule("tv", false)],
            soft_logic: vec![],
        };

        let stats = compute_statistics(&categories, &logic_rules, &[]);
        assert_eq!(stats.total_hard_logic_rules, 3);
        assert_eq!(stats.pattern_rules, 1);
        assert_eq!(stats.word_rules, 2);
        assert_eq!(
            stats.pattern_rules + stats.word_rules,
            stats.total_hard_logic_rules
        );
    }

    #[test]
    fn statistics_of_empty_collections_are_zero() {
        let categories = Categories {
            hierarchical: vec![],
            by_level: ByLevel::default(),
        };
        let logic_rules = LogicRules {
            hard_logic: vec![],
            soft_logic: vec![],
        };
        let stats = compute_statistics(&categories, &logic_rules, &[]);
        assert_eq!(stats, Statistics::default());
    }
}
