//! The lighter sample export.
//!
//! Exports every per-level category list plus a bounded 3-level sample of
//! the hierarchy. Useful for a quick look at the taxonomy without pulling
//! the full join chain and rule tables.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::db;
use crate::error::ExportError;
use crate::models::{ByLevel, CategoryNode};
use crate::path::{join_names, GapPolicy, LEVELS};
use crate::progress::{ExportProgressEvent, ExportProgressReporter};
use crate::schema::{PgSchemaSource, SchemaSource};

/// Metadata for a sample export run.
#[derive(Debug, Clone, Serialize)]
pub struct SampleInfo {
    pub timestamp: String,
    pub database: String,
    #[serde(rename = "type")]
    pub export_type: String,
}

/// One entry of the 3-level hierarchical sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleEntry {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub path: String,
    pub depth: usize,
}

/// Counters for the sample document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleStatistics {
    pub level1_count: usize,
    pub level2_count: usize,
    pub level3_count: usize,
    pub level4_count: usize,
    pub level5_count: usize,
    pub level6_count: usize,
    pub level7_count: usize,
    pub total_categories: usize,
    pub hierarchical_sample_count: usize,
}

/// The sample export document.
#[derive(Debug, Clone, Serialize)]
pub struct SampleDocument {
    pub export_info: SampleInfo,
    pub categories_by_level: ByLevel,
    pub hierarchical_sample: Vec<SampleEntry>,
    pub statistics: SampleStatistics,
}

/// Build the sample document. Sample rows that resolved no names at all are
/// dropped; the counters are computed from the built lists.
pub async fn build_sample(
    source: &dyn SchemaSource,
    info: SampleInfo,
    limit: i64,
    progress: &dyn ExportProgressReporter,
) -> Result<SampleDocument, ExportError> {
    let mut categories_by_level = ByLevel::default();
    for level in 1..=LEVELS {
        let name = level_section(level);
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
        categories_by_level.set_level(level, nodes);
    }

    progress.report(ExportProgressEvent::Section {
        name: "hierarchical_sample",
    });
    let hierarchical_sample: Vec<SampleEntry> = source
        .hierarchy_sample(limit)
        .await?
        .into_iter()
        .filter_map(|row| {
            let path = join_names(&row.names, GapPolicy::SkipNulls)?;
            let depth = row.names.iter().flatten().count();
            let [level1, level2, level3] = row.names;
            Some(SampleEntry {
                level1,
                level2,
                level3,
                path,
                depth,
            })
        })
        .collect();
    progress.report(ExportProgressEvent::SectionDone {
        name: "hierarchical_sample",
        rows: hierarchical_sample.len(),
    });

    let statistics = compute_sample_statistics(&categories_by_level, &hierarchical_sample);

    Ok(SampleDocument {
        export_info: info,
        categories_by_level,
        hierarchical_sample,
        statistics,
    })
}

fn level_section(level: usize) -> &'static str {
    ["level1", "level2", "level3", "level4", "level5", "level6", "level7"][level - 1]
}

fn compute_sample_statistics(
    by_level: &ByLevel,
    sample: &[SampleEntry],
) -> SampleStatistics {
    let lists = by_level.as_array();
    SampleStatistics {
        level1_count: lists[0].len(),
        level2_count: lists[1].len(),
        level3_count: lists[2].len(),
        level4_count: lists[3].len(),
        level5_count: lists[4].len(),
        level6_count: lists[5].len(),
        level7_count: lists[6].len(),
        total_categories: lists.iter().map(|list| list.len()).sum(),
        hierarchical_sample_count: sample.len(),
    }
}

/// Run the sample command: connect, build, write, summarize.
pub async fn run_sample(
    config: &Config,
    output: Option<&Path>,
    limit: Option<i64>,
    progress: &dyn ExportProgressReporter,
) -> Result<()> {
    let pool = db::connect(&config.database).await?;
    let source = PgSchemaSource::new(pool.clone());

    let info = SampleInfo {
        timestamp: Utc::now().to_rfc3339(),
        database: config.database.dbname.clone(),
        export_type: "simple_export".to_string(),
    };
    let limit = limit.unwrap_or(config.export.sample_limit);

    let result = build_sample(&source, info, limit, progress).await;
    pool.close().await;
    let document = result?;

    let path = output.unwrap_or(&config.export.sample_output);
    crate::export::write_document(&document, path)?;

    println!("Exported category sample to {}", path.display());
    println!();
    println!(
        "  Categories:  {} across 7 levels",
        document.statistics.total_categories
    );
    println!(
        "  Sample:      {} hierarchical paths (limit {})",
        document.statistics.hierarchical_sample_count, limit
    );

    Ok(())
}
