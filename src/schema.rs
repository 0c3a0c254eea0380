//! Reading the category schema from its source.
//!
//! [`SchemaSource`] is the capability boundary between the document builders
//! and the database: it hands back raw row shapes with no transformation, in
//! the order the export exposes verbatim. [`PgSchemaSource`] issues the real
//! queries over a Postgres pool; [`MemorySchemaSource`] serves canned rows so
//! the builders can be exercised without a live database.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::ExportError;
use crate::path::LEVELS;

/// The seven leveled category tables, in level order.
pub const LEVEL_TABLES: [&str; LEVELS] = [
    "categories_level1",
    "categories_level2",
    "categories_level3",
    "categories_level4",
    "categories_level5",
    "categories_level6",
    "categories_level7",
];

/// Word rules: deterministic word/pattern-to-category assignments.
pub const HARD_LOGIC_TABLE: &str = "new_category_hardlogic";
/// Keyword-for-softlogic rules: advisory keyword-to-category signals.
pub const SOFT_LOGIC_TABLE: &str = "new_category_kfs";
/// Free-text explanations attached to category paths.
pub const EXPLANATIONS_TABLE: &str = "category_explanations";

/// One `(id, name)` pair from a level table.
#[derive(Debug, Clone)]
pub struct LevelRow {
    pub id: i32,
    pub name: String,
}

/// One row of the full 7-level outer-join chain. Left-packed by join
/// construction: a present slot implies the slot before it is present.
#[derive(Debug, Clone, Default)]
pub struct HierarchyRow {
    pub levels: [Option<(i32, String)>; LEVELS],
}

/// One row of the bounded 3-level sample join, names only.
#[derive(Debug, Clone, Default)]
pub struct SampleRow {
    pub names: [Option<String>; 3],
}

/// One hard-logic row with level names resolved by left join. Not
/// guaranteed left-packed — a rule may reference level 3 without level 1.
#[derive(Debug, Clone)]
pub struct HardLogicRow {
    pub word: String,
    pub is_pattern: bool,
    pub level_names: [Option<String>; LEVELS],
}

/// One soft-logic (keyword) row with level names resolved by left join.
#[derive(Debug, Clone)]
pub struct SoftLogicRow {
    pub keyword: String,
    pub level_names: [Option<String>; LEVELS],
}

/// One explanation row with level names resolved by left join.
#[derive(Debug, Clone)]
pub struct ExplanationRow {
    pub id: i32,
    pub explanation: String,
    pub level_names: [Option<String>; LEVELS],
}

/// Read-only access to the category schema.
///
/// Implementations must deliver rows already ordered: level lists by name,
/// the hierarchy by ascending id at each level in turn, rules by their
/// natural key. The export document exposes these orderings verbatim and
/// they must be stable across runs against unchanged data.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// All `(id, name)` pairs of one level (1-based), ordered by name.
    async fn level_categories(&self, level: usize) -> Result<Vec<LevelRow>, ExportError>;

    /// The full outer-join chain across all seven levels.
    async fn hierarchy(&self) -> Result<Vec<HierarchyRow>, ExportError>;

    /// A bounded 3-level sample of the hierarchy, ordered by names.
    async fn hierarchy_sample(&self, limit: i64) -> Result<Vec<SampleRow>, ExportError>;

    /// All hard-logic rules ordered by word.
    async fn hard_logic(&self) -> Result<Vec<HardLogicRow>, ExportError>;

    /// All soft-logic keywords ordered by keyword.
    async fn soft_logic(&self) -> Result<Vec<SoftLogicRow>, ExportError>;

    /// All explanations ordered by id.
    async fn explanations(&self) -> Result<Vec<ExplanationRow>, ExportError>;
}

const HIERARCHY_QUERY: &str = r#"
SELECT
    l1.level1_id, l1.category_name AS level1_name,
    l2.level2_id, l2.category_name AS level2_name,
    l3.level3_id, l3.category_name AS level3_name,
    l4.level4_id, l4.category_name AS level4_name,
    l5.level5_id, l5.category_name AS level5_name,
    l6.level6_id, l6.category_name AS level6_name,
    l7.level7_id, l7.category_name AS level7_name
FROM categories_level1 l1
LEFT JOIN categories_level2 l2 ON l1.level1_id = l2.level1_parent
LEFT JOIN categories_level3 l3 ON l2.level2_id = l3.level2_parent
LEFT JOIN categories_level4 l4 ON l3.level3_id = l4.level3_parent
LEFT JOIN categories_level5 l5 ON l4.level4_id = l5.level4_parent
LEFT JOIN categories_level6 l6 ON l5.level5_id = l6.level5_parent
LEFT JOIN categories_level7 l7 ON l6.level6_id = l7.level6_parent
ORDER BY l1.level1_id, l2.level2_id, l3.level3_id, l4.level4_id,
         l5.level5_id, l6.level6_id, l7.level7_id
"#;

const SAMPLE_QUERY: &str = r#"
SELECT
    l1.category_name AS level1_name,
    l2.category_name AS level2_name,
    l3.category_name AS level3_name
FROM categories_level1 l1
LEFT JOIN categories_level2 l2 ON l1.level1_id = l2.level1_parent
LEFT JOIN categories_level3 l3 ON l2.level2_id = l3.level2_parent
ORDER BY l1.category_name, l2.category_name, l3.category_name
LIMIT $1
"#;

const HARD_LOGIC_QUERY: &str = r#"
SELECT hl.word, hl.is_pattern,
       l1.category_name AS level1_name,
       l2.category_name AS level2_name,
       l3.category_name AS level3_name,
       l4.category_name AS level4_name,
       l5.category_name AS level5_name,
       l6.category_name AS level6_name,
       l7.category_name AS level7_name
FROM new_category_hardlogic hl
LEFT JOIN categories_level1 l1 ON hl.level1_id = l1.level1_id
LEFT JOIN categories_level2 l2 ON hl.level2_id = l2.level2_id
LEFT JOIN categories_level3 l3 ON hl.level3_id = l3.level3_id
LEFT JOIN categories_level4 l4 ON hl.level4_id = l4.level4_id
LEFT JOIN categories_level5 l5 ON hl.level5_id = l5.level5_id
LEFT JOIN categories_level6 l6 ON hl.level6_id = l6.level6_id
LEFT JOIN categories_level7 l7 ON hl.level7_id = l7.level7_id
ORDER BY hl.word
"#;

const SOFT_LOGIC_QUERY: &str = r#"
SELECT kfs.keyword,
       l1.category_name AS level1_name,
       l2.category_name AS level2_name,
       l3.category_name AS level3_name,
       l4.category_name AS level4_name,
       l5.category_name AS level5_name,
       l6.category_name AS level6_name,
       l7.category_name AS level7_name
FROM new_category_kfs kfs
LEFT JOIN categories_level1 l1 ON kfs.level1_id = l1.level1_id
LEFT JOIN categories_level2 l2 ON kfs.level2_id = l2.level2_id
LEFT JOIN categories_level3 l3 ON kfs.level3_id = l3.level3_id
LEFT JOIN categories_level4 l4 ON kfs.level4_id = l4.level4_id
LEFT JOIN categories_level5 l5 ON kfs.level5_id = l5.level5_id
LEFT JOIN categories_level6 l6 ON kfs.level6_id = l6.level6_id
LEFT JOIN categories_level7 l7 ON kfs.level7_id = l7.level7_id
ORDER BY kfs.keyword
"#;

const EXPLANATIONS_QUERY: &str = r#"
SELECT ce.id, ce.explanation,
       l1.category_name AS level1_name,
       l2.category_name AS level2_name,
       l3.category_name AS level3_name,
       l4.category_name AS level4_name,
       l5.category_name AS level5_name,
       l6.category_name AS level6_name,
       l7.category_name AS level7_name
FROM category_explanations ce
LEFT JOIN categories_level1 l1 ON ce.level1_id = l1.level1_id
LEFT JOIN categories_level2 l2 ON ce.level2_id = l2.level2_id
LEFT JOIN categories_level3 l3 ON ce.level3_id = l3.level3_id
LEFT JOIN categories_level4 l4 ON ce.level4_id = l4.level4_id
LEFT JOIN categories_level5 l5 ON ce.level5_id = l5.level5_id
LEFT JOIN categories_level6 l6 ON ce.level6_id = l6.level6_id
LEFT JOIN categories_level7 l7 ON ce.level7_id = l7.level7_id
ORDER BY ce.id
"#;

/// Schema reader over a live Postgres pool. Read-only; never mutates
/// source data.
pub struct PgSchemaSource {
    pool: PgPool,
}

impl PgSchemaSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Read the seven `level{N}_name` columns starting at `offset`.
fn read_level_names(row: &PgRow, offset: usize) -> Result<[Option<String>; LEVELS], sqlx::Error> {
    let mut names: [Option<String>; LEVELS] = Default::default();
    for (i, name) in names.iter_mut().enumerate() {
        *name = row.try_get(offset + i)?;
    }
    Ok(names)
}

fn read_hierarchy_row(row: &PgRow) -> Result<HierarchyRow, sqlx::Error> {
    let mut levels: [Option<(i32, String)>; LEVELS] = Default::default();
    for (i, slot) in levels.iter_mut().enumerate() {
        let id: Option<i32> = row.try_get(i * 2)?;
        let name: Option<String> = row.try_get(i * 2 + 1)?;
        // id and name come from the same joined table row, so they are
        // both-present or both-absent.
        *slot = id.zip(name);
    }
    Ok(HierarchyRow { levels })
}

#[async_trait]
impl SchemaSource for PgSchemaSource {
    async fn level_categories(&self, level: usize) -> Result<Vec<LevelRow>, ExportError> {
        assert!((1..=LEVELS).contains(&level), "level out of range");
        let table = LEVEL_TABLES[level - 1];
        let query = format!(
            "SELECT level{level}_id, category_name FROM {table} ORDER BY category_name"
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| ExportError::Query { table, source })?;

        rows.iter()
            .map(|row| {
                Ok(LevelRow {
                    id: row.try_get(0)?,
                    name: row.try_get(1)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(|source| ExportError::Query { table, source })
    }

    async fn hierarchy(&self) -> Result<Vec<HierarchyRow>, ExportError> {
        let map_err = |source| ExportError::Query {
            table: LEVEL_TABLES[0],
            source,
        };
        let rows = sqlx::query(HIERARCHY_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter()
            .map(read_hierarchy_row)
            .collect::<Result<_, sqlx::Error>>()
            .map_err(map_err)
    }

    async fn hierarchy_sample(&self, limit: i64) -> Result<Vec<SampleRow>, ExportError> {
        let map_err = |source| ExportError::Query {
            table: LEVEL_TABLES[0],
            source,
        };
        let rows = sqlx::query(SAMPLE_QUERY)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter()
            .map(|row| {
                Ok(SampleRow {
                    names: [row.try_get(0)?, row.try_get(1)?, row.try_get(2)?],
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(map_err)
    }

    async fn hard_logic(&self) -> Result<Vec<HardLogicRow>, ExportError> {
        let map_err = |source| ExportError::Query {
            table: HARD_LOGIC_TABLE,
            source,
        };
        let rows = sqlx::query(HARD_LOGIC_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter()
            .map(|row| {
                Ok(HardLogicRow {
                    word: row.try_get(0)?,
                    is_pattern: row.try_get(1)?,
                    level_names: read_level_names(row, 2)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(map_err)
    }

    async fn soft_logic(&self) -> Result<Vec<SoftLogicRow>, ExportError> {
        let map_err = |source| ExportError::Query {
            table: SOFT_LOGIC_TABLE,
            source,
        };
        let rows = sqlx::query(SOFT_LOGIC_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter()
            .map(|row| {
                Ok(SoftLogicRow {
                    keyword: row.try_get(0)?,
                    level_names: read_level_names(row, 1)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(map_err)
    }

    async fn explanations(&self) -> Result<Vec<ExplanationRow>, ExportError> {
        let map_err = |source| ExportError::Query {
            table: EXPLANATIONS_TABLE,
            source,
        };
        let rows = sqlx::query(EXPLANATIONS_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter()
            .map(|row| {
                Ok(ExplanationRow {
                    id: row.try_get(0)?,
                    explanation: row.try_get(1)?,
                    level_names: read_level_names(row, 2)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(map_err)
    }
}

/// In-memory schema source for tests and offline experiments.
///
/// Rows are stored unordered; the getters sort exactly the way the SQL
/// `ORDER BY` clauses would (nulls last), so the builders see the same
/// contract either way.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaSource {
    pub levels: [Vec<LevelRow>; LEVELS],
    pub hierarchy: Vec<HierarchyRow>,
    pub hard_logic: Vec<HardLogicRow>,
    pub soft_logic: Vec<SoftLogicRow>,
    pub explanations: Vec<ExplanationRow>,
}

impl MemorySchemaSource {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort key matching `ORDER BY id` per level with nulls last.
fn hierarchy_key(row: &HierarchyRow) -> [(bool, i32); LEVELS] {
    let mut key = [(true, 0); LEVELS];
    for (k, slot) in key.iter_mut().zip(row.levels.iter()) {
        if let Some((id, _)) = slot {
            *k = (false, *id);
        }
    }
    key
}

/// Sort key matching `ORDER BY name` per level with nulls last.
fn sample_key(names: &[Option<String>; 3]) -> [(bool, String); 3] {
    names
        .clone()
        .map(|name| (name.is_none(), name.unwrap_or_default()))
}

#[async_trait]
impl SchemaSource for MemorySchemaSource {
    async fn level_categories(&self, level: usize) -> Result<Vec<LevelRow>, ExportError> {
        assert!((1..=LEVELS).contains(&level), "level out of range");
        let mut rows = self.levels[level - 1].clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn hierarchy(&self) -> Result<Vec<HierarchyRow>, ExportError> {
        let mut rows = self.hierarchy.clone();
        rows.sort_by_key(hierarchy_key);
        Ok(rows)
    }

    async fn hierarchy_sample(&self, limit: i64) -> Result<Vec<SampleRow>, ExportError> {
        let mut rows: Vec<SampleRow> = self
            .hierarchy
            .iter()
            .map(|row| SampleRow {
                names: [
                    row.levels[0].as_ref().map(|(_, name)| name.clone()),
                    row.levels[1].as_ref().map(|(_, name)| name.clone()),
                    row.levels[2].as_ref().map(|(_, name)| name.clone()),
                ],
            })
            .collect();
        rows.sort_by_key(|row| sample_key(&row.names));
        rows.dedup_by(|a, b| a.names == b.names);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn hard_logic(&self) -> Result<Vec<HardLogicRow>, ExportError> {
        let mut rows = self.hard_logic.clone();
        rows.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(rows)
    }

    async fn soft_logic(&self) -> Result<Vec<SoftLogicRow>, ExportError> {
        let mut rows = self.soft_logic.clone();
        rows.sort_by(|a, b| a.keyword.cmp(&b.keyword));
        Ok(rows)
    }

    async fn explanations(&self) -> Result<Vec<ExplanationRow>, ExportError> {
        let mut rows = self.explanations.clone();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }
}
