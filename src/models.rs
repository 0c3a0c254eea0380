//! Types that make up the category export document.
//!
//! The structs here serialize one-to-one into the JSON layout consumed
//! downstream: `export_info`, `categories` (hierarchical + by-level),
//! `logic_rules` (hard + soft), `explanations`, and `statistics`. Field
//! order matters — serde emits fields in declaration order and the output
//! is expected to be stable across runs.

use serde::Serialize;

use crate::path::{AssembledPath, LEVELS};

/// One category at one level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub id: i32,
    pub name: String,
}

/// A fully assembled hierarchical path: up to seven left-packed nodes plus
/// the derived display path and depth.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyPath {
    pub level1: Option<CategoryNode>,
    pub level2: Option<CategoryNode>,
    pub level3: Option<CategoryNode>,
    pub level4: Option<CategoryNode>,
    pub level5: Option<CategoryNode>,
    pub level6: Option<CategoryNode>,
    pub level7: Option<CategoryNode>,
    pub path: String,
    pub depth: usize,
}

impl From<AssembledPath> for HierarchyPath {
    fn from(assembled: AssembledPath) -> Self {
        let [level1, level2, level3, level4, level5, level6, level7] = assembled.nodes;
        HierarchyPath {
            level1,
            level2,
            level3,
            level4,
            level5,
            level6,
            level7,
            path: assembled.path,
            depth: assembled.depth,
        }
    }
}

impl HierarchyPath {
    /// The seven node slots in level order.
    pub fn nodes(&self) -> [&Option<CategoryNode>; LEVELS] {
        [
            &self.level1,
            &self.level2,
            &self.level3,
            &self.level4,
            &self.level5,
            &self.level6,
            &self.level7,
        ]
    }
}

/// Resolved category names per level for a rule or explanation record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelNames {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub level4: Option<String>,
    pub level5: Option<String>,
    pub level6: Option<String>,
    pub level7: Option<String>,
}

impl From<[Option<String>; LEVELS]> for LevelNames {
    fn from(names: [Option<String>; LEVELS]) -> Self {
        let [level1, level2, level3, level4, level5, level6, level7] = names;
        LevelNames {
            level1,
            level2,
            level3,
            level4,
            level5,
            level6,
            level7,
        }
    }
}

impl LevelNames {
    /// The seven name slots in level order.
    pub fn as_array(&self) -> [&Option<String>; LEVELS] {
        [
            &self.level1,
            &self.level2,
            &self.level3,
            &self.level4,
            &self.level5,
            &self.level6,
            &self.level7,
        ]
    }
}

/// A deterministic word-to-category assignment rule.
#[derive(Debug, Clone, Serialize)]
pub struct HardLogicRule {
    pub word: String,
    pub is_pattern: bool,
    pub category_path: Option<String>,
    pub levels: LevelNames,
}

/// An advisory keyword-to-category signal, weaker than a hard rule.
#[derive(Debug, Clone, Serialize)]
pub struct SoftLogicRule {
    pub keyword: String,
    pub category_path: Option<String>,
    pub levels: LevelNames,
}

/// Free-text rationale attached to a (possibly partial) category path.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub id: i32,
    pub explanation: String,
    pub category_path: Option<String>,
    pub levels: LevelNames,
}

/// Metadata describing one export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportInfo {
    pub timestamp: String,
    pub database: String,
    pub description: String,
}

/// Per-level category lists, each sorted by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ByLevel {
    pub level1: Vec<CategoryNode>,
    pub level2: Vec<CategoryNode>,
    pub level3: Vec<CategoryNode>,
    pub level4: Vec<CategoryNode>,
    pub level5: Vec<CategoryNode>,
    pub level6: Vec<CategoryNode>,
    pub level7: Vec<CategoryNode>,
}

impl ByLevel {
    /// The seven lists in level order.
    pub fn as_array(&self) -> [&Vec<CategoryNode>; LEVELS] {
        [
            &self.level1,
            &self.level2,
            &self.level3,
            &self.level4,
            &self.level5,
            &self.level6,
            &self.level7,
        ]
    }

    /// Replace the list for a level (1-based).
    pub fn set_level(&mut self, level: usize, nodes: Vec<CategoryNode>) {
        match level {
            1 => self.level1 = nodes,
            2 => self.level2 = nodes,
            3 => self.level3 = nodes,
            4 => self.level4 = nodes,
            5 => self.level5 = nodes,
            6 => self.level6 = nodes,
            7 => self.level7 = nodes,
            other => unreachable!("level out of range: {}", other),
        }
    }
}

/// The category sections of the document.
#[derive(Debug, Clone, Serialize)]
pub struct Categories {
    pub hierarchical: Vec<HierarchyPath>,
    pub by_level: ByLevel,
}

/// Hard and soft rule sections.
#[derive(Debug, Clone, Serialize)]
pub struct LogicRules {
    pub hard_logic: Vec<HardLogicRule>,
    pub soft_logic: Vec<SoftLogicRule>,
}

/// Per-level counts inside the statistics block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub level1: usize,
    pub level2: usize,
    pub level3: usize,
    pub level4: usize,
    pub level5: usize,
    pub level6: usize,
    pub level7: usize,
}

/// Summary counters, always recomputed from the assembled collections so
/// they cannot drift from the document's own content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_hierarchical_paths: usize,
    pub categories_by_level: LevelCounts,
    pub total_hard_logic_rules: usize,
    pub total_soft_logic_rules: usize,
    pub total_explanations: usize,
    pub pattern_rules: usize,
    pub word_rules: usize,
}

/// The root aggregate of one export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub export_info: ExportInfo,
    pub categories: Categories,
    pub logic_rules: LogicRules,
    pub explanations: Vec<Explanation>,
    pub statistics: Statistics,
}
