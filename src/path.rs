//! Path assembly: flattened join rows to display paths.
//!
//! Turns one row of up to seven optional `(id, name)` pairs into the
//! `path` / `depth` shape the export document uses. Pure functions, no I/O.
//!
//! Two gap policies exist because the source tables differ:
//!
//! - Hierarchy rows come from a chained outer join and are left-packed by
//!   construction, so assembly stops at the first missing level.
//! - Rule, keyword, and explanation rows reference level ids independently
//!   and may legally have a gap (level1 null, level3 set). Their paths are
//!   built by skipping nulls so a gapped record still yields every name it
//!   resolved, rather than a misleadingly short or empty path.

use crate::models::CategoryNode;

/// Number of levels in the category hierarchy.
pub const LEVELS: usize = 7;

/// Separator between category names in a display path.
pub const PATH_SEPARATOR: &str = " > ";

/// How to treat a missing level while collecting names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GapPolicy {
    /// Stop at the first absent level; later levels are ignored.
    StopAtFirstGap,
    /// Skip absent levels and keep collecting.
    SkipNulls,
}

/// Result of assembling one hierarchy row.
#[derive(Debug, Clone)]
pub struct AssembledPath {
    /// Node per level, truncated at the first gap.
    pub nodes: [Option<CategoryNode>; LEVELS],
    /// Present node names joined with [`PATH_SEPARATOR`]; empty at depth 0.
    pub path: String,
    /// Count of contiguous present levels starting at level 1.
    pub depth: usize,
}

/// Assemble a hierarchy row: up to seven `(id, name)` pairs in level order.
///
/// Scanning stops at the first absent pair, so the returned nodes are
/// exactly levels `1..=depth` even if a malformed input had a later pair
/// present.
pub fn assemble_hierarchy(slots: [Option<(i32, String)>; LEVELS]) -> AssembledPath {
    let mut nodes: [Option<CategoryNode>; LEVELS] = Default::default();
    let mut names: Vec<&str> = Vec::with_capacity(LEVELS);

    for (slot, node) in slots.iter().zip(nodes.iter_mut()) {
        match slot {
            Some((id, name)) => {
                *node = Some(CategoryNode {
                    id: *id,
                    name: name.clone(),
                });
                names.push(name);
            }
            None => break,
        }
    }

    AssembledPath {
        path: names.join(PATH_SEPARATOR),
        depth: names.len(),
        nodes,
    }
}

/// Join resolved per-level names into a display path.
///
/// Takes any prefix of the level sequence (the sample export passes only
/// three slots). Returns `None` when no name survives the policy — rule and
/// explanation records carry `category_path: null` in that case.
pub fn join_names(names: &[Option<String>], policy: GapPolicy) -> Option<String> {
    let mut parts: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        match (name, policy) {
            (Some(name), _) => parts.push(name),
            (None, GapPolicy::StopAtFirstGap) => break,
            (None, GapPolicy::SkipNulls) => continue,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(PATH_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: i32, name: &str) -> Option<(i32, String)> {
        Some((id, name.to_string()))
    }

    #[test]
    fn assemble_two_levels() {
        let assembled = assemble_hierarchy([
            slot(1, "Electronics"),
            slot(10, "Phones"),
            None,
            None,
            None,
            None,
            None,
        ]);
        assert_eq!(assembled.path, "Electronics > Phones");
        assert_eq!(assembled.depth, 2);
        assert_eq!(
            assembled.nodes[0],
            Some(CategoryNode {
                id: 1,
                name: "Electronics".to_string()
            })
        );
        assert_eq!(
            assembled.nodes[1],
            Some(CategoryNode {
                id: 10,
                name: "Phones".to_string()
            })
        );
        assert!(assembled.nodes[2..].iter().all(|n| n.is_none()));
    }

    #[test]
    fn assemble_single_level() {
        let assembled =
            assemble_hierarchy([slot(1, "Electronics"), None, None, None, None, None, None]);
        assert_eq!(assembled.path, "Electronics");
        assert_eq!(assembled.depth, 1);
    }

    #[test]
    fn assemble_empty_row() {
        let assembled = assemble_hierarchy([None, None, None, None, None, None, None]);
        assert_eq!(assembled.path, "");
        assert_eq!(assembled.depth, 0);
        assert!(assembled.nodes.iter().all(|n| n.is_none()));
    }

    #[test]
    fn assemble_truncates_after_gap() {
        // A pair after a gap cannot come out of the hierarchy join, but the
        // assembler must still produce a left-packed result if it sees one.
        let assembled = assemble_hierarchy([
            slot(1, "Electronics"),
            None,
            slot(30, "Orphan"),
            None,
            None,
            None,
            None,
        ]);
        assert_eq!(assembled.path, "Electronics");
        assert_eq!(assembled.depth, 1);
        assert!(assembled.nodes[2].is_none());
    }

    #[test]
    fn join_names_skips_nulls() {
        let names = [
            None,
            Some("Phones".to_string()),
            None,
            Some("Android".to_string()),
            None,
            None,
            None,
        ];
        assert_eq!(
            join_names(&names, GapPolicy::SkipNulls),
            Some("Phones > Android".to_string())
        );
    }

    #[test]
    fn join_names_stops_at_gap() {
        let names = [
            Some("Electronics".to_string()),
            None,
            Some("Android".to_string()),
            None,
            None,
            None,
            None,
        ];
        assert_eq!(
            join_names(&names, GapPolicy::StopAtFirstGap),
            Some("Electronics".to_string())
        );
    }

    #[test]
    fn join_names_all_null_is_none() {
        let names: [Option<String>; LEVELS] = Default::default();
        assert_eq!(join_names(&names, GapPolicy::SkipNulls), None);
        assert_eq!(join_names(&names, GapPolicy::StopAtFirstGap), None);
    }
}
