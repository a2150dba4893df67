//! Row-tree flattening and index mapping.
//!
//! A row tree with expanded subtrees is addressed in two index spaces:
//! - relative: position among siblings at one nesting level, ignoring the
//!   current expansion state,
//! - absolute: position in the fully flattened, currently visible sequence.
//!
//! Everything here is a pure, from-scratch derivation. Index maps are never
//! patched incrementally; the engine recomputes them on every structural
//! change so they stay correct under arbitrary edits.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::types::{Row, RowPath};

/// One expanded subtree: records which of the row's sub-rows are themselves
/// further expanded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenedTree {
    pub sub_trees: OpenedTrees,
}

impl OpenedTree {
    /// An expanded row whose sub-rows are all collapsed.
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn with_sub_trees(sub_trees: OpenedTrees) -> Self {
        Self { sub_trees }
    }
}

/// The set of currently expanded subtrees, keyed by relative row index.
/// Absence of a key means that subtree is collapsed.
pub type OpenedTrees = BTreeMap<usize, OpenedTree>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativeEntry {
    /// Absolute index the row currently occupies.
    pub absolute: usize,
    /// Entries for visible sub-rows, keyed by their relative index.
    pub sub_items: RelativeMap,
}

/// Relative index → entry, one map per nesting level.
pub type RelativeMap = BTreeMap<usize, RelativeEntry>;

/// Aligned relative/absolute translation tables over the visible rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexesMap {
    /// Absolute index → path through the row tree.
    pub absolute: BTreeMap<usize, RowPath>,
    pub relative: RelativeMap,
}

/// Builds the full relative/absolute index mapping for the given expansion
/// state.
///
/// The walk is depth-first pre-order: an opened row's sub-rows get the
/// absolute indexes immediately after their parent, before the parent's next
/// sibling. Empty `rows` yields empty maps.
pub fn all_indexes_map(opened: &OpenedTrees, rows: &[Row]) -> IndexesMap {
    let mut map = IndexesMap::default();
    let mut next_absolute = 0usize;
    let mut prefix = Vec::new();
    walk(
        opened,
        rows,
        &mut prefix,
        &mut map.absolute,
        &mut map.relative,
        &mut next_absolute,
    );
    map
}

fn walk(
    opened: &OpenedTrees,
    rows: &[Row],
    prefix: &mut Vec<usize>,
    absolute: &mut BTreeMap<usize, RowPath>,
    relative: &mut RelativeMap,
    next_absolute: &mut usize,
) {
    for (index, row) in rows.iter().enumerate() {
        let abs = *next_absolute;
        *next_absolute += 1;

        prefix.push(index);
        absolute.insert(abs, RowPath(prefix.clone()));

        let mut entry = RelativeEntry {
            absolute: abs,
            sub_items: RelativeMap::new(),
        };
        if let Some(tree) = opened.get(&index) {
            walk(
                &tree.sub_trees,
                &row.sub_rows,
                prefix,
                absolute,
                &mut entry.sub_items,
                next_absolute,
            );
        }
        prefix.pop();
        relative.insert(index, entry);
    }
}

/// Counts the visible rows at any depth: every row of `rows` plus, for each
/// opened entry, the visible rows of that subtree.
pub fn rows_length(opened: &OpenedTrees, rows: &[Row]) -> usize {
    let mut length = rows.len();
    for (&index, tree) in opened {
        if let Some(row) = rows.get(index) {
            length = length.saturating_add(rows_length(&tree.sub_trees, &row.sub_rows));
        }
    }
    length
}

/// Prunes opened-tree entries that no longer reference an existing row with
/// sub-rows, recursively.
///
/// Must run before re-deriving index maps whenever the row source changes:
/// the contract is "never reference a row that is not currently present".
/// Idempotent.
pub fn sync_opened_trees_with_rows(opened: &OpenedTrees, rows: &[Row]) -> OpenedTrees {
    let mut out = OpenedTrees::new();
    for (&index, tree) in opened {
        let Some(row) = rows.get(index) else {
            continue;
        };
        if !row.has_sub_rows() {
            continue;
        }
        out.insert(
            index,
            OpenedTree {
                sub_trees: sync_opened_trees_with_rows(&tree.sub_trees, &row.sub_rows),
            },
        );
    }
    out
}

/// Translates top-level relative row indexes into absolute indexes.
///
/// Relative indexes not present in the mapping (e.g. a nested row of a
/// collapsed parent) are skipped rather than failing. Result is ascending.
pub fn fixed_rows_indexes(relative: &RelativeMap, fixed_relative: &[usize]) -> Vec<usize> {
    relative_to_absolute_indexes(fixed_relative, relative)
}

/// Translates relative indexes into absolute indexes, skipping indexes absent
/// from the mapping. Result is ascending.
pub fn relative_to_absolute_indexes(indexes: &[usize], relative: &RelativeMap) -> Vec<usize> {
    let mut out: Vec<usize> = indexes
        .iter()
        .filter_map(|index| relative.get(index).map(|entry| entry.absolute))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Rebases a relative-index-keyed size map into absolute space, dropping
/// entries whose relative index is not currently visible.
pub fn relative_to_absolute_sizes(
    sizes: &BTreeMap<usize, u32>,
    relative: &RelativeMap,
) -> BTreeMap<usize, u32> {
    sizes
        .iter()
        .filter_map(|(index, &size)| relative.get(index).map(|entry| (entry.absolute, size)))
        .collect()
}

/// Resolves a row path against the row tree.
pub fn row_at<'a>(rows: &'a [Row], path: &RowPath) -> Option<&'a Row> {
    let mut iter = path.0.iter();
    let mut row = rows.get(*iter.next()?)?;
    for &index in iter {
        row = row.sub_rows.get(index)?;
    }
    Some(row)
}
