//! Column-group flattening and header-span merging.
//!
//! A group forest of arbitrary, possibly ragged depth is normalized to a
//! rectangular depth, expanded into one branch per leaf, and re-merged per
//! render pass against the currently visible column order. All transforms
//! here are pure and allocation-returning; the input forest is never mutated.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::types::Columns;

/// Reserved id owning every column that declares no group.
pub const DEFAULT_GROUP_ID: &str = "default-group-id";

/// A labeled column group, nested to unbounded depth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub id: String,
    pub label: Option<String>,
    pub sub_groups: Vec<Group>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            sub_groups: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_sub_groups(mut self, sub_groups: impl IntoIterator<Item = Group>) -> Self {
        self.sub_groups = sub_groups.into_iter().collect();
        self
    }
}

/// A root-to-leaf materialization of a group path, carrying the number of
/// leaf columns it currently spans.
///
/// Invariant: a non-leaf branch's size equals the sum of its children's
/// sizes; a leaf starts at 1 and only grows by merging with an adjacent
/// identical branch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupBranch {
    pub id: String,
    pub label: Option<String>,
    pub size: usize,
    pub sub_groups: Vec<GroupBranch>,
}

/// Depth-equalized branches of a group forest, keyed by leaf group id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupIndex {
    /// Uniform root-to-leaf path length across all branches.
    pub depth: usize,
    /// Leaf group id → full ancestor chain for direct column lookup.
    pub by_leaf: BTreeMap<String, GroupBranch>,
}

/// Normalizes a group forest and expands it into per-leaf branches.
///
/// A synthetic default group (id [`DEFAULT_GROUP_ID`]) is appended to the
/// root list before normalization so that columns without a declared group
/// always resolve. Returns `None` for an empty forest, which callers treat
/// as "no group header rows".
pub fn group_branches(groups: &[Group]) -> Option<GroupIndex> {
    if groups.is_empty() {
        return None;
    }

    let mut roots = groups.to_vec();
    roots.push(Group::new(DEFAULT_GROUP_ID));

    let depth = max_depth(&roots);
    let roots = equalize_group_depths(roots, 0, depth);

    let mut by_leaf = BTreeMap::new();
    for branch in groups_to_branches(&roots) {
        by_leaf.insert(leaf_id(&branch).into(), branch);
    }
    gdebug!(depth, branches = by_leaf.len(), "group_branches");
    Some(GroupIndex { depth, by_leaf })
}

fn max_depth(groups: &[Group]) -> usize {
    groups
        .iter()
        .map(|group| 1 + max_depth(&group.sub_groups))
        .max()
        .unwrap_or(0)
}

/// Extends every branch terminating above `target` depth by wrapping its leaf
/// in a synthetic single-child group. The synthetic parent takes over the
/// original label and gets a depth-qualified `-root-` id; the leaf keeps the
/// original id so column lookup stays stable.
fn equalize_group_depths(groups: Vec<Group>, depth: usize, target: usize) -> Vec<Group> {
    if depth + 1 >= target {
        return groups;
    }
    groups
        .into_iter()
        .map(|mut group| {
            if group.sub_groups.is_empty() {
                let leaf = Group::new(group.id.clone());
                group.id = format!("{}-root-{depth}", group.id);
                group.sub_groups = vec![leaf];
            }
            group.sub_groups = equalize_group_depths(group.sub_groups, depth + 1, target);
            group
        })
        .collect()
}

/// Expands a depth-equalized forest into one branch per leaf, each carrying
/// the full ancestor chain with size 1 at every level.
fn groups_to_branches(groups: &[Group]) -> Vec<GroupBranch> {
    let mut out = Vec::new();
    for group in groups {
        let sub_branches = groups_to_branches(&group.sub_groups);
        if sub_branches.is_empty() {
            out.push(GroupBranch {
                id: group.id.clone(),
                label: group.label.clone(),
                size: 1,
                sub_groups: Vec::new(),
            });
        } else {
            for sub in sub_branches {
                out.push(GroupBranch {
                    id: group.id.clone(),
                    label: group.label.clone(),
                    size: 1,
                    sub_groups: vec![sub],
                });
            }
        }
    }
    out
}

fn leaf_id(branch: &GroupBranch) -> &str {
    match branch.sub_groups.first() {
        Some(sub) => leaf_id(sub),
        None => &branch.id,
    }
}

/// Looks up the branch for each visible column, in visible order.
///
/// Columns without a declared group id resolve to the default branch.
/// Indexes whose group id has no registered branch are silently skipped;
/// this tolerates stale column metadata during transient updates.
pub fn column_branches(
    index: &GroupIndex,
    columns: &Columns,
    visible_column_indexes: &[usize],
) -> Vec<GroupBranch> {
    visible_column_indexes
        .iter()
        .filter_map(|column_index| {
            let group_id = columns
                .get(column_index)
                .and_then(|column| column.group_id.as_deref())
                .unwrap_or(DEFAULT_GROUP_ID);
            index.by_leaf.get(group_id).cloned()
        })
        .collect()
}

/// Coalesces adjacent branches sharing a root id into merged spans, in
/// first-occurrence order, with sizes in visible-column units.
pub fn merged_branches(branches: Vec<GroupBranch>) -> Vec<GroupBranch> {
    let mut result = Vec::new();
    let mut current: Option<GroupBranch> = None;
    for branch in branches {
        match current.take() {
            None => current = Some(branch),
            Some(held) if held.id != branch.id => {
                result.push(held);
                current = Some(branch);
            }
            Some(held) => {
                let size = branch.size;
                let mut merged = merge_branches(branch, held);
                merged.size = merged.size.saturating_add(size);
                current = Some(merged);
            }
        }
    }
    if let Some(held) = current {
        result.push(held);
    }
    result
}

/// Merges `source` into `target` at matching depths.
///
/// The merge walks the deepest matching prefix: while the ids of the target's
/// last child and the source's first child agree, the two are merged and
/// their sizes summed. At the first mismatch the divergent children are
/// concatenated under the shared ancestor, leaving distinct deeper spans.
fn merge_branches(mut source: GroupBranch, mut target: GroupBranch) -> GroupBranch {
    if !source.sub_groups.is_empty() {
        let source_sub = source.sub_groups.remove(0);
        match target.sub_groups.pop() {
            Some(target_sub) if target_sub.id == source_sub.id => {
                let size = source_sub.size.saturating_add(target_sub.size);
                let mut merged = merge_branches(source_sub, target_sub);
                merged.size = size;
                target.sub_groups.push(merged);
                target.sub_groups.append(&mut source.sub_groups);
            }
            Some(target_sub) => {
                target.sub_groups.push(target_sub);
                target.sub_groups.push(source_sub);
                target.sub_groups.append(&mut source.sub_groups);
            }
            None => {
                target.sub_groups.push(source_sub);
                target.sub_groups.append(&mut source.sub_groups);
            }
        }
    }
    target
}

/// One merged header cell: a label spanning `size` contiguous visible columns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderSpan {
    pub id: String,
    pub label: String,
    pub size: usize,
}

/// How header span labels are produced from merged branches.
#[derive(Clone, Default)]
pub enum GroupLabeler {
    /// Use the branch label (empty string when absent).
    #[default]
    Default,
    /// Caller-supplied label production, resolved once per span.
    Custom(Arc<dyn Fn(&GroupBranch) -> String + Send + Sync>),
}

impl GroupLabeler {
    fn label(&self, branch: &GroupBranch) -> String {
        match self {
            Self::Default => branch.label.clone().unwrap_or_default(),
            Self::Custom(f) => f(branch),
        }
    }
}

impl core::fmt::Debug for GroupLabeler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Flattens merged branches into one span list per depth level, top row
/// first. This is the shape a rendering layer draws as header bands.
pub fn header_levels(merged: &[GroupBranch], labeler: &GroupLabeler) -> Vec<Vec<HeaderSpan>> {
    let mut levels = Vec::new();
    let mut current: Vec<&GroupBranch> = merged.iter().collect();
    while !current.is_empty() {
        levels.push(
            current
                .iter()
                .map(|branch| HeaderSpan {
                    id: branch.id.clone(),
                    label: labeler.label(branch),
                    size: branch.size,
                })
                .collect(),
        );
        current = current
            .into_iter()
            .flat_map(|branch| branch.sub_groups.iter())
            .collect();
    }
    levels
}
