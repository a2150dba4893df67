use alloc::collections::{BTreeMap, BTreeSet};

/// Running totals of custom size overrides for one region of an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeTotals {
    pub sum: u64,
    pub count: usize,
}

/// Custom size overrides for one axis, partitioned into the fixed (pinned)
/// and scrollable regions.
///
/// Invariant: each region's `count` equals the number of override keys in that
/// region and `sum` their total. Hidden indexes contribute to neither.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomSizes {
    pub fixed: SizeTotals,
    pub scrollable: SizeTotals,
    /// Sparse index → size override map. Hidden indexes are excluded.
    pub sizes: BTreeMap<usize, u32>,
}

impl CustomSizes {
    pub fn total_sum(&self) -> u64 {
        self.fixed.sum.saturating_add(self.scrollable.sum)
    }

    pub fn total_count(&self) -> usize {
        self.fixed.count.saturating_add(self.scrollable.count)
    }
}

/// Aggregates custom size overrides into per-region running totals.
///
/// Hidden indexes are dropped entirely: they occupy no space and must not
/// skew either region's totals. Every other override is classified by
/// membership in `fixed_indexes`.
pub fn compute_custom_sizes(
    overrides: &BTreeMap<usize, u32>,
    fixed_indexes: &BTreeSet<usize>,
    hidden_indexes: &BTreeSet<usize>,
) -> CustomSizes {
    let mut out = CustomSizes::default();
    for (&index, &size) in overrides {
        if hidden_indexes.contains(&index) {
            continue;
        }
        let region = if fixed_indexes.contains(&index) {
            &mut out.fixed
        } else {
            &mut out.scrollable
        };
        region.sum = region.sum.saturating_add(size as u64);
        region.count = region.count.saturating_add(1);
        out.sizes.insert(index, size);
    }
    out
}

/// Derives the uniform cell size from a viewport budget and an items-per-page
/// target, discounting the space already claimed by custom overrides.
///
/// Returns at least 1 so layout never degenerates to zero-sized cells.
pub fn uniform_cell_size(viewport_size: u32, items_per_page: usize, custom: &CustomSizes) -> u32 {
    let remaining_items = items_per_page.saturating_sub(custom.total_count());
    if remaining_items == 0 {
        return 1;
    }
    let remaining_space = (viewport_size as u64).saturating_sub(custom.total_sum());
    let size = remaining_space / remaining_items as u64;
    (size.max(1)).min(u32::MAX as u64) as u32
}
