//! Visible-window computation for one axis.
//!
//! Given total item count, viewport size, a clamped scroll offset, and the
//! fixed/hidden/custom-size configuration, this module decides which absolute
//! indexes must be materialized and which of them render out of the scroll
//! flow (elevated).

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::types::VisibleWindow;

fn effective_sizes(
    total_count: usize,
    fixed: &BTreeSet<usize>,
    hidden: &BTreeSet<usize>,
    custom_sizes: &BTreeMap<usize, u32>,
    uniform_size: u32,
) -> Vec<u32> {
    (0..total_count)
        .map(|index| {
            if hidden.contains(&index) || fixed.contains(&index) {
                0
            } else {
                custom_sizes.get(&index).copied().unwrap_or(uniform_size)
            }
        })
        .collect()
}

/// Total size of the scrollable flow: every index that is neither hidden nor
/// fixed, custom override if present, else `uniform_size`.
pub fn scrollable_size(
    total_count: usize,
    fixed: &BTreeSet<usize>,
    hidden: &BTreeSet<usize>,
    custom_sizes: &BTreeMap<usize, u32>,
    uniform_size: u32,
) -> u64 {
    let mut total = 0u64;
    for index in 0..total_count {
        if hidden.contains(&index) || fixed.contains(&index) {
            continue;
        }
        let size = custom_sizes.get(&index).copied().unwrap_or(uniform_size);
        total = total.saturating_add(size as u64);
    }
    total
}

/// Total rendered size of the axis, pinned indexes included, hidden excluded.
pub fn total_size(
    total_count: usize,
    hidden: &BTreeSet<usize>,
    custom_sizes: &BTreeMap<usize, u32>,
    uniform_size: u32,
) -> u64 {
    let mut total = 0u64;
    for index in 0..total_count {
        if hidden.contains(&index) {
            continue;
        }
        let size = custom_sizes.get(&index).copied().unwrap_or(uniform_size);
        total = total.saturating_add(size as u64);
    }
    total
}

/// Offset at which the scrollable-flow index `index` starts, ignoring hidden
/// and fixed indexes before it.
pub fn scrollable_offset_of(
    index: usize,
    fixed: &BTreeSet<usize>,
    hidden: &BTreeSet<usize>,
    custom_sizes: &BTreeMap<usize, u32>,
    uniform_size: u32,
) -> u64 {
    scrollable_size(index, fixed, hidden, custom_sizes, uniform_size)
}

/// Computes the visible index window for one axis.
///
/// - Hidden indexes consume no space and never appear.
/// - Fixed indexes are always visible, listed first in ascending order, and
///   marked elevated. An index that is both hidden and fixed counts as
///   hidden.
/// - The scrollable window starts at the first flow index covering the
///   clamped scroll offset and accumulates effective sizes until the
///   viewport is covered, then extends by `overscan` extra flow indexes.
/// - `total_count == 0` yields an empty window; out-of-range offsets are
///   clamped, never errors.
pub fn compute_visible_window(
    viewport_size: u32,
    scroll_offset: u64,
    total_count: usize,
    fixed: &BTreeSet<usize>,
    hidden: &BTreeSet<usize>,
    custom_sizes: &BTreeMap<usize, u32>,
    uniform_size: u32,
    overscan: usize,
) -> VisibleWindow {
    let mut window = VisibleWindow {
        cell_size: uniform_size,
        ..VisibleWindow::default()
    };
    if total_count == 0 {
        return window;
    }

    for &index in fixed {
        if index < total_count && !hidden.contains(&index) {
            window.visible.push(index);
            window.elevated.insert(index);
        }
    }

    if viewport_size == 0 {
        return window;
    }

    let sizes = effective_sizes(total_count, fixed, hidden, custom_sizes, uniform_size);
    let sums = Fenwick::from_sizes(&sizes);
    let max_scroll = sums.total().saturating_sub(viewport_size as u64);
    let offset = scroll_offset.min(max_scroll);

    let start = sums.lower_bound(offset);
    gtrace!(
        offset,
        start,
        total_count,
        viewport_size,
        "compute_visible_window"
    );

    let mut accumulated = 0u64;
    let mut filled = false;
    let mut remaining_overscan = overscan;
    for index in start..total_count {
        if sizes[index] == 0 {
            // Zero effective size, not part of the scrollable flow.
            continue;
        }
        if filled {
            if remaining_overscan == 0 {
                break;
            }
            window.visible.push(index);
            remaining_overscan -= 1;
            continue;
        }
        window.visible.push(index);
        accumulated = accumulated.saturating_add(sizes[index] as u64);
        if accumulated >= viewport_size as u64 {
            filled = true;
        }
    }

    window
}

/// The non-virtualized window: every non-hidden index is visible, fixed
/// indexes first and elevated. Used when windowing is disabled so consumers
/// see one uniform output shape.
pub fn compute_full_window(
    total_count: usize,
    fixed: &BTreeSet<usize>,
    hidden: &BTreeSet<usize>,
    uniform_size: u32,
) -> VisibleWindow {
    let mut window = VisibleWindow {
        cell_size: uniform_size,
        ..VisibleWindow::default()
    };
    for &index in fixed {
        if index < total_count && !hidden.contains(&index) {
            window.visible.push(index);
            window.elevated.insert(index);
        }
    }
    for index in 0..total_count {
        if hidden.contains(&index) || fixed.contains(&index) {
            continue;
        }
        window.visible.push(index);
    }
    window
}
