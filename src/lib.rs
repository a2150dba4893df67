//! A headless windowing and index-mapping engine for virtualized tables.
//!
//! This crate focuses on the pure algorithms needed to render large tabular
//! datasets at interactive frame rates: flattening a collapsible row tree
//! into a contiguous index space, reconciling custom row/column sizes into
//! running offsets, computing overscanned visible windows with pinned
//! (elevated) indexes, and merging column-group forests into header spans
//! consistent with the visible columns.
//!
//! It is UI-agnostic. A rendering/interaction layer is expected to provide:
//! - viewport size (width/height)
//! - scroll offsets
//! - the row tree, column metadata, and group forest
//! - expand/collapse and resize gestures
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod fenwick;
mod group;
mod options;
mod sizes;
mod state;
mod tree;
mod types;
mod window;


pub use engine::TableEngine;
pub use group::{
    DEFAULT_GROUP_ID, Group, GroupBranch, GroupIndex, GroupLabeler, HeaderSpan, column_branches,
    group_branches, header_levels, merged_branches,
};
pub use options::{EngineOptions, OnChangeCallback};
pub use sizes::{CustomSizes, SizeTotals, compute_custom_sizes, uniform_cell_size};
pub use state::{FrameState, ScrollState, ViewportState};
pub use tree::{
    IndexesMap, OpenedTree, OpenedTrees, RelativeEntry, RelativeMap, all_indexes_map,
    fixed_rows_indexes, relative_to_absolute_indexes, relative_to_absolute_sizes, row_at,
    rows_length, sync_opened_trees_with_rows,
};
pub use types::{
    Cell, CellCoordinates, Column, Columns, Elevateds, Rect, Row, RowPath, VisibleWindow,
};
pub use window::{compute_full_window, compute_visible_window, scrollable_size, total_size};
