use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::engine::TableEngine;
use crate::group::GroupLabeler;
use crate::state::ScrollState;
use crate::tree::OpenedTrees;

/// A callback fired when the engine's state changes (committed snapshot).
pub type OnChangeCallback = Arc<dyn Fn(&TableEngine) + Send + Sync>;

/// Configuration for [`crate::TableEngine`].
///
/// This type is cheap to clone: the callback fields are stored in `Arc`s so
/// hosts can update a few fields and call `TableEngine::set_options` without
/// reallocating closures.
#[derive(Clone)]
pub struct EngineOptions {
    /// Uniform row height for rows without a custom size override.
    pub row_height: u32,
    /// Uniform column width for columns without a custom size override.
    pub column_width: u32,
    /// Extra scrollable indexes materialized past the viewport boundary.
    pub overscan: usize,
    /// When false, windows contain every non-hidden index (fixed indexes
    /// stay elevated). This mirrors a non-virtualized table.
    pub virtualized: bool,

    /// Pinned rows, by top-level relative index.
    pub fixed_rows: Vec<usize>,
    /// Hidden rows, by top-level relative index.
    pub hidden_rows: Vec<usize>,
    /// Pinned columns, by column index.
    pub fixed_columns: Vec<usize>,
    /// Hidden columns, by column index.
    pub hidden_columns: Vec<usize>,

    /// Custom row heights, keyed by top-level relative index. Column widths
    /// come from the column metadata instead.
    pub row_sizes: BTreeMap<usize, u32>,

    /// Subtrees expanded when the engine is created. Entries referencing
    /// rows that do not exist are pruned on construction.
    pub initial_opened_trees: OpenedTrees,
    /// Scroll position applied when the engine is created.
    pub initial_scroll: ScrollState,

    /// Optional callback fired after each committed state change.
    pub on_change: Option<OnChangeCallback>,
    /// How group header span labels are produced.
    pub group_labeler: GroupLabeler,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            row_height: 40,
            column_width: 100,
            overscan: 1,
            virtualized: true,
            fixed_rows: Vec::new(),
            hidden_rows: Vec::new(),
            fixed_columns: Vec::new(),
            hidden_columns: Vec::new(),
            row_sizes: BTreeMap::new(),
            initial_opened_trees: OpenedTrees::new(),
            initial_scroll: ScrollState::default(),
            on_change: None,
            group_labeler: GroupLabeler::Default,
        }
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_column_width(mut self, column_width: u32) -> Self {
        self.column_width = column_width;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_virtualized(mut self, virtualized: bool) -> Self {
        self.virtualized = virtualized;
        self
    }

    pub fn with_fixed_rows(mut self, fixed_rows: impl IntoIterator<Item = usize>) -> Self {
        self.fixed_rows = fixed_rows.into_iter().collect();
        self
    }

    pub fn with_hidden_rows(mut self, hidden_rows: impl IntoIterator<Item = usize>) -> Self {
        self.hidden_rows = hidden_rows.into_iter().collect();
        self
    }

    pub fn with_fixed_columns(mut self, fixed_columns: impl IntoIterator<Item = usize>) -> Self {
        self.fixed_columns = fixed_columns.into_iter().collect();
        self
    }

    pub fn with_hidden_columns(mut self, hidden_columns: impl IntoIterator<Item = usize>) -> Self {
        self.hidden_columns = hidden_columns.into_iter().collect();
        self
    }

    pub fn with_row_sizes(mut self, row_sizes: impl IntoIterator<Item = (usize, u32)>) -> Self {
        self.row_sizes = row_sizes.into_iter().collect();
        self
    }

    pub fn with_initial_opened_trees(mut self, initial_opened_trees: OpenedTrees) -> Self {
        self.initial_opened_trees = initial_opened_trees;
        self
    }

    pub fn with_initial_scroll(mut self, initial_scroll: ScrollState) -> Self {
        self.initial_scroll = initial_scroll;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&TableEngine) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_group_labeler(mut self, group_labeler: GroupLabeler) -> Self {
        self.group_labeler = group_labeler;
        self
    }
}

impl core::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("row_height", &self.row_height)
            .field("column_width", &self.column_width)
            .field("overscan", &self.overscan)
            .field("virtualized", &self.virtualized)
            .field("fixed_rows", &self.fixed_rows)
            .field("hidden_rows", &self.hidden_rows)
            .field("fixed_columns", &self.fixed_columns)
            .field("hidden_columns", &self.hidden_columns)
            .field("row_sizes", &self.row_sizes)
            .field("initial_opened_trees", &self.initial_opened_trees)
            .field("initial_scroll", &self.initial_scroll)
            .field("group_labeler", &self.group_labeler)
            .finish_non_exhaustive()
    }
}
