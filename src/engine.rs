use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use core::cell::Cell as StateCell;

use crate::group::{
    Group, GroupIndex, HeaderSpan, column_branches, group_branches, header_levels, merged_branches,
};
use crate::options::EngineOptions;
use crate::sizes::{CustomSizes, compute_custom_sizes};
use crate::state::{FrameState, ScrollState, ViewportState};
use crate::tree::{
    IndexesMap, OpenedTree, OpenedTrees, all_indexes_map, fixed_rows_indexes,
    relative_to_absolute_indexes, relative_to_absolute_sizes, row_at, rows_length,
    sync_opened_trees_with_rows,
};
use crate::types::{Cell, CellCoordinates, Columns, Rect, Row, VisibleWindow};
use crate::window::{
    compute_full_window, compute_visible_window, scrollable_offset_of, scrollable_size, total_size,
};

/// A headless table windowing engine.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects.
/// - Your host drives it by providing viewport geometry, scroll offsets, and
///   expand/collapse gestures.
/// - Rendering consumes the computed windows and header spans.
///
/// All derived state (index maps, custom-size totals, group branches) is
/// recomputed together on every structural change and committed as one
/// snapshot before any window is served, so a new row tree is never windowed
/// against a stale index map.
#[derive(Clone, Debug)]
pub struct TableEngine {
    options: EngineOptions,
    rows: Vec<Row>,
    columns: Columns,
    groups: Vec<Group>,

    opened_trees: OpenedTrees,
    indexes_map: IndexesMap,
    rows_length: usize,
    columns_length: usize,
    columns_ids: BTreeMap<String, usize>,

    fixed_rows_absolute: BTreeSet<usize>,
    hidden_rows_absolute: BTreeSet<usize>,
    custom_heights: CustomSizes,
    custom_heights_absolute: BTreeMap<usize, u32>,

    fixed_columns: BTreeSet<usize>,
    hidden_columns: BTreeSet<usize>,
    custom_widths: CustomSizes,

    group_index: Option<GroupIndex>,

    viewport: Rect,
    scroll_left: u64,
    scroll_top: u64,

    notify_depth: StateCell<usize>,
    notify_pending: StateCell<bool>,
}

impl TableEngine {
    /// Creates a new engine from the row tree, column metadata, group forest
    /// and options.
    ///
    /// `options.initial_opened_trees` is synced against `rows` first, so
    /// stale entries never survive construction.
    pub fn new(rows: Vec<Row>, columns: Columns, groups: Vec<Group>, options: EngineOptions) -> Self {
        gdebug!(
            rows = rows.len(),
            columns = columns.len(),
            groups = groups.len(),
            "TableEngine::new"
        );
        let opened_trees = options.initial_opened_trees.clone();
        let initial_scroll = options.initial_scroll;
        let mut engine = Self {
            options,
            rows,
            columns,
            groups,
            opened_trees,
            indexes_map: IndexesMap::default(),
            rows_length: 0,
            columns_length: 0,
            columns_ids: BTreeMap::new(),
            fixed_rows_absolute: BTreeSet::new(),
            hidden_rows_absolute: BTreeSet::new(),
            custom_heights: CustomSizes::default(),
            custom_heights_absolute: BTreeMap::new(),
            fixed_columns: BTreeSet::new(),
            hidden_columns: BTreeSet::new(),
            custom_widths: CustomSizes::default(),
            group_index: None,
            viewport: Rect::default(),
            scroll_left: initial_scroll.left,
            scroll_top: initial_scroll.top,
            notify_depth: StateCell::new(0),
            notify_pending: StateCell::new(false),
        };
        engine.refresh_rows_state();
        engine.refresh_columns_state();
        engine.refresh_groups_state();
        engine
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Replaces the options and recomputes all derived state as one snapshot.
    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
        self.refresh_rows_state();
        self.refresh_columns_state();
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to
    /// `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut EngineOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&TableEngine) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame a host may update the viewport, the scroll offsets
    /// and the expansion state together; without batching each setter may
    /// trigger `on_change`, which can be expensive if the callback drives
    /// rendering.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    // ---- data source ----

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn opened_trees(&self) -> &OpenedTrees {
        &self.opened_trees
    }

    pub fn indexes_map(&self) -> &IndexesMap {
        &self.indexes_map
    }

    /// Count of currently visible rows, at any depth.
    pub fn rows_length(&self) -> usize {
        self.rows_length
    }

    pub fn columns_length(&self) -> usize {
        self.columns_length
    }

    /// Uniform depth of the group header bands (0 when there are no groups).
    pub fn groups_depth(&self) -> usize {
        self.group_index.as_ref().map_or(0, |index| index.depth)
    }

    /// Replaces the row tree. Opened trees referencing rows that no longer
    /// exist are pruned before the index maps are re-derived.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.refresh_rows_state();
        self.notify();
    }

    pub fn set_columns(&mut self, columns: Columns) {
        self.columns = columns;
        self.refresh_columns_state();
        self.notify();
    }

    pub fn set_groups(&mut self, groups: Vec<Group>) {
        self.groups = groups;
        self.refresh_groups_state();
        self.notify();
    }

    // ---- expand / collapse ----

    /// Expands the subtree at a top-level relative row index.
    pub fn open_tree(&mut self, row_index: usize, tree: OpenedTree) {
        self.opened_trees.insert(row_index, tree);
        self.refresh_rows_state();
        self.notify();
    }

    /// Collapses the subtree at a top-level relative row index. No-op when
    /// the subtree is already collapsed.
    pub fn close_tree(&mut self, row_index: usize) {
        if self.opened_trees.remove(&row_index).is_none() {
            return;
        }
        self.refresh_rows_state();
        self.notify();
    }

    pub fn open_trees(&mut self, trees: OpenedTrees) {
        self.opened_trees.extend(trees);
        self.refresh_rows_state();
        self.notify();
    }

    pub fn close_trees(&mut self, row_indexes: &[usize]) {
        let mut changed = false;
        for row_index in row_indexes {
            changed |= self.opened_trees.remove(row_index).is_some();
        }
        if !changed {
            return;
        }
        self.refresh_rows_state();
        self.notify();
    }

    // ---- geometry ----

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.notify();
    }

    pub fn scroll_left(&self) -> u64 {
        self.scroll_left
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn set_scroll_left(&mut self, offset: u64) {
        if self.scroll_left == offset {
            return;
        }
        self.scroll_left = offset;
        self.notify();
    }

    pub fn set_scroll_top(&mut self, offset: u64) {
        if self.scroll_top == offset {
            return;
        }
        self.scroll_top = offset;
        self.notify();
    }

    pub fn set_scroll_left_clamped(&mut self, offset: u64) {
        self.set_scroll_left(offset.min(self.max_scroll_left()));
    }

    pub fn set_scroll_top_clamped(&mut self, offset: u64) {
        self.set_scroll_top(offset.min(self.max_scroll_top()));
    }

    /// Applies viewport + scroll in a single coalesced update.
    pub fn apply_scroll_frame(&mut self, viewport: Rect, scroll_left: u64, scroll_top: u64) {
        gtrace!(
            width = viewport.width,
            height = viewport.height,
            scroll_left,
            scroll_top,
            "apply_scroll_frame"
        );
        self.batch_update(|engine| {
            engine.set_viewport(viewport);
            engine.set_scroll_left_clamped(scroll_left);
            engine.set_scroll_top_clamped(scroll_top);
        });
    }

    /// Total rendered height: every visible, non-hidden row, custom override
    /// if present, else the uniform row height.
    pub fn total_height(&self) -> u64 {
        total_size(
            self.rows_length,
            &self.hidden_rows_absolute,
            &self.custom_heights_absolute,
            self.options.row_height,
        )
    }

    pub fn total_width(&self) -> u64 {
        total_size(
            self.columns_length,
            &self.hidden_columns,
            &self.custom_widths.sizes,
            self.options.column_width,
        )
    }

    pub fn max_scroll_top(&self) -> u64 {
        scrollable_size(
            self.rows_length,
            &self.fixed_rows_absolute,
            &self.hidden_rows_absolute,
            &self.custom_heights_absolute,
            self.options.row_height,
        )
        .saturating_sub(self.viewport.height as u64)
    }

    pub fn max_scroll_left(&self) -> u64 {
        scrollable_size(
            self.columns_length,
            &self.fixed_columns,
            &self.hidden_columns,
            &self.custom_widths.sizes,
            self.options.column_width,
        )
        .saturating_sub(self.viewport.width as u64)
    }

    /// Scrolls so the given absolute row index is at the top of the
    /// scrollable area. Out-of-range indexes are clamped to the valid range.
    /// Returns the applied offset.
    pub fn scroll_to_row_index(&mut self, row_index: usize) -> u64 {
        if self.rows_length == 0 {
            return self.scroll_top;
        }
        let row_index = row_index.min(self.rows_length - 1);
        let offset = scrollable_offset_of(
            row_index,
            &self.fixed_rows_absolute,
            &self.hidden_rows_absolute,
            &self.custom_heights_absolute,
            self.options.row_height,
        );
        self.set_scroll_top_clamped(offset);
        self.scroll_top
    }

    pub fn scroll_to_column_index(&mut self, column_index: usize) -> u64 {
        if self.columns_length == 0 {
            return self.scroll_left;
        }
        let column_index = column_index.min(self.columns_length - 1);
        let offset = scrollable_offset_of(
            column_index,
            &self.fixed_columns,
            &self.hidden_columns,
            &self.custom_widths.sizes,
            self.options.column_width,
        );
        self.set_scroll_left_clamped(offset);
        self.scroll_left
    }

    pub fn scroll_to_column_id(&mut self, column_id: &str) -> Option<u64> {
        let column_index = self.column_index_of(column_id)?;
        Some(self.scroll_to_column_index(column_index))
    }

    // ---- windows ----

    /// Computes the visible row window for the current viewport and scroll
    /// position.
    pub fn row_window(&self) -> VisibleWindow {
        if !self.options.virtualized {
            return compute_full_window(
                self.rows_length,
                &self.fixed_rows_absolute,
                &self.hidden_rows_absolute,
                self.options.row_height,
            );
        }
        compute_visible_window(
            self.viewport.height,
            self.scroll_top,
            self.rows_length,
            &self.fixed_rows_absolute,
            &self.hidden_rows_absolute,
            &self.custom_heights_absolute,
            self.options.row_height,
            self.options.overscan,
        )
    }

    /// Computes the visible column window for the current viewport and scroll
    /// position.
    pub fn column_window(&self) -> VisibleWindow {
        if !self.options.virtualized {
            return compute_full_window(
                self.columns_length,
                &self.fixed_columns,
                &self.hidden_columns,
                self.options.column_width,
            );
        }
        compute_visible_window(
            self.viewport.width,
            self.scroll_left,
            self.columns_length,
            &self.fixed_columns,
            &self.hidden_columns,
            &self.custom_widths.sizes,
            self.options.column_width,
            self.options.overscan,
        )
    }

    /// Merged group header bands for the current visible column set, one
    /// span list per depth level. Empty when there are no groups.
    pub fn header_spans(&self) -> Vec<Vec<HeaderSpan>> {
        let Some(group_index) = &self.group_index else {
            return Vec::new();
        };
        let window = self.column_window();
        let branches = column_branches(group_index, &self.columns, &window.visible);
        let merged = merged_branches(branches);
        header_levels(&merged, &self.options.group_labeler)
    }

    // ---- lookup ----

    /// Resolves an absolute row index to the row it currently addresses.
    pub fn row_at_absolute(&self, absolute_index: usize) -> Option<&Row> {
        let path = self.indexes_map.absolute.get(&absolute_index)?;
        row_at(&self.rows, path)
    }

    pub fn cell_at(&self, coordinates: CellCoordinates) -> Option<&Cell> {
        self.row_at_absolute(coordinates.row_index)?
            .cells
            .get(coordinates.cell_index)
    }

    /// Column index for a column id, from the header row's cells.
    pub fn column_index_of(&self, column_id: &str) -> Option<usize> {
        self.columns_ids.get(column_id).copied()
    }

    pub fn column_id_of(&self, column_index: usize) -> Option<&str> {
        self.rows
            .first()?
            .cells
            .get(column_index)
            .map(|cell| cell.id.as_str())
    }

    // ---- snapshots ----

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            rect: self.viewport,
        }
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            left: self.scroll_left,
            top: self.scroll_top,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.viewport_state(),
            scroll: self.scroll_state(),
        }
    }

    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.batch_update(|engine| {
            engine.set_viewport(frame.viewport.rect);
            engine.set_scroll_left_clamped(frame.scroll.left);
            engine.set_scroll_top_clamped(frame.scroll.top);
        });
    }

    // ---- derivation ----

    fn refresh_rows_state(&mut self) {
        self.opened_trees = sync_opened_trees_with_rows(&self.opened_trees, &self.rows);
        self.indexes_map = all_indexes_map(&self.opened_trees, &self.rows);
        self.rows_length = rows_length(&self.opened_trees, &self.rows);
        self.columns_length = self
            .rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0);
        self.columns_ids = self
            .rows
            .first()
            .map(|header| {
                header
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(index, cell)| (cell.id.clone(), index))
                    .collect()
            })
            .unwrap_or_default();

        let relative = &self.indexes_map.relative;
        self.fixed_rows_absolute = fixed_rows_indexes(relative, &self.options.fixed_rows)
            .into_iter()
            .collect();
        self.hidden_rows_absolute =
            relative_to_absolute_indexes(&self.options.hidden_rows, relative)
                .into_iter()
                .collect();

        let fixed_relative: BTreeSet<usize> = self.options.fixed_rows.iter().copied().collect();
        let hidden_relative: BTreeSet<usize> = self.options.hidden_rows.iter().copied().collect();
        self.custom_heights =
            compute_custom_sizes(&self.options.row_sizes, &fixed_relative, &hidden_relative);
        self.custom_heights_absolute =
            relative_to_absolute_sizes(&self.custom_heights.sizes, relative);
        gdebug!(
            rows_length = self.rows_length,
            columns_length = self.columns_length,
            opened = self.opened_trees.len(),
            "refresh_rows_state"
        );
    }

    fn refresh_columns_state(&mut self) {
        self.fixed_columns = self.options.fixed_columns.iter().copied().collect();
        self.hidden_columns = self.options.hidden_columns.iter().copied().collect();
        let overrides: BTreeMap<usize, u32> = self
            .columns
            .iter()
            .filter_map(|(&index, column)| column.size.map(|size| (index, size)))
            .collect();
        self.custom_widths =
            compute_custom_sizes(&overrides, &self.fixed_columns, &self.hidden_columns);
    }

    fn refresh_groups_state(&mut self) {
        self.group_index = group_branches(&self.groups);
    }

    /// Custom row-height totals, in top-level relative space.
    pub fn custom_heights(&self) -> &CustomSizes {
        &self.custom_heights
    }

    /// Custom column-width totals.
    pub fn custom_widths(&self) -> &CustomSizes {
        &self.custom_widths
    }
}
