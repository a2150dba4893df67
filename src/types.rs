use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

/// Viewport geometry in pixels (or whatever unit the host measures in).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

/// A single cell of a row. The id is the column id this cell belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub id: String,
}

impl Cell {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A row of the table, optionally owning nested sub-rows.
///
/// Row ids must be unique and stable across updates; the engine assumes but
/// does not enforce this (the data-source layer owns that guarantee).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
    pub sub_rows: Vec<Row>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
            sub_rows: Vec::new(),
        }
    }

    pub fn with_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells = cells.into_iter().collect();
        self
    }

    pub fn with_sub_rows(mut self, sub_rows: impl IntoIterator<Item = Row>) -> Self {
        self.sub_rows = sub_rows.into_iter().collect();
        self
    }

    pub fn has_sub_rows(&self) -> bool {
        !self.sub_rows.is_empty()
    }
}

/// Per-column metadata.
///
/// `size` is a custom width override (columns without one get the uniform
/// width), `group_id` names the column group the column belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub id: String,
    pub group_id: Option<String>,
    pub size: Option<u32>,
}

impl Column {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: None,
            size: None,
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

/// Sparse column metadata, keyed by column index. Only columns that need
/// metadata (a group, a width override) require an entry.
pub type Columns = BTreeMap<usize, Column>;

/// Child-index path from the root row slice down to a row.
///
/// `[2, 0]` is the first sub-row of the third top-level row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowPath(pub Vec<usize>);

impl RowPath {
    pub fn is_top_level(&self) -> bool {
        self.0.len() == 1
    }
}

/// Absolute indexes that render out of normal flow order (pinned rows or
/// columns, drawn above/beside the scrollable body).
pub type Elevateds = BTreeSet<usize>;

/// Output of one windowing computation for one axis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    /// Indexes to materialize: fixed indexes first (ascending), then the
    /// scrollable window (ascending).
    pub visible: Vec<usize>,
    /// The subset of `visible` that is pinned out of the scroll flow.
    pub elevated: Elevateds,
    /// Uniform size for indexes without a custom override, invariant within
    /// one computation.
    pub cell_size: u32,
}

impl VisibleWindow {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Coordinates of a cell in the currently visible sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoordinates {
    /// Absolute row index (position in the flattened visible sequence).
    pub row_index: usize,
    pub cell_index: usize,
}
