// Example: collapsible row tree + grouped column headers.
use gridwindow::{
    Cell, Column, Columns, EngineOptions, Group, OpenedTree, Rect, Row, TableEngine,
};

fn main() {
    let rows = vec![
        Row::new("header").with_cells((0..4).map(|c| Cell::new(format!("col{c}")))),
        Row::new("europe").with_sub_rows([Row::new("france"), Row::new("germany")]),
        Row::new("asia").with_sub_rows([Row::new("japan")]),
    ];

    let mut columns = Columns::new();
    columns.insert(0, Column::new("col0").with_group_id("identity"));
    columns.insert(1, Column::new("col1").with_group_id("identity"));
    columns.insert(2, Column::new("col2").with_group_id("metrics").with_size(160));

    let groups = vec![
        Group::new("identity").with_label("Identity"),
        Group::new("metrics").with_label("Metrics"),
    ];

    let mut engine = TableEngine::new(
        rows,
        columns,
        groups,
        EngineOptions::new().with_row_height(24).with_column_width(80),
    );
    engine.set_viewport(Rect {
        width: 320,
        height: 200,
    });

    println!("collapsed rows_length={}", engine.rows_length());
    engine.open_tree(1, OpenedTree::leaf());
    println!("expanded rows_length={}", engine.rows_length());
    println!("row_window={:?}", engine.row_window().visible);

    for (level, spans) in engine.header_spans().iter().enumerate() {
        let cells: Vec<String> = spans
            .iter()
            .map(|span| format!("{}({})", span.label, span.size))
            .collect();
        println!("header level {level}: {}", cells.join(" | "));
    }
}
