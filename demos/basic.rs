// Example: windowing a large flat table with pinned and custom-sized rows.
use gridwindow::{Cell, Columns, EngineOptions, Rect, Row, TableEngine};

fn main() {
    let rows: Vec<Row> = (0..100_000)
        .map(|i| {
            Row::new(format!("row-{i}")).with_cells((0..8).map(|c| Cell::new(format!("col{c}"))))
        })
        .collect();

    let mut engine = TableEngine::new(
        rows,
        Columns::new(),
        Vec::new(),
        EngineOptions::new()
            .with_row_height(24)
            .with_fixed_rows([0])
            .with_row_sizes([(1usize, 60u32)]),
    );
    engine.set_viewport(Rect {
        width: 800,
        height: 240,
    });
    engine.set_scroll_top_clamped(123_456);

    let window = engine.row_window();
    println!("total_height={}", engine.total_height());
    println!("visible={:?}", window.visible);
    println!("elevated={:?}", window.elevated);

    let offset = engine.scroll_to_row_index(99_999);
    println!("after scroll_to_row_index: offset={offset}");
}
