// Layout invariants over whole replayed timelines

use heapline::error::LayoutError;
use heapline::layout::{layout, layout_timeline, Cell, Row};
use heapline::memory::{Chunk, Geometry, Rgb};
use heapline::replay::replay;
use heapline::snapshot::{BoundarySet, Snapshot};
use heapline::trace::{Call, Event, Trace};
use std::fs;

/// Every row must cover `[0, last]` of the grid with no gap and no overlap.
fn assert_tiles(rows: &[Row], columns: usize) {
    for (r, row) in rows.iter().enumerate() {
        let mut cursor = 0;
        for cell in &row.cells {
            let span = cell.span();
            assert_eq!(span.from, cursor, "gap or overlap in row {}", r);
            assert!(span.to >= span.from);
            cursor = span.to;
        }
        assert_eq!(cursor, columns, "row {} stops short of the grid", r);
    }
}

/// Every chunk appears in exactly one occupied cell, at its own address range.
fn assert_covers(grid: &[u64], snapshot: &Snapshot, rows: &[Row]) {
    let mut seen = vec![0usize; snapshot.len()];
    for row in rows {
        for cell in &row.cells {
            if let Cell::Chunk { index, span } = cell {
                seen[*index] += 1;
                let chunk = &snapshot.chunks()[*index];
                assert_eq!(grid[span.from], chunk.start());
                if !chunk.is_zero_width() {
                    assert_eq!(grid[span.to], chunk.end());
                }
            }
        }
    }
    assert!(seen.iter().all(|&n| n == 1), "coverage counts: {:?}", seen);
}

#[test]
fn test_sample_trace_layout_invariants() {
    let source = fs::read_to_string("tests/data/sample.trace").expect("Failed to read trace");
    let timeline = replay(Trace::new(source).events(), Geometry::default(), 226);
    let layout = layout_timeline(&timeline).expect("layout failed");

    assert_eq!(layout.snapshots.len(), timeline.len());
    let grid = layout.boundaries.as_slice();
    for (snapshot, rows) in timeline.iter().zip(&layout.snapshots) {
        assert_tiles(rows, layout.boundaries.columns());
        assert_covers(grid, snapshot, rows);
    }

    // the empty initial heap draws nothing
    assert!(layout.snapshots[0].is_empty());
}

#[test]
fn test_same_address_lines_up_across_snapshots() {
    let timeline = replay(
        vec![
            Event::new(Call::Malloc { size: 0x20 }, Some(0x1010)),
            Event::new(Call::Malloc { size: 0x20 }, Some(0x1040)),
            Event::new(Call::Free { ptr: 0x1010 }, Some(0)),
        ],
        Geometry::default(),
        1,
    );
    let layout = layout_timeline(&timeline).expect("layout failed");

    let column_of = |snapshot: usize, address: u64| {
        let snap = timeline.get(snapshot).expect("snapshot");
        layout.snapshots[snapshot]
            .iter()
            .flat_map(|row| row.cells.iter())
            .find_map(|cell| match cell {
                Cell::Chunk { index, span } if snap.chunks()[*index].address == address => {
                    Some(span.from)
                }
                _ => None,
            })
    };

    assert_eq!(column_of(2, 0x1040), column_of(3, 0x1040));
    assert!(column_of(3, 0x1010).is_none());
}

#[test]
fn test_raw_geometry_with_zero_size_chunks() {
    let trace = Trace::new(
        "malloc(0) = 0x1000\n\
         malloc(16) = 0x1000\n\
         free(0x4000) = <void>\n\
         free(0x800) = <void>\n",
    );
    let timeline = replay(trace.events(), Geometry::RAW, 1);
    let layout = layout_timeline(&timeline).expect("raw layout failed");

    let grid = layout.boundaries.as_slice();
    for (snapshot, rows) in timeline.iter().zip(&layout.snapshots) {
        assert_tiles(rows, layout.boundaries.columns());
        assert_covers(grid, snapshot, rows);
    }
}

#[test]
fn test_inconsistent_grid_names_snapshot() {
    let g = Geometry::default();
    let snapshot = Snapshot::from_chunks(vec![Chunk::new(&g, 0x1010, 0x10, Rgb(1, 1, 1))]);
    let grid = BoundarySet::from_points([0x1008]);

    let err = layout(&grid, 7, &snapshot).expect_err("grid lacks the chunk end");
    assert_eq!(err.snapshot(), 7);
    assert!(matches!(err, LayoutError::Unterminated { start: 0x1008, .. }));
    assert!(err.to_string().contains("snapshot 7"));
}
