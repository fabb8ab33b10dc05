//! Row packing of snapshots against the global boundary grid
//!
//! A snapshot's chunks rarely tile the grid cleanly: addresses get reused
//! over time and other snapshots contribute boundaries in between. Each
//! snapshot is therefore split into rows, greedily, left to right. Every row
//! covers the whole grid with [`Cell`]s: occupied cells for chunks and
//! spacer cells for everything else.
//!
//! # Alignment across rows
//!
//! Within one snapshot, every grid index that ended a cell becomes a *known
//! stop*. When a later row has to bridge a gap, the part of the gap up to
//! the nearest known stop is drawn invisible and only the remainder is
//! shown. That keeps spacer columns lined up between rows even though each
//! row starts from a different chunk.
//!
//! # Failure
//!
//! A chunk whose end is not on the grid, or a row that places nothing, means
//! the grid was not built from this timeline. Both are reported as
//! [`LayoutError`] and abort the layout.

use crate::error::LayoutError;
use crate::snapshot::{BoundarySet, Snapshot, Timeline};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Half-open range of grid indices `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Span { from, to }
    }

    /// Number of grid columns covered
    pub fn width(&self) -> usize {
        self.to - self.from
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// A chunk, by its index in the snapshot
    Chunk { index: usize, span: Span },
    /// Unoccupied grid columns
    Spacer { span: Span, visible: bool },
}

impl Cell {
    pub fn span(&self) -> Span {
        match self {
            Cell::Chunk { span, .. } | Cell::Spacer { span, .. } => *span,
        }
    }
}

/// One horizontal band of cells spanning the whole grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// Snapshot indices of the chunks placed in this row.
    pub fn chunk_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().filter_map(|c| match c {
            Cell::Chunk { index, .. } => Some(*index),
            Cell::Spacer { .. } => None,
        })
    }
}

/// Per-snapshot packing state shared by all of the snapshot's rows
pub struct LayoutContext {
    snapshot: usize,
    known_stops: FxHashSet<usize>,
}

impl LayoutContext {
    pub fn new(snapshot: usize) -> Self {
        LayoutContext {
            snapshot,
            known_stops: FxHashSet::default(),
        }
    }

    /// Pack as many of `remaining` as fit into a single row.
    pub fn pack_row(
        &mut self,
        grid: &[u64],
        snapshot: &Snapshot,
        remaining: &[usize],
        row_number: usize,
    ) -> Result<Row, LayoutError> {
        let chunks = snapshot.chunks();
        let mut placed = vec![false; chunks.len()];
        let mut cells = Vec::new();
        let mut current: Option<usize> = None;
        let mut last = 0;

        for (i, &b) in grid.iter().enumerate() {
            if let Some(open) = current {
                let chunk = &chunks[open];
                if chunk.end() != b && !chunk.is_zero_width() {
                    continue;
                }
                self.known_stops.insert(i);
                cells.push(Cell::Chunk {
                    index: open,
                    span: Span::new(last, i),
                });
                placed[open] = true;
                last = i;
                current = None;
            }

            let Some(next) = remaining
                .iter()
                .copied()
                .find(|&k| !placed[k] && chunks[k].start() == b)
            else {
                continue;
            };
            current = Some(next);

            if last != i {
                let stop = (last..=i)
                    .rev()
                    .find(|s| self.known_stops.contains(s))
                    .unwrap_or(last);
                if stop != last {
                    cells.push(Cell::Spacer {
                        span: Span::new(last, stop),
                        visible: false,
                    });
                    self.known_stops.insert(stop);
                }
                if stop != i {
                    cells.push(Cell::Spacer {
                        span: Span::new(stop, i),
                        visible: true,
                    });
                }
                self.known_stops.insert(i);
                last = i;
            }
        }

        if let Some(open) = current {
            if !chunks[open].is_zero_width() {
                return Err(LayoutError::Unterminated {
                    snapshot: self.snapshot,
                    start: chunks[open].start(),
                });
            }
            // zero-width chunk on the last grid point: its end is on the grid too
            cells.push(Cell::Chunk {
                index: open,
                span: Span::new(last, last),
            });
            placed[open] = true;
        }
        if cells.is_empty() || !placed.iter().any(|&p| p) {
            return Err(LayoutError::NoProgress {
                snapshot: self.snapshot,
                row: row_number,
                remaining: remaining.len(),
            });
        }

        let end = grid.len().saturating_sub(1);
        if last < end {
            cells.push(Cell::Spacer {
                span: Span::new(last, end),
                visible: false,
            });
        }

        Ok(Row { cells })
    }
}

/// Split one snapshot into rows against the global grid.
///
/// `index` is the snapshot's position in the timeline and only used for
/// error reporting.
pub fn layout(
    boundaries: &BoundarySet,
    index: usize,
    snapshot: &Snapshot,
) -> Result<Vec<Row>, LayoutError> {
    let grid = boundaries.as_slice();
    let mut ctx = LayoutContext::new(index);
    let mut remaining: Vec<usize> = (0..snapshot.len()).collect();
    let mut rows = Vec::new();

    while !remaining.is_empty() {
        let row = ctx.pack_row(grid, snapshot, &remaining, rows.len())?;
        let placed: FxHashSet<usize> = row.chunk_indices().collect();
        remaining.retain(|k| !placed.contains(k));
        rows.push(row);
    }

    Ok(rows)
}

/// Rows for every snapshot, drawn on one shared grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineLayout {
    pub boundaries: BoundarySet,
    pub snapshots: Vec<Vec<Row>>,
}

/// Lay out a finished timeline.
///
/// The grid is aggregated over every snapshot first; no snapshot is laid
/// out before the whole history is known.
pub fn layout_timeline(timeline: &Timeline) -> Result<TimelineLayout, LayoutError> {
    let boundaries = timeline.boundaries();
    debug!(points = boundaries.len(), "boundary grid built");

    let snapshots = timeline
        .iter()
        .enumerate()
        .map(|(i, snapshot)| layout(&boundaries, i, snapshot))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TimelineLayout {
        boundaries,
        snapshots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Chunk, Geometry, Rgb};

    fn chunk(g: &Geometry, addr: u64, size: u64) -> Chunk {
        Chunk::new(g, addr, size, Rgb(0, 0, 0))
    }

    #[test]
    fn test_single_row_with_gap() {
        let g = Geometry::RAW;
        let snap = Snapshot::from_chunks(vec![chunk(&g, 0x10, 0x10), chunk(&g, 0x30, 0x10)]);
        let grid = BoundarySet::from_points([0x10, 0x20, 0x30, 0x40]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Chunk { index: 0, span: Span::new(0, 1) },
                Cell::Spacer { span: Span::new(1, 2), visible: true },
                Cell::Chunk { index: 1, span: Span::new(2, 3) },
            ]
        );
    }

    #[test]
    fn test_overlap_goes_to_second_row_aligned() {
        let g = Geometry::RAW;
        // A [0,2)  B [2,4)  C [1,3) overlaps both
        let snap = Snapshot::from_chunks(vec![
            chunk(&g, 0x00, 0x20),
            chunk(&g, 0x20, 0x20),
            chunk(&g, 0x10, 0x20),
        ]);
        let grid = BoundarySet::from_points([0x00, 0x10, 0x20, 0x30, 0x40]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].cells,
            vec![
                Cell::Spacer { span: Span::new(0, 1), visible: true },
                Cell::Chunk { index: 2, span: Span::new(1, 3) },
                Cell::Spacer { span: Span::new(3, 4), visible: false },
            ]
        );
    }

    #[test]
    fn test_known_stop_hides_aligned_gap() {
        let g = Geometry::RAW;
        // row 0: A [0,1) B [1,2) gap [2,3) E [3,4), so 3 becomes a known stop
        // row 1: D [0,2) then F [3,4); the gap before F ends on stop 3
        let snap = Snapshot::from_chunks(vec![
            chunk(&g, 0x00, 0x10),
            chunk(&g, 0x10, 0x10),
            chunk(&g, 0x00, 0x20),
            chunk(&g, 0x30, 0x10),
            chunk(&g, 0x30, 0x10),
        ]);
        let grid = BoundarySet::from_points([0x00, 0x10, 0x20, 0x30, 0x40]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Chunk { index: 0, span: Span::new(0, 1) },
                Cell::Chunk { index: 1, span: Span::new(1, 2) },
                Cell::Spacer { span: Span::new(2, 3), visible: true },
                Cell::Chunk { index: 3, span: Span::new(3, 4) },
            ]
        );
        assert_eq!(
            rows[1].cells,
            vec![
                Cell::Chunk { index: 2, span: Span::new(0, 2) },
                Cell::Spacer { span: Span::new(2, 3), visible: false },
                Cell::Chunk { index: 4, span: Span::new(3, 4) },
            ]
        );
    }

    #[test]
    fn test_known_stop_inside_gap_splits_spacer() {
        let g = Geometry::RAW;
        // row 0: A [0,1) gap [1,2) B [2,4), so 2 becomes a known stop
        // row 1: C [3,4); its leading gap is split at stop 2
        let snap = Snapshot::from_chunks(vec![
            chunk(&g, 0x00, 0x10),
            chunk(&g, 0x20, 0x20),
            chunk(&g, 0x30, 0x10),
        ]);
        let grid = BoundarySet::from_points([0x00, 0x10, 0x20, 0x30, 0x40]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Chunk { index: 0, span: Span::new(0, 1) },
                Cell::Spacer { span: Span::new(1, 2), visible: true },
                Cell::Chunk { index: 1, span: Span::new(2, 4) },
            ]
        );
        assert_eq!(
            rows[1].cells,
            vec![
                Cell::Spacer { span: Span::new(0, 2), visible: false },
                Cell::Spacer { span: Span::new(2, 3), visible: true },
                Cell::Chunk { index: 2, span: Span::new(3, 4) },
            ]
        );
    }

    #[test]
    fn test_zero_width_chunk_takes_one_column() {
        let g = Geometry::RAW;
        let snap = Snapshot::from_chunks(vec![Chunk::marker(&g, 0x10), chunk(&g, 0x20, 0x10)]);
        let grid = BoundarySet::from_points([0x10, 0x20, 0x30]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Chunk { index: 0, span: Span::new(0, 1) },
                Cell::Chunk { index: 1, span: Span::new(1, 2) },
            ]
        );
    }

    #[test]
    fn test_zero_width_chunk_on_last_point() {
        let g = Geometry::RAW;
        let snap = Snapshot::from_chunks(vec![chunk(&g, 0x10, 0x10), Chunk::marker(&g, 0x40)]);
        let grid = BoundarySet::from_points([0x10, 0x20, 0x40]);
        let rows = layout(&grid, 0, &snap).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Chunk { index: 0, span: Span::new(0, 1) },
                Cell::Spacer { span: Span::new(1, 2), visible: true },
                Cell::Chunk { index: 1, span: Span::new(2, 2) },
            ]
        );
    }

    #[test]
    fn test_missing_end_is_fatal() {
        let g = Geometry::RAW;
        let snap = Snapshot::from_chunks(vec![chunk(&g, 0x10, 0x10)]);
        let grid = BoundarySet::from_points([0x10, 0x18]);
        let err = layout(&grid, 4, &snap).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Unterminated {
                snapshot: 4,
                start: 0x10
            }
        );
    }

    #[test]
    fn test_missing_start_is_fatal() {
        let g = Geometry::RAW;
        let snap = Snapshot::from_chunks(vec![chunk(&g, 0x10, 0x10)]);
        let grid = BoundarySet::from_points([0x00, 0x20]);
        let err = layout(&grid, 2, &snap).unwrap_err();
        assert!(matches!(err, LayoutError::NoProgress { snapshot: 2, row: 0, remaining: 1 }));
    }

    #[test]
    fn test_empty_snapshot_has_no_rows() {
        let grid = BoundarySet::from_points([0x10, 0x20]);
        let rows = layout(&grid, 0, &Snapshot::default()).unwrap();
        assert!(rows.is_empty());
    }
}
