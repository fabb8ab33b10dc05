// Snapshot history produced by replaying a trace

use crate::memory::Chunk;
use rustc_hash::FxHashSet;

/// The heap immediately after one trace event
///
/// Chunk order is the order the replay engine produced them in; duplicate
/// addresses are possible when the trace itself is inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) info: Vec<String>,
    pub(crate) errors: Vec<String>,
}

impl Snapshot {
    pub fn new(chunks: Vec<Chunk>, info: Vec<String>, errors: Vec<String>) -> Self {
        Snapshot {
            chunks,
            info,
            errors,
        }
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self::new(chunks, Vec::new(), Vec::new())
    }

    /// Starting point for the next event: same live chunks, no placeholders, empty logs.
    pub fn successor(&self) -> Snapshot {
        Snapshot::from_chunks(
            self.chunks
                .iter()
                .filter(|c| !c.temporary)
                .cloned()
                .collect(),
        )
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Successful-call annotations, in order
    pub fn info(&self) -> &[String] {
        &self.info
    }

    /// Anomalies detected while applying the event, in order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Every start and end address of every chunk.
    pub fn boundaries(&self) -> impl Iterator<Item = u64> + '_ {
        self.chunks.iter().flat_map(|c| [c.start(), c.end()])
    }
}

/// Sorted, de-duplicated grid of every chunk boundary in a timeline
///
/// This is the shared coordinate system all snapshots are drawn against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundarySet {
    points: Vec<u64>,
}

impl BoundarySet {
    pub fn from_points(points: impl IntoIterator<Item = u64>) -> Self {
        let unique: FxHashSet<u64> = points.into_iter().collect();
        let mut points: Vec<u64> = unique.into_iter().collect();
        points.sort_unstable();
        BoundarySet { points }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of columns between the first and last boundary.
    pub fn columns(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Append-only sequence of snapshots; the first one is always the empty heap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    snapshots: Vec<Snapshot>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            snapshots: vec![Snapshot::default()],
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn last(&self) -> &Snapshot {
        // never empty: constructed with the initial snapshot
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Aggregate the boundary grid over the whole history.
    pub fn boundaries(&self) -> BoundarySet {
        BoundarySet::from_points(self.snapshots.iter().flat_map(|s| s.boundaries()))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
