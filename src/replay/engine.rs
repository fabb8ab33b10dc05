// Replay engine: folds trace events into a timeline of heap snapshots

use crate::memory::{Chunk, Geometry, Palette};
use crate::snapshot::{Snapshot, Timeline};
use crate::trace::{Call, Event};
use tracing::{debug, trace, warn};

/// Outcome of feeding one event to the [`Replayer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A new snapshot was appended at this timeline index
    Snapshot(usize),
    /// An annotation was buffered for the next snapshot
    Deferred,
}

/// The allocator state machine
///
/// Owns the working history exclusively; every snapshot it appends is
/// final. Nothing here is fatal: failed allocations, dangling pointers and
/// crashed calls become log lines on the snapshot they occurred in.
pub struct Replayer {
    geometry: Geometry,
    palette: Palette,
    timeline: Timeline,

    /// Annotation text waiting for the next mutating call
    pending_info: Vec<String>,
    pending_errors: Vec<String>,
}

impl Replayer {
    pub fn new(geometry: Geometry, seed: u64) -> Self {
        Replayer {
            geometry,
            palette: Palette::new(seed),
            timeline: Timeline::new(),
            pending_info: Vec::new(),
            pending_errors: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Apply one event on top of the latest snapshot.
    pub fn advance(&mut self, event: &Event) -> Step {
        if let Call::Annotate { message } = &event.call {
            self.pending_info.push(message.clone());
            if event.ret.is_none() {
                self.pending_errors.push(format!("{} = <error>", event.call));
            }
            trace!(line = event.line, "annotation buffered");
            return Step::Deferred;
        }

        let mut state = self.timeline.last().successor();
        state.info.append(&mut self.pending_info);
        state.errors.append(&mut self.pending_errors);

        match event.ret {
            Some(ret) => state.info.push(format!("{} = {:#x}", event.call, ret)),
            None => state.errors.push(format!("{} = <error>", event.call)),
        }

        self.apply(&mut state, &event.call, event.ret);

        debug!(
            line = event.line,
            call = %event.call,
            chunks = state.len(),
            errors = state.errors.len(),
            "event applied"
        );

        self.timeline.push(state);
        Step::Snapshot(self.timeline.len() - 1)
    }

    /// Close the replay and hand over the history.
    pub fn finish(self) -> Timeline {
        let dropped = self.pending_info.len();
        if dropped > 0 {
            warn!(
                dropped,
                "annotations after the last allocator call have no snapshot to attach to"
            );
        }
        self.timeline
    }

    fn apply(&mut self, state: &mut Snapshot, call: &Call, ret: Option<u64>) {
        match *call {
            Call::Malloc { size }
            | Call::Valloc { size }
            | Call::Memalign { size, .. }
            | Call::AlignedAlloc { size, .. } => self.malloc(state, ret, size),
            Call::Calloc { nmemb, size } => self.malloc(state, ret, nmemb.saturating_mul(size)),
            Call::Free { ptr } => self.free(state, ret, ptr),
            Call::Realloc { ptr, size } => self.realloc(state, ret, ptr, size, false),
            Call::Reallocarray { ptr, nmemb, size } => {
                self.realloc(state, ret, ptr, nmemb.saturating_mul(size), false)
            }
            Call::Reallocf { ptr, size } => self.realloc(state, ret, ptr, size, true),
            Call::Annotate { .. } => {}
        }
    }

    fn malloc(&mut self, state: &mut Snapshot, ret: Option<u64>, size: u64) {
        match ret {
            Some(addr) if addr != 0 => {
                self.check_fits(state, addr, size);
                let color = self.palette.next_color();
                state
                    .chunks
                    .push(Chunk::new(&self.geometry, addr, size, color));
            }
            _ => state
                .errors
                .push(format!("Failed to allocate {:#x} bytes.", size)),
        }
    }

    fn free(&mut self, state: &mut Snapshot, ret: Option<u64>, ptr: u64) {
        if ptr == 0 {
            return;
        }

        let Some(index) = self.match_ptr(state, ptr) else {
            return;
        };

        if ret.is_none() {
            // free crashed: keep the chunk, but it can no longer be trusted
            state.chunks[index] = state.chunks[index].flagged();
        } else {
            state.chunks.remove(index);
        }
    }

    fn realloc(
        &mut self,
        state: &mut Snapshot,
        ret: Option<u64>,
        ptr: u64,
        size: u64,
        free_on_failure: bool,
    ) {
        if ptr == 0 {
            return self.malloc(state, ret, size);
        }
        if size == 0 {
            return self.free(state, ret, ptr);
        }

        let Some(index) = self.match_ptr(state, ptr) else {
            return;
        };

        match ret {
            None => state.chunks[index].error = true,
            Some(0) => {
                state
                    .errors
                    .push(format!("Failed to reallocate {:#x} bytes.", size));
                if free_on_failure {
                    state.chunks.remove(index);
                }
            }
            Some(addr) => {
                self.check_fits(state, addr, size);
                let moved = state.chunks[index].resized(&self.geometry, addr, size);
                state.chunks[index] = moved;
            }
        }
    }

    fn check_fits(&self, state: &mut Snapshot, addr: u64, size: u64) {
        if !self.geometry.fits(addr, size) {
            warn!(addr, size, "chunk wraps past the end of the address space");
            state.errors.push(format!(
                "Block at {:#x} of {:#x} bytes runs past the end of memory; drawn truncated.",
                addr, size
            ));
        }
    }

    /// Find the live chunk whose user pointer is `ptr`.
    ///
    /// Several chunks can claim the same pointer in a corrupt trace; the one
    /// with the smallest requested size wins, later chunks winning ties.
    /// When nothing matches, an error marker is left at `ptr` so the
    /// snapshot shows where the program pointed.
    fn match_ptr(&self, state: &mut Snapshot, ptr: u64) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, chunk) in state.chunks.iter().enumerate() {
            if chunk.address != ptr {
                continue;
            }
            if best.map_or(true, |b| state.chunks[b].user_size >= chunk.user_size) {
                best = Some(i);
            }
        }

        if best.is_none() {
            state.errors.push(format!(
                "Couldn't find block at {:#x}.",
                ptr.saturating_sub(self.geometry.header)
            ));
            state.chunks.push(Chunk::marker(&self.geometry, ptr));
        }
        best
    }
}

/// Replay a whole event sequence from the empty heap.
pub fn replay<I>(events: I, geometry: Geometry, seed: u64) -> Timeline
where
    I: IntoIterator<Item = Event>,
{
    let mut replayer = Replayer::new(geometry, seed);
    for event in events {
        replayer.advance(&event);
    }
    replayer.finish()
}
