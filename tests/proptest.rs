/*
 * proptest.rs
 *
 * property-based tests for chunk geometry, replay and row packing.
 * random traces over a small address pool so that reuse, double frees and
 * overlapping chunks show up often.
 */

use proptest::prelude::*;

use heapline::layout::{layout_timeline, Cell};
use heapline::memory::Geometry;
use heapline::replay::replay;
use heapline::trace::{Call, Event};

/* ============================================================================
 * Generators
 * ============================================================================ */

fn pointer() -> impl Strategy<Value = u64> {
    (0u64..12).prop_map(|slot| 0x1000 + slot * 0x18)
}

fn ret() -> impl Strategy<Value = Option<u64>> {
    prop_oneof![
        8 => pointer().prop_map(Some),
        1 => Just(Some(0)),
        1 => Just(None),
    ]
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (0u64..0x80, ret()).prop_map(|(size, r)| Event::new(Call::Malloc { size }, r)),
        (0u64..4, 0u64..0x20, ret())
            .prop_map(|(nmemb, size, r)| Event::new(Call::Calloc { nmemb, size }, r)),
        (pointer(), ret()).prop_map(|(ptr, r)| Event::new(Call::Free { ptr }, r)),
        (pointer(), 0u64..0x80, ret())
            .prop_map(|(ptr, size, r)| Event::new(Call::Realloc { ptr, size }, r)),
        Just(Event::new(
            Call::Annotate {
                message: "note".to_string()
            },
            Some(0)
        )),
    ]
}

fn geometry() -> impl Strategy<Value = Geometry> {
    prop_oneof![
        Just(Geometry::default()),
        Just(Geometry::RAW),
        (0u64..0x20, 0u64..0x10, 1u64..0x40, 0u64..0x40)
            .prop_map(|(h, f, r, m)| Geometry::new(h, f, r, m)),
    ]
}

/* ============================================================================
 * Geometry Properties
 * ============================================================================ */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /* chunk size is a positive multiple of round, never below minsz */
    #[test]
    fn chunk_size_is_rounded(size in 0u64..0x10000, header in 0u64..0x40,
                             footer in 0u64..0x40, round in 1u64..0x100, minsz in 1u64..0x100) {
        let g = Geometry::new(header, footer, round, minsz);
        let (start, end) = g.span(0x100000, size);
        let width = end - start;
        prop_assert!(width > 0);
        prop_assert_eq!(width % round, 0);
        prop_assert!(width >= minsz);
        prop_assert!(width >= size + header + footer);
    }

    /* raw geometry draws the literal request */
    #[test]
    fn raw_span_is_literal(addr in 0u64..0x1_0000_0000, size in 0u64..0x10000) {
        let (start, end) = Geometry::RAW.span(addr, size);
        prop_assert_eq!(start, addr);
        prop_assert_eq!(end - start, size);
    }
}

/* ============================================================================
 * Replay + Layout Properties
 * ============================================================================ */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /* same events, same seed: identical timelines */
    #[test]
    fn replay_is_deterministic(events in prop::collection::vec(event(), 0..40), g in geometry()) {
        let a = replay(events.clone(), g, 7);
        let b = replay(events, g, 7);
        prop_assert_eq!(a, b);
    }

    /* markers never survive into the next snapshot */
    #[test]
    fn markers_last_one_snapshot(events in prop::collection::vec(event(), 1..40)) {
        let timeline = replay(events, Geometry::default(), 7);
        for pair in timeline.snapshots().windows(2) {
            let carried = pair[1].chunks().iter().filter(|c| c.temporary).count();
            prop_assert!(carried <= 1);
            if carried == 1 {
                prop_assert!(pair[1].has_errors());
            }
        }
    }

    /* every snapshot lays out; each chunk lands in exactly one cell; rows tile the grid */
    #[test]
    fn layout_covers_and_tiles(events in prop::collection::vec(event(), 0..40), g in geometry()) {
        let timeline = replay(events, g, 7);
        let layout = layout_timeline(&timeline).expect("grid built from this timeline must fit");
        let columns = layout.boundaries.columns();

        for (snapshot, rows) in timeline.iter().zip(&layout.snapshots) {
            let mut seen = vec![0usize; snapshot.len()];
            for row in rows {
                let mut cursor = 0;
                for cell in &row.cells {
                    let span = cell.span();
                    prop_assert_eq!(span.from, cursor);
                    cursor = span.to;
                    if let Cell::Chunk { index, .. } = cell {
                        seen[*index] += 1;
                    }
                }
                prop_assert_eq!(cursor, columns);
            }
            prop_assert!(seen.iter().all(|&n| n == 1));
        }
    }
}
