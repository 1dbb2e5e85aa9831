//! Property-based invariant tests for the masonry layout and the items store.
//!
//! 1. Layout is deterministic for identical inputs.
//! 2. Card-only layouts stay balanced within one card height.
//! 3. Cards sharing a column never overlap.
//! 4. Items after a separator start below it, in every column.
//! 5. Reorder keeps the multiset of orders and undoes itself.

use cardmason_core::{GeometryRegistry, ItemSource, ItemsStore, Measurement, compute_layout};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const COLUMN_WIDTH: f64 = 100.0;

fn heights(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..=300, 1..=max_len)
}

/// Cards `c0..cN` with the given heights; `separators` marks which become
/// full-width separators.
fn build(heights: &[u32], separators: &[bool]) -> (ItemsStore, GeometryRegistry) {
    let sources: Vec<ItemSource> = heights
        .iter()
        .enumerate()
        .map(|(index, _)| {
            let id = format!("c{index}");
            // The first item stays a card so the column width is known.
            if index > 0 && separators.get(index).copied().unwrap_or(false) {
                ItemSource::separator(id)
            } else {
                ItemSource::card(id)
            }
        })
        .collect();
    let store = ItemsStore::from_sources(sources);

    let mut registry = GeometryRegistry::new();
    for (index, &height) in heights.iter().enumerate() {
        registry.insert(
            format!("c{index}").into(),
            Measurement::filled(COLUMN_WIDTH, f64::from(height)),
        );
    }
    (store, registry)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic(values in heights(60), columns in 1usize..=6) {
        let (store, registry) = build(&values, &[]);
        let first = compute_layout(store.items(), columns, &registry).unwrap();
        let second = compute_layout(store.items(), columns, &registry).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Balance bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn columns_stay_balanced(values in heights(60), columns in 1usize..=6) {
        let (store, registry) = build(&values, &[]);
        let layout = compute_layout(store.items(), columns, &registry).unwrap();
        let by_columns = &layout.endline.by_columns;
        let tallest = by_columns.iter().copied().fold(f64::MIN, f64::max);
        let shortest = by_columns.iter().copied().fold(f64::MAX, f64::min);
        let tallest_card = values.iter().copied().max().unwrap_or(0);

        prop_assert!(
            tallest - shortest <= f64::from(tallest_card),
            "spread {} exceeds tallest card {}",
            tallest - shortest,
            tallest_card
        );
        prop_assert_eq!(layout.height, tallest);
        prop_assert_eq!(layout.width, COLUMN_WIDTH * columns as f64);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. No overlap within a column
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cards_in_a_column_do_not_overlap(values in heights(40), columns in 1usize..=5) {
        let (store, registry) = build(&values, &[]);
        let layout = compute_layout(store.items(), columns, &registry).unwrap();

        for column in 0..columns {
            let x = column as f64 * COLUMN_WIDTH;
            let mut spans: Vec<(f64, f64)> = layout
                .elements
                .iter()
                .filter(|element| element.x == x)
                .map(|element| (element.y, element.y + element.wrapper.height))
                .collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in spans.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0, "overlap in column {}: {:?}", column, pair);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Separators reset every column
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn items_after_separator_start_below_it(
        values in heights(40),
        separators in proptest::collection::vec(any::<bool>(), 40),
        columns in 1usize..=5,
    ) {
        let (store, registry) = build(&values, &separators);
        let layout = compute_layout(store.items(), columns, &registry).unwrap();

        for (index, item) in store.items().iter().enumerate() {
            if !item.is_separator {
                continue;
            }
            let separator = layout.elements[index];
            prop_assert_eq!(separator.x, 0.0);
            let bottom = separator.y + separator.wrapper.height;
            for later in &layout.elements[index + 1..] {
                prop_assert!(later.y >= bottom, "item at y {} above separator bottom {}", later.y, bottom);
            }
            for earlier in &layout.elements[..index] {
                prop_assert!(earlier.y + earlier.wrapper.height <= separator.y);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Reorder invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reorder_preserves_orders_and_round_trips(
        len in 2usize..=30,
        from_seed in any::<usize>(),
        to_seed in any::<usize>(),
    ) {
        let from = from_seed % len;
        let to = to_seed % len;
        let mut store = ItemsStore::from_sources((0..len).map(|index| ItemSource::card(format!("c{index}"))));
        let original: Vec<_> = store.items().iter().map(|item| (item.id.clone(), item.order)).collect();

        let moved = store.reorder(from, to);
        prop_assert_eq!(moved, from != to);

        let mut orders: Vec<i64> = store.items().iter().map(|item| item.order).collect();
        orders.sort_unstable();
        let mut expected: Vec<i64> = original.iter().map(|(_, order)| *order).collect();
        expected.sort_unstable();
        prop_assert_eq!(orders, expected);

        for (position, item) in store.items().iter().enumerate() {
            prop_assert_eq!(item.index, position);
        }

        store.reorder(to, from);
        let restored: Vec<_> = store.items().iter().map(|item| (item.id.clone(), item.order)).collect();
        prop_assert_eq!(restored, original);
    }
}
