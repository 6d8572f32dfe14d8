//! Property: counter consistency. For any interleaving of ingest/dedup/
//! parity/error events, `CountingObserver`'s snapshot always equals the
//! plain sum of what was reported — no event is lost or double-counted
//! regardless of how the calls are ordered or mixed.

use carb_telemetry::{CountingObserver, IngestObserver};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Event {
    Ingested(u16),
    Deduped(u16),
    Parity,
    ItemError,
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        any::<u16>().prop_map(Event::Ingested),
        any::<u16>().prop_map(Event::Deduped),
        Just(Event::Parity),
        Just(Event::ItemError),
    ]
}

proptest! {
    #[test]
    fn snapshot_matches_the_plain_sum_of_reported_events(events in proptest::collection::vec(event_strategy(), 0..200)) {
        let observer = CountingObserver::new();

        let mut ingested_bytes = 0u64;
        let mut ingested_count = 0u64;
        let mut deduped_bytes = 0u64;
        let mut deduped_count = 0u64;
        let mut parity_created_count = 0u64;
        let mut item_error_count = 0u64;

        for event in &events {
            match event {
                Event::Ingested(bytes) => {
                    observer.blob_ingested(u64::from(*bytes));
                    ingested_bytes += u64::from(*bytes);
                    ingested_count += 1;
                }
                Event::Deduped(bytes) => {
                    observer.blob_deduped(u64::from(*bytes));
                    deduped_bytes += u64::from(*bytes);
                    deduped_count += 1;
                }
                Event::Parity => {
                    observer.parity_created();
                    parity_created_count += 1;
                }
                Event::ItemError => {
                    observer.item_error();
                    item_error_count += 1;
                }
            }
        }

        let snap = observer.snapshot();
        prop_assert_eq!(snap.ingested_bytes, ingested_bytes);
        prop_assert_eq!(snap.ingested_count, ingested_count);
        prop_assert_eq!(snap.deduped_bytes, deduped_bytes);
        prop_assert_eq!(snap.deduped_count, deduped_count);
        prop_assert_eq!(snap.parity_created_count, parity_created_count);
        prop_assert_eq!(snap.item_error_count, item_error_count);
    }
}
