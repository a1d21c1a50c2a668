//! Snippet fixtures and deterministic stores.

use chrono::{DateTime, TimeZone, Utc};
use snipstash_core::record::{fields, iso_timestamp};
use snipstash_storage::{Document, FieldValue, MemoryStore};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Epoch second the ticking clock starts at (2023-11-14T22:13:20Z).
pub const CLOCK_START: i64 = 1_700_000_000;

/// A [`MemoryStore`] whose server clock advances one second per write.
pub fn ticking_store() -> Arc<MemoryStore> {
    let tick = AtomicI64::new(CLOCK_START);
    Arc::new(MemoryStore::with_clock(move || {
        let secs = tick.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).unwrap()
    }))
}

/// The time the ticking clock reports on its `n`th write (zero-based).
pub fn tick(n: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(CLOCK_START + n, 0).unwrap()
}

/// A snippet document as the web client writes it.
pub fn snippet(date: &str, code: &str) -> Document {
    Document::new()
        .with(fields::DATE, date)
        .with(fields::CODE, code)
        .with(fields::TIMESTAMP, FieldValue::ServerTimestamp)
        .with(fields::CREATED, iso_timestamp(Utc::now()))
}

/// A snippet document with a fixed server timestamp.
pub fn snippet_at(date: &str, code: &str, at: DateTime<Utc>) -> Document {
    Document::new()
        .with(fields::DATE, date)
        .with(fields::CODE, code)
        .with(fields::TIMESTAMP, at)
        .with(fields::CREATED, iso_timestamp(at))
}

/// A document whose server timestamp never materialized.
pub fn pending_snippet(date: &str, code: &str, created: DateTime<Utc>) -> Document {
    Document::new()
        .with(fields::DATE, date)
        .with(fields::CODE, code)
        .with(fields::CREATED, iso_timestamp(created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipstash_storage::{DocumentStore, Query};

    #[tokio::test]
    async fn test_ticking_store_advances() {
        let store = ticking_store();
        store.add("c", snippet("2024-01-01", "a")).await.unwrap();
        store.add("c", snippet("2024-01-01", "b")).await.unwrap();

        let docs = store.query("c", &Query::new()).await.unwrap();
        let mut times: Vec<_> = docs
            .iter()
            .filter_map(|d| d.document.get_timestamp(fields::TIMESTAMP))
            .collect();
        times.sort();
        assert_eq!(times, vec![tick(0), tick(1)]);
    }
}
