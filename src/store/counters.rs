//! Per-article counters (likes, reads)

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::JsonStore;

/// Counter document: `{ "stats": { "<title>": n } }`
///
/// Counts that are not non-negative integers do not spoil the document:
/// non-negative numbers are truncated, anything else is dropped with a
/// warning, and the remaining counts are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDocument {
    #[serde(default, deserialize_with = "lenient_counts")]
    pub stats: IndexMap<String, u64>,
}

fn lenient_counts<'de, D>(deserializer: D) -> Result<IndexMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(title, value)| {
            let count = value.as_u64().or_else(|| {
                value
                    .as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| n as u64)
            });
            if count.is_none() {
                tracing::warn!("Dropping invalid count for {:?}: {}", title, value);
            }
            count.map(|count| (title, count))
        })
        .collect())
}

/// A title-to-count mapping where absent titles count as zero
#[derive(Debug)]
pub struct CounterStore {
    label: &'static str,
    store: JsonStore<StatsDocument>,
}

impl CounterStore {
    pub fn new(label: &'static str, store: JsonStore<StatsDocument>) -> Self {
        Self { label, store }
    }

    /// What this store counts, e.g. `likes`
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Current count for `title`
    pub async fn count(&self, title: &str) -> u64 {
        self.store
            .read()
            .await
            .stats
            .get(title)
            .copied()
            .unwrap_or(0)
    }

    /// Add one to the count for `title` and return the new value.
    ///
    /// A failed save is logged; the incremented value is still returned.
    pub async fn increment(&self, title: &str) -> u64 {
        let _guard = self.store.lock().await;

        let mut doc = self.store.read().await;
        let count = doc.stats.entry(title.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        if let Err(e) = self.store.write(&doc).await {
            tracing::error!("Failed to save {} for {:?}: {}", self.label, title, e);
        } else {
            tracing::debug!("{} for {:?} is now {}", self.label, title, count);
        }

        count
    }

    /// Every recorded count
    pub async fn all(&self) -> IndexMap<String, u64> {
        self.store.read().await.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalBackend;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn likes(tmp: &TempDir) -> CounterStore {
        let backend = Arc::new(LocalBackend::new(tmp.path()));
        CounterStore::new("likes", JsonStore::new(backend, "like-stats.json"))
    }

    #[tokio::test]
    async fn test_increment_from_zero() {
        let tmp = TempDir::new().unwrap();
        let store = likes(&tmp);

        assert_eq!(store.count("Hello").await, 0);
        assert_eq!(store.increment("Hello").await, 1);
        assert_eq!(store.increment("Hello").await, 2);
        assert_eq!(store.count("Hello").await, 2);
        assert_eq!(store.count("Other").await, 0);
    }

    #[tokio::test]
    async fn test_existing_document() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("like-stats.json"),
            r#"{ "stats": { "b": 4, "a": 7 } }"#,
        )
        .unwrap();

        let store = likes(&tmp);
        assert_eq!(store.increment("a").await, 8);

        let all = store.all().await;
        let keys: Vec<_> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_invalid_counts_keep_the_rest() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("like-stats.json"),
            r#"{ "stats": { "a": 3, "b": 1.5, "c": -1, "d": "x" } }"#,
        )
        .unwrap();

        let store = likes(&tmp);
        assert_eq!(store.count("b").await, 1);
        assert_eq!(store.increment("a").await, 4);

        let all = store.all().await;
        assert_eq!(all.get("a"), Some(&4));
        assert_eq!(all.get("b"), Some(&1));
        assert!(!all.contains_key("c"));
        assert!(!all.contains_key("d"));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(likes(&tmp));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment("busy").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count("busy").await, 10);
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let tmp = TempDir::new().unwrap();
        let backend = Arc::new(LocalBackend::new(tmp.path()));
        let store: JsonStore<StatsDocument> = JsonStore::new(backend, "read-stats.json");

        let mut doc = StatsDocument::default();
        doc.stats.insert("z".to_string(), 3);
        doc.stats.insert("a".to_string(), 0);
        store.write(&doc).await.unwrap();

        assert_eq!(store.read().await, doc);
    }
}
