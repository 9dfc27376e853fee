//! JWKS store (C4): an atomically-published, wait-free-read snapshot holder.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::jwk::PublicKey;

/// An immutable mapping from `kid` to imported public key.
///
/// `generation` is a test-only monotonically increasing counter used to
/// assert snapshot-monotonicity; it plays no role in production lookups.
#[derive(Clone, Default)]
pub struct Snapshot {
    keys: Arc<HashMap<String, PublicKey>>,
    pub generation: u64,
}

impl Snapshot {
    #[must_use]
    pub fn new(keys: HashMap<String, PublicKey>, generation: u64) -> Self {
        Self {
            keys: Arc::new(keys),
            generation,
        }
    }

    /// `kid` comparison is byte-exact (a plain `HashMap` lookup).
    #[must_use]
    pub fn lookup(&self, kid: &str) -> Option<&PublicKey> {
        self.keys.get(kid)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Holder of exactly one current snapshot.
///
/// `publish`/`current` are implemented on top of `arc_swap::ArcSwap`, giving
/// wait-free reads and the "never an earlier snapshot after a later publish"
/// ordering guarantee required by §4.4 without any lock.
pub struct JwksStore {
    inner: ArcSwap<Snapshot>,
}

impl JwksStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.inner.store(Arc::new(snapshot));
    }

    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }
}

impl Default for JwksStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn publish_then_current_returns_latest() {
        let store = JwksStore::new();
        assert_eq!(store.current().generation, 0);
        store.publish(Snapshot::new(HashMap::new(), 1));
        assert_eq!(store.current().generation, 1);
        store.publish(Snapshot::new(HashMap::new(), 2));
        assert_eq!(store.current().generation, 2);
    }

    #[test]
    fn readers_never_observe_a_stale_snapshot_after_publish() {
        let store = Arc::new(JwksStore::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let mut last = 0u64;
                for _ in 0..1000 {
                    let observed = store.current().generation;
                    assert!(observed >= last, "observed generation went backwards");
                    last = observed;
                }
            }));
        }
        for g in 1..=200u64 {
            store.publish(Snapshot::new(HashMap::new(), g));
        }
        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn old_snapshot_handle_survives_a_later_publish() {
        let store = JwksStore::new();
        store.publish(Snapshot::new(HashMap::new(), 1));
        let old = store.current();
        store.publish(Snapshot::new(HashMap::new(), 2));
        assert_eq!(old.generation, 1);
        assert_eq!(store.current().generation, 2);
    }
}
