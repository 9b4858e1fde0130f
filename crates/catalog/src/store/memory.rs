//! In-memory shared origin.
//!
//! Simulates the per-origin durable record store shared by every execution
//! context of one origin: a single ordered map of JSON strings plus a
//! listener registry. Writes fan a [`StorageEvent`] out to every attached
//! context except the writer, reproducing the native change-event asymmetry
//! that keeps a context from reacting to its own writes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use storeloft_core::ContextId;
use tokio::sync::mpsc;
use tracing::debug;

use super::{RecordStore, StorageError, StorageEvent};

/// The storage shared by all contexts of one origin.
///
/// Cheap to clone; all clones see the same records. Contexts do not use this
/// directly - they [`attach`](Self::attach) and get a handle scoped to their
/// own [`ContextId`].
#[derive(Clone, Default)]
pub struct MemoryOrigin {
    inner: Arc<OriginInner>,
}

#[derive(Default)]
struct OriginInner {
    records: RwLock<BTreeMap<String, String>>,
    listeners: Mutex<Vec<Listener>>,
}

struct Listener {
    context: ContextId,
    tx: mpsc::UnboundedSender<StorageEvent>,
}

impl MemoryOrigin {
    /// Create an empty origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a context to this origin.
    ///
    /// Returns a [`RecordStore`] handle that attributes writes to `context`,
    /// and the receiver on which this context observes *other* contexts'
    /// writes.
    #[must_use]
    pub fn attach(
        &self,
        context: ContextId,
    ) -> (OriginHandle, mpsc::UnboundedReceiver<StorageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push(Listener { context, tx });
        }
        let handle = OriginHandle {
            origin: self.clone(),
            context,
        };
        (handle, rx)
    }

    /// Number of records currently stored. Test/diagnostic helper.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .records
            .read()
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Whether the origin holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write a value without attributing it to any attached context.
    ///
    /// Seeds fixture data "from before the contexts existed"; no events fire.
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut records) = self.inner.records.write() {
            records.insert(key.to_string(), value.to_string());
        }
    }

    fn notify_others(&self, writer: ContextId, event: &StorageEvent) {
        let Ok(mut listeners) = self.inner.listeners.lock() else {
            return;
        };
        // Drop listeners whose context has gone away.
        listeners.retain(|listener| {
            if listener.context == writer {
                return true;
            }
            match listener.tx.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    debug!(context = %listener.context, "Pruning detached storage listener");
                    false
                }
            }
        });
    }
}

/// A context-scoped handle onto a [`MemoryOrigin`].
#[derive(Clone)]
pub struct OriginHandle {
    origin: MemoryOrigin,
    context: ContextId,
}

impl OriginHandle {
    /// The context this handle attributes writes to.
    #[must_use]
    pub const fn context(&self) -> ContextId {
        self.context
    }
}

impl RecordStore for OriginHandle {
    fn get(&self, key: &str) -> Option<String> {
        self.origin
            .inner
            .records
            .read()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut records = self
                .origin
                .inner
                .records
                .write()
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            records.insert(key.to_string(), value.to_string());
        }
        self.origin.notify_others(
            self.context,
            &StorageEvent {
                key: key.to_string(),
                new_value: Some(value.to_string()),
                origin: self.context,
            },
        );
        Ok(())
    }

    fn remove(&self, key: &str) {
        let removed = self
            .origin
            .inner
            .records
            .write()
            .ok()
            .and_then(|mut records| records.remove(key));
        if removed.is_some() {
            self.origin.notify_others(
                self.context,
                &StorageEvent {
                    key: key.to_string(),
                    new_value: None,
                    origin: self.context,
                },
            );
        }
    }

    fn keys(&self, prefix: &str) -> Vec<String> {
        self.origin
            .inner
            .records
            .read()
            .map(|records| {
                records
                    .range(prefix.to_string()..)
                    .take_while(|(key, _)| key.starts_with(prefix))
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let origin = MemoryOrigin::new();
        let (store, _rx) = origin.attach(ContextId::new());

        store.set("store:store_1", "{}").unwrap();
        assert_eq!(store.get("store:store_1").as_deref(), Some("{}"));

        store.remove("store:store_1");
        assert!(store.get("store:store_1").is_none());
    }

    #[test]
    fn test_keys_prefix_scan() {
        let origin = MemoryOrigin::new();
        let (store, _rx) = origin.attach(ContextId::new());

        store.set("product:store_1:prod_a", "{}").unwrap();
        store.set("product:store_1:prod_b", "{}").unwrap();
        store.set("product:store_2:prod_c", "{}").unwrap();
        store.set("category:store_1:cat_a", "{}").unwrap();

        let keys = store.keys("product:store_1:");
        assert_eq!(
            keys,
            vec!["product:store_1:prod_a", "product:store_1:prod_b"]
        );
    }

    #[tokio::test]
    async fn test_writer_never_sees_own_event() {
        let origin = MemoryOrigin::new();
        let writer_ctx = ContextId::new();
        let (writer, mut writer_rx) = origin.attach(writer_ctx);
        let (_other, mut other_rx) = origin.attach(ContextId::new());

        writer.set("store:store_1", "{}").unwrap();

        let event = other_rx.recv().await.unwrap();
        assert_eq!(event.key, "store:store_1");
        assert_eq!(event.origin, writer_ctx);

        // The writer's own channel must stay empty.
        assert!(writer_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_remove_fires_event_with_no_value() {
        let origin = MemoryOrigin::new();
        let (writer, _) = origin.attach(ContextId::new());
        let (_other, mut other_rx) = origin.attach(ContextId::new());

        writer.set("store:store_1", "{}").unwrap();
        writer.remove("store:store_1");

        let set_event = other_rx.recv().await.unwrap();
        assert!(set_event.new_value.is_some());
        let remove_event = other_rx.recv().await.unwrap();
        assert!(remove_event.new_value.is_none());
    }

    #[test]
    fn test_remove_of_missing_key_is_silent() {
        let origin = MemoryOrigin::new();
        let (writer, _) = origin.attach(ContextId::new());
        let (_other, mut other_rx) = origin.attach(ContextId::new());

        writer.remove("store:never_written");
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_seed_fires_no_events() {
        let origin = MemoryOrigin::new();
        let (_store, mut rx) = origin.attach(ContextId::new());

        origin.seed("store:store_1", "{}");
        assert_eq!(origin.len(), 1);
        assert!(rx.try_recv().is_err());
    }
}
