//! Cross-context synchronization bus.
//!
//! Catalog mutations made in one execution context must reach every other
//! context without shared memory. Two delivery channels exist because
//! contexts differ in relationship:
//!
//! - **Same origin, different tab**: the record store's native change event,
//!   which fires in every context *except* the writer. [`SyncBus::publish`]
//!   writes the notification to the broadcast marker key so the payload
//!   rides the event itself.
//! - **Parent/child window** (a storefront preview opened from the builder):
//!   a [`WindowLink`] mailbox carrying JSON envelopes. Envelopes are parsed
//!   into the closed [`WindowMessage`] union at the boundary; anything else
//!   is ignored. Envelopes originating from the receiving context are
//!   dropped to keep echoes from looping.
//!
//! Both channels funnel into one debounced reload: each notification resets
//! a quiet-period timer, and only when the timer elapses does the cache
//! re-hydrate - once per dirtied store per burst. A merchant hammering
//! through ten field edits produces one reload in each observing context,
//! not ten.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};

use storeloft_core::{ChangeKind, ChangeNotification, ContextId, StoreId};

use crate::cache::CatalogCache;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::store::{StorageEvent, keys};

/// Capacity of the subscriber broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Envelopes
// =============================================================================

/// The closed set of cross-window envelopes the bus acts on.
///
/// Windows exchange arbitrary JSON; only values that parse into this union
/// are trusted. Every variant carries the underlying [`ChangeNotification`] -
/// the variant name exists so unrelated tooling listening on the same
/// channel can route without decoding the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowMessage {
    StoreUpdated(ChangeNotification),
    StoreCustomizationUpdated(ChangeNotification),
    ProductCreated(ChangeNotification),
    ProductUpdated(ChangeNotification),
    ProductDeleted(ChangeNotification),
    CategoryUpdated(ChangeNotification),
}

impl WindowMessage {
    /// Wrap a notification in the envelope matching its change kind.
    #[must_use]
    pub fn from_notification(note: &ChangeNotification) -> Self {
        match note.kind {
            ChangeKind::Store => Self::StoreUpdated(note.clone()),
            ChangeKind::Customization => Self::StoreCustomizationUpdated(note.clone()),
            ChangeKind::Product => Self::ProductUpdated(note.clone()),
            ChangeKind::Category => Self::CategoryUpdated(note.clone()),
        }
    }

    /// Validate an untrusted JSON value into an envelope.
    ///
    /// Returns `None` for anything outside the known set.
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// The notification carried by this envelope.
    #[must_use]
    pub fn notification(&self) -> &ChangeNotification {
        match self {
            Self::StoreUpdated(note)
            | Self::StoreCustomizationUpdated(note)
            | Self::ProductCreated(note)
            | Self::ProductUpdated(note)
            | Self::ProductDeleted(note)
            | Self::CategoryUpdated(note) => note,
        }
    }
}

// =============================================================================
// Window links
// =============================================================================

/// One end of a direct window-to-window message channel.
///
/// Models `postMessage` between a builder window and a preview it opened:
/// each end sends JSON values to the other. Create a connected pair with
/// [`WindowLink::pair`] and hand one end to each context's bus.
#[derive(Debug)]
pub struct WindowLink {
    tx: mpsc::UnboundedSender<Value>,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl WindowLink {
    /// Create two connected ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self { tx: a_tx, rx: b_rx }, Self { tx: b_tx, rx: a_rx })
    }

    /// Send a raw JSON value to the other end.
    ///
    /// Delivery failures (the other window is gone) are ignored, as they are
    /// for real cross-window messaging.
    pub fn send(&self, value: Value) {
        let _ = self.tx.send(value);
    }

    /// Receive the next value, or `None` once the other end is gone.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    fn split(self) -> (mpsc::UnboundedSender<Value>, mpsc::UnboundedReceiver<Value>) {
        (self.tx, self.rx)
    }
}

// =============================================================================
// Bus
// =============================================================================

/// A catalog change visible to UI subscribers, emitted after the cache has
/// re-hydrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEvent {
    pub store_id: StoreId,
    /// Every change kind observed for the store during the collapsed burst.
    pub kinds: Vec<ChangeKind>,
}

/// Per-context synchronization bus handle.
///
/// Cheaply cloneable. The actual debouncing runs in the paired
/// [`BusDriver`], which the owning context spawns.
#[derive(Clone)]
pub struct SyncBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    context: ContextId,
    cache: CatalogCache,
    funnel: mpsc::UnboundedSender<ChangeNotification>,
    windows: Mutex<Vec<mpsc::UnboundedSender<Value>>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl SyncBus {
    /// Create a bus over the given cache, returning the handle and the
    /// driver the caller must spawn.
    #[must_use]
    pub fn new(cache: CatalogCache, config: &CatalogConfig) -> (Self, BusDriver) {
        let (funnel_tx, funnel_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let bus = Self {
            inner: Arc::new(BusInner {
                context: cache.context(),
                cache: cache.clone(),
                funnel: funnel_tx,
                windows: Mutex::new(Vec::new()),
                events: events_tx.clone(),
            }),
        };
        let driver = BusDriver {
            cache,
            funnel: funnel_rx,
            events: events_tx,
            debounce: config.debounce,
        };
        (bus, driver)
    }

    /// Announce a local mutation to every other context.
    ///
    /// Writes the notification to the broadcast marker key (same-origin
    /// tabs receive it via the record store's change event, which never
    /// fires in this context) and forwards it to every attached window.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker write fails.
    #[instrument(skip(self, note), fields(store = %note.store_id, kind = ?note.kind))]
    pub fn publish(&self, note: &ChangeNotification) -> Result<()> {
        let raw = serde_json::to_string(note)?;
        self.inner.cache.records().set(keys::SYNC_KEY, &raw)?;

        let envelope = serde_json::to_value(WindowMessage::from_notification(note))?;
        if let Ok(mut windows) = self.inner.windows.lock() {
            windows.retain(|window| window.send(envelope.clone()).is_ok());
        }
        Ok(())
    }

    /// Subscribe to catalog change events emitted after re-hydration.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.inner.events.subscribe()
    }

    /// Attach a direct window channel.
    ///
    /// Outgoing publishes are mirrored to the window; incoming envelopes are
    /// validated, filtered for echoes, and funneled into the debouncer.
    pub fn attach_window(&self, link: WindowLink) {
        let (tx, mut rx) = link.split();
        if let Ok(mut windows) = self.inner.windows.lock() {
            windows.push(tx);
        }

        let funnel = self.inner.funnel.clone();
        let own_context = self.inner.context;
        tokio::spawn(async move {
            while let Some(value) = rx.recv().await {
                match WindowMessage::parse(&value) {
                    Some(message) => {
                        let note = message.notification();
                        if note.origin_context_id == own_context {
                            debug!(store = %note.store_id, "Dropping own echoed envelope");
                            continue;
                        }
                        if funnel.send(note.clone()).is_err() {
                            break;
                        }
                    }
                    None => {
                        debug!("Ignoring unrecognized window message");
                    }
                }
            }
        });
    }

    /// Connect the record store's change events for this context.
    ///
    /// Only the broadcast marker key is acted on; entity-key events carry no
    /// validated notification and every mutation also writes the marker.
    pub fn connect_storage_events(&self, mut rx: mpsc::UnboundedReceiver<StorageEvent>) {
        let funnel = self.inner.funnel.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if event.key != keys::SYNC_KEY {
                    continue;
                }
                let Some(raw) = event.new_value else {
                    continue;
                };
                match serde_json::from_str::<ChangeNotification>(&raw) {
                    Ok(note) => {
                        if funnel.send(note).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "Discarding malformed change notification");
                    }
                }
            }
        });
    }
}

/// The debouncing pump behind a [`SyncBus`].
///
/// Owns the funnel of incoming notifications. Each notification marks its
/// store dirty and resets the quiet-period timer; when the timer elapses,
/// every dirty store is re-hydrated exactly once and a [`CatalogEvent`] is
/// broadcast per store.
pub struct BusDriver {
    cache: CatalogCache,
    funnel: mpsc::UnboundedReceiver<ChangeNotification>,
    events: broadcast::Sender<CatalogEvent>,
    debounce: Duration,
}

impl BusDriver {
    /// Run until every handle to the bus is gone.
    pub async fn run(mut self) {
        let mut pending: HashMap<StoreId, BTreeSet<ChangeKind>> = HashMap::new();
        let mut deadline: Option<Instant> = None;

        loop {
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                received = self.funnel.recv() => {
                    match received {
                        Some(note) => {
                            pending.entry(note.store_id).or_default().insert(note.kind);
                            // Reset, never stack: the burst must go quiet
                            // before a reload runs.
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        None => {
                            if !pending.is_empty() {
                                self.flush(&mut pending);
                            }
                            return;
                        }
                    }
                }
                () = timer => {
                    self.flush(&mut pending);
                    deadline = None;
                }
            }
        }
    }

    #[instrument(skip_all, fields(stores = pending.len()))]
    fn flush(&self, pending: &mut HashMap<StoreId, BTreeSet<ChangeKind>>) {
        for (store_id, kinds) in pending.drain() {
            self.cache.invalidate(&store_id);
            let slice = self.cache.hydrate(&store_id);
            debug!(store = %store_id, present = slice.is_some(), "Debounced reload");
            // No receivers is fine; the UI may not have subscribed yet.
            let _ = self.events.send(CatalogEvent {
                store_id,
                kinds: kinds.into_iter().collect(),
            });
        }
    }
}
