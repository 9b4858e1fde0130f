//! Storeloft Catalog - per-store catalog consistency across execution contexts.
//!
//! Merchants edit their store in one tab while the storefront renders in
//! another; both read the same per-origin durable record store but share no
//! memory. This crate keeps every context's in-memory view of a store's
//! catalog (store record, products, categories) fresh, resolves ambiguous
//! storefront identifiers to a canonical store, and computes order totals
//! identically on every checkout surface.
//!
//! # Architecture
//!
//! - [`store`] - the durable record store boundary: the [`store::RecordStore`]
//!   trait, the key schema, and an in-memory shared origin for tests and
//!   embedders
//! - [`cache`] - per-context snapshot cache of store slices, with the write
//!   path every mutation funnels through
//! - [`resolver`] - identifier-to-store resolution with a deterministic
//!   fallback chain and a bounded cold-start wait
//! - [`bus`] - cross-context change propagation over storage events and
//!   window channels, collapsed into one debounced reload per burst
//! - [`pricing`] - pure order total computation
//! - [`cart`] - single-context cart state machine feeding the pricing engine
//! - [`context`] - one object wiring all of the above per execution context
//!
//! Data flow: a mutation goes through the cache write path into the record
//! store, the bus announces it, other contexts' buses debounce the
//! announcements and re-hydrate their caches, and UI subscribers re-render.
//!
//! # Consistency model
//!
//! Last-write-wins at the record store; no vector clocks, no merge. A losing
//! writer simply observes a further change notification and converges to the
//! winning state. This is the intended trade-off for a single-owner-per-store
//! editing model.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bus;
pub mod cache;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod pricing;
pub mod resolver;
pub mod store;

pub use bus::{BusDriver, CatalogEvent, SyncBus, WindowLink, WindowMessage};
pub use cache::{Audience, CatalogCache, StoreSlice};
pub use cart::{Cart, LineChange, StockExceeded};
pub use config::CatalogConfig;
pub use context::StorefrontContext;
pub use error::CatalogError;
pub use pricing::{PricedCart, StaleCartLine, StaleReason, compute_total, zone_for_city};
pub use resolver::{ResolveError, StoreResolver};
pub use store::{MemoryOrigin, OriginHandle, RecordStore, StorageError, StorageEvent};
