//! Cross-context change notifications.
//!
//! Notifications are ephemeral signals between contexts; they are written to
//! the record store's broadcast key or sent over a window channel, never
//! persisted as part of the catalog itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{ContextId, StoreId};

/// What kind of catalog record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Store,
    Product,
    Category,
    Customization,
}

/// A catalog mutation announcement.
///
/// `origin_context_id` names the context that performed the write so
/// receivers can drop their own echoes on channels that do not already
/// filter them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    pub store_id: StoreId,
    pub origin_context_id: ContextId,
    pub timestamp: DateTime<Utc>,
}

impl ChangeNotification {
    /// Build a notification stamped with the current time.
    #[must_use]
    pub fn now(kind: ChangeKind, store_id: StoreId, origin: ContextId) -> Self {
        Self {
            kind,
            store_id,
            origin_context_id: origin,
            timestamp: Utc::now(),
        }
    }
}
