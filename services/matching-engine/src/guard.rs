//! Per-request mutual exclusion
//!
//! Every status-mutating operation on a request holds that request's lock
//! before it takes the ledger write guard. Operations on different requests
//! only contend on the ledger guard itself.

use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::sync::Arc;
use types::ids::RequestId;

#[derive(Debug, Default)]
pub struct RequestLocks {
    locks: DashMap<RequestId, Arc<Mutex<()>>>,
}

/// Held for the duration of one request-scoped operation
pub struct RequestGuard {
    request_id: RequestId,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl RequestGuard {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl RequestLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock for `request_id` is held
    pub fn lock(&self, request_id: RequestId) -> RequestGuard {
        // Clone the Arc out so the map shard is released before blocking.
        let lock = self.locks.entry(request_id).or_default().clone();
        RequestGuard {
            request_id,
            _guard: lock.lock_arc(),
        }
    }

    /// Non-blocking variant; None if another operation holds the lock
    pub fn try_lock(&self, request_id: RequestId) -> Option<RequestGuard> {
        let lock = self.locks.entry(request_id).or_default().clone();
        lock.try_lock_arc().map(|guard| RequestGuard {
            request_id,
            _guard: guard,
        })
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
