// File: src/flash.rs
// Purpose: Two-generation flash scope that survives exactly one redirect

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::request_context::Request;
use crate::value::Value;

/// Flash scope with a current and a next generation
///
/// Writes land in the next generation. Reads see the current generation first, then
/// the next one. [`FlashScope::next`] promotes next to current and drops whatever the
/// current generation held.
#[derive(Debug, Clone, Default)]
pub struct FlashScope {
    now: HashMap<String, Value>,
    next: HashMap<String, Value>,
}

impl FlashScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next generation
    pub fn next(&mut self) {
        self.now = std::mem::take(&mut self.next);
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.next.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.now.get(key).or_else(|| self.next.get(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.now.contains_key(key) || self.next.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.now.is_empty() && self.next.is_empty()
    }
}

/// Shared handle on one session's flash scope
#[derive(Debug, Clone, Default)]
pub struct FlashHandle(Arc<Mutex<FlashScope>>);

impl FlashHandle {
    pub fn new(scope: FlashScope) -> Self {
        Self(Arc::new(Mutex::new(scope)))
    }

    /// Locks the scope; a poisoned lock still yields the data
    pub fn lock(&self) -> MutexGuard<'_, FlashScope> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_shared(&self) -> bool {
        Arc::strong_count(&self.0) > 1
    }
}

/// Externally owned store of flash scopes
pub trait FlashStore: Send + Sync {
    fn flash_scope(&self, request: &dyn Request) -> FlashHandle;
}

/// In-memory flash store keyed by session id
///
/// Requests without a session get a fresh scope that is not retained. Scopes of
/// ended sessions stay until [`MemoryFlashStore::remove`] or
/// [`MemoryFlashStore::evict_empty`] drops them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlashStore {
    scopes: Arc<DashMap<String, FlashHandle>>,
}

impl MemoryFlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding a scope
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Drops the scope of a session
    pub fn remove(&self, session_id: &str) {
        self.scopes.remove(session_id);
    }

    /// Drops every scope with nothing flashed that no request is holding
    pub fn evict_empty(&self) -> usize {
        let before = self.scopes.len();
        self.scopes
            .retain(|_, handle| handle.is_shared() || !handle.lock().is_empty());
        let evicted = before.saturating_sub(self.scopes.len());
        if evicted > 0 {
            debug!(evicted, "Evicted empty flash scopes");
        }
        evicted
    }
}

impl FlashStore for MemoryFlashStore {
    fn flash_scope(&self, request: &dyn Request) -> FlashHandle {
        match request.session_id() {
            Some(session_id) => self
                .scopes
                .entry(session_id.to_string())
                .or_default()
                .clone(),
            None => FlashHandle::default(),
        }
    }
}
