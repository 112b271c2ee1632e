// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
//! Thread-safe pub/sub fan-out of [`AgentEvent`]s.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::events::AgentEvent;

pub type Subscriber = Box<dyn Fn(&AgentEvent) + Send + Sync>;

/// Handle returned by [`Emitter::subscribe`]; pass to [`Emitter::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Synchronous event bus. `emit` holds a read lock while invoking every
/// subscriber in turn, so a subscriber sees other emits serialize against
/// it but never races a concurrent subscribe/unsubscribe.
pub struct Emitter {
    subscribers: RwLock<Vec<(u64, Subscriber)>>,
    next_id: AtomicU64,
}

impl Emitter {
    pub fn new() -> Self {
        Self { subscribers: RwLock::new(Vec::new()), next_id: AtomicU64::new(0) }
    }

    pub fn subscribe(&self, handler: Subscriber) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().expect("emitter lock poisoned").push((id, handler));
        SubscriptionId(id)
    }

    /// O(1): swap the removed entry with the last element instead of shifting.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscribers.write().expect("emitter lock poisoned");
        if let Some(pos) = subs.iter().position(|(sid, _)| *sid == id.0) {
            subs.swap_remove(pos);
        }
    }

    pub fn emit(&self, event: &AgentEvent) {
        let subs = self.subscribers.read().expect("emitter lock poisoned");
        for (_, handler) in subs.iter() {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("emitter lock poisoned").len()
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
