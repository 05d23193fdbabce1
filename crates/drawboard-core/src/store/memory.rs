//! In-memory element store.

use super::{ElementMap, ElementStore, StoreCallback, StoreResult, SubscriptionId, Subscribers};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct MemoryInner {
    elements: ElementMap,
    revision: u64,
}

/// In-memory store for tests and offline use.
///
/// Clones share the same map and subscribers, so a clone can stand in for a
/// remote collaborator writing to the same document.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
    subscribers: Rc<RefCell<Subscribers>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with elements.
    pub fn with_elements(elements: ElementMap) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().elements = elements;
        store
    }

    /// Number of successful updates so far.
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }
}

impl ElementStore for MemoryStore {
    fn snapshot(&self) -> ElementMap {
        self.inner.borrow().elements.clone()
    }

    fn update(&mut self, next: ElementMap) -> StoreResult<()> {
        {
            let mut inner = self.inner.borrow_mut();
            inner.elements = next;
            inner.revision += 1;
        }
        let snapshot = self.snapshot();
        log::debug!("Memory store updated: {} elements", snapshot.len());
        Subscribers::notify(&self.subscribers, &snapshot);
        Ok(())
    }

    fn subscribe(&mut self, callback: StoreCallback) -> SubscriptionId {
        self.subscribers.borrow_mut().add(callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().remove(id)
    }
}
