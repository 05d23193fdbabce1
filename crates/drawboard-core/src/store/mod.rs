//! Shared element store abstraction.
//!
//! The canonical element collection lives in an external shared store that
//! only knows two verbs: replace the whole `{id -> element}` map, and notify
//! subscribers whenever the map changes. [`DocumentAdapter`] layers the
//! single-element helpers on top and always merges against the latest map it
//! has seen.

mod crdt;
mod memory;

pub use crdt::{CrdtStore, ELEMENTS_KEY, Z_ORDER_KEY};
pub use memory::MemoryStore;

use crate::element::{DrawingElement, ElementId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CRDT error: {0}")]
    Crdt(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Insertion-ordered map of elements.
///
/// Iteration order is the display order: later elements draw on top and are
/// hit-tested first. Replacing an element keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DrawingElement>", into = "Vec<DrawingElement>")]
pub struct ElementMap {
    order: Vec<ElementId>,
    elements: HashMap<ElementId, DrawingElement>,
}

impl ElementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&DrawingElement> {
        self.elements.get(&id)
    }

    /// Insert a new element on top, or replace an existing one in place.
    pub fn upsert(&mut self, element: DrawingElement) {
        let id = element.id();
        if self.elements.insert(id, element).is_none() {
            self.order.push(id);
        }
    }

    /// Replace an element only if it is already present.
    pub fn replace(&mut self, element: DrawingElement) -> bool {
        match self.elements.get_mut(&element.id()) {
            Some(slot) => {
                *slot = element;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ElementId) -> Option<DrawingElement> {
        let removed = self.elements.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.elements.clear();
    }

    /// Element ids in display order.
    pub fn ids(&self) -> &[ElementId] {
        &self.order
    }

    /// Elements bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DrawingElement> + '_ {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements top to bottom.
    pub fn iter_rev(&self) -> impl Iterator<Item = &DrawingElement> + '_ {
        self.iter().rev()
    }
}

impl From<Vec<DrawingElement>> for ElementMap {
    fn from(elements: Vec<DrawingElement>) -> Self {
        let mut map = ElementMap::new();
        for element in elements {
            map.upsert(element);
        }
        map
    }
}

impl From<ElementMap> for Vec<DrawingElement> {
    fn from(mut map: ElementMap) -> Self {
        map.order
            .iter()
            .filter_map(|id| map.elements.remove(id))
            .collect()
    }
}

impl FromIterator<DrawingElement> for ElementMap {
    fn from_iter<I: IntoIterator<Item = DrawingElement>>(iter: I) -> Self {
        let mut map = ElementMap::new();
        for element in iter {
            map.upsert(element);
        }
        map
    }
}

/// Handle returned by [`ElementStore::subscribe`].
pub type SubscriptionId = u64;

/// Change callback. Receives the full map after every change.
pub type StoreCallback = Box<dyn FnMut(&ElementMap)>;

/// The external shared key-value store holding the canonical elements.
pub trait ElementStore {
    /// The current full map.
    fn snapshot(&self) -> ElementMap;

    /// Replace the entire shared map. Subscribers are notified on success.
    fn update(&mut self, next: ElementMap) -> StoreResult<()>;

    /// Register a change callback.
    fn subscribe(&mut self, callback: StoreCallback) -> SubscriptionId;

    /// Remove a change callback. Returns `false` for an unknown id.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Subscriber registry shared by the store backends.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: SubscriptionId,
    entries: Vec<(SubscriptionId, StoreCallback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: StoreCallback) -> SubscriptionId {
        self.next_id += 1;
        self.entries.push((self.next_id, callback));
        self.next_id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(other, _)| *other != id);
        self.entries.len() != before
    }

    /// Call every subscriber without holding the borrow, so callbacks may
    /// subscribe further listeners.
    pub(crate) fn notify(cell: &RefCell<Self>, map: &ElementMap) {
        let mut taken = std::mem::take(&mut cell.borrow_mut().entries);
        for (_, callback) in taken.iter_mut() {
            callback(map);
        }
        let mut inner = cell.borrow_mut();
        taken.append(&mut inner.entries);
        inner.entries = taken;
    }
}

/// Binds the board to an [`ElementStore`].
///
/// Holds the last map the store reported. Store callbacks land in an inbox
/// that [`DocumentAdapter::poll`] drains, so the store never calls back into
/// board state directly.
pub struct DocumentAdapter<S: ElementStore> {
    store: S,
    latest: ElementMap,
    inbox: Rc<RefCell<Option<ElementMap>>>,
    subscription: SubscriptionId,
}

impl<S: ElementStore> DocumentAdapter<S> {
    pub fn new(mut store: S) -> Self {
        let inbox: Rc<RefCell<Option<ElementMap>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&inbox);
        let subscription = store.subscribe(Box::new(move |map: &ElementMap| {
            *sink.borrow_mut() = Some(map.clone());
        }));
        let latest = store.snapshot();
        Self {
            store,
            latest,
            inbox,
            subscription,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Last map received from the store.
    pub fn latest(&self) -> &ElementMap {
        &self.latest
    }

    /// Take a pending store notification, if any.
    pub fn poll(&mut self) -> Option<&ElementMap> {
        let next = self.inbox.borrow_mut().take()?;
        self.latest = next;
        Some(&self.latest)
    }

    fn write(&mut self, next: ElementMap) -> StoreResult<()> {
        let expected = next.clone();
        self.store.update(next)?;
        // Stores that do not echo local writes still need the cache to move.
        if self.poll().is_none() {
            self.latest = expected;
        }
        Ok(())
    }

    /// Upsert a single element against the latest map.
    pub fn add_element(&mut self, element: DrawingElement) -> StoreResult<()> {
        self.poll();
        let mut next = self.latest.clone();
        next.upsert(element);
        self.write(next)
    }

    /// Same as [`DocumentAdapter::add_element`]; an element missing from the
    /// latest map is added back on top.
    pub fn update_element(&mut self, element: DrawingElement) -> StoreResult<()> {
        self.add_element(element)
    }

    /// Remove a single id. Missing ids are a no-op.
    pub fn delete_element(&mut self, id: ElementId) -> StoreResult<()> {
        self.poll();
        if !self.latest.contains(id) {
            return Ok(());
        }
        let mut next = self.latest.clone();
        next.remove(id);
        self.write(next)
    }

    /// Remove every element.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.poll();
        if self.latest.is_empty() {
            return Ok(());
        }
        self.write(ElementMap::new())
    }
}

impl<S: ElementStore> Drop for DocumentAdapter<S> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
