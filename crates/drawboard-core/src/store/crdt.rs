//! Loro-backed element store.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "elements": LoroMap<ElementId, String>  (element JSON)
//! └── "z_order":  LoroList<String>            (element ids, bottom to top)
//! ```
//!
//! Elements are stored as JSON strings so the map entry is replaced as a
//! whole, which gives last-writer-wins per element when peers merge.

use super::{ElementMap, ElementStore, StoreCallback, StoreError, StoreResult, SubscriptionId, Subscribers};
use crate::element::{DrawingElement, ElementId};
use loro::{ExportMode, LoroDoc, LoroList, LoroMap, LoroValue, ValueOrContainer, VersionVector};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Key for the elements map in the document.
pub const ELEMENTS_KEY: &str = "elements";
/// Key for the z-order list in the document.
pub const Z_ORDER_KEY: &str = "z_order";

/// A CRDT document exposed as an [`ElementStore`].
///
/// Clones share the document and its subscribers.
#[derive(Clone)]
pub struct CrdtStore {
    doc: Rc<LoroDoc>,
    subscribers: Rc<RefCell<Subscribers>>,
}

impl Default for CrdtStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CrdtStore {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            doc: Rc::new(LoroDoc::new()),
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    /// Create a document from a snapshot exported by a peer.
    pub fn from_snapshot(bytes: &[u8]) -> StoreResult<Self> {
        let store = Self::new();
        store
            .doc
            .import(bytes)
            .map_err(|e| StoreError::Crdt(e.to_string()))?;
        Ok(store)
    }

    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    fn elements_map(&self) -> LoroMap {
        self.doc.get_map(ELEMENTS_KEY)
    }

    fn z_order_list(&self) -> LoroList {
        self.doc.get_list(Z_ORDER_KEY)
    }

    /// Element ids in z-order, without duplicates.
    ///
    /// Concurrent inserts of the same id from two peers can leave duplicate
    /// entries in the list; the first occurrence wins.
    pub fn z_order(&self) -> Vec<String> {
        let list = self.z_order_list();
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            if let Some(ValueOrContainer::Value(LoroValue::String(id))) = list.get(i) {
                let id = id.to_string();
                if seen.insert(id.clone()) {
                    result.push(id);
                }
            }
        }
        result
    }

    fn read_element(&self, map: &LoroMap, id: &str) -> Option<DrawingElement> {
        let Some(ValueOrContainer::Value(LoroValue::String(json))) = map.get(id) else {
            return None;
        };
        match serde_json::from_str::<DrawingElement>(&json.to_string()) {
            Ok(element) => Some(element),
            Err(e) => {
                log::warn!("Skipping undecodable element {}: {}", id, e);
                None
            }
        }
    }

    fn remove_from_z_order(list: &LoroList, id: &str) -> StoreResult<()> {
        let mut i = 0;
        while i < list.len() {
            match list.get(i) {
                Some(ValueOrContainer::Value(LoroValue::String(s))) if s.as_ref() == id => {
                    list.delete(i, 1).map_err(|e| StoreError::Crdt(e.to_string()))?;
                }
                _ => i += 1,
            }
        }
        Ok(())
    }

    /// Export the whole document.
    pub fn export_snapshot(&self) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| StoreError::Crdt(e.to_string()))
    }

    /// Export the operations a peer at `since` is missing.
    pub fn export_updates(&self, since: &VersionVector) -> StoreResult<Vec<u8>> {
        self.doc
            .export(ExportMode::updates(since))
            .map_err(|e| StoreError::Crdt(e.to_string()))
    }

    /// Merge a snapshot or update from a peer and notify subscribers.
    pub fn import(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.doc
            .import(bytes)
            .map_err(|e| StoreError::Crdt(e.to_string()))?;
        let snapshot = self.snapshot();
        log::debug!("Imported remote changes: {} elements", snapshot.len());
        Subscribers::notify(&self.subscribers, &snapshot);
        Ok(())
    }

    /// Current version vector.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }
}

impl ElementStore for CrdtStore {
    fn snapshot(&self) -> ElementMap {
        let map = self.elements_map();
        let mut elements = ElementMap::new();
        let mut listed = HashSet::new();
        for id in self.z_order() {
            if let Some(element) = self.read_element(&map, &id) {
                elements.upsert(element);
            }
            listed.insert(id);
        }
        // Entries that lost their z-order slot in a merge still belong to the document.
        let mut orphans: Vec<String> = match map.get_value() {
            LoroValue::Map(entries) => entries
                .keys()
                .map(|k| k.to_string())
                .filter(|k| !listed.contains(k))
                .collect(),
            _ => Vec::new(),
        };
        orphans.sort();
        for id in orphans {
            if let Some(element) = self.read_element(&map, &id) {
                elements.upsert(element);
            }
        }
        elements
    }

    fn update(&mut self, next: ElementMap) -> StoreResult<()> {
        let current = self.snapshot();
        let map = self.elements_map();
        let list = self.z_order_list();

        for id in current.ids() {
            if !next.contains(*id) {
                let key = id.to_string();
                map.delete(&key).map_err(|e| StoreError::Crdt(e.to_string()))?;
                Self::remove_from_z_order(&list, &key)?;
            }
        }

        for element in next.iter() {
            let id: ElementId = element.id();
            if current.get(id) == Some(element) {
                continue;
            }
            let key = id.to_string();
            let json = serde_json::to_string(element)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            map.insert(&key, json).map_err(|e| StoreError::Crdt(e.to_string()))?;
            if !current.contains(id) {
                list.push(LoroValue::String(key.into()))
                    .map_err(|e| StoreError::Crdt(e.to_string()))?;
            }
        }

        self.doc.commit();
        let snapshot = self.snapshot();
        log::debug!("CRDT store committed: {} elements", snapshot.len());
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
