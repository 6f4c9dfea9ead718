//! Activity cell storage.
//!
//! # Layout
//!
//! - primary: `(resource_id, activity_id)` → cell (owns the cells)
//! - secondary: `resource_id` → activity ids in insertion order
//!
//! Every key in the primary map appears exactly once in its resource's
//! secondary list and vice versa. Callers hold keys, never references
//! across mutations.

use std::collections::{BTreeMap, HashMap};

use crate::models::{ActivityCell, BoardId, CellField, CellKey};

/// Sparse resource × activity cell store.
#[derive(Debug, Clone)]
pub struct ActivityIndex<RI, AI> {
    cells: HashMap<CellKey<RI, AI>, ActivityCell<RI, AI>>,
    by_resource: BTreeMap<RI, Vec<AI>>,
}

impl<RI: BoardId, AI: BoardId> Default for ActivityIndex<RI, AI> {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
            by_resource: BTreeMap::new(),
        }
    }
}

impl<RI: BoardId, AI: BoardId> ActivityIndex<RI, AI> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the index holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether a cell with this key is stored.
    pub fn contains(&self, key: &CellKey<RI, AI>) -> bool {
        self.cells.contains_key(key)
    }

    /// Live cell for a key.
    pub fn get(&self, key: &CellKey<RI, AI>) -> Option<&ActivityCell<RI, AI>> {
        self.cells.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &CellKey<RI, AI>) -> Option<&mut ActivityCell<RI, AI>> {
        self.cells.get_mut(key)
    }

    /// Maps a possibly stale cell instance to the live cell with the same key.
    pub fn resolve(&self, cell: &ActivityCell<RI, AI>) -> Option<&ActivityCell<RI, AI>> {
        self.cells.get(&cell.key())
    }

    /// Keeps only the keys that are stored; the rest are logged and dropped.
    ///
    /// Duplicates in the input are collapsed, first occurrence wins.
    pub fn resolve_many<I>(&self, keys: I) -> Vec<CellKey<RI, AI>>
    where
        I: IntoIterator<Item = CellKey<RI, AI>>,
    {
        let mut resolved: Vec<CellKey<RI, AI>> = Vec::new();
        for key in keys {
            if !self.cells.contains_key(&key) {
                log::warn!("could not resolve activity cell {key}");
            } else if !resolved.contains(&key) {
                resolved.push(key);
            }
        }
        resolved
    }

    /// Inserts a cell unless its key is already taken.
    ///
    /// Returns the key if the cell was added.
    pub fn insert(&mut self, cell: ActivityCell<RI, AI>) -> Option<CellKey<RI, AI>> {
        let key = cell.key();
        if self.cells.contains_key(&key) {
            return None;
        }
        self.by_resource
            .entry(key.resource_id.clone())
            .or_default()
            .push(key.activity_id.clone());
        self.cells.insert(key.clone(), cell);
        Some(key)
    }

    /// Removes a cell from both maps.
    pub fn remove(&mut self, key: &CellKey<RI, AI>) -> Option<ActivityCell<RI, AI>> {
        let cell = self.cells.remove(key)?;
        if let Some(list) = self.by_resource.get_mut(&key.resource_id) {
            list.retain(|a| a != &key.activity_id);
            if list.is_empty() {
                self.by_resource.remove(&key.resource_id);
            }
        }
        Some(cell)
    }

    /// Removes every cell, returning them in resource order.
    pub fn clear(&mut self) -> Vec<ActivityCell<RI, AI>> {
        let order = self.keys();
        let mut cells = std::mem::take(&mut self.cells);
        self.by_resource.clear();
        order.iter().filter_map(|k| cells.remove(k)).collect()
    }

    /// Keys of a resource's cells in insertion order.
    pub fn keys_for(&self, resource_id: &RI) -> Vec<CellKey<RI, AI>> {
        self.by_resource
            .get(resource_id)
            .map(|list| {
                list.iter()
                    .map(|a| CellKey::new(resource_id.clone(), a.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys of the cells of several resources.
    pub fn keys_for_all<'a, I>(&self, resource_ids: I) -> Vec<CellKey<RI, AI>>
    where
        I: IntoIterator<Item = &'a RI>,
        RI: 'a,
    {
        resource_ids
            .into_iter()
            .flat_map(|r| self.keys_for(r))
            .collect()
    }

    /// All keys, by resource then insertion order.
    pub fn keys(&self) -> Vec<CellKey<RI, AI>> {
        self.by_resource
            .iter()
            .flat_map(|(r, list)| list.iter().map(move |a| CellKey::new(r.clone(), a.clone())))
            .collect()
    }

    /// Cells of a resource in insertion order.
    pub fn cells_for<'s>(&'s self, resource_id: &RI) -> impl Iterator<Item = &'s ActivityCell<RI, AI>> + 's {
        self.keys_for(resource_id)
            .into_iter()
            .filter_map(move |k| self.cells.get(&k))
    }

    /// All cells, by resource then insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &ActivityCell<RI, AI>> {
        self.by_resource.iter().flat_map(move |(r, list)| {
            list.iter()
                .filter_map(move |a| self.cells.get(&CellKey::new(r.clone(), a.clone())))
        })
    }

    /// Resource ids that own at least one cell.
    pub fn resource_ids(&self) -> impl Iterator<Item = &RI> {
        self.by_resource.keys()
    }

    /// Applies a field change to a stored cell.
    ///
    /// Returns `None` if the key is unknown, otherwise whether the value changed.
    pub fn set_field(&mut self, key: &CellKey<RI, AI>, field: CellField) -> Option<bool> {
        self.cells.get_mut(key).map(|cell| cell.apply(field))
    }

    /// Verifies that the primary and secondary maps agree.
    pub fn check_consistency(&self) -> bool {
        let mut seen = 0usize;
        for (resource_id, list) in &self.by_resource {
            if list.is_empty() {
                return false;
            }
            for (i, activity_id) in list.iter().enumerate() {
                if list[..i].contains(activity_id) {
                    return false;
                }
                let key = CellKey::new(resource_id.clone(), activity_id.clone());
                match self.cells.get(&key) {
                    Some(cell) if cell.key() == key => seen += 1,
                    _ => return false,
                }
            }
        }
        seen == self.cells.len()
    }
}
