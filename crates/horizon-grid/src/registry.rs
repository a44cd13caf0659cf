//! Named grid instances.
//!
//! A [`GridRegistry`] maps caller-chosen ids to shared grids. Each grid sits
//! behind its own mutex, so grids registered under different ids can be
//! driven from different threads.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use parking_lot::{Mutex, RwLock};

use crate::data::RowData;
use crate::error::{Error, Result};
use crate::grid::GridEngine;

/// A grid shared through a registry.
pub type SharedGrid<R> = Arc<Mutex<GridEngine<R>>>;

/// Registry of grids by id.
pub struct GridRegistry<R: RowData> {
    grids: RwLock<HashMap<String, SharedGrid<R>>>,
}

impl<R: RowData> GridRegistry<R> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            grids: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `grid` under `id` and returns the shared handle.
    ///
    /// Fails with [`Error::DuplicateGrid`] if the id is taken.
    pub fn create(&self, id: impl Into<String>, grid: GridEngine<R>) -> Result<SharedGrid<R>> {
        let id = id.into();
        let mut grids = self.grids.write();
        if grids.contains_key(&id) {
            return Err(Error::DuplicateGrid(id));
        }
        let shared = Arc::new(Mutex::new(grid));
        grids.insert(id.clone(), Arc::clone(&shared));
        tracing::debug!(target: targets::REGISTRY, grid_id = %id, count = grids.len(), "grid created");
        Ok(shared)
    }

    /// Looks up a grid.
    pub fn get(&self, id: &str) -> Option<SharedGrid<R>> {
        self.grids.read().get(id).cloned()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.grids.read().contains_key(id)
    }

    /// Removes a grid and disconnects all of its slots.
    ///
    /// Handles obtained earlier stay usable but no longer notify anyone.
    /// Returns `false` if `id` was not registered.
    pub fn destroy(&self, id: &str) -> bool {
        let removed = self.grids.write().remove(id);
        match removed {
            Some(grid) => {
                grid.lock().signals().disconnect_all();
                tracing::debug!(target: targets::REGISTRY, grid_id = id, "grid destroyed");
                true
            }
            None => {
                tracing::trace!(target: targets::REGISTRY, grid_id = id, "destroy ignored: unknown grid");
                false
            }
        }
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.grids.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered grids.
    pub fn len(&self) -> usize {
        self.grids.read().len()
    }

    /// Returns `true` if no grid is registered.
    pub fn is_empty(&self) -> bool {
        self.grids.read().is_empty()
    }
}

impl<R: RowData> Default for GridRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(GridRegistry<crate::data::Record>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::data::Record;
    use crate::record;

    fn grid() -> GridEngine<Record> {
        GridEngine::builder()
            .column(ColumnDef::field("n"))
            .rows([record! { "n" => 1 }, record! { "n" => 2 }])
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let registry = GridRegistry::new();
        let created = registry.create("orders", grid()).unwrap();
        assert!(registry.contains("orders"));
        assert_eq!(registry.len(), 1);

        let fetched = registry.get("orders").unwrap();
        assert!(Arc::ptr_eq(&created, &fetched));
        assert_eq!(fetched.lock().row_count(), 2);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_id() {
        let registry = GridRegistry::new();
        registry.create("a", grid()).unwrap();
        let err = registry.create("a", grid()).unwrap_err();
        assert!(matches!(err, Error::DuplicateGrid(id) if id == "a"));
    }

    #[test]
    fn test_destroy_disconnects() {
        let registry = GridRegistry::new();
        let shared = registry.create("a", grid()).unwrap();
        shared.lock().signals().data_changed.connect(|_| {});
        assert_eq!(shared.lock().signals().connection_count(), 1);

        assert!(registry.destroy("a"));
        assert!(!registry.destroy("a"));
        assert!(registry.is_empty());
        assert_eq!(shared.lock().signals().connection_count(), 0);
    }

    #[test]
    fn test_ids_sorted() {
        let registry = GridRegistry::new();
        registry.create("b", grid()).unwrap();
        registry.create("a", grid()).unwrap();
        assert_eq!(registry.ids(), ["a", "b"]);
    }

    #[test]
    fn test_grids_driven_from_threads() {
        let registry = Arc::new(GridRegistry::new());
        registry.create("left", grid()).unwrap();
        registry.create("right", grid()).unwrap();

        let handles: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|id| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let grid = registry.get(id).unwrap();
                    grid.lock().set_row_data([record! { "n" => 3 }]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.get("left").unwrap().lock().row_count(), 1);
        assert_eq!(registry.get("right").unwrap().lock().row_count(), 1);
    }
}
