//! The comparison page's selection set: at most three vehicles, each with
//! its lifecycle result once the backend has answered.
//!
//! Adding is optimistic. [`Selection::toggle`] records the key as pending
//! right away; the caller then either [`attach`](Selection::attach)es the
//! fetched result or [`rollback`](Selection::rollback)s the add.
//! [`Selection::toggle_with`] runs the whole sequence with a fetch closure.

use serde::Serialize;

use crate::api::{ApiError, LifecycleResult, VehicleKey};

/// Maximum number of vehicles compared side by side.
pub const MAX_SELECTED: usize = 3;

/// One selected vehicle. `lifecycle` is `None` while the fetch is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedVehicle {
    pub key: VehicleKey,
    pub lifecycle: Option<LifecycleResult>,
}

impl SelectedVehicle {
    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_none()
    }
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The key was already selected and has been removed.
    Removed,
    /// The set is full; nothing changed.
    Ignored,
    /// The key was added and is waiting for its lifecycle result.
    Pending,
    /// The key was added and its lifecycle result attached.
    Added,
}

/// Ordered selection set. Invariant: `len() <= MAX_SELECTED`, keys distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    entries: Vec<SelectedVehicle>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectedVehicle] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_SELECTED
    }

    pub fn contains(&self, key: &VehicleKey) -> bool {
        self.position(key).is_some()
    }

    fn position(&self, key: &VehicleKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    /// Toggle semantics: remove if selected, ignore if full, otherwise add
    /// as pending.
    pub fn toggle(&mut self, key: VehicleKey) -> ToggleOutcome {
        if let Some(idx) = self.position(&key) {
            self.entries.remove(idx);
            return ToggleOutcome::Removed;
        }
        if self.is_full() {
            return ToggleOutcome::Ignored;
        }
        self.entries.push(SelectedVehicle {
            key,
            lifecycle: None,
        });
        ToggleOutcome::Pending
    }

    /// Attach a fetched result. Only applies while `key` is still pending,
    /// so a response that arrives after the user deselected the vehicle is
    /// dropped. Returns whether the result was applied.
    pub fn attach(&mut self, key: &VehicleKey, lifecycle: LifecycleResult) -> bool {
        match self.entries.iter_mut().find(|e| &e.key == key) {
            Some(entry) if entry.is_pending() => {
                entry.lifecycle = Some(lifecycle);
                true
            }
            _ => false,
        }
    }

    /// Undo an optimistic add after its fetch failed. Returns whether a
    /// pending entry was removed.
    pub fn rollback(&mut self, key: &VehicleKey) -> bool {
        match self.position(key) {
            Some(idx) if self.entries[idx].is_pending() => {
                self.entries.remove(idx);
                true
            }
            _ => false,
        }
    }

    /// Toggle and, when that adds, fetch the lifecycle through `fetch`.
    /// A failed fetch rolls the add back and returns the error.
    pub fn toggle_with<F>(&mut self, key: VehicleKey, fetch: F) -> Result<ToggleOutcome, ApiError>
    where
        F: FnOnce(&VehicleKey) -> Result<LifecycleResult, ApiError>,
    {
        match self.toggle(key.clone()) {
            ToggleOutcome::Pending => match fetch(&key) {
                Ok(lifecycle) => {
                    self.attach(&key, lifecycle);
                    Ok(ToggleOutcome::Added)
                }
                Err(e) => {
                    self.rollback(&key);
                    Err(e)
                }
            },
            other => Ok(other),
        }
    }

    pub fn remove_index(&mut self, idx: usize) -> Option<SelectedVehicle> {
        (idx < self.entries.len()).then(|| self.entries.remove(idx))
    }

    pub fn remove_key(&mut self, key: &VehicleKey) -> Option<SelectedVehicle> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i32) -> VehicleKey {
        VehicleKey::new("Brand", format!("Model {n}"), 2020 + n)
    }

    fn lc(total: f64) -> LifecycleResult {
        LifecycleResult::new(total, total / 3.0, total * 2.0 / 3.0)
    }

    #[test]
    fn size_never_exceeds_three() {
        let mut sel = Selection::new();
        for n in 0..6 {
            sel.toggle(key(n));
            assert!(sel.len() <= MAX_SELECTED);
        }
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.toggle(key(9)), ToggleOutcome::Ignored);
        assert!(!sel.contains(&key(9)));
    }

    #[test]
    fn double_toggle_restores_prior_set() {
        let mut sel = Selection::new();
        sel.toggle_with(key(1), |_| Ok(lc(100.0))).unwrap();
        sel.toggle_with(key(2), |_| Ok(lc(150.0))).unwrap();
        let before = sel.clone();

        assert_eq!(sel.toggle(key(3)), ToggleOutcome::Pending);
        assert_eq!(sel.toggle(key(3)), ToggleOutcome::Removed);
        assert_eq!(sel, before);
    }

    #[test]
    fn toggling_selected_vehicle_removes_it() {
        let mut sel = Selection::new();
        sel.toggle_with(key(1), |_| Ok(lc(100.0))).unwrap();
        let out = sel.toggle_with(key(1), |_| panic!("must not fetch")).unwrap();
        assert_eq!(out, ToggleOutcome::Removed);
        assert!(sel.is_empty());
    }

    #[test]
    fn failed_fetch_rolls_back() {
        let mut sel = Selection::new();
        sel.toggle_with(key(1), |_| Ok(lc(100.0))).unwrap();
        let err = sel
            .toggle_with(key(2), |_| Err(ApiError::Backend("Vehicle not found".into())))
            .unwrap_err();
        assert!(matches!(err, ApiError::Backend(_)));
        assert_eq!(sel.len(), 1);
        assert!(!sel.contains(&key(2)));
    }

    #[test]
    fn successful_fetch_attaches_result() {
        let mut sel = Selection::new();
        let out = sel.toggle_with(key(1), |_| Ok(lc(120.0))).unwrap();
        assert_eq!(out, ToggleOutcome::Added);
        assert_eq!(
            sel.entries()[0].lifecycle.as_ref().map(|l| l.total_g_per_km),
            Some(120.0)
        );
    }

    #[test]
    fn stale_result_for_deselected_vehicle_is_dropped() {
        let mut sel = Selection::new();
        sel.toggle(key(1));
        sel.toggle(key(1));
        assert!(!sel.attach(&key(1), lc(90.0)));
        assert!(sel.is_empty());
    }

    #[test]
    fn rollback_leaves_confirmed_entries_alone() {
        let mut sel = Selection::new();
        sel.toggle_with(key(1), |_| Ok(lc(100.0))).unwrap();
        assert!(!sel.rollback(&key(1)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn remove_by_index_and_key() {
        let mut sel = Selection::new();
        for n in 0..3 {
            sel.toggle_with(key(n), |_| Ok(lc(100.0))).unwrap();
        }
        assert_eq!(sel.remove_index(1).map(|e| e.key), Some(key(1)));
        assert!(sel.remove_index(5).is_none());
        assert_eq!(sel.remove_key(&key(2)).map(|e| e.key), Some(key(2)));
        assert!(sel.remove_key(&key(2)).is_none());
        assert_eq!(sel.entries()[0].key, key(0));
    }
}
