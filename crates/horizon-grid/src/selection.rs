//! Selection and highlight state.
//!
//! Selection is stored by [`RowKey`], a stable identity of a displayed row,
//! and translated to display indices after every pipeline run. A sort,
//! filter, regroup or page change therefore moves the selection with the
//! rows instead of leaving it on whatever now sits at the old position.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::options::SelectionType;
use crate::row::{DisplayRow, RowKind};

/// Caller-supplied stable row identity.
pub type RowIdFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Caller-supplied selectability predicate: `(row, display_index)`.
pub type RowSelectableFn<R> = Arc<dyn Fn(&R, usize) -> bool + Send + Sync>;

/// Stable identity of a displayed row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    /// Data row identified by the caller's row id.
    Id(String),
    /// Data row identified by its raw data position. Used when no row id
    /// function is configured; reset whenever the row data is replaced.
    Source(usize),
    /// Group header identified by its path of group values.
    Group(Vec<String>),
}

impl RowKey {
    /// Computes the key of a display row.
    pub fn of<R>(row: &DisplayRow<R>, row_id: Option<&RowIdFn<R>>) -> Self {
        match (&row.kind, row_id) {
            (RowKind::Group(node), _) => Self::Group(node.path.clone()),
            (RowKind::Data { item, .. }, Some(row_id)) => Self::Id(row_id(item)),
            (RowKind::Data { source_index, .. }, None) => Self::Source(*source_index),
        }
    }
}

/// Tracks selected and highlighted rows.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    mode: SelectionType,
    selected_keys: HashSet<RowKey>,
    /// Selection order, parallel to `selected_keys`.
    selected_order: Vec<RowKey>,
    highlighted: Option<RowKey>,
    last_selected_index: Option<usize>,
}

impl SelectionModel {
    /// Creates an empty selection.
    pub fn new(mode: SelectionType) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Selection mode.
    pub fn mode(&self) -> SelectionType {
        self.mode
    }

    /// Changes the mode. Switching to single mode keeps only the most
    /// recent selection.
    pub fn set_mode(&mut self, mode: SelectionType) {
        self.mode = mode;
        if mode == SelectionType::Single && self.selected_order.len() > 1 {
            let keep = self.selected_order.pop();
            self.clear_selection();
            if let Some(keep) = keep {
                self.add(keep);
            }
        }
    }

    /// Returns `true` if `key` is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected_keys.contains(key)
    }

    /// Returns `true` if anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected_order.is_empty()
    }

    /// Number of selected keys, including ones not currently displayed.
    pub fn selected_count(&self) -> usize {
        self.selected_order.len()
    }

    /// Selected keys in selection order.
    pub fn selected_keys(&self) -> &[RowKey] {
        &self.selected_order
    }

    /// Display index of the most recent `select` call.
    pub fn last_selected_index(&self) -> Option<usize> {
        self.last_selected_index
    }

    pub(crate) fn set_last_selected_index(&mut self, index: Option<usize>) {
        self.last_selected_index = index;
    }

    /// Selects or deselects `key`. Returns `true` if the selection changed.
    ///
    /// In single mode every other key is cleared first.
    pub fn select(&mut self, key: RowKey, selected: bool) -> bool {
        let mut changed = false;
        if self.mode == SelectionType::Single {
            let only_this = self.selected_order.len() == 1 && self.selected_keys.contains(&key);
            if !(selected && only_this) {
                changed |= self.clear_selection();
            }
            if selected {
                changed |= self.add(key);
            }
        } else if selected {
            changed = self.add(key);
        } else {
            changed = self.remove(&key);
        }
        changed
    }

    /// Adds every key. No-op in single mode. Returns `true` if the
    /// selection changed.
    pub fn select_keys(&mut self, keys: impl IntoIterator<Item = RowKey>) -> bool {
        if self.mode == SelectionType::Single {
            return false;
        }
        keys.into_iter().fold(false, |changed, key| self.add(key) | changed)
    }

    /// Deselects everything. Returns `true` if anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        if self.selected_order.is_empty() {
            return false;
        }
        self.selected_order.clear();
        self.selected_keys.clear();
        true
    }

    /// Keeps only the selected keys for which `keep` returns `true`.
    /// Also applies to the highlighted key.
    pub fn retain(&mut self, mut keep: impl FnMut(&RowKey) -> bool) -> bool {
        let before = self.selected_order.len();
        self.selected_order.retain(|key| keep(key));
        self.selected_keys.retain(|key| keep(key));
        if self.highlighted.as_ref().is_some_and(|key| !keep(key)) {
            self.highlighted = None;
        }
        before != self.selected_order.len()
    }

    /// Replaces every occurrence of `from` with `to`, keeping its position.
    pub fn rename(&mut self, from: &RowKey, to: RowKey) {
        if from == &to {
            return;
        }
        if self.selected_keys.remove(from) {
            if self.selected_keys.insert(to.clone()) {
                if let Some(slot) = self.selected_order.iter_mut().find(|key| *key == from) {
                    *slot = to.clone();
                }
            } else {
                self.selected_order.retain(|key| key != from);
            }
        }
        if self.highlighted.as_ref() == Some(from) {
            self.highlighted = Some(to);
        }
    }

    /// The highlighted key.
    pub fn highlighted(&self) -> Option<&RowKey> {
        self.highlighted.as_ref()
    }

    /// Sets or clears the highlighted key. Returns `true` if it changed.
    pub fn set_highlighted(&mut self, key: Option<RowKey>) -> bool {
        if self.highlighted == key {
            return false;
        }
        self.highlighted = key;
        true
    }

    /// Writes `selected` and `highlighted` onto freshly built display rows.
    ///
    /// `keys` holds the key of every row, parallel to `rows`. A selected key
    /// that resolves to more than one displayed row means row identity was
    /// lost; that is a caller defect (non-unique row ids) and is asserted in
    /// debug builds.
    pub fn apply<R>(&self, rows: &mut [DisplayRow<R>], keys: &[RowKey]) {
        debug_assert_eq!(rows.len(), keys.len());

        let mut seen: HashMap<&RowKey, usize> = HashMap::new();
        for (row, key) in rows.iter_mut().zip(keys) {
            row.selected = self.selected_keys.contains(key);
            row.highlighted = self.highlighted.as_ref() == Some(key);
            if row.selected {
                if let Some(first) = seen.insert(key, row.index) {
                    tracing::error!(
                        target: targets::SELECTION,
                        ?key,
                        first,
                        second = row.index,
                        "selected row key matches more than one displayed row"
                    );
                    debug_assert!(
                        false,
                        "selected row key {key:?} matches display rows {first} and {}",
                        row.index
                    );
                }
            }
        }
    }

    fn add(&mut self, key: RowKey) -> bool {
        if self.selected_keys.insert(key.clone()) {
            self.selected_order.push(key);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, key: &RowKey) -> bool {
        if self.selected_keys.remove(key) {
            self.selected_order.retain(|existing| existing != key);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::record;

    fn data_row(index: usize, source_index: usize) -> DisplayRow<Record> {
        DisplayRow::new(
            index,
            RowKind::Data {
                source_index,
                item: Arc::new(record! { "id" => format!("r{source_index}") }),
            },
        )
    }

    #[test]
    fn test_multiple_mode() {
        let mut selection = SelectionModel::new(SelectionType::Multiple);
        assert!(selection.select(RowKey::Source(1), true));
        assert!(selection.select(RowKey::Source(3), true));
        assert!(!selection.select(RowKey::Source(3), true));
        assert_eq!(selection.selected_keys(), &[RowKey::Source(1), RowKey::Source(3)]);

        assert!(selection.select(RowKey::Source(1), false));
        assert!(!selection.select(RowKey::Source(1), false));
        assert_eq!(selection.selected_count(), 1);
    }

    #[test]
    fn test_single_mode_keeps_one() {
        let mut selection = SelectionModel::new(SelectionType::Single);
        selection.select(RowKey::Source(1), true);
        selection.select(RowKey::Source(2), true);
        assert_eq!(selection.selected_keys(), &[RowKey::Source(2)]);
        assert!(!selection.select(RowKey::Source(2), true));

        assert!(!selection.select_keys([RowKey::Source(5), RowKey::Source(6)]));
        assert_eq!(selection.selected_count(), 1);

        assert!(selection.select(RowKey::Source(9), false));
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_switch_to_single_keeps_latest() {
        let mut selection = SelectionModel::new(SelectionType::Multiple);
        selection.select_keys([RowKey::Source(1), RowKey::Source(2), RowKey::Source(3)]);
        selection.set_mode(SelectionType::Single);
        assert_eq!(selection.selected_keys(), &[RowKey::Source(3)]);
    }

    #[test]
    fn test_retain_and_rename() {
        let mut selection = SelectionModel::new(SelectionType::Multiple);
        selection.select_keys([RowKey::Id("a".into()), RowKey::Source(0), RowKey::Id("b".into())]);
        selection.set_highlighted(Some(RowKey::Source(0)));

        assert!(selection.retain(|key| matches!(key, RowKey::Id(_))));
        assert_eq!(selection.selected_count(), 2);
        assert!(selection.highlighted().is_none());

        selection.rename(&RowKey::Id("a".into()), RowKey::Id("z".into()));
        assert_eq!(
            selection.selected_keys(),
            &[RowKey::Id("z".into()), RowKey::Id("b".into())]
        );
        assert!(!selection.is_selected(&RowKey::Id("a".into())));

        // renaming onto an already selected key merges the two
        selection.rename(&RowKey::Id("z".into()), RowKey::Id("b".into()));
        assert_eq!(selection.selected_keys(), &[RowKey::Id("b".into())]);
    }

    #[test]
    fn test_apply_marks_rows() {
        let mut selection = SelectionModel::new(SelectionType::Multiple);
        selection.select(RowKey::Source(7), true);
        selection.set_highlighted(Some(RowKey::Source(2)));

        let mut rows = vec![data_row(0, 2), data_row(1, 7), data_row(2, 4)];
        let keys: Vec<RowKey> = rows.iter().map(|row| RowKey::of(row, None)).collect();
        selection.apply(&mut rows, &keys);

        assert_eq!(
            rows.iter().map(|row| row.selected).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert!(rows[0].highlighted);
        assert!(!rows[1].highlighted);
    }

    #[test]
    fn test_key_uses_row_id_when_configured() {
        let row = data_row(0, 4);
        let row_id: RowIdFn<Record> = Arc::new(|row: &Record| {
            row.get("id").map(ToString::to_string).unwrap_or_default()
        });
        assert_eq!(RowKey::of(&row, Some(&row_id)), RowKey::Id("r4".into()));
        assert_eq!(RowKey::of(&row, None), RowKey::Source(4));
    }

    #[test]
    #[should_panic(expected = "matches display rows")]
    #[cfg(debug_assertions)]
    fn test_duplicate_selected_key_asserts() {
        let mut selection = SelectionModel::new(SelectionType::Multiple);
        selection.select(RowKey::Id("dup".into()), true);
        let mut rows = vec![data_row(0, 0), data_row(1, 1)];
        let keys = vec![RowKey::Id("dup".into()), RowKey::Id("dup".into())];
        selection.apply(&mut rows, &keys);
    }
}
