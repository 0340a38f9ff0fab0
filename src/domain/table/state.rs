use std::collections::BTreeSet;

use crate::domain::entities::record::{Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The single active sort column, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

/// Header-click cycling: a fresh column starts ascending and clears the
/// previous sort; the same column goes asc -> desc -> unsorted.
pub fn next_sort(current: Option<&SortState>, clicked_column: &str) -> Option<SortState> {
    match current {
        Some(sort) if sort.column == clicked_column => match sort.direction {
            SortDirection::Asc => Some(SortState {
                column: clicked_column.to_string(),
                direction: SortDirection::Desc,
            }),
            SortDirection::Desc => None,
        },
        _ => Some(SortState {
            column: clicked_column.to_string(),
            direction: SortDirection::Asc,
        }),
    }
}

/// The four mutually exclusive display states of a data view, resolved in
/// priority order: loading beats error beats empty beats data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Error,
    Empty,
    Data,
}

pub fn resolve_display_state(loading: bool, error: Option<&str>, row_count: usize) -> DisplayState {
    if loading {
        DisplayState::Loading
    } else if error.is_some() {
        DisplayState::Error
    } else if row_count == 0 {
        DisplayState::Empty
    } else {
        DisplayState::Data
    }
}

/// Row selection by record id. Select-all only ever touches the rows visible
/// on the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<RecordId>,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState::default()
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle(&mut self, id: &RecordId) {
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    /// If every given row is selected, deselects them all; otherwise selects
    /// them all. Rows outside the page are untouched.
    pub fn toggle_page(&mut self, page_ids: &[RecordId]) {
        let all_selected =
            !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            for id in page_ids {
                self.selected.remove(id);
            }
        } else {
            for id in page_ids {
                self.selected.insert(id.clone());
            }
        }
    }

    pub fn all_selected(&self, page_ids: &[RecordId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.selected.iter().cloned().collect()
    }

    /// The full selected record objects, not just their ids.
    pub fn selected_records(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| self.selected.contains(&record.id))
            .cloned()
            .collect()
    }
}
