// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/rows.rs
//!
//! The ordered row list shown by the sidebar
//!
//! One heading row per backend that currently has places, followed by one
//! row per place. The list is rebuilt wholesale after every change, but rows
//! whose `(category, collection)` key is unchanged keep their `RowId`, so a
//! view holding on to row handles (cursor, check boxes) is not disturbed.
//!
//! # Identity preservation
//!
//! While rebuilding, each row about to be written is compared with the next
//! existing row that has not been consumed yet. A matching key reuses that
//! row (display data refreshed); otherwise existing rows are discarded until
//! one matches or the list runs out, and a new row is appended. Rows left
//! over at the end are dropped.

use log::trace;
use serde::Serialize;
use std::collections::HashSet;
use std::rc::Rc;

use crate::core::selection::SelectionModel;
use crate::core::types::{Backend, BackendId, Place, PlaceId};

/// Stable handle of a row across rebuilds
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RowId(u64);

/// The collection a row stands for
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CollectionId {
    Backend(BackendId),
    Place(PlaceId),
}

/// Identity used to match rows across rebuilds
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RowKey {
    /// Name of the owning backend
    pub category: Option<String>,
    pub collection: CollectionId,
}

/// What a row refers to
#[derive(Clone, Debug)]
pub enum RowKind {
    /// Heading for a backend; never selectable, never checkable
    Backend(Rc<Backend>),
    /// A place listed under its backend
    Place {
        backend: Rc<Backend>,
        place: Rc<Place>,
    },
}

/// Check box state a view should render for a row
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Hidden,
    Unchecked,
    Checked,
}

/// One entry of the sidebar
#[derive(Clone, Debug)]
pub struct Row {
    id: RowId,
    kind: RowKind,
    category: Option<String>,
    label: String,
    tooltip: String,
    icon: Option<String>,
    editable: bool,
    uri: Option<String>,
}

impl Row {
    fn for_backend(id: RowId, backend: &Rc<Backend>) -> Self {
        Self {
            id,
            kind: RowKind::Backend(backend.clone()),
            category: backend.name().map(str::to_owned),
            label: backend.label(),
            tooltip: backend.description(),
            icon: None,
            editable: false,
            uri: None,
        }
    }

    fn for_place(id: RowId, backend: &Rc<Backend>, place: &Rc<Place>) -> Self {
        let info = place.info();
        Self {
            id,
            kind: RowKind::Place {
                backend: backend.clone(),
                place: place.clone(),
            },
            category: backend.name().map(str::to_owned),
            label: info.label,
            tooltip: info.description,
            icon: info.icon,
            editable: info.editable,
            uri: Some(info.uri),
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn kind(&self) -> &RowKind {
        &self.kind
    }

    pub fn key(&self) -> RowKey {
        let collection = match &self.kind {
            RowKind::Backend(backend) => CollectionId::Backend(backend.id()),
            RowKind::Place { place, .. } => CollectionId::Place(place.id()),
        };
        RowKey {
            category: self.category.clone(),
            collection,
        }
    }

    pub fn is_backend(&self) -> bool {
        matches!(self.kind, RowKind::Backend(_))
    }

    /// Only place rows can hold the selection
    pub fn is_selectable(&self) -> bool {
        !self.is_backend()
    }

    pub fn backend(&self) -> &Rc<Backend> {
        match &self.kind {
            RowKind::Backend(backend) => backend,
            RowKind::Place { backend, .. } => backend,
        }
    }

    pub fn place(&self) -> Option<&Rc<Place>> {
        match &self.kind {
            RowKind::Backend(_) => None,
            RowKind::Place { place, .. } => Some(place),
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Check box state for this row
    ///
    /// In checked mode every place row shows its box. In single-selection
    /// mode only the selected row shows an (unticked) box, and only while
    /// the view has keyboard focus.
    pub fn check_state(&self, selection: &SelectionModel, view_has_focus: bool) -> CheckState {
        let Some(place) = self.place() else {
            return CheckState::Hidden;
        };

        if selection.checked_count() > 0 {
            if selection.is_checked(place) {
                CheckState::Checked
            } else {
                CheckState::Unchecked
            }
        } else if view_has_focus && selection.is_selected(place) {
            CheckState::Unchecked
        } else {
            CheckState::Hidden
        }
    }
}

/// Counters describing what a rebuild did
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RebuildSummary {
    pub reused: usize,
    pub created: usize,
    pub dropped: usize,
}

/// Row widgets a view must touch to catch up with a rebuild
///
/// Rows that survive a rebuild keep their relative order, so a view applies
/// `removed` first and then `inserted` in ascending index order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowChanges {
    /// Shown rows that no longer exist
    pub removed: Vec<RowId>,
    /// New rows and the index each one goes to
    pub inserted: Vec<(usize, RowId)>,
    /// Shown rows still present; their display data may have changed
    pub kept: Vec<RowId>,
}

impl RowChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty()
    }
}

/// Ordered row sequence addressed by index
#[derive(Debug, Default)]
pub struct RowList {
    rows: Vec<Row>,
    next_id: u64,
}

impl RowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Index of the row with the given key
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.rows.iter().position(|row| &row.key() == key)
    }

    /// Index of the row showing a place
    pub fn position_of_place(&self, place: &Place) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.place().is_some_and(|p| p.id() == place.id()))
    }

    /// Index of the row with the given id
    pub fn position_of_id(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// Compares the ids a view currently shows with the rows
    pub fn changes_since(&self, shown: &[RowId]) -> RowChanges {
        let current: HashSet<RowId> = self.rows.iter().map(|row| row.id).collect();
        let previous: HashSet<RowId> = shown.iter().copied().collect();

        let removed = shown
            .iter()
            .copied()
            .filter(|id| !current.contains(id))
            .collect();

        let mut inserted = Vec::new();
        let mut kept = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            if previous.contains(&row.id) {
                kept.push(row.id);
            } else {
                inserted.push((index, row.id));
            }
        }

        RowChanges {
            removed,
            inserted,
            kept,
        }
    }

    /// Replaces the rows with the current backends and places
    ///
    /// `backends` must already be in display order.
    pub fn rebuild(&mut self, backends: &[Rc<Backend>]) -> RebuildSummary {
        let mut summary = RebuildSummary::default();
        let mut cursor = 0;

        for backend in backends {
            let places = backend.places();
            if places.is_empty() {
                continue;
            }

            let category = backend.name().map(str::to_owned);
            let key = RowKey {
                category: category.clone(),
                collection: CollectionId::Backend(backend.id()),
            };
            self.write_row(&mut cursor, &key, &mut summary, |id| {
                Row::for_backend(id, backend)
            });

            for place in &places {
                let key = RowKey {
                    category: category.clone(),
                    collection: CollectionId::Place(place.id()),
                };
                self.write_row(&mut cursor, &key, &mut summary, |id| {
                    Row::for_place(id, backend, place)
                });
            }
        }

        summary.dropped += self.rows.len().saturating_sub(cursor);
        self.rows.truncate(cursor);
        summary
    }

    fn write_row(
        &mut self,
        cursor: &mut usize,
        key: &RowKey,
        summary: &mut RebuildSummary,
        build: impl FnOnce(RowId) -> Row,
    ) {
        while *cursor < self.rows.len() {
            if &self.rows[*cursor].key() == key {
                let id = self.rows[*cursor].id;
                trace!("Reusing row {:?} at {}", id, *cursor);
                self.rows[*cursor] = build(id);
                summary.reused += 1;
                *cursor += 1;
                return;
            }

            let discarded = self.rows.remove(*cursor);
            trace!("Discarding row {:?} ({})", discarded.id, discarded.label);
            summary.dropped += 1;
        }

        let id = self.allocate_id();
        trace!("Appending row {:?}", id);
        self.rows.push(build(id));
        summary.created += 1;
        *cursor += 1;
    }

    fn allocate_id(&mut self) -> RowId {
        self.next_id += 1;
        RowId(self.next_id)
    }
}
