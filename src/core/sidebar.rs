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

//! src/core/sidebar.rs
//!
//! The sidebar model: backends and places in, one union collection out
//!
//! `Sidebar` ties the pieces together:
//!
//! ```text
//! Registry ──backend added/removed──┐
//! Backend  ──place added/removed────┤
//! Place    ──property changed───────┼──> Sidebar ──> RowList (rebuilt on idle)
//! View     ──select/toggle/cursor───┘        └────> SelectionModel ──> UnionCollection
//! ```
//!
//! Every structural change only schedules a row rebuild; any number of
//! changes before the next idle turn collapse into one rebuild. After each
//! rebuild the chosen uris are reconciled again so that newly appeared
//! places pick up their persisted selection.
//!
//! Notifications are emitted after internal state is released, so
//! handlers may freely call back into the sidebar.

use log::{debug, trace, warn};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::core::collection::UnionCollection;
use crate::core::ordering::{places_in_order, sort_backends};
use crate::core::registry::Registry;
use crate::core::rows::{CheckState, Row, RowChanges, RowId, RowKey, RowList};
use crate::core::scheduler::IdleScheduler;
use crate::core::selection::{SelectionModel, SelectionUpdate};
use crate::core::signal::{HandlerId, Signal};
use crate::core::types::{Backend, BackendId, Place, PlaceId};

/// Handle on a sidebar model; clones share the same sidebar
#[derive(Clone)]
pub struct Sidebar {
    inner: Rc<Inner>,
}

struct Inner {
    registry: Rc<Registry>,
    scheduler: Rc<dyn IdleScheduler>,
    state: RefCell<State>,
    rebuild_pending: Cell<bool>,
    rebuild_count: Cell<usize>,
    subscriptions: RefCell<Subscriptions>,
    signals: Signals,
}

#[derive(Default)]
struct State {
    /// Sorted once at load time; later additions are appended
    backends: Vec<Rc<Backend>>,
    rows: RowList,
    selection: SelectionModel,
    /// Requested uris that matched no place yet
    pending_uris: BTreeSet<String>,
    cursor: Option<RowKey>,
}

impl State {
    fn places(&self) -> Vec<Rc<Place>> {
        places_in_order(&self.backends)
    }

    fn cursor_row(&self) -> Option<&Row> {
        let key = self.cursor.as_ref()?;
        let index = self.rows.position(key)?;
        self.rows.get(index)
    }
}

#[derive(Default)]
struct Subscriptions {
    registry: Vec<HandlerId>,
    backends: HashMap<BackendId, (Rc<Backend>, Vec<HandlerId>)>,
    places: HashMap<PlaceId, (Rc<Place>, HandlerId)>,
}

#[derive(Default)]
struct Signals {
    selection_changed: Signal<()>,
    combined_changed: Signal<bool>,
    collection_changed: Signal<()>,
    rows_changed: Signal<()>,
    context_menu: Signal<Option<Rc<Place>>>,
}

/// Row type tag used in snapshots
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    Backend,
    Place,
}

/// Serialisable view of one row
#[derive(Clone, Debug, Serialize)]
pub struct RowSnapshot {
    #[serde(rename = "type")]
    pub row_type: RowType,
    pub category: Option<String>,
    pub label: String,
    pub tooltip: String,
    pub icon: Option<String>,
    pub uri: Option<String>,
    pub editable: bool,
    pub check: CheckState,
    pub selected: bool,
    pub in_collection: bool,
}

/// Serialisable view of the whole sidebar
#[derive(Clone, Debug, Serialize)]
pub struct SidebarSnapshot {
    pub rows: Vec<RowSnapshot>,
    pub cursor: Option<usize>,
    pub combined: bool,
    pub selected_uris: Vec<String>,
    pub collection: Vec<String>,
}

impl Sidebar {
    /// Creates a sidebar over every backend of `registry`
    ///
    /// Backends are sorted by rank once, here. Rows are not built yet: the
    /// first rebuild is scheduled on `scheduler` and runs on its next idle
    /// turn.
    ///
    /// # Example
    ///
    /// ```
    /// use keyring_sidebar::core::{Backend, ManualScheduler, Place, PlaceInfo, Registry, Sidebar};
    /// use std::rc::Rc;
    ///
    /// let registry = Rc::new(Registry::new());
    /// let backend = Backend::new(Some("openssh"), "Secure Shell", "SSH keys");
    /// backend.add_place(Place::new(PlaceInfo::new("file:///home/me/.ssh", "OpenSSH keys")));
    /// registry.add_backend(backend);
    ///
    /// let scheduler = Rc::new(ManualScheduler::new());
    /// let sidebar = Sidebar::new(registry, scheduler.clone());
    /// scheduler.run_pending();
    ///
    /// sidebar.set_selected_uris(["file:///home/me/.ssh"]);
    /// assert_eq!(sidebar.collection().len(), 1);
    /// ```
    pub fn new(registry: Rc<Registry>, scheduler: Rc<dyn IdleScheduler>) -> Self {
        let inner = Rc::new(Inner {
            registry,
            scheduler,
            state: RefCell::new(State::default()),
            rebuild_pending: Cell::new(false),
            rebuild_count: Cell::new(0),
            subscriptions: RefCell::new(Subscriptions::default()),
            signals: Signals::default(),
        });
        inner.load_backends();
        Self { inner }
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.inner.registry
    }

    // ------------------------------------------------------------------
    // Host application API
    // ------------------------------------------------------------------

    /// Live, read-only view of the active places
    pub fn collection(&self) -> UnionCollection {
        self.inner.state.borrow().selection.collection().clone()
    }

    pub fn combined(&self) -> bool {
        self.inner.state.borrow().selection.combined()
    }

    /// Shows every place in the collection, ignoring the selection
    ///
    /// Does not touch the selected uris.
    pub fn set_combined(&self, combined: bool) {
        let (changed, update) = {
            let mut state = self.inner.state.borrow_mut();
            let changed = state.selection.combined() != combined;
            let places = state.places();
            (changed, state.selection.set_combined(combined, &places))
        };

        if changed {
            self.inner.signals.combined_changed.emit(&combined);
        }
        self.inner.emit_update(update);
    }

    /// Uris of the active places, for persisting
    pub fn selected_uris(&self) -> BTreeSet<String> {
        self.inner.state.borrow().selection.chosen().clone()
    }

    /// Restores a persisted selection
    ///
    /// Uris that match no current place are remembered and applied when a
    /// matching place shows up; they are not reported by `selected_uris`.
    pub fn set_selected_uris<I, S>(&self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let uris: BTreeSet<String> = uris.into_iter().map(Into::into).collect();

        let update = {
            let mut state = self.inner.state.borrow_mut();
            let places = state.places();
            let update = state.selection.apply_chosen_uris(&uris, &places);

            let known: HashSet<String> = places.iter().map(|place| place.uri()).collect();
            state.pending_uris = uris.into_iter().filter(|uri| !known.contains(uri)).collect();
            if !state.pending_uris.is_empty() {
                debug!("Waiting for places: {:?}", state.pending_uris);
            }
            update
        };

        self.inner.emit_update(update);
    }

    /// Members of the collection, with the place under the cursor first
    pub fn selected_places(&self) -> Vec<Rc<Place>> {
        let state = self.inner.state.borrow();
        let mut places = state.selection.collection().elements();

        if let Some(focused) = state.cursor_row().and_then(Row::place) {
            places.retain(|place| place.id() != focused.id());
            places.insert(0, focused.clone());
        }
        places
    }

    /// All backends, with the backend under the cursor first
    pub fn backends(&self) -> Vec<Rc<Backend>> {
        let state = self.inner.state.borrow();
        let mut backends = state.backends.clone();

        if let Some(row) = state.cursor_row().filter(|row| row.is_backend()) {
            let focused = row.backend().clone();
            backends.retain(|backend| backend.id() != focused.id());
            backends.insert(0, focused);
        }
        backends
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    pub fn rows(&self) -> Vec<Row> {
        self.inner.state.borrow().rows.rows().to_vec()
    }

    pub fn row(&self, index: usize) -> Option<Row> {
        self.inner.state.borrow().rows.get(index).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.inner.state.borrow().rows.len()
    }

    /// Current index of a row, if it survived the last rebuild
    pub fn row_position(&self, id: RowId) -> Option<usize> {
        self.inner.state.borrow().rows.position_of_id(id)
    }

    /// Rows a view showing `shown` has to remove or insert
    pub fn row_changes_since(&self, shown: &[RowId]) -> RowChanges {
        self.inner.state.borrow().rows.changes_since(shown)
    }

    /// Check box state the view should show for a row
    pub fn check_state(&self, index: usize, view_has_focus: bool) -> CheckState {
        let state = self.inner.state.borrow();
        state
            .rows
            .get(index)
            .map(|row| row.check_state(&state.selection, view_has_focus))
            .unwrap_or(CheckState::Hidden)
    }

    pub fn is_rebuild_pending(&self) -> bool {
        self.inner.rebuild_pending.get()
    }

    /// Number of row rebuilds run so far
    pub fn rebuild_count(&self) -> usize {
        self.inner.rebuild_count.get()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_place(&self) -> Option<Rc<Place>> {
        self.inner.state.borrow().selection.selected().cloned()
    }

    pub fn is_checked(&self, place: &Place) -> bool {
        self.inner.state.borrow().selection.is_checked(place)
    }

    /// Checked places in row order
    pub fn checked_places(&self) -> Vec<Rc<Place>> {
        let state = self.inner.state.borrow();
        state
            .places()
            .into_iter()
            .filter(|place| state.selection.is_checked(place))
            .collect()
    }

    pub fn select_place(&self, place: Option<&Rc<Place>>) {
        self.inner
            .mutate(|selection, places| selection.select(place, places));
    }

    /// Selects the place shown in a row and moves the cursor there
    ///
    /// Backend headings cannot be selected; `None` clears the selection.
    pub fn select_row(&self, index: Option<usize>) {
        let Some(index) = index else {
            self.select_place(None);
            return;
        };

        let Some(row) = self.row(index) else {
            debug_assert!(false, "select_row({index}) outside the row list");
            warn!("Ignoring selection of missing row {}", index);
            return;
        };

        match row.place() {
            Some(place) => {
                self.inner.state.borrow_mut().cursor = Some(row.key());
                self.select_place(Some(place));
            }
            None => trace!("Backend heading {} is not selectable", row.label()),
        }
    }

    /// Ticks a place; it must not be ticked already
    pub fn check_place(&self, place: &Rc<Place>) {
        self.inner
            .mutate(|selection, places| selection.check(place, places));
    }

    /// Unticks a place; it must currently be ticked
    pub fn uncheck_place(&self, place: &Rc<Place>) {
        self.inner
            .mutate(|selection, places| selection.uncheck(place, places));
    }

    /// Flips the check box of a place
    pub fn toggle_place(&self, place: &Rc<Place>) {
        if self.is_checked(place) {
            self.uncheck_place(place);
        } else {
            self.check_place(place);
        }
    }

    /// Flips the check box of a row; headings have none
    pub fn toggle_row(&self, index: usize) {
        match self.row(index) {
            Some(row) => {
                if let Some(place) = row.place() {
                    self.toggle_place(place);
                }
            }
            None => {
                debug_assert!(false, "toggle_row({index}) outside the row list");
                warn!("Ignoring toggle of missing row {}", index);
            }
        }
    }

    // ------------------------------------------------------------------
    // Cursor and context menu
    // ------------------------------------------------------------------

    /// Index of the row under the cursor
    pub fn cursor(&self) -> Option<usize> {
        let state = self.inner.state.borrow();
        state.cursor.as_ref().and_then(|key| state.rows.position(key))
    }

    /// Moves the cursor; it follows its row across rebuilds
    pub fn set_cursor(&self, index: Option<usize>) {
        let mut state = self.inner.state.borrow_mut();
        match index {
            None => state.cursor = None,
            Some(index) => match state.rows.get(index).map(Row::key) {
                Some(key) => state.cursor = Some(key),
                None => {
                    debug_assert!(false, "set_cursor({index}) outside the row list");
                    warn!("Ignoring cursor on missing row {}", index);
                }
            },
        }
    }

    /// Asks for a context menu on the cursor row
    ///
    /// Handlers receive the place, or `None` on a backend heading. Nothing
    /// is emitted when there is no cursor.
    pub fn request_context_menu(&self) {
        let target = {
            let state = self.inner.state.borrow();
            match state.cursor_row() {
                Some(row) => row.place().cloned(),
                None => return,
            }
        };
        self.inner.signals.context_menu.emit(&target);
    }

    /// Moves the cursor to a row and asks for its context menu
    pub fn request_context_menu_at(&self, index: usize) {
        if index >= self.row_count() {
            return;
        }
        self.set_cursor(Some(index));
        self.request_context_menu();
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// The selected uris changed
    pub fn connect_selection_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + 'static,
    {
        self.inner.signals.selection_changed.connect(move |_| handler())
    }

    pub fn connect_combined_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(bool) + 'static,
    {
        self.inner
            .signals
            .combined_changed
            .connect(move |combined| handler(*combined))
    }

    /// The union collection gained or lost members
    pub fn connect_collection_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + 'static,
    {
        self.inner.signals.collection_changed.connect(move |_| handler())
    }

    /// The row list was rebuilt
    pub fn connect_rows_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + 'static,
    {
        self.inner.signals.rows_changed.connect(move |_| handler())
    }

    pub fn connect_context_menu<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(Option<&Rc<Place>>) + 'static,
    {
        self.inner
            .signals
            .context_menu
            .connect(move |target| handler(target.as_ref()))
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let signals = &self.inner.signals;
        signals.selection_changed.disconnect(id)
            || signals.combined_changed.disconnect(id)
            || signals.collection_changed.disconnect(id)
            || signals.rows_changed.disconnect(id)
            || signals.context_menu.disconnect(id)
    }

    /// Stops following the registry, its backends and their places
    pub fn dispose(&self) {
        self.inner.disconnect_all();
    }

    /// Serialisable picture of the current state
    pub fn snapshot(&self, view_has_focus: bool) -> SidebarSnapshot {
        let state = self.inner.state.borrow();
        let selection = &state.selection;
        let collection = selection.collection();

        let rows = state
            .rows
            .iter()
            .map(|row| RowSnapshot {
                row_type: if row.is_backend() {
                    RowType::Backend
                } else {
                    RowType::Place
                },
                category: row.category().map(str::to_owned),
                label: row.label().to_owned(),
                tooltip: row.tooltip().to_owned(),
                icon: row.icon().map(str::to_owned),
                uri: row.uri().map(str::to_owned),
                editable: row.editable(),
                check: row.check_state(selection, view_has_focus),
                selected: row.place().is_some_and(|place| selection.is_selected(place)),
                in_collection: row.place().is_some_and(|place| collection.contains(place)),
            })
            .collect();

        SidebarSnapshot {
            rows,
            cursor: state.cursor.as_ref().and_then(|key| state.rows.position(key)),
            combined: selection.combined(),
            selected_uris: selection.chosen().iter().cloned().collect(),
            collection: collection.uris().into_iter().collect(),
        }
    }
}

impl fmt::Debug for Sidebar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Sidebar")
            .field("backends", &state.backends.len())
            .field("rows", &state.rows.len())
            .field("selection", &state.selection)
            .field("rebuild_pending", &self.inner.rebuild_pending.get())
            .finish()
    }
}

impl Inner {
    fn load_backends(self: &Rc<Self>) {
        let mut backends = self.registry.backends();
        sort_backends(&mut backends);
        debug!("Loading {} backends", backends.len());

        self.state.borrow_mut().backends = backends.clone();
        for backend in &backends {
            self.watch_backend(backend);
        }

        let weak = Rc::downgrade(self);
        let added = self.registry.connect_backend_added(move |backend| {
            if let Some(inner) = weak.upgrade() {
                inner.on_backend_added(backend);
            }
        });

        let weak = Rc::downgrade(self);
        let removed = self.registry.connect_backend_removed(move |backend| {
            if let Some(inner) = weak.upgrade() {
                inner.on_backend_removed(backend);
            }
        });

        self.subscriptions.borrow_mut().registry = vec![added, removed];
    }

    fn watch_backend(self: &Rc<Self>, backend: &Rc<Backend>) {
        let weak = Rc::downgrade(self);
        let added = backend.connect_place_added(move |place| {
            if let Some(inner) = weak.upgrade() {
                inner.on_place_added(place);
            }
        });

        let weak = Rc::downgrade(self);
        let removed = backend.connect_place_removed(move |place| {
            if let Some(inner) = weak.upgrade() {
                inner.on_place_removed(place);
            }
        });

        let weak = Rc::downgrade(self);
        let changed = backend.connect_changed(move || {
            if let Some(inner) = weak.upgrade() {
                inner.schedule_rebuild();
            }
        });

        self.subscriptions
            .borrow_mut()
            .backends
            .insert(backend.id(), (backend.clone(), vec![added, removed, changed]));

        for place in backend.places() {
            self.on_place_added(&place);
        }
    }

    fn unwatch_backend(&self, backend: &Backend) {
        let mut subscriptions = self.subscriptions.borrow_mut();

        if let Some((backend, ids)) = subscriptions.backends.remove(&backend.id()) {
            for id in ids {
                backend.disconnect(id);
            }
        }

        for place in backend.places() {
            if let Some((place, id)) = subscriptions.places.remove(&place.id()) {
                place.disconnect(id);
            }
        }
    }

    fn on_backend_added(self: &Rc<Self>, backend: &Rc<Backend>) {
        {
            let mut state = self.state.borrow_mut();
            if state.backends.iter().any(|b| b.id() == backend.id()) {
                return;
            }
            debug!("Backend added: {:?}", backend.name());
            state.backends.push(backend.clone());
        }

        self.watch_backend(backend);
        self.schedule_rebuild();
    }

    fn on_backend_removed(self: &Rc<Self>, backend: &Rc<Backend>) {
        debug!("Backend removed: {:?}", backend.name());
        self.unwatch_backend(backend);

        let gone: Vec<PlaceId> = backend.places().iter().map(|place| place.id()).collect();
        let update = {
            let mut state = self.state.borrow_mut();
            state.backends.retain(|b| b.id() != backend.id());
            let places = state.places();
            state.selection.forget(&gone, &places)
        };

        self.emit_update(update);
        self.schedule_rebuild();
    }

    fn on_place_added(self: &Rc<Self>, place: &Rc<Place>) {
        trace!("Place added: {}", place.uri());

        let weak = Rc::downgrade(self);
        let id = place.connect_changed(move || {
            if let Some(inner) = weak.upgrade() {
                inner.schedule_rebuild();
            }
        });

        let previous = self
            .subscriptions
            .borrow_mut()
            .places
            .insert(place.id(), (place.clone(), id));
        if let Some((place, id)) = previous {
            place.disconnect(id);
        }

        self.schedule_rebuild();
    }

    fn on_place_removed(self: &Rc<Self>, place: &Rc<Place>) {
        trace!("Place removed: {}", place.uri());

        let subscription = self.subscriptions.borrow_mut().places.remove(&place.id());
        if let Some((place, id)) = subscription {
            place.disconnect(id);
        }

        let update = {
            let mut state = self.state.borrow_mut();
            let places = state.places();
            state.selection.forget(&[place.id()], &places)
        };

        self.emit_update(update);
        self.schedule_rebuild();
    }

    /// Queues a rebuild unless one is already queued
    fn schedule_rebuild(self: &Rc<Self>) {
        if self.rebuild_pending.replace(true) {
            trace!("Rebuild already pending");
            return;
        }

        let weak = Rc::downgrade(self);
        self.scheduler.schedule_idle(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.rebuild();
            }
        }));
    }

    fn rebuild(&self) {
        self.rebuild_pending.set(false);
        self.rebuild_count.set(self.rebuild_count.get() + 1);

        let update = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;

            let summary = state.rows.rebuild(&state.backends);
            debug!(
                "Rebuilt {} rows ({} reused, {} new, {} dropped)",
                state.rows.len(),
                summary.reused,
                summary.created,
                summary.dropped
            );

            if state
                .cursor
                .as_ref()
                .is_some_and(|key| state.rows.position(key).is_none())
            {
                debug!("Cursor row disappeared");
                state.cursor = None;
            }

            let places = state.places();
            let mut uris = state.selection.chosen().clone();
            uris.extend(state.pending_uris.iter().cloned());
            let update = state.selection.apply_chosen_uris(&uris, &places);

            let known: HashSet<String> = places.iter().map(|place| place.uri()).collect();
            state.pending_uris.retain(|uri| !known.contains(uri));
            update
        };

        self.signals.rows_changed.emit(&());
        self.emit_update(update);
    }

    /// Applies a user-driven selection change
    ///
    /// A change of the chosen uris supersedes any restore still waiting
    /// for its places.
    fn mutate(&self, apply: impl FnOnce(&mut SelectionModel, &[Rc<Place>]) -> SelectionUpdate) {
        let update = {
            let mut state = self.state.borrow_mut();
            let places = state.places();
            let update = apply(&mut state.selection, &places);
            if update.chosen_changed {
                state.pending_uris.clear();
            }
            update
        };
        self.emit_update(update);
    }

    fn emit_update(&self, update: SelectionUpdate) {
        if update.union_changed {
            self.signals.collection_changed.emit(&());
        }
        if update.chosen_changed {
            self.signals.selection_changed.emit(&());
        }
    }

    fn disconnect_all(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());

        for id in subscriptions.registry {
            self.registry.disconnect(id);
        }
        for (_, (backend, ids)) in subscriptions.backends {
            for id in ids {
                backend.disconnect(id);
            }
        }
        for (_, (place, id)) in subscriptions.places {
            place.disconnect(id);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}
