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

//! src/core/types.rs
//!
//! Backends and places as seen by the sidebar
//!
//! - `Place`: a selectable collection of keys or certificates (a keyring,
//!   a GnuPG home, a PKCS#11 slot...). Identified by a stable `uri`.
//! - `Backend`: a named source of places (keyring, OpenPGP, PKCS#11, SSH).
//!   Its set of places changes over time and those changes are observable.
//!
//! Both are shared as `Rc` handles. The registry owns them; the sidebar only
//! keeps references plus event subscriptions, which it drops again when a
//! place or backend goes away. Equality is identity: two places with the
//! same label and uri are still two different places.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::signal::{HandlerId, Signal};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

fn next_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a `Place`, unique for the lifetime of the process
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PlaceId(u64);

/// Identity of a `Backend`, unique for the lifetime of the process
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BackendId(u64);

/// Display and persistence attributes of a place
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PlaceInfo {
    /// Text shown in the sidebar row
    pub label: String,
    /// Tooltip text
    pub description: String,
    /// Themed icon name, if any
    pub icon: Option<String>,
    /// Stable identifier used when the selection is persisted
    pub uri: String,
    /// Whether the label may be renamed by the user (display hint only)
    pub editable: bool,
}

impl PlaceInfo {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}

/// A selectable collection of keys or certificates
pub struct Place {
    id: PlaceId,
    info: RefCell<PlaceInfo>,
    changed: Signal<()>,
}

impl Place {
    pub fn new(info: PlaceInfo) -> Rc<Self> {
        Rc::new(Self {
            id: PlaceId(next_object_id()),
            info: RefCell::new(info),
            changed: Signal::new(),
        })
    }

    pub fn id(&self) -> PlaceId {
        self.id
    }

    /// Returns a copy of the current attributes
    pub fn info(&self) -> PlaceInfo {
        self.info.borrow().clone()
    }

    pub fn uri(&self) -> String {
        self.info.borrow().uri.clone()
    }

    pub fn label(&self) -> String {
        self.info.borrow().label.clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.update(|info| info.label = label.into());
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.update(|info| info.description = description.into());
    }

    pub fn set_icon(&self, icon: Option<String>) {
        self.update(|info| info.icon = icon);
    }

    /// Called whenever a property of this place changes
    pub fn connect_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + 'static,
    {
        self.changed.connect(move |_| handler())
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.changed.disconnect(id)
    }

    fn update(&self, apply: impl FnOnce(&mut PlaceInfo)) {
        apply(&mut self.info.borrow_mut());
        self.changed.emit(&());
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

impl fmt::Debug for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info.borrow();
        f.debug_struct("Place")
            .field("id", &self.id)
            .field("label", &info.label)
            .field("uri", &info.uri)
            .finish()
    }
}

/// A named source of places
///
/// Membership changes are announced through `connect_place_added` and
/// `connect_place_removed`; label or description changes through
/// `connect_changed`. The place list is already updated when the added or
/// removed handlers run.
pub struct Backend {
    id: BackendId,
    name: Option<String>,
    label: RefCell<String>,
    description: RefCell<String>,
    places: RefCell<Vec<Rc<Place>>>,
    place_added: Signal<Rc<Place>>,
    place_removed: Signal<Rc<Place>>,
    changed: Signal<()>,
}

impl Backend {
    /// Creates a backend with no places
    ///
    /// # Arguments
    /// * `name` - Stable identifier used for ordering (`None` ranks last)
    /// * `label` - Heading shown in the sidebar
    /// * `description` - Tooltip for the heading
    pub fn new(
        name: Option<&str>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: BackendId(next_object_id()),
            name: name.map(str::to_owned),
            label: RefCell::new(label.into()),
            description: RefCell::new(description.into()),
            places: RefCell::new(Vec::new()),
            place_added: Signal::new(),
            place_removed: Signal::new(),
            changed: Signal::new(),
        })
    }

    pub fn id(&self) -> BackendId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn description(&self) -> String {
        self.description.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
        self.changed.emit(&());
    }

    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.borrow_mut() = description.into();
        self.changed.emit(&());
    }

    /// Current places, in the order they were added
    pub fn places(&self) -> Vec<Rc<Place>> {
        self.places.borrow().clone()
    }

    pub fn place_count(&self) -> usize {
        self.places.borrow().len()
    }

    pub fn contains(&self, place: &Place) -> bool {
        self.places.borrow().iter().any(|p| p.id() == place.id())
    }

    /// Adds a place and notifies listeners
    ///
    /// Returns `false` (and emits nothing) if the place is already here.
    pub fn add_place(&self, place: Rc<Place>) -> bool {
        if self.contains(&place) {
            return false;
        }
        self.places.borrow_mut().push(place.clone());
        self.place_added.emit(&place);
        true
    }

    /// Removes a place and notifies listeners
    ///
    /// Returns `false` (and emits nothing) if the place was not here.
    pub fn remove_place(&self, place: &Place) -> bool {
        let removed = {
            let mut places = self.places.borrow_mut();
            let index = places.iter().position(|p| p.id() == place.id());
            index.map(|index| places.remove(index))
        };

        match removed {
            Some(place) => {
                self.place_removed.emit(&place);
                true
            }
            None => false,
        }
    }

    pub fn connect_place_added<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Rc<Place>) + 'static,
    {
        self.place_added.connect(handler)
    }

    pub fn connect_place_removed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Rc<Place>) + 'static,
    {
        self.place_removed.connect(handler)
    }

    pub fn connect_changed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn() + 'static,
    {
        self.changed.connect(move |_| handler())
    }

    /// Disconnects a handler from whichever signal it was connected to
    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.place_added.disconnect(id)
            || self.place_removed.disconnect(id)
            || self.changed.disconnect(id)
    }
}

impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Backend {}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("places", &self.place_count())
            .finish()
    }
}
