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

//! src/core/selection.rs
//!
//! Selection aggregation
//!
//! Keeps four pieces of state mutually consistent:
//!
//! - `checked`: places ticked by the user (unordered)
//! - `selected`: the focused place, used only while nothing is checked
//! - `chosen`: uris of the active places, the persisted view of the selection
//! - `combined`: display override that includes every place
//!
//! and maintains the `UnionCollection` whose membership is always
//!
//! ```text
//! combined ? every place : (checked non-empty ? checked : {selected})
//! ```
//!
//! Every operation takes the current places in row order. The model holds
//! no reference to backends, so callers decide what "every place" means.
//!
//! # Reentrancy
//!
//! `apply_chosen_uris` drives the ordinary `select` path while it walks the
//! places. The union recomputation those calls would trigger is suppressed
//! by an `updating` flag and runs exactly once when the walk finishes.

use log::{debug, trace, warn};
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use crate::core::collection::UnionCollection;
use crate::core::types::{Place, PlaceId};

/// What changed as a result of a selection operation
#[must_use]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SelectionUpdate {
    /// The set of chosen uris changed (emit "selection-changed")
    pub chosen_changed: bool,
    /// Union collection membership changed
    pub union_changed: bool,
}

impl SelectionUpdate {
    pub fn is_empty(&self) -> bool {
        !self.chosen_changed && !self.union_changed
    }
}

/// Selection state behind the sidebar
#[derive(Debug, Default)]
pub struct SelectionModel {
    checked: HashSet<PlaceId>,
    selected: Option<Rc<Place>>,
    chosen: BTreeSet<String>,
    combined: bool,
    updating: bool,
    union: UnionCollection,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live handle on the union collection
    pub fn collection(&self) -> &UnionCollection {
        &self.union
    }

    pub fn combined(&self) -> bool {
        self.combined
    }

    pub fn chosen(&self) -> &BTreeSet<String> {
        &self.chosen
    }

    pub fn selected(&self) -> Option<&Rc<Place>> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, place: &Place) -> bool {
        self.selected.as_ref().is_some_and(|s| s.id() == place.id())
    }

    pub fn is_checked(&self, place: &Place) -> bool {
        self.checked.contains(&place.id())
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn checked_ids(&self) -> &HashSet<PlaceId> {
        &self.checked
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Focuses a place (or nothing)
    ///
    /// The union and chosen uris only follow the focus while nothing is
    /// checked. Selecting the already-selected place does nothing.
    pub fn select(&mut self, place: Option<&Rc<Place>>, places: &[Rc<Place>]) -> SelectionUpdate {
        let unchanged = match (&self.selected, place) {
            (Some(current), Some(place)) => current.id() == place.id(),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return SelectionUpdate::default();
        }

        trace!("Selected place: {:?}", place.map(|p| p.uri()));
        self.selected = place.cloned();

        if self.checked.is_empty() {
            self.recompute(places, true)
        } else {
            SelectionUpdate::default()
        }
    }

    /// Ticks a place
    ///
    /// The caller must check the current state first: ticking a place that
    /// is already ticked is a contract violation (debug assertion; ignored
    /// with a warning in release builds).
    pub fn check(&mut self, place: &Rc<Place>, places: &[Rc<Place>]) -> SelectionUpdate {
        if self.checked.contains(&place.id()) {
            debug_assert!(false, "check() on an already checked place: {}", place.uri());
            warn!("Ignoring check of already checked place {}", place.uri());
            return SelectionUpdate::default();
        }

        self.checked.insert(place.id());
        debug!("Checked {} ({} checked)", place.uri(), self.checked.len());
        self.recompute(places, true)
    }

    /// Unticks a place, falling back to the focused place when none remain
    ///
    /// Unticking a place that is not ticked is a contract violation.
    pub fn uncheck(&mut self, place: &Rc<Place>, places: &[Rc<Place>]) -> SelectionUpdate {
        if !self.checked.remove(&place.id()) {
            debug_assert!(false, "uncheck() on a place that is not checked: {}", place.uri());
            warn!("Ignoring uncheck of unchecked place {}", place.uri());
            return SelectionUpdate::default();
        }

        debug!("Unchecked {} ({} checked)", place.uri(), self.checked.len());
        self.recompute(places, true)
    }

    /// Turns the "show everything" override on or off
    ///
    /// Only the union changes; chosen uris describe the user's choice and
    /// are left alone.
    pub fn set_combined(&mut self, combined: bool, places: &[Rc<Place>]) -> SelectionUpdate {
        if self.combined == combined {
            return SelectionUpdate::default();
        }

        debug!("Combined view {}", if combined { "on" } else { "off" });
        self.combined = combined;
        self.recompute(places, false)
    }

    /// Reconciles the selection with a set of uris restored from elsewhere
    ///
    /// Places are visited in row order:
    ///
    /// - the first match becomes the focused place (if nothing is checked);
    /// - a second match switches to checked mode: the first and second match
    ///   are both ticked and the focus is dropped;
    /// - every later match is ticked;
    /// - a place whose uri is not in `uris` is unticked.
    ///
    /// So zero matches leave nothing selected, one match gives single
    /// selection and two or more give a checked set of all matches. The
    /// union (and chosen uris) are then recomputed once.
    pub fn apply_chosen_uris(
        &mut self,
        uris: &BTreeSet<String>,
        places: &[Rc<Place>],
    ) -> SelectionUpdate {
        let matched = self.with_updates_blocked(|model| model.reconcile(uris, places));
        debug!(
            "Reconciled {} chosen uris: {} matched, {} checked",
            uris.len(),
            matched,
            self.checked.len()
        );
        self.recompute(places, true)
    }

    /// Drops every trace of places that no longer exist
    ///
    /// `places` is the remaining set; the forgotten places must not be in it.
    pub fn forget(&mut self, gone: &[PlaceId], places: &[Rc<Place>]) -> SelectionUpdate {
        for id in gone {
            self.checked.remove(id);
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| gone.contains(&selected.id()))
        {
            self.selected = None;
        }
        self.recompute(places, true)
    }

    fn reconcile(&mut self, uris: &BTreeSet<String>, places: &[Rc<Place>]) -> usize {
        let mut count = 0;
        let mut first: Option<Rc<Place>> = None;
        let mut promoted = false;

        for place in places {
            let uri = place.uri();
            if uri.is_empty() {
                continue;
            }

            let mut checked_mode = !self.checked.is_empty();

            if uris.contains(&uri) {
                if !checked_mode {
                    if count == 0 {
                        first = Some(place.clone());
                    } else if count == 1 {
                        if let Some(first) = first.take() {
                            self.checked.insert(first.id());
                        }
                        checked_mode = true;
                        promoted = true;
                    }
                }
                if checked_mode {
                    self.checked.insert(place.id());
                }
                count += 1;
            } else {
                self.checked.remove(&place.id());
            }
        }

        if let Some(first) = first {
            let _ = self.select(Some(&first), places);
        } else if count == 0 || promoted {
            let _ = self.select(None, places);
        }

        count
    }

    /// Runs `f` with union recomputation suppressed, restoring the previous
    /// flag on every exit path of `f`
    fn with_updates_blocked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.updating, true);
        let result = f(self);
        self.updating = previous;
        result
    }

    /// Brings the union (and optionally the chosen uris) in line with state
    fn recompute(&mut self, places: &[Rc<Place>], update_chosen: bool) -> SelectionUpdate {
        if self.updating {
            trace!("Recompute suppressed while reconciling");
            return SelectionUpdate::default();
        }

        let mut update = SelectionUpdate::default();
        let mut wanted = BTreeSet::new();
        let mut present = BTreeSet::new();

        for place in places {
            present.insert(place.id());

            let mut include = if self.checked.is_empty() {
                self.is_selected(place)
            } else {
                self.checked.contains(&place.id())
            };

            if include && update_chosen {
                let uri = place.uri();
                if !uri.is_empty() {
                    wanted.insert(uri);
                }
            }

            // Combined overrides and shows everything
            if self.combined {
                include = true;
            }

            let have = self.union.contains(place);
            if include && !have {
                self.union.add(place);
                update.union_changed = true;
            } else if !include && have {
                self.union.remove_id(place.id());
                update.union_changed = true;
            }
        }

        let stale: Vec<PlaceId> = self.union.ids().difference(&present).copied().collect();
        for id in stale {
            self.union.remove_id(id);
            update.union_changed = true;
        }

        if update_chosen && wanted != self.chosen {
            debug!("Chosen uris now {:?}", wanted);
            self.chosen = wanted;
            update.chosen_changed = true;
        }

        update
    }
}
