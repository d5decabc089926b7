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

//! src/core/collection.rs
//!
//! The union of all active places
//!
//! `UnionCollection` is a cheap, cloneable handle. The sidebar's selection
//! model is the only writer; everyone else gets a live, read-only view:
//! a clone taken once keeps reflecting later membership changes.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::core::types::{Place, PlaceId};

#[derive(Clone, Default)]
pub struct UnionCollection {
    members: Rc<RefCell<Vec<Rc<Place>>>>,
}

impl UnionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, place: &Place) -> bool {
        self.contains_id(place.id())
    }

    pub fn contains_id(&self, id: PlaceId) -> bool {
        self.members.borrow().iter().any(|member| member.id() == id)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Members in the order they joined
    pub fn elements(&self) -> Vec<Rc<Place>> {
        self.members.borrow().clone()
    }

    pub fn ids(&self) -> BTreeSet<PlaceId> {
        self.members.borrow().iter().map(|member| member.id()).collect()
    }

    pub fn uris(&self) -> BTreeSet<String> {
        self.members.borrow().iter().map(|member| member.uri()).collect()
    }

    pub(crate) fn add(&self, place: &Rc<Place>) -> bool {
        if self.contains(place) {
            return false;
        }
        self.members.borrow_mut().push(place.clone());
        true
    }

    pub(crate) fn remove_id(&self, id: PlaceId) -> bool {
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|member| member.id() != id);
        members.len() != before
    }
}

impl fmt::Debug for UnionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.borrow().iter()).finish()
    }
}
