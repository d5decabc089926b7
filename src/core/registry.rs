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

//! src/core/registry.rs
//!
//! The set of backends known to the application
//!
//! Stands in for the plugin registry a desktop key manager populates at
//! start-up. The sidebar enumerates it once and then follows the
//! backend-added / backend-removed events.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::parser::BackendSection;
use crate::core::signal::{HandlerId, Signal};
use crate::core::types::{Backend, Place};

/// Ordered collection of backends with change notification
#[derive(Debug, Default)]
pub struct Registry {
    backends: RefCell<Vec<Rc<Backend>>>,
    backend_added: Signal<Rc<Backend>>,
    backend_removed: Signal<Rc<Backend>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from parsed place descriptions
    pub fn from_sections(sections: Vec<BackendSection>) -> Self {
        let registry = Self::new();
        for section in sections {
            let backend = Backend::new(section.name.as_deref(), section.label, section.description);
            for info in section.places {
                backend.add_place(Place::new(info));
            }
            registry.add_backend(backend);
        }
        registry
    }

    /// Backends in discovery order
    pub fn backends(&self) -> Vec<Rc<Backend>> {
        self.backends.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.backends.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.borrow().is_empty()
    }

    pub fn find_backend(&self, name: &str) -> Option<Rc<Backend>> {
        self.backends
            .borrow()
            .iter()
            .find(|backend| backend.name() == Some(name))
            .cloned()
    }

    /// Looks a place up by uri across every backend
    pub fn find_place(&self, uri: &str) -> Option<Rc<Place>> {
        self.backends
            .borrow()
            .iter()
            .flat_map(|backend| backend.places())
            .find(|place| place.uri() == uri)
    }

    /// Registers a backend; ignored if it is already registered
    pub fn add_backend(&self, backend: Rc<Backend>) -> bool {
        if self.backends.borrow().iter().any(|b| b.id() == backend.id()) {
            return false;
        }
        self.backends.borrow_mut().push(backend.clone());
        self.backend_added.emit(&backend);
        true
    }

    pub fn remove_backend(&self, backend: &Backend) -> bool {
        let removed = {
            let mut backends = self.backends.borrow_mut();
            let index = backends.iter().position(|b| b.id() == backend.id());
            index.map(|index| backends.remove(index))
        };

        match removed {
            Some(backend) => {
                self.backend_removed.emit(&backend);
                true
            }
            None => false,
        }
    }

    pub fn connect_backend_added<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Rc<Backend>) + 'static,
    {
        self.backend_added.connect(handler)
    }

    pub fn connect_backend_removed<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Rc<Backend>) + 'static,
    {
        self.backend_removed.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.backend_added.disconnect(id) || self.backend_removed.disconnect(id)
    }
}
