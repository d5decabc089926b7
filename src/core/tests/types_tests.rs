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

//! Type tests (Place, Backend, Registry, Signal)

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::tests::fixtures::{counter, place};
use crate::core::{Backend, Place, PlaceInfo, Registry, Signal};

#[test]
fn test_place_identity_is_not_content() {
    let a = place("gnupg://");
    let b = place("gnupg://");

    assert_ne!(a, b, "Two places with equal data are still different places");
    assert_eq!(a, a.clone());
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_place_info_builder() {
    let info = PlaceInfo::new("pkcs11:token=Card", "Smart card")
        .with_description("Inserted token")
        .with_icon("media-flash")
        .editable(true);

    assert_eq!(info.uri, "pkcs11:token=Card");
    assert_eq!(info.label, "Smart card");
    assert_eq!(info.description, "Inserted token");
    assert_eq!(info.icon.as_deref(), Some("media-flash"));
    assert!(info.editable);
}

#[test]
fn test_place_property_change_notifies() {
    let place = place("secret-service:///login");
    let (count, handler) = counter();
    let id = place.connect_changed(handler);

    place.set_label("Login keyring");
    place.set_description("Unlocked at login");
    assert_eq!(count.get(), 2);
    assert_eq!(place.label(), "Login keyring");

    assert!(place.disconnect(id));
    place.set_icon(Some("keyring".to_string()));
    assert_eq!(count.get(), 2, "Disconnected handler must not run");
}

#[test]
fn test_backend_add_and_remove_places() {
    let backend = Backend::new(Some("openssh"), "SSH", "");
    let added = Rc::new(RefCell::new(Vec::new()));
    let removed = Rc::new(RefCell::new(Vec::new()));

    let added_log = added.clone();
    backend.connect_place_added(move |place: &Rc<Place>| added_log.borrow_mut().push(place.uri()));
    let removed_log = removed.clone();
    backend.connect_place_removed(move |place: &Rc<Place>| {
        removed_log.borrow_mut().push(place.uri())
    });

    let keys = place("file:///home/me/.ssh");
    assert!(backend.add_place(keys.clone()));
    assert!(!backend.add_place(keys.clone()), "Adding twice is refused");
    assert_eq!(backend.place_count(), 1);

    assert!(backend.remove_place(&keys));
    assert!(!backend.remove_place(&keys), "Removing twice is refused");
    assert_eq!(backend.place_count(), 0);

    assert_eq!(*added.borrow(), vec!["file:///home/me/.ssh".to_string()]);
    assert_eq!(*removed.borrow(), vec!["file:///home/me/.ssh".to_string()]);
}

#[test]
fn test_backend_place_list_updated_before_notification() {
    let backend = Backend::new(Some("openssh"), "SSH", "");
    let seen = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&backend);
    let seen_log = seen.clone();
    backend.connect_place_removed(move |_| {
        if let Some(backend) = weak.upgrade() {
            seen_log.borrow_mut().push(backend.place_count());
        }
    });

    let keys = place("file:///home/me/.ssh");
    backend.add_place(keys.clone());
    backend.remove_place(&keys);

    assert_eq!(*seen.borrow(), vec![0]);
}

#[test]
fn test_backend_disconnect_any_signal() {
    let backend = Backend::new(None, "Other", "");
    let (count, handler) = counter();
    let id = backend.connect_changed(handler);

    backend.set_label("Renamed");
    assert_eq!(count.get(), 1);
    assert_eq!(backend.label(), "Renamed");

    assert!(backend.disconnect(id));
    assert!(!backend.disconnect(id));
    backend.set_description("Changed");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_registry_add_remove_backend() {
    let registry = Registry::new();
    let (added, on_added) = counter();
    let (removed, on_removed) = counter();
    registry.connect_backend_added(move |_| on_added());
    registry.connect_backend_removed(move |_| on_removed());

    let backend = Backend::new(Some("pkcs11"), "Certificates", "");
    assert!(registry.add_backend(backend.clone()));
    assert!(!registry.add_backend(backend.clone()));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find_backend("pkcs11"), Some(backend.clone()));

    assert!(registry.remove_backend(&backend));
    assert!(registry.is_empty());

    assert_eq!(added.get(), 1);
    assert_eq!(removed.get(), 1);
}

#[test]
fn test_signal_handlers_may_disconnect_themselves() {
    let signal: Rc<Signal<u32>> = Rc::new(Signal::new());
    let calls = Rc::new(RefCell::new(Vec::new()));
    let own_id = Rc::new(RefCell::new(None));

    let weak = Rc::downgrade(&signal);
    let calls_log = calls.clone();
    let own = own_id.clone();
    let id = signal.connect(move |value| {
        calls_log.borrow_mut().push(*value);
        if let (Some(signal), Some(id)) = (weak.upgrade(), *own.borrow()) {
            signal.disconnect(id);
        }
    });
    *own_id.borrow_mut() = Some(id);

    signal.emit(&1);
    signal.emit(&2);

    assert_eq!(*calls.borrow(), vec![1]);
    assert_eq!(signal.handler_count(), 0);
}
