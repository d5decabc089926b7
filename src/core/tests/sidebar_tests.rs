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

//! Sidebar tests
//!
//! Drives the sidebar through a manual scheduler:
//! - Rebuild coalescing
//! - Selected uris round trip and pending restores
//! - Cleanup when backends and places disappear
//! - Cursor, context menu and backend ordering for the host
//! - Notifications and disposal

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::ordering::{KEYRING_NAME, PKCS11_NAME, SSH_NAME};
use crate::core::tests::fixtures::*;
use crate::core::{Backend, CheckState, ManualScheduler, Place, Registry, Sidebar};

const CARD_URI: &str = "pkcs11:token=Card";

#[test]
fn test_initial_rebuild_runs_on_idle() {
    let registry = Rc::new(Registry::new());
    let keyring = Backend::new(Some(KEYRING_NAME), "Passwords", "");
    keyring.add_place(place(LOGIN_URI));
    registry.add_backend(keyring);

    let scheduler = Rc::new(ManualScheduler::new());
    let sidebar = Sidebar::new(registry, scheduler.clone());

    assert_eq!(sidebar.row_count(), 0, "Rows are built on the idle turn");
    assert!(sidebar.is_rebuild_pending());
    assert_eq!(scheduler.pending(), 1);

    scheduler.run_pending();
    assert_eq!(sidebar.row_count(), 2);
    assert_eq!(sidebar.rebuild_count(), 1);
    assert!(!sidebar.is_rebuild_pending());
}

#[test]
fn test_backends_are_sorted_by_rank() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;

    assert_eq!(sidebar.backends(), vec![fixture.keyring.clone(), fixture.pgp.clone()]);
    let rows = sidebar.rows();
    assert_eq!(rows[0].label(), "Passwords");
    assert_eq!(rows[3].label(), "PGP Keys");
    assert_eq!(rows[4].place(), Some(&fixture.p3));
}

#[test]
fn test_many_changes_coalesce_into_one_rebuild() {
    let fixture = three_places();
    let harness = &fixture.harness;
    let before = harness.sidebar.rebuild_count();

    for index in 0..10 {
        fixture.pgp.add_place(place(&format!("gnupg://key-{index}")));
    }
    fixture.p1.set_label("Login");

    assert!(harness.sidebar.is_rebuild_pending());
    assert_eq!(harness.scheduler.pending(), 1);

    harness.idle();
    assert_eq!(harness.sidebar.rebuild_count(), before + 1);
    assert_eq!(harness.sidebar.row_count(), 15);
    assert_eq!(harness.idle(), 0, "Nothing left to run");
}

#[test]
fn test_selected_uris_round_trip() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;
    let (notified, handler) = counter();
    sidebar.connect_selection_changed(handler);

    sidebar.set_selected_uris([LOGIN_URI, GNUPG_URI]);
    assert_eq!(sidebar.selected_uris(), uris(&[LOGIN_URI, GNUPG_URI]));
    assert_eq!(notified.get(), 1);

    sidebar.set_selected_uris([LOGIN_URI, GNUPG_URI]);
    assert_eq!(sidebar.selected_uris(), uris(&[LOGIN_URI, GNUPG_URI]));
    assert_eq!(notified.get(), 1, "Same uris again is not a change");
}

#[test]
fn test_selected_uris_outside_known_places_are_dropped() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;

    sidebar.set_selected_uris([DEFAULT_URI, "secret-service:///gone"]);
    assert_eq!(sidebar.selected_uris(), uris(&[DEFAULT_URI]));
    assert_eq!(sidebar.selected_place(), Some(fixture.p2.clone()));
}

#[test]
fn test_selection_survives_rebuild() {
    let fixture = three_places();
    let harness = &fixture.harness;
    harness.sidebar.set_selected_uris([LOGIN_URI, GNUPG_URI]);

    fixture.p2.set_label("Default");
    harness.idle();

    assert_eq!(harness.sidebar.selected_uris(), uris(&[LOGIN_URI, GNUPG_URI]));
    assert_eq!(harness.sidebar.checked_places(), vec![fixture.p1.clone(), fixture.p3.clone()]);
}

#[test]
fn test_pending_uris_apply_when_place_appears() {
    let fixture = three_places();
    let harness = &fixture.harness;
    let (notified, handler) = counter();
    harness.sidebar.connect_selection_changed(handler);

    harness.sidebar.set_selected_uris([CARD_URI]);
    assert!(harness.sidebar.selected_uris().is_empty());
    assert_eq!(notified.get(), 0);

    let tokens = Backend::new(Some(PKCS11_NAME), "Certificates", "Smart cards");
    let card = place(CARD_URI);
    tokens.add_place(card.clone());
    harness.registry.add_backend(tokens);
    harness.idle();

    assert_eq!(harness.sidebar.selected_uris(), uris(&[CARD_URI]));
    assert_eq!(harness.sidebar.selected_place(), Some(card));
    assert_eq!(notified.get(), 1);
}

#[test]
fn test_user_change_discards_pending_uris() {
    let fixture = three_places();
    let harness = &fixture.harness;

    harness.sidebar.set_selected_uris([CARD_URI]);
    harness.sidebar.check_place(&fixture.p1);

    let tokens = Backend::new(Some(PKCS11_NAME), "Certificates", "");
    tokens.add_place(place(CARD_URI));
    harness.registry.add_backend(tokens);
    harness.idle();

    assert_eq!(harness.sidebar.selected_uris(), uris(&[LOGIN_URI]));
}

#[test]
fn test_backend_removal_cleans_selection() {
    let fixture = three_places();
    let harness = &fixture.harness;
    harness.sidebar.check_place(&fixture.p1);
    harness.sidebar.check_place(&fixture.p3);

    let (notified, handler) = counter();
    harness.sidebar.connect_selection_changed(handler);
    let (collection_notified, collection_handler) = counter();
    harness.sidebar.connect_collection_changed(collection_handler);

    harness.registry.remove_backend(&fixture.keyring);

    assert!(!harness.sidebar.is_checked(&fixture.p1));
    assert_eq!(harness.sidebar.selected_uris(), uris(&[GNUPG_URI]));
    assert!(!harness.sidebar.collection().contains(&fixture.p1));
    assert_eq!(notified.get(), 1);
    assert_eq!(collection_notified.get(), 1);

    harness.idle();
    assert_eq!(harness.sidebar.row_count(), 2);
    assert_eq!(harness.sidebar.backends(), vec![fixture.pgp.clone()]);
}

#[test]
fn test_removed_backend_is_no_longer_followed() {
    let fixture = three_places();
    let harness = &fixture.harness;

    harness.registry.remove_backend(&fixture.keyring);
    harness.idle();

    fixture.keyring.add_place(place("secret-service:///other"));
    fixture.p1.set_label("Login");
    assert!(!harness.sidebar.is_rebuild_pending());
}

#[test]
fn test_place_removal_clears_focus() {
    let fixture = three_places();
    let harness = &fixture.harness;
    harness.sidebar.select_row(Some(2));
    assert_eq!(harness.sidebar.selected_place(), Some(fixture.p2.clone()));

    fixture.keyring.remove_place(&fixture.p2);

    assert_eq!(harness.sidebar.selected_place(), None);
    assert!(harness.sidebar.selected_uris().is_empty());
    assert!(harness.sidebar.collection().is_empty());
}

#[test]
fn test_backend_added_later_is_appended() {
    let registry = Registry::new();
    let ssh = Backend::new(Some(SSH_NAME), "OpenSSH", "");
    ssh.add_place(place("file:///home/me/.ssh"));
    registry.add_backend(ssh.clone());
    let harness = Harness::new(registry);

    let keyring = Backend::new(Some(KEYRING_NAME), "Passwords", "");
    keyring.add_place(place(LOGIN_URI));
    harness.registry.add_backend(keyring.clone());
    harness.idle();

    assert_eq!(harness.sidebar.backends(), vec![ssh, keyring]);
    assert_eq!(harness.sidebar.row(2).map(|row| row.label().to_string()), Some("Passwords".to_string()));
}

#[test]
fn test_place_change_refreshes_row() {
    let fixture = three_places();
    let harness = &fixture.harness;
    let before = harness.sidebar.row(1).map(|row| row.id());
    let (rebuilt, handler) = counter();
    harness.sidebar.connect_rows_changed(handler);

    fixture.p1.set_label("Login");
    assert!(harness.sidebar.is_rebuild_pending());
    harness.idle();

    let row = harness.sidebar.row(1).unwrap();
    assert_eq!(row.label(), "Login");
    assert_eq!(Some(row.id()), before);
    assert_eq!(rebuilt.get(), 1);
}

#[test]
fn test_member_rename_rebuilds_rows_only() {
    let fixture = three_places();
    let harness = &fixture.harness;
    harness.sidebar.check_place(&fixture.p1);
    harness.sidebar.check_place(&fixture.p3);

    let (rebuilt, rows_handler) = counter();
    harness.sidebar.connect_rows_changed(rows_handler);
    let (collection_notified, collection_handler) = counter();
    harness.sidebar.connect_collection_changed(collection_handler);

    fixture.p1.set_label("Login");
    harness.idle();

    // Views showing members must follow rows-changed to see the new label
    assert_eq!(rebuilt.get(), 1);
    assert_eq!(collection_notified.get(), 0);
    let labels: Vec<String> = harness
        .sidebar
        .collection()
        .elements()
        .iter()
        .map(|place| place.label())
        .collect();
    assert!(labels.contains(&"Login".to_string()));
}

#[test]
fn test_row_position_follows_row_ids() {
    let fixture = three_places();
    let harness = &fixture.harness;
    let shown: Vec<_> = harness.sidebar.rows().iter().map(|row| row.id()).collect();

    fixture.p1.set_label("Login");
    harness.idle();
    assert!(harness.sidebar.row_changes_since(&shown).is_empty());

    fixture.keyring.remove_place(&fixture.p1);
    harness.idle();

    let changes = harness.sidebar.row_changes_since(&shown);
    assert_eq!(changes.removed, vec![shown[1]]);
    assert!(changes.inserted.is_empty());
    assert_eq!(harness.sidebar.row_position(shown[1]), None);
    assert_eq!(harness.sidebar.row_position(shown[2]), Some(1));
    assert_eq!(harness.sidebar.row_position(shown[4]), Some(3));

    harness.sidebar.toggle_row(3);
    assert!(harness.sidebar.is_checked(&fixture.p3));
}

#[test]
fn test_select_row_moves_cursor() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;

    sidebar.select_row(Some(4));
    assert_eq!(sidebar.selected_place(), Some(fixture.p3.clone()));
    assert_eq!(sidebar.cursor(), Some(4));
    assert_eq!(sidebar.selected_uris(), uris(&[GNUPG_URI]));

    sidebar.select_row(Some(0));
    assert_eq!(
        sidebar.selected_place(),
        Some(fixture.p3.clone()),
        "Backend headings are not selectable"
    );

    sidebar.select_row(None);
    assert_eq!(sidebar.selected_place(), None);
}

#[test]
fn test_toggle_row() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;

    sidebar.toggle_row(1);
    assert!(sidebar.is_checked(&fixture.p1));
    assert_eq!(sidebar.check_state(1, false), CheckState::Checked);
    assert_eq!(sidebar.check_state(2, false), CheckState::Unchecked);

    sidebar.toggle_row(1);
    assert!(!sidebar.is_checked(&fixture.p1));
    assert_eq!(sidebar.check_state(1, false), CheckState::Hidden);

    sidebar.toggle_row(0);
    assert!(sidebar.checked_places().is_empty());
}

#[test]
fn test_cursor_follows_row_across_rebuilds() {
    let fixture = three_places();
    let harness = &fixture.harness;

    harness.sidebar.set_cursor(Some(2));
    fixture.keyring.remove_place(&fixture.p1);
    harness.idle();
    assert_eq!(harness.sidebar.cursor(), Some(1));

    fixture.keyring.remove_place(&fixture.p2);
    harness.idle();
    assert_eq!(harness.sidebar.cursor(), None);
}

#[test]
fn test_selected_places_puts_cursor_place_first() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;
    sidebar.check_place(&fixture.p1);
    sidebar.check_place(&fixture.p3);

    sidebar.set_cursor(Some(4));
    let selected = sidebar.selected_places();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0], fixture.p3);
    assert_eq!(selected[1], fixture.p1);

    sidebar.set_cursor(Some(2));
    let selected = sidebar.selected_places();
    assert_eq!(selected[0], fixture.p2, "Cursor place leads even when unchecked");
    assert_eq!(selected.len(), 3);
}

#[test]
fn test_backends_puts_cursor_backend_first() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;

    sidebar.set_cursor(Some(3));
    assert_eq!(sidebar.backends(), vec![fixture.pgp.clone(), fixture.keyring.clone()]);

    sidebar.set_cursor(Some(4));
    assert_eq!(
        sidebar.backends(),
        vec![fixture.keyring.clone(), fixture.pgp.clone()],
        "Only a heading under the cursor reorders backends"
    );
}

#[test]
fn test_context_menu_targets() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;
    let targets: Rc<RefCell<Vec<Option<Rc<Place>>>>> = Rc::new(RefCell::new(Vec::new()));
    let log = targets.clone();
    sidebar.connect_context_menu(move |target| log.borrow_mut().push(target.cloned()));

    sidebar.request_context_menu();
    assert!(targets.borrow().is_empty(), "No cursor, no menu");

    sidebar.request_context_menu_at(0);
    sidebar.request_context_menu_at(4);
    sidebar.request_context_menu_at(99);

    assert_eq!(*targets.borrow(), vec![None, Some(fixture.p3.clone())]);
    assert_eq!(sidebar.cursor(), Some(4));
}

#[test]
fn test_combined_notifies_once_and_keeps_uris() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;
    sidebar.select_row(Some(1));

    let changes = Rc::new(RefCell::new(Vec::new()));
    let log = changes.clone();
    sidebar.connect_combined_changed(move |combined| log.borrow_mut().push(combined));
    let (selection_notified, handler) = counter();
    sidebar.connect_selection_changed(handler);

    sidebar.set_combined(true);
    sidebar.set_combined(true);
    assert_eq!(sidebar.collection().len(), 3);
    assert_eq!(sidebar.selected_uris(), uris(&[LOGIN_URI]));

    sidebar.set_combined(false);
    assert_eq!(sidebar.collection().len(), 1);

    assert_eq!(*changes.borrow(), vec![true, false]);
    assert_eq!(selection_notified.get(), 0);
}

#[test]
fn test_handlers_can_read_sidebar() {
    let fixture = three_places();
    let sidebar = fixture.harness.sidebar.clone();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let reader = sidebar.clone();
    let log = seen.clone();
    let id = sidebar.connect_selection_changed(move || {
        log.borrow_mut().push((reader.selected_uris(), reader.collection().len()));
    });

    sidebar.select_row(Some(1));
    assert_eq!(*seen.borrow(), vec![(uris(&[LOGIN_URI]), 1)]);
    assert!(sidebar.disconnect(id));
}

#[test]
fn test_dispose_stops_following_changes() {
    let fixture = three_places();
    let harness = &fixture.harness;

    harness.sidebar.dispose();
    fixture.keyring.add_place(place("secret-service:///other"));
    harness.registry.remove_backend(&fixture.pgp);

    assert!(!harness.sidebar.is_rebuild_pending());
    assert_eq!(harness.scheduler.pending(), 0);
    assert_eq!(harness.sidebar.backends().len(), 2);
}

#[test]
fn test_dropping_sidebar_disconnects() {
    let fixture = three_places();
    let ThreePlaces {
        harness, keyring, ..
    } = fixture;
    let Harness {
        registry,
        scheduler,
        sidebar,
    } = harness;

    drop(sidebar);
    keyring.add_place(place("secret-service:///other"));
    registry.add_backend(Backend::new(Some(SSH_NAME), "OpenSSH", ""));

    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_snapshot_serialises_rows() {
    let fixture = three_places();
    let sidebar = &fixture.harness.sidebar;
    sidebar.select_row(Some(1));

    let snapshot = sidebar.snapshot(true);
    assert_eq!(snapshot.rows.len(), 5);
    assert_eq!(snapshot.cursor, Some(1));
    assert_eq!(snapshot.selected_uris, vec![LOGIN_URI.to_string()]);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["rows"][0]["type"], "backend");
    assert_eq!(json["rows"][1]["type"], "place");
    assert_eq!(json["rows"][1]["check"], "unchecked");
    assert_eq!(json["rows"][1]["in_collection"], true);
    assert_eq!(json["rows"][2]["check"], "hidden");
}
