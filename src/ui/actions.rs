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

//! GTK actions for the application

use gtk4::{gio, prelude::*, Application};
use log::debug;

use crate::core::Sidebar;

/// Sets up the quit action (Ctrl+Q)
pub fn setup_quit_action(app: &Application) {
    let quit_action = gio::SimpleAction::new("quit", None);
    let app_for_quit = app.clone();

    quit_action.connect_activate(move |_, _| {
        app_for_quit.quit();
    });

    app.add_action(&quit_action);
    app.set_accels_for_action("app.quit", &["<Ctrl>Q"]);
}

/// Sets up the stateful "combined" action
///
/// Widgets bound to `app.combined` toggle the combined view; the action
/// state follows the sidebar when it is changed elsewhere.
pub fn setup_combined_action(app: &Application, sidebar: &Sidebar) {
    let combined_action =
        gio::SimpleAction::new_stateful("combined", None, &sidebar.combined().to_variant());

    let sidebar_for_action = sidebar.clone();
    combined_action.connect_activate(move |action, _| {
        let current = action
            .state()
            .and_then(|state| state.get::<bool>())
            .unwrap_or(false);
        debug!("Combined action: {} -> {}", current, !current);
        sidebar_for_action.set_combined(!current);
    });

    let action_for_sidebar = combined_action.clone();
    sidebar.connect_combined_changed(move |combined| {
        action_for_sidebar.set_state(&combined.to_variant());
    });

    app.add_action(&combined_action);
    app.set_accels_for_action("app.combined", &["<Ctrl>A"]);
}
