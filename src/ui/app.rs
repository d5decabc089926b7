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

//! GTK4 Application wrapper
//!
//! This module sets up the GTK4 application lifecycle and creates
//! the main window around a sidebar built from the places file.
//!
//! # Architecture
//!
//! ```text
//! App (GTK4 Application)
//!   ├─ Loads the registry
//!   ├─ Creates the Sidebar (GLib idle scheduling)
//!   └─ Builds the window: SidebarView | CollectionPanel
//! ```

use gtk4::prelude::*;
use gtk4::{gdk, Application, ApplicationWindow, CssProvider, Orientation, Paned};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::load_registry;
use crate::core::{Registry, Sidebar};
use crate::ui::actions::{setup_combined_action, setup_quit_action};
use crate::ui::components::{CollectionPanel, SidebarView};
use crate::ui::GlibIdleScheduler;

/// GTK4 Application hosting the sidebar
pub struct App {
    /// GTK4 Application instance
    app: Application,
    /// Backends and places shown in the sidebar
    registry: Rc<Registry>,
}

impl App {
    /// Creates a new App from a places file
    ///
    /// # Arguments
    ///
    /// * `places_path` - Path to the places file (`~` is expanded)
    ///
    /// # Returns
    ///
    /// * `Ok(App)` - Successfully initialised
    /// * `Err(String)` - The places file could not be loaded
    ///
    /// # Example
    ///
    /// ```no_run
    /// use keyring_sidebar::ui::App;
    /// use std::path::PathBuf;
    ///
    /// let app = App::new(
    ///     PathBuf::from("~/.config/keyring-sidebar/places.conf")
    /// )?;
    /// # Ok::<(), String>(())
    /// ```
    pub fn new(places_path: PathBuf) -> Result<Self, String> {
        let app = Application::builder()
            .application_id("com.tidynest.keyring-sidebar")
            .build();

        let registry = load_registry(&places_path)
            .map_err(|e| format!("Failed to load places: {}", e))?;

        Ok(Self {
            app,
            registry: Rc::new(registry),
        })
    }

    /// Runs the GTK4 application
    ///
    /// This starts the GTK4 main loop and blocks until the application exits.
    pub fn run(self) {
        let registry = self.registry.clone();

        self.app.connect_activate(move |app| {
            Self::build_ui(app, registry.clone());
        });

        self.app.run_with_args::<&str>(&[]);
    }

    /// Loads custom CSS styling for the application
    fn load_css() {
        let Some(display) = gdk::Display::default() else {
            warn!("No display, skipping custom CSS");
            return;
        };

        let provider = CssProvider::new();
        provider.load_from_string(include_str!("style.css"));

        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    /// Builds the main window UI
    fn build_ui(app: &Application, registry: Rc<Registry>) {
        Self::load_css();

        let sidebar = Sidebar::new(registry, Rc::new(GlibIdleScheduler::new()));
        debug!("Sidebar created with {} backends", sidebar.backends().len());

        let window = ApplicationWindow::builder()
            .application(app)
            .title("Keys and Places")
            .default_width(720)
            .default_height(520)
            .build();

        setup_quit_action(app);
        setup_combined_action(app, &sidebar);

        let paned = Paned::new(Orientation::Horizontal);

        let sidebar_view = SidebarView::new(sidebar.clone());
        paned.set_start_child(Some(sidebar_view.widget()));
        paned.set_resize_start_child(false);
        paned.set_shrink_start_child(false);

        let collection_panel = CollectionPanel::new(sidebar.clone());
        paned.set_end_child(Some(collection_panel.widget()));
        paned.set_resize_end_child(true);

        paned.set_position(260);
        window.set_child(Some(&paned));

        // Context menu: show what the row stands for
        let window_for_menu = window.clone();
        let sidebar_for_menu = sidebar.clone();
        sidebar.connect_context_menu(move |target| {
            let (message, detail) = match target {
                Some(place) => {
                    let info = place.info();
                    (info.label, format!("{}\n\n{}", info.uri, info.description))
                }
                None => match sidebar_for_menu.backends().first() {
                    Some(backend) => (backend.label(), backend.description()),
                    None => return,
                },
            };
            info!("Context menu for {}", message);

            let dialog = gtk4::AlertDialog::builder()
                .modal(true)
                .message(message)
                .detail(detail)
                .buttons(vec!["Close"])
                .build();
            dialog.show(Some(&window_for_menu));
        });

        // Views only hold weak references to themselves; the window keeps them
        let views = (sidebar_view.clone(), collection_panel.clone());

        // Drop model subscriptions with the window
        let sidebar_for_close = sidebar.clone();
        window.connect_close_request(move |_| {
            debug!("Window closing, disposing sidebar");
            let _views = &views;
            sidebar_for_close.dispose();
            glib::Propagation::Proceed
        });

        sidebar_view.list_box().grab_focus();
        window.present();
    }
}
