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

//! Sidebar list component
//!
//! Shows one heading per backend followed by its places. Each place row
//! carries a check box whose visibility and state come from the model;
//! clicking a row selects its place, ticking the box checks it.

use gtk4::{
    gdk, prelude::*, Align, Box as GtkBox, CheckButton, EventControllerFocus,
    EventControllerKey, GestureClick, Image, Label, ListBox, ListBoxRow, Orientation,
    ScrolledWindow,
};
use log::{debug, trace};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use crate::core::{CheckState, Row, RowId, Sidebar};

const FALLBACK_ICON: &str = "folder-symbolic";

/// Widgets making up one sidebar row
struct RowWidgets {
    list_row: ListBoxRow,
    label: Label,
    /// `None` for backend headings
    icon: Option<Image>,
    /// `None` for backend headings
    check: Option<CheckButton>,
}

impl RowWidgets {
    /// Copies display data of a reused row into its widgets
    fn update(&self, row: &Row) {
        self.label.set_label(row.label());
        self.list_row.set_tooltip_text(tooltip_of(row));
        if let Some(icon) = &self.icon {
            icon.set_icon_name(Some(row.icon().unwrap_or(FALLBACK_ICON)));
        }
        if row.editable() {
            self.label.add_css_class("editable-place");
        } else {
            self.label.remove_css_class("editable-place");
        }
    }
}

fn tooltip_of(row: &Row) -> Option<&str> {
    Some(row.tooltip()).filter(|tip| !tip.is_empty())
}

/// Scrollable list view of a sidebar
pub struct SidebarView {
    /// Root widget (scrollable container)
    widget: ScrolledWindow,
    /// List box containing one row per sidebar row
    list_box: ListBox,
    /// Model being displayed
    sidebar: Sidebar,
    /// Widgets of every shown row, by row id
    widgets: RefCell<HashMap<RowId, RowWidgets>>,
    /// Row ids in the order they are shown
    shown: RefCell<Vec<RowId>>,
    /// Whether keyboard focus is inside the list
    has_focus: Cell<bool>,
    /// Set while the view itself changes widgets, to ignore their signals
    updating: Cell<bool>,
}

impl SidebarView {
    /// Creates the view and starts following the sidebar
    ///
    /// # Example
    /// ```no_run
    /// use keyring_sidebar::core::{Registry, Sidebar};
    /// use keyring_sidebar::ui::components::SidebarView;
    /// use keyring_sidebar::ui::GlibIdleScheduler;
    /// use std::rc::Rc;
    ///
    /// let sidebar = Sidebar::new(Rc::new(Registry::new()), Rc::new(GlibIdleScheduler::new()));
    /// let view = SidebarView::new(sidebar);
    /// ```
    pub fn new(sidebar: Sidebar) -> Rc<Self> {
        let scrolled_window = ScrolledWindow::builder()
            .hexpand(false)
            .vexpand(true)
            .min_content_width(220)
            .build();

        let list_box = ListBox::builder()
            .selection_mode(gtk4::SelectionMode::Single)
            .build();
        list_box.add_css_class("navigation-sidebar");

        scrolled_window.set_child(Some(&list_box));

        let view = Rc::new(Self {
            widget: scrolled_window,
            list_box,
            sidebar,
            widgets: RefCell::new(HashMap::new()),
            shown: RefCell::new(Vec::new()),
            has_focus: Cell::new(false),
            updating: Cell::new(false),
        });

        view.connect_model();
        view.connect_widgets();
        view.refresh();
        view
    }

    /// Returns the root widget for adding to parent container
    pub fn widget(&self) -> &ScrolledWindow {
        &self.widget
    }

    pub fn list_box(&self) -> &ListBox {
        &self.list_box
    }

    /// Catches up with the model's rows
    ///
    /// Rows that kept their id keep their widgets and only get their label,
    /// tooltip and icon refreshed. Only vanished rows are removed and only
    /// new rows are created.
    pub fn refresh(self: &Rc<Self>) {
        self.updating.set(true);

        let changes = self.sidebar.row_changes_since(&self.shown.borrow());
        let rows = self.sidebar.rows();

        let removed: Vec<RowWidgets> = {
            let mut widgets = self.widgets.borrow_mut();
            changes
                .removed
                .iter()
                .filter_map(|id| widgets.remove(id))
                .collect()
        };
        for row_widgets in &removed {
            self.list_box.remove(&row_widgets.list_row);
        }

        for (index, row) in rows.iter().enumerate() {
            if let Some(existing) = self.widgets.borrow().get(&row.id()) {
                existing.update(row);
                continue;
            }
            let created = self.create_row(row);
            self.list_box.insert(&created.list_row, index as i32);
            self.widgets.borrow_mut().insert(row.id(), created);
        }

        *self.shown.borrow_mut() = rows.iter().map(Row::id).collect();
        debug!(
            "Sidebar view shows {} rows ({} removed, {} added)",
            rows.len(),
            changes.removed.len(),
            changes.inserted.len()
        );

        let cursor_row = self
            .sidebar
            .cursor()
            .and_then(|index| self.list_box.row_at_index(index as i32));
        if self.list_box.selected_row() != cursor_row {
            self.list_box.select_row(cursor_row.as_ref());
        }

        self.updating.set(false);
        self.refresh_checks();
    }

    /// Brings check boxes in line with the selection
    pub fn refresh_checks(&self) {
        self.updating.set(true);

        let widgets = self.widgets.borrow();
        for (index, row) in self.sidebar.rows().iter().enumerate() {
            let Some(check) = widgets.get(&row.id()).and_then(|w| w.check.as_ref()) else {
                continue;
            };
            match self.sidebar.check_state(index, self.has_focus.get()) {
                CheckState::Hidden => check.set_visible(false),
                CheckState::Unchecked => {
                    check.set_active(false);
                    check.set_visible(true);
                }
                CheckState::Checked => {
                    check.set_active(true);
                    check.set_visible(true);
                }
            }
        }
        drop(widgets);

        self.updating.set(false);
    }

    /// Create the widgets of a single row, with a check box for place rows
    fn create_row(self: &Rc<Self>, row: &Row) -> RowWidgets {
        let content = GtkBox::builder()
            .orientation(Orientation::Horizontal)
            .spacing(6)
            .margin_start(if row.is_backend() { 6 } else { 18 })
            .margin_end(6)
            .margin_top(3)
            .margin_bottom(3)
            .build();

        let list_row = ListBoxRow::builder()
            .selectable(row.is_selectable())
            .activatable(row.is_selectable())
            .child(&content)
            .build();
        list_row.set_tooltip_text(tooltip_of(row));

        if row.is_backend() {
            let heading = Label::builder()
                .label(row.label())
                .xalign(0.0)
                .hexpand(true)
                .build();
            heading.add_css_class("heading");
            heading.add_css_class("backend-heading");
            content.append(&heading);
            return RowWidgets {
                list_row,
                label: heading,
                icon: None,
                check: None,
            };
        }

        let icon = Image::from_icon_name(row.icon().unwrap_or(FALLBACK_ICON));
        content.append(&icon);

        let label = Label::builder()
            .label(row.label())
            .xalign(0.0)
            .hexpand(true)
            .build();
        if row.editable() {
            label.add_css_class("editable-place");
        }
        content.append(&label);

        let check = CheckButton::builder()
            .valign(Align::Center)
            .visible(false)
            .build();
        let weak = Rc::downgrade(self);
        let id = row.id();
        check.connect_toggled(move |_| {
            let Some(view) = weak.upgrade() else {
                return;
            };
            if view.updating.get() {
                return;
            }
            // The row may have moved since the box was created
            if let Some(index) = view.sidebar.row_position(id) {
                trace!("Check box toggled on row {}", index);
                view.sidebar.toggle_row(index);
            }
        });
        content.append(&check);

        RowWidgets {
            list_row,
            label,
            icon: Some(icon),
            check: Some(check),
        }
    }

    /// Follows rebuilds and selection changes of the model
    fn connect_model(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.sidebar.connect_rows_changed(move || {
            if let Some(view) = weak.upgrade() {
                view.refresh();
            }
        });

        let weak = Rc::downgrade(self);
        self.sidebar.connect_collection_changed(move || {
            if let Some(view) = weak.upgrade() {
                view.refresh_checks();
            }
        });

        let weak = Rc::downgrade(self);
        self.sidebar.connect_selection_changed(move || {
            if let Some(view) = weak.upgrade() {
                view.refresh_checks();
            }
        });
    }

    /// Forwards clicks, keys and focus changes to the model
    fn connect_widgets(self: &Rc<Self>) {
        // Row selection
        let weak = Rc::downgrade(self);
        self.list_box.connect_row_selected(move |_, row| {
            let Some(view) = weak.upgrade() else {
                return;
            };
            if view.updating.get() {
                return;
            }
            view.sidebar.select_row(row.map(|row| row.index() as usize));
            view.refresh_checks();
        });

        // Focus decides whether the selected row shows its check box
        let focus = EventControllerFocus::new();
        let weak = Rc::downgrade(self);
        focus.connect_enter(move |_| {
            if let Some(view) = weak.upgrade() {
                view.has_focus.set(true);
                view.refresh_checks();
            }
        });
        let weak = Rc::downgrade(self);
        focus.connect_leave(move |_| {
            if let Some(view) = weak.upgrade() {
                view.has_focus.set(false);
                view.refresh_checks();
            }
        });
        self.list_box.add_controller(focus);

        // Secondary click opens the context menu of the row under the pointer
        let gesture = GestureClick::new();
        gesture.set_button(gdk::BUTTON_SECONDARY);
        let weak = Rc::downgrade(self);
        gesture.connect_pressed(move |_, _, _, y| {
            let Some(view) = weak.upgrade() else {
                return;
            };
            if let Some(row) = view.list_box.row_at_y(y as i32) {
                view.sidebar.request_context_menu_at(row.index() as usize);
            }
        });
        self.list_box.add_controller(gesture);

        // Menu key and Shift+F10 open it for the cursor row
        let keys = EventControllerKey::new();
        let weak = Rc::downgrade(self);
        keys.connect_key_pressed(move |_, key, _, modifiers| {
            let Some(view) = weak.upgrade() else {
                return glib::Propagation::Proceed;
            };
            let shift_f10 = key == gdk::Key::F10 && modifiers.contains(gdk::ModifierType::SHIFT_MASK);
            if key == gdk::Key::Menu || shift_f10 {
                if let Some(row) = view.list_box.focus_child().and_downcast::<ListBoxRow>() {
                    view.sidebar.set_cursor(Some(row.index() as usize));
                }
                view.sidebar.request_context_menu();
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
        self.list_box.add_controller(keys);
    }
}
