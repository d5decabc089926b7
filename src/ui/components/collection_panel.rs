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

//! Collection panel component
//!
//! Lists the places in the sidebar's union collection, the same set a
//! host would show objects from, with a toggle for the combined view.

use gtk4::{
    pango::EllipsizeMode, prelude::*, Align, Box as GtkBox, CheckButton, Frame, Label,
    Orientation, Separator,
};
use std::rc::Rc;

use crate::core::Sidebar;

/// A panel showing which places are active
pub struct CollectionPanel {
    /// Root widget (Frame)
    widget: Frame,
    /// Summary line ("2 places")
    summary_label: Label,
    /// One label per member
    members_box: GtkBox,
    /// Model being displayed
    sidebar: Sidebar,
}

impl CollectionPanel {
    /// Creates the panel and starts following the collection
    pub fn new(sidebar: Sidebar) -> Rc<Self> {
        let frame = Frame::builder()
            .label("Active places")
            .margin_start(10)
            .margin_end(10)
            .margin_top(10)
            .margin_bottom(10)
            .build();

        let vbox = GtkBox::new(Orientation::Vertical, 6);
        vbox.set_margin_start(10);
        vbox.set_margin_end(10);
        vbox.set_margin_top(10);
        vbox.set_margin_bottom(10);

        let summary_label = Label::builder().halign(Align::Start).build();
        summary_label.add_css_class("field-header");
        vbox.append(&summary_label);

        let members_box = GtkBox::new(Orientation::Vertical, 2);
        vbox.append(&members_box);

        vbox.append(&Separator::new(Orientation::Horizontal));

        // Bound to the stateful app.combined action
        let combined_check = CheckButton::builder()
            .label("Show all places")
            .action_name("app.combined")
            .build();
        vbox.append(&combined_check);

        frame.set_child(Some(&vbox));

        let panel = Rc::new(Self {
            widget: frame,
            summary_label,
            members_box,
            sidebar,
        });

        let weak = Rc::downgrade(&panel);
        panel.sidebar.connect_collection_changed(move || {
            if let Some(panel) = weak.upgrade() {
                panel.refresh();
            }
        });

        // Members keep their place when renamed; only the rows change
        let weak = Rc::downgrade(&panel);
        panel.sidebar.connect_rows_changed(move || {
            if let Some(panel) = weak.upgrade() {
                panel.refresh();
            }
        });

        panel.refresh();
        panel
    }

    /// Returns the root widget for adding to parent container
    pub fn widget(&self) -> &Frame {
        &self.widget
    }

    /// Redraws the member list
    pub fn refresh(&self) {
        while let Some(child) = self.members_box.first_child() {
            self.members_box.remove(&child);
        }

        let members = self.sidebar.collection().elements();
        self.summary_label.set_label(&format!(
            "{} place{}",
            members.len(),
            if members.len() == 1 { "" } else { "s" }
        ));

        for place in members {
            let label = Label::builder()
                .label(place.label())
                .tooltip_text(place.uri())
                .halign(Align::Start)
                .ellipsize(EllipsizeMode::End)
                .build();
            self.members_box.append(&label);
        }
    }
}
