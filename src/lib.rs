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

//! Keyring Sidebar
//!
//! The backend/place sidebar of a key and certificate manager, as a
//! toolkit-independent model with an optional GTK4 view.
//!
//! # Features
//!
//! - **Grouped rows:** One heading per backend (keyrings, PGP, PKCS#11, SSH)
//!   followed by its places, in a fixed backend order
//! - **Single or multiple selection:** Focus one place, or tick several
//! - **Union collection:** A live set of the places currently shown
//! - **Persistence:** Selected uris round-trip through `selected_uris`
//! - **Coalesced rebuilds:** Bursts of backend/place changes cost one rebuild
//!
//! # Architecture
//!
//! - **`core`:** Model (backends, places, rows, selection, sidebar)
//! - **`config`:** Loading a registry from a places file
//! - **`ui`:** GTK4 view over the sidebar (feature `gtk`)
//!
//! # Examples
//!
//! ## Restoring a selection
//!
//! ```
//! use keyring_sidebar::config::registry_from_str;
//! use keyring_sidebar::core::{ManualScheduler, Sidebar};
//! use std::rc::Rc;
//!
//! let registry = registry_from_str(
//!     "backend = openpgp, PGP Keys\n\
//!      place = gnupg://, GnuPG keyring\n\
//!      backend = openssh, Secure Shell\n\
//!      place = file:///home/me/.ssh, OpenSSH keys\n",
//! )?;
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let sidebar = Sidebar::new(Rc::new(registry), scheduler.clone());
//! scheduler.run_pending();
//!
//! sidebar.set_selected_uris(["gnupg://", "file:///home/me/.ssh"]);
//! assert_eq!(sidebar.collection().len(), 2);
//! assert_eq!(sidebar.checked_places().len(), 2);
//! # Ok::<(), keyring_sidebar::config::ConfigError>(())
//! ```
//!
//! ## Using the GUI
//!
//! ```no_run
//! # #[cfg(feature = "gtk")]
//! # {
//! use keyring_sidebar::ui::App;
//! use std::path::PathBuf;
//!
//! let app = App::new(PathBuf::from("~/.config/keyring-sidebar/places.conf"))?;
//! app.run(); // Blocks until window closes
//! # }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
#[cfg(feature = "gtk")]
pub mod ui;

// Re-export commonly used types for convenience
pub use core::{Backend, Place, PlaceInfo, Registry, Sidebar};
