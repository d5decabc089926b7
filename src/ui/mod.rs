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

//! GTK4 user interface over the sidebar model
//!
//! # Architecture
//!
//! - **Model**: `Sidebar` and its registry (in the `core` module)
//! - **View**: GTK4 components (in `components/` submodule)
//! - **Scheduling**: Deferred rebuilds run on the GLib main loop
//!
//! # Module Structure
//!
//! ```text
//! ui/
//! ├── mod.rs          // This file - exports
//! ├── app.rs          // GTK4 Application setup
//! ├── actions.rs      // GTK action setup (quit, combined view)
//! ├── scheduler.rs    // GLib idle scheduler
//! └── components/     // Sidebar list and collection panel
//! ```

mod actions;
pub mod app;
pub mod components;
pub mod scheduler;

pub use {app::App, scheduler::GlibIdleScheduler};
