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

//! src/core/mod.rs
//!
//! Core sidebar logic
//!
//! This module contains everything the sidebar does that does not depend
//! on a widget toolkit:
//! - Backend and place types with change notification
//! - Backend ordering and the row list builder
//! - Selection aggregation into a single union collection
//! - Idle-coalesced rebuild scheduling
//! - The places description file parser
//!
//! All of it is unit-tested without a display server.

pub mod collection;
pub mod ordering;
pub mod parser;
pub mod registry;
pub mod rows;
pub mod scheduler;
pub mod selection;
pub mod sidebar;
pub mod signal;
pub mod types;

pub use collection::UnionCollection;
pub use registry::Registry;
pub use rows::{CheckState, Row, RowChanges, RowId, RowKey, RowKind, RowList};
pub use scheduler::{IdleScheduler, ManualScheduler};
pub use selection::{SelectionModel, SelectionUpdate};
pub use sidebar::{RowSnapshot, RowType, Sidebar, SidebarSnapshot};
pub use signal::{HandlerId, Signal};
pub use types::{Backend, BackendId, Place, PlaceId, PlaceInfo};

#[cfg(test)]
mod tests;
