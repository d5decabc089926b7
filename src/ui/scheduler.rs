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

//! Idle scheduling on the GLib main loop

use crate::core::scheduler::{IdleScheduler, IdleTask};

/// Runs deferred sidebar work from the default main context
///
/// Tasks run on the next idle iteration of the thread-default main loop,
/// so the sidebar must live on the GTK main thread.
#[derive(Debug, Default)]
pub struct GlibIdleScheduler;

impl GlibIdleScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl IdleScheduler for GlibIdleScheduler {
    fn schedule_idle(&self, task: IdleTask) {
        glib::idle_add_local_once(task);
    }
}
