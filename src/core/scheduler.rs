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

//! src/core/scheduler.rs
//!
//! Deferred work on the host's event loop
//!
//! Row rebuilds are not done inside change notifications; they are queued
//! for the next idle turn. The sidebar only needs "run this later on the
//! same thread", which is what `IdleScheduler` expresses. The GTK front end
//! implements it with a glib idle source; tests use `ManualScheduler` and
//! decide themselves when the idle turn happens.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

/// A unit of deferred work
pub type IdleTask = Box<dyn FnOnce() + 'static>;

/// Runs tasks later, on the thread that scheduled them
pub trait IdleScheduler {
    fn schedule_idle(&self, task: IdleTask);
}

/// Scheduler that queues tasks until `run_pending` is called
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<IdleTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs one idle turn: every task queued before the call
    ///
    /// Tasks scheduled while the turn runs wait for the next turn.
    /// Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let count = self.pending();
        for _ in 0..count {
            // Do not hold the queue borrow while the task runs
            let task = self.queue.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
        count
    }
}

impl IdleScheduler for ManualScheduler {
    fn schedule_idle(&self, task: IdleTask) {
        self.queue.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
