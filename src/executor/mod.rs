// Copyright 2024 Belt Authors
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

//! The parallel per-batch executor (§4.4, §4.8, §5): batch planner,
//! worker dispatch over a shared `rayon` pool, cancellation and progress.
//!
//! `risingwave`'s own batch executors run atop an async/tokio scheduler,
//! which doesn't fit a synchronous, never-blocks-on-I/O, data-parallel
//! batch model. `rayon` (pulled in from the `sas7bdat-parser-rs` pack
//! example, which already leans on it for parallel row decoding) gives
//! the join-all-before-returning shape this executor needs without an
//! async runtime.

pub mod planner;
pub mod workload;

pub use planner::run_calculator;
pub use workload::Workload;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Lifecycle state of a single executor operation (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Active,
    Cancelled,
    Completed,
}

/// Execution context carrying a worker pool of parallelism `P` and an
/// `is_active()` flag (§4.4, §6).
#[derive(Clone)]
pub struct ExecutionContext {
    pool: Option<Arc<rayon::ThreadPool>>,
    parallelism: usize,
    cancelled: Arc<AtomicBool>,
    state: Arc<Mutex<ExecutionState>>,
}

impl ExecutionContext {
    /// Builds a dedicated pool with `parallelism` worker threads.
    pub fn with_parallelism(parallelism: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism.max(1))
            .build()
            .expect("failed to build worker pool");
        ExecutionContext {
            pool: Some(Arc::new(pool)),
            parallelism: parallelism.max(1),
            cancelled: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(ExecutionState::Active)),
        }
    }

    /// Uses the process-wide rayon global pool instead of a dedicated one.
    pub fn global() -> Self {
        ExecutionContext {
            pool: None,
            parallelism: rayon::current_num_threads(),
            cancelled: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(ExecutionState::Active)),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ExecutionState {
        *self.state.lock().expect("execution context mutex poisoned")
    }

    /// Flips the cancellation flag. Cooperative: in-flight batches finish,
    /// but no new batches are submitted and the operation surfaces
    /// `BeltError::Aborted`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        *self.state.lock().expect("execution context mutex poisoned") = ExecutionState::Cancelled;
        debug!("execution context cancelled");
    }

    pub(crate) fn mark_completed(&self) {
        let mut state = self.state.lock().expect("execution context mutex poisoned");
        if *state == ExecutionState::Active {
            *state = ExecutionState::Completed;
        }
    }

    pub(crate) fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_active_and_cancels() {
        let ctx = ExecutionContext::global();
        assert!(ctx.is_active());
        assert_eq!(ctx.state(), ExecutionState::Active);
        ctx.cancel();
        assert!(!ctx.is_active());
        assert_eq!(ctx.state(), ExecutionState::Cancelled);
    }

    #[test]
    fn completes_when_not_cancelled() {
        let ctx = ExecutionContext::global();
        ctx.mark_completed();
        assert_eq!(ctx.state(), ExecutionState::Completed);
    }
}
