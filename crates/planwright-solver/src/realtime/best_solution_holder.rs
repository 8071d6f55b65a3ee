//! Versioned single-slot mailbox between the solver thread and the consumer.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;
use planwright_core::domain::PlanningSolution;
use tracing::trace;

use super::future::{problem_change_channel, ProblemChangeCompleter, ProblemChangeFuture};
use super::problem_change::BoxedProblemChange;
use super::solver_handle::{ProblemChangeResult, SolverHandle};
use crate::error::ProblemChangeError;

/// A best solution taken from the holder, with the changes it is known to contain.
#[derive(Debug)]
pub struct VersionedBestSolution<S> {
    pub solution: S,
    pub version: u64,
    pub changes: Vec<ProblemChangeCompleter>,
}

impl<S> VersionedBestSolution<S> {
    /// Completes every change contained in this solution.
    pub fn complete_changes(&mut self) {
        for change in self.changes.drain(..) {
            change.complete();
        }
    }

    pub fn fail_changes(&mut self, error: &ProblemChangeError) {
        for change in self.changes.drain(..) {
            change.fail(error.clone());
        }
    }
}

struct HolderState<S> {
    slot: Option<(S, u64)>,
    pending: BTreeMap<u64, Vec<ProblemChangeCompleter>>,
    version: u64,
}

/// Holds at most one best solution, co-versioned with pending problem changes.
///
/// Versions count from 0. A change registers at the current counter value.
/// A stored solution takes the current counter value and the counter then
/// advances, so the first stored solution has version 0 and leaves the
/// counter at 1. A solution contains every change registered at or below its
/// version. All state sits behind one lock that is never held across user
/// code.
pub struct BestSolutionHolder<S> {
    state: Mutex<HolderState<S>>,
}

impl<S: PlanningSolution> BestSolutionHolder<S> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HolderState {
                slot: None,
                pending: BTreeMap::new(),
                version: 0,
            }),
        }
    }

    /// Stores `solution` unless a problem change is still in flight.
    ///
    /// `is_every_change_processed` is evaluated under the lock, so a change
    /// cannot be registered between the check and the store. Returns whether
    /// the solution was stored.
    pub fn set(&self, solution: S, is_every_change_processed: impl FnOnce() -> bool) -> bool {
        let mut state = self.state.lock();
        if !is_every_change_processed() {
            trace!(event = "best_solution_rejected", version = state.version);
            return false;
        }
        let version = state.version;
        state.slot = Some((solution, version));
        state.version += 1;
        true
    }

    /// Registers `change` at the current version and submits it to the solver.
    ///
    /// A submission the solver does not accept resolves the future right away.
    pub fn add_problem_change(
        &self,
        handle: &SolverHandle<S>,
        change: BoxedProblemChange<S>,
    ) -> ProblemChangeFuture {
        let mut state = self.state.lock();
        match handle.add_problem_change_boxed(change) {
            ProblemChangeResult::Queued => {
                let (completer, future) = problem_change_channel();
                let version = state.version;
                state.pending.entry(version).or_default().push(completer);
                future
            }
            ProblemChangeResult::SolverNotRunning | ProblemChangeResult::Disconnected => {
                ProblemChangeFuture::resolved(Err(ProblemChangeError::SolverNotRunning))
            }
        }
    }

    /// Empties the slot, returning the solution and every change it contains.
    pub fn take(&self) -> Option<VersionedBestSolution<S>> {
        let mut state = self.state.lock();
        let (solution, version) = state.slot.take()?;
        let newer = state.pending.split_off(&(version + 1));
        let contained = std::mem::replace(&mut state.pending, newer);
        Some(VersionedBestSolution {
            solution,
            version,
            changes: contained.into_values().flatten().collect(),
        })
    }

    /// Cancels every outstanding change.
    pub fn cancel_pending_changes(&self) {
        let pending = std::mem::take(&mut self.state.lock().pending);
        for change in pending.into_values().flatten() {
            change.cancel();
        }
    }

    pub fn has_solution(&self) -> bool {
        self.state.lock().slot.is_some()
    }

    pub fn pending_change_count(&self) -> usize {
        self.state.lock().pending.values().map(Vec::len).sum()
    }

    /// The version the next stored solution will carry.
    pub fn current_version(&self) -> u64 {
        self.state.lock().version
    }
}

impl<S: PlanningSolution> Default for BestSolutionHolder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for BestSolutionHolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BestSolutionHolder")
            .field("version", &state.version)
            .field("slot_version", &state.slot.as_ref().map(|(_, v)| *v))
            .field("pending", &state.pending.len())
            .finish()
    }
}
