//! Cancellable step sequencer for staged transitions.
//!
//! A transition is declared as a finite list of [`Step`]s, each holding an
//! action and a delay relative to the step before it. [`Timeline::schedule`]
//! turns the list into absolute deadlines; the owner advances the timeline by
//! calling [`Timeline::pop_due`] with the current instant and applying the
//! returned actions. Nothing here spawns threads or sleeps, so a caller can
//! drive the same timeline from a real-time loop or from a test with
//! fabricated instants.
//!
//! At most one transition is meant to be live at a time: callers start a new
//! transition by calling [`Timeline::cancel_all`] first, which drops every
//! step left over from the previous one.

use std::time::{Duration, Instant};

/// One step of a staged transition.
///
/// `delay` is measured from the preceding step in the same sequence (from the
/// scheduling instant for the first step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<A> {
    pub delay: Duration,
    pub action: A,
}

impl<A> Step<A> {
    pub fn new(delay: Duration, action: A) -> Step<A> {
        Step { delay, action }
    }
}

#[derive(Debug)]
struct Scheduled<A> {
    due: Instant,
    action: A,
}

/// Pending steps of the transition currently in flight.
#[derive(Debug)]
pub struct Timeline<A> {
    pending: Vec<Scheduled<A>>,
}

impl<A> Timeline<A> {
    pub fn new() -> Timeline<A> {
        Timeline {
            pending: Vec::new(),
        }
    }

    /// Schedules a sequence of steps starting at `now`.
    ///
    /// Delays accumulate: a sequence of 300, 100 and 500 ms steps becomes
    /// deadlines at `now` + 300, 400 and 900 ms.
    pub fn schedule<I>(&mut self, now: Instant, steps: I)
    where
        I: IntoIterator<Item = Step<A>>,
    {
        let mut due = now;
        for step in steps {
            due += step.delay;
            self.pending.push(Scheduled {
                due,
                action: step.action,
            });
        }
    }

    /// Drops every pending step.
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(cancelled = self.pending.len(), "dropping pending steps");
            self.pending.clear();
        }
    }

    /// Removes and returns every step whose deadline is at or before `now`,
    /// earliest deadline first. Steps sharing a deadline keep their
    /// scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Vec<A> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let mut due = Vec::new();
        let mut rest = Vec::with_capacity(self.pending.len());
        for scheduled in self.pending.drain(..) {
            if scheduled.due <= now {
                due.push(scheduled);
            } else {
                rest.push(scheduled);
            }
        }
        self.pending = rest;
        due.sort_by_key(|scheduled| scheduled.due);
        due.into_iter().map(|scheduled| scheduled.action).collect()
    }

    /// Earliest pending deadline, if any. Lets a real-time driver pick its
    /// wake-up timeout.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|scheduled| scheduled.due).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Timeline::new()
    }
}
