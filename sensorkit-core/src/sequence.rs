//! Timed edge sequences for digital inputs
//!
//! Debounced buttons, short/long presses and multi-tap patterns all reduce to
//! the same shape: the line must hold a level for a bounded time before
//! flipping to the opposite one, step after step. [`EdgeSequencer`] captures
//! that shape as a pure state machine: the caller feeds it timestamped edges
//! (from a pin interrupt or from a sampled digital sensor) and registered
//! actions fire when a step's persistence bounds are respected.
//!
//! Starting from the configured rest level, the first edge away from rest
//! arms the timing for step 0. When the line flips back, the elapsed time is
//! classified:
//!
//! - shorter than the step minimum: noise, the sequence restarts
//! - longer than the step maximum: the too-long action fires (first step
//!   only), then the sequence restarts
//! - within bounds: the step action fires and the same edge arms the next
//!   step, whose measured level is the opposite one
//!
//! ```rust
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use sensorkit_core::sequence::EdgeSequencer;
//!
//! let presses = Rc::new(Cell::new(0));
//! let counter = presses.clone();
//!
//! // Active-high button: count presses held between 50 and 1000 ms
//! let mut button: EdgeSequencer<1> = EdgeSequencer::rise_and_fall(50, 1000, move || {
//!     counter.set(counter.get() + 1);
//! });
//!
//! button.on_edge(true, 10_000);  // pressed
//! button.on_edge(false, 10_120); // released after 120 ms
//! assert_eq!(presses.get(), 1);
//!
//! button.on_edge(true, 11_000);  // bounce
//! button.on_edge(false, 11_004);
//! assert_eq!(presses.get(), 1);
//! ```

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

#[cfg(feature = "std")]
use std::boxed::Box;

use heapless::Vec;

use crate::errors::{SensorError, SensorResult};
use crate::time::Timestamp;

/// Callback fired when a sequence step completes within bounds
pub type StepAction = Box<dyn FnMut()>;

/// Persistence bounds for one sequence step, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepBounds {
    /// Minimum time the level must persist to count as a real event
    pub min_ms: u32,
    /// Maximum time before the step is abandoned
    pub max_ms: u32,
}

/// State machine recognizing timed level sequences on a digital line
///
/// `S` is the compile-time step capacity.
pub struct EdgeSequencer<const S: usize> {
    rest_level: bool,
    steps: Vec<(StepBounds, Option<StepAction>), S>,
    too_long: Option<StepAction>,
    step: usize,
    armed_at: Option<Timestamp>,
}

impl<const S: usize> EdgeSequencer<S> {
    /// Create a sequencer with no steps, resting at `rest_level`
    pub fn new(rest_level: bool) -> Self {
        Self {
            rest_level,
            steps: Vec::new(),
            too_long: None,
            step: 0,
            armed_at: None,
        }
    }

    /// Single-step recognizer for a low line pulsing high
    pub fn rise_and_fall<F>(min_ms: u32, max_ms: u32, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let mut seq = Self::new(false);
        // Capacity S >= 1 is the caller's choice of const parameter
        let _ = seq.add_step(min_ms, max_ms, action);
        seq
    }

    /// Single-step recognizer for a high line pulsing low
    pub fn fall_and_rise<F>(min_ms: u32, max_ms: u32, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let mut seq = Self::new(true);
        let _ = seq.add_step(min_ms, max_ms, action);
        seq
    }

    /// Append a step with its persistence bounds and completion action
    pub fn add_step<F>(&mut self, min_ms: u32, max_ms: u32, action: F) -> SensorResult<&mut Self>
    where
        F: FnMut() + 'static,
    {
        self.steps
            .push((StepBounds { min_ms, max_ms }, Some(Box::new(action))))
            .map_err(|_| SensorError::Capacity("sequence steps"))?;
        Ok(self)
    }

    /// Set the action fired when the first step's maximum bound is exceeded
    pub fn on_too_long<F>(&mut self, action: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.too_long = Some(Box::new(action));
        self
    }

    /// Index of the step currently being timed
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// True while a step's entry edge has been seen and timing is running
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Abandon any in-flight timing and restart from step 0
    pub fn reset(&mut self) {
        self.step = 0;
        self.armed_at = None;
    }

    /// Level whose persistence the given step measures
    fn measured_level(&self, step: usize) -> bool {
        if step % 2 == 0 {
            !self.rest_level
        } else {
            self.rest_level
        }
    }

    /// Feed one timestamped edge: the line is now at `level` since `at`
    ///
    /// Edges that do not match the expected transition (repeated levels,
    /// glitches reported out of order) are ignored.
    pub fn on_edge(&mut self, level: bool, at: Timestamp) {
        if self.steps.is_empty() {
            return;
        }

        let measured = self.measured_level(self.step);
        match self.armed_at {
            None => {
                if level == measured {
                    self.armed_at = Some(at);
                }
            }
            Some(entered) => {
                if level == measured {
                    return;
                }
                let elapsed = at.saturating_sub(entered);
                let bounds = self.steps[self.step].0;

                if elapsed < bounds.min_ms as u64 {
                    self.reset();
                } else if elapsed > bounds.max_ms as u64 {
                    if self.step == 0 {
                        if let Some(action) = self.too_long.as_mut() {
                            action();
                        }
                    }
                    self.reset();
                } else {
                    if let Some(action) = self.steps[self.step].1.as_mut() {
                        action();
                    }
                    self.step += 1;
                    if self.step >= self.steps.len() {
                        self.reset();
                    } else {
                        // Leaving one measured level is entering the next
                        // step's, so the exit edge also arms the next step
                        self.armed_at = Some(at);
                    }
                }
            }
        }
    }
}
