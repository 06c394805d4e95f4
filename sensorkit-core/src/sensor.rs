//! The sensor core: acquisition pipeline, hooks and sampling lifecycle
//!
//! ## Overview
//!
//! A [`Sensor`] binds one input source to a rolling window of samples,
//! derived statistics and two hook lists. Every acquisition, manual or
//! timer-driven, runs the same pipeline:
//!
//! ```text
//! source read ──► normalize? ──► push into window ──► recompute statistics
//!                                                          │
//!                         every-sample actions ◄───────────┤
//!                         (condition, action) pairs ◄──────┘
//! ```
//!
//! A failed read aborts before the push: nothing is buffered and no hook
//! runs. Hooks and the normalization function observe the sensor through
//! [`SensorState`] (the buffer/statistics view), so they can inspect
//! everything but cannot touch the hook lists they are running from.
//!
//! ## Lifecycle
//!
//! A sensor is `Idle` until its first acquisition. Calling `sample_raw` or
//! `sample_normalized` directly puts it in `Manual` mode; `start_sampling`
//! arms a repeating timer and puts it in `Sampling` mode, where the runtime
//! calls [`Sensor::tick`] on each timer expiry. `stop_sampling` cancels the
//! timer in sampling mode, and in manual mode resets the window and
//! statistics instead.
//!
//! ## Example
//!
//! ```rust
//! use sensorkit_core::{Sensor, SensorError};
//! use sensorkit_core::source::ScriptedSource;
//! use sensorkit_core::time::ManualTimer;
//!
//! let source = ScriptedSource::new(&[10.0, 20.0, 30.0]);
//! let mut sensor: Sensor<_, _, 8> = Sensor::analog(source, ManualTimer::new());
//! sensor.set_observation_window(3)?;
//!
//! sensor.sample_raw()?;
//! sensor.sample_raw()?;
//! sensor.sample_raw()?;
//!
//! assert_eq!(sensor.current_sample(), Some(30.0));
//! assert_eq!(sensor.previous_sample(), Some(20.0));
//! assert_eq!(sensor.stats().average, Some(20.0));
//! assert_eq!(sensor.stats().min, Some(10.0));
//! assert_eq!(sensor.stats().max, Some(30.0));
//! # Ok::<(), SensorError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

#[cfg(feature = "std")]
use std::boxed::Box;

use heapless::Vec;

use crate::{
    buffer::WindowBuffer,
    errors::{ReadError, SensorError, SensorResult},
    source::SampleSource,
    stats::{EvalPolicy, WindowStats},
    time::{Delay, SamplingTimer, TimeUnit},
};

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! sensor_log {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! sensor_log {
    ($($arg:tt)*) => {};
}

/// Maximum number of every-sample actions per sensor
pub const MAX_SAMPLE_ACTIONS: usize = 8;

/// Maximum number of (condition, action) pairs per sensor
pub const MAX_CHECKS: usize = 8;

/// Unconditional hook run after every committed acquisition
pub type SampleAction<const N: usize> = Box<dyn FnMut(&SensorState<N>)>;

/// Predicate deciding whether its paired action runs
pub type CheckCondition<const N: usize> = Box<dyn FnMut(&SensorState<N>) -> bool>;

/// Normalization function: (raw value, pre-update state) → normalized value
pub type NormFunc<const N: usize> = Box<dyn FnMut(f32, &SensorState<N>) -> f32>;

/// Which acquisition a sampling session performs on each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcquisitionKind {
    /// Store raw source values
    Raw,
    /// Pass each raw value through the normalization function first
    Normalized,
}

/// Sensor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplingState {
    /// No acquisition performed yet
    Idle,
    /// Caller-driven acquisitions, no timer
    Manual,
    /// Timer-driven acquisitions
    Sampling,
}

/// The window, statistics and configuration view of a sensor
///
/// This is what hooks and the normalization function receive. It carries
/// everything observable about the sensor except the hook lists themselves,
/// which keeps callback re-entry impossible by construction.
pub struct SensorState<const N: usize> {
    pub(crate) buffer: WindowBuffer<N>,
    pub(crate) stats: WindowStats,
    pub(crate) policy: EvalPolicy,
    pub(crate) interval_us: Option<u64>,
    pub(crate) lifecycle: SamplingState,
}

impl<const N: usize> SensorState<N> {
    fn new(policy: EvalPolicy) -> Self {
        Self {
            buffer: WindowBuffer::new(),
            stats: WindowStats::default(),
            policy,
            interval_us: None,
            lifecycle: SamplingState::Idle,
        }
    }

    /// Most recently acquired sample, `None` before the first acquisition
    pub fn current_sample(&self) -> Option<f32> {
        self.buffer.last()
    }

    /// Second most recent sample, `None` with fewer than two samples
    pub fn previous_sample(&self) -> Option<f32> {
        self.buffer.previous()
    }

    /// Derived statistics for the current window contents
    pub fn stats(&self) -> &WindowStats {
        &self.stats
    }

    /// The sample window itself, oldest to newest
    pub fn buffer(&self) -> &WindowBuffer<N> {
        &self.buffer
    }

    /// Evaluation policy currently in effect
    pub fn policy(&self) -> &EvalPolicy {
        &self.policy
    }

    /// Observation window length
    pub fn window(&self) -> usize {
        self.buffer.window()
    }

    /// Lifecycle state
    pub fn sampling_state(&self) -> SamplingState {
        self.lifecycle
    }

    /// True while a sampling session is active
    pub fn is_sampling(&self) -> bool {
        self.lifecycle == SamplingState::Sampling
    }

    /// Interval between automatic acquisitions, if configured
    pub fn sampling_interval_us(&self) -> Option<u64> {
        self.interval_us
    }

    fn recompute(&mut self) {
        self.stats
            .recompute(&self.buffer, &self.policy, self.interval_us);
    }
}

/// Armed sampling session: timer handle plus the acquisition kind per tick.
/// Taking the handle out of the `Option` is the only way to cancel, so a
/// double stop is a no-op and no tick can race a confirmed cancellation.
struct Session<H> {
    handle: H,
    kind: AcquisitionKind,
}

/// One input wrapped with windowed sampling, statistics and hooks
///
/// Type parameters: the input source `S`, the timer capability `T`, and the
/// compile-time window capacity `N` (the observation window can be any length
/// up to `N` at runtime).
pub struct Sensor<S, T, const N: usize>
where
    S: SampleSource,
    T: SamplingTimer,
{
    source: S,
    timer: T,
    state: SensorState<N>,
    norm: Option<NormFunc<N>>,
    actions: Vec<SampleAction<N>, MAX_SAMPLE_ACTIONS>,
    checks: Vec<(CheckCondition<N>, SampleAction<N>), MAX_CHECKS>,
    session: Option<Session<T::Handle>>,
}

impl<S, T, const N: usize> core::fmt::Debug for Sensor<S, T, N>
where
    S: SampleSource,
    T: SamplingTimer,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sensor")
            .field("actions", &self.actions.len())
            .field("checks", &self.checks.len())
            .finish()
    }
}

impl<S, T, const N: usize> Sensor<S, T, N>
where
    S: SampleSource,
    T: SamplingTimer,
{
    /// Create a sensor with nothing maintained (all policy flags off)
    pub fn new(source: S, timer: T) -> Self {
        Self::with_policy(source, timer, EvalPolicy::disabled())
    }

    /// Create a sensor with analog defaults: average, trend and min/max
    pub fn analog(source: S, timer: T) -> Self {
        Self::with_policy(source, timer, EvalPolicy::analog())
    }

    /// Create a sensor with digital defaults: full-precision average only
    pub fn digital(source: S, timer: T) -> Self {
        Self::with_policy(source, timer, EvalPolicy::digital())
    }

    /// Create a sensor with an explicit evaluation policy
    pub fn with_policy(source: S, timer: T, policy: EvalPolicy) -> Self {
        Self {
            source,
            timer,
            state: SensorState::new(policy),
            norm: None,
            actions: Vec::new(),
            checks: Vec::new(),
            session: None,
        }
    }

    // --- configuration -----------------------------------------------------

    /// Set the normalization function used by normalized acquisitions
    ///
    /// The function receives the raw value and the sensor state *before* the
    /// value is committed: `current_sample()` inside the function still
    /// returns the previous acquisition. Existing configurations rely on this
    /// ordering.
    pub fn set_norm_func<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(f32, &SensorState<N>) -> f32 + 'static,
    {
        self.norm = Some(Box::new(f));
        self
    }

    /// Append an action run unconditionally after every acquisition
    pub fn do_every_sample<F>(&mut self, action: F) -> SensorResult<&mut Self>
    where
        F: FnMut(&SensorState<N>) + 'static,
    {
        self.actions
            .push(Box::new(action))
            .map_err(|_| SensorError::Capacity("sample actions"))?;
        Ok(self)
    }

    /// Remove every registered every-sample action
    pub fn reset_sample_actions(&mut self) {
        self.actions.clear();
    }

    /// Append a (condition, action) pair evaluated after every acquisition
    ///
    /// Pairs are evaluated in registration order; each condition is always
    /// evaluated regardless of the outcome of earlier pairs.
    pub fn add_check<C, F>(&mut self, condition: C, action: F) -> SensorResult<&mut Self>
    where
        C: FnMut(&SensorState<N>) -> bool + 'static,
        F: FnMut(&SensorState<N>) + 'static,
    {
        self.checks
            .push((Box::new(condition), Box::new(action)))
            .map_err(|_| SensorError::Capacity("checks"))?;
        Ok(self)
    }

    /// Remove every registered (condition, action) pair
    pub fn reset_check(&mut self) {
        self.checks.clear();
    }

    /// Set the observation window length for manual acquisition
    ///
    /// Resizing discards buffered samples. In sampling mode the window is
    /// normally given to `start_sampling` instead; changing it underneath an
    /// active session that configured its own window is the caller's
    /// responsibility to avoid.
    pub fn set_observation_window(&mut self, window: usize) -> SensorResult<&mut Self> {
        Self::validate_window(window)?;
        self.state.buffer.set_window(window);
        Ok(self)
    }

    /// Set the sampling interval directly, in milliseconds
    ///
    /// Low-level: the interval is normally implied by `start_sampling`. Use
    /// this only to obtain interval-dependent statistics (derivative, trend)
    /// in manual acquisition mode.
    pub fn set_sampling_time(&mut self, time_ms: u32) -> SensorResult<&mut Self> {
        if time_ms == 0 {
            return Err(SensorError::InvalidInterval);
        }
        self.state.interval_us = Some(time_ms as u64 * 1_000);
        Ok(self)
    }

    fn validate_window(window: usize) -> SensorResult<()> {
        if window == 0 {
            return Err(SensorError::InvalidWindow);
        }
        if window > N {
            return Err(SensorError::WindowTooLarge {
                requested: window,
                capacity: N,
            });
        }
        Ok(())
    }

    // --- acquisition -------------------------------------------------------

    /// Perform one raw acquisition and run the pipeline
    pub fn sample_raw(&mut self) -> SensorResult<f32> {
        self.acquire(AcquisitionKind::Raw)
    }

    /// Perform one normalized acquisition and run the pipeline
    ///
    /// Fails with [`SensorError::NormFuncMissing`] when no normalization
    /// function is set.
    pub fn sample_normalized(&mut self) -> SensorResult<f32> {
        self.acquire(AcquisitionKind::Normalized)
    }

    /// Timer-callback body: one scheduled acquisition
    ///
    /// The surrounding runtime calls this once per expiry of the schedule
    /// armed by `start_sampling`. A read failure propagates to the caller but
    /// leaves the schedule armed; a single failed read does not stop
    /// sampling.
    pub fn tick(&mut self) -> SensorResult<f32> {
        let kind = self
            .session
            .as_ref()
            .ok_or(SensorError::NotSampling)?
            .kind;
        self.acquire(kind)
    }

    fn acquire(&mut self, kind: AcquisitionKind) -> SensorResult<f32> {
        let raw = match self.source.read() {
            Ok(v) => v,
            Err(e) => {
                sensor_log!("acquisition failed: {}", e);
                return Err(SensorError::Read(e));
            }
        };
        if !raw.is_finite() {
            return Err(SensorError::Read(ReadError::NotFinite));
        }

        let value = match kind {
            AcquisitionKind::Raw => raw,
            AcquisitionKind::Normalized => {
                // The state passed here still reflects the previous
                // acquisition; the new value is committed afterwards.
                let norm = self.norm.as_mut().ok_or(SensorError::NormFuncMissing)?;
                norm(raw, &self.state)
            }
        };

        if self.state.lifecycle == SamplingState::Idle {
            self.state.lifecycle = SamplingState::Manual;
        }

        self.state.buffer.push(value);
        if !self.state.policy.skip_eval {
            self.state.recompute();
        }

        for action in self.actions.iter_mut() {
            action(&self.state);
        }
        for (condition, action) in self.checks.iter_mut() {
            if condition(&self.state) {
                action(&self.state);
            }
        }

        Ok(value)
    }

    // --- sampling lifecycle ------------------------------------------------

    /// Begin timer-driven sampling
    ///
    /// Arms a repeating schedule of `interval` (converted via `unit`) through
    /// the timer capability; each expiry must be delivered to [`Sensor::tick`].
    /// With `window = None` the windowed-statistics evaluation is skipped for
    /// the session. Starting while already sampling is an error.
    pub fn start_sampling(
        &mut self,
        interval: u32,
        window: Option<usize>,
        kind: AcquisitionKind,
        unit: TimeUnit,
    ) -> SensorResult<&mut Self> {
        if self.session.is_some() {
            return Err(SensorError::AlreadySampling);
        }
        if interval == 0 {
            return Err(SensorError::InvalidInterval);
        }
        if kind == AcquisitionKind::Normalized && self.norm.is_none() {
            return Err(SensorError::NormFuncMissing);
        }

        if let Some(n) = window {
            Self::validate_window(n)?;
        }

        let interval_us = unit.to_micros(interval);
        let handle = self.timer.schedule_repeating(interval_us)?;
        match window {
            Some(n) => self.state.buffer.set_window(n),
            None => self.state.policy.skip_eval = true,
        }
        self.state.interval_us = Some(interval_us);
        self.state.lifecycle = SamplingState::Sampling;
        self.session = Some(Session { handle, kind });
        sensor_log!("sampling started, every {}us", interval_us);
        Ok(self)
    }

    /// Stop sampling, or reset manual-mode state
    ///
    /// In sampling mode the armed schedule is cancelled and the buffered
    /// window is left intact. Outside sampling mode the window and statistics
    /// are reset to their initial empty state. Safe to call repeatedly.
    pub fn stop_sampling(&mut self) -> &mut Self {
        match self.session.take() {
            Some(session) => {
                self.timer.cancel(session.handle);
                self.state.lifecycle = SamplingState::Idle;
                sensor_log!("sampling stopped");
            }
            None => {
                self.state.buffer.clear();
                self.state.stats.clear();
                self.state.interval_us = None;
                self.state.lifecycle = SamplingState::Idle;
            }
        }
        self
    }

    /// Block the calling context for `time_ms` milliseconds
    ///
    /// See [`Delay`] for how this interacts with an armed sampling schedule.
    pub fn wait<D: Delay>(&mut self, delay: &mut D, time_ms: u32) -> &mut Self {
        delay.delay_ms(time_ms);
        self
    }

    // --- accessors ---------------------------------------------------------

    /// The window/statistics view of this sensor
    pub fn state(&self) -> &SensorState<N> {
        &self.state
    }

    /// Most recently acquired sample
    pub fn current_sample(&self) -> Option<f32> {
        self.state.current_sample()
    }

    /// Second most recent sample
    pub fn previous_sample(&self) -> Option<f32> {
        self.state.previous_sample()
    }

    /// Derived statistics for the current window contents
    pub fn stats(&self) -> &WindowStats {
        self.state.stats()
    }

    /// Evaluation policy in effect
    pub fn policy(&self) -> &EvalPolicy {
        self.state.policy()
    }

    /// Mutable access to the evaluation policy flags
    pub fn policy_mut(&mut self) -> &mut EvalPolicy {
        &mut self.state.policy
    }

    /// True while a sampling session is active
    pub fn is_sampling(&self) -> bool {
        self.state.is_sampling()
    }

    /// The timer capability this sensor was built with
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The input source this sensor was built with
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::time::ManualTimer;

    fn analog_sensor(values: &[f32]) -> Sensor<ScriptedSource<'_>, ManualTimer, 8> {
        Sensor::analog(ScriptedSource::new(values), ManualTimer::new())
    }

    #[test]
    fn first_manual_acquisition_enters_manual_mode() {
        let mut sensor = analog_sensor(&[1.0]);
        assert_eq!(sensor.state().sampling_state(), SamplingState::Idle);
        sensor.sample_raw().unwrap();
        assert_eq!(sensor.state().sampling_state(), SamplingState::Manual);
    }

    #[test]
    fn empty_window_reports_none_not_zero() {
        let sensor = analog_sensor(&[]);
        assert_eq!(sensor.current_sample(), None);
        assert_eq!(sensor.previous_sample(), None);
        assert_eq!(sensor.stats().average, None);
        assert_eq!(sensor.stats().min, None);
    }

    #[test]
    fn read_failure_leaves_state_untouched() {
        let mut sensor = analog_sensor(&[5.0]);
        sensor.sample_raw().unwrap();

        // Script exhausted: the failed read must not push or recompute
        let err = sensor.sample_raw().unwrap_err();
        assert_eq!(err, SensorError::Read(ReadError::Exhausted));
        assert_eq!(sensor.current_sample(), Some(5.0));
        assert_eq!(sensor.state().buffer().len(), 1);
    }

    #[test]
    fn non_finite_reads_are_rejected() {
        let mut sensor = analog_sensor(&[f32::NAN]);
        let err = sensor.sample_raw().unwrap_err();
        assert_eq!(err, SensorError::Read(ReadError::NotFinite));
        assert_eq!(sensor.current_sample(), None);
    }

    #[test]
    fn normalized_requires_a_norm_func() {
        let mut sensor = analog_sensor(&[1.0]);
        assert_eq!(
            sensor.sample_normalized().unwrap_err(),
            SensorError::NormFuncMissing
        );
    }

    #[test]
    fn window_validation() {
        let mut sensor = analog_sensor(&[]);
        assert_eq!(
            sensor.set_observation_window(0).unwrap_err(),
            SensorError::InvalidWindow
        );
        assert_eq!(
            sensor.set_observation_window(9).unwrap_err(),
            SensorError::WindowTooLarge {
                requested: 9,
                capacity: 8
            }
        );
        assert!(sensor.set_observation_window(8).is_ok());
    }

    #[test]
    fn sampling_time_validation() {
        let mut sensor = analog_sensor(&[]);
        assert_eq!(
            sensor.set_sampling_time(0).unwrap_err(),
            SensorError::InvalidInterval
        );
        sensor.set_sampling_time(250).unwrap();
        assert_eq!(sensor.state().sampling_interval_us(), Some(250_000));
    }

    #[test]
    fn skip_eval_keeps_buffer_but_not_stats() {
        let mut sensor = analog_sensor(&[1.0, 2.0]);
        sensor.policy_mut().skip_eval = true;
        sensor.sample_raw().unwrap();
        sensor.sample_raw().unwrap();

        // The window is maintained regardless, so chained consumers and
        // previous_sample keep working
        assert_eq!(sensor.current_sample(), Some(2.0));
        assert_eq!(sensor.previous_sample(), Some(1.0));
        assert_eq!(sensor.stats().average, None);
        assert_eq!(sensor.stats().min, None);
    }
}
