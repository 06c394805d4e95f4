//! Time units and the timer capabilities the sensor runs on
//!
//! The library never talks to a hardware timer directly. Periodic sampling is
//! driven by whatever the surrounding runtime provides (an event loop, an
//! RTOS timer or a bare interrupt) through the [`SamplingTimer`] capability:
//! the sensor arms a repeating schedule, the runtime calls the sensor's
//! `tick()` on each expiry, and the sensor cancels the schedule through the
//! same capability when sampling stops.
//!
//! [`ManualTimer`] is the host-side implementation used throughout the test
//! suite: it records what was armed and lets the test fire ticks by hand.

use thiserror_no_std::Error;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Unit of the interval passed to `start_sampling`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    /// Interval given in milliseconds
    Millis,
    /// Interval given in microseconds
    Micros,
}

impl TimeUnit {
    /// Convert an interval in this unit to microseconds
    pub const fn to_micros(self, value: u32) -> u64 {
        match self {
            TimeUnit::Millis => value as u64 * 1_000,
            TimeUnit::Micros => value as u64,
        }
    }
}

/// Errors reported by a [`SamplingTimer`] implementation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// No free timer slot on this platform
    #[error("no timer slot available")]
    Exhausted,

    /// The requested interval cannot be represented by this timer
    #[error("interval not representable by this timer")]
    Unsupported,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Exhausted => defmt::write!(fmt, "no timer slot"),
            Self::Unsupported => defmt::write!(fmt, "interval unsupported"),
        }
    }
}

/// Repeating-timer capability supplied by the surrounding runtime
///
/// Implementations only manage the schedule; they do not call into the sensor
/// themselves. The runtime that owns both the timer expiry and the sensor is
/// expected to invoke `Sensor::tick()` once per expiry.
///
/// Cancellation contract: after `cancel` returns, the handle is dead and no
/// further expiry may be delivered for it.
pub trait SamplingTimer {
    /// Token identifying an armed schedule
    type Handle;

    /// Arm a repeating schedule with the given period
    fn schedule_repeating(&mut self, interval_us: u64) -> Result<Self::Handle, TimerError>;

    /// Disarm a previously armed schedule
    fn cancel(&mut self, handle: Self::Handle);
}

/// Blocking-delay capability
///
/// Used by `Sensor::wait` for fluent sample-and-hold scripts. On platforms
/// with interrupt-driven timers the sampling schedule keeps firing during the
/// delay; on purely cooperative single-threaded hosts the delay necessarily
/// suspends the timer as well. This library assumes the independent-timer
/// model only when the platform's [`SamplingTimer`] is interrupt-driven.
pub trait Delay {
    /// Block the calling context for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Delay that returns immediately; for tests and simulated time
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelay;

impl Delay for NoopDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// Delay backed by the host OS (requires `std`)
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Single-slot timer for host-side testing
///
/// Records the armed interval and counts cancellations; it never fires on its
/// own. Tests drive the sensor by calling `tick()` directly, which is exactly
/// what a runtime would do on expiry.
#[derive(Debug, Default)]
pub struct ManualTimer {
    armed: Option<u64>,
    cancelled: u32,
}

impl ManualTimer {
    /// Create a disarmed manual timer
    pub const fn new() -> Self {
        Self {
            armed: None,
            cancelled: 0,
        }
    }

    /// Interval currently armed, if any
    pub fn armed_interval_us(&self) -> Option<u64> {
        self.armed
    }

    /// Number of times `cancel` has been called
    pub fn cancel_count(&self) -> u32 {
        self.cancelled
    }
}

impl SamplingTimer for ManualTimer {
    type Handle = ();

    fn schedule_repeating(&mut self, interval_us: u64) -> Result<Self::Handle, TimerError> {
        if self.armed.is_some() {
            return Err(TimerError::Exhausted);
        }
        self.armed = Some(interval_us);
        Ok(())
    }

    fn cancel(&mut self, _handle: Self::Handle) {
        self.armed = None;
        self.cancelled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion() {
        assert_eq!(TimeUnit::Millis.to_micros(1000), 1_000_000);
        assert_eq!(TimeUnit::Micros.to_micros(250), 250);
    }

    #[test]
    fn manual_timer_single_slot() {
        let mut timer = ManualTimer::new();
        let handle = timer.schedule_repeating(1_000).unwrap();
        assert_eq!(timer.armed_interval_us(), Some(1_000));

        // Second schedule must fail while armed
        assert_eq!(timer.schedule_repeating(2_000), Err(TimerError::Exhausted));

        timer.cancel(handle);
        assert_eq!(timer.armed_interval_us(), None);
        assert_eq!(timer.cancel_count(), 1);
    }
}
