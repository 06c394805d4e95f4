//! Error types for acquisition and configuration failures
//!
//! Errors are kept small and `Copy` so they can be returned from hot
//! acquisition paths and stored without allocation. Missing data is *not* an
//! error here: an empty or not-yet-full sample window reports `None` from the
//! accessors instead, since that is an expected transient state rather than a
//! fault.

use thiserror_no_std::Error;

use crate::time::TimerError;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Failure reported by an input source during a single acquisition
///
/// A failed read aborts the acquisition before any state is touched: nothing
/// is pushed into the window, statistics are untouched and no hook runs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The underlying driver or transport reported a fault
    #[error("source fault: {reason}")]
    Fault {
        /// Driver-supplied description of the fault
        reason: &'static str,
    },

    /// The source produced a value that is not a finite number
    #[error("source produced a non-finite value")]
    NotFinite,

    /// The source has no more values to deliver (scripted/replay sources)
    #[error("source exhausted")]
    Exhausted,
}

/// Sensor configuration and acquisition errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// An acquisition failed at the input source
    #[error("read failed: {0}")]
    Read(#[from] ReadError),

    /// Observation window of zero samples requested
    #[error("observation window must hold at least one sample")]
    InvalidWindow,

    /// Observation window larger than the compile-time buffer capacity
    #[error("observation window {requested} exceeds buffer capacity {capacity}")]
    WindowTooLarge {
        /// Window length that was requested
        requested: usize,
        /// Compile-time capacity of the sample buffer
        capacity: usize,
    },

    /// Sampling interval of zero requested
    #[error("sampling interval must be non-zero")]
    InvalidInterval,

    /// `start_sampling` called while a sampling session is already active
    #[error("sampling already active; stop it first")]
    AlreadySampling,

    /// A timer tick was delivered outside an active sampling session
    #[error("no sampling session active")]
    NotSampling,

    /// Normalized acquisition requested without a normalization function
    #[error("no normalization function set")]
    NormFuncMissing,

    /// A fixed-capacity list (hooks, pool members) is full
    #[error("capacity exhausted: {0}")]
    Capacity(&'static str),

    /// The pool was given a plan list that does not match its members
    #[error("{plans} sampling plans for {members} pool members")]
    PlanMismatch {
        /// Number of plans supplied
        plans: usize,
        /// Number of sensors in the pool
        members: usize,
    },

    /// The sampling timer rejected a request
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReadError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Fault { reason } => defmt::write!(fmt, "source fault: {}", reason),
            Self::NotFinite => defmt::write!(fmt, "non-finite value"),
            Self::Exhausted => defmt::write!(fmt, "source exhausted"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Read(e) => defmt::write!(fmt, "read failed: {}", e),
            Self::InvalidWindow => defmt::write!(fmt, "zero observation window"),
            Self::WindowTooLarge { requested, capacity } => {
                defmt::write!(fmt, "window {} > capacity {}", requested, capacity)
            }
            Self::InvalidInterval => defmt::write!(fmt, "zero sampling interval"),
            Self::AlreadySampling => defmt::write!(fmt, "already sampling"),
            Self::NotSampling => defmt::write!(fmt, "not sampling"),
            Self::NormFuncMissing => defmt::write!(fmt, "no normalization function"),
            Self::Capacity(what) => defmt::write!(fmt, "capacity exhausted: {}", what),
            Self::PlanMismatch { plans, members } => {
                defmt::write!(fmt, "{} plans for {} members", plans, members)
            }
            Self::Timer(e) => defmt::write!(fmt, "timer error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_converts() {
        let err: SensorError = ReadError::NotFinite.into();
        assert_eq!(err, SensorError::Read(ReadError::NotFinite));
    }

    #[cfg(feature = "std")]
    #[test]
    fn display_formats() {
        let err = SensorError::WindowTooLarge {
            requested: 64,
            capacity: 32,
        };
        assert_eq!(
            format!("{}", err),
            "observation window 64 exceeds buffer capacity 32"
        );
    }
}
