//! Windowed sampling and statistics for embedded sensor inputs
//!
//! Wraps a single analog or digital input into a [`Sensor`] with periodic
//! sampling, a rolling window of recent samples and derived statistics
//! (moving average, min, max, trend, derivative), plus per-acquisition hooks
//! for reacting to the data as it arrives. A [`SensorPool`] groups several
//! sensors for uniform bulk operations.
//!
//! Hardware stays outside: inputs come in through the [`source::SampleSource`]
//! trait and periodic sampling runs on whatever repeating-timer capability
//! the platform provides (see [`time::SamplingTimer`]).
//!
//! ```rust
//! use sensorkit_core::{Sensor, SensorError};
//! use sensorkit_core::source::ScriptedSource;
//! use sensorkit_core::time::ManualTimer;
//!
//! let source = ScriptedSource::new(&[512.0, 520.0, 531.0]);
//! let mut sensor: Sensor<_, _, 16> = Sensor::analog(source, ManualTimer::new());
//! sensor.set_observation_window(4)?;
//!
//! sensor.do_every_sample(|state| {
//!     // runs after every acquisition
//!     let _ = state.current_sample();
//! })?;
//!
//! sensor.sample_raw()?;
//! assert_eq!(sensor.current_sample(), Some(512.0));
//! # Ok::<(), SensorError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod errors;
pub mod pool;
pub mod sensor;
pub mod sequence;
pub mod source;
pub mod stats;
pub mod time;

// Public API
pub use errors::{ReadError, SensorError, SensorResult};
pub use pool::{PoolSensor, SamplePlan, SensorPool};
pub use sensor::{AcquisitionKind, SamplingState, Sensor, SensorState};
pub use stats::{EvalPolicy, WindowStats};
pub use time::TimeUnit;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
