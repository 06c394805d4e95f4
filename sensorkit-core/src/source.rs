//! Input-source abstraction and host-side adapters
//!
//! A sensor is bound to one [`SampleSource`] at construction. The trait uses
//! the `nb` non-blocking idiom so that ADC drivers whose conversions take a
//! few cycles can return `WouldBlock` without this crate caring; the sensor
//! core blocks on [`SampleSource::read`], which spins until the conversion
//! completes or fails.
//!
//! Analog and digital inputs differ only in value range (a digital pin reads
//! 0.0 or 1.0), not in contract, so there is a single trait for both.
//!
//! Hardware bindings live outside this crate. The adapters here cover host
//! tests and composition:
//! - [`FnSource`] wraps a closure; also the escape hatch for chaining one
//!   sensor off another sensor's published statistic
//! - [`ConstSource`] always returns the same value
//! - [`ScriptedSource`] replays a fixed slice of values, then reports
//!   exhaustion

use crate::errors::ReadError;

/// One analog or digital input
pub trait SampleSource {
    /// Attempt one conversion without blocking
    fn poll(&mut self) -> nb::Result<f32, ReadError>;

    /// Perform one conversion, spinning while the source would block
    fn read(&mut self) -> Result<f32, ReadError> {
        nb::block!(self.poll())
    }
}

/// Source backed by a closure
///
/// ```rust
/// use sensorkit_core::source::{FnSource, SampleSource};
///
/// let mut level = 0.0_f32;
/// let mut source = FnSource::new(move || {
///     level += 1.0;
///     Ok(level)
/// });
/// assert_eq!(source.read(), Ok(1.0));
/// assert_eq!(source.read(), Ok(2.0));
/// ```
pub struct FnSource<F> {
    read_fn: F,
}

impl<F> FnSource<F>
where
    F: FnMut() -> Result<f32, ReadError>,
{
    /// Wrap a closure as a source
    pub fn new(read_fn: F) -> Self {
        Self { read_fn }
    }
}

impl<F> SampleSource for FnSource<F>
where
    F: FnMut() -> Result<f32, ReadError>,
{
    fn poll(&mut self) -> nb::Result<f32, ReadError> {
        (self.read_fn)().map_err(nb::Error::Other)
    }
}

/// Source that always returns the same value
#[derive(Debug, Clone, Copy)]
pub struct ConstSource(pub f32);

impl SampleSource for ConstSource {
    fn poll(&mut self) -> nb::Result<f32, ReadError> {
        Ok(self.0)
    }
}

/// Source that replays a fixed sequence of values
///
/// Reads past the end return [`ReadError::Exhausted`], which doubles as the
/// read-failure path in tests.
pub struct ScriptedSource<'a> {
    values: &'a [f32],
    position: usize,
}

impl<'a> ScriptedSource<'a> {
    /// Create a source over a slice of values
    pub fn new(values: &'a [f32]) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Rewind to the first value
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Number of values already delivered
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every value has been delivered
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.values.len()
    }
}

impl SampleSource for ScriptedSource<'_> {
    fn poll(&mut self) -> nb::Result<f32, ReadError> {
        if self.position >= self.values.len() {
            return Err(nb::Error::Other(ReadError::Exhausted));
        }
        let value = self.values[self.position];
        self.position += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_then_fails() {
        let mut source = ScriptedSource::new(&[1.0, 2.0]);
        assert_eq!(source.read(), Ok(1.0));
        assert_eq!(source.read(), Ok(2.0));
        assert!(source.is_exhausted());
        assert_eq!(source.read(), Err(ReadError::Exhausted));

        source.reset();
        assert_eq!(source.read(), Ok(1.0));
    }

    #[test]
    fn const_source_never_changes() {
        let mut source = ConstSource(3.5);
        assert_eq!(source.read(), Ok(3.5));
        assert_eq!(source.read(), Ok(3.5));
    }

    #[test]
    fn fn_source_propagates_errors() {
        let mut source = FnSource::new(|| Err(ReadError::Fault { reason: "open circuit" }));
        assert_eq!(
            source.read(),
            Err(ReadError::Fault { reason: "open circuit" })
        );
    }
}
