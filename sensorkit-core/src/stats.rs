//! Derived statistics over the observation window
//!
//! After every committed acquisition the sensor recomputes a small set of
//! window statistics, each gated by a policy flag so unused math costs
//! nothing on constrained targets:
//!
//! - **average**: arithmetic mean of the samples currently buffered (the
//!   window does not need to be full)
//! - **derivative**: (last - penultimate) / sampling time in seconds
//! - **trend**: (last - first in window) / sampling time in seconds
//! - **min / max**: linear scan of the buffered samples
//!
//! Derivative and trend require a configured sampling interval, so outside
//! sampling mode they stay `None` unless the interval was set explicitly via
//! `set_sampling_time`. Every statistic is `None` until enough samples exist;
//! `None` is the only missing-value representation, never 0.0.
//!
//! With `high_precision` off, average, derivative and trend are floored to
//! whole numbers, the counting-style arithmetic digital inputs want. Min and
//! max are raw samples and are never rounded.

use libm::floorf;

use crate::buffer::WindowBuffer;

/// Flags selecting which statistics are recomputed per acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalPolicy {
    /// Skip the whole recompute step
    pub skip_eval: bool,
    /// Maintain the moving average
    pub store_average: bool,
    /// Maintain the window trend
    pub store_trend: bool,
    /// Maintain min and max
    pub store_min_max: bool,
    /// Full float math instead of floored whole-number results
    pub high_precision: bool,
}

impl EvalPolicy {
    /// Nothing maintained; statistics stay `None`
    pub const fn disabled() -> Self {
        Self {
            skip_eval: false,
            store_average: false,
            store_trend: false,
            store_min_max: false,
            high_precision: false,
        }
    }

    /// Analog defaults: average, trend and min/max maintained
    pub const fn analog() -> Self {
        Self {
            skip_eval: false,
            store_average: true,
            store_trend: true,
            store_min_max: true,
            high_precision: false,
        }
    }

    /// Digital defaults: average only, full precision so that means of 0/1
    /// levels survive
    pub const fn digital() -> Self {
        Self {
            skip_eval: false,
            store_average: true,
            store_trend: false,
            store_min_max: false,
            high_precision: true,
        }
    }
}

impl Default for EvalPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Statistics derived from the current window contents
///
/// `None` means "not enough data yet" or "not maintained under the current
/// policy". Callers test the option, they never compare against zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowStats {
    /// Arithmetic mean of the buffered samples
    pub average: Option<f32>,
    /// Rate of change between the two most recent samples
    pub derivative: Option<f32>,
    /// Rate of change across the whole window
    pub trend: Option<f32>,
    /// Smallest buffered sample
    pub min: Option<f32>,
    /// Greatest buffered sample
    pub max: Option<f32>,
}

impl WindowStats {
    /// Reset every statistic to the missing state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Recompute from the buffer under the given policy
    ///
    /// The `skip_eval` gate lives in the caller; this function assumes
    /// evaluation is wanted and only applies the per-statistic flags.
    pub(crate) fn recompute<const N: usize>(
        &mut self,
        buffer: &WindowBuffer<N>,
        policy: &EvalPolicy,
        interval_us: Option<u64>,
    ) {
        let round = |v: f32| if policy.high_precision { v } else { floorf(v) };
        let interval_secs = interval_us.map(|us| us as f32 / 1_000_000.0);

        self.average = if policy.store_average && !buffer.is_empty() {
            let sum: f32 = buffer.iter().sum();
            Some(round(sum / buffer.len() as f32))
        } else {
            None
        };

        // Derivative is maintained whenever a sampling interval exists; it is
        // the one statistic without its own store flag.
        self.derivative = match (interval_secs, buffer.last(), buffer.previous()) {
            (Some(secs), Some(last), Some(prev)) => Some(round((last - prev) / secs)),
            _ => None,
        };

        self.trend = if policy.store_trend {
            match (interval_secs, buffer.last(), buffer.first()) {
                (Some(secs), Some(last), Some(first)) if buffer.len() >= 2 => {
                    Some(round((last - first) / secs))
                }
                _ => None,
            }
        } else {
            None
        };

        if policy.store_min_max && !buffer.is_empty() {
            let mut min = f32::INFINITY;
            let mut max = f32::NEG_INFINITY;
            for v in buffer.iter() {
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
            self.min = Some(min);
            self.max = Some(max);
        } else {
            self.min = None;
            self.max = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[f32]) -> WindowBuffer<8> {
        let mut buf = WindowBuffer::new();
        for &v in values {
            buf.push(v);
        }
        buf
    }

    #[test]
    fn average_over_partial_window() {
        let buf = filled(&[10.0, 20.0]);
        let mut stats = WindowStats::default();
        let policy = EvalPolicy {
            store_average: true,
            high_precision: true,
            ..EvalPolicy::disabled()
        };
        stats.recompute(&buf, &policy, None);
        assert_eq!(stats.average, Some(15.0));
        assert_eq!(stats.min, None);
        assert_eq!(stats.trend, None);
    }

    #[test]
    fn min_max_scan() {
        let buf = filled(&[5.0, -2.0, 9.0, 9.0]);
        let mut stats = WindowStats::default();
        let policy = EvalPolicy {
            store_min_max: true,
            ..EvalPolicy::disabled()
        };
        stats.recompute(&buf, &policy, None);
        assert_eq!(stats.min, Some(-2.0));
        assert_eq!(stats.max, Some(9.0));
        assert_eq!(stats.average, None);
    }

    #[test]
    fn rates_need_an_interval() {
        let buf = filled(&[10.0, 40.0]);
        let mut stats = WindowStats::default();
        let policy = EvalPolicy {
            store_trend: true,
            high_precision: true,
            ..EvalPolicy::disabled()
        };

        stats.recompute(&buf, &policy, None);
        assert_eq!(stats.derivative, None);
        assert_eq!(stats.trend, None);

        // 500 ms interval: 30 units over 0.5 s
        stats.recompute(&buf, &policy, Some(500_000));
        assert_eq!(stats.derivative, Some(60.0));
        assert_eq!(stats.trend, Some(60.0));
    }

    #[test]
    fn trend_spans_the_window() {
        let buf = filled(&[10.0, 25.0, 20.0]);
        let mut stats = WindowStats::default();
        let policy = EvalPolicy {
            store_trend: true,
            high_precision: true,
            ..EvalPolicy::disabled()
        };
        stats.recompute(&buf, &policy, Some(1_000_000));
        // Derivative uses the two newest, trend last minus first
        assert_eq!(stats.derivative, Some(-5.0));
        assert_eq!(stats.trend, Some(10.0));
    }

    #[test]
    fn low_precision_floors() {
        let buf = filled(&[1.0, 0.0, 1.0]);
        let mut stats = WindowStats::default();
        let mut policy = EvalPolicy {
            store_average: true,
            ..EvalPolicy::disabled()
        };
        stats.recompute(&buf, &policy, None);
        assert_eq!(stats.average, Some(0.0));

        policy.high_precision = true;
        stats.recompute(&buf, &policy, None);
        assert!((stats.average.unwrap() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn single_sample_has_no_rates() {
        let buf = filled(&[7.0]);
        let mut stats = WindowStats::default();
        let policy = EvalPolicy {
            store_average: true,
            store_trend: true,
            store_min_max: true,
            high_precision: true,
            ..EvalPolicy::disabled()
        };
        stats.recompute(&buf, &policy, Some(1_000_000));
        assert_eq!(stats.average, Some(7.0));
        assert_eq!(stats.min, Some(7.0));
        assert_eq!(stats.max, Some(7.0));
        assert_eq!(stats.derivative, None);
        assert_eq!(stats.trend, None);
    }
}
