//! Grouping sensors for uniform bulk operations
//!
//! A [`SensorPool`] maps names to sensors so several inputs can be started,
//! stopped or polled together. The pool is a thin collection wrapper: every
//! operation delegates to the members in insertion order and no statistics
//! are shared across them. Members keep their own timers, so per-member
//! intervals fall out naturally.
//!
//! Heterogeneous sensors (different sources, timers, window capacities) are
//! held behind the object-safe [`PoolSensor`] trait.

use heapless::Vec;

use crate::{
    errors::{SensorError, SensorResult},
    sensor::{AcquisitionKind, Sensor},
    source::SampleSource,
    time::{SamplingTimer, TimeUnit},
};

/// Per-member sampling parameters for a bulk start
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplePlan {
    /// Interval between acquisitions, in milliseconds
    pub interval_ms: u32,
    /// Observation window, `None` to skip windowed evaluation
    pub window: Option<usize>,
    /// Raw or normalized acquisition per tick
    pub kind: AcquisitionKind,
}

impl SamplePlan {
    /// Raw acquisition every `interval_ms` over `window` samples
    pub const fn raw(interval_ms: u32, window: usize) -> Self {
        Self {
            interval_ms,
            window: Some(window),
            kind: AcquisitionKind::Raw,
        }
    }
}

/// Object-safe surface a sensor exposes to a pool
pub trait PoolSensor {
    /// One raw acquisition through the member's pipeline
    fn sample_raw(&mut self) -> SensorResult<f32>;

    /// One normalized acquisition through the member's pipeline
    fn sample_normalized(&mut self) -> SensorResult<f32>;

    /// Deliver one timer expiry to the member
    fn tick(&mut self) -> SensorResult<f32>;

    /// Begin timer-driven sampling on the member
    fn start_sampling(
        &mut self,
        interval_ms: u32,
        window: Option<usize>,
        kind: AcquisitionKind,
    ) -> SensorResult<()>;

    /// Stop the member's sampling session
    fn stop_sampling(&mut self);

    /// True while the member's sampling session is active
    fn is_sampling(&self) -> bool;
}

impl<S, T, const N: usize> PoolSensor for Sensor<S, T, N>
where
    S: SampleSource,
    T: SamplingTimer,
{
    fn sample_raw(&mut self) -> SensorResult<f32> {
        Sensor::sample_raw(self)
    }

    fn sample_normalized(&mut self) -> SensorResult<f32> {
        Sensor::sample_normalized(self)
    }

    fn tick(&mut self) -> SensorResult<f32> {
        Sensor::tick(self)
    }

    fn start_sampling(
        &mut self,
        interval_ms: u32,
        window: Option<usize>,
        kind: AcquisitionKind,
    ) -> SensorResult<()> {
        Sensor::start_sampling(self, interval_ms, window, kind, TimeUnit::Millis).map(|_| ())
    }

    fn stop_sampling(&mut self) {
        Sensor::stop_sampling(self);
    }

    fn is_sampling(&self) -> bool {
        Sensor::is_sampling(self)
    }
}

/// Name → sensor mapping with bulk delegation
pub struct SensorPool<'a, const P: usize> {
    members: Vec<(&'static str, &'a mut dyn PoolSensor), P>,
}

impl<'a, const P: usize> core::fmt::Debug for SensorPool<'a, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorPool")
            .field("len", &self.members.len())
            .finish()
    }
}

impl<'a, const P: usize> SensorPool<'a, P> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the pool has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a named member
    pub fn add(
        &mut self,
        name: &'static str,
        sensor: &'a mut dyn PoolSensor,
    ) -> SensorResult<&mut Self> {
        self.members
            .push((name, sensor))
            .map_err(|_| SensorError::Capacity("pool members"))?;
        Ok(self)
    }

    /// Look up a member by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn PoolSensor + 'a)> {
        self.members
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| &mut **s)
    }

    /// Member names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ + use<'_, 'a, P> {
        self.members.iter().map(|(n, _)| *n)
    }

    /// Begin sampling on every member, pairing plans with members by index
    ///
    /// Fails fast: members before a failing one stay armed, so callers that
    /// need all-or-nothing should `stop_sampling` on error.
    pub fn start_sampling(&mut self, plans: &[SamplePlan]) -> SensorResult<()> {
        if plans.len() != self.members.len() {
            return Err(SensorError::PlanMismatch {
                plans: plans.len(),
                members: self.members.len(),
            });
        }
        for ((_, sensor), plan) in self.members.iter_mut().zip(plans) {
            sensor.start_sampling(plan.interval_ms, plan.window, plan.kind)?;
        }
        Ok(())
    }

    /// Stop sampling on every member
    pub fn stop_sampling(&mut self) {
        for (_, sensor) in self.members.iter_mut() {
            sensor.stop_sampling();
        }
    }

    /// One raw acquisition on every member, in insertion order
    ///
    /// Every member is attempted even when one fails; the first failure is
    /// reported after the sweep completes.
    pub fn sample_raw(&mut self) -> SensorResult<()> {
        let mut first_err = None;
        for (_, sensor) in self.members.iter_mut() {
            if let Err(e) = sensor.sample_raw() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<const P: usize> Default for SensorPool<'_, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::time::ManualTimer;

    #[test]
    fn bulk_start_and_stop() {
        let mut light = Sensor::<_, _, 8>::analog(
            ScriptedSource::new(&[100.0, 110.0]),
            ManualTimer::new(),
        );
        let mut door = Sensor::<_, _, 4>::digital(
            ScriptedSource::new(&[0.0, 1.0]),
            ManualTimer::new(),
        );

        {
            let mut pool: SensorPool<'_, 4> = SensorPool::new();
            pool.add("light", &mut light).unwrap();
            pool.add("door", &mut door).unwrap();

            pool.start_sampling(&[SamplePlan::raw(1000, 4), SamplePlan::raw(250, 2)])
                .unwrap();
            assert!(pool.get_mut("light").unwrap().is_sampling());
            assert!(pool.get_mut("door").unwrap().is_sampling());
            pool.stop_sampling();
        }

        assert_eq!(light.timer().armed_interval_us(), None);
        assert_eq!(light.timer().cancel_count(), 1);
        assert_eq!(door.timer().cancel_count(), 1);
    }

    #[test]
    fn plan_count_must_match() {
        let mut light =
            Sensor::<_, _, 8>::analog(ScriptedSource::new(&[1.0]), ManualTimer::new());
        let mut pool: SensorPool<'_, 4> = SensorPool::new();
        pool.add("light", &mut light).unwrap();

        assert_eq!(
            pool.start_sampling(&[]).unwrap_err(),
            SensorError::PlanMismatch {
                plans: 0,
                members: 1
            }
        );
    }

    #[test]
    fn bulk_sample_attempts_every_member() {
        // First member fails immediately, second must still acquire
        let mut broken =
            Sensor::<_, _, 4>::analog(ScriptedSource::new(&[]), ManualTimer::new());
        let mut alive =
            Sensor::<_, _, 4>::analog(ScriptedSource::new(&[42.0]), ManualTimer::new());

        let mut pool: SensorPool<'_, 4> = SensorPool::new();
        pool.add("broken", &mut broken).unwrap();
        pool.add("alive", &mut alive).unwrap();

        assert!(pool.sample_raw().is_err());
        drop(pool);
        assert_eq!(alive.current_sample(), Some(42.0));
    }
}
