//! Closed-form parking maneuvers and the speed/steering schedules they produce.

use crate::reference::TimedReference;
use crate::vehicle::{CruiseControl, Pose};
use crate::{CarBlueprint, ParkingSlot, PlannerConfig, SlotKind};
use serde::Serialize;
use thiserror::Error;

pub use diagonal::DiagonalPlan;
pub use parallel::{ParallelPlan, MAX_MANEUVERS};
pub use perpendicular::PerpendicularPlan;

mod diagonal;
mod parallel;
mod perpendicular;

/// Time spent turning the wheels between two arcs, in s.
const TURN_WHEEL_DURATION: f64 = 0.0;

/// Why no maneuver could be planned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlanningError {
    #[error("the vehicle is too far from the slot")]
    TooFarFromSlot,
    #[error("the slot is shorter than the vehicle ({slot:.2} m < {vehicle:.2} m)")]
    SlotTooShort { slot: f64, vehicle: f64 },
    #[error("no path found within {0} maneuvers")]
    TooManyManeuvers(usize),
    #[error("the vehicle is in the dead zone ({gap:.2} m <= {limit:.2} m)")]
    DeadZone { gap: f64, limit: f64 },
    #[error("infeasible geometry: {0}")]
    Infeasible(&'static str),
    #[error("{} a {kind:?} slot is not implemented", verb(.entering))]
    NotImplemented { kind: SlotKind, entering: bool },
}

fn verb(entering: &bool) -> &'static str {
    if *entering {
        "entering"
    } else {
        "leaving"
    }
}

/// Checks that an arc angle or radius computed from the geometry is usable.
fn checked(value: f64, what: &'static str) -> Result<f64, PlanningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PlanningError::Infeasible(what))
    }
}

/// The open-loop schedule of a maneuver.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct References {
    /// Speed in m/s.
    speeds: TimedReference,
    /// Front wheel angle in radians.
    steerings: TimedReference,
    /// Acceleration in m/s<sup>2</sup>.
    accelerations: TimedReference,
    /// Time since the maneuver started, in s.
    time: f64,
}

impl References {
    /// Starts an empty schedule.
    ///
    /// # Panics
    /// Panics unless the configured speed and acceleration are positive.
    pub(crate) fn new(config: &PlannerConfig) -> Self {
        assert!(config.max_speed > 0.0, "max speed must be positive");
        assert!(
            config.desired_acceleration > 0.0,
            "desired acceleration must be positive"
        );
        Default::default()
    }

    /// Holds a constant speed and steering for `duration` seconds.
    pub(crate) fn add(&mut self, speed: f64, steering: f64, duration: f64) {
        self.speeds.add(speed, duration);
        self.steerings.add(steering, duration);
        self.accelerations.add(0.0, duration);
    }

    /// Stops to turn the wheels to `steering`.
    pub(crate) fn turn_wheel(&mut self, steering: f64) {
        self.add(0.0, steering, TURN_WHEEL_DURATION);
    }

    /// Stops with straight wheels.
    pub(crate) fn halt(&mut self) {
        self.add(0.0, 0.0, 0.0);
    }

    pub fn speeds(&self) -> &TimedReference {
        &self.speeds
    }

    pub fn steerings(&self) -> &TimedReference {
        &self.steerings
    }

    pub fn accelerations(&self) -> &TimedReference {
        &self.accelerations
    }

    /// The total duration in s.
    pub fn duration(&self) -> f64 {
        self.speeds.duration()
    }

    /// Time elapsed since the schedule started, in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances the schedule and feeds its references to `control`.
    /// Returns `false` once the schedule has ended.
    pub fn update(&mut self, control: &mut CruiseControl, dt: f64) -> bool {
        self.time += dt;
        control.set_references(self.speeds.get(self.time), self.steerings.get(self.time));
        !self.speeds.ended(self.time)
    }
}

/// A planned maneuver, specific to the kind of slot.
#[derive(Clone, Debug)]
pub enum Trajectory {
    Parallel(ParallelPlan),
    Perpendicular(PerpendicularPlan),
    Diagonal(DiagonalPlan),
}

impl Trajectory {
    /// Plans a maneuver for a car at `pose` into (`entering`) or out of the slot.
    pub fn plan(
        car: &CarBlueprint,
        pose: Pose,
        slot: &ParkingSlot,
        entering: bool,
        config: &PlannerConfig,
    ) -> Result<Self, PlanningError> {
        let trajectory = match slot.kind() {
            SlotKind::Parallel => {
                Trajectory::Parallel(ParallelPlan::new(car, pose, slot, entering, config)?)
            }
            SlotKind::Perpendicular => Trajectory::Perpendicular(PerpendicularPlan::new(
                car, pose, slot, entering, config,
            )?),
            SlotKind::Diagonal => {
                Trajectory::Diagonal(DiagonalPlan::new(car, pose, slot, entering, config)?)
            }
        };
        trajectory.draw_debug();
        Ok(trajectory)
    }

    /// The kind of slot the maneuver was planned for.
    pub fn kind(&self) -> SlotKind {
        match self {
            Trajectory::Parallel(_) => SlotKind::Parallel,
            Trajectory::Perpendicular(_) => SlotKind::Perpendicular,
            Trajectory::Diagonal(_) => SlotKind::Diagonal,
        }
    }

    pub fn references(&self) -> &References {
        match self {
            Trajectory::Parallel(plan) => plan.references(),
            Trajectory::Perpendicular(plan) => plan.references(),
            Trajectory::Diagonal(plan) => plan.references(),
        }
    }

    fn references_mut(&mut self) -> &mut References {
        match self {
            Trajectory::Parallel(plan) => &mut plan.refs,
            Trajectory::Perpendicular(plan) => &mut plan.refs,
            Trajectory::Diagonal(plan) => &mut plan.refs,
        }
    }

    /// Advances the maneuver by `dt` seconds, writing the references to `control`.
    /// Returns `false` once the maneuver has ended.
    pub fn update(&mut self, control: &mut CruiseControl, dt: f64) -> bool {
        self.references_mut().update(control, dt)
    }

    /// Whether the maneuver has ended.
    pub fn ended(&self) -> bool {
        let refs = self.references();
        refs.speeds().ended(refs.time())
    }

    /// Records the maneuver geometry in the debug frame.
    fn draw_debug(&self) {
        match self {
            Trajectory::Parallel(plan) => plan.draw_debug(),
            Trajectory::Perpendicular(plan) => plan.draw_debug(),
            Trajectory::Diagonal(plan) => plan.draw_debug(),
        }
    }
}

/// Drives a schedule through the bicycle model. Used to check that plans land where intended.
#[cfg(test)]
pub(crate) fn replay(refs: &References, car: &CarBlueprint, mut pose: Pose, dt: f64) -> Pose {
    use crate::vehicle::kinematics::bicycle;
    let mut refs = refs.clone();
    let mut control = CruiseControl::default();
    loop {
        let running = refs.update(&mut control, dt);
        let (speed, steering) = control.update();
        pose = bicycle(pose, speed, steering, car.wheelbase, dt);
        if !running {
            return pose;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::ParkingBlueprint;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn references_drive_control() {
        let mut refs = References::new(&PlannerConfig::default());
        refs.add(1.0, 0.0, 1.0);
        refs.turn_wheel(0.4);
        refs.add(-1.0, 0.4, 1.0);
        refs.halt();
        assert_approx_eq!(refs.duration(), 2.0);

        let mut control = CruiseControl::default();
        assert!(refs.update(&mut control, 0.5));
        assert_approx_eq!(control.speed_ref(), 1.0);
        assert!(refs.update(&mut control, 1.0));
        assert_approx_eq!(control.speed_ref(), -1.0);
        assert_approx_eq!(control.steering_ref(), 0.4);
        assert!(!refs.update(&mut control, 0.5));
        assert_approx_eq!(control.speed_ref(), 0.0);
    }

    #[test]
    #[should_panic]
    fn zero_speed_is_rejected() {
        References::new(&PlannerConfig {
            max_speed: 0.0,
            ..Default::default()
        });
    }

    #[test]
    fn dispatch_by_slot_kind() {
        let car = CarBlueprint::new(3.615, 1.646, 2.492, 0.494, 0.328, 10.0);
        let config = PlannerConfig::default();
        let slot = ParkingSlot::new(ParkingBlueprint::new(6.0, 2.0, 0.0), Point2d::new(100.0, 100.0));
        let trajectory =
            Trajectory::plan(&car, Pose::new(100.0, 102.0, 0.0), &slot, true, &config).unwrap();
        assert_eq!(trajectory.kind(), SlotKind::Parallel);
        assert!(!trajectory.ended());

        let slot = ParkingSlot::new(ParkingBlueprint::new(5.0, 2.5, 90.0), Point2d::new(100.0, 100.0));
        let err = Trajectory::plan(&car, Pose::new(100.0, 105.0, 0.0), &slot, true, &config);
        assert_eq!(
            err.unwrap_err(),
            PlanningError::NotImplemented {
                kind: SlotKind::Perpendicular,
                entering: true
            }
        );
    }

    #[test]
    fn error_messages() {
        let err = PlanningError::NotImplemented {
            kind: SlotKind::Diagonal,
            entering: false,
        };
        assert_eq!(err.to_string(), "leaving a Diagonal slot is not implemented");
    }
}
