//! Leaving a slot perpendicular to the lane with a single quarter turn.

use super::{PlanningError, References};
use crate::debug::{debug_circle, debug_line};
use crate::math::{direction, rot90, wrap_angle, Point2d};
use crate::vehicle::Pose;
use crate::{CarBlueprint, ParkingSlot, PlannerConfig, SlotKind, TurningRadius};
use std::f64::consts::FRAC_PI_2;

/// Distance driven straight out of the slot before turning, in m.
const APPROACH: f64 = 2.0;

/// Distance driven straight along the lane after the turn, in m.
const EXIT: f64 = 1.0;

/// Drives forward out of a perpendicular slot and turns right onto the lane.
#[derive(Clone, Debug)]
pub struct PerpendicularPlan {
    pub(super) refs: References,
    /// Centre of the quarter turn.
    center: Point2d,
    radius: f64,
    /// Where the vehicle should be once the maneuver ends.
    end: Pose,
}

impl PerpendicularPlan {
    pub(crate) fn new(
        car: &CarBlueprint,
        pose: Pose,
        _slot: &ParkingSlot,
        entering: bool,
        config: &PlannerConfig,
    ) -> Result<Self, PlanningError> {
        if entering {
            return Err(PlanningError::NotImplemented {
                kind: SlotKind::Perpendicular,
                entering,
            });
        }

        let v = config.max_speed;
        let radius = TurningRadius::min(car).rear_axle();
        let forward = direction(pose.heading);
        let turned = direction(pose.heading - FRAC_PI_2);
        let center = pose.position + APPROACH * forward - radius * rot90(forward);
        let end = Pose {
            position: center + radius * forward + EXIT * turned,
            heading: wrap_angle(pose.heading - FRAC_PI_2),
        };

        let mut refs = References::new(config);
        refs.turn_wheel(0.0);
        refs.add(v, 0.0, APPROACH / v);
        refs.turn_wheel(-car.max_steering);
        refs.add(v, -car.max_steering, FRAC_PI_2 * radius / v);
        refs.turn_wheel(0.0);
        refs.add(v, 0.0, EXIT / v);
        refs.halt();

        Ok(Self {
            refs,
            center,
            radius,
            end,
        })
    }

    pub fn references(&self) -> &References {
        &self.refs
    }

    /// The pose the maneuver should end at.
    pub fn end(&self) -> Pose {
        self.end
    }

    pub(super) fn draw_debug(&self) {
        debug_circle("perpendicular turn", self.center, self.radius);
        debug_line(
            "perpendicular exit",
            self.end.position - EXIT * direction(self.end.heading),
            self.end.position,
        );
    }
}
