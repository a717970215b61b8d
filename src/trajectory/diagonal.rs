//! Reversing into a slot at an angle to the lane with two arcs of decreasing radius.
//! The geometry is approximate: the distances below were tuned by hand.

use super::{checked, PlanningError, References};
use crate::debug::debug_line;
use crate::math::Point2d;
use crate::vehicle::Pose;
use crate::{CarBlueprint, ParkingSlot, PlannerConfig, SlotKind, TurningRadius};

/// Lateral offset of the first arc's chord, in m.
const D: f64 = 5.0;

/// Longitudinal offset between the slot corner and the start of the first arc, in m.
const DV: f64 = 3.1;

/// Clearance kept past the car in front of the slot, in m.
const QQ: f64 = 0.5;

/// Reverses from the lane into a diagonal slot.
#[derive(Clone, Debug)]
pub struct DiagonalPlan {
    pub(super) refs: References,
    /// The corner of the car in front of the slot.
    corner: Point2d,
    /// Where the vehicle starts reversing.
    start: Point2d,
    /// Rotation of the first and second arcs, in the order they are driven.
    angles: [f64; 2],
    /// Radius of the inner side of the first and second arcs.
    radii: [f64; 2],
    /// Steering magnitude on the first and second arcs.
    steerings: [f64; 2],
}

impl DiagonalPlan {
    pub(crate) fn new(
        car: &CarBlueprint,
        pose: Pose,
        slot: &ParkingSlot,
        entering: bool,
        config: &PlannerConfig,
    ) -> Result<Self, PlanningError> {
        if !entering {
            return Err(PlanningError::NotImplemented {
                kind: SlotKind::Diagonal,
                entering,
            });
        }

        let (l, w, e) = (car.length, car.width, car.wheelbase);
        let (sin, cos) = slot.angle().sin_cos();
        let k = 0.5 * w;
        let reach = l + car.front_overhang() + QQ;
        let p = slot.position();
        let corner = Point2d::new(p.x + reach * cos - k * sin, p.y + reach * sin + k * cos);
        let gap = pose.position.y - k - corner.y;

        // Arc next to the slot
        let n = l + DV * cos - car.back_overhang;
        let r1 = (n.powi(2) + D.powi(2)) / (2.0 * D) + k;
        let theta1 = (n / r1).asin();
        if !(theta1.is_finite() && theta1 > 0.0) {
            return Err(PlanningError::Infeasible("first arc does not turn"));
        }
        let beta1 = (e / (r1 + 0.5 * l)).atan();

        // Arc leaving the lane
        let theta2 = slot.angle() - theta1;
        if theta2 <= 0.0 {
            return Err(PlanningError::Infeasible("slot angle too shallow"));
        }
        let limit = (1.0 - theta2.cos()) * TurningRadius::min(car).internal;
        if gap <= limit {
            return Err(PlanningError::DeadZone { gap, limit });
        }
        let r2 = checked(gap / (1.0 - theta2.cos()) + k, "second arc radius")?;
        let beta2 = (e / (r2 + 0.5 * l)).atan();
        if beta1.max(beta2) > car.max_steering {
            return Err(PlanningError::Infeasible("steering beyond maximum"));
        }

        let start = Point2d::new(corner.x + DV + r2 * theta2.sin(), pose.position.y);

        let v = config.max_speed;
        let mut refs = References::new(config);
        refs.turn_wheel(0.0);
        let dx = start.x - pose.position.x;
        refs.add(v.copysign(dx), 0.0, dx.abs() / v);
        refs.turn_wheel(-beta2);
        refs.add(-v, -beta2, theta2 * r2 / v);
        refs.turn_wheel(-beta1);
        refs.add(-v, -beta1, theta1 * r1 / v);
        refs.turn_wheel(0.0);
        refs.halt();

        Ok(Self {
            refs,
            corner,
            start,
            angles: [theta2, theta1],
            radii: [r2, r1],
            steerings: [beta2, beta1],
        })
    }

    pub fn references(&self) -> &References {
        &self.refs
    }

    /// Where the vehicle starts reversing.
    pub fn start(&self) -> Point2d {
        self.start
    }

    /// Arc rotations in radians, in the order they are driven.
    pub fn angles(&self) -> [f64; 2] {
        self.angles
    }

    /// Arc radii in m, in the order they are driven.
    pub fn radii(&self) -> [f64; 2] {
        self.radii
    }

    /// Steering magnitudes in radians, in the order they are driven.
    pub fn steerings(&self) -> [f64; 2] {
        self.steerings
    }

    pub(super) fn draw_debug(&self) {
        debug_line("diagonal approach", self.start, self.corner);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trajectory::replay;
    use crate::ParkingBlueprint;
    use assert_approx_eq::assert_approx_eq;

    fn twingo() -> CarBlueprint {
        CarBlueprint::new(3.615, 1.646, 2.492, 0.494, 0.328, 10.0)
    }

    fn slot(angle: f64) -> ParkingSlot {
        ParkingSlot::new(
            ParkingBlueprint::new(5.0, 2.5, angle),
            Point2d::new(100.0, 100.0),
        )
    }

    fn plan(angle: f64, y: f64, entering: bool) -> Result<DiagonalPlan, PlanningError> {
        let start = Pose::new(110.0, y, 0.0);
        DiagonalPlan::new(&twingo(), start, &slot(angle), entering, &Default::default())
    }

    #[test]
    fn enter_steep_slot() {
        let plan = plan(75.0, 107.0, true).unwrap();
        assert_approx_eq!(plan.start().x, 111.211098, 1e-5);
        assert_approx_eq!(plan.start().y, 107.0);
        let [theta2, theta1] = plan.angles();
        assert_approx_eq!(theta1, 0.938879, 1e-5);
        assert_approx_eq!(theta2, 0.370118, 1e-5);
        let [r2, r1] = plan.radii();
        assert_approx_eq!(r1, 4.862259, 1e-5);
        assert_approx_eq!(r2, 21.226641, 1e-5);
        let [beta2, beta1] = plan.steerings();
        assert_approx_eq!(beta1, 0.357566, 1e-5);
        assert_approx_eq!(beta2, 0.107768, 1e-5);
        assert_approx_eq!(plan.references().duration(), 13.632533, 1e-5);
        assert_approx_eq!(theta1 + theta2, 75f64.to_radians());
    }

    #[test]
    fn replay_ends_in_slot() {
        let car = twingo();
        let start = Pose::new(110.0, 107.0, 0.0);
        let plan = plan(75.0, 107.0, true).unwrap();
        let end = replay(plan.references(), &car, start, 0.001);

        // The steering is computed for a radius half a car length wider than the
        // arc length driven, so the car turns less and stops about 16 degrees short.
        let slot = slot(75.0);
        assert!(slot.obb().contains(end.position));
        assert!(end.heading < slot.angle());
        assert_approx_eq!(end.heading, slot.angle(), 0.3);
        assert_approx_eq!(end.heading, 1.0255, 0.01);
    }

    #[test]
    fn dead_zone_near_lane() {
        match plan(75.0, 105.8, true) {
            Err(PlanningError::DeadZone { gap, limit }) => {
                assert_approx_eq!(gap, 0.1816, 1e-3);
                assert_approx_eq!(limit, 0.2378, 1e-3);
            }
            other => panic!("expected dead zone, got {other:?}"),
        }
    }

    #[test]
    fn shallow_slot_is_infeasible() {
        assert!(matches!(
            plan(45.0, 107.0, true),
            Err(PlanningError::Infeasible(_))
        ));
    }

    #[test]
    fn leaving_is_not_supported() {
        assert_eq!(
            plan(75.0, 107.0, false).unwrap_err(),
            PlanningError::NotImplemented {
                kind: SlotKind::Diagonal,
                entering: false
            }
        );
    }
}
