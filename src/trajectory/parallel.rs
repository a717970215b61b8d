//! Parallel parking, after "Easy Path Planning and Robust Control for Automatic
//! Parallel Parking" (Hsieh & Ozguner). The car reverses into the slot along arcs
//! of minimum turning radius, shuffling back and forth when the slot is short.

use super::{checked, PlanningError, References};
use crate::debug::{debug_circle, debug_line};
use crate::math::{Point2d, Vector2d};
use crate::vehicle::Pose;
use crate::{CarBlueprint, ParkingSlot, PlannerConfig, TurningRadius};
use arrayvec::ArrayVec;
use log::debug;
use std::f64::consts::FRAC_PI_2;

/// The maximum number of arcs in a parallel maneuver.
pub const MAX_MANEUVERS: usize = 64;

/// A maneuver into or out of a parallel slot.
#[derive(Clone, Debug)]
pub struct ParallelPlan {
    pub(super) refs: References,
    entering: bool,
    turning: TurningRadius,
    /// The shortest slot enterable in a single maneuver, in m.
    min_length: f64,
    /// The arcs, starting from the one ending in the slot.
    path: Path,
}

/// The geometry of a parallel maneuver, laid out from the slot outwards.
#[derive(Clone, Debug)]
struct Path {
    /// The rear axle at the end of the arcs, against the back of the slot.
    slot_point: Point2d,
    /// Where the arcs meet the lane.
    lane_point: Point2d,
    /// Rotation of each arc in radians.
    angles: ArrayVec<f64, MAX_MANEUVERS>,
    /// Centre of each arc's turning circle.
    centers: ArrayVec<Point2d, MAX_MANEUVERS>,
}

impl Path {
    fn new(slot_point: Point2d) -> Self {
        Self {
            slot_point,
            lane_point: slot_point,
            angles: ArrayVec::new(),
            centers: ArrayVec::new(),
        }
    }

    fn push(&mut self, angle: f64, center: Point2d) -> Result<(), PlanningError> {
        if self.angles.is_full() {
            return Err(PlanningError::TooManyManeuvers(MAX_MANEUVERS));
        }
        self.angles.push(angle);
        self.centers.push(center);
        Ok(())
    }

    /// Closes the path with a pair of tangent arcs reaching the lane at `lane_y`.
    /// `total` is the rotation already accumulated by the previous arcs.
    fn close(
        &mut self,
        center: Point2d,
        total: f64,
        lane_y: f64,
        radius: f64,
    ) -> Result<(), PlanningError> {
        let lane_center_y = lane_y - radius;
        let touch_y = 0.5 * (center.y + lane_center_y);
        let d = radius.powi(2) - (touch_y - center.y).powi(2);
        if d < 0.0 {
            return Err(PlanningError::TooFarFromSlot);
        }
        let touch_x = center.x + d.sqrt();
        let start_x = 2.0 * touch_x - center.x;
        let angle = f64::atan2(touch_x - center.x, center.y - touch_y);
        self.push(checked(angle - total, "closing arc turns backwards")?, center)?;
        self.push(angle, Point2d::new(start_x, lane_center_y))?;
        self.lane_point = Point2d::new(start_x, lane_y);
        Ok(())
    }
}

impl ParallelPlan {
    pub(crate) fn new(
        car: &CarBlueprint,
        pose: Pose,
        slot: &ParkingSlot,
        entering: bool,
        config: &PlannerConfig,
    ) -> Result<Self, PlanningError> {
        if slot.length() <= car.length {
            return Err(PlanningError::SlotTooShort {
                slot: slot.length(),
                vehicle: car.length,
            });
        }

        let turning = TurningRadius::min(car);
        let min_length = turning.min_parallel_length(car);
        let lane_y = if entering {
            pose.position.y
        } else {
            slot.position().y + config.leave_lane_offset
        };
        let clearance = config.clearance;
        let path = if slot.length() >= min_length + 2.0 * clearance {
            single_maneuver(car, &turning, slot, lane_y, clearance)?
        } else {
            multi_maneuver(car, &turning, slot, lane_y, clearance)?
        };
        debug!(
            "parallel path: {} arcs, lane point ({:.3}, {:.3}), min length {:.3} m",
            path.angles.len(),
            path.lane_point.x,
            path.lane_point.y,
            min_length
        );

        let mut plan = Self {
            refs: References::new(config),
            entering,
            turning,
            min_length,
            path,
        };
        if entering {
            plan.entering_references(car, pose, slot, config);
        } else {
            plan.leaving_references(car, pose, config);
        }
        Ok(plan)
    }

    pub fn references(&self) -> &References {
        &self.refs
    }

    pub fn entering(&self) -> bool {
        self.entering
    }

    /// The radii at maximum steering.
    pub fn turning(&self) -> &TurningRadius {
        &self.turning
    }

    /// The shortest slot enterable in a single maneuver, in m.
    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    /// The number of arcs driven.
    pub fn maneuvers(&self) -> usize {
        self.path.angles.len()
    }

    /// The rotation of each arc in radians, from the slot outwards.
    pub fn angles(&self) -> &[f64] {
        &self.path.angles
    }

    /// The centre of each arc's turning circle, from the slot outwards.
    pub fn centers(&self) -> &[Point2d] {
        &self.path.centers
    }

    /// Where the arcs meet the lane.
    pub fn lane_point(&self) -> Point2d {
        self.path.lane_point
    }

    /// Where the arcs end inside the slot.
    pub fn slot_point(&self) -> Point2d {
        self.path.slot_point
    }

    /// The `(speed, steering)` used on arc `i` while entering.
    fn entering_arc(&self, i: usize, speed: f64, steering: f64) -> (f64, f64) {
        if i + 1 == self.path.angles.len() {
            (-speed, -steering)
        } else if i % 2 == 0 {
            (-speed, steering)
        } else {
            (speed, -steering)
        }
    }

    /// Drives to the lane point, then replays the arcs from the lane into the slot.
    fn entering_references(
        &mut self,
        car: &CarBlueprint,
        pose: Pose,
        slot: &ParkingSlot,
        config: &PlannerConfig,
    ) {
        let v = config.max_speed;
        let radius = self.turning.rear_axle();

        self.refs.turn_wheel(0.0);
        let dx = self.path.lane_point.x - pose.position.x;
        self.refs.add(v.copysign(dx), 0.0, dx.abs() / v);

        for i in (0..self.path.angles.len()).rev() {
            let (speed, steering) = self.entering_arc(i, v, car.max_steering);
            self.refs.turn_wheel(steering);
            self.refs.add(speed, steering, self.path.angles[i] * radius / v);
        }

        self.refs.turn_wheel(0.0);
        let centering = slot.bind_pose(car).position.x - self.path.slot_point.x;
        self.refs.add(v.copysign(centering), 0.0, centering.abs() / v);
        self.refs.halt();
    }

    /// Backs up against the rear of the slot, then drives the arcs out to the lane.
    fn leaving_references(&mut self, car: &CarBlueprint, pose: Pose, config: &PlannerConfig) {
        let v = config.max_speed;
        let radius = self.turning.rear_axle();

        self.refs.turn_wheel(0.0);
        let dx = self.path.slot_point.x - pose.position.x;
        self.refs.add(v.copysign(dx), 0.0, dx.abs() / v);

        for i in 0..self.path.angles.len() {
            let (speed, steering) = self.entering_arc(i, v, car.max_steering);
            self.refs.turn_wheel(steering);
            self.refs.add(-speed, steering, self.path.angles[i] * radius / v);
        }
        self.refs.halt();
    }

    pub(super) fn draw_debug(&self) {
        let radius = self.turning.rear_axle();
        for center in &self.path.centers {
            debug_circle("parallel turn", *center, radius);
        }
        debug_line("parallel lane", self.path.lane_point, self.path.slot_point);
    }
}

/// The rear axle against the back of the slot, `clearance` m from the car behind.
fn slot_point(car: &CarBlueprint, slot: &ParkingSlot, clearance: f64) -> Point2d {
    slot.position() + Vector2d::new(clearance + car.back_overhang, 0.0)
}

/// Two tangent arcs from the lane straight into the slot.
fn single_maneuver(
    car: &CarBlueprint,
    turning: &TurningRadius,
    slot: &ParkingSlot,
    lane_y: f64,
    clearance: f64,
) -> Result<Path, PlanningError> {
    let radius = turning.rear_axle();
    let mut path = Path::new(slot_point(car, slot, clearance));
    let center = path.slot_point + Vector2d::new(0.0, radius);
    path.close(center, 0.0, lane_y, radius)?;
    Ok(path)
}

/// Shuffles out of the slot, alternating forward-left and backward-right arcs
/// bounded by the cars in front and behind, until the front corner clears the
/// car in front. The path is computed from the slot outwards.
fn multi_maneuver(
    car: &CarBlueprint,
    turning: &TurningRadius,
    slot: &ParkingSlot,
    lane_y: f64,
    clearance: f64,
) -> Result<Path, PlanningError> {
    let TurningRadius {
        internal, external, ..
    } = *turning;
    let radius = turning.rear_axle();
    let (bo, w) = (car.back_overhang, car.width);

    // Bounds of the slot: the cars behind and in front, less the clearance kept to
    // them, and the right side of the parked car
    let rear = slot.position().x + clearance;
    let front = slot.position().x + slot.length();
    let floor = slot.position().y - 0.5 * w;

    // Angle between the rear axle and the front corner, seen from the turning centre
    let theta_s = ((car.length + clearance - bo) / external).asin();
    // The rear right corner's radius when turning right, and its angle to the rear axle
    let rear_corner = (bo.powi(2) + (internal + w).powi(2)).sqrt();
    let theta_p = ((internal + w) / rear_corner).acos();

    let mut path = Path::new(slot_point(car, slot, clearance));
    let mut center = path.slot_point + Vector2d::new(0.0, radius);
    let first = ((front - center.x) / external).asin() - theta_s;
    let mut total = checked(first, "first arc turns backwards")?;
    let mut touch = center + radius * Vector2d::new(total.sin(), -total.cos());
    path.push(total, center)?;

    for i in 1.. {
        if i + 2 >= MAX_MANEUVERS {
            return Err(PlanningError::TooManyManeuvers(MAX_MANEUVERS));
        }
        center = touch + (touch - center);
        let angle = if i % 2 == 0 {
            // Forward left, until the front corner touches the car in front
            let reach = external.powi(2) - (front - center.x).powi(2);
            if reach < 0.0 || center.y - reach.sqrt() - floor > slot.width() {
                break;
            }
            let angle = ((front - center.x) / external).asin() - total - theta_s;
            checked(angle, "forward arc turns backwards")?
        } else {
            // Backward right, until the rear corner touches the car behind
            let gap = ((center.x - rear) / rear_corner).acos();
            checked(FRAC_PI_2 - total - theta_p - gap, "backward arc turns backwards")?
        };
        total += angle;
        touch = if i % 2 == 0 {
            center + radius * Vector2d::new(total.sin(), -total.cos())
        } else {
            center + radius * Vector2d::new(-total.sin(), total.cos())
        };
        path.push(angle, center)?;
    }

    path.close(center, total, lane_y, radius)?;
    Ok(path)
}
