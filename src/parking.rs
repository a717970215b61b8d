use crate::math::{direction, rotate, OrientedBox, Point2d, Vector2d};
use crate::vehicle::Pose;
use crate::{CarBlueprint, ParkingBlueprint, VehicleId};
use std::f64::consts::FRAC_PI_2;

/// Lane angles closer than this to 0 or 90 degrees are treated as exact, in radians.
const ANGLE_TOLERANCE: f64 = 1e-3;

/// The orientation of a slot relative to the lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Parallel,
    Perpendicular,
    Diagonal,
}

impl SlotKind {
    /// Classifies a lane angle in radians.
    pub fn from_angle(angle: f64) -> Self {
        if angle.abs() < ANGLE_TOLERANCE {
            SlotKind::Parallel
        } else if (angle - FRAC_PI_2).abs() < ANGLE_TOLERANCE {
            SlotKind::Perpendicular
        } else {
            SlotKind::Diagonal
        }
    }
}

/// A parking slot along a lane.
#[derive(Clone, Debug)]
pub struct ParkingSlot {
    blueprint: ParkingBlueprint,
    /// The middle of the slot's near short side.
    position: Point2d,
    obb: OrientedBox,
    /// The vehicle parked in the slot, if any.
    occupant: Option<VehicleId>,
}

impl ParkingSlot {
    pub fn new(blueprint: ParkingBlueprint, position: Point2d) -> Self {
        let obb = OrientedBox::new(
            Vector2d::new(blueprint.length, blueprint.width),
            Vector2d::new(0.0, 0.5 * blueprint.width),
        )
        .placed(position, blueprint.angle);
        Self {
            blueprint,
            position,
            obb,
            occupant: None,
        }
    }

    pub fn kind(&self) -> SlotKind {
        SlotKind::from_angle(self.blueprint.angle)
    }

    pub fn blueprint(&self) -> &ParkingBlueprint {
        &self.blueprint
    }

    /// Length in m.
    pub fn length(&self) -> f64 {
        self.blueprint.length
    }

    /// Depth in m.
    pub fn width(&self) -> f64 {
        self.blueprint.width
    }

    /// Lane angle in radians.
    pub fn angle(&self) -> f64 {
        self.blueprint.angle
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn obb(&self) -> &OrientedBox {
        &self.obb
    }

    /// The far end of the slot, where the next slot of a row starts.
    pub fn delta(&self) -> Point2d {
        self.position + self.blueprint.length * direction(self.blueprint.angle)
    }

    /// Whether the point lies within the slot.
    pub fn contains(&self, point: Point2d) -> bool {
        self.obb.contains(point)
    }

    pub fn occupant(&self) -> Option<VehicleId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// The rear axle pose of a car parked centred in the slot.
    pub fn bind_pose(&self, car: &CarBlueprint) -> Pose {
        let along = car.back_overhang + 0.5 * (self.blueprint.length - car.length);
        Pose {
            position: self.position + rotate(Vector2d::new(along, 0.0), self.blueprint.angle),
            heading: self.blueprint.angle,
        }
    }

    /// Records `vehicle` as parked in the slot.
    pub(crate) fn bind(&mut self, vehicle: VehicleId) {
        self.occupant = Some(vehicle);
    }

    pub(crate) fn unbind(&mut self) {
        self.occupant = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn classify_angles() {
        assert_eq!(SlotKind::from_angle(0.0), SlotKind::Parallel);
        assert_eq!(SlotKind::from_angle(90f64.to_radians()), SlotKind::Perpendicular);
        assert_eq!(SlotKind::from_angle(45f64.to_radians()), SlotKind::Diagonal);
        assert_eq!(SlotKind::from_angle(75f64.to_radians()), SlotKind::Diagonal);
    }

    #[test]
    fn bind_pose_centres_car() {
        let car = CarBlueprint::new(3.615, 1.646, 2.492, 0.494, 0.328, 10.0);
        let slot = ParkingSlot::new(ParkingBlueprint::new(5.0, 2.0, 0.0), Point2d::new(97.5, 100.0));
        let pose = slot.bind_pose(&car);
        assert_approx_eq!(pose.position.x, 97.5 + 0.494 + 0.6925);
        assert_approx_eq!(pose.position.y, 100.0);
        assert!(slot.contains(pose.position));
        assert_approx_eq!(slot.delta().x, 102.5);
    }

    #[test]
    fn occupancy() {
        let mut slot = ParkingSlot::new(ParkingBlueprint::new(5.0, 2.0, 0.0), Point2d::new(0.0, 0.0));
        assert!(slot.is_empty());
        slot.bind(VehicleId::default());
        assert_eq!(slot.occupant(), Some(VehicleId::default()));
        slot.unbind();
        assert!(slot.is_empty());
    }
}
