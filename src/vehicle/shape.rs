use super::Pose;
use crate::math::{rotate, OrientedBox, Vector2d};
use crate::CarBlueprint;
use smallvec::SmallVec;

/// A wheel attached to the car body.
#[derive(Clone, Copy, Debug)]
pub struct Wheel {
    /// Position of the wheel centre relative to the rear axle, in the body frame.
    offset: Vector2d,
    /// Whether the wheel turns with the steering.
    steerable: bool,
    obb: OrientedBox,
}

impl Wheel {
    pub fn offset(&self) -> Vector2d {
        self.offset
    }

    pub fn steerable(&self) -> bool {
        self.steerable
    }

    pub fn obb(&self) -> &OrientedBox {
        &self.obb
    }
}

/// The body and wheel outlines of a car.
#[derive(Clone, Debug)]
pub struct VehicleShape {
    body: OrientedBox,
    wheels: SmallVec<[Wheel; 4]>,
}

impl VehicleShape {
    pub fn new(car: &CarBlueprint) -> Self {
        let body = OrientedBox::new(
            Vector2d::new(car.length, car.width),
            Vector2d::new(car.back_overhang, 0.5 * car.width),
        );
        let k = 0.5 * (car.width - car.wheel_width);
        let r = car.wheel_radius;
        let wheel_box = OrientedBox::new(
            Vector2d::new(2.0 * r, car.wheel_width),
            Vector2d::new(r, 0.5 * car.wheel_width),
        );
        let wheels = [
            (car.wheelbase, k, true),
            (car.wheelbase, -k, true),
            (0.0, k, false),
            (0.0, -k, false),
        ]
        .into_iter()
        .map(|(x, y, steerable)| Wheel {
            offset: Vector2d::new(x, y),
            steerable,
            obb: wheel_box,
        })
        .collect();
        Self { body, wheels }
    }

    /// Moves the shapes to the pose of the rear axle.
    pub(crate) fn update(&mut self, pose: Pose, steering: f64) {
        self.body.set(pose.position, pose.heading);
        for wheel in &mut self.wheels {
            let position = pose.position + rotate(wheel.offset, pose.heading);
            let rotation = if wheel.steerable {
                pose.heading + steering
            } else {
                pose.heading
            };
            wheel.obb.set(position, rotation);
        }
    }

    pub fn body(&self) -> &OrientedBox {
        &self.body
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    /// Gets a wheel: front left, front right, rear left, rear right.
    ///
    /// # Panics
    /// Panics if `idx` is not a valid wheel index.
    pub fn wheel(&self, idx: usize) -> &Wheel {
        assert!(idx < self.wheels.len(), "no wheel at index {idx}");
        &self.wheels[idx]
    }
}
