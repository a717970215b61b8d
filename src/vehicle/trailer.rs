use super::{kinematics, Pose};
use crate::math::{direction, OrientedBox, Vector2d};
use crate::TrailerBlueprint;

/// A trailer towed from the rear axle of the body in front of it.
#[derive(Clone, Debug)]
pub struct Trailer {
    blueprint: TrailerBlueprint,
    /// The pose of the trailer axle.
    pose: Pose,
    body: OrientedBox,
}

impl Trailer {
    /// Creates a trailer lined up behind `front`.
    pub(crate) fn new(blueprint: &TrailerBlueprint, front: Pose) -> Self {
        let mut trailer = Self {
            blueprint: *blueprint,
            pose: front,
            body: OrientedBox::new(
                Vector2d::new(blueprint.length, blueprint.width),
                Vector2d::new(blueprint.back_overhang, 0.5 * blueprint.width),
            ),
        };
        trailer.place_behind(front);
        trailer
    }

    pub fn blueprint(&self) -> &TrailerBlueprint {
        &self.blueprint
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn obb(&self) -> &OrientedBox {
        &self.body
    }

    /// Lines the trailer up straight behind `front`.
    pub(crate) fn place_behind(&mut self, front: Pose) {
        self.pose = Pose {
            position: front.position - self.blueprint.wheelbase * direction(front.heading),
            heading: front.heading,
        };
        self.body.set(self.pose.position, self.pose.heading);
    }

    /// Follows the already updated body in front.
    pub(crate) fn update(&mut self, front: Pose, speed: f64, dt: f64) {
        self.pose = kinematics::towed(front, self.pose.heading, speed, self.blueprint.wheelbase, dt);
        self.body.set(self.pose.position, self.pose.heading);
    }
}
