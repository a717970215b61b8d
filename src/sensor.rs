use crate::math::{collide, rotate, OrientedBox, Vector2d};
use crate::vehicle::Pose;

/// A radar rigidly mounted on a vehicle, modelled as a thin beam.
#[derive(Clone, Debug)]
pub struct Radar {
    /// Mounting point relative to the rear axle, in the vehicle frame.
    offset: Vector2d,
    /// Beam direction relative to the vehicle heading, in radians.
    orientation: f64,
    /// The beam in world space.
    beam: OrientedBox,
}

impl Radar {
    /// Creates a radar whose beam of `range` m starts at `offset`.
    pub fn new(range: f64, beam_width: f64, offset: Vector2d, orientation: f64) -> Self {
        Self {
            offset,
            orientation,
            beam: OrientedBox::new(
                Vector2d::new(range, beam_width),
                Vector2d::new(0.0, 0.5 * beam_width),
            ),
        }
    }

    /// Moves the beam with the vehicle.
    pub(crate) fn update(&mut self, pose: Pose) {
        let position = pose.position + rotate(self.offset, pose.heading);
        self.beam.set(position, pose.heading + self.orientation);
    }

    pub fn offset(&self) -> Vector2d {
        self.offset
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// The beam in world space.
    pub fn obb(&self) -> &OrientedBox {
        &self.beam
    }

    /// Whether the beam hits the given shape.
    pub fn detects(&self, other: &OrientedBox) -> bool {
        collide(&self.beam, other).is_some()
    }
}
