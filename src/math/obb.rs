use super::{direction, project_local, rot90, rotate, Point2d, Vector2d};
use cgmath::EuclideanSpace;

/// A rectangle with a position and rotation in world space.
///
/// The rectangle spans `[0, size.x] x [0, size.y]` in its local frame. The local
/// point `origin` is placed at `position`, and the rectangle is rotated about it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// The length (local x) and width (local y) in m.
    size: Vector2d,
    /// The local point which is anchored at `position`.
    origin: Vector2d,
    /// The world position of the anchor.
    position: Point2d,
    /// The rotation in radians.
    rotation: f64,
}

impl OrientedBox {
    /// Creates a box anchored at the world origin with no rotation.
    pub fn new(size: Vector2d, origin: Vector2d) -> Self {
        Self {
            size,
            origin,
            position: Point2d::origin(),
            rotation: 0.0,
        }
    }

    /// Moves and rotates the box.
    pub fn set(&mut self, position: Point2d, rotation: f64) {
        self.position = position;
        self.rotation = rotation;
    }

    /// Returns a copy of the box moved to the given pose.
    pub fn placed(mut self, position: Point2d, rotation: f64) -> Self {
        self.set(position, rotation);
        self
    }

    pub fn size(&self) -> Vector2d {
        self.size
    }

    pub fn origin(&self) -> Vector2d {
        self.origin
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The unit vectors of the local x and y axes in world space.
    pub fn axes(&self) -> [Vector2d; 2] {
        let x_axis = direction(self.rotation);
        [x_axis, rot90(x_axis)]
    }

    /// Transforms a point from the box's local frame into world space.
    pub fn to_world(&self, local: Vector2d) -> Point2d {
        self.position + rotate(local - self.origin, self.rotation)
    }

    /// The four corners in world space, counter-clockwise from the local origin.
    pub fn vertices(&self) -> [Point2d; 4] {
        let (l, w) = (self.size.x, self.size.y);
        [
            Vector2d::new(0.0, 0.0),
            Vector2d::new(l, 0.0),
            Vector2d::new(l, w),
            Vector2d::new(0.0, w),
        ]
        .map(|corner| self.to_world(corner))
    }

    /// The centre of the box in world space.
    pub fn center(&self) -> Point2d {
        self.to_world(0.5 * self.size)
    }

    /// Whether the point lies inside the box or on its boundary.
    pub fn contains(&self, point: Point2d) -> bool {
        let [x_axis, y_axis] = self.axes();
        let local = project_local(point, self.position, x_axis, y_axis) + self.origin;
        (0.0..=self.size.x).contains(&local.x) && (0.0..=self.size.y).contains(&local.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn vertices_follow_origin_and_rotation() {
        let obb = OrientedBox::new(Vector2d::new(4.0, 2.0), Vector2d::new(1.0, 1.0))
            .placed(Point2d::new(10.0, 5.0), FRAC_PI_2);
        let v = obb.vertices();
        assert_approx_eq!(v[0].x, 11.0);
        assert_approx_eq!(v[0].y, 4.0);
        assert_approx_eq!(v[2].x, 9.0);
        assert_approx_eq!(v[2].y, 8.0);
        let c = obb.center();
        assert_approx_eq!(c.x, 10.0);
        assert_approx_eq!(c.y, 6.0);
    }

    #[test]
    fn contains_points() {
        let obb = OrientedBox::new(Vector2d::new(5.0, 2.0), Vector2d::new(0.0, 1.0))
            .placed(Point2d::new(100.0, 100.0), 0.0);
        assert!(obb.contains(Point2d::new(102.0, 100.5)));
        assert!(!obb.contains(Point2d::new(99.0, 100.0)));
        assert!(!obb.contains(Point2d::new(102.0, 101.5)));
    }
}
