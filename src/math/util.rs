use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::{Basis2, Rad};
use std::f64::consts::PI;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Rotates a vector by `angle` radians, counter-clockwise.
pub fn rotate(vec: Vector2d, angle: f64) -> Vector2d {
    Basis2::from_angle(Rad(angle)).rotate_vector(vec)
}

/// The unit vector pointing along `heading`.
pub fn direction(heading: f64) -> Vector2d {
    Vector2d::new(heading.cos(), heading.sin())
}

/// Wraps an angle into the interval `(-PI, PI]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(Vector2d::new(2.0, 0.0), 0.5 * PI);
        assert_approx_eq!(v.x, 0.0);
        assert_approx_eq!(v.y, 2.0);
        assert_eq!(rot90(Vector2d::new(2.0, 0.0)), Vector2d::new(-0.0, 2.0));
    }

    #[test]
    fn wrap_angle_range() {
        assert_approx_eq!(wrap_angle(1.5 * PI), -0.5 * PI);
        assert_approx_eq!(wrap_angle(-0.5 * PI), -0.5 * PI);
        assert_approx_eq!(wrap_angle(2.5 * PI), 0.5 * PI);
    }
}
