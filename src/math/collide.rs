//! Separating axis test between two oriented boxes.

use super::{OrientedBox, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::InnerSpace;

/// Overlaps shorter than this are treated as touching, not colliding.
const TOLERANCE: f64 = 1e-4;

/// Tests two oriented boxes for intersection.
///
/// Returns the minimum translation vector which, applied to `a`, separates it from `b`.
/// It always points from the centre of `b` towards the centre of `a`.
pub fn collide(a: &OrientedBox, b: &OrientedBox) -> Option<Vector2d> {
    let (va, vb) = (a.vertices(), b.vertices());

    // Parallel edges share a normal, so two axes per box suffice
    let [ax, ay] = a.axes();
    let [bx, by] = b.axes();

    let mut mtv: Option<(f64, Vector2d)> = None;
    for axis in [ay, ax, by, bx] {
        let overlap = project(&va, axis).overlap_length(&project(&vb, axis));
        if overlap < TOLERANCE {
            return None;
        }
        if mtv.map_or(true, |(min, _)| overlap < min) {
            mtv = Some((overlap, axis));
        }
    }

    mtv.map(|(overlap, axis)| {
        let mtv = overlap * axis;
        if (a.center() - b.center()).dot(mtv) < 0.0 {
            -mtv
        } else {
            mtv
        }
    })
}

/// Projects the vertices onto the axis.
fn project(vertices: &[Point2d; 4], axis: Vector2d) -> Interval<f64> {
    let dots = vertices.iter().map(|v| v.x * axis.x + v.y * axis.y);
    Interval::enclosing(dots).unwrap_or_default()
}
