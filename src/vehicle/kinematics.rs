//! Kinematic motion models.

use super::Pose;
use crate::math::direction;

/// Advances a car with the bicycle model.
///
/// # Parameters
/// * `pose` - The pose of the rear axle
/// * `speed` - The signed speed in m/s
/// * `steering` - The front wheel angle in radians
/// * `wheelbase` - The distance between the axles in m
/// * `dt` - The time step in seconds
pub fn bicycle(pose: Pose, speed: f64, steering: f64, wheelbase: f64, dt: f64) -> Pose {
    let heading = pose.heading + dt * speed * steering.tan() / wheelbase;
    Pose {
        position: pose.position + dt * speed * direction(heading),
        heading,
    }
}

/// Advances a trailer towed from the rear axle of `front`.
///
/// # Parameters
/// * `front` - The already updated pose of the towing body
/// * `heading` - The trailer's heading before the step
/// * `speed` - The speed of the towing body in m/s
/// * `wheelbase` - The distance from the hitch to the trailer axle in m
/// * `dt` - The time step in seconds
pub fn towed(front: Pose, heading: f64, speed: f64, wheelbase: f64, dt: f64) -> Pose {
    let heading = heading + dt * speed * (front.heading - heading).sin() / wheelbase;
    Pose {
        position: front.position - wheelbase * direction(heading),
        heading,
    }
}
