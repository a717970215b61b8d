//! The simulated car, its trailers and its sensors.

use crate::math::{OrientedBox, Point2d, Vector2d};
use crate::sensor::Radar;
use crate::trajectory::{PlanningError, Trajectory};
use crate::{CarBlueprint, ParkingSlot, PlannerConfig, TrailerBlueprint, VehicleId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

pub use self::control::CruiseControl;
pub use self::shape::{VehicleShape, Wheel};
pub use self::trailer::Trailer;

mod control;
pub mod kinematics;
mod shape;
mod trailer;

/// Range of the side radar in m.
const RADAR_RANGE: f64 = 4.0;

/// Width of the side radar beam in m.
const RADAR_BEAM_WIDTH: f64 = 0.1;

/// Position and heading of a body, taken at the middle of its rear axle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// World position in m.
    pub position: Point2d,
    /// Heading in radians, counter-clockwise from the x-axis.
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Point2d::new(x, y),
            heading,
        }
    }
}

/// The state of the turning indicator stalk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurningIndicator {
    #[default]
    Off,
    Left,
    Right,
}

/// A simulated car.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The vehicle's dimensions.
    blueprint: CarBlueprint,
    /// The pose of the rear axle.
    pose: Pose,
    /// The signed longitudinal speed in m/s.
    speed: f64,
    /// The front wheel angle in radians.
    steering: f64,
    /// Turns speed and steering references into actuator outputs.
    control: CruiseControl,
    /// The parking maneuver being driven, if any.
    trajectory: Option<Trajectory>,
    /// Parameters used when planning a maneuver.
    planner: PlannerConfig,
    /// Towed trailers, front to back.
    trailers: Vec<Trailer>,
    /// Body and wheel shapes.
    shape: VehicleShape,
    /// The right side radar.
    radar: Radar,
    indicator: TurningIndicator,
    /// Whether the vehicle has hit another one.
    collided: bool,
}

impl Vehicle {
    /// Creates a new vehicle at the origin.
    pub(crate) fn new(id: VehicleId, blueprint: &CarBlueprint) -> Self {
        let k = 0.5 * (blueprint.width - blueprint.wheel_width);
        let mut vehicle = Self {
            id,
            blueprint: *blueprint,
            pose: Pose::new(0.0, 0.0, 0.0),
            speed: 0.0,
            steering: 0.0,
            control: Default::default(),
            trajectory: None,
            planner: Default::default(),
            trailers: vec![],
            shape: VehicleShape::new(blueprint),
            radar: Radar::new(
                RADAR_RANGE,
                RADAR_BEAM_WIDTH,
                Vector2d::new(0.0, -k),
                -FRAC_PI_2,
            ),
            indicator: TurningIndicator::Off,
            collided: false,
        };
        vehicle.refresh_shapes();
        vehicle
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's dimensions.
    pub fn blueprint(&self) -> &CarBlueprint {
        &self.blueprint
    }

    /// The pose of the middle of the rear axle.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The world position of the middle of the rear axle.
    pub fn position(&self) -> Point2d {
        self.pose.position
    }

    /// The heading in radians.
    pub fn heading(&self) -> f64 {
        self.pose.heading
    }

    /// The signed speed in m/s, negative when reversing.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The front wheel angle in radians, positive to the left.
    pub fn steering(&self) -> f64 {
        self.steering
    }

    pub fn shape(&self) -> &VehicleShape {
        &self.shape
    }

    /// The vehicle's body as an oriented box.
    pub fn obb(&self) -> &OrientedBox {
        self.shape.body()
    }

    pub fn radar(&self) -> &Radar {
        &self.radar
    }

    pub fn trailers(&self) -> &[Trailer] {
        &self.trailers
    }

    pub fn control(&self) -> &CruiseControl {
        &self.control
    }

    /// The maneuver being driven, if any.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Whether the vehicle is currently driving a parking maneuver.
    pub fn is_maneuvering(&self) -> bool {
        self.trajectory.is_some()
    }

    pub fn turning_indicator(&self) -> TurningIndicator {
        self.indicator
    }

    pub fn set_turning_indicator(&mut self, indicator: TurningIndicator) {
        self.indicator = indicator;
    }

    /// Whether the vehicle has collided with another since it was created.
    pub fn collided(&self) -> bool {
        self.collided
    }

    pub(crate) fn set_collided(&mut self) {
        self.collided = true;
    }

    /// Sets the parameters used by [Vehicle::park].
    pub fn set_planner_config(&mut self, config: PlannerConfig) {
        self.planner = config;
    }

    /// Hitches a trailer behind the last body of the vehicle.
    pub fn attach_trailer(&mut self, blueprint: &TrailerBlueprint) {
        let front = self.trailers.last().map_or(self.pose, |t| t.pose());
        self.trailers.push(Trailer::new(blueprint, front));
    }

    /// Places the vehicle, straightening any trailers behind it.
    pub fn init(&mut self, pose: Pose, speed: f64, steering: f64) {
        self.pose = pose;
        self.speed = speed;
        self.steering = steering;
        self.control.set_references(speed, steering);
        let mut front = pose;
        for trailer in &mut self.trailers {
            trailer.place_behind(front);
            front = trailer.pose();
        }
        self.refresh_shapes();
    }

    /// Sets the speed and steering the vehicle should drive with.
    /// Overridden by any active maneuver.
    pub fn set_references(&mut self, speed: f64, steering: f64) {
        self.control.set_references(speed, steering);
    }

    /// Plans a maneuver into or out of `slot` from the current pose, and starts driving it.
    pub fn park(&mut self, slot: &ParkingSlot, entering: bool) -> Result<(), PlanningError> {
        self.trajectory = None;
        let trajectory = Trajectory::plan(&self.blueprint, self.pose, slot, entering, &self.planner)?;
        info!(
            "{} {:?} slot: {} segments over {:.2} s",
            if entering { "entering" } else { "leaving" },
            slot.kind(),
            trajectory.references().speeds().len(),
            trajectory.references().duration(),
        );
        self.trajectory = Some(trajectory);
        Ok(())
    }

    /// Cancels any maneuver and brings the vehicle to a halt.
    pub fn stop(&mut self) {
        self.trajectory = None;
        self.control.reset();
        self.speed = 0.0;
        self.steering = 0.0;
    }

    /// Advances the vehicle by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        let finished = self
            .trajectory
            .as_mut()
            .map_or(false, |trajectory| !trajectory.update(&mut self.control, dt));
        if finished {
            debug!("vehicle {:?} finished its maneuver", self.id);
            self.trajectory = None;
        }

        let (speed, steering) = self.control.update();
        self.speed = speed;
        self.steering = steering;

        self.pose = kinematics::bicycle(self.pose, speed, steering, self.blueprint.wheelbase, dt);
        let mut front = self.pose;
        for trailer in &mut self.trailers {
            trailer.update(front, speed, dt);
            front = trailer.pose();
        }

        self.refresh_shapes();
    }

    /// Moves the body, wheel and sensor shapes to the current pose.
    fn refresh_shapes(&mut self) {
        self.shape.update(self.pose, self.steering);
        self.radar.update(self.pose);
    }
}
