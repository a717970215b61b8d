use crate::autopark::{AutoPark, AutoParkState};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::debug_obb;
use crate::math::{collide, OrientedBox, Point2d};
use crate::vehicle::{Pose, TurningIndicator, Vehicle};
use crate::{
    CarBlueprint, ParkingBlueprint, ParkingId, ParkingSet, ParkingSlot, SimulationConfig,
    VehicleId, VehicleSet,
};
use log::{debug, warn};
use slotmap::SecondaryMap;

/// A parking lot with parked cars and self-parking egos.
#[derive(Default)]
pub struct Simulation {
    config: SimulationConfig,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The parking slots.
    parkings: ParkingSet,
    /// The self-parking function of each ego vehicle.
    autoparks: SecondaryMap<VehicleId, AutoPark>,
    /// The current frame of simulation.
    frame: usize,
    /// The simulated time in s.
    time: f64,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation with default parameters.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Adds a vehicle at rest at `pose`.
    pub fn add_vehicle(&mut self, blueprint: &CarBlueprint, pose: Pose) -> VehicleId {
        let planner = self.config.planner;
        self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, blueprint);
            vehicle.set_planner_config(planner);
            vehicle.init(pose, 0.0, 0.0);
            vehicle
        })
    }

    /// Adds a vehicle that parks itself when its right indicator is switched on.
    pub fn add_ego_vehicle(&mut self, blueprint: &CarBlueprint, pose: Pose) -> VehicleId {
        let id = self.add_vehicle(blueprint, pose);
        let autopark = AutoPark::new(self.config.scan, &self.vehicles[id]);
        self.autoparks.insert(id, autopark);
        id
    }

    /// Adds a parking slot whose near short side is centred on `position`.
    pub fn add_parking(&mut self, blueprint: &ParkingBlueprint, position: Point2d) -> ParkingId {
        self.parkings.insert(ParkingSlot::new(*blueprint, position))
    }

    /// Adds `count` slots end to end, starting at `position`.
    pub fn add_parking_row(
        &mut self,
        blueprint: &ParkingBlueprint,
        position: Point2d,
        count: usize,
    ) -> Vec<ParkingId> {
        let mut position = position;
        (0..count)
            .map(|_| {
                let id = self.add_parking(blueprint, position);
                position = self.parkings[id].delta();
                id
            })
            .collect()
    }

    /// Moves a vehicle into a slot, at rest.
    pub fn park_vehicle(&mut self, vehicle_id: VehicleId, parking_id: ParkingId) {
        let vehicle = &mut self.vehicles[vehicle_id];
        let slot = &mut self.parkings[parking_id];
        vehicle.init(slot.bind_pose(vehicle.blueprint()), 0.0, 0.0);
        slot.bind(vehicle_id);
        if let Some(autopark) = self.autoparks.get_mut(vehicle_id) {
            autopark.set_slot(slot.clone());
        }
    }

    /// Switches a vehicle's turning indicator, which starts or aborts self-parking.
    pub fn set_turning_indicator(&mut self, vehicle_id: VehicleId, indicator: TurningIndicator) {
        self.vehicles[vehicle_id].set_turning_indicator(indicator);
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let detections = self.detect();
        self.update_autoparks(&detections, dt);
        self.integrate(dt);
        self.check_collisions();
        self.frame += 1;
        self.time += dt;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the parking slots in the simulation.
    pub fn iter_parkings(&self) -> impl Iterator<Item = (ParkingId, &ParkingSlot)> {
        self.parkings.iter()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// Gets a mutable reference to the vehicle with the given ID.
    pub fn get_vehicle_mut(&mut self, vehicle_id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[vehicle_id]
    }

    /// Gets a reference to the parking slot with the given ID.
    pub fn get_parking(&self, parking_id: ParkingId) -> &ParkingSlot {
        &self.parkings[parking_id]
    }

    /// The self-parking function of an ego vehicle.
    pub fn autopark(&self, vehicle_id: VehicleId) -> Option<&AutoPark> {
        self.autoparks.get(vehicle_id)
    }

    /// The self-parking state of an ego vehicle.
    pub fn autopark_state(&self, vehicle_id: VehicleId) -> Option<AutoParkState> {
        self.autoparks.get(vehicle_id).map(AutoPark::state)
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Evaluates the radar of each ego vehicle against every other vehicle.
    fn detect(&self) -> Vec<(VehicleId, bool)> {
        self.autoparks
            .keys()
            .map(|id| {
                let radar = self.vehicles[id].radar();
                let detected = self.vehicles.iter().any(|(other_id, other)| {
                    other_id != id
                        && (radar.detects(other.obb())
                            || other.trailers().iter().any(|t| radar.detects(t.obb())))
                });
                if detected {
                    debug_obb("radar", radar.obb());
                }
                (id, detected)
            })
            .collect()
    }

    /// Runs the self-parking function of each ego vehicle.
    fn update_autoparks(&mut self, detections: &[(VehicleId, bool)], dt: f64) {
        for (id, detected) in detections {
            let vehicle = &mut self.vehicles[*id];
            let autopark = &mut self.autoparks[*id];
            if autopark.update(vehicle, *detected, dt) == Some(AutoParkState::Done) {
                self.update_occupancy(*id);
            }
        }
    }

    /// Binds an ego vehicle to the slot it has stopped in, if any.
    fn update_occupancy(&mut self, vehicle_id: VehicleId) {
        let position = self.vehicles[vehicle_id].position();
        for (parking_id, slot) in &mut self.parkings {
            if slot.occupant() == Some(vehicle_id) && !slot.contains(position) {
                debug!("vehicle {:?} left slot {:?}", vehicle_id, parking_id);
                slot.unbind();
            } else if slot.is_empty() && slot.contains(position) {
                debug!("vehicle {:?} parked in slot {:?}", vehicle_id, parking_id);
                slot.bind(vehicle_id);
            }
        }
    }

    /// The body of a vehicle followed by its trailers.
    fn boxes(vehicle: &Vehicle) -> impl Iterator<Item = &OrientedBox> {
        std::iter::once(vehicle.obb()).chain(vehicle.trailers().iter().map(|t| t.obb()))
    }

    /// Integrates the motion of all vehicles.
    fn integrate(&mut self, dt: f64) {
        for (_, vehicle) in &mut self.vehicles {
            vehicle.update(dt);
        }
    }

    /// Flags ego vehicles whose body or trailers hit another vehicle or its trailers.
    fn check_collisions(&mut self) {
        let mut collided = vec![];
        for id in self.autoparks.keys() {
            let ego = &self.vehicles[id];
            for (other_id, other) in &self.vehicles {
                if other_id != id
                    && Self::boxes(ego).any(|a| Self::boxes(other).any(|b| collide(a, b).is_some()))
                {
                    collided.push((id, other_id));
                }
            }
        }

        for (id, other_id) in collided {
            let ego = &mut self.vehicles[id];
            if !ego.collided() {
                warn!(
                    "vehicle {:?} collided with {:?} at ({:.2}, {:.2})",
                    id,
                    other_id,
                    ego.position().x,
                    ego.position().y
                );
                debug_obb("collision", ego.obb());
            }
            ego.set_collided();
        }
    }
}
