//! Tests that run the whole self-parking function in a parking lane.

use assert_approx_eq::assert_approx_eq;
use self_parking::{
    math::Point2d, AutoParkState, Blueprints, ParkingBlueprint, ParkingSlot, PlannerConfig, Pose,
    Simulation, TurningIndicator, VehicleId,
};

const DT: f64 = 0.01;

/// A row of `slots` parallel slots from (97.5, 100), with parked Twingos in `occupied`,
/// and an ego Twingo on the lane at (97.5, 105).
fn parking_lane(slots: usize, occupied: &[usize]) -> (Simulation, VehicleId) {
    let blueprints = Blueprints::builtin();
    let car = blueprints.car("Renault.Twingo").unwrap();
    let parking = blueprints.parking("epi.0").unwrap();
    let mut sim = Simulation::new();
    let row = sim.add_parking_row(parking, Point2d::new(97.5, 100.0), slots);
    for idx in occupied {
        let id = sim.add_vehicle(car, Pose::new(0.0, 0.0, 0.0));
        sim.park_vehicle(id, row[*idx]);
    }
    let ego = sim.add_ego_vehicle(car, Pose::new(97.5, 105.0, 0.0));
    (sim, ego)
}

/// Steps until the ego's self-parking reaches `state`, returning false on timeout.
fn run_until(sim: &mut Simulation, ego: VehicleId, state: AutoParkState, timeout: f64) -> bool {
    let end = sim.time() + timeout;
    while sim.time() < end {
        sim.step(DT);
        if sim.autopark_state(ego) == Some(state) {
            return true;
        }
    }
    false
}

/// Scan the row, park in the gap, then leave it again.
#[test]
fn park_then_leave() {
    let (mut sim, ego) = parking_lane(5, &[0, 1, 3]);
    sim.set_turning_indicator(ego, TurningIndicator::Right);

    assert!(run_until(&mut sim, ego, AutoParkState::ComputeEnter, 30.0));
    let slot = sim.autopark(ego).unwrap().slot().unwrap().clone();
    assert_approx_eq!(slot.position().x, 106.86, 0.1);
    assert_approx_eq!(slot.position().y, 100.0);
    assert!(slot.length() > 6.0 && slot.length() < 6.6);

    assert!(run_until(&mut sim, ego, AutoParkState::Done, 30.0));
    let vehicle = sim.get_vehicle(ego);
    let target = slot.bind_pose(vehicle.blueprint());
    assert!(!vehicle.collided());
    assert_approx_eq!(vehicle.position().x, target.position.x, 0.05);
    assert_approx_eq!(vehicle.position().y, target.position.y, 0.05);
    assert!(vehicle.heading().abs() < 0.02);
    assert_approx_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.turning_indicator(), TurningIndicator::Off);
    let (_, bound) = sim
        .iter_parkings()
        .find(|(_, p)| p.occupant() == Some(ego))
        .unwrap();
    assert!(bound.contains(vehicle.position()));

    assert!(run_until(&mut sim, ego, AutoParkState::Idle, 1.0));
    assert!(sim.autopark(ego).unwrap().is_parked(sim.get_vehicle(ego)));

    sim.set_turning_indicator(ego, TurningIndicator::Right);
    sim.step(DT);
    assert_eq!(sim.autopark_state(ego), Some(AutoParkState::ComputeLeave));
    assert!(run_until(&mut sim, ego, AutoParkState::Done, 30.0));
    let vehicle = sim.get_vehicle(ego);
    assert!(!vehicle.collided());
    assert_approx_eq!(vehicle.position().y, 105.0, 0.05);
    assert!(vehicle.heading().abs() < 0.02);
    assert!(sim.autopark(ego).unwrap().slot().is_none());
    assert!(sim.iter_parkings().all(|(_, p)| p.occupant() != Some(ego)));
}

/// A full row gives up once the scan distance runs out.
#[test]
fn full_row_gives_up() {
    let occupied: Vec<_> = (0..12).collect();
    let (mut sim, ego) = parking_lane(12, &occupied);
    sim.set_turning_indicator(ego, TurningIndicator::Right);

    assert!(run_until(&mut sim, ego, AutoParkState::Done, 40.0));
    let vehicle = sim.get_vehicle(ego);
    assert!(vehicle.position().x - 97.5 >= 42.5);
    assert_approx_eq!(vehicle.position().y, 105.0);
    assert!(sim.autopark(ego).unwrap().slot().is_none());
    assert!(!vehicle.collided());
}

/// Switching the indicator off mid-scan stops the vehicle.
#[test]
fn indicator_off_aborts() {
    let (mut sim, ego) = parking_lane(5, &[0, 1, 3]);
    sim.set_turning_indicator(ego, TurningIndicator::Right);
    assert!(run_until(&mut sim, ego, AutoParkState::Scanning, 1.0));
    for _ in 0..100 {
        sim.step(DT);
    }
    assert!(sim.get_vehicle(ego).speed() > 0.0);

    sim.set_turning_indicator(ego, TurningIndicator::Off);
    sim.step(DT);
    assert_eq!(sim.autopark_state(ego), Some(AutoParkState::Done));
    assert_approx_eq!(sim.get_vehicle(ego).speed(), 0.0);
}

/// Parks straight into a 5 m gap between two cars, without the scan, using `config`.
/// Returns the simulation and the ego once the maneuver has ended.
fn park_in_gap(config: PlannerConfig) -> (Simulation, VehicleId, Pose) {
    let blueprints = Blueprints::builtin();
    let car = blueprints.car("Renault.Twingo").unwrap();
    let slot = ParkingSlot::new(ParkingBlueprint::new(5.0, 2.0, 0.0), Point2d::new(100.0, 100.0));
    let mut sim = Simulation::new();
    // Front bumper of the car behind and rear bumper of the car ahead on the slot ends
    sim.add_vehicle(car, Pose::new(100.0 - car.length + car.back_overhang, 100.0, 0.0));
    sim.add_vehicle(car, Pose::new(105.0 + car.back_overhang, 100.0, 0.0));
    let ego = sim.add_ego_vehicle(car, Pose::new(110.0, 105.0, 0.0));

    let vehicle = sim.get_vehicle_mut(ego);
    vehicle.set_planner_config(config);
    vehicle.park(&slot, true).unwrap();
    while sim.get_vehicle(ego).is_maneuvering() && sim.time() < 60.0 {
        sim.step(DT);
    }
    assert!(!sim.get_vehicle(ego).is_maneuvering());
    let target = slot.bind_pose(car);
    (sim, ego, target)
}

/// The multi-maneuver path keeps its distance to the cars around a short gap.
#[test]
fn parks_in_short_gap_without_touching() {
    let (sim, ego, target) = park_in_gap(PlannerConfig::default());
    let vehicle = sim.get_vehicle(ego);
    assert!(!vehicle.collided());
    assert_approx_eq!(vehicle.position().x, target.position.x, 0.05);
    assert_approx_eq!(vehicle.position().y, target.position.y, 0.05);
    assert!(vehicle.heading().abs() < 0.02);
}

/// Without clearance the shuffling arcs graze the neighbours.
#[test]
fn no_clearance_grazes_neighbours() {
    let config = PlannerConfig {
        clearance: 0.0,
        ..Default::default()
    };
    let (sim, ego, _) = park_in_gap(config);
    assert!(sim.get_vehicle(ego).collided());
}
