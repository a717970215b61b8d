use log::{info, warn};
use self_parking::cgmath::Point2;
use self_parking::{AutoParkState, Blueprints, Pose, Simulation, SimulationConfig, TurningIndicator};

/// Simulation time step in s.
const DT: f64 = 0.01;

/// The demo gives up after this long, in s.
const MAX_TIME: f64 = 60.0;

/// Parks a Twingo in the only gap of a row of parked cars.
///
/// An optional argument names a JSON file overriding the simulation parameters.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    let blueprints = Blueprints::builtin();
    let car = blueprints.car("Renault.Twingo")?;
    let parking = blueprints.parking("epi.0")?;

    let mut sim = Simulation::with_config(config);
    let row = sim.add_parking_row(parking, Point2::new(97.5, 100.0), 5);
    for idx in [0, 1, 3] {
        let id = sim.add_vehicle(car, Pose::new(0.0, 0.0, 0.0));
        sim.park_vehicle(id, row[idx]);
    }
    let ego = sim.add_ego_vehicle(car, Pose::new(97.5, 105.0, 0.0));
    sim.set_turning_indicator(ego, TurningIndicator::Right);

    let mut state = AutoParkState::Idle;
    while sim.time() < MAX_TIME {
        sim.step(DT);
        let vehicle = sim.get_vehicle(ego);
        if vehicle.collided() {
            warn!("stopping: the ego vehicle collided");
            break;
        }
        if let Some(next) = sim.autopark_state(ego).filter(|s| *s != state) {
            let pose = vehicle.pose();
            info!(
                "t = {:.2} s: {:?} at ({:.3}, {:.3}), heading {:.4} rad",
                sim.time(),
                next,
                pose.position.x,
                pose.position.y,
                pose.heading
            );
            state = next;
            if state == AutoParkState::Done {
                break;
            }
        }
    }

    let parked = sim
        .iter_parkings()
        .filter(|(_, slot)| slot.occupant() == Some(ego))
        .count();
    info!(
        "finished after {:.2} s, ego {}",
        sim.time(),
        if parked > 0 { "parked in a slot" } else { "not in a slot" }
    );
    Ok(())
}
