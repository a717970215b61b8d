pub use autopark::{AutoPark, AutoParkState};
pub use blueprint::{Blueprints, BlueprintError, CarBlueprint, ParkingBlueprint, TrailerBlueprint};
pub use cgmath;
pub use config::{ConfigError, PlannerConfig, ScanConfig, SimulationConfig};
pub use parking::{ParkingSlot, SlotKind};
pub use reference::TimedReference;
pub use sensor::Radar;
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use trajectory::{PlanningError, References, Trajectory};
pub use turning_radius::TurningRadius;
pub use util::Interval;
pub use vehicle::{CruiseControl, Pose, TurningIndicator, Vehicle};

pub mod autopark;
mod blueprint;
mod config;
mod debug;
pub mod math;
mod parking;
mod reference;
mod sensor;
mod simulation;
pub mod trajectory;
mod turning_radius;
mod util;
pub mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [ParkingSlot].
    pub struct ParkingId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
type ParkingSet = SlotMap<ParkingId, ParkingSlot>;
