//! Orchestrates a self-parking maneuver: scan for a slot, plan, drive, and later leave.

use crate::vehicle::{TurningIndicator, Vehicle};
use crate::{math::Point2d, ParkingSlot, ScanConfig};
use log::{info, warn};

pub use scanner::{ScanState, ScanStatus, Scanner};

mod scanner;

/// The state of the self-parking function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoParkState {
    #[default]
    Idle,
    /// Driving along the lane looking for a slot.
    Scanning,
    /// Planning a maneuver into the slot found.
    ComputeEnter,
    /// Planning a maneuver out of the slot the vehicle is parked in.
    ComputeLeave,
    /// Following the planned maneuver.
    Driving,
    Done,
}

impl AutoParkState {
    /// Whether the indicator being switched off aborts this state.
    pub fn is_active(&self) -> bool {
        !matches!(self, AutoParkState::Idle | AutoParkState::Done)
    }
}

/// What happened during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The driver switched the indicator on.
    Activate { parked: bool },
    /// The driver switched the indicator off.
    Deactivate,
    ScanFound,
    ScanFailed,
    PlanReady,
    PlanFailed,
    TrajectoryEnded,
    Reset,
}

/// Gets the state following `state` on `event`, if the event applies.
pub fn transition(state: AutoParkState, event: Event) -> Option<AutoParkState> {
    use AutoParkState::*;
    match (state, event) {
        (state, Event::Deactivate) if state.is_active() => Some(Done),
        (Idle, Event::Activate { parked: false }) => Some(Scanning),
        (Idle, Event::Activate { parked: true }) => Some(ComputeLeave),
        (Scanning, Event::ScanFound) => Some(ComputeEnter),
        (Scanning, Event::ScanFailed) => Some(Done),
        (ComputeEnter | ComputeLeave, Event::PlanReady) => Some(Driving),
        (ComputeEnter, Event::PlanFailed) => Some(Idle),
        (ComputeLeave, Event::PlanFailed) => Some(Done),
        (Driving, Event::TrajectoryEnded) => Some(Done),
        (Done, Event::Reset) => Some(Idle),
        _ => None,
    }
}

/// The self-parking function of one vehicle.
#[derive(Clone, Debug)]
pub struct AutoPark {
    config: ScanConfig,
    state: AutoParkState,
    scanner: Scanner,
    /// Where the current scan started.
    origin: Point2d,
    /// The slot the vehicle parked in, or is parking in.
    slot: Option<ParkingSlot>,
    /// Whether the maneuver being driven leaves the slot.
    leaving: bool,
}

impl AutoPark {
    pub fn new(config: ScanConfig, vehicle: &Vehicle) -> Self {
        Self {
            config,
            state: AutoParkState::Idle,
            scanner: Scanner::new(config, vehicle.blueprint().length),
            origin: vehicle.position(),
            slot: None,
            leaving: false,
        }
    }

    pub fn state(&self) -> AutoParkState {
        self.state
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// The slot the vehicle parked in, or is parking in.
    pub fn slot(&self) -> Option<&ParkingSlot> {
        self.slot.as_ref()
    }

    /// Remembers that the vehicle is parked in `slot`.
    pub(crate) fn set_slot(&mut self, slot: ParkingSlot) {
        self.slot = Some(slot);
    }

    /// Whether the vehicle's rear axle is inside the remembered slot.
    pub fn is_parked(&self, vehicle: &Vehicle) -> bool {
        self.slot
            .as_ref()
            .map_or(false, |slot| slot.contains(vehicle.position()))
    }

    /// Whether the vehicle has driven too far from where the scan started.
    fn outside_area(&self, vehicle: &Vehicle) -> bool {
        let offset = vehicle.position() - self.origin;
        (offset.x.powi(2) + offset.y.powi(2)).sqrt() >= self.config.max_scan_distance
    }

    /// Advances the function by one tick, given whether the vehicle's radar detects
    /// anything. Returns the new state on a transition.
    pub fn update(
        &mut self,
        vehicle: &mut Vehicle,
        detected: bool,
        dt: f64,
    ) -> Option<AutoParkState> {
        let event = self.poll(vehicle, detected, dt)?;
        let next = transition(self.state, event)?;
        info!(
            "vehicle {:?} autopark: {:?} -> {:?} on {:?}",
            vehicle.id(),
            self.state,
            next,
            event
        );
        let previous = self.state;
        self.state = next;
        self.on_enter(previous, vehicle);
        Some(next)
    }

    /// Runs the current state and reports what happened.
    fn poll(&mut self, vehicle: &mut Vehicle, detected: bool, dt: f64) -> Option<Event> {
        let activated = vehicle.turning_indicator() == TurningIndicator::Right;
        if self.state.is_active() && !activated {
            return Some(Event::Deactivate);
        }

        match self.state {
            AutoParkState::Idle => activated.then(|| Event::Activate {
                parked: self.is_parked(vehicle),
            }),
            AutoParkState::Scanning => {
                let outside = self.outside_area(vehicle);
                let status =
                    self.scanner
                        .update(detected, vehicle.position(), vehicle.speed(), dt, outside);
                vehicle.set_references(self.scanner.target_speed(), 0.0);
                match status {
                    ScanStatus::Scanning => None,
                    ScanStatus::Found(slot) => {
                        self.slot = Some(slot);
                        Some(Event::ScanFound)
                    }
                    ScanStatus::NotFound => Some(Event::ScanFailed),
                }
            }
            AutoParkState::ComputeEnter => Some(self.plan(vehicle, true)),
            AutoParkState::ComputeLeave => Some(self.plan(vehicle, false)),
            AutoParkState::Driving => (!vehicle.is_maneuvering()).then_some(Event::TrajectoryEnded),
            AutoParkState::Done => Some(Event::Reset),
        }
    }

    fn plan(&mut self, vehicle: &mut Vehicle, entering: bool) -> Event {
        let Some(slot) = &self.slot else {
            warn!("vehicle {:?} has no slot to plan for", vehicle.id());
            return Event::PlanFailed;
        };
        match vehicle.park(slot, entering) {
            Ok(()) => {
                self.leaving = !entering;
                Event::PlanReady
            }
            Err(err) if entering => {
                warn!("vehicle {:?} cannot park: {}", vehicle.id(), err);
                Event::PlanFailed
            }
            Err(err) => {
                warn!("vehicle {:?} cannot leave autonomously: {}", vehicle.id(), err);
                Event::PlanFailed
            }
        }
    }

    fn on_enter(&mut self, previous: AutoParkState, vehicle: &mut Vehicle) {
        match self.state {
            AutoParkState::Scanning => {
                self.origin = vehicle.position();
                self.scanner.reset();
            }
            AutoParkState::Done => {
                vehicle.stop();
                vehicle.set_turning_indicator(TurningIndicator::Off);
                if previous == AutoParkState::Driving && self.leaving {
                    self.slot = None;
                }
                self.leaving = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vehicle::Pose;
    use crate::{CarBlueprint, ParkingBlueprint, VehicleId};
    use assert_approx_eq::assert_approx_eq;

    fn twingo() -> CarBlueprint {
        CarBlueprint::new(3.615, 1.646, 2.492, 0.494, 0.328, 10.0)
    }

    fn ego(x: f64, y: f64) -> Vehicle {
        let mut vehicle = Vehicle::new(VehicleId::default(), &twingo());
        vehicle.init(Pose::new(x, y, 0.0), 0.0, 0.0);
        vehicle
    }

    #[test]
    fn transitions() {
        use AutoParkState::*;
        assert_eq!(transition(Idle, Event::Activate { parked: false }), Some(Scanning));
        assert_eq!(transition(Idle, Event::Activate { parked: true }), Some(ComputeLeave));
        assert_eq!(transition(Scanning, Event::ScanFound), Some(ComputeEnter));
        assert_eq!(transition(Scanning, Event::ScanFailed), Some(Done));
        assert_eq!(transition(ComputeEnter, Event::PlanFailed), Some(Idle));
        assert_eq!(transition(ComputeLeave, Event::PlanFailed), Some(Done));
        assert_eq!(transition(ComputeLeave, Event::PlanReady), Some(Driving));
        assert_eq!(transition(Driving, Event::TrajectoryEnded), Some(Done));
        assert_eq!(transition(Done, Event::Reset), Some(Idle));
        for state in [Scanning, ComputeEnter, ComputeLeave, Driving] {
            assert_eq!(transition(state, Event::Deactivate), Some(Done));
        }
        assert_eq!(transition(Idle, Event::Deactivate), None);
        assert_eq!(transition(Driving, Event::ScanFound), None);
    }

    #[test]
    fn stays_idle_without_indicator() {
        let mut vehicle = ego(100.0, 105.0);
        let mut autopark = AutoPark::new(Default::default(), &vehicle);
        assert_eq!(autopark.update(&mut vehicle, false, 0.01), None);
        assert_eq!(autopark.state(), AutoParkState::Idle);
    }

    #[test]
    fn scan_drives_and_aborts() {
        let mut vehicle = ego(100.0, 105.0);
        let mut autopark = AutoPark::new(Default::default(), &vehicle);
        vehicle.set_turning_indicator(TurningIndicator::Right);
        assert_eq!(
            autopark.update(&mut vehicle, false, 0.01),
            Some(AutoParkState::Scanning)
        );
        autopark.update(&mut vehicle, true, 0.01);
        vehicle.update(0.01);
        assert_approx_eq!(vehicle.speed(), 2.0);

        vehicle.set_turning_indicator(TurningIndicator::Off);
        assert_eq!(
            autopark.update(&mut vehicle, true, 0.01),
            Some(AutoParkState::Done)
        );
        assert_approx_eq!(vehicle.speed(), 0.0);
        assert_eq!(
            autopark.update(&mut vehicle, true, 0.01),
            Some(AutoParkState::Idle)
        );
    }

    #[test]
    fn scan_gives_up_far_away() {
        let mut vehicle = ego(100.0, 105.0);
        let mut autopark = AutoPark::new(Default::default(), &vehicle);
        vehicle.set_turning_indicator(TurningIndicator::Right);
        autopark.update(&mut vehicle, false, 0.1);

        let mut state = autopark.state();
        for _ in 0..300 {
            autopark.update(&mut vehicle, true, 0.1);
            vehicle.update(0.1);
            state = autopark.state();
            if state != AutoParkState::Scanning {
                break;
            }
        }
        assert_eq!(state, AutoParkState::Done);
        assert!(vehicle.position().x - 100.0 >= 42.5);
        assert_eq!(vehicle.turning_indicator(), TurningIndicator::Off);
    }

    #[test]
    fn leaves_when_parked() {
        let car = twingo();
        let slot = ParkingSlot::new(ParkingBlueprint::new(6.0, 2.0, 0.0), Point2d::new(100.0, 100.0));
        let pose = slot.bind_pose(&car);
        let mut vehicle = ego(pose.position.x, pose.position.y);
        let mut autopark = AutoPark::new(Default::default(), &vehicle);
        autopark.set_slot(slot);
        assert!(autopark.is_parked(&vehicle));

        vehicle.set_turning_indicator(TurningIndicator::Right);
        assert_eq!(
            autopark.update(&mut vehicle, true, 0.01),
            Some(AutoParkState::ComputeLeave)
        );
        assert_eq!(
            autopark.update(&mut vehicle, true, 0.01),
            Some(AutoParkState::Driving)
        );
        assert!(vehicle.is_maneuvering());

        while vehicle.is_maneuvering() {
            vehicle.update(0.01);
        }
        assert_eq!(
            autopark.update(&mut vehicle, false, 0.01),
            Some(AutoParkState::Done)
        );
        assert!(autopark.slot().is_none());
        assert_approx_eq!(vehicle.position().y, 105.0, 0.05);
    }

    #[test]
    fn failed_leave_ends() {
        let car = twingo();
        // Shorter than the car: no way out
        let slot = ParkingSlot::new(ParkingBlueprint::new(3.5, 2.0, 0.0), Point2d::new(100.0, 100.0));
        let pose = slot.bind_pose(&car);
        let mut vehicle = ego(pose.position.x, pose.position.y);
        let mut autopark = AutoPark::new(Default::default(), &vehicle);
        autopark.set_slot(slot);
        vehicle.set_turning_indicator(TurningIndicator::Right);
        autopark.update(&mut vehicle, true, 0.01);
        assert_eq!(
            autopark.update(&mut vehicle, true, 0.01),
            Some(AutoParkState::Done)
        );
        assert!(autopark.slot().is_some());
    }
}
