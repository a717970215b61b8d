use crate::math::Point2d;
use crate::{ParkingBlueprint, ParkingSlot, ScanConfig};
use log::debug;

/// Progress of the scan along a row of parked cars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// Driving alongside a parked car.
    DetectFirstCar,
    /// Measuring a gap.
    DetectEmptySpot,
    /// The gap has ended, deciding whether it fits.
    DetectSecondCar,
    Found,
    NotFound,
}

/// The outcome of a scan tick.
#[derive(Clone, Debug)]
pub enum ScanStatus {
    Scanning,
    Found(ParkingSlot),
    NotFound,
}

/// Measures gaps between parked cars with the side radar.
#[derive(Clone, Debug)]
pub struct Scanner {
    config: ScanConfig,
    /// Gaps no longer than this are too short, in m.
    vehicle_length: f64,
    state: ScanState,
    /// The length of the current gap in m.
    distance: f64,
    /// The rear axle position when the gap started.
    start: Point2d,
    slot: Option<ParkingSlot>,
}

impl Scanner {
    pub fn new(config: ScanConfig, vehicle_length: f64) -> Self {
        Self {
            config,
            vehicle_length,
            state: ScanState::Idle,
            distance: 0.0,
            start: Point2d::new(0.0, 0.0),
            slot: None,
        }
    }

    /// Restarts the scan from scratch.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
        self.distance = 0.0;
        self.slot = None;
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The length of the gap measured so far, in m.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The speed the vehicle should drive at, in m/s.
    pub fn target_speed(&self) -> f64 {
        match self.state {
            ScanState::Found | ScanState::NotFound => 0.0,
            _ => self.config.scan_speed,
        }
    }

    /// Advances the scan by one tick.
    ///
    /// # Parameters
    /// * `detected` - Whether the radar hits something.
    /// * `position` - The rear axle position.
    /// * `speed` - The current speed in m/s.
    /// * `outside_area` - Whether the vehicle has driven too far; ends the scan.
    pub fn update(
        &mut self,
        detected: bool,
        position: Point2d,
        speed: f64,
        dt: f64,
        outside_area: bool,
    ) -> ScanStatus {
        if outside_area && self.state != ScanState::NotFound {
            debug!("scan area exhausted in state {:?}", self.state);
            self.state = ScanState::NotFound;
        }

        match self.state {
            ScanState::Idle => {
                self.distance = 0.0;
                self.state = ScanState::DetectFirstCar;
            }
            ScanState::DetectFirstCar => {
                if !detected {
                    self.start = position;
                    self.distance = 0.0;
                    self.state = ScanState::DetectEmptySpot;
                }
            }
            ScanState::DetectEmptySpot => {
                if detected || self.distance >= self.config.sufficient_length {
                    self.state = ScanState::DetectSecondCar;
                }
                self.distance += speed.abs() * dt;
            }
            ScanState::DetectSecondCar => {
                if self.distance <= self.vehicle_length {
                    debug!("gap of {:.2} m is too short", self.distance);
                    self.state = ScanState::DetectFirstCar;
                } else {
                    let slot = ParkingSlot::new(
                        ParkingBlueprint {
                            length: self.distance,
                            width: self.config.slot_width,
                            angle: 0.0,
                        },
                        Point2d::new(self.start.x, self.start.y - self.config.lateral_offset),
                    );
                    debug!(
                        "found a {:.2} m slot at ({:.2}, {:.2})",
                        self.distance,
                        slot.position().x,
                        slot.position().y
                    );
                    self.slot = Some(slot);
                    self.state = ScanState::Found;
                }
            }
            ScanState::Found | ScanState::NotFound => {}
        }

        match (self.state, &self.slot) {
            (ScanState::Found, Some(slot)) => ScanStatus::Found(slot.clone()),
            (ScanState::NotFound, _) => ScanStatus::NotFound,
            _ => ScanStatus::Scanning,
        }
    }
}
