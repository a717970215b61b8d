//! Named dimensions of cars, trailers and parking slots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// An error raised while looking up or loading blueprints.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("unknown {kind} blueprint '{key}'")]
    UnknownKey { kind: &'static str, key: String },
    #[error("not a valid blueprint file: {0}")]
    UnsupportedFormat(String),
    #[error("invalid dimensions for '{mark}': {reason}")]
    InvalidDimension { mark: String, reason: &'static str },
    #[error("failed reading blueprint file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed parsing blueprint file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The dimensions of a car.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarBlueprint {
    /// Bumper to bumper length in m.
    pub length: f64,
    /// Body width in m.
    pub width: f64,
    /// Distance between the front and rear axles in m.
    pub wheelbase: f64,
    /// Distance from the rear axle to the rear bumper in m.
    pub back_overhang: f64,
    /// Wheel radius in m.
    pub wheel_radius: f64,
    /// Wheel width in m.
    pub wheel_width: f64,
    /// Maximum front wheel angle in radians.
    pub max_steering: f64,
}

impl CarBlueprint {
    /// Creates a car blueprint, deriving the maximum steering angle from the
    /// turning diameter.
    ///
    /// # Panics
    /// Panics if the derived steering angle is not strictly between 0 and 90 degrees.
    pub fn new(
        length: f64,
        width: f64,
        wheelbase: f64,
        back_overhang: f64,
        wheel_radius: f64,
        turning_diameter: f64,
    ) -> Self {
        let max_steering = (wheelbase / (0.5 * turning_diameter)).asin();
        assert!(
            max_steering > 0.0 && max_steering < std::f64::consts::FRAC_PI_2,
            "max steering angle out of range: {max_steering}"
        );
        Self {
            length,
            width,
            wheelbase,
            back_overhang,
            wheel_radius,
            wheel_width: 0.1,
            max_steering,
        }
    }

    /// Distance from the front axle to the front bumper in m.
    pub fn front_overhang(&self) -> f64 {
        self.length - self.wheelbase - self.back_overhang
    }
}

/// The dimensions of a trailer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailerBlueprint {
    pub length: f64,
    pub width: f64,
    /// Distance from the hitch to the trailer axle in m.
    pub wheelbase: f64,
    pub back_overhang: f64,
    pub wheel_radius: f64,
}

/// The dimensions of a parking slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkingBlueprint {
    /// Length along the lane in m.
    pub length: f64,
    /// Depth in m.
    pub width: f64,
    /// Lane angle in radians.
    pub angle: f64,
}

impl ParkingBlueprint {
    /// Creates a parking blueprint from an angle in degrees.
    pub fn new(length: f64, width: f64, angle_deg: f64) -> Self {
        Self {
            length,
            width,
            angle: angle_deg.to_radians(),
        }
    }
}

/// A caller-owned registry of named blueprints.
#[derive(Clone, Debug, Default)]
pub struct Blueprints {
    cars: HashMap<String, CarBlueprint>,
    trailers: HashMap<String, TrailerBlueprint>,
    parkings: HashMap<String, ParkingBlueprint>,
}

impl Blueprints {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a registry holding the built-in catalog.
    pub fn builtin() -> Self {
        let mut bp = Self::new();
        for (mark, car) in [
            ("Renault.Twingo", CarBlueprint::new(3.615, 1.646, 2.492, 0.494, 0.328, 10.0)),
            ("Citroen.DS3", CarBlueprint::new(4.118, 1.79, 2.558, 0.7, 0.328, 10.4)),
            ("Citroen.C3", CarBlueprint::new(3.941, 1.728, 2.466, 0.66, 0.328, 10.7)),
            ("Nissan.NV200", CarBlueprint::new(4.321, 1.219, 2.725, 0.840, 0.241, 10.6)),
            ("Audi.A6", CarBlueprint::new(4.951, 1.902, 2.924, 1.105, 0.328, 11.7)),
            ("Mini.Cooper", CarBlueprint::new(3.62, 1.68, 2.46, 0.58, 0.328, 10.7)),
        ] {
            bp.add_car(mark, car);
        }
        bp.add_trailer(
            "generic",
            TrailerBlueprint {
                length: 1.646,
                width: 1.646,
                wheelbase: 2.5,
                back_overhang: 0.494,
                wheel_radius: 0.2,
            },
        );
        for (name, parking) in [
            ("epi.0", ParkingBlueprint::new(5.0, 2.0, 0.0)),
            ("epi.45", ParkingBlueprint::new(4.8, 2.2, 45.0)),
            ("epi.60", ParkingBlueprint::new(5.15, 2.25, 60.0)),
            ("epi.75", ParkingBlueprint::new(5.1, 2.25, 75.0)),
        ] {
            bp.add_parking(name, parking);
        }
        bp
    }

    pub fn add_car(&mut self, mark: &str, car: CarBlueprint) {
        self.cars.insert(mark.to_owned(), car);
    }

    pub fn add_trailer(&mut self, name: &str, trailer: TrailerBlueprint) {
        self.trailers.insert(name.to_owned(), trailer);
    }

    pub fn add_parking(&mut self, name: &str, parking: ParkingBlueprint) {
        self.parkings.insert(name.to_owned(), parking);
    }

    /// Looks up a car by its mark, e.g. `"Renault.Twingo"`.
    pub fn car(&self, mark: &str) -> Result<&CarBlueprint, BlueprintError> {
        self.cars.get(mark).ok_or_else(|| unknown("car", mark))
    }

    pub fn trailer(&self, name: &str) -> Result<&TrailerBlueprint, BlueprintError> {
        self.trailers.get(name).ok_or_else(|| unknown("trailer", name))
    }

    pub fn parking(&self, name: &str) -> Result<&ParkingBlueprint, BlueprintError> {
        self.parkings.get(name).ok_or_else(|| unknown("parking", name))
    }

    /// Iterates over the car marks in no particular order.
    pub fn car_marks(&self) -> impl Iterator<Item = &str> {
        self.cars.keys().map(String::as_str)
    }

    /// Adds the cars of a JSON blueprint document, replacing any with the same mark.
    /// Returns the number of cars read.
    pub fn load_json(&mut self, json: &str) -> Result<usize, BlueprintError> {
        let file: BlueprintFile = serde_json::from_str(json)?;
        if file.kind != "blueprints" || file.revision != 1 {
            return Err(BlueprintError::UnsupportedFormat(format!(
                "type '{}' revision {}",
                file.kind, file.revision
            )));
        }
        let cars = file
            .vehicles
            .into_iter()
            .map(|record| record.validate())
            .collect::<Result<Vec<_>, _>>()?;
        let count = cars.len();
        for (mark, car) in cars {
            log::debug!("loaded blueprint '{mark}'");
            self.cars.insert(mark, car);
        }
        Ok(count)
    }

    /// Reads a JSON blueprint file from disk. See [Blueprints::load_json].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, BlueprintError> {
        let content = std::fs::read_to_string(path)?;
        self.load_json(&content)
    }
}

fn unknown(kind: &'static str, key: &str) -> BlueprintError {
    BlueprintError::UnknownKey {
        kind,
        key: key.to_owned(),
    }
}

#[derive(Deserialize)]
struct BlueprintFile {
    #[serde(rename = "type")]
    kind: String,
    revision: u32,
    vehicles: Vec<VehicleRecord>,
}

#[derive(Deserialize)]
struct VehicleRecord {
    mark: String,
    length_m: f64,
    width_m: f64,
    wheelbase_m: f64,
    back_overhang_m: f64,
    wheels: WheelRecord,
    turning_diameter_m: f64,
}

#[derive(Deserialize)]
struct WheelRecord {
    radius_m: f64,
}

impl VehicleRecord {
    fn validate(self) -> Result<(String, CarBlueprint), BlueprintError> {
        let reason = if [self.length_m, self.width_m, self.wheelbase_m, self.wheels.radius_m]
            .iter()
            .any(|v| !(*v > 0.0))
        {
            Some("dimensions must be positive")
        } else if self.back_overhang_m < 0.0
            || self.wheelbase_m + self.back_overhang_m > self.length_m
        {
            Some("axles must lie within the body")
        } else if !(0.5 * self.turning_diameter_m > self.wheelbase_m) {
            Some("turning diameter must exceed twice the wheelbase")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(BlueprintError::InvalidDimension {
                mark: self.mark,
                reason,
            });
        }
        let car = CarBlueprint::new(
            self.length_m,
            self.width_m,
            self.wheelbase_m,
            self.back_overhang_m,
            self.wheels.radius_m,
            self.turning_diameter_m,
        );
        Ok((self.mark, car))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn builtin_twingo() {
        let bp = Blueprints::builtin();
        let car = bp.car("Renault.Twingo").unwrap();
        assert_approx_eq!(car.max_steering.to_degrees(), 29.8942, 1e-3);
        assert_approx_eq!(car.front_overhang(), 0.629);
        assert_approx_eq!(bp.parking("epi.45").unwrap().angle, std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn unknown_key() {
        let bp = Blueprints::builtin();
        match bp.car("Trabant") {
            Err(BlueprintError::UnknownKey { kind, key }) => {
                assert_eq!(kind, "car");
                assert_eq!(key, "Trabant");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(bp.trailer("flatbed").is_err());
    }

    #[test]
    fn load_vehicles_from_json() {
        let json = r#"{
            "type": "blueprints",
            "revision": 1,
            "vehicles": [{
                "mark": "Peugeot.208",
                "length_m": 4.055,
                "width_m": 1.745,
                "wheelbase_m": 2.54,
                "back_overhang_m": 0.7,
                "wheels": { "radius_m": 0.32 },
                "turning_diameter_m": 10.4
            }]
        }"#;
        let mut bp = Blueprints::new();
        assert_eq!(bp.load_json(json).unwrap(), 1);
        let car = bp.car("Peugeot.208").unwrap();
        assert_approx_eq!(car.wheelbase, 2.54);
        assert_approx_eq!(car.max_steering, (2.54f64 / 5.2).asin());
    }

    #[test]
    fn reject_bad_files() {
        let mut bp = Blueprints::new();
        let wrong_type = r#"{"type": "scenario", "revision": 1, "vehicles": []}"#;
        assert!(matches!(
            bp.load_json(wrong_type),
            Err(BlueprintError::UnsupportedFormat(_))
        ));
        let tight_turn = r#"{"type": "blueprints", "revision": 1, "vehicles": [{
            "mark": "Bus", "length_m": 12.0, "width_m": 2.5, "wheelbase_m": 6.0,
            "back_overhang_m": 3.0, "wheels": { "radius_m": 0.5 }, "turning_diameter_m": 10.0
        }]}"#;
        assert!(matches!(
            bp.load_json(tight_turn),
            Err(BlueprintError::InvalidDimension { .. })
        ));
        assert!(matches!(bp.load_json("{"), Err(BlueprintError::Json(_))));
    }
}
