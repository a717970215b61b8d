/// Tracks speed and steering references.
///
/// The kinematic model has no inertia, so the outputs follow the references exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CruiseControl {
    /// The requested speed in m/s.
    speed_ref: f64,
    /// The requested front wheel angle in radians.
    steering_ref: f64,
    speed: f64,
    steering: f64,
}

impl CruiseControl {
    pub fn set_references(&mut self, speed: f64, steering: f64) {
        self.speed_ref = speed;
        self.steering_ref = steering;
    }

    pub fn speed_ref(&self) -> f64 {
        self.speed_ref
    }

    pub fn steering_ref(&self) -> f64 {
        self.steering_ref
    }

    /// Computes the outputs, returning the `(speed, steering)` to drive with.
    pub fn update(&mut self) -> (f64, f64) {
        self.speed = self.speed_ref;
        self.steering = self.steering_ref;
        (self.speed, self.steering)
    }

    /// The last speed output in m/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The last steering output in radians.
    pub fn steering(&self) -> f64 {
        self.steering
    }

    /// Zeroes both references and outputs.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
