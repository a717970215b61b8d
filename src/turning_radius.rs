use crate::CarBlueprint;

/// The radii swept by a car turning at a constant steering angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurningRadius {
    /// Radius of the inner side of the body, at the rear axle, in m.
    pub internal: f64,
    /// Radius of the centre of the front axle, in m.
    pub middle: f64,
    /// Radius of the outer front corner of the body, in m.
    pub external: f64,
    /// Half the car's width.
    half_width: f64,
}

impl TurningRadius {
    /// Computes the turning radii for the given steering angle.
    ///
    /// # Panics
    /// Panics if the geometry gives an external radius smaller than the internal one.
    pub fn new(car: &CarBlueprint, steering: f64) -> Self {
        let e = car.wheelbase;
        let w = car.width;
        let p = car.front_overhang();
        let middle = e / steering.sin();
        let internal = (middle.powi(2) - e.powi(2)).sqrt() - 0.5 * w;
        let external = ((internal + w).powi(2) + (e + p).powi(2)).sqrt();
        assert!(
            external >= internal,
            "inconsistent turning radii: external {external} < internal {internal}"
        );
        Self {
            internal,
            middle,
            external,
            half_width: 0.5 * w,
        }
    }

    /// The radii at the car's maximum steering angle.
    pub fn min(car: &CarBlueprint) -> Self {
        Self::new(car, car.max_steering)
    }

    /// Radius of the circle followed by the middle of the rear axle, in m.
    pub fn rear_axle(&self) -> f64 {
        self.internal + self.half_width
    }

    /// The shortest parallel slot that can be entered in a single maneuver, in m.
    pub fn min_parallel_length(&self, car: &CarBlueprint) -> f64 {
        car.back_overhang + (self.external.powi(2) - self.internal.powi(2)).sqrt()
    }
}
