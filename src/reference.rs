use serde::Serialize;

/// A piecewise-constant value over time.
///
/// Segments are appended in order, each holding its value until a cumulative end time.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimedReference {
    /// `(value, end time in s)` pairs with non-decreasing end times.
    segments: Vec<(f64, f64)>,
}

impl TimedReference {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a segment holding `value` for `duration` seconds.
    ///
    /// # Panics
    /// Panics if `duration` is negative or not a number.
    pub fn add(&mut self, value: f64, duration: f64) {
        assert!(duration >= 0.0, "negative reference duration: {duration}");
        let end = self.duration() + duration;
        self.segments.push((value, end));
    }

    /// The value at time `t`, or zero once the timeline has ended.
    pub fn get(&self, t: f64) -> f64 {
        let idx = self.segments.partition_point(|(_, end)| *end <= t);
        self.segments.get(idx).map_or(0.0, |(value, _)| *value)
    }

    /// Whether `t` lies at or past the end of the last segment.
    pub fn ended(&self, t: f64) -> bool {
        t >= self.duration()
    }

    /// The total duration in s.
    pub fn duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |(_, end)| *end)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Iterates over the `(value, end time)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.segments.iter().copied()
    }
}
