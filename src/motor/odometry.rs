// Wheel odometry: encoder pulses -> linear travel
//
// The pulse counter is incremented from the encoder edge source; the control
// loop only ever consumes it through an atomic read-and-reset.

use std::sync::Arc;

use crate::config::DISTANCE_PER_PULSE;
use crate::hal::IncrementableCounter;

pub struct Odometry {
    counter: Arc<dyn IncrementableCounter>,
    distance_per_pulse: f32,
    travelled: f32,
}

impl Odometry {
    /// Odometry for the configured wheel geometry
    pub fn new(counter: Arc<dyn IncrementableCounter>) -> Self {
        Self::with_distance_per_pulse(counter, DISTANCE_PER_PULSE)
    }

    pub fn with_distance_per_pulse(
        counter: Arc<dyn IncrementableCounter>,
        distance_per_pulse: f32,
    ) -> Self {
        Self {
            counter,
            distance_per_pulse,
            travelled: 0.0,
        }
    }

    pub fn pulses_to_distance(&self, count: i32) -> f32 {
        count as f32 * self.distance_per_pulse
    }

    /// Pulses accumulated since the previous call; clears the counter
    pub fn read_and_reset_pulses(&self) -> i32 {
        self.counter.read_and_reset()
    }

    /// Distance covered since the previous read, added to the running total
    pub fn take_distance(&mut self) -> f32 {
        let step = self.pulses_to_distance(self.read_and_reset_pulses());
        self.travelled += step;
        step
    }

    /// Signed total travel since start-up, meters
    pub fn travelled(&self) -> f32 {
        self.travelled
    }
}

/// Distance per pulse for a wheel of `wheel_radius` behind a `gear_ratio` reduction
pub fn distance_per_pulse(wheel_radius: f32, pulses_per_revolution: f32, gear_ratio: f32) -> f32 {
    (2.0 * std::f32::consts::PI * wheel_radius) / (pulses_per_revolution * gear_ratio)
}
