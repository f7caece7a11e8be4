// Drive primitives for the single drive motor
//
// Translates a signed command into forward / reverse / stop calls on the
// actuator and keeps track of what was last commanded.

use serde::Serialize;
use tracing::warn;

use crate::hal::ActuatorDriver;

/// Commanded drive direction, reported in telemetry as -1 / 0 / 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    #[default]
    Stopped,
}

impl Direction {
    pub fn code(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
            Direction::Stopped => 0,
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct MotionPrimitives {
    channel: u8,
    duty: f32,
    direction: Direction,
}

impl MotionPrimitives {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            duty: 0.0,
            direction: Direction::Stopped,
        }
    }

    /// Drive with a signed magnitude; the sign picks the direction
    pub fn drive(&mut self, actuator: &mut impl ActuatorDriver, magnitude: f32) {
        self.duty = magnitude.abs();
        if magnitude > 0.0 {
            self.forward(actuator);
        } else if magnitude < 0.0 {
            self.reverse(actuator);
        } else {
            self.stop(actuator);
        }
    }

    /// Drive forward at the currently commanded duty cycle
    pub fn forward(&mut self, actuator: &mut impl ActuatorDriver) {
        self.apply(actuator, self.duty);
        self.direction = Direction::Forward;
    }

    /// Drive in reverse at the currently commanded duty cycle
    pub fn reverse(&mut self, actuator: &mut impl ActuatorDriver) {
        self.apply(actuator, -self.duty);
        self.direction = Direction::Reverse;
    }

    pub fn stop(&mut self, actuator: &mut impl ActuatorDriver) {
        self.apply(actuator, 0.0);
        self.direction = Direction::Stopped;
    }

    /// Change the commanded duty cycle without actuating
    pub fn set_duty(&mut self, duty: f32) {
        self.duty = duty;
    }

    pub fn duty(&self) -> f32 {
        self.duty
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn apply(&self, actuator: &mut impl ActuatorDriver, duty: f32) {
        if let Err(e) = actuator.set_motor_output(self.channel, duty) {
            warn!("Failed to set motor {} output: {}", self.channel, e);
        }
    }
}
