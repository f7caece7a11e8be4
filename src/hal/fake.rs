// Deterministic collaborators for unit tests

use std::collections::VecDeque;

use super::{ActuatorDriver, HalError, Inertial, LineTransport, Result, SensorSource};

#[derive(Debug, Default)]
pub struct FakeActuator {
    pub outputs: Vec<(u8, f32)>,
    /// Last (pin, on) written to the holding magnet
    pub holding: Option<(u8, bool)>,
}

impl FakeActuator {
    pub fn last_output(&self) -> Option<f32> {
        self.outputs.last().map(|&(_, duty)| duty)
    }
}

impl ActuatorDriver for FakeActuator {
    fn set_motor_output(&mut self, channel: u8, duty: f32) -> Result<()> {
        self.outputs.push((channel, duty));
        Ok(())
    }

    fn set_holding(&mut self, pin: u8, on: bool) -> Result<()> {
        self.holding = Some((pin, on));
        Ok(())
    }
}

/// Sensors returning fixed values; `None` makes the read fail
#[derive(Debug, Clone)]
pub struct FakeSensors {
    pub analog: Option<u16>,
    pub inertial: Option<Inertial>,
    pub voltage: f32,
    pub current: f32,
    pub encoder: i32,
}

impl Default for FakeSensors {
    fn default() -> Self {
        Self {
            analog: Some(0),
            inertial: Some(Inertial::default()),
            voltage: 12.0,
            current: 0.5,
            encoder: 0,
        }
    }
}

impl SensorSource for FakeSensors {
    fn read_analog(&mut self, _pin: u8) -> Result<u16> {
        self.analog.ok_or(HalError::SensorUnavailable("analog"))
    }

    fn read_inertial(&mut self) -> Result<Inertial> {
        self.inertial.ok_or(HalError::SensorUnavailable("imu"))
    }

    fn supply_voltage(&mut self) -> Result<f32> {
        Ok(self.voltage)
    }

    fn supply_current(&mut self) -> Result<f32> {
        Ok(self.current)
    }

    fn encoder_count(&mut self) -> Result<i32> {
        Ok(self.encoder)
    }
}

#[derive(Debug, Default)]
pub struct FakeTransport {
    pub inbound: VecDeque<String>,
    pub outbound: Vec<String>,
}

impl FakeTransport {
    pub fn push(&mut self, line: &str) {
        self.inbound.push_back(line.to_string());
    }
}

impl LineTransport for FakeTransport {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.outbound.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.inbound.pop_front())
    }
}
