// Hardware boundary for the control core
//
// The core only talks to the robot through these capability traits:
// - ActuatorDriver: motor duty cycle and the holding magnet
// - SensorSource: analog, inertial and supply readings
// - LineTransport: line-delimited messages to/from the operator console
// - IncrementableCounter: the encoder edge counter fed from interrupt context

use std::sync::atomic::{AtomicI32, Ordering};

pub mod serial;
pub mod sim;

#[cfg(test)]
pub(crate) mod fake;

pub use serial::{SerialTransport, StdioTransport};
pub use sim::{SimHandle, SimRobot};

/// Error types for the hardware collaborators
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(&'static str),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, HalError>;

/// 3-axis acceleration and angular rate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inertial {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
}

pub trait ActuatorDriver {
    /// Apply a signed duty cycle to a motor channel
    fn set_motor_output(&mut self, channel: u8, duty: f32) -> Result<()>;

    /// Energize or release the holding electromagnet on digital `pin`
    fn set_holding(&mut self, pin: u8, on: bool) -> Result<()>;
}

pub trait SensorSource {
    fn read_analog(&mut self, pin: u8) -> Result<u16>;
    fn read_inertial(&mut self) -> Result<Inertial>;
    fn supply_voltage(&mut self) -> Result<f32>;
    fn supply_current(&mut self) -> Result<f32>;
    /// Raw count of the pendulum quadrature encoder (not reset by the core)
    fn encoder_count(&mut self) -> Result<i32>;
}

pub trait LineTransport {
    /// Write one line; the transport appends the terminator
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Next complete inbound line, if one is ready
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Edge counter shared between the interrupt source and the control loop
pub trait IncrementableCounter: Send + Sync {
    fn increment(&self, pulses: i32);

    /// Return the pulses accumulated since the last call and clear the counter
    /// as a single operation with respect to `increment`.
    fn read_and_reset(&self) -> i32;
}

/// Lock-free pulse counter
#[derive(Debug, Default)]
pub struct AtomicPulseCounter {
    count: AtomicI32,
}

impl AtomicPulseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }
}

impl IncrementableCounter for AtomicPulseCounter {
    fn increment(&self, pulses: i32) {
        self.count.fetch_add(pulses, Ordering::AcqRel);
    }

    fn read_and_reset(&self) -> i32 {
        self.count.swap(0, Ordering::AcqRel)
    }
}
