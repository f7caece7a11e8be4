// Simulated robot for running the runtime without hardware
//
// Very small 1-D model: the drive duty cycle sets wheel speed, the wheel
// generates encoder pulses, and driving the cart pumps energy into the
// pendulum so the tilt reading climbs while the robot swings.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::{
    ActuatorDriver, AtomicPulseCounter, IncrementableCounter, Inertial, Result, SensorSource,
};
use crate::config::{DEG_PER_COUNT, DISTANCE_PER_PULSE};

/// Wheel speed at full duty cycle, m/s
const MAX_SPEED: f32 = 0.6;
/// Tilt gained per meter of cart travel while the magnet holds the pendulum
const PUMP_DEG_PER_M: f32 = 300.0;
const MAX_TILT_DEG: f32 = 250.0;
const GRAVITY: f32 = 9.81;

pub struct SimRobot {
    pulses: Arc<AtomicPulseCounter>,
    duty: f32,
    speed: f32,
    accel: f32,
    pulse_remainder: f32,
    tilt_deg: f32,
    holding: bool,
}

impl SimRobot {
    /// Create a simulated robot feeding the given encoder counter
    pub fn new(pulses: Arc<AtomicPulseCounter>) -> Self {
        Self {
            pulses,
            duty: 0.0,
            speed: 0.0,
            accel: 0.0,
            pulse_remainder: 0.0,
            tilt_deg: 0.0,
            holding: false,
        }
    }

    /// Advance the model by `dt` seconds, acting as the encoder edge source
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let speed = self.duty.clamp(-1.0, 1.0) * MAX_SPEED;
        self.accel = (speed - self.speed) / dt;
        self.speed = speed;

        let travel = speed * dt;
        let exact = travel / DISTANCE_PER_PULSE + self.pulse_remainder;
        let whole = exact.trunc();
        self.pulse_remainder = exact - whole;
        if whole != 0.0 {
            self.pulses.increment(whole as i32);
        }

        if self.holding {
            self.tilt_deg = (self.tilt_deg + travel.abs() * PUMP_DEG_PER_M).min(MAX_TILT_DEG);
        }
    }

    pub fn tilt_deg(&self) -> f32 {
        self.tilt_deg
    }
}

impl ActuatorDriver for SimRobot {
    fn set_motor_output(&mut self, channel: u8, duty: f32) -> Result<()> {
        debug!("sim: channel {} duty {:.3}", channel, duty);
        self.duty = duty;
        Ok(())
    }

    fn set_holding(&mut self, pin: u8, on: bool) -> Result<()> {
        debug!("sim: magnet pin {} -> {}", pin, on);
        self.holding = on;
        Ok(())
    }
}

impl SensorSource for SimRobot {
    fn read_analog(&mut self, _pin: u8) -> Result<u16> {
        Ok((self.tilt_deg / DEG_PER_COUNT).round() as u16)
    }

    fn read_inertial(&mut self) -> Result<Inertial> {
        Ok(Inertial {
            accel: [self.accel, 0.0, GRAVITY],
            gyro: [0.0; 3],
        })
    }

    fn supply_voltage(&mut self) -> Result<f32> {
        Ok(12.0 - 0.4 * self.duty.abs())
    }

    fn supply_current(&mut self) -> Result<f32> {
        Ok(0.2 + 1.5 * self.duty.abs())
    }

    fn encoder_count(&mut self) -> Result<i32> {
        Ok((self.tilt_deg * 4.0).round() as i32)
    }
}

/// Shared handle so one simulated robot serves as both actuator and sensors
#[derive(Clone)]
pub struct SimHandle(Rc<RefCell<SimRobot>>);

impl SimHandle {
    pub fn new(robot: SimRobot) -> Self {
        Self(Rc::new(RefCell::new(robot)))
    }

    pub fn step(&self, dt: f32) {
        self.0.borrow_mut().step(dt);
    }

    pub fn tilt_deg(&self) -> f32 {
        self.0.borrow().tilt_deg()
    }
}

impl ActuatorDriver for SimHandle {
    fn set_motor_output(&mut self, channel: u8, duty: f32) -> Result<()> {
        self.0.borrow_mut().set_motor_output(channel, duty)
    }

    fn set_holding(&mut self, pin: u8, on: bool) -> Result<()> {
        self.0.borrow_mut().set_holding(pin, on)
    }
}

impl SensorSource for SimHandle {
    fn read_analog(&mut self, pin: u8) -> Result<u16> {
        self.0.borrow_mut().read_analog(pin)
    }

    fn read_inertial(&mut self) -> Result<Inertial> {
        self.0.borrow_mut().read_inertial()
    }

    fn supply_voltage(&mut self) -> Result<f32> {
        self.0.borrow_mut().supply_voltage()
    }

    fn supply_current(&mut self) -> Result<f32> {
        self.0.borrow_mut().supply_current()
    }

    fn encoder_count(&mut self) -> Result<i32> {
        self.0.borrow_mut().encoder_count()
    }
}
