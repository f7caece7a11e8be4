// Loop timing, controller defaults, robot geometry
use std::f32::consts::PI;

// Serial link to the operator console
pub const BAUD: u32 = 115_200;
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

// Runtime loop frequency (the tick itself has no fixed rate, this only paces the poll)
pub const LOOP_HZ: u64 = 500;

// Telemetry cadence
pub const UPDATE_PERIOD_MS: u64 = 100;

// PID defaults applied at start-up
pub const PID_KP: f32 = 0.25;
pub const PID_KI: f32 = 0.1;
pub const PID_KD: f32 = 0.0;
pub const PID_EPSILON: f32 = 0.001;
pub const PID_PERIOD_MS: u64 = 200;

// Pins and channels on the controller board
pub const MAGNET_PIN: u8 = 32; // holding electromagnet
pub const POT_PIN: u8 = 5; // tilt potentiometer (A5)
pub const DRIVE_CHANNEL: u8 = 0;

// Wheel / drivetrain geometry
pub const WHEEL_RADIUS: f32 = 0.05; // meters
pub const PULSES_PER_REVOLUTION: f32 = 64.0;
pub const GEAR_RATIO: f32 = 37.5;

/// Linear wheel travel for one encoder pulse, in meters
pub const DISTANCE_PER_PULSE: f32 =
    (2.0 * PI * WHEEL_RADIUS) / (PULSES_PER_REVOLUTION * GEAR_RATIO);

// Tilt potentiometer: 10-bit ADC spanning 250 degrees
pub const DEG_PER_COUNT: f32 = 250.0 / 1023.0;

// Balancing exits once the pendulum reaches this angle
pub const TILT_THRESHOLD_DEG: f32 = 165.0;

// Displacement of one swing step (advance / retreat), meters
pub const SWING_STEP: f32 = 0.1;
