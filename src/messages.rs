// Message types exchanged with the operator console
//
// One JSON object per line in both directions. Field names are the stable
// contract; field order is not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::motor::Direction;

/// Runtime -> console, once per telemetry period
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TelemetryRecord {
    pub time: u64,
    #[serde(rename = "potVex")]
    pub pot_vex: u16,
    #[serde(rename = "encVex")]
    pub enc_vex: i32,
    pub goal: f32,
    pub voltage: f32,
    pub current: f32,
    /// Commanded duty magnitude; the sign lives in `direction`
    #[serde(rename = "PWM_des")]
    pub pwm_des: f32,
    /// -1 reverse, 0 stopped, 1 forward
    #[serde(rename = "Etat_robot")]
    pub direction: Direction,
    #[serde(rename = "accelX")]
    pub accel_x: f32,
    #[serde(rename = "accelY")]
    pub accel_y: f32,
    #[serde(rename = "accelZ")]
    pub accel_z: f32,
    #[serde(rename = "gyroX")]
    pub gyro_x: f32,
    #[serde(rename = "gyroY")]
    pub gyro_y: f32,
    #[serde(rename = "gyroZ")]
    pub gyro_z: f32,
    #[serde(rename = "isGoal")]
    pub is_goal: bool,
    #[serde(rename = "actualTime")]
    pub actual_time: u64,
}

/// Console -> runtime. Every field is optional; absent or null means "leave as is".
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommandRecord {
    /// Duty cycle override
    #[serde(rename = "PWM_des")]
    pub pwm_des: Option<f32>,
    /// Direction used by timed pulses
    #[serde(rename = "RunForward")]
    pub run_forward: Option<bool>,
    /// `[kp, ki, kd, epsilon, goal]`
    #[serde(rename = "setGoal")]
    pub set_goal: Option<[f32; 5]>,
    /// Leave `Waiting` and begin the mission
    pub start: Option<bool>,
    /// Raw phase code to jump to (bench use)
    pub phase: Option<u8>,
    /// Duration of the next timed pulse, ms
    #[serde(rename = "pulseTime")]
    pub pulse_time: Option<u64>,
    /// Start a timed pulse
    pub pulse: Option<bool>,
}

impl CommandRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("deserialize() failed: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("invalid field: {0}")]
    Field(#[source] serde_json::Error),
}

pub fn encode_telemetry(record: &TelemetryRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

/// Parse one inbound line. Unknown keys are ignored.
pub fn decode_command(text: &str) -> Result<CommandRecord, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Syntax)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject(kind(&value)));
    }
    serde_json::from_value(value).map_err(DecodeError::Field)
}

/// One-line error report sent back to the console
pub fn encode_error(err: &DecodeError) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
