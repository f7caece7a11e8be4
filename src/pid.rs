// Rate-limited PID controller.
//
// The controller is fed an error value and produces a command. A new output
// is only computed once `min_period_ms` has elapsed since the previous
// update; calls in between return the cached output and leave the integral
// and derivative state untouched, so fast polling does not amplify noise in
// the derivative term.
//
// Time comes from `PidController::run`, which the control loop calls once
// per tick with the current loop time.

use tracing::{debug, info};

use crate::config::{PID_EPSILON, PID_KD, PID_KI, PID_KP, PID_PERIOD_MS};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// PID gains and target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub goal: f32,
    pub epsilon: f32,
    pub min_period_ms: u64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: PID_KP,
            ki: PID_KI,
            kd: PID_KD,
            goal: 0.0,
            epsilon: PID_EPSILON,
            min_period_ms: PID_PERIOD_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    enabled: bool,
    now_ms: u64,
    last_update_ms: u64,
    actual_dt_ms: u64,
    last_output: f32,
    last_error: Option<f32>,
    integral: f32,
    at_goal: bool,
}

impl Default for PidController {
    fn default() -> Self {
        Self::new(PidConfig::default())
    }
}

impl PidController {
    /// A disabled controller; outputs zero until enabled
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            enabled: false,
            now_ms: 0,
            last_update_ms: 0,
            actual_dt_ms: 0,
            last_output: 0.0,
            last_error: None,
            integral: 0.0,
            at_goal: false,
        }
    }

    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) -> Result<(), ConfigError> {
        finite("kp", kp)?;
        finite("ki", ki)?;
        finite("kd", kd)?;
        self.config.kp = kp;
        self.config.ki = ki;
        self.config.kd = kd;
        Ok(())
    }

    /// Changing the goal drops any previous convergence until the next update
    pub fn set_goal(&mut self, goal: f32) -> Result<(), ConfigError> {
        finite("goal", goal)?;
        self.config.goal = goal;
        self.at_goal = false;
        Ok(())
    }

    pub fn set_epsilon(&mut self, epsilon: f32) -> Result<(), ConfigError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "epsilon",
                value: epsilon,
            });
        }
        self.config.epsilon = epsilon;
        self.at_goal = false;
        Ok(())
    }

    pub fn set_period(&mut self, ms: u64) {
        self.config.min_period_ms = ms;
    }

    /// Replace gains, epsilon and goal in one step.
    ///
    /// The controller is disabled while the fields change and re-enabled
    /// afterwards. Nothing is touched if any value is rejected.
    pub fn reconfigure(
        &mut self,
        kp: f32,
        ki: f32,
        kd: f32,
        epsilon: f32,
        goal: f32,
    ) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        candidate.set_gains(kp, ki, kd)?;
        candidate.set_epsilon(epsilon)?;
        candidate.set_goal(goal)?;

        self.disable();
        self.config = candidate.config;
        self.at_goal = false;
        self.enable();
        info!(
            "PID reconfigured: kp={} ki={} kd={} epsilon={} goal={}",
            kp, ki, kd, epsilon, goal
        );
        Ok(())
    }

    /// Enable and restart the integral / derivative history
    pub fn enable(&mut self) {
        self.enabled = true;
        self.integral = 0.0;
        self.last_error = None;
        self.last_update_ms = self.now_ms;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Per-tick bookkeeping: records the loop time used by `compute_command`
    pub fn run(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    pub fn compute_command(&mut self, error: f32) -> f32 {
        if !self.enabled {
            return self.last_output;
        }

        let elapsed = self.now_ms.saturating_sub(self.last_update_ms);
        if elapsed < self.config.min_period_ms {
            return self.last_output;
        }

        let dt = elapsed as f32 / 1000.0;
        let derivative = match self.last_error {
            Some(previous) if dt > 0.0 => (error - previous) / dt,
            _ => 0.0,
        };
        self.integral += error * dt;

        let PidConfig { kp, ki, kd, .. } = self.config;
        let output = kp * error + ki * self.integral + kd * derivative;

        self.at_goal = error.abs() <= self.config.epsilon;
        self.actual_dt_ms = elapsed;
        self.last_update_ms = self.now_ms;
        self.last_error = Some(error);
        self.last_output = output;

        debug!(
            "PID update: error={:.4} output={:.4} dt={}ms",
            error, output, elapsed
        );
        output
    }

    pub fn is_at_goal(&self) -> bool {
        self.at_goal
    }

    /// Elapsed time covered by the last update, ms
    pub fn actual_dt(&self) -> u64 {
        self.actual_dt_ms
    }

    pub fn goal(&self) -> f32 {
        self.config.goal
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
