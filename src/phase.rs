// Mission phase state machine.
//
// `PhaseStateMachine::tick` is the body of the control loop. Each call:
//
// 1. applies at most one pending inbound command,
// 2. emits one telemetry record if the telemetry timer is due,
// 3. advances the scheduler timers,
// 4. hands the loop time to the PID controller,
// 5. runs the current phase and possibly moves to the next one.
//
// Everything the tick touches lives in a `Context` owned by the caller, so
// the hardware side can be swapped for fakes in tests.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{
    DEG_PER_COUNT, DRIVE_CHANNEL, MAGNET_PIN, POT_PIN, SWING_STEP, TILT_THRESHOLD_DEG,
    UPDATE_PERIOD_MS,
};
use crate::hal::{ActuatorDriver, IncrementableCounter, Inertial, LineTransport, SensorSource};
use crate::messages::{self, CommandRecord, TelemetryRecord};
use crate::motor::{Direction, MotionPrimitives, Odometry};
use crate::pid::PidController;
use crate::scheduler::Scheduler;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting = 0,
    Loading = 1,
    Balancing = 2,
    Transition = 3,
    Traverse = 4,
    Launch = 5,
    Return = 6,
}

impl Phase {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Phase::Waiting),
            1 => Some(Phase::Loading),
            2 => Some(Phase::Balancing),
            3 => Some(Phase::Transition),
            4 => Some(Phase::Traverse),
            5 => Some(Phase::Launch),
            6 => Some(Phase::Return),
            _ => None,
        }
    }
}

/// Snapshot of what the loop is currently commanding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLoopState {
    /// `None` when the stored phase code is not a known phase
    pub phase: Option<Phase>,
    pub commanded_duty_cycle: f32,
    pub commanded_direction: Direction,
}

/// Handles the state machine drives on every tick
pub struct Context<A, S, T> {
    pub scheduler: Scheduler,
    pub pid: PidController,
    pub odometry: Odometry,
    pub actuator: A,
    pub sensors: S,
    pub transport: T,
}

impl<A, S, T> Context<A, S, T>
where
    A: ActuatorDriver,
    S: SensorSource,
    T: LineTransport,
{
    /// Default timers and an idle controller
    pub fn new(
        counter: Arc<dyn IncrementableCounter>,
        actuator: A,
        sensors: S,
        transport: T,
    ) -> Self {
        Self {
            scheduler: Scheduler::new(UPDATE_PERIOD_MS, 0),
            pid: PidController::default(),
            odometry: Odometry::new(counter),
            actuator,
            sensors,
            transport,
        }
    }
}

/// Last good sensor values, used when a read fails
#[derive(Debug, Default, Clone, Copy)]
struct SensorCache {
    pot: u16,
    encoder: i32,
    voltage: f32,
    current: f32,
    inertial: Inertial,
}

pub struct PhaseStateMachine {
    phase_code: u8,
    motion: MotionPrimitives,
    run_forward: bool,
    start_requested: bool,
    pulse_ms: u64,
    sensors: SensorCache,
}

impl Default for PhaseStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseStateMachine {
    pub fn new() -> Self {
        Self {
            phase_code: Phase::Waiting.code(),
            motion: MotionPrimitives::new(DRIVE_CHANNEL),
            run_forward: false,
            start_requested: false,
            pulse_ms: 0,
            sensors: SensorCache::default(),
        }
    }

    pub fn state(&self) -> ControlLoopState {
        ControlLoopState {
            phase: Phase::from_code(self.phase_code),
            commanded_duty_cycle: self.motion.duty(),
            commanded_direction: self.motion.direction(),
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        Phase::from_code(self.phase_code)
    }

    /// Store a raw phase code; unknown codes fall back to `Waiting` on the next tick
    pub fn set_phase_code(&mut self, code: u8) {
        self.phase_code = code;
    }

    /// Same effect as an inbound `start` command
    pub fn request_start(&mut self) {
        self.start_requested = true;
    }

    pub fn run_forward(&self) -> bool {
        self.run_forward
    }

    /// One pass of the control loop
    pub fn tick<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, now_ms: u64)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        self.read_command(ctx, now_ms);

        if ctx.scheduler.telemetry.take_due() {
            self.send_telemetry(ctx, now_ms);
        }

        ctx.scheduler.update(now_ms);
        if ctx.scheduler.pulse.take_due() {
            self.end_pulse(ctx);
        }

        ctx.pid.run(now_ms);

        self.run_phase(ctx);
    }

    fn run_phase<A, S, T>(&mut self, ctx: &mut Context<A, S, T>)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        let Some(phase) = Phase::from_code(self.phase_code) else {
            warn!("Unknown phase code {}, resetting to Waiting", self.phase_code);
            self.enter(Phase::Waiting);
            return;
        };

        match phase {
            Phase::Waiting => {
                if std::mem::take(&mut self.start_requested) {
                    self.enter(Phase::Loading);
                }
            }
            Phase::Loading => {
                if let Err(e) = ctx.actuator.set_holding(MAGNET_PIN, true) {
                    warn!("Failed to energize holding magnet: {}", e);
                }
                self.enter(Phase::Balancing);
            }
            Phase::Balancing => {
                if self.tilt_deg(&mut ctx.sensors) < TILT_THRESHOLD_DEG {
                    self.advance(ctx, SWING_STEP);
                    self.retreat(ctx, SWING_STEP);
                    self.advance(ctx, SWING_STEP);
                } else {
                    self.enter(Phase::Transition);
                }
            }
            Phase::Transition => {
                self.retreat(ctx, SWING_STEP);
                self.enter(Phase::Traverse);
            }
            // Not implemented yet: these phases hold whatever was last commanded
            Phase::Traverse | Phase::Launch | Phase::Return => {}
        }
    }

    fn enter(&mut self, next: Phase) {
        if let Some(current) = Phase::from_code(self.phase_code) {
            info!("Phase {:?} -> {:?}", current, next);
        }
        if next == Phase::Waiting {
            // a fresh start command is needed after any return to Waiting
            self.start_requested = false;
        }
        self.phase_code = next.code();
    }

    /// Tilt of the pendulum in degrees from the potentiometer
    fn tilt_deg(&mut self, sensors: &mut impl SensorSource) -> f32 {
        self.read_pot(sensors) as f32 * DEG_PER_COUNT
    }

    /// Move toward +`step` relative to the travel since the previous read
    fn advance<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, step: f32)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        let error = step - ctx.odometry.take_distance();
        let command = ctx.pid.compute_command(error);
        self.motion.drive(&mut ctx.actuator, command);
    }

    /// Move toward -`step` relative to the travel since the previous read
    fn retreat<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, step: f32)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        let error = step + ctx.odometry.take_distance();
        let command = ctx.pid.compute_command(error);
        self.motion.drive(&mut ctx.actuator, -command);
    }

    fn read_command<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, now_ms: u64)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        let line = match ctx.transport.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read command: {}", e);
                return;
            }
        };

        match messages::decode_command(&line) {
            Ok(cmd) => self.apply_command(ctx, cmd, now_ms),
            Err(e) => {
                warn!("Discarding command {:?}: {}", line, e);
                if let Err(e) = ctx.transport.write_line(&messages::encode_error(&e)) {
                    warn!("Failed to report decode error: {}", e);
                }
            }
        }
    }

    fn apply_command<A, S, T>(
        &mut self,
        ctx: &mut Context<A, S, T>,
        cmd: CommandRecord,
        now_ms: u64,
    ) where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        debug!("Received command: {:?}", cmd);

        if let Some(duty) = cmd.pwm_des {
            self.motion.set_duty(duty);
        }
        if let Some(forward) = cmd.run_forward {
            self.run_forward = forward;
        }
        if let Some([kp, ki, kd, epsilon, goal]) = cmd.set_goal {
            if let Err(e) = ctx.pid.reconfigure(kp, ki, kd, epsilon, goal) {
                warn!("Rejected setGoal: {}", e);
            }
        }
        if let Some(ms) = cmd.pulse_time {
            self.pulse_ms = ms;
        }
        if let Some(code) = cmd.phase {
            info!("Phase forced to code {}", code);
            self.phase_code = code;
        }
        if cmd.start == Some(true) {
            match self.phase() {
                Some(Phase::Waiting) => {
                    info!("Start requested");
                    self.start_requested = true;
                }
                other => warn!("Ignoring start outside Waiting (phase {:?})", other),
            }
        }
        if cmd.pulse == Some(true) {
            self.start_pulse(ctx, now_ms);
        }
    }

    /// Drive at the commanded duty for `pulse_ms`, in the `RunForward` direction
    fn start_pulse<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, now_ms: u64)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        info!(
            "Pulse: duty={} for {}ms ({})",
            self.motion.duty(),
            self.pulse_ms,
            if self.run_forward { "forward" } else { "reverse" }
        );
        let pulse = &mut ctx.scheduler.pulse;
        pulse.set_delay(self.pulse_ms);
        pulse.enable(now_ms);
        if self.run_forward {
            self.motion.forward(&mut ctx.actuator);
        } else {
            self.motion.reverse(&mut ctx.actuator);
        }
    }

    fn end_pulse<A, S, T>(&mut self, ctx: &mut Context<A, S, T>)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        debug!("Pulse finished");
        self.motion.stop(&mut ctx.actuator);
        ctx.scheduler.pulse.disable();
    }

    fn send_telemetry<A, S, T>(&mut self, ctx: &mut Context<A, S, T>, now_ms: u64)
    where
        A: ActuatorDriver,
        S: SensorSource,
        T: LineTransport,
    {
        let pot = self.read_pot(&mut ctx.sensors);
        let cache = &mut self.sensors;
        cache.encoder = fallback(ctx.sensors.encoder_count(), cache.encoder, "encoder");
        cache.voltage = fallback(ctx.sensors.supply_voltage(), cache.voltage, "voltage");
        cache.current = fallback(ctx.sensors.supply_current(), cache.current, "current");
        cache.inertial = fallback(ctx.sensors.read_inertial(), cache.inertial, "imu");
        let Inertial { accel, gyro } = cache.inertial;

        let record = TelemetryRecord {
            time: now_ms,
            pot_vex: pot,
            enc_vex: cache.encoder,
            goal: ctx.pid.goal(),
            voltage: cache.voltage,
            current: cache.current,
            pwm_des: self.motion.duty(),
            direction: self.motion.direction(),
            accel_x: accel[0],
            accel_y: accel[1],
            accel_z: accel[2],
            gyro_x: gyro[0],
            gyro_y: gyro[1],
            gyro_z: gyro[2],
            is_goal: ctx.pid.is_at_goal(),
            actual_time: ctx.pid.actual_dt(),
        };

        let line = match messages::encode_telemetry(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode telemetry: {}", e);
                return;
            }
        };
        if let Err(e) = ctx.transport.write_line(&line) {
            warn!("Failed to send telemetry: {}", e);
        }
    }

    fn read_pot(&mut self, sensors: &mut impl SensorSource) -> u16 {
        let reading = sensors.read_analog(POT_PIN);
        self.sensors.pot = fallback(reading, self.sensors.pot, "potentiometer");
        self.sensors.pot
    }
}

fn fallback<V>(reading: crate::hal::Result<V>, last: V, name: &str) -> V {
    reading.unwrap_or_else(|e| {
        warn!("{} read failed, using last value: {}", name, e);
        last
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::AtomicPulseCounter;
    use crate::hal::fake::{FakeActuator, FakeSensors, FakeTransport};
    use serde_json::Value;

    type TestContext = Context<FakeActuator, FakeSensors, FakeTransport>;

    fn context() -> (Arc<AtomicPulseCounter>, TestContext) {
        let counter = Arc::new(AtomicPulseCounter::new());
        let ctx = Context::new(
            counter.clone(),
            FakeActuator::default(),
            FakeSensors::default(),
            FakeTransport::default(),
        );
        (counter, ctx)
    }

    fn raw_for_deg(deg: f32) -> u16 {
        (deg / DEG_PER_COUNT).ceil() as u16
    }

    #[test]
    fn test_waits_for_start() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        for t in 0..50 {
            sm.tick(&mut ctx, t);
        }
        assert_eq!(sm.phase(), Some(Phase::Waiting));

        ctx.transport.push(r#"{"start": true}"#);
        sm.tick(&mut ctx, 50);
        assert_eq!(sm.phase(), Some(Phase::Loading));
    }

    #[test]
    fn test_loading_energizes_magnet_then_balances() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(Phase::Loading.code());
        sm.tick(&mut ctx, 0);
        assert_eq!(ctx.actuator.holding, Some((MAGNET_PIN, true)));
        assert_eq!(sm.phase(), Some(Phase::Balancing));
    }

    #[test]
    fn test_balancing_swings_below_threshold() {
        let (_, mut ctx) = context();
        ctx.pid.enable();
        ctx.sensors.analog = Some(raw_for_deg(90.0));
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(Phase::Balancing.code());

        sm.tick(&mut ctx, 1_000);
        assert_eq!(sm.phase(), Some(Phase::Balancing));
        // advance, retreat, advance
        assert_eq!(ctx.actuator.outputs.len(), 3);
        let duties: Vec<f32> = ctx.actuator.outputs.iter().map(|&(_, d)| d).collect();
        assert!(duties[0] > 0.0);
        assert_eq!(duties[1], -duties[0]);
        assert_eq!(duties[2], duties[0]);
        assert_eq!(sm.state().commanded_direction, Direction::Forward);
    }

    #[test]
    fn test_balancing_exits_at_threshold_regardless_of_state() {
        for (duty, forward) in [(0.0, false), (0.8, true)] {
            let (counter, mut ctx) = context();
            counter.increment(500);
            ctx.sensors.analog = Some(raw_for_deg(TILT_THRESHOLD_DEG));
            let mut sm = PhaseStateMachine::new();
            ctx.transport
                .push(&format!(r#"{{"PWM_des": {}, "RunForward": {}}}"#, duty, forward));
            sm.set_phase_code(Phase::Balancing.code());

            sm.tick(&mut ctx, 10);
            assert_eq!(sm.phase(), Some(Phase::Transition));
        }
    }

    #[test]
    fn test_transition_retreats_once() {
        let (_, mut ctx) = context();
        ctx.pid.enable();
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(Phase::Transition.code());

        sm.tick(&mut ctx, 500);
        assert_eq!(sm.phase(), Some(Phase::Traverse));
        assert_eq!(ctx.actuator.outputs.len(), 1);
        assert!(ctx.actuator.outputs[0].1 < 0.0);
        assert_eq!(sm.state().commanded_direction, Direction::Reverse);

        // Traverse is a no-op
        sm.tick(&mut ctx, 501);
        assert_eq!(sm.phase(), Some(Phase::Traverse));
        assert_eq!(ctx.actuator.outputs.len(), 1);
    }

    #[test]
    fn test_retreat_error_shrinks_with_reverse_travel() {
        let retreat_duty = |pulses: i32| {
            let (counter, mut ctx) = context();
            ctx.pid.enable();
            counter.increment(pulses);
            let mut sm = PhaseStateMachine::new();
            sm.set_phase_code(Phase::Transition.code());
            sm.tick(&mut ctx, 500);
            ctx.actuator.last_output().unwrap()
        };

        let standing = retreat_duty(0);
        let backed_up = retreat_duty(-200);
        assert!(standing < 0.0);
        assert!(backed_up < 0.0);
        // part of the step is already covered, so less reverse drive is needed
        assert!(backed_up.abs() < standing.abs());
    }

    #[test]
    fn test_stub_phases_do_nothing() {
        for phase in [Phase::Traverse, Phase::Launch, Phase::Return] {
            let (_, mut ctx) = context();
            let mut sm = PhaseStateMachine::new();
            sm.set_phase_code(phase.code());
            for t in 0..10 {
                sm.tick(&mut ctx, t);
            }
            assert_eq!(sm.phase(), Some(phase));
            assert!(ctx.actuator.outputs.is_empty());
        }
    }

    #[test]
    fn test_unknown_phase_resets_to_waiting() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(42);
        assert_eq!(sm.state().phase, None);

        sm.tick(&mut ctx, 0);
        assert_eq!(sm.phase(), Some(Phase::Waiting));
    }

    #[test]
    fn test_start_outside_waiting_is_not_latched() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(Phase::Traverse.code());

        ctx.transport.push(r#"{"start": true}"#);
        sm.tick(&mut ctx, 0);
        assert_eq!(sm.phase(), Some(Phase::Traverse));

        ctx.transport.push(r#"{"phase": 99}"#);
        sm.tick(&mut ctx, 1);
        assert_eq!(sm.phase(), Some(Phase::Waiting));

        for t in 2..10 {
            sm.tick(&mut ctx, t);
        }
        assert_eq!(sm.phase(), Some(Phase::Waiting));

        ctx.transport.push(r#"{"start": true}"#);
        sm.tick(&mut ctx, 10);
        assert_eq!(sm.phase(), Some(Phase::Loading));
    }

    #[test]
    fn test_reset_to_waiting_drops_pending_start() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        sm.request_start();
        sm.set_phase_code(200);

        sm.tick(&mut ctx, 0);
        assert_eq!(sm.phase(), Some(Phase::Waiting));
        sm.tick(&mut ctx, 1);
        assert_eq!(sm.phase(), Some(Phase::Waiting));
    }

    #[test]
    fn test_phase_command_forces_code() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        ctx.transport.push(r#"{"phase": 9}"#);
        sm.tick(&mut ctx, 0);
        // Applied and reset within the same tick
        assert_eq!(sm.phase(), Some(Phase::Waiting));

        ctx.transport.push(r#"{"phase": 5}"#);
        sm.tick(&mut ctx, 1);
        assert_eq!(sm.phase(), Some(Phase::Launch));
    }

    #[test]
    fn test_set_goal_command_reconfigures_pid() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        ctx.transport.push(r#"{"setGoal": [0.25, 0.1, 0, 0.001, 0.3]}"#);
        sm.tick(&mut ctx, 0);

        let config = ctx.pid.config();
        assert_eq!((config.kp, config.ki, config.kd), (0.25, 0.1, 0.0));
        assert_eq!(config.epsilon, 0.001);
        assert_eq!(config.goal, 0.3);
        assert!(ctx.pid.is_enabled());
    }

    #[test]
    fn test_malformed_command_changes_nothing() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        let config_before = *ctx.pid.config();
        let state_before = sm.state();

        ctx.transport.push(r#"{"setGoal": [1, 2, 3, 0.1, 5], "PWM_des": 0.9"#);
        sm.tick(&mut ctx, 0);

        assert_eq!(*ctx.pid.config(), config_before);
        assert!(!ctx.pid.is_enabled());
        assert_eq!(sm.state(), state_before);
        assert_eq!(ctx.transport.outbound.len(), 1);
        let report: Value = serde_json::from_str(&ctx.transport.outbound[0]).unwrap();
        assert!(report["error"].is_string());
    }

    #[test]
    fn test_one_command_per_tick() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        ctx.transport.push(r#"{"PWM_des": 0.2}"#);
        ctx.transport.push(r#"{"PWM_des": 0.7}"#);

        sm.tick(&mut ctx, 0);
        assert_eq!(sm.state().commanded_duty_cycle, 0.2);
        sm.tick(&mut ctx, 1);
        assert_eq!(sm.state().commanded_duty_cycle, 0.7);
    }

    #[test]
    fn test_telemetry_emitted_on_cadence() {
        let (_, mut ctx) = context();
        ctx.sensors.analog = Some(300);
        ctx.sensors.encoder = 17;
        let mut sm = PhaseStateMachine::new();

        for t in 0..=350 {
            sm.tick(&mut ctx, t);
        }
        // due at 100, 200, 300; each sent on the following tick
        assert_eq!(ctx.transport.outbound.len(), 3);

        let first: Value = serde_json::from_str(&ctx.transport.outbound[0]).unwrap();
        assert_eq!(first["time"], 101);
        assert_eq!(first["potVex"], 300);
        assert_eq!(first["encVex"], 17);
        assert_eq!(first["Etat_robot"], 0);
        assert_eq!(first["isGoal"], false);
    }

    #[test]
    fn test_telemetry_reports_duty_magnitude_with_direction() {
        let (_, mut ctx) = context();
        ctx.pid.enable();
        let mut sm = PhaseStateMachine::new();
        sm.set_phase_code(Phase::Transition.code());

        // retreat at 500, telemetry due at 500 and sent at 501
        for t in 500..=501 {
            sm.tick(&mut ctx, t);
        }
        assert_eq!(ctx.transport.outbound.len(), 1);
        let record: Value = serde_json::from_str(&ctx.transport.outbound[0]).unwrap();
        assert!(record["PWM_des"].as_f64().unwrap() > 0.0);
        assert_eq!(record["Etat_robot"], -1);
        assert!(ctx.actuator.last_output().unwrap() < 0.0);
    }

    #[test]
    fn test_telemetry_uses_last_known_sensor_values() {
        let (_, mut ctx) = context();
        ctx.sensors.analog = Some(123);
        let mut sm = PhaseStateMachine::new();
        for t in 0..=101 {
            sm.tick(&mut ctx, t);
        }

        ctx.sensors.analog = None;
        ctx.sensors.inertial = None;
        for t in 102..=201 {
            sm.tick(&mut ctx, t);
        }

        assert_eq!(ctx.transport.outbound.len(), 2);
        let second: Value = serde_json::from_str(&ctx.transport.outbound[1]).unwrap();
        assert_eq!(second["potVex"], 123);
        assert_eq!(second["accelZ"], 0.0);
    }

    #[test]
    fn test_timed_pulse_drives_then_stops() {
        let (_, mut ctx) = context();
        let mut sm = PhaseStateMachine::new();
        ctx.transport
            .push(r#"{"PWM_des": 0.4, "RunForward": false, "pulseTime": 50, "pulse": true}"#);

        sm.tick(&mut ctx, 10);
        assert!(!sm.run_forward());
        assert_eq!(ctx.actuator.outputs, vec![(DRIVE_CHANNEL, -0.4)]);
        assert_eq!(sm.state().commanded_direction, Direction::Reverse);

        for t in 11..60 {
            sm.tick(&mut ctx, t);
        }
        assert_eq!(sm.state().commanded_direction, Direction::Reverse);

        sm.tick(&mut ctx, 60);
        assert_eq!(sm.state().commanded_direction, Direction::Stopped);
        assert_eq!(ctx.actuator.last_output(), Some(0.0));
        assert!(!ctx.scheduler.pulse.is_enabled());
    }
}
