// Fixed-rate control loop around the phase state machine
//
// The loop has no deadline of its own: each interval tick just runs one pass of
// the state machine against the simulated robot and the console transport.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::config::{BAUD, LOOP_HZ, UPDATE_PERIOD_MS};
use crate::hal::{
    AtomicPulseCounter, LineTransport, SerialTransport, SimHandle, SimRobot, StdioTransport,
};
use crate::phase::{Context, PhaseStateMachine};
use crate::scheduler::Scheduler;

/// Command-line options for the runtime binary
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Swing robot control loop")]
pub struct RuntimeConfig {
    /// Console serial port; stdin/stdout is used when omitted
    #[arg(long)]
    pub port: Option<String>,

    #[arg(long, default_value_t = BAUD)]
    pub baud: u32,

    /// Control loop poll rate
    #[arg(long, default_value_t = LOOP_HZ)]
    pub loop_hz: u64,

    /// Telemetry period in milliseconds
    #[arg(long, default_value_t = UPDATE_PERIOD_MS)]
    pub telemetry_ms: u64,

    /// Start the mission immediately instead of waiting for a start command
    #[arg(long)]
    pub autostart: bool,
}

pub async fn run(config: RuntimeConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match config.port.clone() {
        Some(port) => {
            let transport = SerialTransport::open_with_baudrate(&port, config.baud)?;
            run_with(config, transport).await
        }
        None => {
            info!("No console port given, using stdin/stdout");
            run_with(config, StdioTransport::stdio()).await
        }
    }
}

async fn run_with<T: LineTransport>(
    config: RuntimeConfig,
    transport: T,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let pulses = Arc::new(AtomicPulseCounter::new());
    let robot = SimHandle::new(SimRobot::new(Arc::clone(&pulses)));
    let mut ctx = Context::new(pulses, robot.clone(), robot.clone(), transport);
    ctx.scheduler = Scheduler::new(config.telemetry_ms, 0);
    ctx.pid.enable();

    let mut machine = PhaseStateMachine::new();
    if config.autostart {
        machine.request_start();
    }

    let period = Duration::from_millis(1000 / config.loop_hz.max(1));
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Runtime started: {}Hz loop, {}ms telemetry",
        config.loop_hz, config.telemetry_ms
    );

    let started = Instant::now();
    let mut last = started;
    loop {
        tick.tick().await;

        let now = Instant::now();
        robot.step((now - last).as_secs_f32());
        last = now;

        machine.tick(&mut ctx, started.elapsed().as_millis() as u64);
    }
}
