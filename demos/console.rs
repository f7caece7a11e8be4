// Operator console: G=start, F=toggle direction, +/-=duty, P=pulse, K=default gains, Q=quit
//
// Usage: cargo run --example console -- [port]
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use pendulum_runtime::config::{DEFAULT_PORT, PID_EPSILON, PID_KD, PID_KI, PID_KP};
use pendulum_runtime::hal::{LineTransport, SerialTransport};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

const DUTY_STEP: f64 = 0.05;
const PULSE_MS: u64 = 300;
const GOAL: f64 = 0.3;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let mut link = SerialTransport::open(&port)?;

    info!("Controls: G=start, F=direction, +/-=duty, P=pulse, K=gains, Q=quit");

    enable_raw_mode()?;
    let result = run_console(&mut link);
    disable_raw_mode()?;

    result
}

fn run_console(link: &mut SerialTransport) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut duty: f64 = 0.2;
    let mut forward = true;

    loop {
        // Show whatever the robot sent since the last key
        while let Some(line) = link.read_line()? {
            print_line(&line);
        }

        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let command = match code {
            KeyCode::Char('g') => json!({ "start": true }),
            KeyCode::Char('f') => {
                forward = !forward;
                json!({ "RunForward": forward })
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                duty = (duty + DUTY_STEP).min(1.0);
                json!({ "PWM_des": duty })
            }
            KeyCode::Char('-') => {
                duty = (duty - DUTY_STEP).max(0.0);
                json!({ "PWM_des": duty })
            }
            KeyCode::Char('p') => json!({
                "PWM_des": duty,
                "RunForward": forward,
                "pulseTime": PULSE_MS,
                "pulse": true,
            }),
            KeyCode::Char('k') => json!({
                "setGoal": [PID_KP, PID_KI, PID_KD, PID_EPSILON, GOAL],
            }),
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("Quitting");
                return Ok(());
            }
            _ => continue,
        };

        let text = command.to_string();
        print!("> {}\r\n", text);
        link.write_line(&text)?;
    }
}

fn print_line(line: &str) {
    match serde_json::from_str::<Value>(line) {
        Ok(msg) if msg.get("error").is_some() => print!("! {}\r\n", msg["error"]),
        Ok(msg) => print!(
            "t={} tilt_raw={} pwm={} dir={} goal={} at_goal={}\r\n",
            msg["time"],
            msg["potVex"],
            msg["PWM_des"],
            msg["Etat_robot"],
            msg["goal"],
            msg["isGoal"]
        ),
        Err(_) => print!("? {}\r\n", line),
    }
}
