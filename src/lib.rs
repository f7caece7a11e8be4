// Control core for the swing robot: phase sequencing, PID, timers,
// odometry and the console protocol.

pub mod config;
pub mod hal;
pub mod messages;
pub mod motor;
pub mod phase;
pub mod pid;
pub mod runtime;
pub mod scheduler;
