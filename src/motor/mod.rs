// Drive-side modules for the swing robot
//
// Provides:
// - Forward / reverse / stop primitives with direction tracking
// - Encoder pulse to wheel travel conversion

mod motion;
pub mod odometry;

pub use motion::{Direction, MotionPrimitives};
pub use odometry::Odometry;
