//! Hardware abstraction traits
//!
//! These traits define the interface between the pulse engine and the
//! board: a monotonic tick source, a busy-wait delay, and the output stage.

pub mod clock;
pub mod pulse;

pub use clock::{MicroDelay, Tick, TickClock, TickCounter, TICK_PERIOD_US};
pub use pulse::{Polarity, PulseOutput};
