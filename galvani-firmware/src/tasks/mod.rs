//! Embassy async tasks
//!
//! The tick task runs on the high-priority interrupt executor; the
//! stimulator task owns the cooperative main loop on the thread executor.

pub mod stimulator;
pub mod tick;

pub use stimulator::stimulator_task;
pub use tick::tick_task;
