//! Output sinks
//!
//! Every validated record is fanned out to whichever of these three sinks
//! its configuration enables. Each sink owns its own background dispatch
//! thread and isolates its own failures — one sink's error is logged and
//! swallowed, never propagated to the others or back to the consumer.

pub mod console;
pub mod database;
pub mod file;
