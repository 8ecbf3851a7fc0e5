//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the process lifetime.
//!
//! # Tasks
//! - Sweep: eagerly removes expired cache entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
