//! calbridge Test Harness - Fake hosts and end-to-end scenarios
//!
//! This crate provides:
//! - Fake authority, host clock, roster, registry and celestial source
//! - A virtual-time scheduler for the deferred `ready` notification
//! - A session builder wiring a `CalendarApi` over the fakes
//! - Scenario tests covering the legacy surface end to end

pub mod fakes;
pub mod scheduler;
pub mod session;

#[cfg(test)]
mod scenarios;

pub use fakes::*;
pub use scheduler::*;
pub use session::*;
