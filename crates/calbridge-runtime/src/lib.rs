//! calbridge Runtime - Legacy API surface over a calendar authority
//!
//! This crate wires the bridge together:
//! 1. Detect the authority from the host environment
//! 2. Register the legacy capability descriptor
//! 3. Subscribe to authority change notifications
//! 4. Re-emit them in legacy vocabulary, in delivery order
//! 5. Elect the primary participant for singleton notifications
//! 6. Announce readiness after a fixed delay
//! 7. Serve the legacy method surface, degrading when the authority is absent

pub mod bridge;
pub mod config;
pub mod context;
pub mod detect;
pub mod election;
pub mod facade;
pub mod logging;
pub mod notifier;
pub mod scheduler;
pub mod throttle;

#[cfg(test)]
mod testing;

pub use bridge::*;
pub use config::*;
pub use context::*;
pub use detect::*;
pub use election::*;
pub use facade::*;
pub use notifier::*;
pub use scheduler::*;
pub use throttle::*;
