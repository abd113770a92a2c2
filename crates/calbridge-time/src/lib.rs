//! calbridge Time - Date conversion and interval arithmetic
//!
//! This crate implements the stateless half of the bridge:
//! - FormatConverter: legacy ⇄ authority date shapes, degraded fallback dates
//! - IntervalEngine: sparse symbolic deltas applied to timestamps, with
//!   year/month math delegated to the authority
//! - ApproximationConfig: constants for operation without an authority

pub mod config;
pub mod convert;
pub mod interval;

pub use config::*;
pub use convert::*;
pub use interval::*;
