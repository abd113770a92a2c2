//! Host process collaborators
//!
//! Everything the bridge needs from its host besides the authority: the
//! world clock, deferred execution, celestial data for notifications and
//! capability registration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AuthorityDate, BridgeResult, Moon, MutationFuture, Season, TimerId, Timestamp};

/// Host world clock
pub trait HostClock: Send + Sync {
    /// Current world time, `None` while the host has not started its clock
    fn world_time(&self) -> Option<Timestamp>;

    /// Move world time by `delta` seconds
    fn advance(&self, delta: i64) -> MutationFuture<'_>;
}

/// Task queued for deferred execution
pub type DeferredTask = Box<dyn FnOnce() + Send>;

/// One-shot deferred execution on the host event loop
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> TimerId;

    /// Cancel a pending task; returns false if it already ran or is unknown
    fn cancel(&self, id: TimerId) -> bool;
}

/// Moons and seasons attached to `date-time-changed`
pub trait CelestialSource: Send + Sync {
    fn moons(&self, date: &AuthorityDate) -> Vec<Moon>;

    fn seasons(&self, date: &AuthorityDate) -> Vec<Season>;
}

/// Celestial source for hosts without moon or season data
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCelestial;

impl CelestialSource for NoCelestial {
    fn moons(&self, _date: &AuthorityDate) -> Vec<Moon> {
        Vec::new()
    }

    fn seasons(&self, _date: &AuthorityDate) -> Vec<Season> {
        Vec::new()
    }
}

/// Descriptor announcing the legacy API to the host's dependency checks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub id: String,
    pub title: String,
    pub version: String,
    pub api_version: String,
}

/// Registration collaborator for capability descriptors
pub trait CapabilityRegistry: Send + Sync {
    fn register(&self, descriptor: CapabilityDescriptor) -> BridgeResult<()>;
}
