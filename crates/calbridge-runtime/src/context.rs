//! Host collaborators handed to the bridge at bootstrap

use std::sync::Arc;

use calbridge_core::{
    AuthorityHandle, CapabilityRegistry, CelestialSource, HostClock, NoCelestial,
    ParticipantRoster, Scheduler,
};

/// Explicit references to every host collaborator the bridge consumes
#[derive(Clone)]
pub struct HostContext {
    pub authority: Option<AuthorityHandle>,
    pub clock: Option<Arc<dyn HostClock>>,
    pub roster: Arc<dyn ParticipantRoster>,
    pub scheduler: Arc<dyn Scheduler>,
    pub celestial: Arc<dyn CelestialSource>,
    pub registry: Option<Arc<dyn CapabilityRegistry>>,
}

impl HostContext {
    /// Minimal context: no authority, no clock, no celestial data
    pub fn new(roster: Arc<dyn ParticipantRoster>, scheduler: Arc<dyn Scheduler>) -> Self {
        HostContext {
            authority: None,
            clock: None,
            roster,
            scheduler,
            celestial: Arc::new(NoCelestial),
            registry: None,
        }
    }

    pub fn with_authority(mut self, authority: Option<AuthorityHandle>) -> Self {
        self.authority = authority;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn HostClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_celestial(mut self, celestial: Arc<dyn CelestialSource>) -> Self {
        self.celestial = celestial;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}
