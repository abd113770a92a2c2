//! Authority detection
//!
//! The host may expose the authority in several places depending on its
//! version. Each place is probed by one pure strategy; strategies are tried
//! in priority order and the first hit wins. Everything downstream works
//! with the resulting `AuthorityHandle` and never looks at the host again.

use std::collections::{HashMap, HashSet};

use calbridge_core::AuthorityHandle;
use tracing::{debug, info};

/// Module id under which the authority registers its API
pub const AUTHORITY_MODULE_ID: &str = "calendar-authority";
/// Global namespace entry used by older authority releases
pub const AUTHORITY_GLOBAL: &str = "CalendarAuthority";
/// Property on the host's game object used by the oldest releases
pub const AUTHORITY_GAME_PROPERTY: &str = "calendarAuthority";

/// Snapshot of the places an authority can be published in
#[derive(Clone, Default)]
pub struct HostEnvironment {
    active_modules: HashSet<String>,
    module_apis: HashMap<String, AuthorityHandle>,
    globals: HashMap<String, AuthorityHandle>,
    game_properties: HashMap<String, AuthorityHandle>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a module active, optionally with a published API
    pub fn with_module(mut self, id: &str, api: Option<AuthorityHandle>) -> Self {
        self.active_modules.insert(id.to_string());
        if let Some(api) = api {
            self.module_apis.insert(id.to_string(), api);
        }
        self
    }

    pub fn with_global(mut self, name: &str, handle: AuthorityHandle) -> Self {
        self.globals.insert(name.to_string(), handle);
        self
    }

    pub fn with_game_property(mut self, name: &str, handle: AuthorityHandle) -> Self {
        self.game_properties.insert(name.to_string(), handle);
        self
    }

    pub fn is_module_active(&self, id: &str) -> bool {
        self.active_modules.contains(id)
    }

    pub fn module_api(&self, id: &str) -> Option<AuthorityHandle> {
        self.module_apis.get(id).cloned()
    }

    pub fn global(&self, name: &str) -> Option<AuthorityHandle> {
        self.globals.get(name).cloned()
    }

    pub fn game_property(&self, name: &str) -> Option<AuthorityHandle> {
        self.game_properties.get(name).cloned()
    }
}

/// One way of finding the authority
#[derive(Clone, Copy)]
pub struct DetectionStrategy {
    pub name: &'static str,
    pub detect: fn(&HostEnvironment) -> Option<AuthorityHandle>,
}

fn from_module_api(env: &HostEnvironment) -> Option<AuthorityHandle> {
    if !env.is_module_active(AUTHORITY_MODULE_ID) {
        return None;
    }
    env.module_api(AUTHORITY_MODULE_ID)
}

fn from_global_namespace(env: &HostEnvironment) -> Option<AuthorityHandle> {
    env.global(AUTHORITY_GLOBAL)
}

fn from_game_property(env: &HostEnvironment) -> Option<AuthorityHandle> {
    env.game_property(AUTHORITY_GAME_PROPERTY)
}

/// Strategies in priority order
pub const DEFAULT_STRATEGIES: [DetectionStrategy; 3] = [
    DetectionStrategy {
        name: "module-api",
        detect: from_module_api,
    },
    DetectionStrategy {
        name: "global-namespace",
        detect: from_global_namespace,
    },
    DetectionStrategy {
        name: "game-property",
        detect: from_game_property,
    },
];

/// First authority found by `strategies`
pub fn detect_authority(
    env: &HostEnvironment,
    strategies: &[DetectionStrategy],
) -> Option<AuthorityHandle> {
    for strategy in strategies {
        if let Some(handle) = (strategy.detect)(env) {
            info!(
                strategy = strategy.name,
                authority = handle.name(),
                "calendar authority detected"
            );
            return Some(handle);
        }
        debug!(strategy = strategy.name, "no authority");
    }
    info!("no calendar authority, running in degraded mode");
    None
}
