//! Bridge configuration

use std::time::Duration;

use calbridge_core::CapabilityDescriptor;
use calbridge_time::ApproximationConfig;

/// Legacy API revision announced to the host
pub const LEGACY_API_VERSION: &str = "2.4.0";

/// Bridge configuration
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Delay between `init` and `ready`
    pub ready_delay: Duration,
    /// Degraded-mode constants
    pub approximation: ApproximationConfig,
    /// Descriptor registered with the host at bootstrap
    pub capability: CapabilityDescriptor,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            ready_delay: Duration::from_secs(5),
            approximation: ApproximationConfig::default(),
            capability: CapabilityDescriptor {
                id: "legacy-calendar".to_string(),
                title: "Legacy Calendar API".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                api_version: LEGACY_API_VERSION.to_string(),
            },
        }
    }
}

impl BridgeConfig {
    /// Configuration for test hosts: ready fires on the next scheduler turn
    pub fn immediate() -> Self {
        BridgeConfig {
            ready_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    pub fn with_approximation(mut self, approximation: ApproximationConfig) -> Self {
        self.approximation = approximation;
        self
    }

    pub fn with_capability(mut self, capability: CapabilityDescriptor) -> Self {
        self.capability = capability;
        self
    }
}
