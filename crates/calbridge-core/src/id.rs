//! Identity types for calbridge
//!
//! Participant identifiers come from the host session and are opaque
//! strings. Handles for subscriptions, listeners and timers are 64-bit
//! counters local to the collaborator that issued them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Participant identity - the host session's user identifier
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        ParticipantId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId(s.to_string())
    }
}

/// Authority subscription handle
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubscriptionId(pub u64);

impl SubscriptionId {
    #[inline]
    pub fn new(id: u64) -> Self {
        SubscriptionId(id)
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Legacy listener handle
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListenerId(pub u64);

impl ListenerId {
    #[inline]
    pub fn new(id: u64) -> Self {
        ListenerId(id)
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Deferred task handle issued by a scheduler
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimerId(pub u64);

impl TimerId {
    #[inline]
    pub fn new(id: u64) -> Self {
        TimerId(id)
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}
