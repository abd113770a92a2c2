//! Primary election
//!
//! Among the active privileged participants, the one with the smallest
//! identifier is primary. The election is a pure query over the current
//! roster and is recomputed on every call.

use std::sync::Arc;

use calbridge_core::{Participant, ParticipantId, ParticipantRoster};

/// Ordered candidate identifiers (the election state)
pub fn candidates(participants: &[Participant]) -> Vec<ParticipantId> {
    let mut ids: Vec<ParticipantId> = participants
        .iter()
        .filter(|p| p.is_candidate())
        .map(|p| p.id.clone())
        .collect();
    ids.sort();
    ids
}

/// The elected participant, if any candidate exists
pub fn elect(participants: &[Participant]) -> Option<ParticipantId> {
    participants
        .iter()
        .filter(|p| p.is_candidate())
        .map(|p| &p.id)
        .min()
        .cloned()
}

/// Primary Elector
#[derive(Clone)]
pub struct PrimaryElector {
    roster: Arc<dyn ParticipantRoster>,
}

impl PrimaryElector {
    pub fn new(roster: Arc<dyn ParticipantRoster>) -> Self {
        PrimaryElector { roster }
    }

    /// Current primary
    pub fn primary(&self) -> Option<ParticipantId> {
        elect(&self.roster.participants())
    }

    /// Whether `id` is the current primary
    pub fn is_primary(&self, id: &ParticipantId) -> bool {
        self.primary().as_ref() == Some(id)
    }

    /// Whether the local participant is the current primary
    pub fn is_local_primary(&self) -> bool {
        self.is_primary(&self.roster.local_id())
    }

    pub fn local_id(&self) -> ParticipantId {
        self.roster.local_id()
    }

    /// Whether the local participant holds elevated rights
    pub fn is_local_privileged(&self) -> bool {
        self.roster.is_local_privileged()
    }
}
