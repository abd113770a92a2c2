//! Session participants

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// A participant of the shared host session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Currently connected
    pub active: bool,
    /// Holds elevated rights (may mutate world time)
    pub privileged: bool,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, active: bool, privileged: bool) -> Self {
        Participant {
            id: id.into(),
            active,
            privileged,
        }
    }

    /// Eligible for primary election
    #[inline]
    pub fn is_candidate(&self) -> bool {
        self.active && self.privileged
    }
}

/// Host view of the session membership
pub trait ParticipantRoster: Send + Sync {
    fn local_id(&self) -> ParticipantId;

    fn participants(&self) -> Vec<Participant>;

    /// Whether the local participant holds elevated rights
    fn is_local_privileged(&self) -> bool {
        let local = self.local_id();
        self.participants()
            .iter()
            .any(|p| p.id == local && p.privileged)
    }
}
