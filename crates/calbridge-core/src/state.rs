//! Bridge lifecycle
//!
//! Uninitialized → Initializing → Ready, with Destroyed reachable from
//! every non-terminal state. No cycles; Destroyed is absorbing.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Destroyed,
}

impl LifecycleState {
    /// Position in the linear order, used to reject backward moves
    fn rank(self) -> u8 {
        match self {
            LifecycleState::Uninitialized => 0,
            LifecycleState::Initializing => 1,
            LifecycleState::Ready => 2,
            LifecycleState::Destroyed => 3,
        }
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        match (self, next) {
            (LifecycleState::Destroyed, _) => false,
            (_, LifecycleState::Destroyed) => true,
            (from, to) => to.rank() == from.rank() + 1,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Destroyed
    }

    /// Whether the bridge may still emit legacy notifications
    #[inline]
    pub fn can_emit(self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
