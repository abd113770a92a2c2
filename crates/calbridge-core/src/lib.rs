//! calbridge Core - Fundamental types and collaborator contracts
//!
//! This crate defines the vocabulary shared by every calbridge crate:
//! - Identifiers (ParticipantId, SubscriptionId, ListenerId, TimerId)
//! - Time primitives (Timestamp, Interval, TimeUnit)
//! - The two date shapes (LegacyDate, AuthorityDate)
//! - The legacy notification vocabulary and bridge lifecycle
//! - Contracts for the external collaborators (authority, host, session)

pub mod id;
pub mod time;
pub mod date;
pub mod event;
pub mod state;
pub mod authority;
pub mod host;
pub mod session;
pub mod error;

pub use id::*;
pub use time::*;
pub use date::*;
pub use event::*;
pub use state::*;
pub use authority::*;
pub use host::*;
pub use session::*;
pub use error::*;
