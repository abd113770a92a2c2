//! Calendar authority contract
//!
//! The authority is the ground truth for the current date, month lengths
//! and leap years. calbridge never computes any of those itself; it only
//! talks to the authority through this trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{
    AuthorityDate, AuthorityError, AuthorityEvent, CalendarNames, SubscriptionId, TimeUnit,
    Timestamp,
};

/// Pending host or authority mutation
pub type MutationFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AuthorityError>> + Send + 'a>>;

/// Callback invoked by the authority on every change notification
pub type AuthorityHandler = Arc<dyn Fn(AuthorityEvent) + Send + Sync>;

/// Typed handle to a detected authority
pub type AuthorityHandle = Arc<dyn Authority>;

pub trait Authority: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    fn current_date(&self) -> Result<AuthorityDate, AuthorityError>;

    fn to_structured(&self, ts: Timestamp) -> Result<AuthorityDate, AuthorityError>;

    fn to_timestamp(&self, date: &AuthorityDate) -> Result<Timestamp, AuthorityError>;

    /// Month and weekday names of the active calendar, if exposed
    fn calendar_names(&self) -> Option<CalendarNames> {
        None
    }

    /// Whether `advance_by` is implemented for `unit`
    fn supports_advance(&self, _unit: TimeUnit) -> bool {
        false
    }

    /// Move the current date by `amount` units
    fn advance_by(&self, unit: TimeUnit, _amount: i64) -> MutationFuture<'_> {
        Box::pin(async move { Err(AuthorityError::Unsupported(format!("advance-{unit}"))) })
    }

    fn subscribe(&self, event: AuthorityEvent, handler: AuthorityHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}
