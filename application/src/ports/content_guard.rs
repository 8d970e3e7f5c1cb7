//! Content guard port
//!
//! The alignment check run on every inbound human turn before any actor.

/// Outcome of a content check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Allowed,
    Blocked { reason: String },
}

impl GuardVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardVerdict::Allowed)
    }
}

/// Checks human input before it reaches the session.
pub trait ContentGuard: Send + Sync {
    fn check(&self, text: &str) -> GuardVerdict;
}

/// Guard that accepts everything.
pub struct AllowAll;

impl ContentGuard for AllowAll {
    fn check(&self, _text: &str) -> GuardVerdict {
        GuardVerdict::Allowed
    }
}
