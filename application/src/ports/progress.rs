//! Progress notification port
//!
//! Defines the interface for reporting which actor is working during a turn.

use lexiquest_domain::Actor;

/// Callback for progress updates during a turn
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when an actor starts working
    fn on_actor_start(&self, actor: Actor, detail: &str);

    /// Called when an actor finishes
    fn on_actor_complete(&self, actor: Actor, success: bool);

    /// Called once the turn's output is ready
    fn on_turn_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_actor_start(&self, _actor: Actor, _detail: &str) {}
    fn on_actor_complete(&self, _actor: Actor, _success: bool) {}
}
