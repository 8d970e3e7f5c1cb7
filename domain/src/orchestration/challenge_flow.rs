//! Challenge-flow override.
//!
//! Checked by the orchestrator before it asks the manager anything. While a
//! challenge is out, the human's next turn is its answer; while items are
//! queued, they are delivered one at a time.

use crate::challenge::ChallengeItem;
use crate::session::state::{SessionState, UserResponse};

/// What the override decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeFlow {
    /// The last queued item was answered: assess the captured responses.
    Assess,
    /// Hand this item to the narrator to weave into the story.
    Deliver(ChallengeItem),
}

/// Apply the challenge-flow override to the session.
///
/// 1. If a challenge is active, the pending human input becomes
///    `student_response` and is stored with the item it answers. If the
///    queue is now empty the challenge is closed and assessment follows.
/// 2. Otherwise, if the queue is non-empty, the next item is dequeued,
///    recorded in `used_triplets` and made the active challenge.
///
/// Returns `None` when there is no active challenge and nothing queued;
/// the caller then falls back to a generation-based decision.
pub fn handle_challenge_flow(state: &mut SessionState) -> Option<ChallengeFlow> {
    if state.narrative.active_challenge {
        let response = state.pending_input.take();
        state.student_response = response.clone();
        if let Some(item) = state.narrative.next_triplet.clone() {
            state
                .narrative
                .user_responses
                .push(UserResponse::new(item, response));
        }

        if state.challenge.queue.is_empty() {
            state.narrative.active_challenge = false;
            return Some(ChallengeFlow::Assess);
        }
    }

    let item = state.challenge.queue.dequeue()?;
    state.narrative.used_triplets.push(item.clone());
    state.narrative.next_triplet = Some(item.clone());
    state.narrative.active_challenge = true;
    state.challenge.delivered += 1;
    Some(ChallengeFlow::Deliver(item))
}
