//! Orchestration rules that do not need the generation service.
//!
//! - [`routing`]: manager decisions and their fallback
//! - [`challenge_flow`]: the challenge-delivery override

pub mod challenge_flow;
pub mod routing;

pub use challenge_flow::{ChallengeFlow, handle_challenge_flow};
pub use routing::{FALLBACK_TASK, NextAgent, RoutingDecision};
