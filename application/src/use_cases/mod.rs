//! Use cases
//!
//! One use case per actor plus the orchestrator that sequences them.

pub mod assess_response;
pub mod decide_route;
pub mod narrate;
pub mod run_turn;
pub mod set_challenges;
