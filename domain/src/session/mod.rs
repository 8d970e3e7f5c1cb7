//! Session domain.
//!
//! - [`state::SessionState`]: the namespaced record every actor reads
//! - [`phase::SessionPhase`]: the orchestrator's phase machine
//! - [`outcome::ActorOutcome`]: what an actor hands back for the orchestrator to apply
//! - [`entities::Turn`]: a transcript entry; [`entities::Message`]: a model message

pub mod entities;
pub mod outcome;
pub mod phase;
pub mod state;
