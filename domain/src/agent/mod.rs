//! Session actors and the models that back them.
//!
//! - [`actor::Actor`]: who produced a turn
//! - [`model_config::ModelConfig`]: per-role model selection

pub mod actor;
pub mod model_config;
