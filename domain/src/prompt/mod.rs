//! Prompt domain
//!
//! Templates for the manager, narrator, challenge-setter and assessor.
//! Subtask-specific instructions live with their handler.

mod template;

pub use template::PromptTemplate;
