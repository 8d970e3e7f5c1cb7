//! Application layer for lexiquest
//!
//! This crate contains the orchestrator, the actor use cases, port
//! definitions and session configuration. It depends only on the domain
//! layer.

pub mod config;
pub mod generation;
pub mod ports;
pub mod schemas;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::SessionConfig;
pub use generation::{GenerationRequest, GenerationService, StructuredOutputError};
pub use ports::{
    content_guard::{AllowAll, ContentGuard, GuardVerdict},
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, LlmSession, ResponseFormat},
    progress::{NoProgress, ProgressNotifier},
    session_store::{SessionStore, SessionStoreError},
};
pub use use_cases::run_turn::{RunTurnError, RunTurnInput, RunTurnUseCase, TurnOutput};
