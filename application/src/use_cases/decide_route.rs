//! Manager use case: decide which actor runs next.

use crate::generation::{GenerationRequest, GenerationService};
use crate::schemas;
use lexiquest_domain::session::entities::to_messages;
use lexiquest_domain::{Model, PromptTemplate, RoutingDecision, SessionState};
use tracing::{debug, warn};

/// Recent history turns shown to the manager.
const HISTORY_WINDOW: usize = 20;

/// The manager's verdict and whether it had to be defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub decision: RoutingDecision,
    pub fallback: bool,
}

/// Manager actor.
#[derive(Clone)]
pub struct DecideRouteUseCase {
    generation: GenerationService,
    model: Model,
}

impl DecideRouteUseCase {
    pub fn new(generation: GenerationService, model: Model) -> Self {
        Self { generation, model }
    }

    /// Ask the manager for the next actor. Any failure falls back to the
    /// narrator continuing the story.
    pub async fn decide(&self, state: &SessionState) -> Route {
        let history = &state.full_history;
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let request = GenerationRequest::new(self.model.clone(), PromptTemplate::manager_system())
            .with_messages(to_messages(&history[start..]))
            .with_schema(schemas::routing_decision());

        match self
            .generation
            .complete_structured::<RoutingDecision>(&request)
            .await
        {
            Ok(decision) => {
                let decision = decision.normalized();
                debug!("Manager decided: {}", decision);
                Route {
                    decision,
                    fallback: false,
                }
            }
            Err(e) => {
                warn!("Routing decision unavailable, continuing the story: {}", e);
                Route {
                    decision: RoutingDecision::fallback(),
                    fallback: true,
                }
            }
        }
    }
}
