//! Challenge-setter use case.
//!
//! Generates a batch of challenge items from the story so far. Items are
//! requested one at a time, each request listing the items generated before
//! it so the model does not repeat itself. Items that fail to parse or
//! validate are skipped.

use crate::generation::{GenerationRequest, GenerationService};
use crate::schemas;
use lexiquest_domain::{
    Actor, ChallengeItem, GeneratedChallenges, Model, PromptTemplate, SessionState,
    SubtaskHandler,
};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// History line when there is no story to draw words from.
pub const NO_NARRATIVE: &str = "Error: No narrative to base challenge on.";

/// Story turns included in the generation prompt.
const STORY_WINDOW: usize = 12;

/// Challenge-setter actor.
#[derive(Clone)]
pub struct SetChallengesUseCase {
    generation: GenerationService,
    model: Model,
}

impl SetChallengesUseCase {
    pub fn new(generation: GenerationService, model: Model) -> Self {
        Self { generation, model }
    }

    /// Generate up to `count` items of the handler's challenge kind.
    pub async fn generate(
        &self,
        state: &SessionState,
        handler: &dyn SubtaskHandler,
        count: usize,
        task: &str,
    ) -> GeneratedChallenges {
        if !state.narrative.has_story() {
            warn!("Challenge generation requested before any story");
            return GeneratedChallenges {
                items: Vec::new(),
                notice: NO_NARRATIVE.to_string(),
            };
        }

        let story = recent_story(state);
        let kind = handler.challenge_kind();
        let example = ChallengeItem::example(kind);
        let system = PromptTemplate::challenge_system(handler.description());
        let schema = schemas::challenge_record(&example.to_record());

        let mut previous: Vec<ChallengeItem> = state.challenge.challenge_history.clone();
        let mut seen: HashSet<String> = previous.iter().map(|i| i.label().to_lowercase()).collect();
        let mut items = Vec::new();

        for attempt in 1..=count {
            let mut prompt = PromptTemplate::challenge_request(&story, &example, &previous);
            if !task.trim().is_empty() {
                prompt.push_str(&format!("\nTask from the manager: {}\n", task));
            }
            let request = GenerationRequest::new(self.model.clone(), system.clone())
                .with_user(prompt)
                .with_schema(schema.clone());

            let record = match self.generation.complete_structured::<Value>(&request).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Challenge {}/{} generation failed: {}", attempt, count, e);
                    continue;
                }
            };

            let item = match ChallengeItem::from_record(&record) {
                Ok(item) if item.kind() == kind => item,
                Ok(item) => {
                    warn!("Challenge {}/{} has kind {}, expected {}", attempt, count, item.kind(), kind);
                    continue;
                }
                Err(e) => {
                    warn!("Challenge {}/{} rejected: {}", attempt, count, e);
                    continue;
                }
            };

            if !seen.insert(item.label().to_lowercase()) {
                debug!("Skipping duplicate challenge {}", item.label());
                continue;
            }

            debug!("Generated challenge {}", item.label());
            previous.push(item.clone());
            items.push(item);
        }

        info!("Generated {}/{} challenges", items.len(), count);

        let notice = if items.is_empty() {
            format!("{}: no challenges could be generated.", Actor::ChallengeSetter.display_name())
        } else {
            format!(
                "{}: generated {} challenge(s): {}",
                Actor::ChallengeSetter.display_name(),
                items.len(),
                items.iter().map(|i| i.label()).collect::<Vec<_>>().join(", ")
            )
        };

        GeneratedChallenges { items, notice }
    }
}

fn recent_story(state: &SessionState) -> String {
    let story = &state.narrative.story;
    let start = story.len().saturating_sub(STORY_WINDOW);
    story[start..]
        .iter()
        .map(|t| {
            let who = if t.is_human() { "Child" } else { "Narrator" };
            format!("{}: {}", who, t.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
