//! Narrator use case.
//!
//! Runs the interest survey until the narrator signals its end, then tells
//! the story. The narrator is the only actor whose output the respondent
//! sees, so every failure degrades to a fixed line instead of an error.

use crate::generation::{GenerationRequest, GenerationService};
use crate::schemas;
use lexiquest_domain::session::entities::to_messages;
use lexiquest_domain::{
    Message, Model, Narration, PromptTemplate, SessionState, SurveyProfile, strip_end_marker,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Spoken when story generation fails.
pub const STORY_FALLBACK: &str = "Hmm, let me think about that... What do you think should happen next?";

/// Spoken when survey generation fails.
pub const SURVEY_FALLBACK: &str = "Oops, I didn't catch that. Can you tell me again?";

/// Narrator actor.
#[derive(Clone)]
pub struct NarrateUseCase {
    generation: GenerationService,
    model: Model,
}

impl NarrateUseCase {
    pub fn new(generation: GenerationService, model: Model) -> Self {
        Self { generation, model }
    }

    /// Produce the next survey message.
    ///
    /// When the reply carries the end marker, the marker is stripped and a
    /// second call extracts the survey profile from the transcript.
    pub async fn run_survey(&self, state: &SessionState) -> Narration {
        let request = GenerationRequest::new(self.model.clone(), PromptTemplate::survey_system())
            .with_messages(to_messages(&state.narrative.survey));

        let reply = match self.generation.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Survey reply was empty, using fallback");
                SURVEY_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Survey generation failed, using fallback: {}", e);
                SURVEY_FALLBACK.to_string()
            }
        };

        let (text, finished) = strip_end_marker(&reply);
        let profile = if finished {
            info!("Survey finished");
            Some(self.extract_profile(state, &text).await)
        } else {
            None
        };

        Narration {
            text,
            survey: true,
            survey_finished: finished,
            profile,
        }
    }

    async fn extract_profile(&self, state: &SessionState, closing: &str) -> SurveyProfile {
        let mut transcript: Vec<String> = state
            .narrative
            .survey
            .iter()
            .map(|t| format!("{}: {}", speaker(t.is_human()), t.content))
            .collect();
        transcript.push(format!("{}: {}", speaker(false), closing));

        let request = GenerationRequest::new(
            self.model.clone(),
            PromptTemplate::survey_extraction_system(),
        )
        .with_user(PromptTemplate::survey_extraction_input(&transcript.join("\n")))
        .with_schema(schemas::survey_profile());

        match self.generation.complete_structured::<Value>(&request).await {
            Ok(value) => {
                let profile = SurveyProfile::from_json(&value);
                debug!("Survey profile: {:?}", profile);
                profile
            }
            Err(e) => {
                warn!("Survey profile extraction failed, continuing without it: {}", e);
                SurveyProfile::new()
            }
        }
    }

    /// Produce the next story segment, optionally steered by an instruction.
    pub async fn tell(&self, state: &SessionState, instruction: Option<&str>) -> Narration {
        let mut messages = to_messages(&state.narrative.story);
        if let Some(instruction) = instruction {
            messages.push(Message::system(instruction));
        }
        let request = GenerationRequest::new(
            self.model.clone(),
            PromptTemplate::narrator_system(&state.narrative.survey_profile),
        )
        .with_messages(messages);

        let text = match self.generation.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Story reply was empty, using fallback");
                STORY_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Story generation failed, using fallback: {}", e);
                STORY_FALLBACK.to_string()
            }
        };

        Narration::story(text)
    }
}

fn speaker(human: bool) -> &'static str {
    if human { "Child" } else { "Narrator" }
}
