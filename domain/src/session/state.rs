//! The shared session record.
//!
//! [`SessionState`] is namespaced by owner: the narrator's transcript and
//! challenge pointers live in [`NarrativeState`], generated items in
//! [`ChallengeState`] and scores in [`AssessmentState`]. The routing fields
//! (`last_agent`, `next_agent`, `manager_decision`) are written only by the
//! orchestrator, and actors never write the record directly; they return an
//! [`ActorOutcome`] that the orchestrator applies.

use super::entities::Turn;
use super::outcome::ActorOutcome;
use super::phase::SessionPhase;
use crate::agent::actor::Actor;
use crate::assessment::scoring::AssessmentState;
use crate::challenge::{ChallengeItem, ChallengeQueue};
use crate::core::error::DomainError;
use crate::orchestration::routing::RoutingDecision;
use crate::survey::SurveyProfile;
use serde::{Deserialize, Serialize};

/// A delivered challenge item together with the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub item: ChallengeItem,
    /// `None` when no human text was available to capture.
    pub response: Option<String>,
    #[serde(default)]
    pub assessed: bool,
}

impl UserResponse {
    pub fn new(item: ChallengeItem, response: Option<String>) -> Self {
        Self {
            item,
            response,
            assessed: false,
        }
    }
}

/// Narrator namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeState {
    /// Story transcript: human turns after the survey plus narration.
    pub story: Vec<Turn>,
    /// Survey transcript.
    pub survey: Vec<Turn>,
    #[serde(default)]
    pub survey_profile: SurveyProfile,
    pub finished_survey: bool,
    pub active_challenge: bool,
    /// The item currently out for an answer.
    pub next_triplet: Option<ChallengeItem>,
    /// Append-only log of dequeued items.
    pub used_triplets: Vec<ChallengeItem>,
    pub user_responses: Vec<UserResponse>,
}

impl NarrativeState {
    /// Whether the narrator has told any part of the story yet.
    pub fn has_story(&self) -> bool {
        self.story.iter().any(|t| t.actor == Actor::Narrator)
    }

    /// Captured responses that have not been assessed, oldest first.
    pub fn unassessed_responses(&self) -> impl Iterator<Item = &UserResponse> {
        self.user_responses.iter().filter(|r| !r.assessed)
    }

    pub fn has_unassessed_responses(&self) -> bool {
        self.unassessed_responses().next().is_some()
    }
}

/// Challenge-setter namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    /// Subtask key the challenges are generated for.
    pub challenge_type: String,
    /// Every item ever generated, in generation order.
    pub challenge_history: Vec<ChallengeItem>,
    /// Items awaiting delivery.
    pub queue: ChallengeQueue,
    /// Number of items handed to the narrator.
    pub delivered: u32,
    /// Number of generation rounds that produced at least one item.
    pub batches_generated: u32,
}

/// Result of the content check on the latest human turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStatus {
    #[default]
    Pending,
    ValidInput,
    InvalidInput,
}

/// Root aggregate of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub narrative: NarrativeState,
    pub challenge: ChallengeState,
    pub assessment: AssessmentState,
    /// Every turn from every actor, in order.
    pub full_history: Vec<Turn>,
    pub last_agent: Option<Actor>,
    pub next_agent: Option<Actor>,
    pub manager_decision: Option<RoutingDecision>,
    pub input_status: InputStatus,
    /// The most recently captured challenge answer.
    pub student_response: Option<String>,
    /// Feedback from the assessor, consumed once by the orchestrator.
    pub assessment_feedback: Option<String>,
    pub phase: SessionPhase,
    /// Phase to return to after an exchange ended by a refusal.
    #[serde(default)]
    pub resume_phase: Option<SessionPhase>,
    /// Set once the story has been closed; no actor runs after this.
    #[serde(default)]
    pub ended: bool,
    /// Accepted human text of the current exchange, not yet captured.
    #[serde(default)]
    pub pending_input: Option<String>,
    #[serde(default)]
    pub exchanges: u64,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>, subtask_key: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            narrative: NarrativeState::default(),
            challenge: ChallengeState {
                challenge_type: subtask_key.into(),
                ..ChallengeState::default()
            },
            assessment: AssessmentState::default(),
            full_history: Vec::new(),
            last_agent: None,
            next_agent: None,
            manager_decision: None,
            input_status: InputStatus::Pending,
            student_response: None,
            assessment_feedback: None,
            phase: SessionPhase::AwaitingSurvey,
            resume_phase: None,
            ended: false,
            pending_input: None,
            exchanges: 0,
        }
    }

    /// Start with a known profile and skip the survey dialogue.
    pub fn with_survey_profile(mut self, profile: SurveyProfile) -> Self {
        self.narrative.survey_profile = profile;
        self.narrative.finished_survey = true;
        self.phase = SessionPhase::Narrating;
        self
    }

    // ==================== Exchange lifecycle ====================

    /// Leave a refusal-terminated exchange. Returns `false` when the
    /// session itself has ended.
    pub fn resume(&mut self) -> bool {
        if self.ended {
            return false;
        }
        if self.phase.is_terminal() {
            self.phase = self.resume_phase.take().unwrap_or(if self.narrative.finished_survey {
                SessionPhase::Narrating
            } else {
                SessionPhase::AwaitingSurvey
            });
        }
        true
    }

    /// Record inbound human text before the content check.
    pub fn record_human(&mut self, text: &str) {
        self.exchanges += 1;
        self.input_status = InputStatus::Pending;
        self.full_history.push(Turn::human(text));
    }

    /// The content check passed: the text joins the transcript and becomes
    /// the pending input of this exchange.
    pub fn accept_input(&mut self, text: &str) {
        self.input_status = InputStatus::ValidInput;
        let turn = Turn::human(text);
        if self.narrative.finished_survey {
            self.narrative.story.push(turn);
        } else {
            self.narrative.survey.push(turn);
        }
        self.pending_input = Some(text.to_string());
    }

    /// The content check failed: append the refusal and terminate the
    /// exchange.
    pub fn refuse_input(&mut self, refusal: &str) {
        self.input_status = InputStatus::InvalidInput;
        self.full_history.push(Turn::new(Actor::Alignment, refusal));
        self.last_agent = Some(Actor::Alignment);
        if !self.phase.is_terminal() {
            self.resume_phase = Some(self.phase);
            self.phase = SessionPhase::Terminated;
        }
    }

    /// Close the session for good.
    pub fn end(&mut self) {
        self.ended = true;
        self.resume_phase = None;
        self.phase = SessionPhase::Terminated;
    }

    pub fn enter(&mut self, phase: SessionPhase) -> Result<(), DomainError> {
        self.phase.transition(phase)
    }

    // ==================== Routing (orchestrator only) ====================

    pub fn route_to(&mut self, actor: Actor, decision: Option<RoutingDecision>) {
        self.next_agent = Some(actor);
        if decision.is_some() {
            self.manager_decision = decision;
        }
    }

    /// Record the manager's decision in the shared history.
    pub fn record_decision(&mut self, decision: &RoutingDecision) {
        self.full_history.push(Turn::new(
            Actor::Manager,
            format!("Manager decision: {}", decision),
        ));
        self.last_agent = Some(Actor::Manager);
        self.manager_decision = Some(decision.clone());
    }

    /// Consume pending assessment feedback. Returns it at most once.
    pub fn take_feedback(&mut self) -> Option<String> {
        self.assessment_feedback.take()
    }

    // ==================== Actor outcomes ====================

    /// Apply an actor's outcome to the owning namespace and the shared
    /// history.
    pub fn apply(&mut self, outcome: ActorOutcome) {
        match outcome {
            ActorOutcome::Narration(narration) => {
                let turn = Turn::new(Actor::Narrator, &narration.text);
                if narration.survey {
                    self.narrative.survey.push(turn.clone());
                } else {
                    self.narrative.story.push(turn.clone());
                }
                self.full_history.push(turn);
                if narration.survey_finished {
                    self.narrative.finished_survey = true;
                }
                if let Some(profile) = narration.profile {
                    self.narrative.survey_profile = profile;
                }
                self.last_agent = Some(Actor::Narrator);
            }
            ActorOutcome::ChallengesGenerated(generated) => {
                if !generated.items.is_empty() {
                    self.challenge.batches_generated += 1;
                    self.challenge
                        .challenge_history
                        .extend(generated.items.iter().cloned());
                    self.challenge.queue.extend(generated.items);
                }
                self.full_history
                    .push(Turn::new(Actor::ChallengeSetter, generated.notice));
                self.last_agent = Some(Actor::ChallengeSetter);
            }
            ActorOutcome::Assessed(assessed) => {
                let mut remaining = assessed.responses_assessed;
                for response in self.narrative.user_responses.iter_mut() {
                    if remaining == 0 {
                        break;
                    }
                    if !response.assessed {
                        response.assessed = true;
                        remaining -= 1;
                    }
                }
                self.assessment = assessed.assessment;
                self.full_history
                    .push(Turn::new(Actor::Assessor, &assessed.feedback));
                self.assessment_feedback = Some(assessed.feedback);
                self.last_agent = Some(Actor::Assessor);
            }
        }
    }

    /// Latest narrator message, if any.
    pub fn last_narration(&self) -> Option<&str> {
        self.full_history
            .iter()
            .rev()
            .find(|t| t.actor == Actor::Narrator)
            .map(|t| t.content.as_str())
    }
}
