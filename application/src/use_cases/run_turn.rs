//! Run Turn use case
//!
//! Orchestrates one human exchange: the content check, then a bounded loop
//! of orchestration steps until the narrator has spoken. Each step runs one
//! actor, chosen in this order:
//!
//! 1. the survey, until it has finished;
//! 2. pending assessment feedback (or story closure once the ceiling fired);
//! 3. the challenge-flow override (capture, deliver, or assess);
//! 4. the manager's routing decision.
//!
//! The session is loaded before the exchange and checkpointed after it.

use crate::config::SessionConfig;
use crate::generation::GenerationService;
use crate::ports::content_guard::{AllowAll, ContentGuard, GuardVerdict};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::session_store::{SessionStore, SessionStoreError};
use crate::use_cases::assess_response::AssessResponseUseCase;
use crate::use_cases::decide_route::DecideRouteUseCase;
use crate::use_cases::narrate::NarrateUseCase;
use crate::use_cases::set_challenges::SetChallengesUseCase;
use lexiquest_domain::{
    Actor, ActorOutcome, ChallengeFlow, DomainError, ModelConfig, NextAgent, PromptTemplate,
    SessionPhase, SessionState, SubtaskHandler, SubtaskRegistry, Turn, handle_challenge_flow,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort an exchange
///
/// Model failures never show up here; every actor has its own fallback.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    #[error("Session error: {0}")]
    Domain(#[from] DomainError),
}

/// Input for the RunTurn use case
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    pub session_id: String,
    pub text: String,
}

impl RunTurnInput {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
        }
    }
}

/// What one exchange produced
#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub session_id: String,
    /// User-facing turns added during the exchange, in order.
    pub replies: Vec<Turn>,
    /// Actors that ran, in order.
    pub actors: Vec<Actor>,
    pub phase: SessionPhase,
    pub refused: bool,
    pub ended: bool,
}

impl TurnOutput {
    /// All replies joined for display.
    pub fn reply_text(&self) -> String {
        self.replies
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Another step may follow.
    Continue,
    /// The narrator spoke; the exchange is complete.
    Spoke,
}

#[derive(Default)]
struct Exchange {
    actors: Vec<Actor>,
    setter_ran: bool,
}

/// Use case for running one exchange of a story session
pub struct RunTurnUseCase {
    narrate: NarrateUseCase,
    set_challenges: SetChallengesUseCase,
    assess: AssessResponseUseCase,
    decide_route: DecideRouteUseCase,
    registry: SubtaskRegistry,
    store: Arc<dyn SessionStore>,
    guard: Arc<dyn ContentGuard>,
    conversation_logger: Arc<dyn ConversationLogger>,
    config: SessionConfig,
}

impl RunTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        models: ModelConfig,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> Self {
        let generation = GenerationService::new(gateway).with_timeout(config.generation_timeout);
        Self {
            narrate: NarrateUseCase::new(generation.clone(), models.narrator),
            set_challenges: SetChallengesUseCase::new(generation.clone(), models.challenge),
            assess: AssessResponseUseCase::new(generation.clone(), models.assessor),
            decide_route: DecideRouteUseCase::new(generation, models.manager),
            registry: SubtaskRegistry::builtin(),
            store,
            guard: Arc::new(AllowAll),
            conversation_logger: Arc::new(NoConversationLogger),
            config,
        }
    }

    pub fn with_guard(mut self, guard: Arc<dyn ContentGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_registry(mut self, registry: SubtaskRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fail early when the configured subtask has no handler.
    pub fn validate(&self) -> Result<(), RunTurnError> {
        self.registry.create(&self.config.subtask)?;
        Ok(())
    }

    /// Fresh session for `session_id` using the configured subtask.
    pub fn new_session(&self, session_id: &str) -> SessionState {
        let state = SessionState::new(session_id, self.config.subtask.clone());
        match &self.config.survey_profile {
            Some(profile) => state.with_survey_profile(profile.clone()),
            None => state,
        }
    }

    /// Latest checkpoint of a session, if one exists.
    pub async fn load(&self, session_id: &str) -> Result<Option<SessionState>, RunTurnError> {
        Ok(self.store.load(session_id).await?)
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunTurnInput) -> Result<TurnOutput, RunTurnError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Load the session, run one exchange and checkpoint the result
    pub async fn execute_with_progress(
        &self,
        input: RunTurnInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<TurnOutput, RunTurnError> {
        let mut state = match self.store.load(&input.session_id).await? {
            Some(state) => state,
            None => {
                info!("Starting session {}", input.session_id);
                self.new_session(&input.session_id)
            }
        };

        let output = self.run_exchange(&mut state, &input.text, progress).await?;

        self.store.save(&state).await?;
        self.log(
            EventKind::Checkpoint,
            json!({
                "session_id": state.session_id,
                "exchange": state.exchanges,
                "phase": state.phase.as_str(),
            }),
        );
        Ok(output)
    }

    /// Run one exchange against an in-memory session
    pub async fn run_exchange(
        &self,
        state: &mut SessionState,
        text: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<TurnOutput, RunTurnError> {
        if !state.resume() {
            debug!("Session {} has ended", state.session_id);
            progress.on_turn_complete();
            return Ok(TurnOutput {
                session_id: state.session_id.clone(),
                replies: vec![Turn::new(Actor::System, &self.config.ended_message)],
                actors: Vec::new(),
                phase: state.phase,
                refused: false,
                ended: true,
            });
        }

        let start = state.full_history.len();
        state.record_human(text);
        self.log(
            EventKind::HumanTurn,
            json!({
                "session_id": state.session_id,
                "exchange": state.exchanges,
                "text": text,
            }),
        );

        if let GuardVerdict::Blocked { reason } = self.guard.check(text) {
            warn!("Input refused: {}", reason);
            state.refuse_input(&self.config.refusal_message);
            self.log(
                EventKind::Refusal,
                json!({
                    "session_id": state.session_id,
                    "exchange": state.exchanges,
                    "reason": reason,
                }),
            );
            progress.on_turn_complete();
            return Ok(self.output(state, start, vec![Actor::Alignment], true));
        }
        state.accept_input(text);

        let handler = self.registry.create(&state.challenge.challenge_type)?;
        let mut exchange = Exchange::default();
        let mut spoke = false;

        for step in 1..=self.config.max_steps_per_turn {
            debug!("Exchange {} step {}", state.exchanges, step);
            if self.step(state, handler.as_ref(), &mut exchange, progress).await? == Step::Spoke {
                spoke = true;
                break;
            }
        }

        if !spoke {
            warn!(
                "Step limit of {} reached, handing the exchange to the narrator",
                self.config.max_steps_per_turn
            );
            match state.take_feedback() {
                Some(feedback) => self.review_feedback(state, &feedback, &mut exchange, progress).await,
                None => {
                    state.route_to(Actor::Narrator, None);
                    self.narrate(state, None, &mut exchange, progress).await;
                    settle(state, SessionPhase::Narrating);
                }
            }
        }

        // Input that no step captured is not an answer to a later challenge.
        state.pending_input = None;
        progress.on_turn_complete();
        Ok(self.output(state, start, exchange.actors, false))
    }

    async fn step(
        &self,
        state: &mut SessionState,
        handler: &dyn SubtaskHandler,
        exchange: &mut Exchange,
        progress: &dyn ProgressNotifier,
    ) -> Result<Step, RunTurnError> {
        // 1. Survey
        if !state.narrative.finished_survey {
            state.route_to(Actor::Narrator, None);
            progress.on_actor_start(Actor::Narrator, "Getting to know you");
            let narration = self.narrate.run_survey(state).await;
            progress.on_actor_complete(Actor::Narrator, true);
            exchange.actors.push(Actor::Narrator);

            let finished = narration.survey_finished;
            state.apply(ActorOutcome::Narration(narration));
            if finished {
                state.enter(SessionPhase::Narrating)?;
                self.log(
                    EventKind::SurveyFinished,
                    json!({
                        "session_id": state.session_id,
                        "profile": state.narrative.survey_profile,
                    }),
                );
            }
            return Ok(Step::Spoke);
        }

        // 2. Feedback
        if let Some(feedback) = state.take_feedback() {
            self.review_feedback(state, &feedback, exchange, progress).await;
            return Ok(Step::Spoke);
        }

        // 3. Challenge flow
        match handle_challenge_flow(state) {
            Some(ChallengeFlow::Assess) => {
                state.enter(SessionPhase::Assessing)?;
                self.run_assessor(state, handler, exchange, progress).await?;
                return Ok(Step::Continue);
            }
            Some(ChallengeFlow::Deliver(item)) => {
                state.enter(SessionPhase::DeliveringChallenge)?;
                info!("Delivering challenge {}", item.label());
                self.log(
                    EventKind::ChallengeDelivered,
                    json!({
                        "session_id": state.session_id,
                        "item": item.to_record(),
                        "delivered": state.challenge.delivered,
                        "queued": state.challenge.queue.len(),
                    }),
                );
                state.route_to(Actor::Narrator, None);
                let instruction = PromptTemplate::challenge_delivery(&item);
                self.narrate(state, Some(&instruction), exchange, progress).await;
                state.enter(SessionPhase::AwaitingChallengeResponse)?;
                return Ok(Step::Spoke);
            }
            None => {}
        }

        // Responses left unscored by an earlier step limit.
        if state.narrative.has_unassessed_responses()
            && state.phase.can_transition_to(SessionPhase::Assessing)
        {
            state.enter(SessionPhase::Assessing)?;
            self.run_assessor(state, handler, exchange, progress).await?;
            return Ok(Step::Continue);
        }

        // 4. Manager
        progress.on_actor_start(Actor::Manager, "Deciding what happens next");
        let route = self.decide_route.decide(state).await;
        progress.on_actor_complete(Actor::Manager, !route.fallback);
        exchange.actors.push(Actor::Manager);
        state.record_decision(&route.decision);
        self.log(
            EventKind::RoutingDecision,
            json!({
                "session_id": state.session_id,
                "next_agent": route.decision.next_agent.as_str(),
                "task": route.decision.task,
                "fallback": route.fallback,
            }),
        );

        let mut target = route.decision.next_agent;
        if target == NextAgent::ChallengeAgent && (exchange.setter_ran || state.assessment.ceiling)
        {
            debug!("Challenge generation already ran this exchange, narrating instead");
            target = NextAgent::NarrativeAgent;
        }

        match target {
            NextAgent::ChallengeAgent => {
                state.route_to(Actor::ChallengeSetter, Some(route.decision.clone()));
                progress.on_actor_start(Actor::ChallengeSetter, "Preparing word challenges");
                let generated = self
                    .set_challenges
                    .generate(
                        state,
                        handler,
                        self.config.challenges_per_batch,
                        &route.decision.task,
                    )
                    .await;
                progress.on_actor_complete(Actor::ChallengeSetter, !generated.items.is_empty());
                exchange.actors.push(Actor::ChallengeSetter);
                exchange.setter_ran = true;

                self.log(
                    EventKind::ChallengesGenerated,
                    json!({
                        "session_id": state.session_id,
                        "items": generated.items.iter().map(|i| i.to_record()).collect::<Vec<_>>(),
                    }),
                );
                state.apply(ActorOutcome::ChallengesGenerated(generated));
                Ok(Step::Continue)
            }
            NextAgent::NarrativeAgent => {
                state.route_to(Actor::Narrator, Some(route.decision.clone()));
                self.narrate(state, Some(&route.decision.task), exchange, progress)
                    .await;
                settle(state, SessionPhase::Narrating);
                Ok(Step::Spoke)
            }
        }
    }

    async fn run_assessor(
        &self,
        state: &mut SessionState,
        handler: &dyn SubtaskHandler,
        exchange: &mut Exchange,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunTurnError> {
        state.route_to(Actor::Assessor, None);
        progress.on_actor_start(Actor::Assessor, "Checking answers");
        let (outcome, scored) = self.assess.assess_pending(state, handler).await;
        progress.on_actor_complete(Actor::Assessor, true);
        exchange.actors.push(Actor::Assessor);

        for s in &scored {
            self.log(
                EventKind::ItemAssessed,
                json!({
                    "session_id": state.session_id,
                    "item": s.label,
                    "score": s.update.item_score,
                    "basal": s.update.basal,
                    "ceiling": s.update.ceiling,
                }),
            );
        }

        state.apply(ActorOutcome::Assessed(outcome));
        state.enter(SessionPhase::ReviewingFeedback)?;
        Ok(())
    }

    /// Continue the story after an assessment, or close it once the
    /// ceiling has fired.
    ///
    /// A drained challenge batch does not end the session on its own: the
    /// narrator keeps going and the manager may later route to the setter
    /// for a fresh batch. Closure happens only here, when the ceiling flag
    /// is set.
    async fn review_feedback(
        &self,
        state: &mut SessionState,
        feedback: &str,
        exchange: &mut Exchange,
        progress: &dyn ProgressNotifier,
    ) {
        state.route_to(Actor::Narrator, None);
        if state.assessment.ceiling {
            self.narrate(state, Some(PromptTemplate::closure_instruction()), exchange, progress)
                .await;
            state.end();
            info!("Session {} closed: ceiling reached", state.session_id);
            self.log(
                EventKind::SessionEnded,
                json!({
                    "session_id": state.session_id,
                    "summary": state.assessment.score_summary,
                }),
            );
        } else {
            let instruction = PromptTemplate::feedback_instruction(feedback);
            self.narrate(state, Some(&instruction), exchange, progress).await;
            settle(state, SessionPhase::Narrating);
        }
    }

    async fn narrate(
        &self,
        state: &mut SessionState,
        instruction: Option<&str>,
        exchange: &mut Exchange,
        progress: &dyn ProgressNotifier,
    ) {
        progress.on_actor_start(Actor::Narrator, "Telling the story");
        let narration = self.narrate.tell(state, instruction).await;
        progress.on_actor_complete(Actor::Narrator, true);
        exchange.actors.push(Actor::Narrator);
        state.apply(ActorOutcome::Narration(narration));
    }

    fn output(
        &self,
        state: &SessionState,
        start: usize,
        actors: Vec<Actor>,
        refused: bool,
    ) -> TurnOutput {
        TurnOutput {
            session_id: state.session_id.clone(),
            replies: state.full_history[start..]
                .iter()
                .filter(|t| t.actor.is_user_facing())
                .cloned()
                .collect(),
            actors,
            phase: state.phase,
            refused,
            ended: state.ended,
        }
    }

    fn log(&self, kind: EventKind, payload: serde_json::Value) {
        self.conversation_logger
            .log(ConversationEvent::new(kind, payload));
    }
}

/// Move to `phase` when the state machine allows it.
fn settle(state: &mut SessionState, phase: SessionPhase) {
    if state.phase.can_transition_to(phase) {
        state.phase = phase;
    } else {
        debug!("Staying in {} instead of {}", state.phase.as_str(), phase.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BlockWords, MemoryStore, ScriptedGateway};
    use lexiquest_domain::{
        ChallengeItem, ErrorCategory, Pairing, SurveyProfile, UserResponse, VocabularyAwareness,
    };
    use std::sync::Mutex;

    const SUN: &str = r#"{"challenge_type": "triplet", "triplet": ["light", "sun", "feather"], "pairings": [
        {"words": ["light", "sun"], "justification": "the sun produces light"},
        {"words": ["light", "feather"], "justification": "a feather is light"}]}"#;
    const DOG: &str = r#"{"challenge_type": "triplet", "triplet": ["dog", "cat", "bone"], "pairings": [
        {"words": ["dog", "cat"], "justification": "both animals"},
        {"words": ["dog", "bone"], "justification": "dogs like bones"}]}"#;

    const SUN_ANSWER: &str =
        "light and sun because sun gives light, light and feather because feather is not heavy";
    const SUN_EXTRACTED: &str = r#"{"pairings": [
        {"words": ["light", "sun"], "justification": "sun gives light"},
        {"words": ["light", "feather"], "justification": "feather is not heavy"}]}"#;
    const SUN_EVALUATED: &str = r#"{"evaluations": [
        {"evaluated_pairing": {"words": ["light", "sun"], "justification": "sun gives light"},
         "pair_is_valid": true, "justification_is_valid": true, "score": 1,
         "error_category": "none", "reasoning": "correct"},
        {"evaluated_pairing": {"words": ["light", "feather"], "justification": "feather is not heavy"},
         "pair_is_valid": true, "justification_is_valid": true, "score": 1,
         "error_category": "none", "reasoning": "correct"}]}"#;

    const DOG_ANSWER: &str = "dog and cat both animals, dog and bone dogs like bones";
    const DOG_EXTRACTED: &str = r#"{"pairings": [
        {"words": ["dog", "cat"], "justification": "both animals"},
        {"words": ["dog", "bone"], "justification": "dogs like bones"}]}"#;
    const DOG_EVALUATED: &str = r#"{"evaluations": [
        {"evaluated_pairing": {"words": ["dog", "cat"], "justification": "both animals"},
         "pair_is_valid": true, "justification_is_valid": true, "score": 1,
         "error_category": "none", "reasoning": "correct"},
        {"evaluated_pairing": {"words": ["dog", "bone"], "justification": "dogs like bones"},
         "pair_is_valid": true, "justification_is_valid": false, "score": 1,
         "error_category": "none", "reasoning": "vague"}]}"#;

    const TO_CHALLENGES: &str = r#"{"next_agent": "challenge_agent", "task": "Create word challenges"}"#;

    fn sun() -> ChallengeItem {
        ChallengeItem::triplet(
            ["light", "sun", "feather"],
            [
                Pairing::new("light", "sun", "the sun produces light"),
                Pairing::new("light", "feather", "a feather is light"),
            ],
        )
    }

    fn profile() -> SurveyProfile {
        [("age".to_string(), "7".to_string())].into_iter().collect()
    }

    fn use_case(gateway: &Arc<ScriptedGateway>, config: SessionConfig) -> RunTurnUseCase {
        RunTurnUseCase::new(
            gateway.clone(),
            ModelConfig::default(),
            Arc::new(MemoryStore::default()),
            config,
        )
    }

    fn story_config() -> SessionConfig {
        SessionConfig::default()
            .with_survey_profile(profile())
            .with_challenges_per_batch(2)
    }

    /// A session past the survey with some story told.
    fn story_state() -> SessionState {
        let mut state = SessionState::new("s1", VocabularyAwareness::KEY).with_survey_profile(profile());
        state.narrative.story.push(Turn::human("a dolphin"));
        state.apply(ActorOutcome::Narration(lexiquest_domain::Narration::story(
            "The dolphin swam toward the sun.",
        )));
        state
    }

    #[derive(Default)]
    struct RecordingLogger(Mutex<Vec<&'static str>>);

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.0.lock().unwrap().push(event.kind.as_str());
        }
    }

    #[tokio::test]
    async fn test_survey_exchange() {
        let gateway = Arc::new(ScriptedGateway::new(["Hello! How old are you?"]));
        let uc = use_case(&gateway, SessionConfig::default());
        let mut state = uc.new_session("s1");

        let output = uc.run_exchange(&mut state, "hi", &NoProgress).await.unwrap();
        assert_eq!(output.reply_text(), "Hello! How old are you?");
        assert_eq!(output.actors, vec![Actor::Narrator]);
        assert_eq!(state.phase, SessionPhase::AwaitingSurvey);
        assert_eq!(state.narrative.survey.len(), 2);
        assert!(state.narrative.story.is_empty());
    }

    #[tokio::test]
    async fn test_survey_end_enters_narrating() {
        let gateway = Arc::new(ScriptedGateway::new([
            "Wonderful! Ok, now we will begin our story ...<END>",
            r#"{"age": 7, "favorite_animal": "dolphin"}"#,
        ]));
        let uc = use_case(&gateway, SessionConfig::default());
        let mut state = uc.new_session("s1");

        let output = uc.run_exchange(&mut state, "dolphins!", &NoProgress).await.unwrap();
        assert!(!output.reply_text().contains("<END>"));
        assert!(state.narrative.finished_survey);
        assert_eq!(state.phase, SessionPhase::Narrating);
        assert_eq!(state.narrative.survey_profile.get("favorite_animal"), Some("dolphin"));
    }

    #[tokio::test]
    async fn test_unparseable_routing_continues_story() {
        let gateway = Arc::new(ScriptedGateway::new(["hmm", "Once upon a time..."]));
        let uc = use_case(&gateway, story_config());
        let mut state = uc.new_session("s1");

        let output = uc.run_exchange(&mut state, "a dolphin", &NoProgress).await.unwrap();
        assert_eq!(output.reply_text(), "Once upon a time...");
        assert_eq!(output.actors, vec![Actor::Manager, Actor::Narrator]);
        assert_eq!(state.phase, SessionPhase::Narrating);
        assert_eq!(
            state.full_history[1].content,
            "Manager decision: narrative_agent (Continue the story)"
        );
    }

    #[tokio::test]
    async fn test_challenge_cycle_and_batch_assessment() {
        let gateway = Arc::new(ScriptedGateway::new([
            TO_CHALLENGES,
            SUN,
            DOG,
            "Look! A light, a sun and a feather. Which two go together?",
        ]));
        let uc = use_case(&gateway, story_config());
        let mut state = story_state();

        // Generation and first delivery in one exchange.
        let output = uc.run_exchange(&mut state, "let's play", &NoProgress).await.unwrap();
        assert_eq!(
            output.actors,
            vec![Actor::Manager, Actor::ChallengeSetter, Actor::Narrator]
        );
        assert_eq!(output.replies.len(), 1);
        assert_eq!(state.phase, SessionPhase::AwaitingChallengeResponse);
        assert!(state.narrative.active_challenge);
        assert_eq!(state.narrative.next_triplet, Some(sun()));
        assert_eq!(state.challenge.queue.len(), 1);
        assert_eq!(state.challenge.batches_generated, 1);

        // The answer is captured and the next item goes out.
        gateway.push("Now: dog, cat and bone!");
        uc.run_exchange(&mut state, SUN_ANSWER, &NoProgress).await.unwrap();
        assert_eq!(state.narrative.user_responses.len(), 1);
        assert_eq!(state.student_response.as_deref(), Some(SUN_ANSWER));
        assert!(state.challenge.queue.is_empty());
        assert_eq!(state.challenge.delivered, 2);

        // The last answer drains the queue: both are assessed, then feedback.
        for reply in [SUN_EXTRACTED, SUN_EVALUATED, DOG_EXTRACTED, DOG_EVALUATED] {
            gateway.push(reply);
        }
        gateway.push("Great job! The dolphin swims on.");
        let output = uc.run_exchange(&mut state, DOG_ANSWER, &NoProgress).await.unwrap();

        assert_eq!(output.actors, vec![Actor::Assessor, Actor::Narrator]);
        assert_eq!(output.reply_text(), "Great job! The dolphin swims on.");
        // Second pair of the dog item is normalized to 0.
        assert_eq!(state.assessment.item_total_scores, vec![2, 1]);
        assert_eq!(state.assessment.score_summary.normalized_average, 0.75);
        assert!(state.narrative.user_responses.iter().all(|r| r.assessed));
        assert!(!state.narrative.active_challenge);
        assert!(state.assessment_feedback.is_none());
        assert_eq!(state.phase, SessionPhase::Narrating);
        assert_eq!(
            state.assessment.assessment_history[1].evaluation.evaluations[1].error_category,
            ErrorCategory::Other
        );
        assert_eq!(gateway.remaining(), 0);
    }

    #[tokio::test]
    async fn test_refusal_terminates_exchange_then_resumes() {
        let gateway = Arc::new(ScriptedGateway::new([r#"{"next_agent": "narrative_agent", "task": "Continue the story"}"#, "And then..."]));
        let uc = use_case(&gateway, story_config()).with_guard(Arc::new(BlockWords(vec!["stupid"])));
        let mut state = story_state();

        let output = uc
            .run_exchange(&mut state, "this is stupid", &NoProgress)
            .await
            .unwrap();
        assert!(output.refused);
        assert_eq!(output.replies.len(), 1);
        assert_eq!(output.replies[0].actor, Actor::Alignment);
        assert_eq!(output.reply_text(), crate::config::DEFAULT_REFUSAL);
        assert_eq!(state.phase, SessionPhase::Terminated);
        assert!(gateway.calls().is_empty());
        // The refused text never joins the story.
        assert_eq!(state.narrative.story.len(), 2);

        let output = uc.run_exchange(&mut state, "ok, sorry", &NoProgress).await.unwrap();
        assert!(!output.refused);
        assert_eq!(output.reply_text(), "And then...");
        assert_eq!(state.phase, SessionPhase::Narrating);
    }

    #[tokio::test]
    async fn test_ceiling_closes_story() {
        let gateway = Arc::new(ScriptedGateway::new([
            r#"{"pairings": []}"#,
            "And they all lived happily ever after. Thanks for playing!",
        ]));
        let uc = use_case(&gateway, story_config());
        let mut state = story_state();
        state.assessment.item_total_scores = vec![0; 7];
        state.narrative.active_challenge = true;
        state.narrative.next_triplet = Some(sun());
        state.phase = SessionPhase::AwaitingChallengeResponse;

        let output = uc.run_exchange(&mut state, "I don't know", &NoProgress).await.unwrap();
        assert!(output.ended);
        assert!(state.ended);
        assert!(state.assessment.ceiling);
        assert_eq!(state.assessment.item_total_scores.len(), 8);
        assert_eq!(state.phase, SessionPhase::Terminated);
        assert!(output.reply_text().contains("happily ever after"));

        // Nothing runs once the story is closed.
        let output = uc.run_exchange(&mut state, "more!", &NoProgress).await.unwrap();
        assert!(output.ended);
        assert!(output.actors.is_empty());
        assert_eq!(output.reply_text(), crate::config::DEFAULT_ENDED);
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_setter_runs_once_per_exchange() {
        let gateway = Arc::new(ScriptedGateway::new([
            TO_CHALLENGES,
            "no",
            "still no",
            TO_CHALLENGES,
            "The dolphin found a shell.",
        ]));
        let uc = use_case(&gateway, story_config());
        let mut state = story_state();

        let output = uc.run_exchange(&mut state, "go on", &NoProgress).await.unwrap();
        assert_eq!(
            output.actors,
            vec![Actor::Manager, Actor::ChallengeSetter, Actor::Manager, Actor::Narrator]
        );
        assert_eq!(output.reply_text(), "The dolphin found a shell.");
        assert_eq!(state.challenge.batches_generated, 0);
        assert!(
            state
                .full_history
                .iter()
                .any(|t| t.actor == Actor::ChallengeSetter && t.content.contains("no challenges"))
        );
    }

    #[tokio::test]
    async fn test_step_limit_forces_narrator() {
        let gateway = Arc::new(ScriptedGateway::new([TO_CHALLENGES, SUN, "Let's keep going!"]));
        let config = story_config()
            .with_challenges_per_batch(1)
            .with_max_steps_per_turn(1);
        let uc = use_case(&gateway, config);
        let mut state = story_state();

        let output = uc.run_exchange(&mut state, "go", &NoProgress).await.unwrap();
        assert_eq!(output.reply_text(), "Let's keep going!");
        assert_eq!(state.challenge.queue.len(), 1);
        assert_eq!(state.phase, SessionPhase::Narrating);
        assert!(state.pending_input.is_none());

        // The queued item goes out on the next exchange.
        gateway.push("Light, sun, feather!");
        uc.run_exchange(&mut state, "ok", &NoProgress).await.unwrap();
        assert_eq!(state.phase, SessionPhase::AwaitingChallengeResponse);
        assert!(state.narrative.user_responses.is_empty());
    }

    #[tokio::test]
    async fn test_leftover_responses_are_assessed() {
        let gateway = Arc::new(ScriptedGateway::new([
            SUN_EXTRACTED,
            SUN_EVALUATED,
            "Well done!",
        ]));
        let uc = use_case(&gateway, story_config());
        let mut state = story_state();
        state
            .narrative
            .user_responses
            .push(UserResponse::new(sun(), Some(SUN_ANSWER.to_string())));

        let output = uc.run_exchange(&mut state, "next", &NoProgress).await.unwrap();
        assert_eq!(output.actors, vec![Actor::Assessor, Actor::Narrator]);
        assert_eq!(state.assessment.item_total_scores, vec![2]);
        assert_eq!(state.phase, SessionPhase::Narrating);
    }

    #[tokio::test]
    async fn test_execute_checkpoints_and_logs() {
        let gateway = Arc::new(ScriptedGateway::new(["Hi! What's your name?"]));
        let store = Arc::new(MemoryStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let uc = RunTurnUseCase::new(
            gateway.clone(),
            ModelConfig::default(),
            store.clone(),
            SessionConfig::default(),
        )
        .with_conversation_logger(logger.clone());

        uc.execute(RunTurnInput::new("LQ-chat_1", "hello")).await.unwrap();
        let saved = store.get("LQ-chat_1").unwrap();
        assert_eq!(saved.exchanges, 1);
        assert_eq!(saved.full_history.len(), 2);
        assert_eq!(*logger.0.lock().unwrap(), vec!["human_turn", "checkpoint"]);

        // The next exchange continues from the checkpoint.
        gateway.push("Nice to meet you!");
        uc.execute(RunTurnInput::new("LQ-chat_1", "Sam")).await.unwrap();
        assert_eq!(store.get("LQ-chat_1").unwrap().exchanges, 2);
    }

    #[tokio::test]
    async fn test_unknown_subtask_is_fatal() {
        let gateway = Arc::new(ScriptedGateway::new(["unused"]));
        let store = Arc::new(MemoryStore::default());
        let uc = RunTurnUseCase::new(
            gateway.clone(),
            ModelConfig::default(),
            store.clone(),
            SessionConfig::default().with_subtask("Rhyme Detection"),
        );

        assert!(matches!(
            uc.validate(),
            Err(RunTurnError::Domain(DomainError::UnknownSubtask(_)))
        ));
        let err = uc.execute(RunTurnInput::new("s", "hi")).await.unwrap_err();
        assert!(matches!(err, RunTurnError::Domain(DomainError::UnknownSubtask(_))));
        assert!(store.get("s").is_none());
        assert!(gateway.calls().is_empty());
    }
}
