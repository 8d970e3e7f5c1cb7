//! Assessor use case.
//!
//! Scores captured challenge responses through a two-stage pipeline:
//!
//! 1. **Extraction**: structure the raw response into answer pairs.
//! 2. **Filter**: drop pairs that are not grounded in the raw response.
//! 3. **Evaluation**: judge the surviving pairs against the item.
//! 4. **Scoring**: finalize the verdicts and update basal/ceiling.
//!
//! Model failures never abort the pipeline. A failed extraction counts as
//! an empty answer; a failed evaluation marks every pair unevaluated.

use crate::generation::{GenerationRequest, GenerationService};
use crate::schemas;
use lexiquest_domain::{
    AssessedItem, AssessmentOutcome, ChallengeItem, EvaluatedAnswer, ExtractedAnswer,
    ItemEvaluation, Model, PromptTemplate, ScoreUpdate, ScoringEngine, SessionState,
    SubtaskHandler,
};
use tracing::{debug, info, warn};

/// One scored item together with the engine's verdict.
#[derive(Debug, Clone)]
pub struct ScoredResponse {
    pub label: String,
    pub update: ScoreUpdate,
}

/// Assessor actor.
#[derive(Clone)]
pub struct AssessResponseUseCase {
    generation: GenerationService,
    model: Model,
}

impl AssessResponseUseCase {
    pub fn new(generation: GenerationService, model: Model) -> Self {
        Self { generation, model }
    }

    /// Run extraction, filtering and evaluation for one response.
    pub async fn assess_item(
        &self,
        handler: &dyn SubtaskHandler,
        item: &ChallengeItem,
        response: Option<&str>,
    ) -> AssessedItem {
        let extracted = self.extract(handler, response).await;
        let filtered = handler.filter_extracted_answers(&extracted, response);
        if filtered.len() < extracted.len() {
            debug!(
                "Fidelity filter kept {}/{} pairs for {}",
                filtered.len(),
                extracted.len(),
                item.label()
            );
        }

        let mut evaluation = self.evaluate(handler, item, &filtered).await;
        let total = handler.update_score(&filtered, &mut evaluation);
        debug!("Item {} scored {}/{}", item.label(), total, handler.max_item_score());

        AssessedItem {
            item: item.clone(),
            response: response.map(str::to_string),
            extracted: filtered,
            evaluation,
        }
    }

    async fn extract(&self, handler: &dyn SubtaskHandler, response: Option<&str>) -> ExtractedAnswer {
        if response.is_none_or(|r| r.trim().is_empty()) {
            return ExtractedAnswer::default();
        }

        let request = GenerationRequest::new(
            self.model.clone(),
            PromptTemplate::assessment_system(handler.description(), handler.extraction_instructions()),
        )
        .with_user(handler.format_extraction_input(response))
        .with_schema(schemas::extracted_answer(handler.expected_answers()));

        match self.generation.complete_structured(&request).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("Extraction failed, treating the response as empty: {}", e);
                ExtractedAnswer::default()
            }
        }
    }

    async fn evaluate(
        &self,
        handler: &dyn SubtaskHandler,
        item: &ChallengeItem,
        filtered: &ExtractedAnswer,
    ) -> ItemEvaluation {
        if filtered.is_empty() {
            return ItemEvaluation::default();
        }

        let request = GenerationRequest::new(
            self.model.clone(),
            PromptTemplate::assessment_system(handler.description(), handler.evaluation_instructions()),
        )
        .with_user(handler.format_evaluation_input(filtered, item))
        .with_schema(schemas::item_evaluation());

        match self.generation.complete_structured(&request).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("Evaluation failed, marking pairs unevaluated: {}", e);
                ItemEvaluation::new(
                    filtered
                        .pairings
                        .iter()
                        .cloned()
                        .map(EvaluatedAnswer::unevaluated)
                        .collect(),
                )
            }
        }
    }

    /// Score every unassessed response in the session, oldest first.
    ///
    /// Works on a copy of the assessment namespace and returns it in the
    /// outcome; the session itself is left untouched.
    pub async fn assess_pending(
        &self,
        state: &SessionState,
        handler: &dyn SubtaskHandler,
    ) -> (AssessmentOutcome, Vec<ScoredResponse>) {
        let engine = ScoringEngine::new(handler);
        let mut assessment = state.assessment.clone();
        let mut scored = Vec::new();

        for pending in state.narrative.unassessed_responses() {
            let assessed = self
                .assess_item(handler, &pending.item, pending.response.as_deref())
                .await;
            let update = engine.record(&mut assessment, assessed);
            if update.ceiling_reached {
                info!("Ceiling reached after {} items", assessment.item_total_scores.len());
            }
            scored.push(ScoredResponse {
                label: pending.item.label(),
                update,
            });
        }

        let feedback = feedback_summary(&scored, &assessment, handler.max_item_score());
        info!("Assessed {} response(s)", scored.len());

        let outcome = AssessmentOutcome {
            assessment,
            responses_assessed: scored.len(),
            feedback,
        };
        (outcome, scored)
    }
}

fn feedback_summary(
    scored: &[ScoredResponse],
    assessment: &lexiquest_domain::AssessmentState,
    max_item_score: u32,
) -> String {
    let mut lines = vec![format!("Assessed {} item(s).", scored.len())];
    for s in scored {
        lines.push(format!("- {}: {}/{}", s.label, s.update.item_score, max_item_score));
    }
    let summary = &assessment.score_summary;
    lines.push(format!(
        "Running average: {:.2} over {} item(s).",
        summary.normalized_average, summary.total_items
    ));
    if assessment.ceiling {
        lines.push("Ceiling reached: the assessment is complete.".to_string());
    }
    lines.join("\n")
}
