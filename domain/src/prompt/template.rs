//! Prompt templates for the story session

use crate::challenge::ChallengeItem;
use crate::survey::{END_MARKER, SurveyProfile};

/// Templates for generating prompts for each actor
pub struct PromptTemplate;

impl PromptTemplate {
    // ==================== Manager ====================

    /// System prompt for the routing decision
    pub fn manager_system() -> &'static str {
        r#"You are a manager managing the following agents:

- "narrative_agent": Assign narrative-related tasks to this agent.
- "challenge_agent": Assign challenge-related tasks to this agent.

Assign work to one agent at a time, do not call agents in parallel.

Refer to the narrative agent for the first part of the story. Once a few story turns have passed, call the
challenge_agent so that challenges can be woven into the story. Make sure the challenge_agent is called every
few turns.

Your response MUST be a JSON object with two keys:
- "next_agent": either "narrative_agent" or "challenge_agent"
- "task": a string describing the task to assign

DO NOT include any other text or formatting, ONLY return the JSON object.

Example:
{"next_agent": "narrative_agent", "task": "Continue the story"}"#
    }

    // ==================== Narrator ====================

    /// System prompt for the survey dialogue
    pub fn survey_system() -> String {
        format!(
            r#"You are a friendly AI tasked with gathering some information about a child's age, interests, and aspirations.
Engage with this child in a friendly, age-appropriate conversation.

- Use a warm, playful, and patient tone. Speak as a friend, not a teacher. Use simple sentences.
- Start with a cheerful greeting and ask for their age.
- Explore their hobbies and favorite things (color, food, animal, book, movie, school subject).
- Ask what they want to be when they grow up.
- Ask one question at a time. The whole conversation should last no more than 10 turns.

When you have collected enough information, end with a positive note and no questions. Your final message,
and only your final message, must end with the phrase:

Ok, now we will begin our story ...{}"#,
            END_MARKER
        )
    }

    /// System prompt for turning the survey transcript into a profile
    pub fn survey_extraction_system() -> &'static str {
        r#"You extract facts about a child from a survey conversation.

Return ONLY a JSON object. Use these keys when the information is present:
"age", "interests", "wants_to_be", "favorite_color", "favorite_food", "favorite_animal", "favorite_book",
"favorite_movie", "favorite_subject". Leave out anything the child did not say."#
    }

    /// User prompt carrying the survey transcript
    pub fn survey_extraction_input(transcript: &str) -> String {
        format!("Survey conversation:\n\n{}", transcript)
    }

    /// System prompt for storytelling, personalized with the survey profile
    pub fn narrator_system(profile: &SurveyProfile) -> String {
        let about = if profile.is_empty() {
            "Nothing is known about the child yet; keep the story broadly appealing.".to_string()
        } else {
            format!("Here is what you know about the child:\n{}", profile.describe())
        };
        format!(
            r#"You are a master storyteller who really understands how to engage children. Co-create a simple short
story with the child, using short sentences and simple words. The story should be fun, exciting,
age-appropriate, and personalized to their interests.

{}

Begin by setting the scene, organically asking the child questions to guide the story, and responding to
their answers. Use emojis to make it more engaging!"#,
            about
        )
    }

    /// Instruction for weaving a challenge item into the story
    pub fn challenge_delivery(item: &ChallengeItem) -> String {
        match item {
            ChallengeItem::Triplet(t) => format!(
                r#"Continue the story and, as part of it, give the child this word challenge.
Present the three words {} and ask the child to pick two words that go together and say why, then
another two words that go together and say why. Do NOT reveal the answers or hint at which words belong together."#,
                t.triplet
                    .iter()
                    .map(|w| format!("\"{}\"", w))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ChallengeItem::Phonemic(p) => format!(
                r#"Continue the story and, as part of it, ask the child to say the made-up word "{}" and then say it
again without one of its sounds. Do NOT say the answer."#,
                p.non_word_pair.0
            ),
            ChallengeItem::InferentialVocabulary(iv) => format!(
                r#"Continue the story and, as part of it, ask the child this question: "{}" If they are unsure, ask:
"{}" Do NOT explain the word."#,
                iv.a_question, iv.b_question
            ),
        }
    }

    /// Instruction for continuing after an assessment
    pub fn feedback_instruction(feedback: &str) -> String {
        format!(
            r#"The child just answered some word challenges. Here is a summary of how it went:
{}

Continue the story. Praise the child's effort warmly without saying which answers were right or wrong."#,
            feedback
        )
    }

    /// Instruction for wrapping the story up
    pub fn closure_instruction() -> &'static str {
        r#"It is time to end the story. Bring the story to a happy, satisfying ending in a few short sentences,
thank the child for playing, and do not ask any more questions."#
    }

    // ==================== Challenge setter ====================

    /// System prompt for challenge generation
    pub fn challenge_system(subtask_description: &str) -> String {
        format!(
            r#"You create language challenges for children that fit into an ongoing story.

{}

Use simple words a child would know, and take the words from the story whenever you can.
Justifications should be based on the actual meaning of the words. Do not define words.
Respond with ONLY a JSON object describing ONE challenge, with no other text."#,
            subtask_description
        )
    }

    /// User prompt requesting the next challenge item
    pub fn challenge_request(story: &str, example: &ChallengeItem, previous: &[ChallengeItem]) -> String {
        let mut prompt = format!(
            r#"The story so far:

{}

Create one new challenge. Use exactly this JSON format:
{}
"#,
            story,
            example.to_record()
        );

        if !previous.is_empty() {
            prompt.push_str("\nDo not repeat any of these previous challenges:\n");
            for item in previous {
                prompt.push_str(&format!("- {}\n", item.label()));
            }
        }

        prompt
    }

    // ==================== Assessor ====================

    /// System prompt for an extraction or evaluation call
    pub fn assessment_system(subtask_description: &str, instructions: &str) -> String {
        format!(
            r#"## Subtask

{}

## Instructions

{}"#,
            subtask_description, instructions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeKind;

    #[test]
    fn test_survey_system_mentions_marker() {
        assert!(PromptTemplate::survey_system().contains("<END>"));
    }

    #[test]
    fn test_narrator_system_uses_profile() {
        let profile: SurveyProfile = [("favorite_animal", "dolphin")].into_iter().collect();
        let prompt = PromptTemplate::narrator_system(&profile);
        assert!(prompt.contains("- favorite animal: dolphin"));

        let prompt = PromptTemplate::narrator_system(&SurveyProfile::new());
        assert!(prompt.contains("Nothing is known"));
    }

    #[test]
    fn test_challenge_delivery_lists_words_only() {
        let item = ChallengeItem::example(ChallengeKind::Triplet);
        let prompt = PromptTemplate::challenge_delivery(&item);
        assert!(prompt.contains(r#""dog", "cat", "bone""#));
        assert!(!prompt.contains("dogs like bones"));
    }

    #[test]
    fn test_challenge_request_lists_previous() {
        let example = ChallengeItem::example(ChallengeKind::Triplet);
        let prompt = PromptTemplate::challenge_request("A dolphin swam.", &example, &[example.clone()]);
        assert!(prompt.contains("\"challenge_type\":\"triplet\""));
        assert!(prompt.contains("- dog-cat-bone"));

        let prompt = PromptTemplate::challenge_request("A dolphin swam.", &example, &[]);
        assert!(!prompt.contains("Do not repeat"));
    }
}
