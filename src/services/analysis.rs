// src/services/analysis.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::completion::{CompletionClient, CompletionError};
use crate::{
    message::Message,
    prompts::{FEEDBACK_INSTRUCTION, QUIZ_INSTRUCTION, QUIZ_TRIGGER, SCORE_INSTRUCTION},
};

pub const SCORE_MAX: u8 = 5;
pub const OPTIONS_PER_QUESTION: usize = 4;
pub const WEEKDAYS: &[&str] = &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const WEEKEND: &[&str] = &["Saturday", "Sunday"];

pub async fn feedback(
    client: &dyn CompletionClient,
    history: &[Message],
) -> Result<String, CompletionError> {
    client.complete(FEEDBACK_INSTRUCTION, history).await
}

pub async fn score(
    client: &dyn CompletionClient,
    history: &[Message],
) -> Result<String, CompletionError> {
    client.complete(SCORE_INSTRUCTION, history).await
}

pub async fn quiz(client: &dyn CompletionClient) -> Result<String, CompletionError> {
    client
        .complete(QUIZ_INSTRUCTION, &[Message::user(QUIZ_TRIGGER)])
        .await
}

// Typed views of model output. Used for logging only, never to gate a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub grammar: u8,
    pub vocabulary: u8,
}

impl Score {
    pub fn within_scale(&self) -> bool {
        self.grammar <= SCORE_MAX && self.vocabulary <= SCORE_MAX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTIONS_PER_QUESTION
            && self.options.iter().filter(|o| **o == self.correct_answer).count() == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub weekdays: BTreeMap<String, Vec<QuizQuestion>>,
    pub weekend: BTreeMap<String, Vec<QuizQuestion>>,
}

impl Quiz {
    /// Human-readable descriptions of every way this quiz deviates from the
    /// requested shape. Empty means conforming.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let groups = [("weekdays", &self.weekdays, WEEKDAYS), ("weekend", &self.weekend, WEEKEND)];
        for (group, days, expected) in groups {
            for day in expected {
                if !days.contains_key(*day) {
                    problems.push(format!("{group} is missing {day}"));
                }
            }
            for (day, questions) in days {
                for (i, q) in questions.iter().enumerate() {
                    if !q.is_well_formed() {
                        problems.push(format!("{group}.{day}[{i}] needs four options with one correct answer"));
                    }
                }
            }
        }
        problems
    }
}

/// Parse JSON produced by the model, tolerating a surrounding Markdown code fence.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag such as "json".
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
