// ABOUTME: Question records as delivered by the question source, plus payload parsing.
// ABOUTME: Rejects malformed payloads so a bad source surfaces as a load failure.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// One multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctOption")]
    pub correct_option: usize,
    pub points: u32,
}

impl Question {
    pub fn new(text: impl Into<String>, options: Vec<String>, correct_option: usize, points: u32) -> Self {
        Self {
            text: text.into(),
            options,
            correct_option,
            points,
        }
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }

    /// Check the shape the state machine relies on.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.options.len() < 2 {
            return Err(QuizError::LoadFailure(format!(
                "question {:?} has {} options, need at least 2",
                self.text,
                self.options.len()
            )));
        }
        if self.correct_option >= self.options.len() {
            return Err(QuizError::LoadFailure(format!(
                "question {:?} marks option {} correct but has only {} options",
                self.text,
                self.correct_option,
                self.options.len()
            )));
        }
        if self.points == 0 {
            return Err(QuizError::LoadFailure(format!(
                "question {:?} is worth zero points",
                self.text
            )));
        }
        Ok(())
    }
}

/// Parse a JSON array of question records.
pub fn parse_questions(payload: &str) -> Result<Vec<Question>, QuizError> {
    let questions: Vec<Question> = serde_json::from_str(payload)
        .map_err(|e| QuizError::LoadFailure(format!("malformed question payload: {e}")))?;
    validate_questions(&questions)?;
    Ok(questions)
}

/// Validate an already-decoded question list.
pub fn validate_questions(questions: &[Question]) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(QuizError::LoadFailure("question source returned no questions".to_string()));
    }
    questions.iter().try_for_each(Question::validate)?;
    // Scores and totals are u32 sums, so the whole list must fit.
    if questions.iter().try_fold(0u32, |acc, q| acc.checked_add(q.points)).is_none() {
        return Err(QuizError::LoadFailure(format!(
            "question points add up to more than {}",
            u32::MAX
        )));
    }
    Ok(())
}

/// Sum of the points of every question.
pub fn total_points(questions: &[Question]) -> u32 {
    questions.iter().map(|q| q.points).sum()
}
