// ABOUTME: Events consumed by the quiz state machine and the user intents that produce some of them.
// ABOUTME: Intents parse from text commands; machine-only events (ticks, load results) do not.

use std::fmt;
use std::sync::Arc;

use crate::error::QuizError;
use crate::question::Question;

/// Events that trigger state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    QuestionsLoaded(Arc<[Question]>),
    LoadFailed,
    Start,
    Tick,
    /// Zero-based option index for the current question.
    AnswerSelected(usize),
    Next,
    Restart,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::QuestionsLoaded(questions) => write!(f, "QuestionsLoaded({})", questions.len()),
            Event::LoadFailed => write!(f, "LoadFailed"),
            Event::Start => write!(f, "Start"),
            Event::Tick => write!(f, "Tick"),
            Event::AnswerSelected(option) => write!(f, "AnswerSelected({option})"),
            Event::Next => write!(f, "Next"),
            Event::Restart => write!(f, "Restart"),
        }
    }
}

/// Actions a player can take. The only events the presentation layer may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Answer(usize),
    Next,
    Restart,
}

impl From<Intent> for Event {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Start => Event::Start,
            Intent::Answer(option) => Event::AnswerSelected(option),
            Intent::Next => Event::Next,
            Intent::Restart => Event::Restart,
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = QuizError;

    /// Parses `start`, `next`, `restart`, `answer <n>` or a bare `<n>`.
    /// Option numbers are 1-based as shown to the player.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let intent = match (words.next(), words.next(), words.next()) {
            (Some("start"), None, _) => Intent::Start,
            (Some("next" | "finish"), None, _) => Intent::Next,
            (Some("restart"), None, _) => Intent::Restart,
            (Some("answer"), Some(n), None) | (Some(n), None, _) => parse_option(n, s)?,
            _ => return Err(QuizError::UnknownEvent(s.trim().to_string())),
        };
        Ok(intent)
    }
}

fn parse_option(number: &str, original: &str) -> Result<Intent, QuizError> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Intent::Answer(n - 1)),
        _ => Err(QuizError::UnknownEvent(original.trim().to_string())),
    }
}
