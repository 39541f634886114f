// ABOUTME: Quiz state machine: the authoritative quiz state and its pure transition function.
// ABOUTME: Per-status data lives inside the phase variant so unreachable fields cannot be observed.

use std::fmt;
use std::sync::Arc;

use crate::error::QuizError;
use crate::event::Event;
use crate::question::Question;

/// Countdown budget granted per question when a session starts.
pub const SECONDS_PER_QUESTION: u32 = 30;

/// The quiz's operational statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Error,
    Ready,
    Active,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Loading => write!(f, "Loading"),
            Status::Error => write!(f, "Error"),
            Status::Ready => write!(f, "Ready"),
            Status::Active => write!(f, "Active"),
            Status::Finished => write!(f, "Finished"),
        }
    }
}

/// A session in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    index: usize,
    /// One slot per question; only the current slot is ever written.
    answers: Vec<Option<usize>>,
    seconds_remaining: u32,
}

impl Round {
    fn new(num_questions: usize, seconds_remaining: u32) -> Self {
        Self {
            index: 0,
            answers: vec![None; num_questions],
            seconds_remaining,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn answer(&self) -> Option<usize> {
        self.answers.get(self.index).copied().flatten()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    /// Score recomputed from the whole answer sheet, so re-answering never double-counts.
    pub fn score(&self, questions: &[Question]) -> u32 {
        self.answers
            .iter()
            .zip(questions)
            .filter(|(answer, question)| matches!(answer, Some(option) if question.is_correct(*option)))
            .map(|(_, question)| question.points)
            .sum()
    }
}

/// Status discriminant together with the data reachable in that status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Error,
    Ready,
    Active(Round),
    Finished { score: u32 },
}

impl Phase {
    pub fn status(&self) -> Status {
        match self {
            Phase::Loading => Status::Loading,
            Phase::Error => Status::Error,
            Phase::Ready => Status::Ready,
            Phase::Active(_) => Status::Active,
            Phase::Finished { .. } => Status::Finished,
        }
    }
}

/// Complete quiz state. Replaced, never mutated, on every accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizState {
    questions: Arc<[Question]>,
    phase: Phase,
    high_score: u32,
    seconds_per_question: u32,
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new(SECONDS_PER_QUESTION)
    }
}

impl QuizState {
    /// Initial state: loading, no questions, zero high score.
    pub fn new(seconds_per_question: u32) -> Self {
        Self {
            questions: Arc::from(Vec::<Question>::new()),
            phase: Phase::Loading,
            high_score: 0,
            seconds_per_question: seconds_per_question.max(1),
        }
    }

    pub fn status(&self) -> Status {
        self.phase.status()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn num_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn total_points(&self) -> u32 {
        crate::question::total_points(&self.questions)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    /// Zero outside an active session.
    pub fn current_index(&self) -> usize {
        match &self.phase {
            Phase::Active(round) => round.index,
            _ => 0,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            Phase::Active(round) => self.questions.get(round.index),
            _ => None,
        }
    }

    pub fn current_answer(&self) -> Option<usize> {
        match &self.phase {
            Phase::Active(round) => round.answer(),
            _ => None,
        }
    }

    pub fn is_last_question(&self) -> bool {
        match &self.phase {
            Phase::Active(round) => round.index + 1 >= self.questions.len(),
            _ => false,
        }
    }

    pub fn score(&self) -> u32 {
        match &self.phase {
            Phase::Active(round) => round.score(&self.questions),
            Phase::Finished { score } => *score,
            Phase::Loading | Phase::Error | Phase::Ready => 0,
        }
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        match &self.phase {
            Phase::Active(round) => Some(round.seconds_remaining),
            _ => None,
        }
    }

    /// Compute the state that follows `event`. Events with no effect in the
    /// current status are rejected and leave `self` untouched.
    pub fn transition(&self, event: &Event) -> Result<QuizState, QuizError> {
        match (&self.phase, event) {
            // Loading + QuestionsLoaded -> Ready (an empty list cannot be played)
            (Phase::Loading, Event::QuestionsLoaded(questions)) if questions.is_empty() => {
                Ok(self.with_phase(Phase::Error))
            }
            (Phase::Loading, Event::QuestionsLoaded(questions)) => Ok(Self {
                questions: Arc::clone(questions),
                phase: Phase::Ready,
                high_score: self.high_score,
                seconds_per_question: self.seconds_per_question,
            }),

            // Loading + LoadFailed -> Error
            (Phase::Loading, Event::LoadFailed) => Ok(self.with_phase(Phase::Error)),

            // Ready + Start -> Active with a fresh sheet and a full countdown
            (Phase::Ready, Event::Start) => {
                let seconds = (self.questions.len() as u32).saturating_mul(self.seconds_per_question);
                Ok(self.with_phase(Phase::Active(Round::new(self.questions.len(), seconds))))
            }

            // Active + Tick -> Active, or Finished in the same step that reaches zero
            (Phase::Active(round), Event::Tick) => {
                let seconds_remaining = round.seconds_remaining.saturating_sub(1);
                if seconds_remaining == 0 {
                    Ok(self.finish(round))
                } else {
                    Ok(self.with_phase(Phase::Active(Round {
                        seconds_remaining,
                        ..round.clone()
                    })))
                }
            }

            // Active + AnswerSelected -> Active, re-answering replaces the slot
            (Phase::Active(round), Event::AnswerSelected(option)) => {
                let in_range = self
                    .questions
                    .get(round.index)
                    .is_some_and(|question| *option < question.options.len());
                if !in_range {
                    return Err(self.reject(event));
                }
                let mut round = round.clone();
                round.answers[round.index] = Some(*option);
                Ok(self.with_phase(Phase::Active(round)))
            }

            // Active + Next -> Finished on the last question, else the next question
            (Phase::Active(round), Event::Next) => {
                if round.index + 1 >= self.questions.len() {
                    Ok(self.finish(round))
                } else {
                    Ok(self.with_phase(Phase::Active(Round {
                        index: round.index + 1,
                        ..round.clone()
                    })))
                }
            }

            // Finished + Restart -> Ready, questions and high score carried over
            (Phase::Finished { .. }, Event::Restart) => Ok(self.with_phase(Phase::Ready)),

            // Error is terminal; everything else has no effect
            _ => Err(self.reject(event)),
        }
    }

    fn with_phase(&self, phase: Phase) -> Self {
        Self {
            questions: Arc::clone(&self.questions),
            phase,
            high_score: self.high_score,
            seconds_per_question: self.seconds_per_question,
        }
    }

    fn finish(&self, round: &Round) -> Self {
        let score = round.score(&self.questions);
        Self {
            high_score: self.high_score.max(score),
            ..self.with_phase(Phase::Finished { score })
        }
    }

    fn reject(&self, event: &Event) -> QuizError {
        QuizError::InvalidTransition {
            status: self.status(),
            event: event.to_string(),
        }
    }
}
