// ABOUTME: Read-only views derived from a quiz state for the presentation layer.
// ABOUTME: Progress while a session runs, outcome and medal once it finishes, clock formatting.

use crate::state::{Phase, QuizState};

/// Position and running score of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// One-based number of the current question.
    pub question_number: usize,
    pub num_questions: usize,
    pub score: u32,
    pub total_points: u32,
    /// Whether the current question has an answer, so the next action can be offered.
    pub answered: bool,
    pub is_last: bool,
}

/// Medal awarded for the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    Unranked,
}

/// Result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub score: u32,
    pub total_points: u32,
    pub high_score: u32,
}

impl Outcome {
    /// Percentage rounded up, as shown on the result screen.
    pub fn percent(&self) -> u32 {
        if self.total_points == 0 {
            return 0;
        }
        (u64::from(self.score) * 100).div_ceil(u64::from(self.total_points)) as u32
    }

    pub fn medal(&self) -> Medal {
        let scaled = u64::from(self.score) * 100;
        let total = u64::from(self.total_points);
        if total == 0 {
            Medal::Unranked
        } else if scaled == total * 100 {
            Medal::Gold
        } else if scaled >= total * 80 {
            Medal::Silver
        } else if scaled >= total * 60 {
            Medal::Bronze
        } else {
            Medal::Unranked
        }
    }
}

impl QuizState {
    /// Present only while a session is active.
    pub fn progress(&self) -> Option<Progress> {
        match self.phase() {
            Phase::Active(round) => Some(Progress {
                question_number: round.index() + 1,
                num_questions: self.num_questions(),
                score: self.score(),
                total_points: self.total_points(),
                answered: round.answer().is_some(),
                is_last: self.is_last_question(),
            }),
            _ => None,
        }
    }

    /// Present only once a session has finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase() {
            Phase::Finished { score } => Some(Outcome {
                score: *score,
                total_points: self.total_points(),
                high_score: self.high_score(),
            }),
            _ => None,
        }
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::question::Question;

    fn outcome(score: u32, total_points: u32) -> Outcome {
        Outcome {
            score,
            total_points,
            high_score: score,
        }
    }

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(450), "7:30");
    }

    #[test]
    fn percent_rounds_up() {
        assert_eq!(outcome(10, 30).percent(), 34);
        assert_eq!(outcome(30, 30).percent(), 100);
        assert_eq!(outcome(0, 30).percent(), 0);
    }

    #[test]
    fn medal_thresholds() {
        assert_eq!(outcome(100, 100).medal(), Medal::Gold);
        assert_eq!(outcome(99, 100).medal(), Medal::Silver);
        assert_eq!(outcome(80, 100).medal(), Medal::Silver);
        assert_eq!(outcome(79, 100).medal(), Medal::Bronze);
        assert_eq!(outcome(60, 100).medal(), Medal::Bronze);
        assert_eq!(outcome(59, 100).medal(), Medal::Unranked);
    }

    #[test]
    fn progress_and_outcome_follow_status() {
        let questions = vec![
            Question::new("a", vec!["x".into(), "y".into()], 1, 10),
            Question::new("b", vec!["x".into(), "y".into()], 0, 20),
        ];
        let ready = QuizState::default()
            .transition(&Event::QuestionsLoaded(questions.into()))
            .unwrap();
        assert_eq!(ready.progress(), None);
        assert_eq!(ready.outcome(), None);

        let active = ready
            .transition(&Event::Start)
            .and_then(|s| s.transition(&Event::AnswerSelected(1)))
            .unwrap();
        assert_eq!(
            active.progress(),
            Some(Progress {
                question_number: 1,
                num_questions: 2,
                score: 10,
                total_points: 30,
                answered: true,
                is_last: false,
            })
        );

        let finished = active
            .transition(&Event::Next)
            .and_then(|s| s.transition(&Event::Next))
            .unwrap();
        let result = finished.outcome().unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.total_points, 30);
        assert_eq!(result.high_score, 10);
        assert_eq!(result.medal(), Medal::Unranked);
    }
}
