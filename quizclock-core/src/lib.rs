// ABOUTME: Pure quiz state machine shared by the session controller and any presentation layer.
// ABOUTME: Defines questions, events, the quiz state with its transition function, and derived views.

mod error;
mod event;
mod question;
mod state;
mod summary;

pub use error::QuizError;
pub use event::{Event, Intent};
pub use question::{Question, parse_questions, total_points, validate_questions};
pub use state::{Phase, QuizState, Round, SECONDS_PER_QUESTION, Status};
pub use summary::{Medal, Outcome, Progress, format_clock};
