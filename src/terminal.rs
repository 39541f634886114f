// ABOUTME: Line-oriented terminal front-end: renders published quiz states and reads player commands from stdin.
// ABOUTME: Renders a full screen on every visible change and a clock line while only the countdown moves.

use quizclock_core::{Intent, Medal, Phase, QuizState, format_clock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::controller::SessionHandle;

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Seconds left at which every tick is shown.
const CLOCK_URGENT_SECONDS: u32 = 10;

/// Drive the session from stdin until `quit`, end of input, or a closed session.
pub async fn run(handle: SessionHandle, mut states: watch::Receiver<QuizState>) -> Result<(), DynError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = states.borrow_and_update().clone();
    println!("{}", render(&shown));

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    tracing::info!("Session closed");
                    return Ok(());
                }
                let state = states.borrow_and_update().clone();
                if let Some(output) = update(&shown, &state) {
                    println!("{output}");
                }
                shown = state;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    handle.shutdown().await;
                    return Ok(());
                };
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }
                if command.eq_ignore_ascii_case("quit") || command.eq_ignore_ascii_case("exit") {
                    handle.shutdown().await;
                    return Ok(());
                }
                match command.parse::<Intent>() {
                    Ok(intent) => handle.send(intent).await?,
                    Err(e) => println!("{e}. Commands: start, answer <n>, next, restart, quit"),
                }
            }
        }
    }
}

/// What to print when the published state moves from `shown` to `next`.
/// Countdown-only changes print a clock line every ten seconds and every
/// second near the end; anything else redraws the screen.
pub fn update(shown: &QuizState, next: &QuizState) -> Option<String> {
    match (shown.seconds_remaining(), next.seconds_remaining()) {
        (Some(before), Some(after)) if before != after && same_screen(shown, next) => {
            (after % 10 == 0 || after <= CLOCK_URGENT_SECONDS)
                .then(|| format!("Time: {}", format_clock(after)))
        }
        _ if shown == next => None,
        _ => Some(render(next)),
    }
}

fn same_screen(a: &QuizState, b: &QuizState) -> bool {
    a.status() == b.status()
        && a.current_index() == b.current_index()
        && a.current_answer() == b.current_answer()
}

/// Render the full screen for a state.
pub fn render(state: &QuizState) -> String {
    match state.phase() {
        Phase::Loading => "Loading questions...".to_string(),
        Phase::Error => "There was an error fetching questions. Type `quit` to exit.".to_string(),
        Phase::Ready => format!(
            "Welcome to the quiz!\n{} questions to test your knowledge.\nType `start` to begin.",
            state.num_questions()
        ),
        Phase::Active(_) => render_question(state),
        Phase::Finished { .. } => render_result(state),
    }
}

fn render_question(state: &QuizState) -> String {
    let (Some(question), Some(progress)) = (state.current_question(), state.progress()) else {
        return String::new();
    };

    let mut out = format!(
        "Question {} / {}    {} / {} points    Time: {}\n\n{}\n",
        progress.question_number,
        progress.num_questions,
        progress.score,
        progress.total_points,
        format_clock(state.seconds_remaining().unwrap_or(0)),
        question.text,
    );
    for (i, option) in question.options.iter().enumerate() {
        let marker = if state.current_answer() == Some(i) { ">" } else { " " };
        out.push_str(&format!("{marker} {}) {option}\n", i + 1));
    }
    if progress.answered {
        let action = if progress.is_last { "finish" } else { "next" };
        out.push_str(&format!("Type `{action}` to continue."));
    } else {
        out.push_str("Type the number of your answer.");
    }
    out
}

fn render_result(state: &QuizState) -> String {
    let Some(outcome) = state.outcome() else {
        return String::new();
    };
    let medal = match outcome.medal() {
        Medal::Gold => "🥇",
        Medal::Silver => "🥈",
        Medal::Bronze => "🥉",
        Medal::Unranked => "😟",
    };
    format!(
        "{medal} You scored {} out of {} ({}%)\n(Highscore: {} points)\nType `restart` to play again.",
        outcome.score,
        outcome.total_points,
        outcome.percent(),
        outcome.high_score,
    )
}
