// ABOUTME: Quiz session controller: sole owner of the live quiz state and its serial event queue.
// ABOUTME: Turns load results, countdown ticks, and player intents into state-machine events and publishes each new state.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use quizclock_core::{Event, Intent, Question, QuizError, QuizState, Status};
use tokio::sync::{mpsc, watch};

use crate::config::TimerConfig;
use crate::timer::Countdown;

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can wake the controller, in arrival order.
#[derive(Debug)]
pub enum Trigger {
    Loaded(Result<Vec<Question>, QuizError>),
    Tick { epoch: u64 },
    Intent(Intent),
    Shutdown,
}

/// Handle for the presentation layer to send player intents.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Trigger>,
}

impl SessionHandle {
    pub async fn send(&self, intent: Intent) -> Result<(), DynError> {
        self.tx.send(Trigger::Intent(intent)).await?;
        Ok(())
    }

    /// Ask the controller to stop. Ignored if it already has.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Trigger::Shutdown).await;
    }
}

/// Owns one quiz session for the lifetime of the process.
pub struct Controller {
    state: QuizState,
    publisher: watch::Sender<QuizState>,
    tx: mpsc::Sender<Trigger>,
    rx: mpsc::Receiver<Trigger>,
    tick_period: Duration,
    countdown: Option<Countdown>,
    next_epoch: u64,
}

impl Controller {
    /// Create the controller and issue its single question load.
    /// Must be called from within a tokio runtime.
    pub fn new<F>(load: F, timer: &TimerConfig) -> Self
    where
        F: Future<Output = Result<Vec<Question>, QuizError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Trigger>(32);
        let state = QuizState::new(timer.seconds_per_question);
        let (publisher, _) = watch::channel(state.clone());

        let load_tx = tx.clone();
        tokio::spawn(async move {
            let result = load.await;
            let _ = load_tx.send(Trigger::Loaded(result)).await;
        });

        Self {
            state,
            publisher,
            tx,
            rx,
            tick_period: timer.tick_period(),
            countdown: None,
            next_epoch: 0,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.tx.clone(),
        }
    }

    /// Subscribe to every state the controller publishes.
    pub fn subscribe(&self) -> watch::Receiver<QuizState> {
        self.publisher.subscribe()
    }

    /// Apply one event. On success the new state is stored, the countdown is
    /// reconciled with it, and observers are notified. A rejected event leaves
    /// the state untouched and publishes nothing.
    pub fn dispatch(&mut self, event: Event) -> Result<&QuizState, QuizError> {
        let next = self.state.transition(&event)?;
        let previous = self.state.status();
        self.state = next;

        if previous != self.state.status() {
            tracing::info!("Quiz status {previous} -> {} on {event}", self.state.status());
        }

        self.sync_countdown();
        self.publisher.send_replace(self.state.clone());
        Ok(&self.state)
    }

    /// Process triggers one at a time until shutdown. Returns the final state.
    pub async fn run(mut self) -> QuizState {
        while let Some(trigger) = self.rx.recv().await {
            if self.handle_trigger(trigger).is_break() {
                break;
            }
        }
        self.stop_countdown();
        tracing::info!("Session controller stopped");
        self.state
    }

    fn handle_trigger(&mut self, trigger: Trigger) -> ControlFlow<()> {
        let event = match trigger {
            Trigger::Loaded(Ok(questions)) => {
                tracing::info!("Loaded {} questions", questions.len());
                Event::QuestionsLoaded(questions.into())
            }
            Trigger::Loaded(Err(e)) => {
                tracing::error!("Question load failed: {e}");
                Event::LoadFailed
            }
            Trigger::Tick { epoch } => {
                if self.countdown.as_ref().map(Countdown::epoch) != Some(epoch) {
                    tracing::debug!("Discarding tick from cancelled countdown {epoch}");
                    return ControlFlow::Continue(());
                }
                Event::Tick
            }
            Trigger::Intent(intent) => intent.into(),
            Trigger::Shutdown => return ControlFlow::Break(()),
        };

        if let Err(e) = self.dispatch(event) {
            tracing::debug!("Ignoring event: {e}");
        }
        ControlFlow::Continue(())
    }

    /// Keep exactly one countdown alive while active and none otherwise.
    fn sync_countdown(&mut self) {
        let active = self.state.status() == Status::Active;
        if active && self.countdown.is_none() {
            self.start_countdown();
        } else if !active {
            self.stop_countdown();
        }
    }

    fn start_countdown(&mut self) {
        debug_assert!(self.countdown.is_none(), "countdown already running");
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.countdown = Some(Countdown::start(epoch, self.tick_period, self.tx.clone()));
    }

    fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn questions() -> Vec<Question> {
        vec![
            Question::new("first", vec!["a".into(), "b".into()], 1, 10),
            Question::new("second", vec!["a".into(), "b".into(), "c".into()], 0, 20),
        ]
    }

    fn timer(seconds_per_question: u32) -> TimerConfig {
        TimerConfig {
            seconds_per_question,
            tick_millis: 1000,
        }
    }

    /// Controller whose load never completes, for driving events by hand.
    fn idle_controller(seconds_per_question: u32) -> Controller {
        Controller::new(std::future::pending(), &timer(seconds_per_question))
    }

    fn ready_controller(seconds_per_question: u32) -> Controller {
        let mut controller = idle_controller(seconds_per_question);
        controller
            .dispatch(Event::QuestionsLoaded(questions().into()))
            .unwrap();
        controller
    }

    async fn next_tick(controller: &mut Controller) {
        let trigger = controller.rx.recv().await.unwrap();
        assert!(matches!(trigger, Trigger::Tick { .. }), "expected tick, got {trigger:?}");
        assert!(controller.handle_trigger(trigger).is_continue());
    }

    #[tokio::test(start_paused = true)]
    async fn load_success_publishes_ready() {
        let controller = Controller::new(async { Ok::<_, QuizError>(questions()) }, &timer(30));
        let mut states = controller.subscribe();
        let session = tokio::spawn(controller.run());

        let ready = states.wait_for(|s| s.status() == Status::Ready).await.unwrap().clone();
        assert_eq!(ready.num_questions(), 2);
        assert_eq!(ready.seconds_remaining(), None);

        session.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_publishes_error() {
        let controller = Controller::new(
            async { Err::<Vec<Question>, _>(QuizError::LoadFailure("connection refused".to_string())) },
            &timer(30),
        );
        let handle = controller.handle();
        let mut states = controller.subscribe();
        let session = tokio::spawn(controller.run());

        states.wait_for(|s| s.status() == Status::Error).await.unwrap();

        // Nothing a player does leaves the error screen.
        handle.send(Intent::Start).await.unwrap();
        handle.shutdown().await;
        let final_state = session.await.unwrap();
        assert_eq!(final_state.status(), Status::Error);
        assert!(final_state.questions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_countdown_and_ticks_decrement() {
        let mut controller = ready_controller(30);
        controller.dispatch(Event::Start).unwrap();
        assert!(controller.countdown.is_some());
        assert_eq!(controller.state.seconds_remaining(), Some(60));

        next_tick(&mut controller).await;
        next_tick(&mut controller).await;
        assert_eq!(controller.state.seconds_remaining(), Some(58));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_reaching_zero_finishes_and_stops_timer() {
        let mut controller = ready_controller(1);
        let mut states = controller.subscribe();
        controller.dispatch(Event::Start).unwrap();
        controller.dispatch(Event::AnswerSelected(1)).unwrap();

        next_tick(&mut controller).await;
        assert_eq!(controller.state.seconds_remaining(), Some(1));
        next_tick(&mut controller).await;

        assert_eq!(controller.state.status(), Status::Finished);
        assert_eq!(controller.state.high_score(), 10);
        assert!(controller.countdown.is_none());
        assert_eq!(states.borrow_and_update().status(), Status::Finished);

        let no_more = tokio::time::timeout(Duration::from_secs(10), controller.rx.recv()).await;
        assert!(no_more.is_err(), "a tick arrived after the quiz finished");
    }

    #[tokio::test(start_paused = true)]
    async fn next_on_last_question_stops_timer() {
        let mut controller = ready_controller(30);
        controller.dispatch(Event::Start).unwrap();
        controller.dispatch(Event::Next).unwrap();
        assert!(controller.countdown.is_some());
        controller.dispatch(Event::Next).unwrap();

        assert_eq!(controller.state.status(), Status::Finished);
        assert!(controller.countdown.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tick_after_restart_is_discarded() {
        let mut controller = ready_controller(30);
        controller.dispatch(Event::Start).unwrap();
        let first_epoch = controller.countdown.as_ref().unwrap().epoch();
        controller.dispatch(Event::Next).unwrap();
        controller.dispatch(Event::Next).unwrap();
        controller.dispatch(Event::Restart).unwrap();
        assert!(controller.countdown.is_none());

        controller.dispatch(Event::Start).unwrap();
        let second_epoch = controller.countdown.as_ref().unwrap().epoch();
        assert_ne!(first_epoch, second_epoch);

        assert!(controller.handle_trigger(Trigger::Tick { epoch: first_epoch }).is_continue());
        assert_eq!(controller.state.seconds_remaining(), Some(60));

        next_tick(&mut controller).await;
        assert_eq!(controller.state.seconds_remaining(), Some(59));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_event_changes_and_publishes_nothing() {
        let mut controller = ready_controller(30);
        let mut states = controller.subscribe();
        states.borrow_and_update();
        let before = controller.state.clone();

        let err = controller.dispatch(Event::Next).unwrap_err();
        assert!(matches!(err, QuizError::InvalidTransition { status: Status::Ready, .. }));
        assert_eq!(controller.state, before);
        assert!(!states.has_changed().unwrap());
        assert!(controller.countdown.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_session_through_handle() {
        let controller = Controller::new(async { Ok::<_, QuizError>(questions()) }, &timer(30));
        let handle = controller.handle();
        let mut states = controller.subscribe();
        let session = tokio::spawn(controller.run());

        states.wait_for(|s| s.status() == Status::Ready).await.unwrap();
        for intent in [
            Intent::Start,
            Intent::Answer(1),
            Intent::Next,
            Intent::Answer(2),
            Intent::Next,
        ] {
            handle.send(intent).await.unwrap();
        }
        let finished = states
            .wait_for(|s| s.status() == Status::Finished)
            .await
            .unwrap()
            .clone();
        assert_eq!(finished.score(), 10);
        assert_eq!(finished.high_score(), 10);

        handle.send(Intent::Restart).await.unwrap();
        handle.shutdown().await;
        let final_state = session.await.unwrap();
        assert_eq!(final_state.status(), Status::Ready);
        assert_eq!(final_state.high_score(), 10);
        assert_eq!(final_state.num_questions(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn question_load_runs_once_per_controller() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let controller = Controller::new(
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, QuizError>(questions())
            },
            &timer(30),
        );
        let handle = controller.handle();
        let mut states = controller.subscribe();
        let session = tokio::spawn(controller.run());

        states.wait_for(|s| s.status() == Status::Ready).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        for intent in [Intent::Start, Intent::Next, Intent::Next, Intent::Restart, Intent::Start] {
            handle.send(intent).await.unwrap();
        }
        handle.shutdown().await;
        let final_state = session.await.unwrap();

        assert_eq!(final_state.status(), Status::Active);
        assert_eq!(final_state.num_questions(), 2);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn send_after_shutdown_fails() {
        let controller = idle_controller(30);
        let handle = controller.handle();
        let session = tokio::spawn(controller.run());
        handle.shutdown().await;
        session.await.unwrap();

        assert!(handle.send(Intent::Start).await.is_err());
    }
}
