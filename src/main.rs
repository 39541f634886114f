// ABOUTME: Entry point for the quizclock timed quiz runner.
// ABOUTME: Wires configuration, the question source, the session controller, and the terminal front-end together.

mod config;
mod controller;
mod loader;
mod terminal;
mod timer;

use config::Config;
use controller::Controller;
use loader::QuestionSource;

type DynError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Register signal handlers early so they work during startup
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(signal) => signal,
        Err(e) => {
            tracing::error!("Fatal: failed to register SIGTERM handler: {e}");
            std::process::exit(1);
        }
    };

    tokio::select! {
        result = run() => {
            if let Err(e) = result {
                tracing::error!("Fatal: {e}");
                std::process::exit(1);
            }
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
        }
    }

    // A pending stdin read cannot be cancelled and would stall runtime shutdown
    std::process::exit(0);
}

async fn run() -> Result<(), DynError> {
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    let source = QuestionSource::from_config(&config.source);
    tracing::info!("Question source: {}", source.location());

    // The controller issues the one load attempt as soon as it exists
    let controller = Controller::new(async move { source.fetch().await }, &config.timer);
    let handle = controller.handle();
    let states = controller.subscribe();
    let session = tokio::spawn(controller.run());

    terminal::run(handle, states).await?;

    let final_state = session.await?;
    tracing::info!("Quiz closed, high score {}", final_state.high_score());
    Ok(())
}
