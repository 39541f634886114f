// ABOUTME: Fetches the question list from the configured source (HTTP endpoint or local JSON file).
// ABOUTME: A single attempt per call; every failure is reported as a load failure.

use std::path::PathBuf;

use quizclock_core::{Question, QuizError, parse_questions, validate_questions};

use crate::config::{SourceConfig, SourceProvider};

/// Question source selected by provider configuration.
pub enum QuestionSource {
    Http {
        client: reqwest::Client,
        url: String,
    },
    File {
        path: PathBuf,
    },
}

impl QuestionSource {
    pub fn from_config(config: &SourceConfig) -> Self {
        match config.provider {
            SourceProvider::Http => {
                let client = reqwest::Client::builder()
                    .timeout(config.http.timeout())
                    .build()
                    .unwrap_or_else(|e| {
                        tracing::warn!("Failed to build HTTP client with timeout ({e}), using defaults");
                        reqwest::Client::new()
                    });
                Self::Http {
                    client,
                    url: config.http.url.clone(),
                }
            }
            SourceProvider::File => Self::File {
                path: PathBuf::from(&config.file.path),
            },
        }
    }

    /// Human-readable location, for logs.
    pub fn location(&self) -> String {
        match self {
            Self::Http { url, .. } => url.clone(),
            Self::File { path } => path.display().to_string(),
        }
    }

    /// Fetch and validate the question list.
    pub async fn fetch(&self) -> Result<Vec<Question>, QuizError> {
        match self {
            Self::Http { client, url } => fetch_http(client, url).await,
            Self::File { path } => fetch_file(path).await,
        }
    }
}

async fn fetch_http(client: &reqwest::Client, url: &str) -> Result<Vec<Question>, QuizError> {
    tracing::info!("Fetching questions from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| QuizError::LoadFailure(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(QuizError::LoadFailure(format!(
            "HTTP {} fetching {url}",
            response.status()
        )));
    }

    let questions: Vec<Question> = response
        .json()
        .await
        .map_err(|e| QuizError::LoadFailure(format!("malformed question payload from {url}: {e}")))?;
    validate_questions(&questions)?;
    Ok(questions)
}

async fn fetch_file(path: &std::path::Path) -> Result<Vec<Question>, QuizError> {
    tracing::info!("Reading questions from {}", path.display());

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QuizError::LoadFailure(format!("failed to read {}: {e}", path.display())))?;
    parse_questions(&contents)
}
