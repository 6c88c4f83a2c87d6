use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::actors::messages::{ActorError, AppError};
use crate::actors::traits::ModelBackend;
use crate::models::{Flashcard, ModelSettings};
use crate::prompts;

// --- Constants ---
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_FLASHCARDS: usize = 10;

// Fallback parser for models that answer in "Q: ... A: ..." lines instead of JSON.
static QA_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^Q\d*[:.]?\s*(.+?)\s*$\n^A\d*[:.]?\s*(.+?)\s*$")
        .expect("Invalid regex: Q/A line pattern")
});

static JSON_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("Invalid regex: JSON array pattern"));

/// HTTP client for a llama-server style completion endpoint.
///
/// The inference service is an external collaborator; this client owns only
/// the request/response plumbing and the flashcard output parsing.
pub struct ModelClient {
    client: Client,
    server_url: String,
    auth_token: Option<String>,
    settings: ModelSettings,
}

impl ModelClient {
    pub fn new(server_url: String, auth_token: Option<String>, settings: ModelSettings) -> Self {
        Self {
            client: Client::new(),
            server_url,
            auth_token,
            settings,
        }
    }

    fn build_request(&self, endpoint: &str, payload: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let auth_value = format!("Bearer {}", token);
            if let Ok(value) = auth_value.parse() {
                headers.insert(AUTHORIZATION, value);
            }
        }

        self.client
            .post(format!("{}/{}", self.server_url, endpoint))
            .headers(headers)
            .json(payload)
    }

    async fn generate_completion(&self, prompt: String) -> Result<String, AppError> {
        info!("Requesting completion ({} chars of prompt)", prompt.len());

        let payload = serde_json::json!({
            "prompt": prompt,
            "stream": false,
            "n_predict": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system_prompt": self.settings.system_prompt,
        });

        let request_future = self.build_request("completion", &payload).send();

        let res = timeout(COMPLETION_TIMEOUT, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Actor(ActorError::Model(format!(
                "Completion request failed with status {}: {}",
                status, body
            ))));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Actor(ActorError::Model(e.to_string())))?;

        Ok(json["content"].as_str().unwrap_or("").trim().to_string())
    }
}

#[async_trait]
impl ModelBackend for ModelClient {
    async fn generate_summary(&self, content: &str) -> Result<String, AppError> {
        let prompt = prompts::summary_prompt(content);
        let summary = self.generate_completion(prompt).await?;

        if summary.is_empty() {
            return Err(AppError::Actor(ActorError::Model(
                "Model returned an empty summary".to_string(),
            )));
        }

        Ok(summary)
    }

    async fn generate_flashcards(
        &self,
        content: &str,
        summary: &str,
    ) -> Result<Vec<Flashcard>, AppError> {
        let prompt = prompts::flashcard_prompt(content, summary);
        let raw = self.generate_completion(prompt).await?;

        // The prompt ends with an opening bracket so the model usually
        // continues the JSON array from there.
        let candidate = if raw.trim_start().starts_with('[') {
            raw.clone()
        } else {
            format!("[{}", raw)
        };
        let cards = parse_flashcards(&candidate);
        if cards.is_empty() {
            warn!("Model output contained no parseable flashcards");
            return Err(AppError::Actor(ActorError::Model(
                "Model output contained no parseable flashcards".to_string(),
            )));
        }

        Ok(cards)
    }
}

/// Parses flashcards from model output: a JSON array when present, `Q:/A:`
/// lines otherwise.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    if let Some(m) = JSON_ARRAY.find(text) {
        if let Ok(cards) = serde_json::from_str::<Vec<Flashcard>>(m.as_str()) {
            let cards: Vec<Flashcard> = cards
                .into_iter()
                .filter(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty())
                .take(MAX_FLASHCARDS)
                .collect();
            if !cards.is_empty() {
                return cards;
            }
        }
    }

    QA_LINE
        .captures_iter(text)
        .map(|caps| Flashcard {
            question: caps[1].trim().to_string(),
            answer: caps[2].trim().to_string(),
            category: "generated".to_string(),
        })
        .take(MAX_FLASHCARDS)
        .collect()
}
