//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request plain text. Calls are
//! instrumented and log model names, latencies, and response sizes (not
//! contents). Single request per operation, no retry policy: callers decide
//! whether to fall back locally or relay the failure.
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model =
      std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model, strong_model })
  }

  /// Plain-text chat completion. Used for hints and feedback.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_plain(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      max_tokens: Some(256),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "webcraft-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// One concise nudge toward the active exercise's task. Fast model.
  #[instrument(level = "info", skip(self, prompts, task, code), fields(%language, task_len = task.len(), code_len = code.len()))]
  pub async fn exercise_hint(
    &self,
    prompts: &Prompts,
    language: &str,
    task: &str,
    code: &str,
  ) -> Result<String, String> {
    let user = fill_template(
      &prompts.hint_user_template,
      &[("task", task), ("language", language), ("code", code)],
    );
    self.chat_plain(&self.fast_model, &prompts.hint_system, &user, 0.2).await
  }

  /// Structured feedback on a submission. Strong model.
  #[instrument(level = "info", skip(self, prompts, title, code), fields(%language, code_len = code.len()))]
  pub async fn code_feedback(
    &self,
    prompts: &Prompts,
    language: &str,
    title: &str,
    code: &str,
  ) -> Result<String, String> {
    let system = fill_template(&prompts.feedback_system_template, &[("language", language)]);
    let user = fill_template(
      &prompts.feedback_user_template,
      &[("title", title), ("language", language), ("code", code)],
    );
    self.chat_plain(&self.strong_model, &system, &user, 0.7).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
