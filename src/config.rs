//! Loading service configuration (prompts + UI timing + optional track bank) from TOML.
//!
//! See `AppConfig`, `Prompts`, and `UiTiming` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::ExerciseKind;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub ui: UiTiming,
  #[serde(default)]
  pub tracks: Vec<TrackCfg>,
}

/// UI banner timings, echoed to clients with every grading response.
/// Presentation hints only; the server never sleeps on them.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct UiTiming {
  #[serde(default = "default_banner_ms")]
  pub advance_delay_ms: u64,
  #[serde(default = "default_banner_ms")]
  pub error_delay_ms: u64,
}
fn default_banner_ms() -> u64 { 2000 }
impl Default for UiTiming {
  fn default() -> Self {
    Self { advance_delay_ms: default_banner_ms(), error_delay_ms: default_banner_ms() }
  }
}

/// Track entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct TrackCfg {
  pub id: String,
  pub title: String,
  #[serde(default)] pub language: String,
  #[serde(default)] pub exercises: Vec<ExerciseCfg>,
}

/// Exercise entry accepted in TOML configuration.
/// Only one of the branches (coding vs multiple-choice) should be filled.
#[derive(Clone, Debug, Deserialize)]
pub struct ExerciseCfg {
  #[serde(default)] pub kind: Option<ExerciseKind>,
  pub title: String,
  #[serde(default)] pub description: String,
  // coding
  #[serde(default)] pub task: String,
  #[serde(default)] pub initial_code: String,
  #[serde(default)] pub solution: String,
  #[serde(default)] pub hints: Vec<String>,
  #[serde(default)] pub rules: Vec<RuleCfg>,
  // multiple choice
  #[serde(default)] pub question: String,
  #[serde(default)] pub options: Vec<String>,
  #[serde(default)] pub correct_answer: String,
  #[serde(default)] pub explanation: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuleCfg {
  pub description: String,
  pub pattern: String,
}

/// Prompts used by the OpenAI client. Defaults are tuned for front-end
/// exercise feedback; override them in TOML to adjust tone/structure.
/// `{language}`, `{title}`, `{task}`, and `{code}` are filled per request.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub feedback_system_template: String,
  pub feedback_user_template: String,
  pub hint_system: String,
  pub hint_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      feedback_system_template: "You are an expert {language} teaching assistant. Analyze the student's {language} code for the given exercise. Respond in this format:\n\nExercise: <exercise title>\n✅ Correct: <what is correct>\n❌ Mistakes: <list mistakes>\n💡 Tip: <one actionable tip>.\nBe encouraging and keep response under 100 words.".into(),
      feedback_user_template: "Exercise Title: {title}\n\nHere is the student's {language} code:\n\n{code}\n\nRespond in the format: Exercise, ✅ Correct, ❌ Mistakes, 💡 Tip.".into(),
      hint_system: "You are a front-end coding coach. Give ONE concise hint (< 25 words) toward the task and do NOT reveal the full solution.".into(),
      hint_user_template: "Task: {task}\n\nStudent's current {language} code:\n\n{code}\n\nGive one nudge in the right direction.".into(),
    }
  }
}

/// Attempt to load `AppConfig` from CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "webcraft_backend", %path, "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "webcraft_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "webcraft_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
