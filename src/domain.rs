//! Domain models used by the backend: exercise kinds/sources, grading rules, tracks.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// What kind of exercise is presented to the user?
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
  /// User edits a markup/script buffer; graded by the exercise's rule table.
  Coding,
  /// User picks one option; graded by exact equality with the stored answer.
  MultipleChoice,
}
impl Default for ExerciseKind {
  fn default() -> Self { ExerciseKind::Coding }
}

/// Where did we get the track from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
  BuiltIn,    // compiled-in tables
  ConfigBank, // user-provided TOML bank
}

/// One grading rule: a human-readable requirement plus the pattern that checks it.
/// Patterns are authored against `grader::normalize` output and are compiled
/// once when the track registry is built.
#[derive(Clone, Debug)]
pub struct CompiledRule {
  pub description: String,
  pub regex: Regex,
}

/// Core exercise structure held in the track registry.
///
/// Coding and multiple-choice exercises share the struct; the fields of the
/// inactive branch stay empty.
#[derive(Clone, Debug)]
pub struct Exercise {
  pub title: String,
  pub description: String,
  pub kind: ExerciseKind,

  // Coding fields
  pub task: String,
  pub initial_code: String,
  pub solution: String,
  pub hints: Vec<String>,
  pub rules: Vec<CompiledRule>,

  // Multiple-choice fields
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub explanation: String,
}

/// A finite ordered list of exercises with strict linear gating.
#[derive(Clone, Debug)]
pub struct Track {
  pub id: String,
  pub title: String,
  pub language: String, // free-form tag (e.g., "html", "css", "javascript")
  pub source: TrackSource,
  pub exercises: Vec<Exercise>,
}
