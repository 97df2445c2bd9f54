//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//! Wire field names are camelCase, as the SPA client sends them.

use serde::{Deserialize, Serialize};

use crate::domain::{Exercise, ExerciseKind, Track, TrackSource};
use crate::progress::{can_access, StatusMap};

//
// Track listing and detail
//

#[derive(Debug, Serialize)]
pub struct TrackSummaryOut {
    pub id: String,
    pub title: String,
    pub language: String,
    pub source: TrackSource,
    #[serde(rename = "exerciseCount")]
    pub exercise_count: usize,
    #[serde(rename = "completedCount")]
    pub completed_count: usize,
}

#[derive(Debug, Serialize)]
pub struct TracksOut {
    pub tracks: Vec<TrackSummaryOut>,
}

/// DTO for one exercise, as seen by the client.
///
/// The stored correct answer of a multiple-choice exercise never ships;
/// grading is server-side. The explanation ships once the exercise is passed.
#[derive(Debug, Serialize)]
pub struct ExerciseOut {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub kind: ExerciseKind,

    pub task: String,
    #[serde(rename = "initialCode")]
    pub initial_code: String,
    pub solution: String,
    pub hints: Vec<String>,
    /// Human-readable grading requirements (rule descriptions, table order).
    pub requirements: Vec<String>,

    pub question: String,
    pub options: Vec<String>,
    pub explanation: String,

    pub completed: bool,
    pub accessible: bool,
}

#[derive(Debug, Serialize)]
pub struct TrackOut {
    pub id: String,
    pub title: String,
    pub language: String,
    pub source: TrackSource,
    pub exercises: Vec<ExerciseOut>,
}

/// Convert a full `Track` (internal) to the public DTO, folding in progress.
pub fn track_to_out(track: &Track, status: &StatusMap) -> TrackOut {
    TrackOut {
        id: track.id.clone(),
        title: track.title.clone(),
        language: track.language.clone(),
        source: track.source.clone(),
        exercises: track
            .exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| exercise_to_out(i, ex, status))
            .collect(),
    }
}

pub fn track_summary_out(track: &Track, status: &StatusMap) -> TrackSummaryOut {
    TrackSummaryOut {
        id: track.id.clone(),
        title: track.title.clone(),
        language: track.language.clone(),
        source: track.source.clone(),
        exercise_count: track.exercises.len(),
        completed_count: status.values().filter(|done| **done).count(),
    }
}

fn exercise_to_out(index: usize, ex: &Exercise, status: &StatusMap) -> ExerciseOut {
    let completed = status.get(&index).copied().unwrap_or(false);
    ExerciseOut {
        index,
        title: ex.title.clone(),
        description: ex.description.clone(),
        kind: ex.kind.clone(),

        task: ex.task.clone(),
        initial_code: ex.initial_code.clone(),
        solution: ex.solution.clone(),
        hints: ex.hints.clone(),
        requirements: ex.rules.iter().map(|r| r.description.clone()).collect(),

        question: ex.question.clone(),
        options: ex.options.clone(),
        explanation: if completed { ex.explanation.clone() } else { String::new() },

        completed,
        accessible: can_access(status, index),
    }
}

//
// Submission
//

#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "exerciseIndex")]
    pub exercise_index: usize,
    /// Coding submissions carry the buffer...
    #[serde(default)]
    pub code: Option<String>,
    /// ...multiple-choice submissions carry the selected option.
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitOut {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub passed: bool,
    pub message: String,
    #[serde(rename = "failedRules")]
    pub failed_rules: Vec<String>,
    pub status: StatusMap,
    #[serde(rename = "advanceTo")]
    pub advance_to: Option<usize>,
    #[serde(rename = "advanceDelayMs")]
    pub advance_delay_ms: u64,
    #[serde(rename = "errorDelayMs")]
    pub error_delay_ms: u64,
}

//
// Progress
//

#[derive(Debug, Serialize)]
pub struct ProgressOut {
    #[serde(rename = "trackId")]
    pub track_id: String,
    pub status: StatusMap,
}

//
// Preview
//

#[derive(Debug, Deserialize)]
pub struct PreviewIn {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewOut {
    pub document: String,
    pub sandbox: Vec<String>,
}

//
// AI hint / feedback
//

#[derive(Debug, Deserialize)]
pub struct HintIn {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "exerciseIndex")]
    pub exercise_index: usize,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub hint: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackIn {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "exerciseIndex")]
    pub exercise_index: usize,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackOut {
    pub feedback: String,
}

//
// Shared
//

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
