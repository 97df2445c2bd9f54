//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Submitting an exercise (grade, gate, persist, advance)
//!   - Generating hints (OpenAI fast model or authored-hint fallback)
//!   - Generating feedback (OpenAI strong model or deterministic rule report)

use rand::seq::SliceRandom;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::ExerciseKind;
use crate::grader::{grade_choice, grade_code, GradeOutcome};
use crate::progress::{can_access, StatusMap};
use crate::state::AppState;

pub const PASSED_MESSAGE: &str = "🎉 Congratulations! You've completed this exercise!";
pub const MISMATCH_MESSAGE: &str = "Not quite right! Check the requirements and try again.";
pub const WRONG_ANSWER_MESSAGE: &str = "Wrong Answer! Try again.";

/// Why a submission could not be graded at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitError {
  UnknownTrack,
  UnknownExercise,
  /// Gating does not grant access to this exercise yet.
  Locked,
  /// The request is missing the field this exercise kind grades on.
  MissingField(&'static str),
}

impl std::fmt::Display for SubmitError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SubmitError::UnknownTrack => write!(f, "Unknown track."),
      SubmitError::UnknownExercise => write!(f, "Unknown exercise index."),
      SubmitError::Locked => write!(f, "Exercise is locked. Complete the previous exercise first."),
      SubmitError::MissingField(field) => write!(f, "Missing required field: {field}."),
    }
  }
}

/// Result of a graded submission.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
  pub submission_id: String,
  pub passed: bool,
  pub message: String,
  pub failed_rules: Vec<String>,
  pub status: StatusMap,
  pub advance_to: Option<usize>,
}

/// Grade one submission against the active exercise.
///
/// Gating is checked before grading AND re-checked inside the store when
/// recording the pass, so a locked exercise can never be marked passed no
/// matter how the caller got here.
#[instrument(level = "info", skip(state, code, answer), fields(%track_id, exercise_index))]
pub async fn submit(
  state: &AppState,
  track_id: &str,
  exercise_index: usize,
  code: Option<&str>,
  answer: Option<&str>,
) -> Result<SubmitOutcome, SubmitError> {
  let track = state.get_track(track_id).ok_or(SubmitError::UnknownTrack)?;
  let exercise = track.exercises.get(exercise_index).ok_or(SubmitError::UnknownExercise)?;

  let status = state.progress.status(track_id).await;
  if !can_access(&status, exercise_index) {
    return Err(SubmitError::Locked);
  }

  let (passed, failed_rules, message) = match exercise.kind {
    ExerciseKind::Coding => {
      let code = code.ok_or(SubmitError::MissingField("code"))?;
      match grade_code(&exercise.rules, code) {
        GradeOutcome::Passed => (true, Vec::new(), PASSED_MESSAGE.to_string()),
        GradeOutcome::Failed { failed_rules } => {
          (false, failed_rules, MISMATCH_MESSAGE.to_string())
        }
      }
    }
    ExerciseKind::MultipleChoice => {
      let answer = answer.ok_or(SubmitError::MissingField("answer"))?;
      if grade_choice(&exercise.correct_answer, answer) {
        (true, Vec::new(), PASSED_MESSAGE.to_string())
      } else {
        (false, Vec::new(), WRONG_ANSWER_MESSAGE.to_string())
      }
    }
  };

  let submission_id = Uuid::new_v4().to_string();

  let (status, advance_to) = if passed {
    let status = state
      .progress
      .mark_passed(track_id, exercise_index)
      .await
      .map_err(|_| SubmitError::Locked)?;
    let next = exercise_index + 1;
    let advance_to = (next < track.exercises.len()).then_some(next);
    (status, advance_to)
  } else {
    (status, None)
  };

  info!(target: "exercise", %track_id, exercise_index, %submission_id, passed, failed = failed_rules.len(), "Submission graded");

  Ok(SubmitOutcome { submission_id, passed, message, failed_rules, status, advance_to })
}

/// One nudge toward the active exercise. OpenAI when configured; otherwise an
/// authored hint. An upstream failure is relayed as Err for the handler to
/// surface, per the endpoints' pass-through error contract.
#[instrument(level = "info", skip(state, code), fields(%track_id, exercise_index, code_len = code.len()))]
pub async fn get_hint(
  state: &AppState,
  track_id: &str,
  exercise_index: usize,
  code: &str,
) -> Result<String, String> {
  let Some((track, exercise)) = state.get_exercise(track_id, exercise_index) else {
    return Ok("No hint: unknown exercise.".into());
  };

  if let Some(oa) = &state.openai {
    match oa.exercise_hint(&state.prompts, &track.language, &exercise.task, code).await {
      Ok(t) => Ok(t),
      Err(e) => {
        error!(target: "exercise", %track_id, exercise_index, error = %e, "OpenAI hint failed");
        Err(e)
      }
    }
  } else {
    Ok(local_hint(exercise))
  }
}

/// Feedback on a submission. OpenAI when configured; otherwise a
/// deterministic report built from the grading rule table.
#[instrument(level = "info", skip(state, code), fields(%track_id, exercise_index, code_len = code.len()))]
pub async fn get_feedback(
  state: &AppState,
  track_id: &str,
  exercise_index: usize,
  code: &str,
) -> Result<String, String> {
  let Some((track, exercise)) = state.get_exercise(track_id, exercise_index) else {
    return Ok("No feedback: unknown exercise.".into());
  };

  if let Some(oa) = &state.openai {
    match oa.code_feedback(&state.prompts, &track.language, &exercise.title, code).await {
      Ok(t) => Ok(t),
      Err(e) => {
        error!(target: "exercise", %track_id, exercise_index, error = %e, "OpenAI feedback failed");
        Err(e)
      }
    }
  } else {
    Ok(local_feedback(exercise, code))
  }
}

// -------- Local fallbacks --------

/// Pick one of the exercise's authored hints at random.
fn local_hint(exercise: &crate::domain::Exercise) -> String {
  match exercise.hints.choose(&mut rand::thread_rng()) {
    Some(h) => h.clone(),
    None => "Re-read the question and rule out the options that are clearly wrong.".into(),
  }
}

/// Deterministic feedback from the rule table: which requirements the current
/// buffer satisfies and which it still misses.
fn local_feedback(exercise: &crate::domain::Exercise, code: &str) -> String {
  if !matches!(exercise.kind, ExerciseKind::Coding) {
    return "Feedback is available for coding exercises; for quiz questions, check the explanation after answering.".into();
  }
  match grade_code(&exercise.rules, code) {
    GradeOutcome::Passed => format!("Exercise: {}\n✅ Your code meets every requirement.", exercise.title),
    GradeOutcome::Failed { failed_rules } => {
      let mut out = format!("Exercise: {}\n❌ Still missing:", exercise.title);
      for rule in failed_rules {
        out.push_str("\n- ");
        out.push_str(&rule);
      }
      out
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn submit_grades_and_advances_in_order() {
    let state = AppState::for_tests();

    // multiple-choice first exercise of the html track
    let out = submit(&state, "html-beginner", 0, None, Some("<!DOCTYPE html>"))
      .await
      .expect("gradable");
    assert!(out.passed);
    assert_eq!(out.advance_to, Some(1));
    assert_eq!(out.status.get(&0), Some(&true));
  }

  #[tokio::test]
  async fn submit_rejects_locked_exercises() {
    let state = AppState::for_tests();
    let err = submit(&state, "css-beginner", 1, Some("whatever"), None).await.unwrap_err();
    assert_eq!(err, SubmitError::Locked);
    // nothing was recorded
    assert!(state.progress.status("css-beginner").await.is_empty());
  }

  #[tokio::test]
  async fn failed_submission_leaves_state_unchanged() {
    let state = AppState::for_tests();
    let out = submit(&state, "css-beginner", 0, Some("h1 { color: green; }"), None)
      .await
      .expect("gradable");
    assert!(!out.passed);
    assert_eq!(out.message, MISMATCH_MESSAGE);
    assert_eq!(out.advance_to, None);
    assert!(!state.progress.status("css-beginner").await.get(&0).copied().unwrap_or(false));
  }

  #[tokio::test]
  async fn last_exercise_has_nothing_to_advance_to() {
    let state = AppState::for_tests();
    for (i, answer) in
      [(0, "<!DOCTYPE html>"), (1, "<html>, <head>, and <body>"), (2, "<h1>")]
    {
      let out = submit(&state, "html-beginner", i, None, Some(answer)).await.expect("gradable");
      assert!(out.passed, "expected MC exercise {i} to pass");
    }
    let code = "<h1>My First Web Page</h1><p>Welcome to my website!</p>";
    let out = submit(&state, "html-beginner", 3, Some(code), None).await.expect("gradable");
    assert!(out.passed);
    assert_eq!(out.advance_to, None);
  }

  #[tokio::test]
  async fn missing_field_is_reported() {
    let state = AppState::for_tests();
    let err = submit(&state, "css-beginner", 0, None, None).await.unwrap_err();
    assert_eq!(err, SubmitError::MissingField("code"));
  }

  #[tokio::test]
  async fn local_feedback_reports_missing_requirements() {
    let state = AppState::for_tests();
    let feedback = get_feedback(&state, "css-beginner", 0, "h1 { color: red; }")
      .await
      .expect("local fallback");
    assert!(feedback.contains("Still missing"));
    assert!(feedback.contains("paragraph"));
  }

  #[tokio::test]
  async fn local_hint_comes_from_authored_hints() {
    let state = AppState::for_tests();
    let (_, exercise) = state.get_exercise("css-beginner", 0).expect("exists");
    let hint = get_hint(&state, "css-beginner", 0, "").await.expect("local fallback");
    assert!(exercise.hints.contains(&hint));
  }
}
