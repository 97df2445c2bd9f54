//! Deterministic exercise grading.
//!
//! Flow:
//! 1) The submitted buffer is normalized (`normalize`).
//! 2) Every rule in the exercise's table is applied to the normalized text.
//! 3) All rules must match (logical AND); the outcome records which rules
//!    failed so callers can produce better-than-generic feedback.
//!
//! Grading is a pure function of (normalized code, rule table): no hidden
//! counters, no randomness, same result on every call.

use crate::domain::CompiledRule;

/// Normalize a submission before pattern matching.
///
/// Every stored rule pattern is authored against exactly this form:
/// lowercase, newlines/tabs/carriage-returns removed outright, remaining
/// whitespace runs collapsed to one space, ends trimmed. Changing any step
/// silently breaks every pattern in the tables.
pub fn normalize(code: &str) -> String {
  let lowered = code.to_lowercase();
  let mut out = String::with_capacity(lowered.len());
  let mut pending_space = false;
  for ch in lowered.chars() {
    match ch {
      '\n' | '\t' | '\r' => {} // removed, not replaced with a space
      c if c.is_whitespace() => pending_space = true,
      c => {
        if pending_space && !out.is_empty() {
          out.push(' ');
        }
        pending_space = false;
        out.push(c);
      }
    }
  }
  out
}

/// Outcome of grading one coding submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GradeOutcome {
  Passed,
  /// Descriptions of the rules that did not match, in table order.
  Failed { failed_rules: Vec<String> },
}

impl GradeOutcome {
  pub fn passed(&self) -> bool {
    matches!(self, GradeOutcome::Passed)
  }

  pub fn failed_rules(&self) -> &[String] {
    match self {
      GradeOutcome::Passed => &[],
      GradeOutcome::Failed { failed_rules } => failed_rules,
    }
  }
}

/// Apply a rule table to a submission. All rules must hold.
pub fn grade_code(rules: &[CompiledRule], code: &str) -> GradeOutcome {
  let clean = normalize(code);
  let failed: Vec<String> = rules
    .iter()
    .filter(|r| !r.regex.is_match(&clean))
    .map(|r| r.description.clone())
    .collect();
  if failed.is_empty() {
    GradeOutcome::Passed
  } else {
    GradeOutcome::Failed { failed_rules: failed }
  }
}

/// Multiple-choice grading: the selected option must equal the stored answer.
pub fn grade_choice(correct_answer: &str, answer: &str) -> bool {
  answer == correct_answer
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracks::builtin_tracks;

  fn rules_of(track_id: &str, index: usize) -> Vec<CompiledRule> {
    let tracks = builtin_tracks();
    let track = tracks
      .iter()
      .find(|t| t.id == track_id)
      .unwrap_or_else(|| panic!("missing builtin track {track_id}"));
    track.exercises[index].rules.clone()
  }

  #[test]
  fn normalize_collapses_and_lowercases() {
    let raw = "  H1 {\n\tColor:   RED;\r\n}  ";
    assert_eq!(normalize(raw), "h1 {color: red;}");
  }

  #[test]
  fn normalize_is_idempotent() {
    let samples = [
      "",
      "   ",
      "plain",
      "  H1 {\n  color: red;\n}\n<p>Hi   there</p>\t",
      "<!DOCTYPE html>\r\n<html>\r\n</html>",
    ];
    for s in samples {
      let once = normalize(s);
      assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
    }
  }

  #[test]
  fn grading_is_pure() {
    let rules = rules_of("css-beginner", 0);
    let code = "<style>h1 { color: red; } p { color: blue; }</style>";
    let first = grade_code(&rules, code);
    let second = grade_code(&rules, code);
    assert_eq!(first, second);
  }

  #[test]
  fn css_syntax_exercise_passes_with_both_rules() {
    let rules = rules_of("css-beginner", 0);
    let code = "<style>\n  h1 {\n    color: red;\n  }\n  p {\n    color: blue;\n  }\n</style>";
    assert!(grade_code(&rules, code).passed());
  }

  #[test]
  fn css_syntax_exercise_fails_without_paragraph_rule() {
    let rules = rules_of("css-beginner", 0);
    let code = "<style>h1 { color: red; }</style>";
    let outcome = grade_code(&rules, code);
    assert!(!outcome.passed());
    assert_eq!(outcome.failed_rules().len(), 1);
    assert!(outcome.failed_rules()[0].contains("paragraph"));
  }

  #[test]
  fn html_basic_page_exercise_matches_case_and_spacing_insensitively() {
    let rules = rules_of("html-beginner", 3);
    let code = "<body>\n  <H1>My   First Web Page</H1>\n  <p class=\"x\">Welcome to my website!</p>\n</body>";
    assert!(grade_code(&rules, code).passed());

    let without_p = "<body><h1>My First Web Page</h1></body>";
    assert!(!grade_code(&rules, without_p).passed());
  }

  #[test]
  fn failed_rules_come_back_in_table_order() {
    let rules = rules_of("js-beginner", 0);
    let outcome = grade_code(&rules, "<script>var x = 1;</script>");
    let failed = outcome.failed_rules();
    assert_eq!(failed.len(), rules.len());
    for (rule, failed) in rules.iter().zip(failed) {
      assert_eq!(&rule.description, failed);
    }
  }

  #[test]
  fn choice_grading_is_exact() {
    assert!(grade_choice("<!DOCTYPE html>", "<!DOCTYPE html>"));
    assert!(!grade_choice("<!DOCTYPE html>", "DOCTYPE html;"));
    assert!(!grade_choice("<!DOCTYPE html>", "<!doctype html>"));
  }
}
