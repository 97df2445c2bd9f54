//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{info, instrument};

use crate::logic::{self, SubmitError};
use crate::preview;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_tracks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let mut tracks = Vec::with_capacity(state.track_order.len());
  for id in &state.track_order {
    if let Some(track) = state.get_track(id) {
      let status = state.progress.status(id).await;
      tracks.push(track_summary_out(track, &status));
    }
  }
  Json(TracksOut { tracks })
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_track(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.get_track(&id) {
    Some(track) => {
      let status = state.progress.status(&id).await;
      Json(track_to_out(track, &status)).into_response()
    }
    None => not_found("Unknown track."),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.get_track(&id) {
    Some(_) => {
      let status = state.progress.status(&id).await;
      Json(ProgressOut { track_id: id, status }).into_response()
    }
    None => not_found("Unknown track."),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.track_id, index = body.exercise_index))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> Response {
  let result = logic::submit(
    &state,
    &body.track_id,
    body.exercise_index,
    body.code.as_deref(),
    body.answer.as_deref(),
  )
  .await;

  match result {
    Ok(out) => {
      info!(target: "exercise", id = %body.track_id, index = body.exercise_index, passed = out.passed, "HTTP submit evaluated");
      Json(SubmitOut {
        submission_id: out.submission_id,
        passed: out.passed,
        message: out.message,
        failed_rules: out.failed_rules,
        status: out.status,
        advance_to: out.advance_to,
        advance_delay_ms: state.ui.advance_delay_ms,
        error_delay_ms: state.ui.error_delay_ms,
      })
      .into_response()
    }
    Err(e) => submit_error_response(e),
  }
}

/// Render the buffer into an isolated preview document.
///
/// JSON by default (`{document, sandbox}` for srcdoc embedding); with
/// `Accept: text/html` the raw document is returned carrying the CSP
/// sandbox directive, the strongest isolation the HTTP surface offers.
#[instrument(level = "info", skip(headers, body), fields(code_len = body.code.len()))]
pub async fn http_post_preview(headers: HeaderMap, Json(body): Json<PreviewIn>) -> Response {
  let doc = preview::render_isolated(&body.code);

  let wants_html = headers
    .get(header::ACCEPT)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.contains("text/html"))
    .unwrap_or(false);

  if wants_html {
    (
      [(header::CONTENT_SECURITY_POLICY, preview::csp_sandbox_header())],
      Html(doc.html),
    )
      .into_response()
  } else {
    Json(PreviewOut {
      document: doc.html,
      sandbox: preview::SANDBOX_GRANTS.iter().map(|s| (*s).to_string()).collect(),
    })
    .into_response()
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.track_id, index = body.exercise_index))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Json(body): Json<HintIn>,
) -> Response {
  match logic::get_hint(&state, &body.track_id, body.exercise_index, &body.code).await {
    Ok(hint) => Json(HintOut { hint }).into_response(),
    Err(e) => upstream_error(e),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.track_id, index = body.exercise_index))]
pub async fn http_post_feedback(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FeedbackIn>,
) -> Response {
  match logic::get_feedback(&state, &body.track_id, body.exercise_index, &body.code).await {
    Ok(feedback) => Json(FeedbackOut { feedback }).into_response(),
    Err(e) => upstream_error(e),
  }
}

// -------- Error responses --------

fn not_found(message: &str) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: message.to_string() })).into_response()
}

fn upstream_error(message: String) -> Response {
  (StatusCode::BAD_GATEWAY, Json(ErrorOut { error: message })).into_response()
}

fn submit_error_response(e: SubmitError) -> Response {
  let status = match e {
    SubmitError::UnknownTrack | SubmitError::UnknownExercise => StatusCode::NOT_FOUND,
    SubmitError::Locked => StatusCode::CONFLICT,
    SubmitError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
  };
  (status, Json(ErrorOut { error: e.to_string() })).into_response()
}
