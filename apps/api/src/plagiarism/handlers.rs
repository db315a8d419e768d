//! Axum route handlers for the Plagiarism API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::plagiarism::similarity::{compare, roster, Comparison, MatchMode};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub roll_no: String,
    /// Percentage in 0–100. Defaults to the configured threshold.
    pub threshold: Option<u32>,
    pub mode: Option<MatchMode>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub roll_no: String,
    pub threshold: u32,
    pub mode: MatchMode,
    #[serde(flatten)]
    pub comparison: Comparison,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub roll_numbers: Vec<String>,
    pub total_submissions: usize,
}

/// GET /api/v1/plagiarism/roster
///
/// Roll numbers that can be checked, sorted and de-duplicated.
pub async fn handle_roster(State(state): State<AppState>) -> Result<Json<RosterResponse>, AppError> {
    let submissions = state.store.load_all().await?;
    Ok(Json(RosterResponse {
        roll_numbers: roster(&submissions),
        total_submissions: submissions.len(),
    }))
}

/// POST /api/v1/plagiarism/check
///
/// Compares the roll number's submission against every other one in the store.
/// An empty result is a successful `no_match` outcome; a missing roll number or
/// too little text are errors.
pub async fn handle_check(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, AppError> {
    let roll_no = request.roll_no.trim().to_string();
    if roll_no.is_empty() {
        return Err(AppError::Validation("roll_no cannot be empty".to_string()));
    }
    let threshold = request.threshold.unwrap_or(state.config.default_threshold);
    let mode = request.mode.unwrap_or(state.config.match_mode);

    let submissions = state.store.load_all().await?;
    let comparison = compare(&submissions, &roll_no, threshold, mode)?;

    match &comparison {
        Comparison::BestMatch { best } => info!(
            "Plagiarism check for {roll_no}: best match {} at {}% (threshold {threshold})",
            best.roll_no, best.score
        ),
        Comparison::Ranked { matches } => info!(
            "Plagiarism check for {roll_no}: {} matches at or above {threshold}%",
            matches.len()
        ),
        Comparison::NoMatch => {
            info!("Plagiarism check for {roll_no}: nothing at or above {threshold}%")
        }
    }

    Ok(Json(CheckResponse {
        roll_no,
        threshold,
        mode,
        comparison,
    }))
}
