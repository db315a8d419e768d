//! Axum route handlers for the Submissions API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::submission::Submission;
use crate::state::AppState;
use crate::submissions::intake::{submit, IntakeResponse, SubmissionForm};

/// POST /api/v1/submissions
///
/// Multipart form with `roll_no`, `name` and the assignment `file`.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    let mut roll_no = None;
    let mut name = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "roll_no" => roll_no = Some(read_text(field).await?),
            "name" => name = Some(read_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read file: {e}")))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (file_name, contents) =
        upload.ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let response = submit(
        &state,
        SubmissionForm {
            roll_no: roll_no.unwrap_or_default(),
            name: name.unwrap_or_default(),
            file_name,
            contents,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/submissions
///
/// Every stored submission in append order.
pub async fn handle_list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(state.store.load_all().await?))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("could not read form field: {e}")))
}
