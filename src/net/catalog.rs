//! Problems, quizzes, and internships. Responses are rendered as-is, so they
//! stay as JSON values; grading and enrollment rules live server-side.

use serde_json::{Value, json};

use super::http::{ApiClient, path_segment};
use super::types::unwrap_list;
use crate::error::ApiError;

/// List problems via `GET /problems`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn problems(client: &ApiClient) -> Result<Value, ApiError> {
    let raw: Value = client.get_json("/problems").await?;
    Ok(unwrap_list(raw, "problems"))
}

/// Fetch one problem via `GET /problems/{id}`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn problem(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    client.get_json(&format!("/problems/{}", path_segment(id))).await
}

/// List quizzes via `GET /quizzes`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn quizzes(client: &ApiClient) -> Result<Value, ApiError> {
    let raw: Value = client.get_json("/quizzes").await?;
    Ok(unwrap_list(raw, "quizzes"))
}

/// Fetch one quiz via `GET /quizzes/{id}`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn quiz(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    client.get_json(&format!("/quizzes/{}", path_segment(id))).await
}

/// Submit answers; the backend grades and returns the result document.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn submit_quiz(client: &ApiClient, id: &str, answers: &Value) -> Result<Value, ApiError> {
    client
        .post_json(&format!("/quizzes/{}/submit", path_segment(id)), &json!({ "answers": answers }))
        .await
}

/// List internships via `GET /internships`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn internships(client: &ApiClient) -> Result<Value, ApiError> {
    let raw: Value = client.get_json("/internships").await?;
    Ok(unwrap_list(raw, "internships"))
}

/// Fetch one internship via `GET /internships/{id}`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn internship(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    client.get_json(&format!("/internships/{}", path_segment(id))).await
}

/// Enroll the signed-in user via `POST /internships/{id}/enroll`.
///
/// # Errors
///
/// Returns `Unauthorized` without a session, otherwise the mapped `ApiError`.
pub async fn enroll_internship(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    client
        .post_json(&format!("/internships/{}/enroll", path_segment(id)), &json!({}))
        .await
}
