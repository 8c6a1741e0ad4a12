use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthenticatedUser, RequestId},
    models::{PreferenceSubmission, RecommendationStrategy, Recommendations},
};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StrategyQuery {
    #[serde(default)]
    pub strategy: RecommendationStrategy,
}

/// Handler for preference submission
///
/// Recomputes and stores the caller's recommendations, then returns them.
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    query: Result<Query<StrategyQuery>, QueryRejection>,
    payload: Result<Json<PreferenceSubmission>, JsonRejection>,
) -> AppResult<Json<Recommendations>> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let Json(submission) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        strategy = query.strategy.as_str(),
        "Preference submission received"
    );

    let recommendations = state
        .engine
        .submit_preferences(&user_id, submission, query.strategy)
        .await?;
    Ok(Json(recommendations))
}
