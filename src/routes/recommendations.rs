use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::{AuthenticatedUser, RequestId},
    models::Recommendations,
};

use super::AppState;

/// Handler for reading the caller's current recommendations
pub async fn fetch(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> AppResult<Json<Recommendations>> {
    tracing::debug!(request_id = %request_id, user_id = %user_id, "Fetching recommendations");

    let recommendations = state.engine.get_recommendations(&user_id).await?;
    Ok(Json(recommendations))
}
