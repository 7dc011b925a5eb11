use super::error::ApiResult;
use super::AppState;
use crate::recommend::{clamp_top_k, Recommendation};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<Recommendation>,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "n_items": state.recommender.len(),
        })),
    )
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    let top_k = clamp_top_k(request.top_k, state.default_top_k);
    let results = state.recommender.recommend(&request.query, top_k)?;
    debug!("Query {:?} -> {} results", request.query, results.len());

    Ok(Json(RecommendResponse {
        recommended_assessments: results,
    }))
}
