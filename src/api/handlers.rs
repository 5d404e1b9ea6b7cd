use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::*;
use crate::engine::{Invocation, RecommendationRequest};
use crate::server::AppState;
use crate::util::QueryParams;

/// `GET /api/python-recommendations`: run the engine and relay its output.
pub async fn forward_recommendations(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, ApiError> {
    let request = RecommendationRequest::from_query(&params, state.config.engine.default_limit)?;
    let invocation = Invocation::from(&request);

    let outcome = state.engine.run(&invocation).await?;
    Ok(Json(outcome.into_body()))
}

/// `GET /api/recommendations`: demo data, optionally preferring the engine.
pub async fn demo_recommendations(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ApiError> {
    let request = RecommendationRequest::from_query(&params, state.config.engine.default_limit)?;

    if state.config.demo.prefer_engine {
        match state.engine.run(&Invocation::from(&request)).await {
            Ok(outcome) if outcome.is_success() => {
                return Ok(Json(outcome.into_body()).into_response());
            }
            Ok(outcome) => {
                debug!(state = outcome.state(), "engine unavailable, serving demo data");
            }
            Err(e) => {
                warn!(error = %e, "engine error, serving demo data");
            }
        }
    }

    let data = state.demo.recommend(&request);
    Ok(Json(DemoResponse::new(request.kind, data)).into_response())
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
