use axum::{
    extract::Request,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api::{ApiError, DemoCatalog};
use crate::config::Config;
use crate::engine::RecommendationEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn RecommendationEngine>,
    pub demo: Arc<DemoCatalog>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn RecommendationEngine>, demo: DemoCatalog) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            demo: Arc::new(demo),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/python-recommendations",
            get(crate::api::forward_recommendations),
        )
        .route("/api/recommendations", get(crate::api::demo_recommendations))
        .route("/health", get(crate::api::health));

    let mut router = Router::new().merge(api_routes).fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        // Missing files and non-GET methods go to the same fallback, which
        // keeps OPTIONS preflight working.
        let static_files = ServeDir::new(appdir)
            .call_fallback_on_method_not_allowed(true)
            .fallback(fallback_handler.into_service());
        router = router.fallback_service(static_files);
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    // CORS preflight for paths without a route.
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
