use crate::handlers::{health, offers, providers, requests, ws};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/requests", post(requests::create_request))
        .route("/requests/open", get(requests::list_open))
        .route("/requests/mine", get(requests::list_mine))
        .route("/requests/{id}", get(requests::get_request))
        .route("/requests/{id}/cancel", post(requests::cancel_request))
        .route("/requests/{id}/start", post(requests::start_request))
        .route("/requests/{id}/complete", post(requests::complete_request))
        .route(
            "/requests/{id}/offers",
            post(offers::create_offer).get(offers::list_for_request),
        )
        .route("/offers/mine", get(offers::list_mine))
        .route("/offers/{id}", get(offers::get_offer))
        .route("/offers/{id}/accept", post(offers::accept_offer))
        .route("/offers/{id}/reject", post(offers::reject_offer))
        .route("/providers", post(providers::register).get(providers::list))
        .route("/services", get(providers::catalog))
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        .fallback(health::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
