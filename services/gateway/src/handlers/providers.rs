use crate::auth::Actor;
use crate::error::AppError;
use crate::models::RegisterProviderBody;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use types::provider::{NewProvider, Provider, ServiceSummary};

/// Register the caller as a provider, or update their entry
pub async fn register(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<RegisterProviderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Provider>), AppError> {
    let Json(body) = payload?;
    let provider = state.engine.directory().register(NewProvider::new(
        actor.user_id.as_str(),
        body.name,
        body.service_type,
    ))?;

    Ok((StatusCode::CREATED, Json(provider)))
}

pub async fn list(State(state): State<AppState>, _actor: Actor) -> Json<Vec<Provider>> {
    Json(state.engine.directory().list())
}

/// Service categories currently served by at least one active provider
pub async fn catalog(State(state): State<AppState>, _actor: Actor) -> Json<Vec<ServiceSummary>> {
    Json(state.engine.directory().services())
}
