use crate::auth::Actor;
use crate::error::AppError;
use crate::models::CreateOfferBody;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use matching_engine::Acceptance;
use types::ids::{OfferId, RequestId};
use types::offer::{NewOffer, Offer};

pub async fn create_offer(
    State(state): State<AppState>,
    actor: Actor,
    request_id: Result<Path<RequestId>, PathRejection>,
    payload: Result<Json<CreateOfferBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    let Path(request_id) = request_id?;
    let Json(body) = payload?;

    // Providers always bid as themselves
    let mut draft = NewOffer::new(request_id, actor.user_id.as_str(), body.price);
    if let Some(message) = body.message {
        draft = draft.with_message(message);
    }
    let offer = state.engine.create_offer(draft)?;

    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn list_for_request(
    State(state): State<AppState>,
    _actor: Actor,
    request_id: Result<Path<RequestId>, PathRejection>,
) -> Result<Json<Vec<Offer>>, AppError> {
    let Path(request_id) = request_id?;
    Ok(Json(state.engine.list_offers_for_request(request_id)?))
}

pub async fn list_mine(State(state): State<AppState>, actor: Actor) -> Json<Vec<Offer>> {
    Json(state.engine.list_offers_for_provider(&actor.user_id))
}

pub async fn get_offer(
    State(state): State<AppState>,
    _actor: Actor,
    id: Result<Path<OfferId>, PathRejection>,
) -> Result<Json<Offer>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.get_offer(id)?))
}

pub async fn accept_offer(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<OfferId>, PathRejection>,
) -> Result<Json<Acceptance>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.accept_offer(id, &actor.user_id)?))
}

pub async fn reject_offer(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<OfferId>, PathRejection>,
) -> Result<Json<Offer>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.reject_offer(id, &actor.user_id)?))
}
