use crate::auth::Actor;
use crate::error::AppError;
use crate::models::{CreateRequestBody, OpenRequestsQuery};
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use types::ids::{RequestId, ServiceType};
use types::request::{NewRequest, Request};

pub async fn create_request(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Request>), AppError> {
    let Json(body) = payload?;

    // The requester is always the caller
    let draft = NewRequest {
        requester_id: actor.user_id.as_str().to_string(),
        service_type: body.service_type,
        description: body.description,
        address: body.address,
        location: body.location,
    };
    let request = state.engine.create_request(draft)?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_open(
    State(state): State<AppState>,
    _actor: Actor,
    query: Result<Query<OpenRequestsQuery>, QueryRejection>,
) -> Result<Json<Vec<Request>>, AppError> {
    let Query(query) = query?;
    // A blank filter means no filter
    let service_type = query.service_type.and_then(|s| ServiceType::try_new(s));

    Ok(Json(state.engine.list_open_requests(service_type.as_ref())))
}

pub async fn list_mine(State(state): State<AppState>, actor: Actor) -> Json<Vec<Request>> {
    Json(state.engine.list_requests_by_requester(&actor.user_id))
}

pub async fn get_request(
    State(state): State<AppState>,
    _actor: Actor,
    id: Result<Path<RequestId>, PathRejection>,
) -> Result<Json<Request>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.get_request(id)?))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<RequestId>, PathRejection>,
) -> Result<Json<Request>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.cancel_request(id, &actor.user_id)?))
}

pub async fn start_request(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<RequestId>, PathRejection>,
) -> Result<Json<Request>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.start_request(id, &actor.user_id)?))
}

pub async fn complete_request(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<RequestId>, PathRejection>,
) -> Result<Json<Request>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.engine.complete_request(id, &actor.user_id)?))
}
