//! Request handlers. Each one unpacks the request, calls into `core`/`auth` and shapes the
//! JSON response; errors become responses through [`ApiError`].

use super::{
    AppState,
    dto::{AuthRequest, AuthResponse, InfoResponse, SendCoinRequest},
    error::ApiError,
    middleware::AuthenticatedUser,
};
use crate::core::{purchase::buy_item, snapshot::read_user_snapshot, transfer::transfer_coins};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::debug;

/// Units bought per `/api/buy/{item}` call.
const UNITS_PER_PURCHASE: i64 = 1;

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!("Malformed request body: {rejection}");
        ApiError::bad_request()
    })
}

/// `POST /api/auth`
pub async fn auth_handler(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = parse_body(payload)?;
    let token = state
        .auth
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(Json(AuthResponse { token }))
}

/// `GET /api/info`
pub async fn info_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<InfoResponse>, ApiError> {
    let snapshot = read_user_snapshot(&state.db, user_id).await?;
    Ok(Json(snapshot.into()))
}

/// `POST /api/sendCoin`
pub async fn send_coin_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = parse_body(payload)?;
    transfer_coins(&state.db, user_id, &request.to_user, request.amount).await?;
    Ok(StatusCode::OK)
}

/// `GET /api/buy/{item}`
pub async fn buy_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(item): Path<String>,
) -> Result<StatusCode, ApiError> {
    buy_item(&state.db, &state.catalog, user_id, &item, UNITS_PER_PURCHASE).await?;
    Ok(StatusCode::OK)
}
