//! Admin operations: `create_market`, `update_market`, `resolve_market`,
//! `cancel_market`. Every handler resolves the caller's
//! `admin_id` to their `external_id` and checks it against `ADMIN_IDS`,
//! mirroring the reference backend's admin-id allowlist gate.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::api::{CancelMarketRequest, CreateMarketRequest, ResolveMarketRequest, UpdateMarketRequest};
use crate::models::api::MarketResponse;
use crate::AppState;

async fn require_admin(state: &AppState, admin_id: Uuid) -> Result<(), CoreError> {
    let admin = crate::ledger::users::get(state.ledger.pool(), admin_id).await?;
    if !state.config.is_admin(&admin.external_id) {
        return Err(CoreError::Forbidden);
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/admin/markets",
    request_body = CreateMarketRequest,
    responses(
        (status = 200, description = "Market created", body = MarketResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "admin"
)]
pub async fn create_market(
    State(state): State<AppState>,
    Json(req): Json<CreateMarketRequest>,
) -> Result<Json<MarketResponse>, CoreError> {
    require_admin(&state, req.admin_id).await?;
    let market = crate::ledger::markets::create(
        state.ledger.pool(),
        &req.title,
        req.mechanism,
        req.liquidity_b,
        req.closes_at,
        req.min_bet,
        req.max_bet,
    )
    .await?;
    Ok(Json(MarketResponse(market)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/markets/{market_id}",
    params(("market_id" = Uuid, Path, description = "Market to update")),
    request_body = UpdateMarketRequest,
    responses(
        (status = 200, description = "Market updated", body = MarketResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Market not found"),
    ),
    tag = "admin"
)]
pub async fn update_market(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<UpdateMarketRequest>,
) -> Result<Json<MarketResponse>, CoreError> {
    require_admin(&state, req.admin_id).await?;
    let market = crate::ledger::markets::update(
        state.ledger.pool(),
        market_id,
        req.title.as_deref(),
        req.closes_at,
        req.min_bet,
        req.max_bet,
    )
    .await?;
    Ok(Json(MarketResponse(market)))
}

#[utoipa::path(
    post,
    path = "/api/admin/markets/{market_id}/resolve",
    params(("market_id" = Uuid, Path, description = "Market to resolve")),
    request_body = ResolveMarketRequest,
    responses(
        (status = 200, description = "Market resolved and positions paid out"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Market not found"),
    ),
    tag = "admin"
)]
pub async fn resolve_market(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<ResolveMarketRequest>,
) -> Result<Json<serde_json::Value>, CoreError> {
    require_admin(&state, req.admin_id).await?;
    let outcome =
        crate::resolution::resolve_market(&state.ledger, &state.notifier, market_id, req.outcome)
            .await?;
    state.book_view.invalidate(market_id).await;
    Ok(Json(serde_json::json!({
        "winners_count": outcome.winners_count,
        "total_positions": outcome.total_positions,
    })))
}

#[utoipa::path(
    post,
    path = "/api/admin/markets/{market_id}/cancel",
    params(("market_id" = Uuid, Path, description = "Market to cancel")),
    request_body = CancelMarketRequest,
    responses(
        (status = 200, description = "Market cancelled and positions refunded"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Market not found"),
    ),
    tag = "admin"
)]
pub async fn cancel_market(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<CancelMarketRequest>,
) -> Result<Json<serde_json::Value>, CoreError> {
    require_admin(&state, req.admin_id).await?;
    let outcome = crate::resolution::cancel_market(&state.ledger, market_id).await?;
    state.book_view.invalidate(market_id).await;
    Ok(Json(serde_json::json!({
        "refunded_positions": outcome.refunded_positions,
    })))
}
