//! LMSR trading endpoints: `buy`/`sell`.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::api::{BuySharesRequest, SellSharesRequest, TradeResponse};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/markets/{market_id}/buy",
    params(("market_id" = Uuid, Path, description = "Target market id")),
    request_body = BuySharesRequest,
    responses(
        (status = 200, description = "Trade executed", body = TradeResponse),
        (status = 400, description = "Validation or state error"),
        (status = 404, description = "Market or user not found"),
    ),
    tag = "trade"
)]
pub async fn buy(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<BuySharesRequest>,
) -> Result<Json<TradeResponse>, CoreError> {
    let outcome = crate::amm::buy(
        &state.ledger,
        req.user_id,
        market_id,
        req.outcome,
        req.amount,
        state.config.trade_fee_rate,
    )
    .await?;
    state.book_view.invalidate(market_id).await;
    Ok(Json(TradeResponse {
        shares: outcome.shares,
        cost_or_revenue: req.amount,
        fee: outcome.fee,
        price_yes: outcome.price_yes,
        price_no: outcome.price_no,
        new_balance: outcome.new_balance,
    }))
}

#[utoipa::path(
    post,
    path = "/api/markets/{market_id}/sell",
    params(("market_id" = Uuid, Path, description = "Target market id")),
    request_body = SellSharesRequest,
    responses(
        (status = 200, description = "Trade executed", body = TradeResponse),
        (status = 400, description = "Validation or state error"),
        (status = 404, description = "Market or user not found"),
    ),
    tag = "trade"
)]
pub async fn sell(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<SellSharesRequest>,
) -> Result<Json<TradeResponse>, CoreError> {
    let outcome = crate::amm::sell(&state.ledger, req.user_id, market_id, req.outcome, req.shares)
        .await?;
    state.book_view.invalidate(market_id).await;
    Ok(Json(TradeResponse {
        shares: req.shares,
        cost_or_revenue: outcome.revenue,
        fee: rust_decimal::Decimal::ZERO,
        price_yes: outcome.price_yes,
        price_no: outcome.price_no,
        new_balance: outcome.new_balance,
    }))
}
