//! CLOB endpoints: `place_order`, `cancel_order`, `book`.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::api::{
    CancelOrderRequest, CancelOrderResponse, OrderBookLevelDto, OrderBookResponse,
    PlaceOrderRequest, PlaceOrderResponse,
};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/markets/{market_id}/orders",
    params(("market_id" = Uuid, Path, description = "Target market id")),
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed (and possibly matched)", body = PlaceOrderResponse),
        (status = 400, description = "Validation or state error"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, CoreError> {
    let outcome = crate::orderbook::place_order(
        &state.ledger,
        req.user_id,
        market_id,
        req.intent,
        req.price,
        req.quantity,
        state.config.trade_fee_rate,
    )
    .await?;
    state.book_view.invalidate(market_id).await;
    Ok(Json(PlaceOrderResponse {
        order_id: outcome.order.id,
        status: outcome.order.status,
        filled_quantity: outcome.order.filled_quantity,
        remaining: outcome.order.remaining(),
        fills_count: outcome.fills,
    }))
}

#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/cancel",
    params(("order_id" = Uuid, Path, description = "Order to cancel")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = CancelOrderResponse),
        (status = 403, description = "Order not owned by caller"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<CancelOrderResponse>, CoreError> {
    let order = crate::ledger::orders::get(state.ledger.pool(), order_id).await?;
    let cancelled_quantity =
        crate::orderbook::cancel_order(&state.ledger, req.user_id, order_id).await?;
    state.book_view.invalidate(order.market_id).await;
    Ok(Json(CancelOrderResponse {
        order_id,
        cancelled_quantity,
    }))
}

#[utoipa::path(
    get,
    path = "/api/markets/{market_id}/book",
    params(("market_id" = Uuid, Path, description = "Target market id")),
    responses(
        (status = 200, description = "Aggregated order book", body = OrderBookResponse),
        (status = 404, description = "Market not found"),
    ),
    tag = "orders"
)]
pub async fn book(
    State(state): State<AppState>,
    Path(market_id): Path<Uuid>,
) -> Result<Json<OrderBookResponse>, CoreError> {
    let market = crate::ledger::markets::get(state.ledger.pool(), market_id).await?;
    let snapshot = state.book_view.get(&state.ledger, market_id).await?;
    Ok(Json(OrderBookResponse {
        market_id,
        bids: snapshot
            .bids
            .iter()
            .map(|l| OrderBookLevelDto {
                price: l.price,
                quantity: l.quantity,
            })
            .collect(),
        asks: snapshot
            .asks
            .iter()
            .map(|l| OrderBookLevelDto {
                price: l.price,
                quantity: l.quantity,
            })
            .collect(),
        last_price: market.last_trade_price_yes,
    }))
}
