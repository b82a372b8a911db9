//! Request/response DTOs for the thin REST binding (`api::rest`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::domain::{
    Market, MarketMechanism, Order, Outcome, OrderIntent, OrderStatus, PrivateBet,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuySharesRequest {
    pub user_id: Uuid,
    pub outcome: Outcome,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SellSharesRequest {
    pub user_id: Uuid,
    pub outcome: Outcome,
    #[schema(value_type = String)]
    pub shares: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TradeResponse {
    #[schema(value_type = String)]
    pub shares: Decimal,
    #[schema(value_type = String)]
    pub cost_or_revenue: Decimal,
    #[schema(value_type = String)]
    pub fee: Decimal,
    #[schema(value_type = String)]
    pub price_yes: Decimal,
    #[schema(value_type = String)]
    pub price_no: Decimal,
    #[schema(value_type = String)]
    pub new_balance: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    pub intent: OrderIntent,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderBookLevelDto {
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub quantity: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderBookResponse {
    pub market_id: Uuid,
    pub bids: Vec<OrderBookLevelDto>,
    pub asks: Vec<OrderBookLevelDto>,
    #[schema(value_type = String)]
    pub last_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveMarketRequest {
    pub admin_id: Uuid,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelMarketRequest {
    pub admin_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrivateBetRequest {
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub stake_amount: Decimal,
    pub closes_at: chrono::DateTime<chrono::Utc>,
    pub creator_outcome: Outcome,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinPrivateBetRequest {
    pub user_id: Uuid,
    pub invite_code: String,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CastVoteRequest {
    pub user_id: Uuid,
    pub vote: Outcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub filled_quantity: Decimal,
    #[schema(value_type = String)]
    pub remaining: Decimal,
    pub fills_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelOrderResponse {
    pub order_id: Uuid,
    #[schema(value_type = String)]
    pub cancelled_quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMarketRequest {
    pub admin_id: Uuid,
    pub title: String,
    pub mechanism: MarketMechanism,
    #[schema(value_type = String)]
    pub liquidity_b: Decimal,
    pub closes_at: chrono::DateTime<chrono::Utc>,
    #[schema(value_type = String)]
    pub min_bet: Decimal,
    #[schema(value_type = String)]
    pub max_bet: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMarketRequest {
    pub admin_id: Uuid,
    pub title: Option<String>,
    pub closes_at: Option<chrono::DateTime<chrono::Utc>>,
    #[schema(value_type = String)]
    pub min_bet: Option<Decimal>,
    #[schema(value_type = String)]
    pub max_bet: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarketResponse(pub Market);

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse(pub Order);

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartVotingRequest {
    pub requester_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MyBetsQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrivateBetResponse(pub PrivateBet);
