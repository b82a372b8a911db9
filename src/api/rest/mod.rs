use axum::routing::{get, patch, post};
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod admin;
pub mod health;
pub mod orders;
pub mod private_bet;
pub mod trade;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PRC Markets API",
        version = "0.1.0",
        description = "Trading core for LMSR and CLOB prediction markets"
    ),
    paths(
        health::health_check,
        trade::buy,
        trade::sell,
        orders::place_order,
        orders::cancel_order,
        orders::book,
        admin::create_market,
        admin::update_market,
        admin::resolve_market,
        admin::cancel_market,
        private_bet::create,
        private_bet::join,
        private_bet::start_voting,
        private_bet::cast_vote,
        private_bet::lookup,
        private_bet::detail,
        private_bet::my_bets,
    ),
    components(
        schemas(
            crate::models::api::HealthResponse,
            crate::models::api::BuySharesRequest,
            crate::models::api::SellSharesRequest,
            crate::models::api::TradeResponse,
            crate::models::api::PlaceOrderRequest,
            crate::models::api::PlaceOrderResponse,
            crate::models::api::CancelOrderRequest,
            crate::models::api::CancelOrderResponse,
            crate::models::api::OrderBookLevelDto,
            crate::models::api::OrderBookResponse,
            crate::models::api::CreateMarketRequest,
            crate::models::api::UpdateMarketRequest,
            crate::models::api::ResolveMarketRequest,
            crate::models::api::CancelMarketRequest,
            crate::models::api::MarketResponse,
            crate::models::api::OrderResponse,
            crate::models::api::CreatePrivateBetRequest,
            crate::models::api::JoinPrivateBetRequest,
            crate::models::api::StartVotingRequest,
            crate::models::api::CastVoteRequest,
            crate::models::api::PrivateBetResponse,
            crate::models::domain::Market,
            crate::models::domain::Order,
            crate::models::domain::PrivateBet,
            crate::models::domain::MarketStatus,
            crate::models::domain::MarketMechanism,
            crate::models::domain::Outcome,
            crate::models::domain::OrderSide,
            crate::models::domain::OrderStatus,
            crate::models::domain::OrderIntent,
            crate::models::domain::PrivateBetStatus,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "trade", description = "LMSR buy/sell"),
        (name = "orders", description = "CLOB order placement, cancellation, and book view"),
        (name = "admin", description = "Market lifecycle administration"),
        (name = "private_bets", description = "Invite-only group bets"),
    )
)]
pub struct ApiDoc;

pub fn create_rest() -> Router<crate::AppState> {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/markets/{market_id}/buy", post(trade::buy))
        .route("/api/markets/{market_id}/sell", post(trade::sell))
        .route("/api/markets/{market_id}/orders", post(orders::place_order))
        .route("/api/orders/{order_id}/cancel", post(orders::cancel_order))
        .route("/api/markets/{market_id}/book", get(orders::book))
        .route("/api/admin/markets", post(admin::create_market))
        .route("/api/admin/markets/{market_id}", patch(admin::update_market))
        .route(
            "/api/admin/markets/{market_id}/resolve",
            post(admin::resolve_market),
        )
        .route(
            "/api/admin/markets/{market_id}/cancel",
            post(admin::cancel_market),
        )
        .route("/api/private-bets", post(private_bet::create))
        .route("/api/private-bets/join", post(private_bet::join))
        .route("/api/private-bets/mine", get(private_bet::my_bets))
        .route(
            "/api/private-bets/lookup/{invite_code}",
            get(private_bet::lookup),
        )
        .route(
            "/api/private-bets/{bet_id}/start-voting",
            post(private_bet::start_voting),
        )
        .route("/api/private-bets/{bet_id}/vote", post(private_bet::cast_vote))
        .route("/api/private-bets/{bet_id}", get(private_bet::detail))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
}
