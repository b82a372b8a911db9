//! Row-level sqlx mappings. Kept distinct from `models::domain` so a schema
//! column rename doesn't ripple through business logic — mirrors the
//! reference backend's `UserRow -> User` split.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::domain::{
    MarketMechanism, MarketStatus, Outcome, PrivateBetStatus, SettlementType, TransactionType,
};
use super::domain::{Order, OrderIntent, OrderSide, OrderStatus};
use super::domain::{Market, PriceHistoryPoint, PrivateBet, PrivateBetParticipant, Position, TradeFill, Transaction, User};

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub balance: Decimal,
    pub reserved_balance: Decimal,
    pub total_trades: i64,
    pub total_profit: Decimal,
    pub win_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            external_id: r.external_id,
            display_name: r.display_name,
            balance: r.balance,
            reserved_balance: r.reserved_balance,
            total_trades: r.total_trades,
            total_profit: r.total_profit,
            win_rate: r.win_rate,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MarketRow {
    pub id: Uuid,
    pub title: String,
    pub status: MarketStatus,
    pub mechanism: MarketMechanism,
    pub q_yes: Decimal,
    pub q_no: Decimal,
    pub liquidity_b: Decimal,
    pub last_trade_price_yes: Option<Decimal>,
    pub closes_at: DateTime<Utc>,
    pub resolution_outcome: Option<Outcome>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub min_bet: Decimal,
    pub max_bet: Decimal,
    pub total_volume: Decimal,
    pub total_traders: i64,
    pub total_trades: i64,
    pub created_at: DateTime<Utc>,
}

impl From<MarketRow> for Market {
    fn from(r: MarketRow) -> Self {
        Market {
            id: r.id,
            title: r.title,
            status: r.status,
            mechanism: r.mechanism,
            q_yes: r.q_yes,
            q_no: r.q_no,
            liquidity_b: r.liquidity_b,
            last_trade_price_yes: r.last_trade_price_yes,
            closes_at: r.closes_at,
            resolution_outcome: r.resolution_outcome,
            resolved_at: r.resolved_at,
            min_bet: r.min_bet,
            max_bet: r.max_bet,
            total_volume: r.total_volume,
            total_traders: r.total_traders,
            total_trades: r.total_trades,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PositionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Uuid,
    pub outcome: Outcome,
    pub shares: Decimal,
    pub reserved_shares: Decimal,
    pub total_cost: Decimal,
    pub avg_price: Decimal,
}

impl From<PositionRow> for Position {
    fn from(r: PositionRow) -> Self {
        Position {
            id: r.id,
            user_id: r.user_id,
            market_id: r.market_id,
            outcome: r.outcome,
            shares: r.shares,
            reserved_shares: r.reserved_shares,
            total_cost: r.total_cost,
            avg_price: r.avg_price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Uuid,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    pub status: OrderStatus,
    pub original_intent: OrderIntent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Order {
            id: r.id,
            user_id: r.user_id,
            market_id: r.market_id,
            side: r.side,
            price: r.price,
            quantity: r.quantity,
            filled_quantity: r.filled_quantity,
            status: r.status,
            original_intent: r.original_intent,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TradeFillRow {
    pub id: Uuid,
    pub market_id: Uuid,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    pub settlement_type: SettlementType,
    pub created_at: DateTime<Utc>,
}

impl From<TradeFillRow> for TradeFill {
    fn from(r: TradeFillRow) -> Self {
        TradeFill {
            id: r.id,
            market_id: r.market_id,
            buy_order_id: r.buy_order_id,
            sell_order_id: r.sell_order_id,
            buyer_id: r.buyer_id,
            seller_id: r.seller_id,
            price: r.price,
            quantity: r.quantity,
            fee: r.fee,
            settlement_type: r.settlement_type,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Option<Uuid>,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub shares: Option<Decimal>,
    pub outcome: Option<Outcome>,
    pub price_at_trade: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(r: TransactionRow) -> Self {
        Transaction {
            id: r.id,
            user_id: r.user_id,
            market_id: r.market_id,
            r#type: r.r#type,
            amount: r.amount,
            shares: r.shares,
            outcome: r.outcome,
            price_at_trade: r.price_at_trade,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: Uuid,
    pub market_id: Uuid,
    pub price_yes: Decimal,
    pub price_no: Decimal,
    pub q_yes: Decimal,
    pub q_no: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<PriceHistoryRow> for PriceHistoryPoint {
    fn from(r: PriceHistoryRow) -> Self {
        PriceHistoryPoint {
            id: r.id,
            market_id: r.market_id,
            price_yes: r.price_yes,
            price_no: r.price_no,
            q_yes: r.q_yes,
            q_no: r.q_no,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PrivateBetRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub stake_amount: Decimal,
    pub invite_code: String,
    pub status: PrivateBetStatus,
    pub closes_at: DateTime<Utc>,
    pub voting_deadline: DateTime<Utc>,
    pub total_pool: Decimal,
    pub yes_count: i32,
    pub no_count: i32,
    pub yes_votes: i32,
    pub no_votes: i32,
    pub resolution_outcome: Option<Outcome>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PrivateBetRow> for PrivateBet {
    fn from(r: PrivateBetRow) -> Self {
        PrivateBet {
            id: r.id,
            creator_id: r.creator_id,
            title: r.title,
            description: r.description,
            stake_amount: r.stake_amount,
            invite_code: r.invite_code,
            status: r.status,
            closes_at: r.closes_at,
            voting_deadline: r.voting_deadline,
            total_pool: r.total_pool,
            yes_count: r.yes_count,
            no_count: r.no_count,
            yes_votes: r.yes_votes,
            no_votes: r.no_votes,
            resolution_outcome: r.resolution_outcome,
            resolved_at: r.resolved_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PrivateBetParticipantRow {
    pub id: Uuid,
    pub bet_id: Uuid,
    pub user_id: Uuid,
    pub outcome: Outcome,
    pub vote: Option<Outcome>,
    pub voted_at: Option<DateTime<Utc>>,
    pub payout: Option<Decimal>,
}

impl From<PrivateBetParticipantRow> for PrivateBetParticipant {
    fn from(r: PrivateBetParticipantRow) -> Self {
        PrivateBetParticipant {
            id: r.id,
            bet_id: r.bet_id,
            user_id: r.user_id,
            outcome: r.outcome,
            vote: r.vote,
            voted_at: r.voted_at,
            payout: r.payout,
        }
    }
}
