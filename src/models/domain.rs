use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "outcome", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub fn opposite(self) -> Outcome {
        match self {
            Outcome::Yes => Outcome::No,
            Outcome::No => Outcome::Yes,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Yes => write!(f, "yes"),
            Outcome::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Outcome::Yes),
            "no" => Ok(Outcome::No),
            other => Err(crate::errors::CoreError::InvalidParameter(format!(
                "unknown outcome: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "market_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    TradingClosed,
    Resolved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "market_mechanism", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarketMechanism {
    Lmsr,
    Clob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_side", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_intent", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderIntent {
    BuyYes,
    BuyNo,
    SellYes,
    SellNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "settlement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SettlementType {
    Transfer,
    Mint,
    Burn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "private_bet_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PrivateBetStatus {
    Open,
    Voting,
    Resolved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    Payout,
    Fee,
    Deposit,
    Withdraw,
    OrderFill,
    OrderCancel,
    BetStake,
    BetPayout,
    BetRefund,
    Referral,
    Daily,
    Bonus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    #[schema(value_type = String)]
    pub balance: Decimal,
    #[schema(value_type = String)]
    pub reserved_balance: Decimal,
    pub total_trades: i64,
    #[schema(value_type = String)]
    pub total_profit: Decimal,
    #[schema(value_type = String)]
    pub win_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn available_balance(&self) -> Decimal {
        self.balance - self.reserved_balance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Market {
    pub id: Uuid,
    pub title: String,
    pub status: MarketStatus,
    pub mechanism: MarketMechanism,
    #[schema(value_type = String)]
    pub q_yes: Decimal,
    #[schema(value_type = String)]
    pub q_no: Decimal,
    #[schema(value_type = String)]
    pub liquidity_b: Decimal,
    #[schema(value_type = String)]
    pub last_trade_price_yes: Option<Decimal>,
    pub closes_at: DateTime<Utc>,
    pub resolution_outcome: Option<Outcome>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub min_bet: Decimal,
    #[schema(value_type = String)]
    pub max_bet: Decimal,
    #[schema(value_type = String)]
    pub total_volume: Decimal,
    pub total_traders: i64,
    pub total_trades: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Uuid,
    pub outcome: Outcome,
    #[schema(value_type = String)]
    pub shares: Decimal,
    #[schema(value_type = String)]
    pub reserved_shares: Decimal,
    #[schema(value_type = String)]
    pub total_cost: Decimal,
    #[schema(value_type = String)]
    pub avg_price: Decimal,
}

impl Position {
    pub fn available_shares(&self) -> Decimal {
        self.shares - self.reserved_shares
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Uuid,
    pub side: OrderSide,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub filled_quantity: Decimal,
    pub status: OrderStatus,
    pub original_intent: OrderIntent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn remaining(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeFill {
    pub id: Uuid,
    pub market_id: Uuid,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[schema(value_type = String)]
    pub fee: Decimal,
    pub settlement_type: SettlementType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub market_id: Option<Uuid>,
    pub r#type: TransactionType,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub shares: Option<Decimal>,
    pub outcome: Option<Outcome>,
    #[schema(value_type = String)]
    pub price_at_trade: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceHistoryPoint {
    pub id: Uuid,
    pub market_id: Uuid,
    #[schema(value_type = String)]
    pub price_yes: Decimal,
    #[schema(value_type = String)]
    pub price_no: Decimal,
    #[schema(value_type = String)]
    pub q_yes: Decimal,
    #[schema(value_type = String)]
    pub q_no: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrivateBet {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub stake_amount: Decimal,
    pub invite_code: String,
    pub status: PrivateBetStatus,
    pub closes_at: DateTime<Utc>,
    pub voting_deadline: DateTime<Utc>,
    #[schema(value_type = String)]
    pub total_pool: Decimal,
    pub yes_count: i32,
    pub no_count: i32,
    pub yes_votes: i32,
    pub no_votes: i32,
    pub resolution_outcome: Option<Outcome>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrivateBetParticipant {
    pub id: Uuid,
    pub bet_id: Uuid,
    pub user_id: Uuid,
    pub outcome: Outcome,
    pub vote: Option<Outcome>,
    pub voted_at: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub payout: Option<Decimal>,
}

/// One price/quantity level in an aggregated order book snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookLevel {
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderBookSnapshot {
    pub market_id: Uuid,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}
