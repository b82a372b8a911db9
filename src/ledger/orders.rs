use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::OrderRow;
use crate::models::domain::{Order, OrderIntent, OrderSide, OrderStatus};

pub async fn create<'e, E>(
    exec: E,
    user_id: Uuid,
    market_id: Uuid,
    side: OrderSide,
    price: Decimal,
    quantity: Decimal,
    original_intent: OrderIntent,
) -> Result<Order, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (user_id, market_id, side, price, quantity, original_intent) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(user_id)
    .bind(market_id)
    .bind(side)
    .bind(price)
    .bind(quantity)
    .bind(original_intent)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn get<'e, E>(exec: E, order_id: Uuid) -> Result<Order, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::OrderNotFound)?;
    Ok(row.into())
}

pub async fn lock_for_update<'e, E>(exec: E, order_id: Uuid) -> Result<Order, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::OrderNotFound)?;
    Ok(row.into())
}

/// Resting orders on the opposite side of `side`, ordered by price-time
/// priority and locked for the duration of the matching transaction.
/// Incoming BUY matches SELL asks ascending by price, then by age;
/// incoming SELL matches BUY bids descending by price, then by age —
/// exactly the ordering the original source's `_match_order` query uses.
pub async fn lock_resting_for_match<'e, E>(
    exec: E,
    market_id: Uuid,
    incoming_side: OrderSide,
) -> Result<Vec<Order>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let opposite = incoming_side.opposite();
    let query = match incoming_side {
        OrderSide::Buy => {
            "SELECT * FROM orders WHERE market_id = $1 AND side = $2 \
             AND status IN ('open', 'partially_filled') \
             ORDER BY price ASC, created_at ASC FOR UPDATE"
        }
        OrderSide::Sell => {
            "SELECT * FROM orders WHERE market_id = $1 AND side = $2 \
             AND status IN ('open', 'partially_filled') \
             ORDER BY price DESC, created_at ASC FOR UPDATE"
        }
    };
    let rows = sqlx::query_as::<_, OrderRow>(query)
        .bind(market_id)
        .bind(opposite)
        .fetch_all(exec)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn apply_fill<'e, E>(
    exec: E,
    order_id: Uuid,
    fill_quantity: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE orders SET filled_quantity = filled_quantity + $1, \
         status = CASE WHEN filled_quantity + $1 >= quantity THEN 'filled'::order_status \
                        ELSE 'partially_filled'::order_status END, \
         updated_at = now() \
         WHERE id = $2",
    )
    .bind(fill_quantity)
    .bind(order_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn cancel<'e, E>(exec: E, order_id: Uuid) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE orders SET status = 'cancelled', updated_at = now() \
         WHERE id = $1 AND status IN ('open', 'partially_filled')",
    )
    .bind(order_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn list_open_for_market<'e, E>(exec: E, market_id: Uuid) -> Result<Vec<Order>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE market_id = $1 AND status IN ('open', 'partially_filled') \
         FOR UPDATE",
    )
    .bind(market_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_open_for_market_readonly<'e, E>(
    exec: E,
    market_id: Uuid,
) -> Result<Vec<Order>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE market_id = $1 AND status IN ('open', 'partially_filled')",
    )
    .bind(market_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_for_user<'e, E>(exec: E, user_id: Uuid) -> Result<Vec<Order>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub fn is_resting(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Open | OrderStatus::PartiallyFilled)
}
