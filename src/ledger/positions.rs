use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::PositionRow;
use crate::models::domain::{Outcome, Position};

/// Inserts a zeroed position row.
pub async fn create_zero<'e, E>(
    exec: E,
    user_id: Uuid,
    market_id: Uuid,
    outcome: Outcome,
) -> Result<Position, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PositionRow>(
        "INSERT INTO positions (user_id, market_id, outcome) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(market_id)
    .bind(outcome)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

/// Locks the caller's position row, creating a zeroed one if it doesn't
/// exist yet. Mirrors the original source's `_get_or_create_position`,
/// which does the same lock-then-create dance under `with_for_update`.
/// Returns `(position, created)`.
pub async fn get_for_update_or_create<'e, E>(
    exec: E,
    user_id: Uuid,
    market_id: Uuid,
    outcome: Outcome,
) -> Result<(Position, bool), CoreError>
where
    E: Executor<'e, Database = Postgres> + Copy,
{
    let existing = sqlx::query_as::<_, PositionRow>(
        "SELECT * FROM positions WHERE user_id = $1 AND market_id = $2 AND outcome = $3 \
         FOR UPDATE",
    )
    .bind(user_id)
    .bind(market_id)
    .bind(outcome)
    .fetch_optional(exec)
    .await?;

    if let Some(row) = existing {
        return Ok((row.into(), false));
    }

    let created = create_zero(exec, user_id, market_id, outcome).await?;
    Ok((created, true))
}

pub async fn set_shares_and_cost<'e, E>(
    exec: E,
    position_id: Uuid,
    shares: Decimal,
    total_cost: Decimal,
    avg_price: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE positions SET shares = $1, total_cost = $2, avg_price = $3 WHERE id = $4",
    )
    .bind(shares)
    .bind(total_cost)
    .bind(avg_price)
    .bind(position_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn reserve_shares<'e, E>(
    exec: E,
    position_id: Uuid,
    quantity: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE positions SET reserved_shares = reserved_shares + $1 \
         WHERE id = $2 AND shares - reserved_shares >= $1",
    )
    .bind(quantity)
    .bind(position_id)
    .execute(exec)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientShares);
    }
    Ok(())
}

pub async fn release_reserved_shares<'e, E>(
    exec: E,
    position_id: Uuid,
    quantity: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE positions SET reserved_shares = GREATEST(reserved_shares - $1, 0) WHERE id = $2",
    )
    .bind(quantity)
    .bind(position_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn transfer_shares<'e, E>(
    exec: E,
    position_id: Uuid,
    delta: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE positions SET shares = shares + $1 WHERE id = $2")
        .bind(delta)
        .bind(position_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn list_by_market<'e, E>(exec: E, market_id: Uuid) -> Result<Vec<Position>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PositionRow>(
        "SELECT * FROM positions WHERE market_id = $1 AND shares > 0 FOR UPDATE",
    )
    .bind(market_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
