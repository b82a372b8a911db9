use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::UserRow;
use crate::models::domain::User;

pub async fn get<'e, E>(exec: E, user_id: Uuid) -> Result<User, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::UserNotFound)?;
    Ok(row.into())
}

/// Locks the user row for the duration of the enclosing transaction.
pub async fn lock_for_update<'e, E>(exec: E, user_id: Uuid) -> Result<User, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::UserNotFound)?;
    Ok(row.into())
}

pub async fn get_by_external_id<'e, E>(exec: E, external_id: &str) -> Result<User, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE external_id = $1")
        .bind(external_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::UserNotFound)?;
    Ok(row.into())
}

pub async fn create<'e, E>(
    exec: E,
    external_id: &str,
    display_name: &str,
) -> Result<User, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (external_id, display_name) VALUES ($1, $2) RETURNING *",
    )
    .bind(external_id)
    .bind(display_name)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

/// Debits `amount` from `balance`. Caller must have already locked the row
/// with `lock_for_update` in the same transaction. Returns `InsufficientBalance`
/// if the check constraint `balance >= 0` would be violated.
pub async fn debit_balance<'e, E>(exec: E, user_id: Uuid, amount: Decimal) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE users SET balance = balance - $1 WHERE id = $2 AND balance >= $1",
    )
    .bind(amount)
    .bind(user_id)
    .execute(exec)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientBalance);
    }
    Ok(())
}

pub async fn credit_balance<'e, E>(exec: E, user_id: Uuid, amount: Decimal) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET balance = balance + $1 WHERE id = $2")
        .bind(amount)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Reserves `amount` of available balance for a resting CLOB order.
pub async fn reserve_balance<'e, E>(
    exec: E,
    user_id: Uuid,
    amount: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE users SET reserved_balance = reserved_balance + $1 \
         WHERE id = $2 AND balance - reserved_balance >= $1",
    )
    .bind(amount)
    .bind(user_id)
    .execute(exec)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientBalance);
    }
    Ok(())
}

pub async fn release_reservation<'e, E>(
    exec: E,
    user_id: Uuid,
    amount: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE users SET reserved_balance = GREATEST(reserved_balance - $1, 0) WHERE id = $2",
    )
    .bind(amount)
    .bind(user_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn increment_trade_count<'e, E>(exec: E, user_id: Uuid) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET total_trades = total_trades + 1 WHERE id = $1")
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn add_profit<'e, E>(exec: E, user_id: Uuid, delta: Decimal) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET total_profit = total_profit + $1 WHERE id = $2")
        .bind(delta)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Recomputes `win_rate` as `count(payout transactions) / total_trades`.
/// See `resolution::recompute_win_rate` for the accepted limitation this
/// formula carries over from the original source.
pub async fn set_win_rate<'e, E>(exec: E, user_id: Uuid, win_rate: Decimal) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET win_rate = $1 WHERE id = $2")
        .bind(win_rate)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn top_by_profit<'e, E>(exec: E, limit: i64) -> Result<Vec<User>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT * FROM users WHERE is_active ORDER BY total_profit DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
