use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::MarketRow;
use crate::models::domain::{Market, MarketMechanism, MarketStatus, Outcome};

pub async fn get<'e, E>(exec: E, market_id: Uuid) -> Result<Market, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, MarketRow>("SELECT * FROM markets WHERE id = $1")
        .bind(market_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::MarketNotFound)?;
    Ok(row.into())
}

pub async fn lock_for_update<'e, E>(exec: E, market_id: Uuid) -> Result<Market, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, MarketRow>("SELECT * FROM markets WHERE id = $1 FOR UPDATE")
        .bind(market_id)
        .fetch_optional(exec)
        .await?
        .ok_or(CoreError::MarketNotFound)?;
    Ok(row.into())
}

pub async fn list_open<'e, E>(exec: E) -> Result<Vec<Market>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, MarketRow>(
        "SELECT * FROM markets WHERE status = 'open' ORDER BY created_at DESC",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[allow(clippy::too_many_arguments)]
pub async fn create<'e, E>(
    exec: E,
    title: &str,
    mechanism: MarketMechanism,
    liquidity_b: Decimal,
    closes_at: DateTime<Utc>,
    min_bet: Decimal,
    max_bet: Decimal,
) -> Result<Market, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, MarketRow>(
        "INSERT INTO markets (title, mechanism, liquidity_b, closes_at, min_bet, max_bet) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(title)
    .bind(mechanism)
    .bind(liquidity_b)
    .bind(closes_at)
    .bind(min_bet)
    .bind(max_bet)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

/// Admin-only mutation of the non-status market fields: title, trading
/// window, and per-trade bet limits. Does not touch `status`, LMSR state,
/// or aggregate stats, which only the trading/resolution paths mutate.
pub async fn update<'e, E>(
    exec: E,
    market_id: Uuid,
    title: Option<&str>,
    closes_at: Option<DateTime<Utc>>,
    min_bet: Option<Decimal>,
    max_bet: Option<Decimal>,
) -> Result<Market, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, MarketRow>(
        "UPDATE markets SET \
         title = COALESCE($1, title), \
         closes_at = COALESCE($2, closes_at), \
         min_bet = COALESCE($3, min_bet), \
         max_bet = COALESCE($4, max_bet) \
         WHERE id = $5 RETURNING *",
    )
    .bind(title)
    .bind(closes_at)
    .bind(min_bet)
    .bind(max_bet)
    .bind(market_id)
    .fetch_optional(exec)
    .await?
    .ok_or(CoreError::MarketNotFound)?;
    Ok(row.into())
}

pub async fn update_q<'e, E>(
    exec: E,
    market_id: Uuid,
    q_yes: Decimal,
    q_no: Decimal,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE markets SET q_yes = $1, q_no = $2 WHERE id = $3")
        .bind(q_yes)
        .bind(q_no)
        .bind(market_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn record_trade<'e, E>(
    exec: E,
    market_id: Uuid,
    volume: Decimal,
    last_trade_price_yes: Decimal,
    is_new_trader: bool,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE markets SET total_volume = total_volume + $1, \
         total_trades = total_trades + 1, \
         total_traders = total_traders + CASE WHEN $2 THEN 1 ELSE 0 END, \
         last_trade_price_yes = $3 \
         WHERE id = $4",
    )
    .bind(volume)
    .bind(is_new_trader)
    .bind(last_trade_price_yes)
    .bind(market_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn set_status<'e, E>(
    exec: E,
    market_id: Uuid,
    status: MarketStatus,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE markets SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(market_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn resolve<'e, E>(
    exec: E,
    market_id: Uuid,
    outcome: Outcome,
) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE markets SET status = 'resolved', resolution_outcome = $1, resolved_at = now() \
         WHERE id = $2",
    )
    .bind(outcome)
    .bind(market_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn cancel<'e, E>(exec: E, market_id: Uuid) -> Result<(), CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE markets SET status = 'cancelled', resolved_at = now() WHERE id = $1")
        .bind(market_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn list_expired_open<'e, E>(exec: E) -> Result<Vec<Market>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, MarketRow>(
        "SELECT * FROM markets WHERE status = 'open' AND closes_at <= now() FOR UPDATE",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
