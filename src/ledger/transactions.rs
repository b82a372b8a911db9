use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::TransactionRow;
use crate::models::domain::{Outcome, Transaction, TransactionType};

#[derive(Debug, Default, Clone)]
pub struct NewTransaction {
    pub market_id: Option<Uuid>,
    pub shares: Option<Decimal>,
    pub outcome: Option<Outcome>,
    pub price_at_trade: Option<Decimal>,
    pub description: Option<String>,
}

pub async fn record<'e, E>(
    exec: E,
    user_id: Uuid,
    r#type: TransactionType,
    amount: Decimal,
    extra: NewTransaction,
) -> Result<Transaction, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, TransactionRow>(
        "INSERT INTO transactions \
         (user_id, market_id, type, amount, shares, outcome, price_at_trade, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(user_id)
    .bind(extra.market_id)
    .bind(r#type)
    .bind(amount)
    .bind(extra.shares)
    .bind(extra.outcome)
    .bind(extra.price_at_trade)
    .bind(extra.description)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn list_for_user<'e, E>(exec: E, user_id: Uuid, limit: i64) -> Result<Vec<Transaction>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Count of `payout`-typed transactions ever recorded for a user. Used by
/// `resolution::recompute_win_rate`; see that function's doc comment for
/// the known conflation between genuine wins and cancellation refunds.
pub async fn count_payouts<'e, E>(exec: E, user_id: Uuid) -> Result<i64, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM transactions WHERE user_id = $1 AND type = 'payout'",
    )
    .bind(user_id)
    .fetch_one(exec)
    .await?;
    Ok(count)
}
