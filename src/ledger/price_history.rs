use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::PriceHistoryRow;
use crate::models::domain::PriceHistoryPoint;

pub async fn record<'e, E>(
    exec: E,
    market_id: Uuid,
    price_yes: Decimal,
    price_no: Decimal,
    q_yes: Decimal,
    q_no: Decimal,
) -> Result<PriceHistoryPoint, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PriceHistoryRow>(
        "INSERT INTO price_history (market_id, price_yes, price_no, q_yes, q_no) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(market_id)
    .bind(price_yes)
    .bind(price_no)
    .bind(q_yes)
    .bind(q_no)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn list_for_market<'e, E>(
    exec: E,
    market_id: Uuid,
    limit: i64,
) -> Result<Vec<PriceHistoryPoint>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT * FROM price_history WHERE market_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(market_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
