use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::db::TradeFillRow;
use crate::models::domain::{SettlementType, TradeFill};

#[allow(clippy::too_many_arguments)]
pub async fn create<'e, E>(
    exec: E,
    market_id: Uuid,
    buy_order_id: Uuid,
    sell_order_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    price: Decimal,
    quantity: Decimal,
    fee: Decimal,
    settlement_type: SettlementType,
) -> Result<TradeFill, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, TradeFillRow>(
        "INSERT INTO trade_fills \
         (market_id, buy_order_id, sell_order_id, buyer_id, seller_id, price, quantity, fee, settlement_type) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(market_id)
    .bind(buy_order_id)
    .bind(sell_order_id)
    .bind(buyer_id)
    .bind(seller_id)
    .bind(price)
    .bind(quantity)
    .bind(fee)
    .bind(settlement_type)
    .fetch_one(exec)
    .await?;
    Ok(row.into())
}

pub async fn list_for_market<'e, E>(exec: E, market_id: Uuid, limit: i64) -> Result<Vec<TradeFill>, CoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, TradeFillRow>(
        "SELECT * FROM trade_fills WHERE market_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(market_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
