use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::errors::CoreError;
use crate::ledger;
use crate::models::domain::{Market, Order, OrderSide};

use super::settlement;

/// Matches `incoming` against resting orders on the opposite side,
/// price-time priority, exactly as `_match_order`: incoming BUY walks
/// asks ascending by price then age; incoming SELL walks bids descending
/// by price then age. Self-trades are skipped. Mutates `incoming` in
/// place and returns the number of fills executed.
pub async fn match_order(
    tx: &mut Transaction<'static, Postgres>,
    market: &Market,
    incoming: &mut Order,
    fee_rate: Decimal,
) -> Result<usize, CoreError> {
    let mut resting_orders =
        ledger::orders::lock_resting_for_match(&mut **tx, market.id, incoming.side).await?;

    // lock_resting_for_match already filters by status/side/order; apply
    // the price-crossing and self-trade filters the original query adds
    // via WHERE clauses on top of the shared ORDER BY.
    resting_orders.retain(|resting| {
        resting.user_id != incoming.user_id
            && match incoming.side {
                OrderSide::Buy => resting.price <= incoming.price,
                OrderSide::Sell => resting.price >= incoming.price,
            }
    });

    let mut fills = 0usize;
    for mut resting in resting_orders {
        let remaining = incoming.remaining();
        if remaining <= Decimal::ZERO {
            break;
        }
        let resting_remaining = resting.remaining();
        if resting_remaining <= Decimal::ZERO {
            continue;
        }

        let fill_qty = remaining.min(resting_remaining);
        let fill_price = resting.price;

        settlement::execute_fill(
            tx,
            market,
            incoming,
            &mut resting,
            fill_price,
            fill_qty,
            fee_rate,
        )
        .await?;
        fills += 1;
    }

    Ok(fills)
}
