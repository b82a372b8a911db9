pub mod intent;
pub mod matcher;
pub mod settlement;
pub mod view;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::transactions::NewTransaction;
use crate::ledger::Ledger;
use crate::models::domain::{
    MarketMechanism, MarketStatus, Order, OrderIntent, OrderStatus, TransactionType,
};

pub struct PlaceOrderOutcome {
    pub order: Order,
    pub fills: usize,
}

/// Places an order: validates price/quantity, translates the intent to a
/// book (side, price), reserves the caller's collateral (cash for
/// buy_yes/buy_no, shares for sell_yes/sell_no), inserts the order row,
/// and matches it against the resting book. Mirrors `place_order` +
/// `_match_order` from the order-book service this module is grounded on.
pub async fn place_order(
    ledger: &Ledger,
    user_id: Uuid,
    market_id: Uuid,
    order_intent: OrderIntent,
    intent_price: Decimal,
    quantity: Decimal,
    fee_rate: Decimal,
) -> Result<PlaceOrderOutcome, CoreError> {
    if intent_price < Decimal::new(1, 2) || intent_price > Decimal::new(99, 2) {
        return Err(CoreError::InvalidPrice(
            "price must be between 0.01 and 0.99".to_string(),
        ));
    }
    if quantity <= Decimal::ZERO {
        return Err(CoreError::InvalidQuantity(
            "quantity must be positive".to_string(),
        ));
    }

    let (side, book_price) = intent::translate(order_intent, intent_price);

    ledger
        .run_serializable(|mut tx| async move {
            let market = crate::ledger::markets::lock_for_update(&mut *tx, market_id).await?;
            if market.status != MarketStatus::Open {
                return Err(CoreError::MarketNotOpen);
            }
            if market.mechanism != MarketMechanism::Clob {
                return Err(CoreError::WrongMechanism);
            }

            crate::ledger::users::lock_for_update(&mut *tx, user_id).await?;

            if intent::reserves_cash(order_intent) {
                let reserve_amount = intent_price * quantity;
                crate::ledger::users::reserve_balance(&mut *tx, user_id, reserve_amount).await?;
            } else {
                let outcome = intent::outcome_of(order_intent);
                let (position, _) = crate::ledger::positions::get_for_update_or_create(
                    &mut *tx, user_id, market_id, outcome,
                )
                .await?;
                crate::ledger::positions::reserve_shares(&mut *tx, position.id, quantity).await?;
            }

            let mut order = crate::ledger::orders::create(
                &mut *tx,
                user_id,
                market_id,
                side,
                book_price,
                quantity,
                order_intent,
            )
            .await?;

            let fills = matcher::match_order(&mut tx, &market, &mut order, fee_rate).await?;
            order.status = if order.filled_quantity >= order.quantity {
                OrderStatus::Filled
            } else if order.filled_quantity > Decimal::ZERO {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Open
            };

            Ok((PlaceOrderOutcome { order, fills }, tx))
        })
        .await
}

pub async fn cancel_order(
    ledger: &Ledger,
    user_id: Uuid,
    order_id: Uuid,
) -> Result<Decimal, CoreError> {
    ledger
        .run_serializable(|mut tx| async move {
            let order = crate::ledger::orders::lock_for_update(&mut *tx, order_id).await?;
            if order.user_id != user_id {
                return Err(CoreError::Forbidden);
            }
            if !crate::ledger::orders::is_resting(order.status) {
                return Err(CoreError::InvalidParameter(
                    "order cannot be cancelled".to_string(),
                ));
            }

            let unfilled = order.remaining();
            crate::ledger::orders::cancel(&mut *tx, order_id).await?;
            settlement::release_order_reservation(&mut tx, &order, order.market_id).await?;

            crate::ledger::transactions::record(
                &mut *tx,
                user_id,
                TransactionType::OrderCancel,
                Decimal::ZERO,
                NewTransaction {
                    market_id: Some(order.market_id),
                    description: Some(format!(
                        "Cancelled order {:?} @ {}",
                        order.original_intent, order.price
                    )),
                    ..Default::default()
                },
            )
            .await?;

            Ok((unfilled, tx))
        })
        .await
}

/// Cancels every resting order for a market, releasing each one's
/// reservation. Used by `resolution::resolve_market` before paying out
/// CLOB markets, mirroring `cancel_all_market_orders`.
pub async fn cancel_all_market_orders(
    tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
    market_id: Uuid,
) -> Result<usize, CoreError> {
    let orders = crate::ledger::orders::list_open_for_market(&mut **tx, market_id).await?;
    let count = orders.len();
    for order in orders {
        crate::ledger::orders::cancel(&mut **tx, order.id).await?;
        settlement::release_order_reservation(tx, &order, market_id).await?;
    }
    Ok(count)
}
