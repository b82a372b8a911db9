use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger;
use crate::ledger::transactions::NewTransaction;
use crate::models::domain::{Market, Order, OrderIntent, OrderSide, Outcome, SettlementType, TradeFill, TransactionType};
use crate::utils::quantize_prc;

/// Settlement mode for a matched pair, from their *original* intents —
/// not their translated book sides. Exact port of `_determine_settlement`,
/// including its fallback to MINT for any pairing not explicitly named.
pub fn determine(buy_intent: OrderIntent, sell_intent: OrderIntent) -> SettlementType {
    use OrderIntent::*;
    match (buy_intent, sell_intent) {
        (BuyYes, SellYes) => SettlementType::Transfer,
        (BuyYes, BuyNo) => SettlementType::Mint,
        (SellNo, SellYes) => SettlementType::Burn,
        (SellNo, BuyNo) => SettlementType::Transfer,
        _ => SettlementType::Mint,
    }
}

/// Splits `fee` into two halves that sum back to the exact original,
/// per Open Question #2: `half = round(fee/2, 2)`, `other = fee - half`.
/// Used by both MINT and BURN settlement, where the fee is shared between
/// the two counterparties rather than charged to one side.
pub fn split_fee_in_half(fee: Decimal) -> (Decimal, Decimal) {
    let half = quantize_prc(fee / Decimal::TWO);
    (half, fee - half)
}

/// Executes one matched fill between `order_a` and `order_b` at `price`
/// for `qty` shares, mutating balances/positions/orders/market stats and
/// recording the fill + transactions. `order_a`/`order_b` may be supplied
/// in either book-side order; the book-BUY order is identified internally
/// exactly as the original source does.
#[allow(clippy::too_many_arguments)]
pub async fn execute_fill(
    tx: &mut Transaction<'static, Postgres>,
    market: &Market,
    order_a: &mut Order,
    order_b: &mut Order,
    price: Decimal,
    qty: Decimal,
    fee_rate: Decimal,
) -> Result<TradeFill, CoreError> {
    let (buy_order, sell_order): (&mut Order, &mut Order) = if order_a.side == OrderSide::Buy {
        (order_a, order_b)
    } else {
        (order_b, order_a)
    };

    let buy_intent = buy_order.original_intent;
    let sell_intent = sell_order.original_intent;
    let settlement = determine(buy_intent, sell_intent);

    let base_value = price * qty;
    let mut fee = quantize_prc(base_value * fee_rate);

    let buyer_id = buy_order.user_id;
    let seller_id = sell_order.user_id;

    match settlement {
        SettlementType::Transfer => {
            let is_no_transfer =
                buy_intent == OrderIntent::SellNo && sell_intent == OrderIntent::BuyNo;
            let outcome = if is_no_transfer { Outcome::No } else { Outcome::Yes };
            let cost = if is_no_transfer {
                (Decimal::ONE - price) * qty
            } else {
                price * qty
            };

            ledger::users::release_reservation(&mut **tx, buyer_id, cost).await?;
            ledger::users::debit_balance(&mut **tx, buyer_id, cost).await?;
            let seller_revenue = cost - fee;
            ledger::users::credit_balance(&mut **tx, seller_id, seller_revenue).await?;

            let (seller_pos, _) =
                ledger::positions::get_for_update_or_create(&mut **tx, seller_id, market.id, outcome)
                    .await?;
            ledger::positions::release_reserved_shares(&mut **tx, seller_pos.id, qty).await?;
            ledger::positions::transfer_shares(&mut **tx, seller_pos.id, -qty).await?;

            let (buyer_pos, _) =
                ledger::positions::get_for_update_or_create(&mut **tx, buyer_id, market.id, outcome)
                    .await?;
            let new_shares = buyer_pos.shares + qty;
            let new_total_cost = buyer_pos.total_cost + cost;
            let new_avg = if new_shares > Decimal::ZERO {
                new_total_cost / new_shares
            } else {
                Decimal::ZERO
            };
            ledger::positions::set_shares_and_cost(
                &mut **tx,
                buyer_pos.id,
                new_shares,
                new_total_cost,
                new_avg,
            )
            .await?;
        }
        SettlementType::Mint => {
            let buyer_cost = price * qty;
            let seller_cost = (Decimal::ONE - price) * qty;
            let total_deposited = qty; // buyer_cost + seller_cost == qty PRC
            fee = quantize_prc(total_deposited * fee_rate);
            let (half_fee, _) = split_fee_in_half(fee);

            ledger::users::release_reservation(&mut **tx, buyer_id, buyer_cost).await?;
            ledger::users::debit_balance(&mut **tx, buyer_id, buyer_cost + half_fee).await?;
            ledger::users::release_reservation(&mut **tx, seller_id, seller_cost).await?;
            ledger::users::debit_balance(&mut **tx, seller_id, seller_cost + (fee - half_fee))
                .await?;

            let (buyer_pos, _) = ledger::positions::get_for_update_or_create(
                &mut **tx,
                buyer_id,
                market.id,
                Outcome::Yes,
            )
            .await?;
            let buyer_shares = buyer_pos.shares + qty;
            let buyer_total_cost = buyer_pos.total_cost + buyer_cost + half_fee;
            let buyer_avg = if buyer_shares > Decimal::ZERO {
                buyer_total_cost / buyer_shares
            } else {
                Decimal::ZERO
            };
            ledger::positions::set_shares_and_cost(
                &mut **tx,
                buyer_pos.id,
                buyer_shares,
                buyer_total_cost,
                buyer_avg,
            )
            .await?;

            let (seller_pos, _) = ledger::positions::get_for_update_or_create(
                &mut **tx,
                seller_id,
                market.id,
                Outcome::No,
            )
            .await?;
            let seller_shares = seller_pos.shares + qty;
            let seller_total_cost = seller_pos.total_cost + seller_cost + (fee - half_fee);
            let seller_avg = if seller_shares > Decimal::ZERO {
                seller_total_cost / seller_shares
            } else {
                Decimal::ZERO
            };
            ledger::positions::set_shares_and_cost(
                &mut **tx,
                seller_pos.id,
                seller_shares,
                seller_total_cost,
                seller_avg,
            )
            .await?;
        }
        SettlementType::Burn => {
            let yes_revenue = price * qty;
            let no_revenue = (Decimal::ONE - price) * qty;
            let total_returned = qty;
            fee = quantize_prc(total_returned * fee_rate);
            let (half_fee, _) = split_fee_in_half(fee);

            let (sell_yes_pos, _) = ledger::positions::get_for_update_or_create(
                &mut **tx,
                seller_id,
                market.id,
                Outcome::Yes,
            )
            .await?;
            ledger::positions::release_reserved_shares(&mut **tx, sell_yes_pos.id, qty).await?;
            ledger::positions::transfer_shares(&mut **tx, sell_yes_pos.id, -qty).await?;

            let (sell_no_pos, _) = ledger::positions::get_for_update_or_create(
                &mut **tx,
                buyer_id,
                market.id,
                Outcome::No,
            )
            .await?;
            ledger::positions::release_reserved_shares(&mut **tx, sell_no_pos.id, qty).await?;
            ledger::positions::transfer_shares(&mut **tx, sell_no_pos.id, -qty).await?;

            ledger::users::credit_balance(&mut **tx, seller_id, yes_revenue - half_fee).await?;
            ledger::users::credit_balance(&mut **tx, buyer_id, no_revenue - (fee - half_fee))
                .await?;
        }
    }

    ledger::orders::apply_fill(&mut **tx, buy_order.id, qty).await?;
    ledger::orders::apply_fill(&mut **tx, sell_order.id, qty).await?;
    buy_order.filled_quantity += qty;
    sell_order.filled_quantity += qty;

    ledger::markets::record_trade(&mut **tx, market.id, base_value, price, false).await?;
    ledger::users::increment_trade_count(&mut **tx, buyer_id).await?;
    ledger::users::increment_trade_count(&mut **tx, seller_id).await?;

    let fill = ledger::fills::create(
        &mut **tx,
        market.id,
        buy_order.id,
        sell_order.id,
        buyer_id,
        seller_id,
        price,
        qty,
        fee,
        settlement,
    )
    .await?;

    let buy_outcome = crate::orderbook::intent::outcome_of(buy_intent);
    let sell_outcome = crate::orderbook::intent::outcome_of(sell_intent);

    ledger::transactions::record(
        &mut **tx,
        buyer_id,
        TransactionType::OrderFill,
        -base_value,
        NewTransaction {
            market_id: Some(market.id),
            shares: Some(qty),
            outcome: Some(buy_outcome),
            price_at_trade: Some(price),
            description: Some(format!("Order fill: {buy_intent:?} @ {price}")),
        },
    )
    .await?;

    ledger::transactions::record(
        &mut **tx,
        seller_id,
        TransactionType::OrderFill,
        base_value,
        NewTransaction {
            market_id: Some(market.id),
            shares: Some(qty),
            outcome: Some(sell_outcome),
            price_at_trade: Some(price),
            description: Some(format!("Order fill: {sell_intent:?} @ {price}")),
        },
    )
    .await?;

    Ok(fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Scenario 2 (spec §8): A buy_yes p=0.60 qty=10 resting, B sell_yes
    /// p=0.58 qty=10 taking, matched at the resting price 0.60.
    #[test]
    fn transfer_scenario_matches_spec_numbers() {
        let price = dec!(0.60);
        let qty = dec!(10);
        let fee_rate = dec!(0.02);
        let cost = price * qty;
        let fee = quantize_prc(cost * fee_rate);
        let seller_revenue = cost - fee;
        assert_eq!(cost, dec!(6.00));
        assert_eq!(fee, dec!(0.12));
        assert_eq!(seller_revenue, dec!(5.88));
    }

    /// Scenario 3 (spec §8): C buy_yes p=0.55 qty=5, D buy_no p=0.45 qty=5
    /// (book price 0.55), matched at 0.55, minting a new YES+NO pair.
    #[test]
    fn mint_scenario_matches_spec_numbers() {
        let price = dec!(0.55);
        let qty = dec!(5);
        let fee_rate = dec!(0.02);
        let buyer_cost = price * qty;
        let seller_cost = (Decimal::ONE - price) * qty;
        let total_deposited = qty;
        let fee = quantize_prc(total_deposited * fee_rate);
        let (half_fee, other_half) = split_fee_in_half(fee);

        assert_eq!(buyer_cost, dec!(2.75));
        assert_eq!(seller_cost, dec!(2.25));
        assert_eq!(fee, dec!(0.10));
        assert_eq!(half_fee, dec!(0.05));
        assert_eq!(other_half, dec!(0.05));
        assert_eq!(half_fee + other_half, fee);
    }

    #[test]
    fn split_fee_in_half_halves_always_sum_to_the_original() {
        for fee in [dec!(0.01), dec!(0.03), dec!(0.10), dec!(1.23), dec!(0.00)] {
            let (half, other) = split_fee_in_half(fee);
            assert_eq!(half + other, fee);
        }
    }

    #[test]
    fn buy_yes_sell_yes_transfers_shares() {
        assert_eq!(
            determine(OrderIntent::BuyYes, OrderIntent::SellYes),
            SettlementType::Transfer
        );
    }

    #[test]
    fn sell_no_buy_no_transfers_shares() {
        assert_eq!(
            determine(OrderIntent::SellNo, OrderIntent::BuyNo),
            SettlementType::Transfer
        );
    }

    #[test]
    fn buy_yes_buy_no_mints_a_new_pair() {
        assert_eq!(
            determine(OrderIntent::BuyYes, OrderIntent::BuyNo),
            SettlementType::Mint
        );
    }

    #[test]
    fn sell_no_sell_yes_burns_a_pair() {
        assert_eq!(
            determine(OrderIntent::SellNo, OrderIntent::SellYes),
            SettlementType::Burn
        );
    }

    #[test]
    fn unlisted_pairings_fall_back_to_mint() {
        assert_eq!(
            determine(OrderIntent::SellYes, OrderIntent::SellNo),
            SettlementType::Mint
        );
    }
}

/// Releases whatever reservation `order` still holds for its unfilled
/// quantity: PRC for buy intents, shares for sell intents. Used by both
/// `cancel_order` and bulk cancellation during resolution.
pub async fn release_order_reservation(
    tx: &mut Transaction<'static, Postgres>,
    order: &Order,
    market_id: Uuid,
) -> Result<(), CoreError> {
    let unfilled = order.remaining();
    if unfilled <= Decimal::ZERO {
        return Ok(());
    }
    if crate::orderbook::intent::reserves_cash(order.original_intent) {
        let intent_price =
            crate::orderbook::intent::intent_price_from_book(order.original_intent, order.price);
        ledger::users::release_reservation(&mut **tx, order.user_id, intent_price * unfilled)
            .await?;
    } else {
        let outcome = crate::orderbook::intent::outcome_of(order.original_intent);
        let (pos, _) = ledger::positions::get_for_update_or_create(
            &mut **tx,
            order.user_id,
            market_id,
            outcome,
        )
        .await?;
        ledger::positions::release_reserved_shares(&mut **tx, pos.id, unfilled).await?;
    }
    Ok(())
}
