//! LMSR trade orchestration: fee application, share/revenue computation,
//! position bookkeeping, and price-history recording. Sequencing follows
//! `TradeService.buy`/`sell` from the service this crate's ledger/lmsr
//! split was distilled from, adapted to explicit row locking via the
//! Ledger rather than an ORM session.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::transactions::NewTransaction;
use crate::ledger::Ledger;
use crate::lmsr;
use crate::models::domain::{MarketMechanism, MarketStatus, Outcome, TransactionType};
use crate::utils::{quantize_prc, quantize_price_4dp};

pub struct BuyOutcome {
    pub shares: Decimal,
    pub fee: Decimal,
    pub price_yes: Decimal,
    pub price_no: Decimal,
    pub new_balance: Decimal,
}

pub struct SellOutcome {
    pub revenue: Decimal,
    pub price_yes: Decimal,
    pub price_no: Decimal,
    pub new_balance: Decimal,
}

pub async fn buy(
    ledger: &Ledger,
    user_id: Uuid,
    market_id: Uuid,
    outcome: Outcome,
    amount: Decimal,
    fee_rate: Decimal,
) -> Result<BuyOutcome, CoreError> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidParameter(
            "amount must be positive".to_string(),
        ));
    }

    ledger
        .run_serializable(|mut tx| {
            let fee_rate = fee_rate;
            async move {
                let market = crate::ledger::markets::lock_for_update(&mut *tx, market_id).await?;
                if market.status != MarketStatus::Open {
                    return Err(CoreError::MarketNotOpen);
                }
                if market.mechanism != MarketMechanism::Lmsr {
                    return Err(CoreError::WrongMechanism);
                }
                if amount < market.min_bet {
                    return Err(CoreError::BelowMinBet {
                        amount: amount.to_string(),
                        min: market.min_bet.to_string(),
                    });
                }
                if amount > market.max_bet {
                    return Err(CoreError::AboveMaxBet {
                        amount: amount.to_string(),
                        max: market.max_bet.to_string(),
                    });
                }

                let user = crate::ledger::users::lock_for_update(&mut *tx, user_id).await?;
                if user.available_balance() < amount {
                    return Err(CoreError::InsufficientBalance);
                }

                let fee = quantize_prc(amount * fee_rate);
                let net_amount = amount - fee;

                let shares = lmsr::shares_for_amount(
                    market.q_yes,
                    market.q_no,
                    market.liquidity_b,
                    outcome,
                    net_amount,
                )?;
                if shares <= Decimal::ZERO {
                    return Err(CoreError::ZeroShares);
                }

                let (new_q_yes, new_q_no) = match outcome {
                    Outcome::Yes => (market.q_yes + shares, market.q_no),
                    Outcome::No => (market.q_yes, market.q_no + shares),
                };
                crate::ledger::markets::update_q(&mut *tx, market_id, new_q_yes, new_q_no)
                    .await?;

                crate::ledger::users::debit_balance(&mut *tx, user_id, amount).await?;
                crate::ledger::users::increment_trade_count(&mut *tx, user_id).await?;

                let (position, created) = crate::ledger::positions::get_for_update_or_create(
                    &mut *tx, user_id, market_id, outcome,
                )
                .await?;
                let total_shares = position.shares + shares;
                let total_cost = position.total_cost + amount;
                let avg_price = total_cost / total_shares;
                crate::ledger::positions::set_shares_and_cost(
                    &mut *tx,
                    position.id,
                    total_shares,
                    total_cost,
                    avg_price,
                )
                .await?;

                let price_yes = lmsr::price(new_q_yes, new_q_no, market.liquidity_b, Outcome::Yes);
                let price_no = lmsr::price(new_q_yes, new_q_no, market.liquidity_b, Outcome::No);
                let price_at_trade = match outcome {
                    Outcome::Yes => price_yes,
                    Outcome::No => price_no,
                };

                let last_trade_price_yes = quantize_price_4dp(price_yes);
                crate::ledger::markets::record_trade(
                    &mut *tx,
                    market_id,
                    amount,
                    last_trade_price_yes,
                    created,
                )
                .await?;

                crate::ledger::transactions::record(
                    &mut *tx,
                    user_id,
                    TransactionType::Buy,
                    -amount,
                    NewTransaction {
                        market_id: Some(market_id),
                        shares: Some(shares),
                        outcome: Some(outcome),
                        price_at_trade: Some(quantize_price_4dp(price_at_trade)),
                        description: Some(format!("Buy {outcome} | fee: {fee} PRC")),
                    },
                )
                .await?;

                if fee > Decimal::ZERO {
                    crate::ledger::transactions::record(
                        &mut *tx,
                        user_id,
                        TransactionType::Fee,
                        -fee,
                        NewTransaction {
                            market_id: Some(market_id),
                            description: Some("Trading fee".to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                }

                crate::ledger::price_history::record(
                    &mut *tx,
                    market_id,
                    quantize_price_4dp(price_yes),
                    quantize_price_4dp(price_no),
                    new_q_yes,
                    new_q_no,
                )
                .await?;

                let new_balance = user.balance - amount;
                Ok((
                    BuyOutcome {
                        shares,
                        fee,
                        price_yes: quantize_price_4dp(price_yes),
                        price_no: quantize_price_4dp(price_no),
                        new_balance,
                    },
                    tx,
                ))
            }
        })
        .await
}

/// Sell shares back into the LMSR pool. Matches the original source
/// exactly: no fee is charged on sells (Open Question #1, see
/// `DESIGN.md`), and the cost-proportion removed from `total_cost` is
/// computed *after* decrementing `shares`, reconstructing the
/// pre-decrement share count via `shares / (position.shares + shares)`
/// (Open Question #3) — exact only under full-liquidation semantics.
pub async fn sell(
    ledger: &Ledger,
    user_id: Uuid,
    market_id: Uuid,
    outcome: Outcome,
    shares: Decimal,
) -> Result<SellOutcome, CoreError> {
    if shares <= Decimal::ZERO {
        return Err(CoreError::InvalidParameter(
            "shares must be positive".to_string(),
        ));
    }

    ledger
        .run_serializable(|mut tx| async move {
            let market = crate::ledger::markets::lock_for_update(&mut *tx, market_id).await?;
            if market.status != MarketStatus::Open {
                return Err(CoreError::MarketNotOpen);
            }
            if market.mechanism != MarketMechanism::Lmsr {
                return Err(CoreError::WrongMechanism);
            }

            let user = crate::ledger::users::lock_for_update(&mut *tx, user_id).await?;

            let (position, _) = crate::ledger::positions::get_for_update_or_create(
                &mut *tx, user_id, market_id, outcome,
            )
            .await?;
            if position.available_shares() < shares {
                return Err(CoreError::InsufficientShares);
            }

            let revenue = lmsr::sale_revenue(
                market.q_yes,
                market.q_no,
                market.liquidity_b,
                outcome,
                shares,
            )?;

            let (new_q_yes, new_q_no) = match outcome {
                Outcome::Yes => (market.q_yes - shares, market.q_no),
                Outcome::No => (market.q_yes, market.q_no - shares),
            };
            crate::ledger::markets::update_q(&mut *tx, market_id, new_q_yes, new_q_no).await?;
            crate::ledger::users::credit_balance(&mut *tx, user_id, revenue).await?;

            let remaining_shares = position.shares - shares;
            let cost_proportion = shares / (remaining_shares + shares);
            let new_total_cost = position.total_cost - position.total_cost * cost_proportion;
            let new_avg_price = if remaining_shares > Decimal::ZERO {
                new_total_cost / remaining_shares
            } else {
                Decimal::ZERO
            };
            crate::ledger::positions::set_shares_and_cost(
                &mut *tx,
                position.id,
                remaining_shares,
                new_total_cost,
                new_avg_price,
            )
            .await?;

            let price_yes = lmsr::price(new_q_yes, new_q_no, market.liquidity_b, Outcome::Yes);
            let price_no = lmsr::price(new_q_yes, new_q_no, market.liquidity_b, Outcome::No);
            let price_at_trade = match outcome {
                Outcome::Yes => price_yes,
                Outcome::No => price_no,
            };

            crate::ledger::transactions::record(
                &mut *tx,
                user_id,
                TransactionType::Sell,
                revenue,
                NewTransaction {
                    market_id: Some(market_id),
                    shares: Some(shares),
                    outcome: Some(outcome),
                    price_at_trade: Some(quantize_price_4dp(price_at_trade)),
                    ..Default::default()
                },
            )
            .await?;

            crate::ledger::price_history::record(
                &mut *tx,
                market_id,
                quantize_price_4dp(price_yes),
                quantize_price_4dp(price_no),
                new_q_yes,
                new_q_no,
            )
            .await?;

            let new_balance = user.balance + revenue;
            Ok((
                SellOutcome {
                    revenue,
                    price_yes: quantize_price_4dp(price_yes),
                    price_no: quantize_price_4dp(price_no),
                    new_balance,
                },
                tx,
            ))
        })
        .await
}
