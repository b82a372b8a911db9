//! Market resolution and cancellation. Exact port of `ResolutionService`:
//! positions are paid out (or refunded) regardless of market mechanism,
//! CLOB orders are cancelled first for CLOB markets, and win rate is
//! recomputed from the lifetime count of PAYOUT transactions.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::transactions::NewTransaction;
use crate::ledger::Ledger;
use crate::models::domain::{MarketMechanism, MarketStatus, Outcome, TransactionType};
use crate::notifier::Notifier;
use crate::orderbook;
use crate::utils::quantize_prc;

pub struct ResolveOutcome {
    pub winners_count: usize,
    pub total_positions: usize,
}

pub struct CancelOutcome {
    pub refunded_positions: usize,
}

/// One participant's resolution notification, dispatched after the
/// transaction commits: `(user_id, is_winner, payout)`. Mirrors the
/// original bot's `send_resolution_notification`, which branches on the
/// same `is_winner` flag to pick a template.
struct ResolutionNotice {
    user_id: Uuid,
    is_winner: bool,
    payout: Decimal,
}

pub async fn resolve_market(
    ledger: &Ledger,
    notifier: &Notifier,
    market_id: Uuid,
    outcome: Outcome,
) -> Result<ResolveOutcome, CoreError> {
    let (resolve_outcome, market_title, notices) = ledger
        .run_serializable(|mut tx| async move {
            let market = crate::ledger::markets::lock_for_update(&mut *tx, market_id).await?;
            if !matches!(market.status, MarketStatus::Open | MarketStatus::TradingClosed) {
                return Err(CoreError::InvalidParameter(
                    "market cannot be resolved".to_string(),
                ));
            }

            crate::ledger::markets::resolve(&mut *tx, market_id, outcome).await?;

            if market.mechanism == MarketMechanism::Clob {
                orderbook::cancel_all_market_orders(&mut tx, market_id).await?;
            }

            let positions =
                crate::ledger::positions::list_by_market(&mut *tx, market_id).await?;
            let total_positions = positions.len();
            let mut winners_count = 0usize;
            let mut notices = Vec::with_capacity(total_positions);

            for position in &positions {
                let user = crate::ledger::users::lock_for_update(&mut *tx, position.user_id)
                    .await?;
                let is_winner = position.outcome == outcome;
                let mut payout = Decimal::ZERO;

                if is_winner {
                    payout = position.shares; // 1.00 PRC per winning share
                    crate::ledger::users::credit_balance(&mut *tx, user.id, payout).await?;
                    let profit = payout - position.total_cost;
                    crate::ledger::users::add_profit(&mut *tx, user.id, profit).await?;

                    crate::ledger::transactions::record(
                        &mut *tx,
                        user.id,
                        TransactionType::Payout,
                        payout,
                        NewTransaction {
                            market_id: Some(market_id),
                            shares: Some(position.shares),
                            outcome: Some(outcome),
                            description: Some(format!("Payout for {}", market.title)),
                            ..Default::default()
                        },
                    )
                    .await?;
                    winners_count += 1;
                }

                recompute_win_rate(&mut tx, user.id, user.total_trades).await?;
                notices.push(ResolutionNotice {
                    user_id: user.id,
                    is_winner,
                    payout,
                });
            }

            Ok((
                (
                    ResolveOutcome {
                        winners_count,
                        total_positions,
                    },
                    market.title,
                    notices,
                ),
                tx,
            ))
        })
        .await?;

    for notice in notices {
        let template = if notice.is_winner {
            "market_resolved_winner"
        } else {
            "market_resolved_loser"
        };
        notifier
            .notify(
                notice.user_id,
                template,
                serde_json::json!({
                    "market_title": market_title,
                    "outcome": outcome,
                    "payout": notice.payout,
                }),
            )
            .await;
    }

    Ok(resolve_outcome)
}

pub async fn cancel_market(ledger: &Ledger, market_id: Uuid) -> Result<CancelOutcome, CoreError> {
    ledger
        .run_serializable(|mut tx| async move {
            let market = crate::ledger::markets::lock_for_update(&mut *tx, market_id).await?;
            if market.status == MarketStatus::Resolved {
                return Err(CoreError::InvalidParameter(
                    "cannot cancel a resolved market".to_string(),
                ));
            }

            crate::ledger::markets::cancel(&mut *tx, market_id).await?;

            let positions =
                crate::ledger::positions::list_by_market(&mut *tx, market_id).await?;
            let mut refunded = 0usize;

            for position in &positions {
                if position.total_cost <= Decimal::ZERO {
                    continue;
                }
                let user = crate::ledger::users::lock_for_update(&mut *tx, position.user_id)
                    .await?;
                crate::ledger::users::credit_balance(&mut *tx, user.id, position.total_cost)
                    .await?;
                refunded += 1;

                crate::ledger::transactions::record(
                    &mut *tx,
                    user.id,
                    TransactionType::Payout,
                    position.total_cost,
                    NewTransaction {
                        market_id: Some(market_id),
                        shares: Some(position.shares),
                        outcome: Some(position.outcome),
                        description: Some(format!(
                            "Refund for cancelled market: {}",
                            market.title
                        )),
                        ..Default::default()
                    },
                )
                .await?;
            }

            Ok((
                CancelOutcome {
                    refunded_positions: refunded,
                },
                tx,
            ))
        })
        .await
}

/// Recomputes `win_rate` as `count(payout transactions) / total_trades * 100`.
///
/// This carries over the original source's formula as-is: it counts every
/// PAYOUT-typed transaction a user has ever received, which conflates a
/// genuine market win with a `cancel_market` refund (also recorded as
/// PAYOUT). Open Question #4 in `DESIGN.md` accepts this as a named
/// limitation rather than silently diverging from the source's behavior.
async fn recompute_win_rate(
    tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
    user_id: Uuid,
    total_trades: i64,
) -> Result<(), CoreError> {
    if total_trades <= 0 {
        return Ok(());
    }
    let wins = crate::ledger::transactions::count_payouts(&mut **tx, user_id).await?;
    let win_rate = quantize_prc(Decimal::from(wins) / Decimal::from(total_trades) * Decimal::ONE_HUNDRED);
    crate::ledger::users::set_win_rate(&mut **tx, user_id, win_rate).await?;
    Ok(())
}
