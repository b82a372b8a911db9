//! Periodic background jobs, grounded on the reference backend's
//! `app/tasks/scheduled.py` broker tasks. Built on `tokio-cron-scheduler`
//! in place of that stack's task broker, since this crate has no separate
//! worker process — the scheduler runs inside the same binary as the API.
//!
//! `send_daily_digests` (Telegram push notifications) is out of scope:
//! it belongs to the bot-facing surface this crate's Non-goals exclude.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::cache::Cache;
use crate::ledger::Ledger;
use crate::models::domain::{MarketStatus, PrivateBetStatus};

#[derive(Serialize)]
struct LeaderboardEntry {
    id: uuid::Uuid,
    display_name: String,
    total_profit: Decimal,
    win_rate: Decimal,
    total_trades: i64,
    rank: usize,
}

/// Builds and starts the scheduler. The returned `JobScheduler` must be
/// kept alive for the jobs to keep firing; `main` holds onto it for the
/// lifetime of the process.
pub async fn start(ledger: Ledger, leaderboard_cache: Cache) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let close_markets_ledger = ledger.clone();
    scheduler
        .add(Job::new_async("0 * * * * *", move |_uuid, _l| {
            let ledger = close_markets_ledger.clone();
            Box::pin(async move {
                if let Err(err) = close_expired_markets(&ledger).await {
                    log::error!("close_expired_markets failed: {err}");
                }
            })
        })?)
        .await?;

    let close_bets_ledger = ledger.clone();
    scheduler
        .add(Job::new_async("0 * * * * *", move |_uuid, _l| {
            let ledger = close_bets_ledger.clone();
            Box::pin(async move {
                if let Err(err) = close_expired_private_bets(&ledger).await {
                    log::error!("close_expired_private_bets failed: {err}");
                }
            })
        })?)
        .await?;

    let resolve_voting_ledger = ledger.clone();
    scheduler
        .add(Job::new_async("0 */5 * * * *", move |_uuid, _l| {
            let ledger = resolve_voting_ledger.clone();
            Box::pin(async move {
                if let Err(err) = resolve_expired_voting(&ledger).await {
                    log::error!("resolve_expired_voting failed: {err}");
                }
            })
        })?)
        .await?;

    let leaderboard_ledger = ledger.clone();
    scheduler
        .add(Job::new_async("0 */5 * * * *", move |_uuid, _l| {
            let ledger = leaderboard_ledger.clone();
            let cache = leaderboard_cache.clone();
            Box::pin(async move {
                if let Err(err) = refresh_leaderboard(&ledger, &cache).await {
                    log::error!("refresh_leaderboard failed: {err}");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn close_expired_markets(ledger: &Ledger) -> anyhow::Result<()> {
    ledger
        .run_serializable(|mut tx| async move {
            let expired = crate::ledger::markets::list_expired_open(&mut *tx).await?;
            for market in &expired {
                crate::ledger::markets::set_status(
                    &mut *tx,
                    market.id,
                    MarketStatus::TradingClosed,
                )
                .await?;
                log::info!("market closed: {} - {}", market.id, market.title);
            }
            Ok(((), tx))
        })
        .await?;
    Ok(())
}

async fn close_expired_private_bets(ledger: &Ledger) -> anyhow::Result<()> {
    ledger
        .run_serializable(|mut tx| async move {
            let expired = crate::ledger::private_bets::list_expired_open(&mut *tx).await?;
            for bet in expired {
                let total = bet.yes_count + bet.no_count;
                if total <= 1 || bet.yes_count == 0 || bet.no_count == 0 {
                    crate::private_bet::cancel_and_refund(&mut tx, &bet).await?;
                    log::info!("private bet cancelled (one-sided): {}", bet.id);
                } else {
                    crate::ledger::private_bets::set_status(
                        &mut *tx,
                        bet.id,
                        PrivateBetStatus::Voting,
                    )
                    .await?;
                    log::info!("private bet moved to voting: {}", bet.id);
                }
            }
            Ok(((), tx))
        })
        .await?;
    Ok(())
}

async fn resolve_expired_voting(ledger: &Ledger) -> anyhow::Result<()> {
    ledger
        .run_serializable(|mut tx| async move {
            let expired = crate::ledger::private_bets::list_expired_voting(&mut *tx).await?;
            for bet in expired {
                let total_votes = bet.yes_votes + bet.no_votes;
                if total_votes == 0 || bet.yes_votes == bet.no_votes {
                    crate::private_bet::cancel_and_refund(&mut tx, &bet).await?;
                    log::info!("private bet cancelled (tie/no votes): {}", bet.id);
                } else {
                    let winning = if bet.yes_votes > bet.no_votes {
                        crate::models::domain::Outcome::Yes
                    } else {
                        crate::models::domain::Outcome::No
                    };
                    crate::private_bet::resolve_bet(&mut tx, &bet, winning).await?;
                    log::info!("private bet resolved by deadline: {}, outcome={winning}", bet.id);
                }
            }
            Ok(((), tx))
        })
        .await?;
    Ok(())
}

async fn refresh_leaderboard(ledger: &Ledger, cache: &Cache) -> anyhow::Result<()> {
    let users = crate::ledger::users::top_by_profit(ledger.pool(), 100).await?;
    let entries: Arc<Vec<LeaderboardEntry>> = Arc::new(
        users
            .into_iter()
            .enumerate()
            .map(|(i, user)| LeaderboardEntry {
                id: user.id,
                display_name: user.display_name,
                total_profit: user.total_profit,
                win_rate: user.win_rate,
                total_trades: user.total_trades,
                rank: i + 1,
            })
            .collect(),
    );

    for period in ["week", "month", "all"] {
        cache
            .set_ex(format!("leaderboard:{period}"), entries.as_ref())
            .await;
    }
    log::info!("leaderboard refreshed with {} entries", entries.len());
    Ok(())
}
