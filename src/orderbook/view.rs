use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::ledger::Ledger;
use crate::models::domain::{BookLevel, OrderBookSnapshot, OrderSide};

/// Read-through 1-second cache over the aggregated order book, mirroring
/// the original source's Redis `setex(cache_key, 1, ...)`. Backed by
/// `moka` in-process rather than Redis, since the book view is a cache,
/// not a source of truth — the Ledger remains authoritative.
#[derive(Clone)]
pub struct OrderBookView {
    cache: moka::future::Cache<Uuid, Arc<OrderBookSnapshot>>,
}

impl OrderBookView {
    pub fn new() -> Self {
        OrderBookView {
            cache: moka::future::Cache::builder()
                .time_to_live(Duration::from_secs(1))
                .max_capacity(10_000)
                .build(),
        }
    }

    pub async fn get(
        &self,
        ledger: &Ledger,
        market_id: Uuid,
    ) -> Result<Arc<OrderBookSnapshot>, CoreError> {
        if let Some(cached) = self.cache.get(&market_id).await {
            return Ok(cached);
        }
        let snapshot = Arc::new(build_snapshot(ledger, market_id).await?);
        self.cache.insert(market_id, snapshot.clone()).await;
        Ok(snapshot)
    }

    pub async fn invalidate(&self, market_id: Uuid) {
        self.cache.invalidate(&market_id).await;
    }
}

impl Default for OrderBookView {
    fn default() -> Self {
        Self::new()
    }
}

async fn build_snapshot(ledger: &Ledger, market_id: Uuid) -> Result<OrderBookSnapshot, CoreError> {
    let orders =
        crate::ledger::orders::list_open_for_market_readonly(ledger.pool(), market_id).await?;

    let mut bid_levels: BTreeMap<Decimal, Decimal> = BTreeMap::new();
    let mut ask_levels: BTreeMap<Decimal, Decimal> = BTreeMap::new();

    for order in orders {
        let remaining = order.remaining();
        if remaining <= Decimal::ZERO {
            continue;
        }
        match order.side {
            OrderSide::Buy => *bid_levels.entry(order.price).or_default() += remaining,
            OrderSide::Sell => *ask_levels.entry(order.price).or_default() += remaining,
        }
    }

    let bids = bid_levels
        .into_iter()
        .rev()
        .map(|(price, quantity)| BookLevel { price, quantity })
        .collect();
    let asks = ask_levels
        .into_iter()
        .map(|(price, quantity)| BookLevel { price, quantity })
        .collect();

    Ok(OrderBookSnapshot {
        market_id,
        bids,
        asks,
    })
}
