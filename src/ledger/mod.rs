//! The Ledger is the single shared mutable resource in this crate: a
//! Postgres connection pool plus row-level primitives used by every
//! other module. No component keeps its own in-memory copy of balances,
//! positions, or orders between requests.

pub mod fills;
pub mod markets;
pub mod orders;
pub mod positions;
pub mod price_history;
pub mod private_bets;
pub mod transactions;
pub mod users;

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::CoreError;

#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
    max_retries: u32,
}

impl Ledger {
    pub async fn connect(database_url: &str, max_retries: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Ledger { pool, max_retries })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, CoreError> {
        Ok(self.pool.begin().await?)
    }

    /// Runs `op` inside a fresh transaction, committing on success. Retries
    /// the whole operation up to `max_retries` times on Postgres deadlock
    /// (`40P01`) or serialization failure (`40001`), the same two SQLSTATEs
    /// the reference backend's connection-retry shape targets, adapted here
    /// to transaction-level retry since row locks (not the pool) are this
    /// crate's contention point.
    pub async fn run_serializable<T, F, Fut>(&self, mut op: F) -> Result<T, CoreError>
    where
        F: FnMut(Transaction<'static, Postgres>) -> Fut,
        Fut: Future<Output = Result<(T, Transaction<'static, Postgres>), CoreError>>,
    {
        let mut attempt = 0;
        loop {
            let tx = self.begin().await?;
            match op(tx).await {
                Ok((value, tx)) => {
                    tx.commit().await?;
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "ledger operation conflicted, retrying ({attempt}/{})",
                        self.max_retries
                    );
                    tokio::time::sleep(Duration::from_millis(10 * attempt as u64)).await;
                    continue;
                }
                Err(err) if err.is_retryable() => {
                    return Err(CoreError::Conflict);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
