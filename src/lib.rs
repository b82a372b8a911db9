pub mod amm;
pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod lmsr;
pub mod models;
pub mod notifier;
pub mod orderbook;
pub mod private_bet;
pub mod resolution;
pub mod scheduler;
pub mod utils;

use std::time::Duration;

use crate::cache::Cache;
use crate::config::Config;
use crate::ledger::Ledger;
use crate::notifier::Notifier;
use crate::orderbook::view::OrderBookView;

/// Application state shared across all REST handlers. Holds no
/// request-scoped or in-memory trading state of its own — every handler
/// reaches back into the `Ledger` for the authoritative row; `book_view`
/// and `leaderboard_cache` are read-through caches, not sources of truth.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub config: std::sync::Arc<Config>,
    pub book_view: OrderBookView,
    pub leaderboard_cache: Cache,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(ledger: Ledger, config: Config) -> Self {
        AppState {
            ledger,
            config: std::sync::Arc::new(config),
            book_view: OrderBookView::new(),
            leaderboard_cache: Cache::new(Duration::from_secs(300)),
            notifier: Notifier::new(),
        }
    }
}
