use std::env;

/// Configuration loaded once at startup from the environment (via
/// `dotenvy`), following the reference backend's `Config::load` shape but
/// env-first rather than TOML-first, matching the sibling reference
/// engine's `Config::from_env` pattern for the numeric/bool knobs this
/// crate actually needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// The trading fee as a fraction (e.g. `0.02`), already divided by 100
    /// from the `TRADE_FEE_PERCENT` env var.
    pub trade_fee_rate: rust_decimal::Decimal,
    pub default_min_bet: rust_decimal::Decimal,
    pub default_max_bet: rust_decimal::Decimal,
    pub jwt_secret: String,
    pub telegram_bot_token: String,
    pub admin_ids: Vec<String>,
    pub max_lock_retries: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/prc_markets".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            trade_fee_rate: parse_decimal_env("TRADE_FEE_PERCENT", "2.0")? / rust_decimal::Decimal::ONE_HUNDRED,
            default_min_bet: parse_decimal_env("DEFAULT_MIN_BET", "1")?,
            default_max_bet: parse_decimal_env("DEFAULT_MAX_BET", "10000")?,
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            admin_ids: env::var("ADMIN_IDS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_lock_retries: env::var("MAX_LOCK_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        })
    }

    pub fn is_admin(&self, external_id: &str) -> bool {
        self.admin_ids.iter().any(|id| id == external_id)
    }
}

fn parse_decimal_env(key: &str, default: &str) -> anyhow::Result<rust_decimal::Decimal> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_config(admin_ids: Vec<String>) -> Config {
        Config {
            database_url: String::new(),
            bind_addr: String::new(),
            trade_fee_rate: dec!(0.02),
            default_min_bet: dec!(1),
            default_max_bet: dec!(10000),
            jwt_secret: String::new(),
            telegram_bot_token: String::new(),
            admin_ids,
            max_lock_retries: 3,
        }
    }

    #[test]
    fn is_admin_matches_configured_ids_only() {
        let config = sample_config(vec!["111".to_string(), "222".to_string()]);
        assert!(config.is_admin("111"));
        assert!(!config.is_admin("333"));
    }

    #[test]
    fn is_admin_is_false_with_no_admins_configured() {
        let config = sample_config(vec![]);
        assert!(!config.is_admin("111"));
    }
}
