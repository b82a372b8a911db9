use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Stable, typed error surface for the core. Every public operation returns
/// `Result<T, CoreError>`; the REST binding maps it to a JSON body and HTTP
/// status via `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("market not found")]
    MarketNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("private bet not found")]
    PrivateBetNotFound,

    #[error("market is not open for trading")]
    MarketNotOpen,

    #[error("market uses the other trading mechanism")]
    WrongMechanism,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("amount {amount} is below the minimum bet {min}")]
    BelowMinBet { amount: String, min: String },

    #[error("amount {amount} is above the maximum bet {max}")]
    AboveMaxBet { amount: String, max: String },

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("insufficient shares")]
    InsufficientShares,

    #[error("cannot purchase zero shares")]
    ZeroShares,

    #[error("user is already a participant in this bet")]
    AlreadyParticipant,

    #[error("invite code not found")]
    InviteCodeNotFound,

    #[error("private bet is not in the expected state")]
    InvalidBetState,

    #[error("identity verification failed")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("operation conflicted with concurrent writers, retries exhausted")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl CoreError {
    /// Stable machine-readable error code, mirrored in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::MarketNotFound => "market_not_found",
            CoreError::UserNotFound => "user_not_found",
            CoreError::OrderNotFound => "order_not_found",
            CoreError::PrivateBetNotFound => "private_bet_not_found",
            CoreError::MarketNotOpen => "market_not_open",
            CoreError::WrongMechanism => "wrong_mechanism",
            CoreError::InvalidParameter(_) => "invalid_parameter",
            CoreError::InvalidPrice(_) => "invalid_price",
            CoreError::InvalidQuantity(_) => "invalid_quantity",
            CoreError::BelowMinBet { .. } => "below_min_bet",
            CoreError::AboveMaxBet { .. } => "above_max_bet",
            CoreError::InsufficientBalance => "insufficient_balance",
            CoreError::InsufficientShares => "insufficient_shares",
            CoreError::ZeroShares => "zero_shares",
            CoreError::AlreadyParticipant => "already_participant",
            CoreError::InviteCodeNotFound => "invite_code_not_found",
            CoreError::InvalidBetState => "invalid_bet_state",
            CoreError::Unauthorized => "unauthorized",
            CoreError::Forbidden => "forbidden",
            CoreError::Conflict => "conflict",
            CoreError::Database(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::MarketNotFound
            | CoreError::UserNotFound
            | CoreError::OrderNotFound
            | CoreError::PrivateBetNotFound
            | CoreError::InviteCodeNotFound => StatusCode::NOT_FOUND,
            CoreError::MarketNotOpen
            | CoreError::WrongMechanism
            | CoreError::InvalidParameter(_)
            | CoreError::InvalidPrice(_)
            | CoreError::InvalidQuantity(_)
            | CoreError::BelowMinBet { .. }
            | CoreError::AboveMaxBet { .. }
            | CoreError::InsufficientBalance
            | CoreError::InsufficientShares
            | CoreError::ZeroShares
            | CoreError::AlreadyParticipant
            | CoreError::InvalidBetState => StatusCode::BAD_REQUEST,
            CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            CoreError::Forbidden => StatusCode::FORBIDDEN,
            CoreError::Conflict => StatusCode::CONFLICT,
            CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for Postgres errors this crate's retry wrapper should retry:
    /// deadlock_detected (40P01) and serialization_failure (40001).
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Database(sqlx::Error::Database(db_err)) => {
                matches!(db_err.code().as_deref(), Some("40P01") | Some("40001"))
            }
            _ => false,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        if matches!(self, CoreError::Database(_)) {
            log::error!("internal error: {self:?}");
        }
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}
