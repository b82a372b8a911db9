//! Identity verification: `verify(token_blob) -> user_descriptor | nil`,
//! kept separate from the trading core. This module supplies the one
//! concrete implementation the original backend shipped — Telegram
//! WebApp `initData` validation — plus the JWT access tokens issued once
//! that initial verification succeeds.
//!
//! The core never calls this module directly: trading, order, and
//! private-bet operations take a `user_id` that the REST binding is
//! responsible for having already resolved.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const AUTH_DATE_FRESHNESS_SECS: u64 = 86_400;

/// The minimal identity carried out of a successful `initData` check: the
/// Telegram user id (used as `users.external_id`) and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDescriptor {
    pub external_id: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    first_name: String,
    last_name: Option<String>,
}

/// Validates a Telegram Mini App `initData` query string using HMAC-SHA256,
/// per <https://core.telegram.org/bots/webapps#validating-data-received-via-the-mini-app>.
/// Returns `None` on a malformed payload, a hash mismatch, or a stale
/// `auth_date` (more than 24h old) — mirroring `validate_telegram_init_data`.
pub fn verify_telegram_init_data(init_data: &str, bot_token: &str) -> Option<UserDescriptor> {
    let pairs = parse_query_string(init_data);

    let received_hash = pairs.get("hash")?;
    let mut check_fields: BTreeMap<&str, &str> = pairs
        .iter()
        .filter(|(k, _)| *k != "hash")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let data_check_string = check_fields
        .iter_mut()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut secret_mac = Hmac::<Sha256>::new_from_slice(b"WebAppData").ok()?;
    secret_mac.update(bot_token.as_bytes());
    let secret_key = secret_mac.finalize().into_bytes();

    let mut check_mac = Hmac::<Sha256>::new_from_slice(&secret_key).ok()?;
    check_mac.update(data_check_string.as_bytes());
    let calculated_hash = hex::encode(check_mac.finalize().into_bytes());

    if calculated_hash != *received_hash {
        return None;
    }

    if let Some(auth_date) = pairs.get("auth_date").and_then(|v| v.parse::<u64>().ok()) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();
        if now.saturating_sub(auth_date) > AUTH_DATE_FRESHNESS_SECS {
            return None;
        }
    }

    let user_json = pairs.get("user")?;
    let user: TelegramUser = serde_json::from_str(user_json).ok()?;
    let display_name = match user.last_name {
        Some(last) => format!("{} {}", user.first_name, last),
        None => user.first_name,
    };
    Some(UserDescriptor {
        external_id: user.id.to_string(),
        display_name,
    })
}

fn parse_query_string(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                k.to_string(),
                urlencoding_decode(v).unwrap_or_else(|| v.to_string()),
            )
        })
        .collect()
}

fn urlencoding_decode(s: &str) -> Option<String> {
    percent_decode(s.as_bytes())
}

fn percent_decode(bytes: &[u8]) -> Option<String> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Issues a short-lived JWT access token for `user_id`, signed with the
/// configured `jwt_secret`. `expire_minutes` mirrors `JWT_EXPIRE_MINUTES`.
pub fn create_access_token(
    user_id: uuid::Uuid,
    jwt_secret: &str,
    expire_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + chrono::Duration::minutes(expire_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

/// Decodes and validates an access token, returning the carried user id.
pub fn decode_access_token(
    token: &str,
    jwt_secret: &str,
) -> Result<uuid::Uuid, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    data.claims.sub.parse().map_err(|_| {
        jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidSubject)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_tampered_hash() {
        let init_data = "user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&auth_date=1700000000&hash=deadbeef";
        assert!(verify_telegram_init_data(init_data, "bot-token").is_none());
    }

    #[test]
    fn round_trips_a_valid_signature() {
        let bot_token = "test-bot-token";
        let auth_date = chrono::Utc::now().timestamp();
        let user_json = r#"{"id":42,"first_name":"Ada","last_name":"Lovelace"}"#;
        let encoded_user = percent_encode(user_json);

        let data_check_string =
            format!("auth_date={auth_date}\nuser={encoded_user}");
        let unescaped_check_string = format!("auth_date={auth_date}\nuser={user_json}");

        let mut secret_mac = Hmac::<Sha256>::new_from_slice(b"WebAppData").unwrap();
        secret_mac.update(bot_token.as_bytes());
        let secret_key = secret_mac.finalize().into_bytes();

        let mut check_mac = Hmac::<Sha256>::new_from_slice(&secret_key).unwrap();
        check_mac.update(unescaped_check_string.as_bytes());
        let hash = hex::encode(check_mac.finalize().into_bytes());
        let _ = data_check_string;

        let init_data = format!("auth_date={auth_date}&user={encoded_user}&hash={hash}");
        let descriptor = verify_telegram_init_data(&init_data, bot_token).unwrap();
        assert_eq!(descriptor.external_id, "42");
        assert_eq!(descriptor.display_name, "Ada Lovelace");
    }

    fn percent_encode(s: &str) -> String {
        s.chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
                other => other
                    .to_string()
                    .into_bytes()
                    .iter()
                    .map(|b| format!("%{b:02X}"))
                    .collect(),
            })
            .collect()
    }

    #[test]
    fn access_token_round_trips() {
        let user_id = uuid::Uuid::new_v4();
        let token = create_access_token(user_id, "secret", 15).unwrap();
        let decoded = decode_access_token(&token, "secret").unwrap();
        assert_eq!(decoded, user_id);
    }
}
