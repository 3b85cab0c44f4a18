//! Confirmation codes and bearer access tokens.
//!
//! A confirmation code is a time-boxed HMAC over the user's current state
//! (username, email, code epoch). Issuing an access token bumps the epoch,
//! so a code stops validating once it has been exchanged.

use std::sync::Arc;

use chrono::Duration;
use hmac::{Hmac, Mac};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::entities::users;
use crate::services::clock::Clock;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign access token: {0}")]
    Signing(String),

    #[error("invalid access token")]
    InvalidToken,
}

/// Claims carried by the bearer access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's database id.
    pub sub: i32,
    pub exp: usize,
    pub iat: usize,
}

pub struct TokenService {
    secret: Vec<u8>,
    code_ttl: Duration,
    access_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    #[must_use]
    pub fn new(auth: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: auth.token_secret.as_bytes().to_vec(),
            code_ttl: Duration::minutes(
                i64::try_from(auth.confirmation_code_ttl_minutes).unwrap_or(i64::MAX),
            ),
            access_ttl: Duration::minutes(
                i64::try_from(auth.access_token_ttl_minutes).unwrap_or(i64::MAX),
            ),
            clock,
        }
    }

    /// Builds a confirmation code for the user's current state.
    /// Format: `<issued-at hex>-<hmac hex>`.
    #[must_use]
    pub fn confirmation_code(&self, user: &users::Model) -> String {
        let issued_at = self.clock.now().timestamp();
        let mac = self.code_mac(user, issued_at);
        format!("{issued_at:x}-{}", encode_hex(&mac))
    }

    /// Checks a confirmation code against the user's current state. Fails on
    /// malformed input, expiry, a stale code epoch, or a bad MAC.
    #[must_use]
    pub fn check_confirmation_code(&self, user: &users::Model, code: &str) -> bool {
        let Some((issued_hex, mac_hex)) = code.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = i64::from_str_radix(issued_hex, 16) else {
            return false;
        };

        let now = self.clock.now().timestamp();
        if issued_at > now || now - issued_at > self.code_ttl.num_seconds() {
            return false;
        }

        let Some(expected) = decode_hex(mac_hex) else {
            return false;
        };

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(Self::code_material(user, issued_at).as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    /// Signs a bearer access token for the user with the configured expiry.
    pub fn issue_access_token(&self, user_id: i32) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id,
            iat: usize::try_from(now.timestamp()).unwrap_or(0),
            exp: usize::try_from((now + self.access_ttl).timestamp()).unwrap_or(usize::MAX),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Decodes and validates a bearer access token, returning its claims.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::InvalidToken)
    }

    fn code_mac(&self, user: &users::Model, issued_at: i64) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(Self::code_material(user, issued_at).as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn code_material(user: &users::Model, issued_at: i64) -> String {
        format!(
            "{}:{}:{}:{issued_at}",
            user.username, user.email, user.code_epoch
        )
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn test_user() -> users::Model {
        users::Model {
            id: 1,
            username: "marmot".to_string(),
            email: "marmot@example.com".to_string(),
            first_name: None,
            last_name: None,
            bio: None,
            role: "user".to_string(),
            is_superuser: false,
            code_epoch: 0,
            date_joined: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn service_at(at: DateTime<Utc>) -> TokenService {
        TokenService::new(&AuthConfig::default(), Arc::new(FixedClock(at)))
    }

    #[test]
    fn test_code_round_trip() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let service = service_at(now);
        let user = test_user();

        let code = service.confirmation_code(&user);
        assert!(service.check_confirmation_code(&user, &code));
    }

    #[test]
    fn test_code_rejected_for_other_user() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let service = service_at(now);
        let user = test_user();
        let mut other = test_user();
        other.username = "weasel".to_string();

        let code = service.confirmation_code(&user);
        assert!(!service.check_confirmation_code(&other, &code));
    }

    #[test]
    fn test_code_invalidated_by_epoch_bump() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let service = service_at(now);
        let mut user = test_user();

        let code = service.confirmation_code(&user);
        user.code_epoch += 1;
        assert!(!service.check_confirmation_code(&user, &code));
    }

    #[test]
    fn test_code_expires() {
        let issued = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let user = test_user();
        let code = service_at(issued).confirmation_code(&user);

        let later = issued + Duration::days(2);
        assert!(!service_at(later).check_confirmation_code(&user, &code));
    }

    #[test]
    fn test_code_from_the_future_rejected() {
        let issued = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let user = test_user();
        let code = service_at(issued).confirmation_code(&user);

        let earlier = issued - Duration::hours(1);
        assert!(!service_at(earlier).check_confirmation_code(&user, &code));
    }

    #[test]
    fn test_malformed_codes_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let service = service_at(now);
        let user = test_user();

        for bad in ["", "nodash", "zz-zz", "10-abc", "10-"] {
            assert!(!service.check_confirmation_code(&user, bad), "{bad:?}");
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        // Decoding uses jsonwebtoken's own clock, so issue with the real one
        // to keep exp in the future.
        let live = TokenService::new(
            &AuthConfig::default(),
            Arc::new(crate::services::SystemClock),
        );
        let token = live.issue_access_token(42).unwrap();
        let claims = live.decode_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);

        assert!(live.decode_access_token("garbage").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let bytes = vec![0x00, 0x7f, 0xff, 0x10];
        assert_eq!(decode_hex(&encode_hex(&bytes)).unwrap(), bytes);
        assert!(decode_hex("abc").is_none());
        assert!(decode_hex("zz").is_none());
    }
}
