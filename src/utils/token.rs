use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Lifetime assumed for a bearer token whose expiry cannot be read.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 15 * 60;

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token payload has no numeric exp claim")]
    MissingExpiry,
}

/// Reads the `exp` claim from a bearer token without verifying it.
pub fn decode_expiry(token: &str) -> Result<i64, TokenDecodeError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(TokenDecodeError::MissingPayload)?;

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Value = serde_json::from_slice(&bytes)?;

    let exp = claims.get("exp").ok_or(TokenDecodeError::MissingExpiry)?;
    exp.as_i64()
        .or_else(|| exp.as_f64().map(|secs| secs as i64))
        .ok_or(TokenDecodeError::MissingExpiry)
}

/// Expiry for `token`, or `now + 15 minutes` when it cannot be decoded.
/// Decode failures are logged and never fail the session.
pub fn expiry_or_default(token: &str, now: i64) -> i64 {
    match decode_expiry(token) {
        Ok(exp) => exp,
        Err(err) => {
            warn!(error = %err, "could not decode access token expiry, assuming default lifetime");
            now + DEFAULT_TOKEN_LIFETIME_SECS
        }
    }
}

#[cfg(test)]
pub(crate) fn token_with_payload(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_integer_exp_claim_exactly() {
        let token = token_with_payload(&json!({ "sub": "u-1", "exp": 1_900_000_123 }));
        assert_eq!(decode_expiry(&token).unwrap(), 1_900_000_123);
        assert_eq!(expiry_or_default(&token, 0), 1_900_000_123);
    }

    #[test]
    fn truncates_fractional_exp_claim() {
        let token = token_with_payload(&json!({ "exp": 1_700_000_000.75 }));
        assert_eq!(decode_expiry(&token).unwrap(), 1_700_000_000);
    }

    #[test]
    fn tolerates_padded_payload() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":42}"#);
        let token = format!("{header}.{body}.sig");
        assert_eq!(decode_expiry(&token).unwrap(), 42);
    }

    #[test]
    fn opaque_token_falls_back_to_fifteen_minutes() {
        let now = 1_700_000_000;
        assert!(matches!(
            decode_expiry("opaque-token"),
            Err(TokenDecodeError::MissingPayload)
        ));
        assert_eq!(expiry_or_default("opaque-token", now), now + 900);
    }

    #[test]
    fn garbage_payload_falls_back_to_default() {
        let now = 1_000;
        assert!(matches!(
            decode_expiry("a.!!!.c"),
            Err(TokenDecodeError::Base64(_))
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(
            decode_expiry(&not_json),
            Err(TokenDecodeError::Json(_))
        ));
        assert_eq!(expiry_or_default(&not_json, now), now + DEFAULT_TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn missing_or_non_numeric_exp_falls_back() {
        let no_exp = token_with_payload(&json!({ "sub": "u-1" }));
        let text_exp = token_with_payload(&json!({ "exp": "tomorrow" }));
        assert!(matches!(
            decode_expiry(&no_exp),
            Err(TokenDecodeError::MissingExpiry)
        ));
        assert!(matches!(
            decode_expiry(&text_exp),
            Err(TokenDecodeError::MissingExpiry)
        ));
        assert_eq!(expiry_or_default(&text_exp, 10), 910);
    }
}
