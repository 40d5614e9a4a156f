//! Inbound request authentication
//!
//! Verifies that a control request claiming a user identity was issued by
//! that user's own chat client session. The client supplies the signed
//! key/value payload it received from the chat platform (`initData`); the
//! server recomputes the keyed hash from its bot token and compares in
//! constant time, then enforces a freshness window on the embedded issuance
//! timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::AuthError;
use crate::state::record::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Request header carrying the signed payload for mutating endpoints.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Key material for deriving the signing secret from the bot token. The
/// key/message assignment (constant as key, token as message) is fixed by
/// the external protocol and must not be swapped.
const SIGNING_CONTEXT: &[u8] = b"WebAppData";

/// Payload field carrying the signature.
const SIGNATURE_FIELD: &str = "hash";

/// Successfully verified payload contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayload {
    /// Identity claimed by the payload, when present.
    pub user_id: Option<UserId>,
    /// Issuance timestamp embedded by the chat platform.
    pub auth_date: DateTime<Utc>,
}

impl VerifiedPayload {
    /// Require the claimed identity to match the timer being mutated.
    pub fn require_user(&self, expected: UserId) -> Result<(), AuthError> {
        match self.user_id {
            Some(id) if id == expected => Ok(()),
            _ => Err(AuthError::IdentityMismatch),
        }
    }
}

#[derive(Deserialize)]
struct PayloadUser {
    id: UserId,
}

/// Verifies signed web payloads against the bot's long-lived secret token.
pub struct WebAppAuthenticator {
    secret: Vec<u8>,
    max_age_secs: u64,
}

impl WebAppAuthenticator {
    pub fn new(bot_token: &str, max_age_secs: u64) -> Self {
        let mut mac = HmacSha256::new_from_slice(SIGNING_CONTEXT)
            .expect("HMAC can take keys of any size");
        mac.update(bot_token.as_bytes());
        Self {
            secret: mac.finalize().into_bytes().to_vec(),
            max_age_secs,
        }
    }

    /// Verify a raw payload string (`key=value&...`, percent-encoded).
    ///
    /// Checks run in a fixed order: presence of fields and signature,
    /// signature match, freshness. Identity matching is left to the caller
    /// via [`VerifiedPayload::require_user`], since read-only queries are
    /// allowed without it.
    pub fn verify(&self, payload: &str, now: DateTime<Utc>) -> Result<VerifiedPayload, AuthError> {
        if payload.trim().is_empty() {
            return Err(AuthError::Empty);
        }

        let mut fields = BTreeMap::new();
        let mut signature = None;
        for pair in payload.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).map_err(|_| AuthError::Empty)?;
            let value = urlencoding::decode(value).map_err(|_| AuthError::Empty)?;
            if key == SIGNATURE_FIELD {
                signature = Some(value.into_owned());
            } else {
                fields.insert(key.into_owned(), value.into_owned());
            }
        }

        let signature = match signature {
            Some(s) if !s.is_empty() => s,
            _ => return Err(AuthError::Empty),
        };
        if fields.is_empty() {
            return Err(AuthError::Empty);
        }

        // BTreeMap iteration already yields the fields sorted by name.
        let check_string = fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take keys of any size");
        mac.update(check_string.as_bytes());
        let supplied = hex::decode(&signature).map_err(|_| AuthError::HashMismatch)?;
        // verify_slice compares in constant time.
        mac.verify_slice(&supplied)
            .map_err(|_| AuthError::HashMismatch)?;

        let auth_date = fields
            .get("auth_date")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .ok_or(AuthError::Stale {
                max_age_secs: self.max_age_secs,
            })?;
        let age = now.signed_duration_since(auth_date).num_seconds();
        if age > self.max_age_secs as i64 {
            return Err(AuthError::Stale {
                max_age_secs: self.max_age_secs,
            });
        }

        let user_id = fields
            .get("user")
            .and_then(|raw| serde_json::from_str::<PayloadUser>(raw).ok())
            .map(|user| user.id);

        Ok(VerifiedPayload { user_id, auth_date })
    }
}
