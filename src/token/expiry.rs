// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expiry policy.
//!
//! ## Leeway
//!
//! A token is rejected once `exp <= now - leeway`. Leeway therefore extends
//! acceptance *past* nominal expiry to absorb clock skew between issuer and
//! verifier; it never causes a token to be rejected early.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::claims::{ClaimValue, Claims, EXP_CLAIM};

/// Expiry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    /// `exp` is at or before `now - leeway`
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
    /// No `exp` claim
    #[error("token has no exp claim")]
    MissingExp,
    /// `exp` is present but not a point in time
    #[error("exp claim is not a timestamp")]
    InvalidExp,
}

/// Caller-supplied expiry, in either accepted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpValue {
    /// Seconds since the Unix epoch
    Epoch(i64),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for ExpValue {
    fn from(value: i64) -> Self {
        ExpValue::Epoch(value)
    }
}

impl From<DateTime<Utc>> for ExpValue {
    fn from(value: DateTime<Utc>) -> Self {
        ExpValue::Timestamp(value)
    }
}

/// Compute the expiry for a new token.
///
/// An explicit value is used verbatim; otherwise `now + lifetime`. Returns
/// `None` when an explicit epoch has no timestamp representation, in which
/// case the caller keeps the raw value.
pub fn compute_exp(now: DateTime<Utc>, lifetime: Duration, explicit: Option<ExpValue>) -> Option<DateTime<Utc>> {
    match explicit {
        Some(ExpValue::Timestamp(t)) => Some(t),
        Some(ExpValue::Epoch(secs)) => epoch_to_timestamp(secs),
        None => Some(now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC)),
    }
}

/// Reject claims whose `exp` is at or before `now - leeway`.
pub fn validate_exp(claims: &Claims, now: DateTime<Utc>, leeway: Duration) -> Result<(), ExpiryError> {
    if !claims.has(EXP_CLAIM) {
        return Err(ExpiryError::MissingExp);
    }
    let exp = claims.expires_at().ok_or(ExpiryError::InvalidExp)?;

    let cutoff = now.checked_sub_signed(leeway).unwrap_or(DateTime::<Utc>::MIN_UTC);
    if exp <= cutoff {
        return Err(ExpiryError::Expired(exp));
    }
    Ok(())
}

/// Rewrite an epoch-seconds `exp` as a structured timestamp.
///
/// Fractional epochs are rounded up to the next whole second, so a token is
/// never treated as expired before its nominal expiry. Values that are already
/// timestamps, absent, or not numeric are left untouched.
pub fn normalize_exp(claims: &mut Claims) {
    let normalized = match claims.get(EXP_CLAIM) {
        Some(ClaimValue::Integer(secs)) => epoch_to_timestamp(*secs),
        Some(ClaimValue::Json(serde_json::Value::Number(n))) => {
            n.as_f64().and_then(|secs| epoch_to_timestamp(secs.ceil() as i64))
        }
        _ => None,
    };

    if let Some(exp) = normalized {
        claims.set(EXP_CLAIM, exp);
    }
}

fn epoch_to_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
