// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token factory: the single entry point for issuing and validating tokens.
//!
//! The factory owns a [`JwtConfig`] and a [`Clock`]. Both are fixed at
//! construction, so one instance can be shared (typically behind an `Arc`)
//! by any number of concurrent callers without locking.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::claims::{ClaimValue, Claims, SubjectId, EXP_CLAIM};
use super::clock::{Clock, SystemClock};
use super::codec::{self, CodecError, TokenHeader};
use super::expiry::{self, ExpValue, ExpiryError};
use crate::config::{ConfigError, JwtConfig, JwtSettings, SecretKey};

/// Factory-level errors.
///
/// Codec and expiry failures are folded into this smaller vocabulary;
/// callers never see raw parse or signature errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token verified but its `exp` is at or before `now - leeway`
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    /// Any other decode failure (structure, algorithm, signature, claims)
    #[error("token is invalid: {0}")]
    Invalid(String),
    /// Token could not be signed
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<CodecError> for TokenError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Signing(msg) => TokenError::Signing(msg),
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

impl From<ExpiryError> for TokenError {
    fn from(err: ExpiryError) -> Self {
        match err {
            ExpiryError::Expired(expired_at) => TokenError::Expired { expired_at },
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// Issues and validates signed, expiring tokens.
#[derive(Clone)]
pub struct TokenFactory {
    config: JwtConfig,
    clock: Arc<dyn Clock>,
}

impl TokenFactory {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Factory from raw settings.
    ///
    /// `fallback_secret` stands in for the process-wide secret when the
    /// settings carry none.
    pub fn from_settings(settings: JwtSettings, fallback_secret: Option<SecretKey>) -> Result<Self, ConfigError> {
        Ok(Self::new(JwtConfig::from_settings(settings, fallback_secret)?))
    }

    /// Factory configured from the process environment.
    ///
    /// See [`crate::config`] for the variables read.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(JwtConfig::from_env()?))
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Sign `claims` with the default algorithm.
    ///
    /// If `exp` is absent (or null) it is set to `now + lifetime`. An
    /// explicit integer or timestamp `exp` is kept as given.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let mut payload = claims.clone();

        let explicit = match payload.get(EXP_CLAIM) {
            None | Some(ClaimValue::Null) => None,
            Some(ClaimValue::Integer(secs)) => Some(ExpValue::Epoch(*secs)),
            Some(ClaimValue::Timestamp(t)) => Some(ExpValue::Timestamp(*t)),
            Some(_) => return self.sign(&payload),
        };
        // An epoch outside the timestamp range is signed as given
        if let Some(exp) = expiry::compute_exp(self.clock.now(), self.config.lifetime(), explicit) {
            payload.set(EXP_CLAIM, exp);
        }

        self.sign(&payload)
    }

    /// Verify `token` and return its claims with `exp` as a timestamp.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut claims = codec::decode(
            token,
            self.config.secret().as_bytes(),
            self.config.allowed_algorithms(),
        )?;

        expiry::normalize_exp(&mut claims);
        expiry::validate_exp(&claims, self.clock.now(), self.config.leeway())?;

        Ok(claims)
    }

    /// Issue a token carrying the subject claim and `username`.
    pub fn issue_for_user(&self, user_id: impl Into<SubjectId>, username: &str) -> Result<String, TokenError> {
        let user_id: SubjectId = user_id.into();
        let claims = Claims::new()
            .with(self.config.subject_claim(), user_id)
            .with("username", username);
        self.encode(&claims)
    }

    fn sign(&self, payload: &Claims) -> Result<String, TokenError> {
        let header = TokenHeader::from(self.config.default_algorithm());
        Ok(codec::encode(&header, payload, self.config.secret().as_bytes())?)
    }
}

impl std::fmt::Debug for TokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
