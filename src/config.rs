// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Configuration
//!
//! [`JwtSettings`] is the raw configuration surface (deserializable, every
//! field defaulted). [`JwtConfig`] is the validated form the token factory is
//! built from: algorithm identifiers are parsed, the default algorithm is
//! checked against the allow-list and the secret is resolved. Nothing in the
//! crate reads process-wide settings on its own; [`JwtConfig::from_env`] is
//! the explicit convenience entry point for that.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET_KEY` | HMAC signing secret | falls back to `SECRET_KEY` |
//! | `SECRET_KEY` | Process-wide default signing secret | Required if `JWT_SECRET_KEY` is unset |
//! | `JWT_DEFAULT_ALGORITHM` | Algorithm used to sign new tokens | `HS256` |
//! | `JWT_ALLOWED_ALGORITHMS` | Comma separated algorithms accepted on decode | `HS256` |
//! | `JWT_LIFETIME_SECONDS` | Lifetime of issued tokens | `86400` |
//! | `JWT_LEEWAY_SECONDS` | Tolerance after expiry for clock skew | `0` |
//! | `JWT_SUBJECT_CLAIM` | Claim holding the user identifier | `user_id` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::Deserialize;

use crate::token::algorithm::{SigningAlgorithm, UnsupportedAlgorithm};
use crate::token::claims::DEFAULT_SUBJECT_CLAIM;

pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";
pub const JWT_DEFAULT_ALGORITHM_ENV: &str = "JWT_DEFAULT_ALGORITHM";
pub const JWT_ALLOWED_ALGORITHMS_ENV: &str = "JWT_ALLOWED_ALGORITHMS";
pub const JWT_LIFETIME_SECONDS_ENV: &str = "JWT_LIFETIME_SECONDS";
pub const JWT_LEEWAY_SECONDS_ENV: &str = "JWT_LEEWAY_SECONDS";
pub const JWT_SUBJECT_CLAIM_ENV: &str = "JWT_SUBJECT_CLAIM";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default token lifetime (24 hours).
pub const DEFAULT_LIFETIME_SECONDS: i64 = 60 * 60 * 24;

/// Configuration errors. All of them surface at load time, never on decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no signing secret configured (set JWT_SECRET_KEY or SECRET_KEY)")]
    MissingSecret,
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),
    #[error("at least one algorithm must be allowed")]
    NoAllowedAlgorithms,
    #[error("default algorithm {0} is not in the allowed set")]
    DefaultAlgorithmNotAllowed(SigningAlgorithm),
    #[error("{field} must not be negative (got {value})")]
    NegativeDuration { field: &'static str, value: i64 },
    #[error("{name} is not a valid integer: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("subject claim name must not be empty")]
    EmptySubjectClaim,
}

/// HMAC signing secret. Never empty; redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Raw configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub secret_key: Option<String>,
    pub default_signing_algorithm: String,
    pub allowed_algorithms: Vec<String>,
    pub token_lifetime_seconds: i64,
    pub leeway_seconds: i64,
    pub subject_claim: String,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            default_signing_algorithm: SigningAlgorithm::HS256.to_string(),
            allowed_algorithms: vec![SigningAlgorithm::HS256.to_string()],
            token_lifetime_seconds: DEFAULT_LIFETIME_SECONDS,
            leeway_seconds: 0,
            subject_claim: DEFAULT_SUBJECT_CLAIM.to_string(),
        }
    }
}

impl JwtSettings {
    /// Read settings from the process environment.
    ///
    /// Only `JWT_SECRET_KEY` is consulted for the secret here; the
    /// `SECRET_KEY` fallback is applied by [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_optional)
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        settings.secret_key = lookup(JWT_SECRET_KEY_ENV);
        if let Some(alg) = lookup(JWT_DEFAULT_ALGORITHM_ENV) {
            settings.default_signing_algorithm = alg;
        }
        if let Some(algs) = lookup(JWT_ALLOWED_ALGORITHMS_ENV) {
            settings.allowed_algorithms = algs
                .split(',')
                .map(str::trim)
                .filter(|alg| !alg.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup(JWT_LIFETIME_SECONDS_ENV) {
            settings.token_lifetime_seconds = parse_seconds(JWT_LIFETIME_SECONDS_ENV, &value)?;
        }
        if let Some(value) = lookup(JWT_LEEWAY_SECONDS_ENV) {
            settings.leeway_seconds = parse_seconds(JWT_LEEWAY_SECONDS_ENV, &value)?;
        }
        if let Some(claim) = lookup(JWT_SUBJECT_CLAIM_ENV) {
            settings.subject_claim = claim;
        }

        Ok(settings)
    }
}

/// Validated token factory configuration.
///
/// Read-only once built; the invariants checked by [`JwtConfig::from_settings`]
/// and the builder methods hold for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    secret: SecretKey,
    default_algorithm: SigningAlgorithm,
    allowed_algorithms: Vec<SigningAlgorithm>,
    lifetime: Duration,
    leeway: Duration,
    subject_claim: String,
}

impl JwtConfig {
    /// Defaults: HS256 only, 24h lifetime, no leeway, `user_id` subject.
    pub fn new(secret: SecretKey) -> Self {
        Self {
            secret,
            default_algorithm: SigningAlgorithm::HS256,
            allowed_algorithms: vec![SigningAlgorithm::HS256],
            lifetime: Duration::seconds(DEFAULT_LIFETIME_SECONDS),
            leeway: Duration::zero(),
            subject_claim: DEFAULT_SUBJECT_CLAIM.to_string(),
        }
    }

    /// Build from raw settings.
    ///
    /// `fallback_secret` is the process-wide default signing secret, used
    /// only when the settings carry none.
    pub fn from_settings(settings: JwtSettings, fallback_secret: Option<SecretKey>) -> Result<Self, ConfigError> {
        let secret = match settings.secret_key {
            Some(secret) => SecretKey::new(secret)?,
            None => {
                let secret = fallback_secret.ok_or(ConfigError::MissingSecret)?;
                tracing::warn!("no dedicated JWT secret configured, using the default signing secret");
                secret
            }
        };

        let default_algorithm: SigningAlgorithm = settings.default_signing_algorithm.parse()?;
        let allowed_algorithms = settings
            .allowed_algorithms
            .iter()
            .map(|alg| alg.parse())
            .collect::<Result<Vec<SigningAlgorithm>, _>>()?;

        JwtConfig::new(secret)
            .with_algorithms(default_algorithm, allowed_algorithms)?
            .with_lifetime_seconds(settings.token_lifetime_seconds)?
            .with_leeway_seconds(settings.leeway_seconds)?
            .with_subject_claim(settings.subject_claim)
    }

    /// Build from the process environment.
    ///
    /// `JWT_SECRET_KEY` wins over the process-wide `SECRET_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fallback = env_optional(SECRET_KEY_ENV).map(SecretKey::new).transpose()?;
        Self::from_settings(JwtSettings::from_env()?, fallback)
    }

    /// Set the signing algorithm and the algorithms accepted on decode.
    pub fn with_algorithms(
        mut self,
        default_algorithm: SigningAlgorithm,
        allowed: impl IntoIterator<Item = SigningAlgorithm>,
    ) -> Result<Self, ConfigError> {
        let mut allowed_algorithms: Vec<SigningAlgorithm> = Vec::new();
        for alg in allowed {
            if !allowed_algorithms.contains(&alg) {
                allowed_algorithms.push(alg);
            }
        }

        if allowed_algorithms.is_empty() {
            return Err(ConfigError::NoAllowedAlgorithms);
        }
        if !allowed_algorithms.contains(&default_algorithm) {
            return Err(ConfigError::DefaultAlgorithmNotAllowed(default_algorithm));
        }

        self.default_algorithm = default_algorithm;
        self.allowed_algorithms = allowed_algorithms;
        Ok(self)
    }

    pub fn with_lifetime(mut self, lifetime: StdDuration) -> Self {
        self.lifetime = Duration::from_std(lifetime).unwrap_or(Duration::MAX);
        self
    }

    pub fn with_leeway(mut self, leeway: StdDuration) -> Self {
        self.leeway = Duration::from_std(leeway).unwrap_or(Duration::MAX);
        self
    }

    pub fn with_lifetime_seconds(mut self, seconds: i64) -> Result<Self, ConfigError> {
        self.lifetime = non_negative_seconds("token_lifetime_seconds", seconds)?;
        Ok(self)
    }

    pub fn with_leeway_seconds(mut self, seconds: i64) -> Result<Self, ConfigError> {
        self.leeway = non_negative_seconds("leeway_seconds", seconds)?;
        Ok(self)
    }

    pub fn with_subject_claim(mut self, claim: impl Into<String>) -> Result<Self, ConfigError> {
        let claim = claim.into();
        if claim.trim().is_empty() {
            return Err(ConfigError::EmptySubjectClaim);
        }
        self.subject_claim = claim;
        Ok(self)
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn default_algorithm(&self) -> SigningAlgorithm {
        self.default_algorithm
    }

    pub fn allowed_algorithms(&self) -> &[SigningAlgorithm] {
        &self.allowed_algorithms
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    pub fn subject_claim(&self) -> &str {
        &self.subject_claim
    }
}

fn non_negative_seconds(field: &'static str, seconds: i64) -> Result<Duration, ConfigError> {
    if seconds < 0 {
        return Err(ConfigError::NegativeDuration { field, value: seconds });
    }
    Duration::try_seconds(seconds).ok_or(ConfigError::InvalidNumber {
        name: field,
        value: seconds.to_string(),
    })
}

fn parse_seconds(name: &'static str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

pub(crate) fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn secret() -> SecretKey {
        SecretKey::new("config-test-secret").unwrap()
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = JwtConfig::new(secret());
        assert_eq!(config.default_algorithm(), SigningAlgorithm::HS256);
        assert_eq!(config.allowed_algorithms(), &[SigningAlgorithm::HS256]);
        assert_eq!(config.lifetime(), Duration::hours(24));
        assert_eq!(config.leeway(), Duration::zero());
        assert_eq!(config.subject_claim(), "user_id");
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SecretKey::new(""), Err(ConfigError::EmptySecret));
        let settings = JwtSettings {
            secret_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            JwtConfig::from_settings(settings, None).unwrap_err(),
            ConfigError::EmptySecret
        );
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        assert_eq!(format!("{:?}", secret()), "SecretKey(..)");
    }

    #[test]
    fn settings_secret_wins_over_fallback() {
        let settings = JwtSettings {
            secret_key: Some("explicit".to_string()),
            ..Default::default()
        };
        let config = JwtConfig::from_settings(settings, Some(secret())).unwrap();
        assert_eq!(config.secret().as_bytes(), b"explicit");
    }

    #[test]
    fn fallback_secret_is_used_when_unset() {
        let config = JwtConfig::from_settings(JwtSettings::default(), Some(secret())).unwrap();
        assert_eq!(config.secret(), &secret());

        assert_eq!(
            JwtConfig::from_settings(JwtSettings::default(), None).unwrap_err(),
            ConfigError::MissingSecret
        );
    }

    #[test]
    fn unknown_algorithm_is_rejected_at_load() {
        let settings = JwtSettings {
            allowed_algorithms: vec!["HS256".to_string(), "none".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            JwtConfig::from_settings(settings, Some(secret())),
            Err(ConfigError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn default_algorithm_must_be_allowed() {
        let result = JwtConfig::new(secret()).with_algorithms(SigningAlgorithm::HS512, [SigningAlgorithm::HS256]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DefaultAlgorithmNotAllowed(SigningAlgorithm::HS512)
        );

        let result = JwtConfig::new(secret()).with_algorithms(SigningAlgorithm::HS256, Vec::new());
        assert_eq!(result.unwrap_err(), ConfigError::NoAllowedAlgorithms);
    }

    #[test]
    fn negative_durations_are_rejected() {
        let settings = JwtSettings {
            leeway_seconds: -5,
            ..Default::default()
        };
        assert_eq!(
            JwtConfig::from_settings(settings, Some(secret())).unwrap_err(),
            ConfigError::NegativeDuration {
                field: "leeway_seconds",
                value: -5
            }
        );
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: JwtSettings =
            serde_json::from_str(r#"{"secret_key":"s3cret","leeway_seconds":30}"#).unwrap();
        assert_eq!(settings.secret_key.as_deref(), Some("s3cret"));
        assert_eq!(settings.leeway_seconds, 30);
        assert_eq!(settings.token_lifetime_seconds, DEFAULT_LIFETIME_SECONDS);
        assert_eq!(settings.allowed_algorithms, vec!["HS256".to_string()]);
    }

    #[test]
    fn settings_read_from_lookup() {
        let settings = JwtSettings::from_lookup(lookup(&[
            (JWT_SECRET_KEY_ENV, "env-secret"),
            (JWT_DEFAULT_ALGORITHM_ENV, "HS384"),
            (JWT_ALLOWED_ALGORITHMS_ENV, "HS256, HS384,"),
            (JWT_LIFETIME_SECONDS_ENV, "3600"),
            (JWT_LEEWAY_SECONDS_ENV, "15"),
            (JWT_SUBJECT_CLAIM_ENV, "sub"),
        ]))
        .unwrap();

        let config = JwtConfig::from_settings(settings, None).unwrap();
        assert_eq!(config.default_algorithm(), SigningAlgorithm::HS384);
        assert_eq!(
            config.allowed_algorithms(),
            &[SigningAlgorithm::HS256, SigningAlgorithm::HS384]
        );
        assert_eq!(config.lifetime(), Duration::seconds(3600));
        assert_eq!(config.leeway(), Duration::seconds(15));
        assert_eq!(config.subject_claim(), "sub");
    }

    #[test]
    fn non_numeric_lifetime_is_rejected() {
        let result = JwtSettings::from_lookup(lookup(&[(JWT_LIFETIME_SECONDS_ENV, "a day")]));
        assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
    }
}
