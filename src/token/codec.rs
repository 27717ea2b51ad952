// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compact JWS encoding and decoding of [`Claims`].
//!
//! Signing and verification are delegated to `jsonwebtoken`. The codec only
//! checks structure, algorithm and signature; time-based validation belongs
//! to the [expiry policy](super::expiry).

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode_header, DecodingKey, EncodingKey, Header, Validation};

use super::algorithm::SigningAlgorithm;
use super::claims::Claims;

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Token cannot be split into header, payload and signature
    #[error("token is malformed: {0}")]
    MalformedToken(String),
    /// Signature does not verify under the given secret
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// Header names an algorithm outside the allow-list
    #[error("token algorithm {0} is not allowed")]
    AlgorithmNotAllowed(String),
    /// Secret or algorithm unusable for signing
    #[error("cannot sign token: {0}")]
    Signing(String),
}

/// Header fields the codec controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenHeader {
    pub algorithm: SigningAlgorithm,
}

impl From<SigningAlgorithm> for TokenHeader {
    fn from(algorithm: SigningAlgorithm) -> Self {
        Self { algorithm }
    }
}

/// Sign `claims` and return the compact `header.payload.signature` form.
pub fn encode(header: &TokenHeader, claims: &Claims, secret: &[u8]) -> Result<String, CodecError> {
    if secret.is_empty() {
        return Err(CodecError::Signing("secret is empty".to_string()));
    }

    jsonwebtoken::encode(
        &Header::new(header.algorithm.to_jsonwebtoken()),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| CodecError::Signing(e.to_string()))
}

/// Verify `token` under `secret` and return its claims.
///
/// The header algorithm must be one of `allowed`.
pub fn decode(token: &str, secret: &[u8], allowed: &[SigningAlgorithm]) -> Result<Claims, CodecError> {
    // Nothing verifies under an empty key
    if secret.is_empty() {
        return Err(CodecError::SignatureInvalid);
    }

    let header = decode_header(token).map_err(|e| CodecError::MalformedToken(e.to_string()))?;
    if !allowed.iter().any(|alg| alg.to_jsonwebtoken() == header.alg) {
        return Err(CodecError::AlgorithmNotAllowed(format!("{:?}", header.alg)));
    }

    let mut validation = Validation::new(header.alg);
    validation.algorithms = allowed.iter().map(|alg| alg.to_jsonwebtoken()).collect();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => CodecError::SignatureInvalid,
            ErrorKind::InvalidAlgorithm => CodecError::AlgorithmNotAllowed(format!("{:?}", header.alg)),
            _ => CodecError::MalformedToken(e.to_string()),
        })
}
