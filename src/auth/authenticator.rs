// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential authentication.
//!
//! [`Authenticator::authenticate`] and [`Authenticator::authenticate_optional`]
//! are the two calling conventions a request pipeline needs: the first
//! rejects the request on any failure, the second lets the pipeline fall
//! through to another authentication method. Both run the same validation.

use std::sync::Arc;

use super::error::AuthError;
use super::principal::{AuthUser, Principal, UserLookup};
use crate::token::{TokenError, TokenFactory};

/// Credential scheme accepted in the authorization header (case-sensitive).
pub const BEARER_SCHEME: &str = "Bearer";

/// Outcome of parsing an authorization header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// `Bearer <token>`
    Bearer(&'a str),
    /// Some other scheme, e.g. `Basic ...`
    OtherScheme,
}

/// Parse a raw authorization header value.
///
/// The value must be exactly two whitespace-delimited parts. A first part
/// other than `Bearer` is reported as [`Credential::OtherScheme`] before the
/// part count is checked.
pub fn parse_authorization(header: &[u8]) -> Result<Credential<'_>, AuthError> {
    let parts: Vec<&[u8]> = header
        .split(u8::is_ascii_whitespace)
        .filter(|part| !part.is_empty())
        .collect();

    let Some(scheme) = parts.first() else {
        return Err(AuthError::MalformedHeader);
    };
    if *scheme != BEARER_SCHEME.as_bytes() {
        return Ok(Credential::OtherScheme);
    }
    if parts.len() != 2 {
        return Err(AuthError::MalformedHeader);
    }

    std::str::from_utf8(parts[1])
        .map(Credential::Bearer)
        .map_err(|_| AuthError::MalformedHeader)
}

/// Resolves bearer credentials into principals.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct Authenticator<L> {
    factory: Arc<TokenFactory>,
    lookup: L,
}

impl<L: UserLookup> Authenticator<L> {
    pub fn new(factory: Arc<TokenFactory>, lookup: L) -> Self {
        Self { factory, lookup }
    }

    pub fn factory(&self) -> &TokenFactory {
        &self.factory
    }

    /// Authenticate, failing on anything short of an active user.
    ///
    /// `header` is the raw authorization header value, if one was sent.
    pub async fn authenticate(&self, header: Option<&[u8]>) -> Result<Principal<L::User>, AuthError> {
        let result = self.resolve(header).await;
        if let Err(e) = &result {
            tracing::debug!(reason = e.error_code(), "bearer authentication rejected");
        }
        result
    }

    /// Authenticate, returning `None` instead of failing.
    ///
    /// A missing header or a foreign scheme means "no credential for this
    /// method"; the pipeline should try its next authentication method.
    /// Every other failure is downgraded the same way.
    pub async fn authenticate_optional(&self, header: Option<&[u8]>) -> Option<Principal<L::User>> {
        let header = header?;
        if let Ok(Credential::OtherScheme) = parse_authorization(header) {
            return None;
        }

        match self.resolve(Some(header)).await {
            Ok(principal) => Some(principal),
            Err(e) => {
                tracing::debug!(reason = e.error_code(), "ignoring invalid bearer credential");
                None
            }
        }
    }

    async fn resolve(&self, header: Option<&[u8]>) -> Result<Principal<L::User>, AuthError> {
        let header = header.ok_or(AuthError::MissingCredential)?;
        let token = match parse_authorization(header)? {
            Credential::Bearer(token) => token,
            // Another scheme carries no bearer credential
            Credential::OtherScheme => return Err(AuthError::MissingCredential),
        };

        let claims = self.factory.decode(token).map_err(|e| match e {
            TokenError::Expired { .. } => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        let subject = claims
            .subject(self.factory.config().subject_claim())
            .ok_or(AuthError::NoSubject)?
            .ok_or(AuthError::UserNotFound)?;

        let user = self
            .lookup
            .find_user_by_id(&subject)
            .await
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active() {
            return Err(AuthError::UserInactive);
        }

        Ok(Principal::new(user, claims))
    }
}
