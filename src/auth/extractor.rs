// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated principals.
//!
//! The application state must provide an `Arc<Authenticator<L>>` through
//! [`FromRef`]:
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! struct AppState {
//!     authn: Arc<Authenticator<PgUsers>>,
//! }
//!
//! impl FromRef<AppState> for Arc<Authenticator<PgUsers>> {
//!     fn from_ref(state: &AppState) -> Self {
//!         state.authn.clone()
//!     }
//! }
//!
//! async fn me(Auth(principal): Auth<PgUsers>) -> Json<UserProfile> {
//!     Json(principal.user.into())
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

use super::authenticator::Authenticator;
use super::error::AuthError;
use super::principal::{Principal, UserLookup};

/// Extractor requiring a valid bearer credential.
///
/// Rejects with [`AuthError`] (401) on any failure. If
/// [`auth_middleware`](super::middleware::auth_middleware) already
/// authenticated the request, its principal is reused.
pub struct Auth<L: UserLookup>(pub Principal<L::User>);

impl<S, L> FromRequestParts<S> for Auth<L>
where
    S: Send + Sync,
    L: UserLookup + 'static,
    L::User: Clone + Sync + 'static,
    Arc<Authenticator<L>>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the principal
        if let Some(principal) = parts.extensions.get::<Principal<L::User>>().cloned() {
            return Ok(Auth(principal));
        }

        let authenticator = Arc::<Authenticator<L>>::from_ref(state);
        let header = parts.headers.get(AUTHORIZATION).map(HeaderValue::as_bytes);

        authenticator.authenticate(header).await.map(Auth)
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting, so handlers can serve anonymous
/// callers or fall back to another authentication method.
pub struct OptionalAuth<L: UserLookup>(pub Option<Principal<L::User>>);

impl<S, L> FromRequestParts<S> for OptionalAuth<L>
where
    S: Send + Sync,
    L: UserLookup + 'static,
    L::User: Clone + Sync + 'static,
    Arc<Authenticator<L>>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal<L::User>>().cloned() {
            return Ok(OptionalAuth(Some(principal)));
        }

        let authenticator = Arc::<Authenticator<L>>::from_ref(state);
        let header = parts.headers.get(AUTHORIZATION).map(HeaderValue::as_bytes);

        Ok(OptionalAuth(authenticator.authenticate_optional(header).await))
    }
}
