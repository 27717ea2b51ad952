// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principal and the user-lookup collaborator.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::token::{Claims, SubjectId};

/// A user as far as authentication is concerned.
pub trait AuthUser {
    /// Inactive users are rejected even when their token is valid.
    fn is_active(&self) -> bool;
}

/// External user store consulted once per authenticated request.
///
/// This is the only call the authenticator makes outside the crate and the
/// only point where it suspends. Implementations typically query a database;
/// storage errors should be logged by the implementation and reported as
/// `None`.
pub trait UserLookup: Send + Sync {
    type User: AuthUser + Send;

    fn find_user_by_id(&self, id: &SubjectId) -> impl Future<Output = Option<Self::User>> + Send;
}

impl<L: UserLookup> UserLookup for Arc<L> {
    type User = L::User;

    fn find_user_by_id(&self, id: &SubjectId) -> impl Future<Output = Option<Self::User>> + Send {
        (**self).find_user_by_id(id)
    }
}

/// Result of successful authentication.
///
/// Carries the looked-up user together with the validated claims so callers
/// can read non-identity claims without a second lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal<U> {
    pub user: U,
    pub claims: Claims,
}

impl<U> Principal<U> {
    pub fn new(user: U, claims: Claims) -> Self {
        Self { user, claims }
    }

    /// Token expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }
}
