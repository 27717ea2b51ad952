// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for authentication tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use super::login::{CredentialStore, LoginUser};
use super::principal::{AuthUser, UserLookup};
use super::Authenticator;
use crate::config::{JwtConfig, SecretKey};
use crate::token::{FixedClock, SubjectId, TokenFactory};

pub const NOW: i64 = 1_700_000_000;
pub const SECRET: &str = "auth-test-secret";

#[derive(Debug, Clone, PartialEq)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub active: bool,
}

impl AuthUser for TestUser {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl LoginUser for TestUser {
    fn id(&self) -> SubjectId {
        SubjectId::Integer(self.id)
    }

    fn username(&self) -> &str {
        &self.username
    }
}

/// In-memory user table keyed by numeric id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsers {
    users: HashMap<i64, TestUser>,
}

impl InMemoryUsers {
    pub fn with_user(mut self, id: i64, username: &str, active: bool) -> Self {
        self.users.insert(
            id,
            TestUser {
                id,
                username: username.to_string(),
                password: format!("{username}-password"),
                active,
            },
        );
        self
    }
}

impl UserLookup for InMemoryUsers {
    type User = TestUser;

    async fn find_user_by_id(&self, id: &SubjectId) -> Option<TestUser> {
        match id {
            SubjectId::Integer(id) => self.users.get(id).cloned(),
            SubjectId::String(_) => None,
        }
    }
}

impl CredentialStore for InMemoryUsers {
    type User = TestUser;

    async fn find_user_by_username(&self, username: &str) -> Option<TestUser> {
        self.users.values().find(|u| u.username == username).cloned()
    }

    async fn check_password(&self, user: &TestUser, password: &str) -> bool {
        user.password == password
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn factory_at(secs: i64) -> TokenFactory {
    let config = JwtConfig::new(SecretKey::new(SECRET).unwrap());
    TokenFactory::new(config).with_clock(Arc::new(FixedClock(at(secs))))
}

/// Users: 7 = alice (active), 8 = bob (inactive).
pub fn users() -> InMemoryUsers {
    InMemoryUsers::default()
        .with_user(7, "alice", true)
        .with_user(8, "bob", false)
}

pub fn authenticator_at(secs: i64) -> Authenticator<InMemoryUsers> {
    Authenticator::new(Arc::new(factory_at(secs)), users())
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
