// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for Axum services.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with username and password ([`login`])
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server:
//!    - Verifies signature and algorithm against the configured allow-list
//!    - Rejects tokens whose `exp` is at or before `now - leeway`
//!    - Reads the subject claim (`user_id` by default)
//!    - Loads the user through [`UserLookup`] and requires it to be active
//!
//! ## Hard and soft mode
//!
//! - [`Auth`] / [`auth_middleware`] reject with 401 on any failure
//! - [`OptionalAuth`] yields `None` so another method can be tried

pub mod authenticator;
pub mod error;
pub mod extractor;
pub mod login;
pub mod middleware;
pub mod principal;

#[cfg(test)]
mod testutil;

pub use authenticator::{parse_authorization, Authenticator, Credential, BEARER_SCHEME};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use login::{
    login, login_handler, CredentialStore, LoginError, LoginRequest, LoginResponse, LoginService, LoginUser,
};
pub use middleware::auth_middleware;
pub use principal::{AuthUser, Principal, UserLookup};
