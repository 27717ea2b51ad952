// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT bearer authentication for Axum services.
//!
//! Issues HMAC-signed, expiring tokens and authenticates requests carrying
//! `Authorization: Bearer <token>` against an external user store.
//!
//! ## Modules
//!
//! - `token` - Claims, signing codec, expiry policy and the token factory
//! - `auth` - Header parsing, authenticator, extractors, middleware and login
//! - `config` - Environment-driven token configuration
//! - `telemetry` - Tracing subscriber setup

pub mod auth;
pub mod config;
pub mod telemetry;
pub mod token;
