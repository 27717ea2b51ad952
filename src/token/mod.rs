// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Module
//!
//! Issuance and validation of HMAC-signed JWTs.
//!
//! ## Layers
//!
//! - `codec` - compact JWS encode/decode via `jsonwebtoken` (structure,
//!   algorithm allow-list, signature)
//! - `expiry` - `exp` computation, normalization and validation with leeway
//! - `factory` - [`TokenFactory`], which wires the two together and folds
//!   their errors into [`TokenError`]
//!
//! Tokens carry `exp` as integer epoch seconds on the wire. After decode it
//! is always a structured timestamp ([`ClaimValue::Timestamp`]).

pub mod algorithm;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod expiry;
pub mod factory;

pub use algorithm::SigningAlgorithm;
pub use claims::{ClaimValue, Claims, SubjectId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use factory::{TokenError, TokenFactory};
