// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Realm advertised in `WWW-Authenticate` on rejection.
pub const AUTHENTICATE_REALM: &str = "api";

/// Authentication failure.
///
/// Every header, token and lookup failure is reported as one of these, so
/// the host pipeline has a single shape to branch on. None of them is fatal:
/// each one rejects a single request's credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authorization header, or one using another scheme
    #[error("Bearer authorization header is required")]
    MissingCredential,
    /// `Bearer` header not of the form `Bearer <token>`
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    MalformedHeader,
    /// Token failed to parse or verify
    #[error("Token is invalid")]
    InvalidToken,
    /// Token verified but has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Token carries no subject claim
    #[error("Token contained no recognizable user identification")]
    NoSubject,
    /// Subject does not resolve to a user
    #[error("User not found")]
    UserNotFound,
    /// Subject resolves to a deactivated user
    #[error("User is inactive")]
    UserInactive,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Stable reason code for this failure.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidToken => "invalid",
            AuthError::TokenExpired => "expired",
            AuthError::NoSubject => "no_subject",
            AuthError::UserNotFound => "user_not_found",
            AuthError::UserInactive => "user_inactive",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        let challenge = HeaderValue::from_static(r#"JWT realm="api""#);
        (status, [(WWW_AUTHENTICATE, challenge)], body).into_response()
    }
}
