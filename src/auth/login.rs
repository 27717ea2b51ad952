// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username/password login issuing bearer tokens.
//!
//! Checks run in a fixed order: the user must exist, the password must
//! match, the user must be active. Only then is a token issued.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::principal::AuthUser;
use crate::token::{SubjectId, TokenError, TokenFactory};

/// A user that can log in.
pub trait LoginUser: AuthUser {
    fn id(&self) -> SubjectId;
    fn username(&self) -> &str;
}

/// External store of users and their password hashes.
pub trait CredentialStore: Send + Sync {
    type User: LoginUser + Send;

    fn find_user_by_username(&self, username: &str) -> impl Future<Output = Option<Self::User>> + Send;

    /// Compare `password` against the stored credential for `user`.
    fn check_password(&self, user: &Self::User, password: &str) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    /// Integer or string, as the user store defines it
    #[schema(value_type = Object)]
    pub user_id: SubjectId,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("User not found")]
    UserNotFound,
    #[error("Token Invalid")]
    InvalidCredentials,
    #[error("User inactive")]
    UserInactive,
    #[error("Failed to issue token: {0}")]
    Token(#[from] TokenError),
}

#[derive(Serialize)]
struct LoginErrorBody {
    error: String,
    error_code: String,
}

impl LoginError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LoginError::UserNotFound => "user_not_found",
            LoginError::InvalidCredentials => "token_invalid",
            LoginError::UserInactive => "user_inactive",
            LoginError::Token(_) => "token_issue_failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            // Signing details stay in the logs
            LoginError::Token(e) => {
                tracing::error!(error = %e, "failed to issue login token");
                "Failed to issue token".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(LoginErrorBody {
            error,
            error_code: self.error_code().to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            let challenge = HeaderValue::from_static(r#"JWT realm="api""#);
            (status, [(WWW_AUTHENTICATE, challenge)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Verify credentials and issue a token for the user.
pub async fn login<C: CredentialStore>(
    store: &C,
    factory: &TokenFactory,
    request: LoginRequest,
) -> Result<LoginResponse, LoginError> {
    let user = store
        .find_user_by_username(&request.username)
        .await
        .ok_or(LoginError::UserNotFound)?;

    if !store.check_password(&user, &request.password).await {
        return Err(LoginError::InvalidCredentials);
    }
    if !user.is_active() {
        return Err(LoginError::UserInactive);
    }

    let user_id = user.id();
    let token = factory.issue_for_user(user_id.clone(), user.username())?;

    tracing::info!(user_id = %user_id, "issued login token");

    Ok(LoginResponse {
        token,
        username: user.username().to_string(),
        user_id,
    })
}

/// Shared state for [`login_handler`].
pub struct LoginService<C> {
    pub store: C,
    pub factory: Arc<TokenFactory>,
}

impl<C: CredentialStore> LoginService<C> {
    pub fn new(store: C, factory: Arc<TokenFactory>) -> Self {
        Self { store, factory }
    }
}

/// `POST` handler accepting a JSON [`LoginRequest`].
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/login", post(login_handler::<PgUsers>))
///     .with_state(Arc::new(LoginService::new(users, factory)));
/// ```
pub async fn login_handler<C: CredentialStore>(
    State(service): State<Arc<LoginService<C>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, LoginError> {
    login(&service.store, &service.factory, request).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testutil::*;
    use crate::token::ClaimValue;
    use axum::{body::to_bytes, body::Body, http::Request, routing::post, Router};
    use tower::ServiceExt;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn active_user_receives_token() {
        let factory = factory_at(NOW);

        let response = login(&users(), &factory, request("alice", "alice-password"))
            .await
            .unwrap();

        assert_eq!(response.username, "alice");
        assert_eq!(response.user_id, SubjectId::Integer(7));

        let claims = factory.decode(&response.token).unwrap();
        assert_eq!(claims.get("user_id"), Some(&ClaimValue::Integer(7)));
        assert_eq!(claims.get("username").and_then(ClaimValue::as_str), Some("alice"));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let result = login(&users(), &factory_at(NOW), request("mallory", "x")).await;
        assert!(matches!(result, Err(LoginError::UserNotFound)));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let result = login(&users(), &factory_at(NOW), request("alice", "wrong")).await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn password_is_checked_before_active_flag() {
        let factory = factory_at(NOW);

        let wrong = login(&users(), &factory, request("bob", "wrong")).await;
        assert!(matches!(wrong, Err(LoginError::InvalidCredentials)));

        let right = login(&users(), &factory, request("bob", "bob-password")).await;
        assert!(matches!(right, Err(LoginError::UserInactive)));
    }

    #[tokio::test]
    async fn issued_token_authenticates() {
        let factory = factory_at(NOW);
        let response = login(&users(), &factory, request("alice", "alice-password"))
            .await
            .unwrap();

        let principal = authenticator_at(NOW)
            .authenticate(Some(bearer(&response.token).as_bytes()))
            .await
            .unwrap();
        assert_eq!(principal.user.id, 7);
    }

    #[tokio::test]
    async fn handler_returns_token_json() {
        let service = Arc::new(LoginService::new(users(), Arc::new(factory_at(NOW))));
        let app = Router::new()
            .route("/login", post(login_handler::<InMemoryUsers>))
            .with_state(service);

        let response = app
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username":"alice","password":"alice-password"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["username"], "alice");
        assert_eq!(body["user_id"], 7);
        assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    }

    #[tokio::test]
    async fn handler_rejects_inactive_user() {
        let service = Arc::new(LoginService::new(users(), Arc::new(factory_at(NOW))));
        let app = Router::new()
            .route("/login", post(login_handler::<InMemoryUsers>))
            .with_state(service);

        let response = app
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username":"bob","password":"bob-password"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "user_inactive");
        assert_eq!(body["error"], "User inactive");
    }

    #[test]
    fn token_failure_is_a_server_error() {
        let err = LoginError::from(TokenError::Signing("boom".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
