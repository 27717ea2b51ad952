// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Use this to protect a whole router subtree. Handlers behind it can take
//! the principal from request extensions, or use the [`Auth`](super::Auth)
//! extractor, which picks it up without authenticating twice.
//!
//! ```rust,ignore
//! let authn = Arc::new(Authenticator::new(factory, users));
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         authn.clone(),
//!         auth_middleware::<PgUsers>,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authenticator::Authenticator;
use super::principal::UserLookup;

/// Authenticate the request or reject it with a 401.
///
/// On success the [`Principal`](super::Principal) is inserted into the
/// request extensions.
pub async fn auth_middleware<L>(
    State(authenticator): State<Arc<Authenticator<L>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    L: UserLookup + 'static,
    L::User: Clone + Sync + 'static,
{
    let header = request.headers().get(AUTHORIZATION).cloned();

    match authenticator
        .authenticate(header.as_ref().map(|value| value.as_bytes()))
        .await
    {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
