//! Bearer-token authentication.
//!
//! Every dice set route takes a [`CurrentUser`]; requests without a live
//! session are rejected with 401 before the handler runs.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use dicetally_domain::UserId;

use super::ApiError;
use crate::app::App;

/// The user owning the session behind the request's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<Arc<App>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &Arc<App>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let session = app
            .repositories
            .sessions
            .get_session(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(CurrentUser(session.user_id))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
