//! Authentication middleware that validates the session cookie and injects the user ID.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, Error,
    auth::{UserID, cookie::get_token_from_cookies},
    endpoints,
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Validate the auth cookie in `parts` and return the authenticated user's ID.
async fn authenticate(state: &AuthState, parts: &mut Parts) -> Result<UserID, Error> {
    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .map_err(|_| Error::CookieMissing)?;

    let token = get_token_from_cookies(&jar)?;

    Ok(token.user_id)
}

/// Middleware for page routes that checks for a valid authorization cookie.
///
/// The user ID is placed into the request extensions and the request executed
/// normally if the cookie is valid, otherwise the client is redirected to the
/// log-in page.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let user_id = match authenticate(&state, &mut parts).await {
        Ok(user_id) => user_id,
        Err(_) => return Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
    };

    parts.extensions.insert(user_id);
    next.run(Request::from_parts(parts, body)).await
}

/// Middleware for JSON API routes that checks for a valid authorization cookie.
///
/// Behaves like [auth_guard] but answers an unauthenticated request with
/// `401 {"success": false, "message": ...}` instead of a redirect.
pub async fn auth_guard_api(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let user_id = match authenticate(&state, &mut parts).await {
        Ok(user_id) => user_id,
        Err(error) => {
            tracing::debug!("rejecting unauthenticated API request: {error}");
            return error.into_response();
        }
    };

    parts.extensions.insert(user_id);
    next.run(Request::from_parts(parts, body)).await
}
