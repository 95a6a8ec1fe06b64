//! The log-in page and the route handler for log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{get_user_by_email, set_auth_cookie},
    endpoints,
    html::{base, error_message, render, text_input},
};

fn log_in_form(email: &str, error: Option<&str>) -> Markup {
    html! {
        h1 { "Log in to your account" }

        form method="post" action=(endpoints::LOG_IN_API)
        {
            (text_input("Email", "email", "email", email))
            (text_input("Password", "password", "password", ""))
            (error_message(error))

            button type="submit" { "Log in" }
        }

        p
        {
            "Don't have an account? "
            a href=(endpoints::REGISTER_VIEW) { "Register here" }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    base("Log In", &log_in_form("", None)).into_response()
}

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for a log-in request.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    /// The email address the user registered with.
    pub email: String,
    /// The plain text password to check against the stored hash.
    pub password: String,
}

/// Route handler for log-in requests.
///
/// On success, sets the auth cookie and redirects to the accounts page.
/// On invalid credentials, re-renders the log-in form with an error message.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let invalid_credentials = || {
        render(
            StatusCode::UNAUTHORIZED,
            base("Log In", &log_in_form(&form.email, Some("Invalid email or password"))),
        )
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_by_email(&form.email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return invalid_credentials(),
            Err(error) => {
                tracing::error!("could not look up user: {error}");
                return error.into_response();
            }
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(error) => {
            tracing::error!("could not verify password: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    }

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            return error.into_response();
        }
    };

    (jar, Redirect::to(endpoints::ACCOUNTS_VIEW)).into_response()
}
