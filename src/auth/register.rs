//! The registration page and route handler for creating a new user.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    endpoints,
    html::{base, error_message, render, text_input},
};

fn registration_form(email: &str, error: Option<&str>) -> Markup {
    html! {
        h1 { "Create your account" }

        form method="post" action=(endpoints::USERS)
        {
            (text_input("Email", "email", "email", email))
            (text_input("Password", "password", "password", ""))
            (text_input("Confirm Password", "confirm_password", "password", ""))
            (error_message(error))

            button type="submit" { "Register" }
        }

        p
        {
            "Already have an account? "
            a href=(endpoints::LOG_IN_VIEW) { "Log in here" }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    base("Register", &registration_form("", None)).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The email address to register with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// A repeat of the chosen password to guard against typos.
    pub confirm_password: String,
}

/// Route handler for registering a new user.
///
/// Validates the email address and password strength, hashes the password,
/// creates the user, and logs them in by setting the auth cookie.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let form_error = |status: StatusCode, message: &str| {
        render(
            status,
            base("Register", &registration_form(&form.email, Some(message))),
        )
    };

    let email = match EmailAddress::from_str(&form.email) {
        Ok(email) => email,
        Err(_) => {
            return form_error(StatusCode::BAD_REQUEST, "Please enter a valid email address");
        }
    };

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(error) => return form_error(StatusCode::BAD_REQUEST, &error.to_string()),
    };

    if form.password != form.confirm_password {
        return form_error(StatusCode::BAD_REQUEST, "Passwords do not match");
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("could not hash password: {error}");
            return error.into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match create_user(email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail(_)) => {
                return form_error(
                    StatusCode::BAD_REQUEST,
                    "That email address is already registered, please log in instead",
                );
            }
            Err(error) => {
                tracing::error!("could not create user: {error}");
                return error.into_response();
            }
        }
    };

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            return error.into_response();
        }
    };

    (jar, Redirect::to(endpoints::ACCOUNTS_VIEW)).into_response()
}
