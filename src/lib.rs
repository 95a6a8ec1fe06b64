//! Finledger is a web app for managing personal finances.
//!
//! Users register with an email address and password, then manage their
//! accounts and transactions through server-rendered pages and a JSON API.
//! Every financial mutation is paired with an append-only timeline entry
//! written in the same database transaction as the primary record.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod coordinator;
mod database_id;
mod db;
mod endpoints;
mod html;
mod logging;
mod not_found;
mod routing;
mod timeline;
mod transaction;

pub use app_state::AppState;
pub use auth::{PasswordHash, UserID, ValidatedPassword};
pub use database_id::{AccountId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request, or
    /// could not be parsed.
    #[error("the authentication cookie is missing or malformed")]
    CookieMissing,

    /// The auth cookie holds a token whose expiry has passed.
    #[error("the session has expired")]
    SessionExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used for registration is already taken.
    #[error("the email address \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// The email address could not be parsed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A required field was missing from the request body.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// A monetary amount could not be parsed as a fixed-point decimal.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A date string could not be parsed as a calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The account ID used to create a transaction did not match an account
    /// owned by the requesting user.
    #[error("the account ID does not refer to one of your accounts")]
    InvalidAccount(Option<AccountId>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code this error maps to.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::CookieMissing | Error::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            Error::TooWeak(_)
            | Error::DuplicateEmail(_)
            | Error::InvalidEmail(_)
            | Error::MissingField(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidAccount(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::JsonSerializationError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into the uniform JSON failure response
    /// `{success: false, message, error?}`.
    ///
    /// Server-side details are echoed in the `error` field only for
    /// persistence failures, matching the behaviour the API clients expect.
    fn into_api_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Error::SqlError(inner) => json!({
                "success": false,
                "message": "a database error occurred",
                "error": inner.to_string(),
            }),
            Error::HashingError(_)
            | Error::JsonSerializationError(_)
            | Error::DatabaseLockError => json!({
                "success": false,
                "message": "internal server error",
                "error": self.to_string(),
            }),
            error => json!({
                "success": false,
                "message": error.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        self.into_api_response()
    }
}
