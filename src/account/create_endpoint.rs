//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Error, account::NewAccount, auth::UserID, coordinator};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
///
/// All fields are optional at the serde level so that missing fields produce
/// the API's uniform validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAccountRequest {
    /// The display name of the account.
    pub name: Option<String>,
    /// The category label of the account, e.g. "Savings" or "Wallet".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The opening balance as a decimal string. Defaults to "0.00".
    pub balance: Option<String>,
    /// An optional free-text note.
    pub note: Option<String>,
}

impl CreateAccountRequest {
    /// Validate the request into the typed data the write coordinator takes.
    ///
    /// # Errors
    /// Returns an [Error::MissingField] if `name` or `type` are absent or
    /// empty, or an [Error::InvalidAmount] if `balance` is not a decimal
    /// number.
    pub fn validate(self) -> Result<NewAccount, Error> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(Error::MissingField("name")),
        };

        let kind = match self.kind {
            Some(kind) if !kind.trim().is_empty() => kind,
            _ => return Err(Error::MissingField("type")),
        };

        let balance = match self.balance {
            Some(raw_balance) => raw_balance
                .parse::<Decimal>()
                .map_err(|_| Error::InvalidAmount(raw_balance))?,
            None => Decimal::new(0, 2),
        };

        Ok(NewAccount {
            name,
            kind,
            balance,
            note: self.note,
        })
    }
}

/// A route handler for creating a new account.
///
/// The primary insert and its timeline entry are written atomically by the
/// write coordinator; on success the new account is returned with status 201.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<CreateAccountRequest>,
) -> Response {
    let new_account = match request.validate() {
        Ok(new_account) => new_account,
        Err(error) => return error.into_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match coordinator::create_account(new_account, user_id, &mut connection) {
        Ok(account) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Account created successfully",
                "data": account,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create account: {error}");
            error.into_response()
        }
    }
}
