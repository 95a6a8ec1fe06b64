//! Defines the endpoint for updating an existing account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, auth::UserID, coordinator, coordinator::AccountUpdate,
    database_id::AccountId,
};

/// The state needed to update an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating an account.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    /// The new display name of the account.
    pub name: Option<String>,
    /// The new category label of the account.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The new balance as a decimal string.
    pub balance: Option<String>,
    /// The new note, replacing the stored one.
    pub note: Option<String>,
}

impl UpdateAccountRequest {
    /// Validate the request into the typed update the write coordinator takes.
    ///
    /// Name, type, and a parseable balance are required.
    ///
    /// # Errors
    /// Returns an [Error::MissingField] or [Error::InvalidAmount] describing
    /// the first invalid field.
    pub fn validate(self) -> Result<AccountUpdate, Error> {
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
            None => return Err(Error::MissingField("balance")),
        };

        Ok(AccountUpdate {
            name,
            kind,
            balance,
            note: self.note,
        })
    }
}

/// A route handler for updating an account.
///
/// The update and its timeline entry are written atomically by the write
/// coordinator. Updating an account that does not exist or belongs to
/// another user yields a 404.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Path(account_id): Path<AccountId>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<UpdateAccountRequest>,
) -> Response {
    let update = match request.validate() {
        Ok(update) => update,
        Err(error) => return error.into_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match coordinator::update_account(account_id, update, user_id, &mut connection) {
        Ok(account) => Json(json!({
            "success": true,
            "message": "Account updated successfully",
            "data": account,
        }))
        .into_response(),
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("could not update account {account_id}: {error}");
            error.into_response()
        }
    }
}
