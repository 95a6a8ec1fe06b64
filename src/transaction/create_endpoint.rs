//! Defines the endpoint for creating a new transaction.

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
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, auth::UserID, coordinator, database_id::AccountId,
    transaction::NewTransaction, transaction::core::date_format,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
///
/// All fields are optional at the serde level so that missing fields produce
/// the API's uniform validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTransactionRequest {
    /// The ID of the account the money moved through.
    #[serde(rename = "accountId")]
    pub account_id: Option<AccountId>,
    /// Whether money moved in ("credit") or out ("debit").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The amount of money that moved, as a decimal string.
    pub amount: Option<String>,
    /// What the money was spent on or earned from.
    pub category: Option<String>,
    /// The date the money moved as "YYYY-MM-DD". Defaults to today.
    pub date: Option<String>,
    /// An optional free-text note, recorded on the timeline entry.
    pub note: Option<String>,
}

impl CreateTransactionRequest {
    /// Validate the request into the typed data the write coordinator takes.
    ///
    /// # Errors
    /// Returns an [Error::MissingField], [Error::InvalidAmount], or
    /// [Error::InvalidDate] describing the first invalid field.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let account_id = self.account_id.ok_or(Error::MissingField("accountId"))?;

        let kind = match self.kind {
            Some(kind) if !kind.trim().is_empty() => kind,
            _ => return Err(Error::MissingField("type")),
        };

        let amount = match self.amount {
            Some(raw_amount) => raw_amount
                .parse::<Decimal>()
                .map_err(|_| Error::InvalidAmount(raw_amount))?,
            None => return Err(Error::MissingField("amount")),
        };

        let category = match self.category {
            Some(category) if !category.trim().is_empty() => category,
            _ => return Err(Error::MissingField("category")),
        };

        let date = match self.date {
            Some(raw_date) => Date::parse(&raw_date, date_format::DATE_FORMAT)
                .map_err(|_| Error::InvalidDate(raw_date))?,
            None => OffsetDateTime::now_utc().date(),
        };

        Ok(NewTransaction {
            account_id,
            date,
            amount,
            category,
            kind,
            note: self.note,
        })
    }
}

/// A route handler for creating a new transaction.
///
/// The referenced account must belong to the authenticated user. The primary
/// insert and its timeline entry are written atomically by the write
/// coordinator; on success the new transaction is returned with status 201.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<CreateTransactionRequest>,
) -> Response {
    let new_transaction = match request.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match coordinator::create_transaction(new_transaction, user_id, &mut connection) {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Transaction created successfully",
                "data": transaction,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_response()
        }
    }
}
