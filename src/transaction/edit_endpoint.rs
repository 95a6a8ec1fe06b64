//! Defines the endpoint for updating an existing transaction.

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
use time::Date;

use crate::{
    AppState, Error, auth::UserID, coordinator, coordinator::TransactionUpdate,
    database_id::TransactionId, transaction::core::date_format,
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating a transaction.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    /// The new kind ("credit"/"debit").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The new amount as a decimal string.
    pub amount: Option<String>,
    /// The new category.
    pub category: Option<String>,
    /// The new date as "YYYY-MM-DD". Absent keeps the stored date.
    pub date: Option<String>,
    /// A note recorded on the timeline entry for this update.
    pub note: Option<String>,
}

impl UpdateTransactionRequest {
    /// Validate the request into the typed update the write coordinator takes.
    ///
    /// Type, amount, and category are required.
    ///
    /// # Errors
    /// Returns an [Error::MissingField], [Error::InvalidAmount], or
    /// [Error::InvalidDate] describing the first invalid field.
    pub fn validate(self) -> Result<TransactionUpdate, Error> {
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
            Some(raw_date) => Some(
                Date::parse(&raw_date, date_format::DATE_FORMAT)
                    .map_err(|_| Error::InvalidDate(raw_date))?,
            ),
            None => None,
        };

        Ok(TransactionUpdate {
            date,
            amount,
            category,
            kind,
            note: self.note,
        })
    }
}

/// A route handler for updating a transaction.
///
/// The update and its timeline entry are written atomically by the write
/// coordinator. Updating a transaction that does not exist or belongs to
/// another user yields a 404.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<UpdateTransactionRequest>,
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

    match coordinator::update_transaction(transaction_id, update, user_id, &mut connection) {
        Ok(transaction) => Json(json!({
            "success": true,
            "message": "Transaction updated successfully",
            "data": transaction,
        }))
        .into_response(),
        Err(error) => {
            if error != Error::NotFound {
                tracing::error!("could not update transaction {transaction_id}: {error}");
            }
            error.into_response()
        }
    }
}

#[cfg(test)]
mod edit_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        account::{NewAccount, insert_account, test_utils::get_test_connection},
        transaction::{NewTransaction, get_transaction, insert_transaction},
    };

    use super::{EditTransactionState, UpdateTransactionRequest, edit_transaction_endpoint};

    fn get_request() -> UpdateTransactionRequest {
        UpdateTransactionRequest {
            kind: Some("debit".to_owned()),
            amount: Some("30.00".to_owned()),
            category: Some("Groceries".to_owned()),
            date: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn returns_200_and_updates_transaction() {
        let (conn, user_id, _) = get_test_connection();
        let account = insert_account(
            NewAccount {
                name: "Cash".to_owned(),
                kind: "Cash".to_owned(),
                balance: "100.50".parse().unwrap(),
                note: None,
            },
            user_id,
            &conn,
        )
        .unwrap();
        let transaction = insert_transaction(
            NewTransaction {
                account_id: account.id,
                date: date!(2026 - 01 - 15),
                amount: "25.00".parse().unwrap(),
                category: "Food".to_owned(),
                kind: "debit".to_owned(),
                note: None,
            },
            user_id,
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(user_id),
            Json(get_request()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let stored = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(stored.amount.to_string(), "30.00");
        assert_eq!(stored.category, "Groceries");
    }

    #[tokio::test]
    async fn returns_404_for_other_users_transaction() {
        let (conn, user_id, other_user_id) = get_test_connection();
        let account = insert_account(
            NewAccount {
                name: "Cash".to_owned(),
                kind: "Cash".to_owned(),
                balance: "100.50".parse().unwrap(),
                note: None,
            },
            user_id,
            &conn,
        )
        .unwrap();
        let transaction = insert_transaction(
            NewTransaction {
                account_id: account.id,
                date: date!(2026 - 01 - 15),
                amount: "25.00".parse().unwrap(),
                category: "Food".to_owned(),
                kind: "debit".to_owned(),
                note: None,
            },
            user_id,
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(other_user_id),
            Json(get_request()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        let stored = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(stored.amount.to_string(), "25.00");
    }

    #[test]
    fn validate_rejects_unparseable_amount() {
        let request = UpdateTransactionRequest {
            amount: Some("abc".to_owned()),
            ..get_request()
        };

        let result = request.validate();

        assert!(matches!(result, Err(crate::Error::InvalidAmount(_))));
    }
}
