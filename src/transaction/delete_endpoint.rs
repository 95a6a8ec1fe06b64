//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, auth::UserID, database_id::TransactionId,
    transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Deleting a transaction that does not exist or belongs to another user
/// yields a 404.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(0) => Error::NotFound.into_response(),
        Ok(_) => Json(json!({
            "success": true,
            "message": "Transaction deleted successfully",
        }))
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        account::{NewAccount, insert_account, test_utils::get_test_connection},
        transaction::{NewTransaction, get_transactions, insert_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deletes_own_transaction_but_not_others() {
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
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(other_user_id),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(user_id),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_transactions(user_id, &connection).unwrap().is_empty());
    }
}
