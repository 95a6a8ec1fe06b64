//! Defines the page that lists the authenticated user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    html::{base, nav_bar},
    transaction::{Transaction, get_transactions},
};

/// The state needed to render the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        (nav_bar())
        h1 { "Transactions" }

        @if transactions.is_empty()
        {
            p { "No transactions yet." }
        }
        @else
        {
            table
            {
                thead
                {
                    tr
                    {
                        th { "Date" }
                        th { "Type" }
                        th { "Category" }
                        th { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions
                    {
                        tr
                        {
                            td { (transaction.date) }
                            td { (transaction.kind) }
                            td { (transaction.category) }
                            td { (transaction.amount) }
                        }
                    }
                }
            }
        }
    }
}

/// Display the transactions of the currently logged-in user, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let transactions = match get_transactions(user_id, &connection) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("could not fetch transactions: {error}");
            return error.into_response();
        }
    };

    base("Transactions", &transactions_table(&transactions)).into_response()
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use time::macros::date;

    use crate::{
        account::{NewAccount, insert_account, test_utils::get_test_connection},
        transaction::{NewTransaction, insert_transaction},
    };

    use super::{TransactionsPageState, get_transactions_page};

    #[tokio::test]
    async fn lists_transaction_categories() {
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
        insert_transaction(
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
        let state = TransactionsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_transactions_page(State(state), Extension(user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Food"));
        assert!(body.contains("25.00"));
    }
}
