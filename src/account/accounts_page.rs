//! Defines the page that lists the authenticated user's accounts.

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
    account::{Account, get_accounts},
    auth::UserID,
    html::{base, nav_bar},
};

/// The state needed to render the accounts page.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn accounts_table(accounts: &[Account]) -> Markup {
    html! {
        (nav_bar())
        h1 { "My Accounts" }

        @if accounts.is_empty()
        {
            p { "No accounts yet." }
        }
        @else
        {
            table
            {
                thead
                {
                    tr
                    {
                        th { "Name" }
                        th { "Type" }
                        th { "Balance" }
                        th { "Note" }
                    }
                }

                tbody
                {
                    @for account in accounts
                    {
                        tr
                        {
                            td { (account.name) }
                            td { (account.kind) }
                            td { (account.balance) }
                            td { (account.note.as_deref().unwrap_or("")) }
                        }
                    }
                }
            }
        }
    }
}

/// Display the accounts of the currently logged-in user.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let accounts = match get_accounts(user_id, &connection) {
        Ok(accounts) => accounts,
        Err(error) => {
            tracing::error!("could not fetch accounts: {error}");
            return error.into_response();
        }
    };

    base("Accounts", &accounts_table(&accounts)).into_response()
}
