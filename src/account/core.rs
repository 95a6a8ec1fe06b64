//! Defines the core data model and database queries for accounts.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::AccountId};

/// A place money is kept, e.g. a bank account, cash wallet, or investment.
///
/// An account always belongs to exactly one user and its balance is never
/// null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The ID of the user who owns the account.
    pub user_id: UserID,
    /// The display name of the account.
    pub name: String,
    /// The category label of the account, e.g. "Savings" or "Wallet".
    #[serde(rename = "type")]
    pub kind: String,
    /// The amount of money currently in the account.
    pub balance: Decimal,
    /// An optional free-text note.
    pub note: Option<String>,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the account was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated data for creating an account.
///
/// Request handlers build this from the request body before the write
/// coordinator is invoked, so the coordinator only ever sees well-formed
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// The category label of the account.
    pub kind: String,
    /// The opening balance. Defaults to 0.00 when absent from the request.
    pub balance: Decimal,
    /// An optional free-text note.
    pub note: Option<String>,
}

/// Create the account table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                balance TEXT NOT NULL,
                note TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Account].
///
/// **Note:** This function expects the row to contain all the table columns
/// in the order they were defined.
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let raw_balance: String = row.get(4)?;
    let balance = raw_balance.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Account {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        kind: row.get(3)?,
        balance,
        note: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a new account owned by `user_id`.
///
/// Both timestamps are captured once at insert time.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert failed.
pub fn insert_account(
    new_account: NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO account (user_id, name, type, balance, note, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id.as_i64(),
            new_account.name,
            new_account.kind,
            new_account.balance.to_string(),
            new_account.note,
            now,
            now,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        user_id,
        name: new_account.name,
        kind: new_account.kind,
        balance: new_account.balance,
        note: new_account.note,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve the account with `id`, scoped to its owner `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if there is no such account or it belongs to
/// a different user, or an [Error::SqlError] for any other SQL error.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, balance, note, created_at, updated_at
             FROM account WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_account,
        )
        .map_err(|error| error.into())
}

/// Retrieve all accounts owned by `user_id`, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, balance, note, created_at, updated_at
             FROM account WHERE user_id = :user_id ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|account| account.map_err(|error| error.into()))
        .collect()
}

/// Write the mutable fields of `account` back to its row.
///
/// The caller is responsible for refreshing `updated_at` before saving.
///
/// # Errors
/// Returns an [Error::NotFound] if the row no longer exists, or an
/// [Error::SqlError] for any other SQL error.
pub fn update_account_row(account: &Account, connection: &Connection) -> Result<(), Error> {
    let rows_changed = connection.execute(
        "UPDATE account SET name = ?1, type = ?2, balance = ?3, note = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
        params![
            account.name,
            account.kind,
            account.balance.to_string(),
            account.note,
            account.updated_at,
            account.id,
            account.user_id.as_i64(),
        ],
    )?;

    if rows_changed == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the account with `id`, scoped to its owner `user_id`.
///
/// Returns the number of rows deleted (zero or one).
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn delete_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            params![id, user_id.as_i64()],
        )
        .map_err(|error| error.into())
}
