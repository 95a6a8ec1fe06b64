//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::{AccountId, TransactionId},
};

pub(crate) mod date_format {
    //! Serializes a [time::Date] as a plain "YYYY-MM-DD" string.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] =
        format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// An event where money moved into or out of one of a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user who owns the transaction.
    pub user_id: UserID,
    /// The ID of the account the money moved through.
    ///
    /// The referenced account is owned by the same user, which the write
    /// coordinator checks before inserting.
    pub account_id: AccountId,
    /// The date the money moved.
    #[serde(with = "date_format")]
    pub date: Date,
    /// The amount of money that moved.
    pub amount: Decimal,
    /// What the money was spent on or earned from, e.g. "Food".
    pub category: String,
    /// Whether money moved in ("credit") or out ("debit").
    #[serde(rename = "type")]
    pub kind: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated data for creating a transaction.
///
/// Request handlers build this from the request body before the write
/// coordinator is invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the account the money moved through.
    pub account_id: AccountId,
    /// The date the money moved. Defaults to today when absent from the
    /// request.
    pub date: Date,
    /// The amount of money that moved.
    pub amount: Decimal,
    /// What the money was spent on or earned from.
    pub category: String,
    /// Whether money moved in ("credit") or out ("debit").
    pub kind: String,
    /// An optional free-text note, recorded on the timeline entry.
    pub note: Option<String>,
}

/// Create the transactions table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// **Note:** This function expects the row to contain all the table columns
/// in the order they were defined.
pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_amount: String = row.get(4)?;
    let amount = raw_amount.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        account_id: row.get(2)?,
        date: row.get(3)?,
        amount,
        category: row.get(5)?,
        kind: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert a new transaction owned by `user_id`.
///
/// Both timestamps are captured once at insert time. This function does not
/// check that the referenced account belongs to `user_id`; the write
/// coordinator does that before calling it.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert failed.
pub fn insert_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO transactions (user_id, account_id, date, amount, category, type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id.as_i64(),
            new_transaction.account_id,
            new_transaction.date,
            new_transaction.amount.to_string(),
            new_transaction.category,
            new_transaction.kind,
            now,
            now,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id,
        account_id: new_transaction.account_id,
        date: new_transaction.date,
        amount: new_transaction.amount,
        category: new_transaction.category,
        kind: new_transaction.kind,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve the transaction with `id`, scoped to its owner `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if there is no such transaction or it belongs
/// to a different user, or an [Error::SqlError] for any other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, date, amount, category, type, created_at, updated_at
             FROM transactions WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_transaction,
        )
        .map_err(|error| error.into())
}

/// Retrieve all transactions owned by `user_id`, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, date, amount, category, type, created_at, updated_at
             FROM transactions WHERE user_id = :user_id ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_transaction)?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Write the mutable fields of `transaction` back to its row.
///
/// The caller is responsible for refreshing `updated_at` before saving.
///
/// # Errors
/// Returns an [Error::NotFound] if the row no longer exists, or an
/// [Error::SqlError] for any other SQL error.
pub fn update_transaction_row(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_changed = connection.execute(
        "UPDATE transactions
             SET date = ?1, amount = ?2, category = ?3, type = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
        params![
            transaction.date,
            transaction.amount.to_string(),
            transaction.category,
            transaction.kind,
            transaction.updated_at,
            transaction.id,
            transaction.user_id.as_i64(),
        ],
    )?;

    if rows_changed == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction with `id`, scoped to its owner `user_id`.
///
/// Returns the number of rows deleted (zero or one).
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id.as_i64()],
        )
        .map_err(|error| error.into())
}

#[cfg(test)]
mod transaction_tests {
    use time::macros::date;

    use crate::{
        Error,
        account::{NewAccount, insert_account, test_utils::get_test_connection},
        database_id::AccountId,
    };

    use super::{
        NewTransaction, delete_transaction, get_transaction, get_transactions,
        insert_transaction, update_transaction_row,
    };

    fn get_new_transaction(account_id: AccountId) -> NewTransaction {
        NewTransaction {
            account_id,
            date: date!(2026 - 01 - 15),
            amount: "25.00".parse().unwrap(),
            category: "Food".to_owned(),
            kind: "debit".to_owned(),
            note: None,
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
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

        let transaction =
            insert_transaction(get_new_transaction(account.id), user_id, &conn).unwrap();

        let stored = get_transaction(transaction.id, user_id, &conn).unwrap();
        assert_eq!(stored.id, transaction.id);
        assert_eq!(stored.account_id, transaction.account_id);
        assert_eq!(stored.category, "Food");
        assert_eq!(stored.kind, "debit");
        assert_eq!(stored.amount.to_string(), "25.00");
        assert_eq!(stored.date, date!(2026 - 01 - 15));
    }

    #[test]
    fn get_fails_for_other_users_transaction() {
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
        let transaction =
            insert_transaction(get_new_transaction(account.id), user_id, &conn).unwrap();

        let result = get_transaction(transaction.id, other_user_id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_changes_stored_fields() {
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
        let mut transaction =
            insert_transaction(get_new_transaction(account.id), user_id, &conn).unwrap();

        transaction.amount = "42.00".parse().unwrap();
        transaction.category = "Groceries".to_owned();
        update_transaction_row(&transaction, &conn).unwrap();

        let stored = get_transaction(transaction.id, user_id, &conn).unwrap();
        assert_eq!(stored.amount.to_string(), "42.00");
        assert_eq!(stored.category, "Groceries");
    }

    #[test]
    fn list_and_delete_are_scoped_to_owner() {
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
        let transaction =
            insert_transaction(get_new_transaction(account.id), user_id, &conn).unwrap();

        assert!(get_transactions(other_user_id, &conn).unwrap().is_empty());
        assert_eq!(delete_transaction(transaction.id, other_user_id, &conn), Ok(0));

        assert_eq!(get_transactions(user_id, &conn).unwrap().len(), 1);
        assert_eq!(delete_transaction(transaction.id, user_id, &conn), Ok(1));
        assert!(get_transactions(user_id, &conn).unwrap().is_empty());
    }
}
