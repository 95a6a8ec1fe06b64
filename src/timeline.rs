//! The append-only timeline: an audit row recording every financial mutation.
//!
//! Timeline rows are created once and never updated or deleted. Reads happen
//! through ad-hoc reporting queries, so this module only exposes the append
//! operation and the purpose tags that describe a mutation.

use rusqlite::{Connection, params};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::{DatabaseId, TimelineId},
};

/// The purpose tag recorded when an account is created.
pub const PURPOSE_ACCOUNT_ADD: &str = "Account_Add";
/// The purpose tag recorded when an account is updated.
pub const PURPOSE_ACCOUNT_UPDATE: &str = "Account_Update";
/// The purpose tag recorded when a transaction is updated.
pub const PURPOSE_TRANSACTION_UPDATE: &str = "Transaction_Update";

/// The purpose tag recorded when a transaction of `kind` ("credit"/"debit")
/// is created.
pub fn transaction_purpose(kind: &str) -> String {
    format!("Transaction_{kind}")
}

/// The data needed to append a timeline entry.
///
/// The creation date, time, and timestamp are captured once at append time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimelineEntry {
    /// The ID of the account or transaction this entry describes.
    pub associate_id: DatabaseId,
    /// The payment type: the account ID for transactions, empty for accounts.
    pub payment_type: String,
    /// The raw amount from the request that triggered the mutation.
    pub amount: String,
    /// A tag describing the mutation, e.g. "Account_Add".
    pub purpose: String,
    /// The note attached to the primary record, or the empty string.
    pub note: String,
    /// The ID of the user who performed the mutation.
    pub created_by: UserID,
}

/// Create the timelines table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_timeline_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS timelines (
                id INTEGER PRIMARY KEY,
                associate_id INTEGER NOT NULL,
                payment_type TEXT NOT NULL,
                amount TEXT NOT NULL,
                purpose TEXT NOT NULL,
                note TEXT NOT NULL,
                created_date TEXT NOT NULL,
                created_time TEXT NOT NULL,
                created_at TEXT NOT NULL,
                created_by INTEGER NOT NULL,
                isActive INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Append `entry` to the timeline, capturing the current wall-clock time.
///
/// The caller is expected to pass a connection belonging to the transaction
/// scope of the primary write so that the audit row commits or rolls back
/// together with it.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert failed.
pub fn append_entry(
    entry: &NewTimelineEntry,
    connection: &Connection,
) -> Result<TimelineId, Error> {
    let now = OffsetDateTime::now_utc();
    let created_time = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());

    connection.execute(
        "INSERT INTO timelines (
                associate_id,
                payment_type,
                amount,
                purpose,
                note,
                created_date,
                created_time,
                created_at,
                created_by,
                isActive
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.associate_id,
            entry.payment_type,
            entry.amount,
            entry.purpose,
            entry.note,
            now.date(),
            created_time,
            now,
            entry.created_by.as_i64(),
            true,
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

#[cfg(test)]
mod timeline_tests {
    use rusqlite::Connection;

    use crate::auth::UserID;

    use super::{
        NewTimelineEntry, PURPOSE_ACCOUNT_ADD, append_entry, create_timeline_table,
        transaction_purpose,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_timeline_table(&conn).unwrap();
        conn
    }

    fn get_test_entry() -> NewTimelineEntry {
        NewTimelineEntry {
            associate_id: 1,
            payment_type: String::new(),
            amount: "100.50".to_owned(),
            purpose: PURPOSE_ACCOUNT_ADD.to_owned(),
            note: String::new(),
            created_by: UserID::new(7),
        }
    }

    #[test]
    fn append_inserts_active_row() {
        let conn = get_test_connection();

        let id = append_entry(&get_test_entry(), &conn).unwrap();

        let (associate_id, purpose, amount, created_by, is_active) = conn
            .query_row(
                "SELECT associate_id, purpose, amount, created_by, isActive
                 FROM timelines WHERE id = :id",
                &[(":id", &id)],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                },
            )
            .unwrap();

        assert_eq!(associate_id, 1);
        assert_eq!(purpose, PURPOSE_ACCOUNT_ADD);
        assert_eq!(amount, "100.50");
        assert_eq!(created_by, 7);
        assert!(is_active);
    }

    #[test]
    fn append_splits_creation_instant_into_date_and_time() {
        let conn = get_test_connection();

        let id = append_entry(&get_test_entry(), &conn).unwrap();

        let (created_date, created_time): (String, String) = conn
            .query_row(
                "SELECT created_date, created_time FROM timelines WHERE id = :id",
                &[(":id", &id)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        // YYYY-MM-DD and HH:MM:SS respectively.
        assert_eq!(created_date.len(), 10);
        assert_eq!(created_time.len(), 8);
    }

    #[test]
    fn purpose_tag_includes_transaction_kind() {
        assert_eq!(transaction_purpose("debit"), "Transaction_debit");
        assert_eq!(transaction_purpose("credit"), "Transaction_credit");
    }
}
