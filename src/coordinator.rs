//! The transactional write coordinator.
//!
//! Every financial mutation is paired with a timeline entry describing it.
//! The functions here wrap the primary write and the timeline append in a
//! single database transaction: on success both rows commit together, on any
//! failure the scope is dropped and rolls back, persisting nothing.
//!
//! Request handlers validate input into the typed structs consumed here, so
//! the coordinator only ever operates on well-formed fields.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::{self, Account, NewAccount},
    auth::UserID,
    database_id::{AccountId, TransactionId},
    timeline::{
        NewTimelineEntry, PURPOSE_ACCOUNT_ADD, PURPOSE_ACCOUNT_UPDATE,
        PURPOSE_TRANSACTION_UPDATE, append_entry, transaction_purpose,
    },
    transaction::{self, NewTransaction, Transaction},
};

/// The validated field values for updating an account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    /// The new display name of the account.
    pub name: String,
    /// The new category label of the account.
    pub kind: String,
    /// The new balance.
    pub balance: Decimal,
    /// The new note, replacing the stored one.
    pub note: Option<String>,
}

/// The validated field values for updating a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new transaction date. `None` keeps the stored date.
    pub date: Option<Date>,
    /// The new amount.
    pub amount: Decimal,
    /// The new category.
    pub category: String,
    /// The new kind ("credit"/"debit").
    pub kind: String,
    /// A note recorded on the timeline entry for this update.
    pub note: Option<String>,
}

/// Create an account owned by `user_id` along with its timeline entry.
///
/// Both rows are written in one transaction scope; if either insert fails the
/// scope rolls back and nothing persists.
///
/// # Errors
/// Returns an [Error::SqlError] if either insert failed.
pub fn create_account(
    new_account: NewAccount,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Account, Error> {
    let scope = connection.transaction()?;

    let entry_note = new_account.note.clone().unwrap_or_default();
    let raw_balance = new_account.balance.to_string();

    let account = account::insert_account(new_account, user_id, &scope)?;

    append_entry(
        &NewTimelineEntry {
            associate_id: account.id,
            payment_type: String::new(),
            amount: raw_balance,
            purpose: PURPOSE_ACCOUNT_ADD.to_owned(),
            note: entry_note,
            created_by: user_id,
        },
        &scope,
    )?;

    scope.commit()?;

    Ok(account)
}

/// Update the account `id` owned by `user_id`, appending a timeline entry
/// when any field actually changes.
///
/// Retrying an update with identical fields is idempotent: the stored values
/// stay the same and no additional timeline entry is appended.
///
/// # Errors
/// Returns an [Error::NotFound] if the account does not exist or belongs to
/// a different user, or an [Error::SqlError] if a write failed.
pub fn update_account(
    id: AccountId,
    update: AccountUpdate,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Account, Error> {
    let scope = connection.transaction()?;

    let mut account = account::get_account(id, user_id, &scope)?;

    let unchanged = account.name == update.name
        && account.kind == update.kind
        && account.balance == update.balance
        && account.note == update.note;

    if unchanged {
        scope.commit()?;
        return Ok(account);
    }

    account.name = update.name;
    account.kind = update.kind;
    account.balance = update.balance;
    account.note = update.note;
    account.updated_at = OffsetDateTime::now_utc();

    account::update_account_row(&account, &scope)?;

    append_entry(
        &NewTimelineEntry {
            associate_id: account.id,
            payment_type: String::new(),
            amount: account.balance.to_string(),
            purpose: PURPOSE_ACCOUNT_UPDATE.to_owned(),
            note: account.note.clone().unwrap_or_default(),
            created_by: user_id,
        },
        &scope,
    )?;

    scope.commit()?;

    Ok(account)
}

/// Create a transaction owned by `user_id` along with its timeline entry.
///
/// The referenced account must exist and belong to the same user; the check
/// runs inside the same scope as the writes so the reference cannot be
/// deleted out from under the insert.
///
/// # Errors
/// Returns an [Error::InvalidAccount] if the referenced account is missing
/// or owned by another user, or an [Error::SqlError] if either insert failed.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let scope = connection.transaction()?;

    account::get_account(new_transaction.account_id, user_id, &scope).map_err(
        |error| match error {
            Error::NotFound => Error::InvalidAccount(Some(new_transaction.account_id)),
            error => error,
        },
    )?;

    let entry_note = new_transaction.note.clone().unwrap_or_default();
    let raw_amount = new_transaction.amount.to_string();

    let created = transaction::insert_transaction(new_transaction, user_id, &scope)?;

    append_entry(
        &NewTimelineEntry {
            associate_id: created.id,
            payment_type: created.account_id.to_string(),
            amount: raw_amount,
            purpose: transaction_purpose(&created.kind),
            note: entry_note,
            created_by: user_id,
        },
        &scope,
    )?;

    scope.commit()?;

    Ok(created)
}

/// Update the transaction `id` owned by `user_id`, appending a timeline
/// entry when any field actually changes.
///
/// Retrying an update with identical fields is idempotent, mirroring
/// [update_account].
///
/// # Errors
/// Returns an [Error::NotFound] if the transaction does not exist or belongs
/// to a different user, or an [Error::SqlError] if a write failed.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let scope = connection.transaction()?;

    let mut transaction = transaction::get_transaction(id, user_id, &scope)?;

    let date = update.date.unwrap_or(transaction.date);
    let unchanged = transaction.date == date
        && transaction.amount == update.amount
        && transaction.category == update.category
        && transaction.kind == update.kind;

    if unchanged {
        scope.commit()?;
        return Ok(transaction);
    }

    transaction.date = date;
    transaction.amount = update.amount;
    transaction.category = update.category;
    transaction.kind = update.kind;
    transaction.updated_at = OffsetDateTime::now_utc();

    transaction::update_transaction_row(&transaction, &scope)?;

    append_entry(
        &NewTimelineEntry {
            associate_id: transaction.id,
            payment_type: transaction.account_id.to_string(),
            amount: transaction.amount.to_string(),
            purpose: PURPOSE_TRANSACTION_UPDATE.to_owned(),
            note: update.note.unwrap_or_default(),
            created_by: user_id,
        },
        &scope,
    )?;

    scope.commit()?;

    Ok(transaction)
}
