//! Transactions: the credit and debit events recorded against a user's accounts.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, insert_transaction, map_row_to_transaction, update_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use transactions_page::get_transactions_page;
