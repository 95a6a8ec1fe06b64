//! Accounts: the money stores (bank accounts, wallets, investments) owned by a user.

mod accounts_page;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, NewAccount, create_account_table, delete_account, get_account, get_accounts,
    insert_account, map_row_to_account, update_account_row,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use list_endpoint::list_accounts_endpoint;

#[cfg(test)]
pub(crate) use core::test_utils;
