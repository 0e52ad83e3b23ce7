//! Database schema initialization.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{movement::create_movement_table, user::create_user_table};

/// Create the tables for the domain models if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`, so movements can
/// only refer to registered users.
///
/// # Errors
/// Returns an error if a table could not be created or if there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Must be set outside of a transaction, otherwise SQLite ignores it.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_movement_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
