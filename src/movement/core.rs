//! Defines the core data models and database queries for movements.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;

use crate::{Error, database_id::MovementID, report::ReportEntry, user::UserID};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came in or went out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl MovementType {
    /// Every movement type, in the order they are offered in forms.
    pub const ALL: [MovementType; 2] = [MovementType::Income, MovementType::Expense];

    /// The type as it is stored and sent over the wire, e.g. "INCOME".
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Income => "INCOME",
            MovementType::Expense => "EXPENSE",
        }
    }

    /// A human readable name for the type.
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::Income => "Ingreso",
            MovementType::Expense => "Egreso",
        }
    }
}

impl Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(MovementType::Income),
            "EXPENSE" => Ok(MovementType::Expense),
            other => Err(Error::InvalidMovementType(other.to_owned())),
        }
    }
}

impl ToSql for MovementType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MovementType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A validated movement that has not been stored yet.
///
/// Use [crate::movement::CreateMovementRequest::validate] to build one from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    /// What the money was for.
    pub concept: String,
    /// A positive, finite amount of money.
    pub amount: f64,
    /// When the money moved.
    pub date: Date,
    /// Whether the money came in or went out.
    pub movement_type: MovementType,
    /// The user that recorded the movement.
    pub user_id: UserID,
}

/// An income or expense. Movements never change once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: MovementID,
    pub concept: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub user_id: UserID,
}

/// The name of the user that recorded a movement.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserName {
    pub name: String,
}

/// A movement together with the name of the user that recorded it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementWithUser {
    pub id: MovementID,
    pub concept: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub user_id: UserID,
    pub user: UserName,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the movement table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_movement_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS movement (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                concept TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_movement_date ON movement(date);",
        (),
    )?;

    Ok(())
}

/// Store a new movement.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidUser] if the user ID does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_movement(movement: NewMovement, connection: &Connection) -> Result<Movement, Error> {
    let user_id = movement.user_id;

    connection
        .prepare(
            "INSERT INTO movement (concept, amount, date, type, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, concept, amount, date, type, user_id",
        )?
        .query_row(
            (
                movement.concept,
                movement.amount,
                movement.date,
                movement.movement_type,
                user_id.as_i64(),
            ),
            map_movement_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidUser(user_id),
            error => error.into(),
        })
}

/// Retrieve a movement by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a movement,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_movement(id: MovementID, connection: &Connection) -> Result<Movement, Error> {
    connection
        .prepare("SELECT id, concept, amount, date, type, user_id FROM movement WHERE id = :id")?
        .query_row(&[(":id", &id)], map_movement_row)
        .map_err(|error| error.into())
}

/// Retrieve a movement and the name of its user by the movement's `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a movement,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_movement_with_user(
    id: MovementID,
    connection: &Connection,
) -> Result<MovementWithUser, Error> {
    connection
        .prepare(
            "SELECT m.id, m.concept, m.amount, m.date, m.type, m.user_id, u.name
             FROM movement m INNER JOIN user u ON u.id = m.user_id
             WHERE m.id = :id",
        )?
        .query_row(&[(":id", &id)], map_movement_with_user_row)
        .map_err(|error| error.into())
}

/// Retrieve every movement with the name of its user, newest first.
///
/// Movements on the same date are ordered by most recently recorded first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_movements(connection: &Connection) -> Result<Vec<MovementWithUser>, Error> {
    connection
        .prepare(
            "SELECT m.id, m.concept, m.amount, m.date, m.type, m.user_id, u.name
             FROM movement m INNER JOIN user u ON u.id = m.user_id
             ORDER BY m.date DESC, m.id DESC",
        )?
        .query_map([], map_movement_with_user_row)?
        .map(|maybe_movement| maybe_movement.map_err(Error::from))
        .collect()
}

/// Retrieve the amount, type and date of every movement in the order they
/// were recorded.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_report_entries(connection: &Connection) -> Result<Vec<ReportEntry>, Error> {
    connection
        .prepare("SELECT amount, type, date FROM movement ORDER BY id ASC")?
        .query_map([], |row| {
            Ok(ReportEntry {
                amount: row.get(0)?,
                movement_type: row.get(1)?,
                date: row.get(2)?,
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Get the total number of movements in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_movements(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM movement;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_movement_row(row: &Row) -> Result<Movement, rusqlite::Error> {
    Ok(Movement {
        id: row.get(0)?,
        concept: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        movement_type: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}

fn map_movement_with_user_row(row: &Row) -> Result<MovementWithUser, rusqlite::Error> {
    Ok(MovementWithUser {
        id: row.get(0)?,
        concept: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        movement_type: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
        user: UserName { name: row.get(6)? },
    })
}

// ============================================================================
// TESTS
// ============================================================================
