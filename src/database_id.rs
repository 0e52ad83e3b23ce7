//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The ID of a movement.
pub type MovementID = DatabaseID;
