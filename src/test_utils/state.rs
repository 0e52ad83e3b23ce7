use rusqlite::Connection;

use crate::{Identity, Role, User, db::initialize, user::find_or_create_user};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

#[track_caller]
pub(crate) fn insert_test_user(name: &str, email: &str, connection: &Connection) -> User {
    let identity = Identity {
        name: name.to_owned(),
        email: email.to_owned(),
    };

    find_or_create_user(&identity, Role::User, connection).expect("Could not create test user")
}
