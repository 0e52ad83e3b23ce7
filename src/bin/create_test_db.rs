use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month};

use cashbook::{
    Identity, MovementType, NewMovement, Role, create_movement, find_or_create_user, initialize_db,
};

/// A utility for creating a test database for the cashbook server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.exists() {
        eprintln!(
            "Error: The file {} already exists. Delete it or choose another path.",
            output_path.display()
        );
        exit(1);
    }

    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    let admin = find_or_create_user(
        &Identity {
            name: "Test Admin".to_owned(),
            email: "admin@example.com".to_owned(),
        },
        Role::Admin,
        &conn,
    )?;
    let user = find_or_create_user(
        &Identity {
            name: "Test User".to_owned(),
            email: "user@example.com".to_owned(),
        },
        Role::User,
        &conn,
    )?;

    let movements = [
        ("Sueldo", 1_500_000.0, Month::January, 31, MovementType::Income, &admin),
        ("Arriendo", 450_000.0, Month::February, 5, MovementType::Expense, &admin),
        ("Supermercado", 82_350.5, Month::February, 12, MovementType::Expense, &user),
        ("Sueldo", 1_500_000.0, Month::February, 28, MovementType::Income, &admin),
        ("Venta bicicleta", 120_000.0, Month::March, 3, MovementType::Income, &user),
        ("Luz y agua", 64_990.0, Month::March, 15, MovementType::Expense, &user),
    ];

    let movement_count = movements.len();
    for (concept, amount, month, day, movement_type, recorded_by) in movements {
        create_movement(
            NewMovement {
                concept: concept.to_owned(),
                amount,
                date: Date::from_calendar_date(2025, month, day)?,
                movement_type,
                user_id: recorded_by.id,
            },
            &conn,
        )?;
    }

    println!(
        "Created test database at {} with 2 users and {} movements.",
        output_path.display(),
        movement_count
    );

    Ok(())
}
