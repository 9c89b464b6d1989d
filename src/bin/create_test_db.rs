use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month, macros::date};

use ocda_ledger::{
    MemberProfile, NewAdmin, NewExpense, NewLedgerEntry, NewMember, PasswordHash, create_admin,
    create_expense, create_ledger_entry, create_member, initialize_db,
};

/// A utility for creating a test database for the OCDA ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const MEMBERS: [(&str, &str, &str, &str, &str); 6] = [
    ("08030000001", "Okafor", "Chidi", "A", "Q1"),
    ("08030000002", "Bello", "Amina", "A", "Q1"),
    ("08030000003", "Eze", "Ngozi", "B", "Q1"),
    ("08030000004", "Adeyemi", "Tunde", "B", "Q2"),
    ("08030000005", "Nwosu", "Ifeoma", "C", "Q2"),
    ("08030000006", "Musa", "Ibrahim", "C", "Q3"),
];

const STD_EXPENSES: [(&str, &str); 3] = [
    ("PRJ1", "Water project"),
    ("PRJ2", "Road maintenance"),
    ("ADM", "Administration"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'ocda.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'ocda.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test admin admin@example.com with the password \"test\"...");
    let admin = create_admin(
        &NewAdmin {
            fullname: "Test Admin".to_owned(),
            email: "admin@example.com".to_owned(),
            password_hash: PasswordHash::new("test", PasswordHash::DEFAULT_COST)?,
            role: "admin".to_owned(),
        },
        &conn,
    )?;

    println!("Creating {} members with the password \"test\"...", MEMBERS.len());
    let member_password = PasswordHash::new("test", PasswordHash::DEFAULT_COST)?;

    for (phone_number, surname, other_names, ward, quarters) in MEMBERS {
        create_member(
            &NewMember {
                phone_number: phone_number.to_owned(),
                profile: MemberProfile {
                    surname: surname.to_owned(),
                    other_names: other_names.to_owned(),
                    ward: Some(ward.to_owned()),
                    quarters: Some(quarters.to_owned()),
                    date_of_birth: Some(date!(1980 - 05 - 17)),
                    ..Default::default()
                },
                password_hash: Some(member_password.clone()),
                created_at: date!(2024 - 01 - 01),
                created_by: Some(admin.id),
            },
            &conn,
        )?;
    }

    println!("Recording monthly dues for 2024...");
    for (index, (phone_number, ..)) in MEMBERS.iter().enumerate() {
        for month in 1..=12u8 {
            let transaction_date = Date::from_calendar_date(2024, Month::try_from(month)?, 5)?;

            create_ledger_entry(
                &NewLedgerEntry {
                    phone_number: (*phone_number).to_owned(),
                    transaction_date,
                    amount: 1000.0 + 250.0 * index as f64,
                    remark: "Monthly dues".to_owned(),
                    payment_date: transaction_date,
                },
                &conn,
            )?;
        }
    }

    println!("Recording expenses...");
    for (code, description) in STD_EXPENSES {
        conn.execute(
            "INSERT INTO std_expense (code, description) VALUES (?1, ?2)",
            (code, description),
        )?;
    }

    for month in 1..=12u8 {
        let document_date = Date::from_calendar_date(2024, Month::try_from(month)?, 20)?;
        let (code, _) = STD_EXPENSES[usize::from(month) % STD_EXPENSES.len()];

        create_expense(
            &NewExpense {
                document_date,
                project: code.to_owned(),
                remarks: format!("Expense for month {month}"),
                amount: 2500.0,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
