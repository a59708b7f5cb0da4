mod db;
mod models;
mod operations;

use clap::{Parser, Subcommand};
use db::ExpenseStore;
use operations::add::{add_expense_to_db, build_expense};
use operations::aggregate::aggregate;
use operations::export::{export_to_path, write_csv};
use operations::list::{render_listing, render_summary};
use operations::remove::remove_expense_from_db;
use operations::report::run_report;
use operations::update::{build_patch, parse_id, update_expense_in_db};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exptrack", version, about = "Track daily expenses by category")]
struct Cli {
    /// Path to the expense database
    #[arg(long, env = "EXPENSE_TRACKER_DB", default_value = db::connection::DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Runs the interactive prompt when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Record an expense for today
    Add {
        name: String,
        amount: String,
        /// food, transport, entertainment, travel or other
        category: String,
    },
    /// Change fields of an existing expense
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an expense
    Remove { id: String },
    /// Print every expense grouped by day
    List,
    /// Print totals and category percentages
    Summary,
    /// Write all expenses as CSV to PATH, or stdout
    Export { path: Option<PathBuf> },
    /// Open the terminal summary view
    Report,
}

pub enum UserCommands {
    Add,
    Update,
    Remove,
    List,
    Summary,
    Export,
    Report,
    Exit,
    Unknown,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let mut store = match ExpenseStore::open(&cli.db) {
        Ok(store) => store,
        Err(e) => {
            error!(path = %cli.db.display(), error = %e, "failed to open expense store");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Some(command) => run_command(&mut store, command),
        None => {
            run_interactive(&mut store);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_command(store: &mut ExpenseStore, command: Command) -> Result<(), String> {
    match command {
        Command::Add { name, amount, category } => {
            let new_expense = build_expense(&name, &amount, &category)?;
            let expense = store.add(new_expense).map_err(|e| e.to_string())?;
            println!("Added expense {} ({})", expense.name, expense.id);
        }
        Command::Update { id, name, amount, category } => {
            let id = parse_id(&id)?;
            let patch = build_patch(name.as_deref(), amount.as_deref(), category.as_deref())?;
            let expense = store.update(id, &patch).map_err(|e| e.to_string())?;
            println!(
                "Updated expense {}: {} {:.2} {}",
                expense.id,
                expense.name,
                expense.amount,
                expense.category.label()
            );
        }
        Command::Remove { id } => print_remove_result(remove_expense_from_db(store, &id)?, &id),
        Command::List => {
            let buckets = store.list_all().map_err(|e| e.to_string())?;
            print!("{}", render_listing(&buckets));
        }
        Command::Summary => print_summary(store)?,
        Command::Export { path } => {
            let buckets = store.list_all().map_err(|e| e.to_string())?;
            match path {
                Some(path) => {
                    let count = export_to_path(&buckets, &path)?;
                    println!("Exported {} expenses to {}", count, path.display());
                }
                None => {
                    write_csv(&buckets, io::stdout().lock())?;
                }
            }
        }
        Command::Report => run_report(store)?,
    }
    Ok(())
}

/// Prompt loop. Errors are printed and the loop keeps going.
fn run_interactive(store: &mut ExpenseStore) {
    println!("Welcome to the expense tracker!");

    loop {
        println!(
            "Please enter a command (add, update, remove, list, summary, export, report, exit):"
        );

        let input = match read_user_input() {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(first) = parts.first() else {
            continue;
        };

        match check_for_command(first) {
            UserCommands::Add => {
                println!("Add command selected. Please enter expense details in the format:");
                println!("name, amount, category(food/transport/entertainment/travel/other)");
                let Some(details) = prompt_details() else { continue };
                match add_expense_to_db(store, &details) {
                    Ok(expense) => {
                        println!("Expense added successfully! ID: {}", expense.id);
                        report_totals(store);
                    }
                    Err(e) => {
                        println!("Error adding expense: {}", e);
                        println!("Please try again.");
                    }
                }
            }
            UserCommands::Update => {
                println!("Update command selected. Please enter:\nid, name, amount, category");
                println!("Leave a field empty to keep its current value.");
                let Some(details) = prompt_details() else { continue };
                match update_expense_in_db(store, &details) {
                    Ok(_) => {
                        println!("Expense updated successfully!");
                        report_totals(store);
                    }
                    Err(e) => println!("Error updating expense: {}", e),
                }
            }
            UserCommands::Remove => {
                println!("Remove command selected. Provide the expense ID to remove:");
                let Some(details) = prompt_details() else { continue };
                match remove_expense_from_db(store, &details) {
                    Ok(removed) => {
                        print_remove_result(removed, &details);
                        if removed {
                            report_totals(store);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            UserCommands::List => match store.list_all() {
                Ok(buckets) => print!("{}", render_listing(&buckets)),
                Err(e) => println!("Error listing expenses: {}", e),
            },
            UserCommands::Summary => {
                if let Err(e) = print_summary(store) {
                    println!("Error: {}", e);
                }
            }
            UserCommands::Export => {
                println!("Export command selected. Please enter the file path to export to:");
                let Some(path) = prompt_details() else { continue };
                let exported = store
                    .list_all()
                    .map_err(|e| e.to_string())
                    .and_then(|buckets| export_to_path(&buckets, &PathBuf::from(&path)));
                match exported {
                    Ok(count) => println!("Exported {} expenses to {}", count, path),
                    Err(e) => println!("Error exporting expenses: {}", e),
                }
            }
            UserCommands::Report => {
                if let Err(e) = run_report(store) {
                    println!("Error: {}", e);
                }
            }
            UserCommands::Exit => {
                println!("Exiting the application.");
                break;
            }
            UserCommands::Unknown => {
                println!("Unknown command '{}'.", first);
            }
        }
    }
}

fn prompt_details() -> Option<String> {
    match read_user_input() {
        Ok(details) => Some(details),
        Err(e) => {
            println!("Error reading input: {}", e);
            None
        }
    }
}

fn print_remove_result(removed: bool, id: &str) {
    if removed {
        println!("Expense removed successfully.");
    } else {
        println!("No expense with ID {} found.", id.trim());
    }
}

fn print_summary(store: &ExpenseStore) -> Result<(), String> {
    let buckets = store.list_all().map_err(|e| e.to_string())?;
    print!("{}", render_summary(&aggregate(&buckets)));
    Ok(())
}

// The store is the source of truth, so totals are re-read after every change.
fn report_totals(store: &ExpenseStore) {
    if let Err(e) = print_summary(store) {
        println!("Error reading expenses: {}", e);
    }
}

fn read_user_input() -> Result<String, String> {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    if input.is_empty() {
        return Ok("exit".to_string());
    }
    Ok(input.trim().to_string())
}

fn check_for_command(input: &str) -> UserCommands {
    match input.to_lowercase().as_str() {
        "add" => UserCommands::Add,
        "update" | "edit" => UserCommands::Update,
        "remove" | "delete" => UserCommands::Remove,
        "list" | "print" => UserCommands::List,
        "summary" => UserCommands::Summary,
        "export" => UserCommands::Export,
        "report" => UserCommands::Report,
        "exit" | "quit" => UserCommands::Exit,
        _ => UserCommands::Unknown,
    }
}
