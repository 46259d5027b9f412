use std::process::ExitCode;

use tracing::info;

use requery::config::{default_config_path, load_config};
use requery::{Client, QueryOutcome, QueryResult};

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: requery <config.toml> <sql>");
        if let Some(path) = default_config_path() {
            eprintln!("Default config location: {}", path.display());
        }
        return ExitCode::FAILURE;
    }

    let config = match load_config(&args[1]) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Connecting to {}", config.database.url());
    let mut client = Client::connect_with(config.database.clone(), &config.client());

    match client.query(&args[2]) {
        QueryOutcome::Fresh(result) => {
            print_table(&result);
            ExitCode::SUCCESS
        }
        QueryOutcome::Unreachable(last) => {
            eprintln!("Network unreachable; showing last stored result");
            if let Some(result) = last {
                print_table(&result);
            }
            ExitCode::FAILURE
        }
        QueryOutcome::Failed(last) => {
            eprintln!("Query failed after one retry; showing last stored result");
            if let Some(result) = last {
                print_table(&result);
            }
            ExitCode::FAILURE
        }
    }
}

fn print_table(result: &QueryResult) {
    println!("{}", result.columns.join("\t"));
    for row in &result.rows {
        let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("NULL")).collect();
        println!("{}", cells.join("\t"));
    }
}
