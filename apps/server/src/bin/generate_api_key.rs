//! CLI tool to generate API keys.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --email analyst@example.com --name "Laptop" --expires-in 90d

use std::env;

use finsight_lib::config::Config;
use finsight_lib::db::DbPool;
use finsight_lib::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut email: Option<String> = None;
    let mut name: Option<String> = None;
    let mut display_name: Option<String> = None;
    let mut expires_in: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--email" | "-u" => {
                i += 1;
                if i < args.len() {
                    email = Some(args[i].clone());
                }
            }
            "--name" | "-n" => {
                i += 1;
                if i < args.len() {
                    name = Some(args[i].clone());
                }
            }
            "--display-name" | "-d" => {
                i += 1;
                if i < args.len() {
                    display_name = Some(args[i].clone());
                }
            }
            "--expires-in" | "-e" => {
                i += 1;
                if i < args.len() {
                    expires_in = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (email, name) = match (email, name) {
        (Some(e), Some(n)) => (e, n),
        (None, _) => {
            eprintln!("Error: --email is required");
            print_usage();
            std::process::exit(1);
        }
        (_, None) => {
            eprintln!("Error: --name is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    let (full_key, api_key, user) = match api_key::create_key(
        &pool,
        &email,
        display_name.as_deref(),
        &name,
        expires_in.as_deref(),
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error generating key: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  User:    {} ({})", user.email, user.id);
    println!("  Key ID:  {}", api_key.id);
    println!("  Name:    {}", api_key.name);
    println!("  Prefix:  {}", api_key.key_prefix);
    match api_key.expires_at {
        Some(expires) => println!("  Expires: {}", expires.to_rfc3339()),
        None => println!("  Expires: Never"),
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("  Save this key! It cannot be retrieved later.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!(
        "Usage: generate-api-key --email <email> --name <name> [--display-name <name>] [--expires-in <duration>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --email, -u         Owner email; the user is created on first use (required)");
    eprintln!("  --name, -n          Label for the API key (required)");
    eprintln!("  --display-name, -d  Display name for a newly created user");
    eprintln!("  --expires-in, -e    Expiration: 30d, 2w, 6m, 1y (default: never)");
    eprintln!("  --help, -h          Show this help");
    eprintln!();
}
