use clap::Parser;
use radiusd_core::{Config, PgStore, StoreBackend, logging};
use std::process;
use tracing::{error, info, warn};

/// RADIUS AAA decision core: configuration and schema tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radiusd")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "radiusd.json")]
    config_path: String,

    /// Validate configuration, print a summary and exit
    #[arg(short, long)]
    validate: bool,

    /// Create the PostgreSQL schema
    #[arg(long)]
    migrate: bool,

    /// Write configured users into the PostgreSQL policy table
    #[arg(long)]
    seed_users: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.validate {
                eprintln!("Configuration validation failed!");
                eprintln!("   Error: {}", e);
                process::exit(1);
            }

            if let Err(e) = logging::init(&Config::default()) {
                eprintln!("Failed to initialise logging: {}", e);
            }
            warn!(path = %cli.config_path, error = %e, "Could not load config file");
            info!("Creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and run again", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate || !(cli.migrate || cli.seed_users) {
        print_summary(&cli.config_path, &config);
        process::exit(0);
    }

    if let Err(e) = logging::init(&config) {
        eprintln!("Failed to initialise logging: {}", e);
        process::exit(1);
    }

    let Some(settings) = config
        .store
        .postgres
        .as_ref()
        .filter(|_| config.store.backend == StoreBackend::Postgres)
    else {
        error!("--migrate and --seed-users need store.backend = \"postgres\"");
        process::exit(1);
    };

    let store = match PgStore::connect(settings).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            process::exit(1);
        }
    };

    if cli.migrate {
        if let Err(e) = store.migrate().await {
            error!("Migration failed: {}", e);
            process::exit(1);
        }
    }

    if cli.seed_users {
        for user in &config.users {
            if let Err(e) = store.upsert_user(user).await {
                error!(user = %user.username, "Failed to write user: {}", e);
                process::exit(1);
            }
            info!(user = %user.username, "User written");
        }
    }
}

fn print_summary(path: &str, config: &Config) {
    println!("Configuration validated successfully!");
    println!();
    println!("Configuration summary:");
    println!("  File: {}", path);
    println!("  Log level: {}", logging::filter_directive(config));
    println!("  Usage notification: {:?}", config.usage_notify);
    println!("  Store backend: {:?}", config.store.backend);
    println!("  Users: {}", config.users.len());

    for user in &config.users {
        let status = if user.ok { "enabled" } else { "disabled" };
        println!(
            "    {} ({}, simultaneous use {})",
            user.username, status, user.simultaneous_use
        );
    }
}
