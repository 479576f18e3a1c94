//! Storefront CLI - run and administer the storefront backend.
//!
//! Commands:
//! - `storefront serve` - Start the HTTP API
//! - `storefront migrate` - Apply database migrations
//! - `storefront seed` - Load the demo catalog and coupons
//! - `storefront coupon` - Manage discount coupons
//! - `storefront config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, CouponArgs, SeedArgs, ServeArgs};

/// Storefront CLI - Run and administer the storefront backend
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "STOREFRONT_CONFIG")]
    config: Option<String>,

    /// Environment overrides to apply from the config file
    #[arg(short, long, global = true, env = "STOREFRONT_ENV")]
    env: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve(ServeArgs),

    /// Apply database migrations
    Migrate,

    /// Load the demo catalog and coupons
    Seed(SeedArgs),

    /// Manage discount coupons
    Coupon(CouponArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = match context::Context::load(cli.config.as_deref(), cli.env.as_deref(), output.clone())
    {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Migrate => commands::migrate::run(&ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Coupon(args) => commands::coupon::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
