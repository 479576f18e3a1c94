//! CLI command implementations.

pub mod config;
pub mod coupon;
pub mod migrate;
pub mod seed;
pub mod serve;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured listen host.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured listen port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip applying migrations on startup.
    #[arg(long)]
    pub no_migrate: bool,
}

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Skip the demo coupons.
    #[arg(long)]
    pub no_coupons: bool,
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    #[command(subcommand)]
    pub command: CouponCommand,
}

#[derive(Subcommand)]
pub enum CouponCommand {
    /// Create a coupon.
    Create {
        /// Coupon code.
        code: String,

        /// Percentage off the subtotal (0-100).
        #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
        percent: Option<Decimal>,

        /// Fixed amount off the order.
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// List coupons.
    List,
    /// Check whether a code would apply.
    Check {
        /// Coupon code.
        code: String,
    },
    /// Activate a coupon.
    Activate {
        /// Coupon code.
        code: String,
    },
    /// Deactivate a coupon.
    Deactivate {
        /// Coupon code.
        code: String,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
