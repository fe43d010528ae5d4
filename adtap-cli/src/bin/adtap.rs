//! adtap — Google Ads API exploration tool (READ-ONLY).
//!
//! Only `check` is wired up today: it runs a query through the GAQL parser
//! and validator without touching the network. The API-facing commands are
//! placeholders until the transport layer lands.
//!
//! ```bash
//! adtap check "SELECT campaign.id, campaign.name FROM campaign LIMIT 10"
//! adtap check --format json --strict "SELECT campaign.id FROM campaign"
//! ```

use adtap_cli::check::{OutputFormat, run_check};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

#[derive(Parser)]
#[command(name = "adtap")]
#[command(version = "0.1.0-alpha")]
#[command(about = "Google Ads API exploration tool (READ-ONLY)", long_about = None)]
#[command(after_help = "EXAMPLES:
    adtap check \"SELECT campaign.id, campaign.name FROM campaign LIMIT 10\"
    adtap customers
    adtap campaigns --customer-id 1234567890")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a GAQL query
    Check {
        /// The GAQL query text
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "canonical")]
        format: OutputFormat,

        /// Reject resources not in the known-resource table
        #[arg(long)]
        strict: bool,
    },
    /// Execute a GAQL query against the API
    Search {
        /// Customer account to query
        #[arg(long)]
        customer_id: String,

        /// The GAQL query text
        query: String,
    },
    /// List accessible customer accounts
    Customers,
    /// List campaigns for a customer
    Campaigns {
        /// Customer account to query
        #[arg(long)]
        customer_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            query,
            format,
            strict,
        } => run_check(&query, format, strict),
        Commands::Search { .. } => {
            println!("{}", "search: not yet implemented".yellow());
            println!("placeholder for GoogleAdsService.Search");
            Ok(())
        }
        Commands::Customers => {
            println!("{}", "customers: not yet implemented".yellow());
            println!("placeholder for CustomerService.ListAccessibleCustomers");
            Ok(())
        }
        Commands::Campaigns { .. } => {
            println!("{}", "campaigns: not yet implemented".yellow());
            println!("placeholder for listing campaigns via GAQL");
            Ok(())
        }
    }
}
