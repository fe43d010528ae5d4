//! The `check` command: run a query through the GAQL pipeline without
//! touching the API.

use adtap_core::prelude::*;
use anyhow::Result;
use clap::ValueEnum;
use colored::*;

/// Output format for a checked query.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// The canonical GAQL text.
    Canonical,
    /// The AST as JSON.
    Json,
    /// The AST as a debug tree.
    Ast,
}

/// Parse and validate `input`, printing the result in the chosen format.
///
/// `strict` rejects resources missing from the known-resource table.
pub fn run_check(input: &str, format: OutputFormat, strict: bool) -> Result<()> {
    let query = parse(input).map_err(|e| anyhow::anyhow!("{e}"))?;

    let validator = Validator {
        allow_unknown_resources: !strict,
        ..Validator::default()
    };
    validator.validate(&query).map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!("{}", "query is valid".green());
    match format {
        OutputFormat::Canonical => println!("{query}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&query)?),
        OutputFormat::Ast => println!("{query:#?}"),
    }
    Ok(())
}
