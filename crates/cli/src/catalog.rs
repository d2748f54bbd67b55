//! `waybill catalog`: tariff catalog loading and checks.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use waybill_tariff::TariffBook;

use crate::exit_codes::EXIT_CATALOG_INVALID;
use crate::CliError;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Validate a catalog and audit its transit rule order
    #[command(after_help = "\
Examples:
  waybill catalog check
  waybill catalog check tariffs-2026q1.toml")]
    Check {
        /// Catalog TOML (defaults to --catalog, then the built-in catalog)
        file: Option<PathBuf>,
    },
}

pub fn cmd_catalog(global: Option<&Path>, cmd: CatalogCommands) -> Result<(), CliError> {
    match cmd {
        CatalogCommands::Check { file } => cmd_catalog_check(file.as_deref().or(global)),
    }
}

/// The catalog every command prices and classifies against.
pub fn load_book(path: Option<&Path>) -> Result<TariffBook, CliError> {
    let source = read_source(path)?;
    TariffBook::from_toml(&source).map_err(|e| {
        let err = CliError::tariff(e);
        match path {
            Some(p) => CliError {
                message: format!("{}: {}", p.display(), err.message),
                ..err
            },
            None => err,
        }
    })
}

fn read_source(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .map_err(|e| CliError::usage(format!("cannot read catalog {}: {e}", p.display()))),
        None => Ok(TariffBook::builtin_source().to_string()),
    }
}

fn cmd_catalog_check(path: Option<&Path>) -> Result<(), CliError> {
    let source = read_source(path)?;
    let label = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in catalog".to_string());

    let conflicts = TariffBook::audit_toml(&source).map_err(CliError::tariff)?;
    for (branch, conflict) in &conflicts {
        eprintln!("  {branch}: {conflict}");
    }
    if !conflicts.is_empty() {
        return Err(CliError::new(
            EXIT_CATALOG_INVALID,
            format!("{label}: {} transit rule-order conflict(s)", conflicts.len()),
        )
        .with_hint("move the more specific transit pattern above the broader one"));
    }

    let book = load_book(path)?;
    println!(
        "{label}: '{}' v{}, {} branch(es)",
        book.name.as_deref().unwrap_or("unnamed"),
        book.version,
        book.branches.len()
    );
    for (code, branch) in &book.branches {
        println!(
            "  {code:<6} {:<7} {} zone(s), {} destination(s), {} transit rule(s), {} area code(s)",
            branch.shape.to_string(),
            branch.zones.len(),
            branch.destinations().len(),
            branch.transit().rules().len(),
            branch.classifier().known_codes().len(),
        );
    }
    Ok(())
}
