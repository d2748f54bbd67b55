//! `waybill recon`: reconcile a datastore export against a branch catalog.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use waybill_recon::{load_csv_records, reconcile_branch};

use crate::catalog::load_book;
use crate::exit_codes::{EXIT_OUTPUT, EXIT_RECON_INPUT, EXIT_RECON_MISMATCH};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile a shipment records CSV
    #[command(after_help = "\
Examples:
  waybill recon run january.csv --branch JKT
  waybill recon run january.csv --branch JKT --json
  waybill recon run january.csv --branch JKT --catalog tariffs.toml --output report.json")]
    Run {
        /// Records CSV exported from the datastore
        records: PathBuf,

        /// Branch whose area codes the batch is verified against
        #[arg(long)]
        branch: String,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn cmd_recon(catalog: Option<&Path>, cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { records, branch, json, output } => {
            cmd_recon_run(catalog, &records, &branch, json, output)
        }
    }
}

fn cmd_recon_run(
    catalog: Option<&Path>,
    records_path: &Path,
    branch: &str,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let book = load_book(catalog)?;

    let csv_data = std::fs::read_to_string(records_path)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", records_path.display())))?;
    let records = load_csv_records(&csv_data).map_err(|e| {
        CliError::new(EXIT_RECON_INPUT, format!("{}: {e}", records_path.display()))
    })?;

    let report = reconcile_branch(&book, branch, &records).map_err(CliError::tariff)?;

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_OUTPUT, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.summary;
    let p = &report.payment_breakdown;
    let a = &report.area_verification;
    eprintln!(
        "{} recon: {} records ({} unique, {} duplicates dropped), catalog v{}",
        report.meta.branch.as_deref().unwrap_or("-"),
        s.input_records,
        s.unique_records,
        s.duplicates_dropped,
        book.version,
    );
    let buckets: Vec<String> = p
        .buckets
        .iter()
        .map(|b| format!("{} {} ({})", b.method, b.total, b.count))
        .collect();
    eprintln!("payments: {}", buckets.join(", "));
    eprintln!(
        "  recorded {}, valid {}, difference {}",
        p.recorded_total, p.valid_total, p.difference
    );
    for o in &p.offending {
        eprintln!("  no payment method: {} ({})", o.tracking_id, o.total);
    }
    let tallies: Vec<String> = a.tallies.iter().map(|t| format!("{} {}", t.code, t.count)).collect();
    eprintln!(
        "areas: {}; {} of {} classified",
        tallies.join(", "),
        a.classified,
        a.total
    );
    for item in &a.needs_remediation {
        eprintln!("  unclassified: {} ({})", item.tracking_id, item.destination);
    }
    if s.total_drift > 0 {
        eprintln!("warning: {} record(s) with totals that disagree with their components", s.total_drift);
    }

    if p.has_mismatch && !a.ok {
        return Err(CliError::new(
            EXIT_RECON_MISMATCH,
            "payment mismatch and unclassified records found",
        ));
    }
    if p.has_mismatch {
        return Err(CliError::new(EXIT_RECON_MISMATCH, "payment mismatch found")
            .with_hint("assign a payment method to the records listed above"));
    }
    if !a.ok {
        return Err(CliError::new(EXIT_RECON_MISMATCH, "unclassified records found")
            .with_hint("map the listed destinations to an area code in the catalog"));
    }
    Ok(())
}
