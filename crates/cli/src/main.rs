// waybill - tariff quotes, area classification and batch reconciliation

mod catalog;
mod exit_codes;
mod quote;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waybill_tariff::{QuoteRequest, TariffError};

use exit_codes::{tariff_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "waybill")]
#[command(about = "Branch tariff quotes and shipment batch reconciliation")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Tariff catalog TOML (defaults to the built-in catalog)
    #[arg(long, global = true, env = "WAYBILL_CATALOG")]
    catalog: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a destination
    #[command(after_help = "\
Examples:
  waybill quote --branch JKT --region \"Jakarta Utara\" --subregion Koja --weight 2
  waybill quote --branch SBY --region Malang --weight 1.5 --admin 5000 --json")]
    Quote {
        #[arg(long)]
        branch: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        subregion: Option<String>,
        #[arg(long)]
        weight: f64,
        /// Admin fee
        #[arg(long, default_value_t = 0.0)]
        admin: f64,
        /// Packaging fee
        #[arg(long, default_value_t = 0.0)]
        packaging: f64,
        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Show the area code a destination falls under
    #[command(after_help = "\
Examples:
  waybill classify --branch JKT --region \"Jakarta Utara\" --subregion Koja")]
    Classify {
        #[arg(long)]
        branch: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        subregion: Option<String>,
    },

    /// Tariff catalog tools
    #[command(subcommand)]
    Catalog(catalog::CatalogCommands),

    /// Shipment batch reconciliation
    #[command(subcommand)]
    Recon(recon::ReconCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
    )
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    // stdout is reserved for --json output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = cli.catalog.as_deref();
    let result = match cli.command {
        Commands::Quote {
            branch,
            region,
            subregion,
            weight,
            admin,
            packaging,
            json,
        } => {
            let request = QuoteRequest {
                branch,
                region,
                subregion,
                weight,
                admin_fee: admin,
                packaging_fee: packaging,
            };
            quote::cmd_quote(catalog, &request, json)
        }
        Commands::Classify { branch, region, subregion } => {
            quote::cmd_classify(catalog, &branch, &region, subregion.as_deref())
        }
        Commands::Catalog(cmd) => catalog::cmd_catalog(catalog, cmd),
        Commands::Recon(cmd) => recon::cmd_recon(catalog, cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Map a tariff error to its exit code, with a hint where one helps.
    pub fn tariff(err: TariffError) -> Self {
        let hint = match &err {
            TariffError::AmbiguousDestination { subregion: None, .. } => {
                Some("this branch prices per subregion; pass --subregion".to_string())
            }
            TariffError::UnknownBranch(_) => {
                Some("run `waybill catalog check` to list the catalog's branches".to_string())
            }
            TariffError::RuleOrderConflict { .. } => {
                Some("move the more specific transit pattern above the broader one".to_string())
            }
            _ => None,
        };
        Self { code: tariff_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
