//! `waybill-recon`: post-hoc verification of shipment batches.
//!
//! Pure engine crate: receives records already fetched from the datastore,
//! returns a report. Never fails on irregular data; every irregularity is a
//! line in the report.

pub mod aggregate;
pub mod classify;
pub mod engine;
pub mod error;
pub mod gate;
pub mod load;
pub mod model;
pub mod payment;

pub use aggregate::{dedup_latest, merge_batches};
pub use engine::{reconcile, reconcile_branch};
pub use error::ReconError;
pub use gate::{ReportGate, Ticket};
pub use load::load_csv_records;
pub use model::{AreaVerification, PaymentBreakdown, ReconciliationReport};
