//! `waybill-ledger`: the write side: shipment intake, tracking ids and
//! settlement, all through the [`ShipmentStore`] seam.

pub mod error;
pub mod intake;
pub mod settlement;
pub mod store;
pub mod tracking;

pub use error::LedgerError;
pub use intake::{Amendment, Intake, ShipmentDraft};
pub use settlement::{settle, SettlementEntry, SettlementRequest};
pub use store::{MemoryStore, RecordQuery, ShipmentStore};
pub use tracking::{format_tracking_id, next_tracking_id};
