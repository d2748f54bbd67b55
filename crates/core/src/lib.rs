//! `waybill-core`: shared data model for shipment intake, settlement and
//! reconciliation.
//!
//! No IO, no catalog knowledge. Every other crate in the workspace speaks in
//! these types.

pub mod money;
pub mod record;

pub use money::{approx_eq, compute_total, round_minor, EPSILON};
pub use record::{PaymentMethod, PaymentState, ShipmentRecord};
