use std::fmt;

use chrono::NaiveDate;

use waybill_tariff::TariffError;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Pricing or charge validation failed. Nothing was written.
    Tariff(TariffError),
    /// Tracking id already present in the store.
    DuplicateTrackingId(String),
    UnknownTrackingId(String),
    /// Paid records are closed: no amendment, no second settlement.
    AlreadyPaid(String),
    /// Discount negative or larger than the amount being settled.
    InvalidDiscount { discount: f64, original: f64 },
    /// Settlement request with no tracking ids.
    EmptySettlement,
    /// No tracking-id sequence numbers left for this branch and day.
    SequenceExhausted { branch: String, date: NaiveDate },
    /// Backend failure.
    Store(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tariff(e) => write!(f, "{e}"),
            Self::DuplicateTrackingId(id) => write!(f, "tracking id '{id}' already exists"),
            Self::UnknownTrackingId(id) => write!(f, "unknown tracking id '{id}'"),
            Self::AlreadyPaid(id) => write!(f, "shipment '{id}' is already paid"),
            Self::InvalidDiscount { discount, original } => {
                write!(f, "discount {discount} outside [0, {original}]")
            }
            Self::EmptySettlement => write!(f, "settlement needs at least one tracking id"),
            Self::SequenceExhausted { branch, date } => {
                write!(f, "tracking id sequence exhausted for branch '{branch}' on {date}")
            }
            Self::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tariff(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TariffError> for LedgerError {
    fn from(e: TariffError) -> Self {
        Self::Tariff(e)
    }
}
