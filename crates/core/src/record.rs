use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::money::{approx_eq, compute_total};

// ---------------------------------------------------------------------------
// Payment method
// ---------------------------------------------------------------------------

/// How a shipment is paid for.
///
/// Anything that isn't one of the three recognized methods (including the
/// empty string) reads as `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Cod,
    Unset,
}

impl PaymentMethod {
    /// The three methods that count toward a valid payment breakdown.
    pub const VALID: [PaymentMethod; 3] = [Self::Cash, Self::Transfer, Self::Cod];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Self::Cash,
            "transfer" => Self::Transfer,
            "cod" => Self::Cod,
            _ => Self::Unset,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Cod => "cod",
            Self::Unset => "unset",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Unset
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payment state
// ---------------------------------------------------------------------------

/// Unpaid → Paid is the only transition, and only settlement performs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Unpaid,
    Paid,
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Shipment record
// ---------------------------------------------------------------------------

/// One waybill as persisted by the datastore.
///
/// `price_per_unit` and `catalog_version` are a snapshot taken at intake and
/// are never re-derived from a newer catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub tracking_id: String,
    pub created_at: NaiveDateTime,
    pub branch: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    pub weight: f64,
    pub price_per_unit: f64,
    pub admin_fee: f64,
    pub packaging_fee: f64,
    pub transit_fee: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Recorded grand total.
    pub total: f64,
    #[serde(default)]
    pub state: PaymentState,
    /// Amount actually collected after a settlement discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_version: Option<u32>,
}

impl ShipmentRecord {
    /// Grand total re-derived from the stored components.
    pub fn component_total(&self) -> f64 {
        compute_total(
            self.weight,
            self.price_per_unit,
            self.admin_fee,
            self.packaging_fee,
            self.transit_fee,
        )
    }

    /// Whether the recorded total agrees with its components.
    pub fn is_consistent(&self) -> bool {
        approx_eq(self.total, self.component_total())
    }

    pub fn is_paid(&self) -> bool {
        self.state == PaymentState::Paid
    }

    /// Destination exactly as recorded, for display in remediation lists.
    pub fn destination_text(&self) -> String {
        match self.subregion.as_deref() {
            Some(sub) if !sub.trim().is_empty() => format!("{} / {}", self.region, sub),
            _ => self.region.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> ShipmentRecord {
        ShipmentRecord {
            tracking_id: "JKT2601150001".into(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            branch: "JKT".into(),
            region: "Jakarta Utara".into(),
            subregion: Some("Koja".into()),
            weight: 3.0,
            price_per_unit: 9000.0,
            admin_fee: 5000.0,
            packaging_fee: 0.0,
            transit_fee: 0.0,
            payment_method: PaymentMethod::Cash,
            total: 32000.0,
            state: PaymentState::Unpaid,
            settled_total: None,
            catalog_version: Some(3),
        }
    }

    #[test]
    fn payment_method_parse_is_case_insensitive() {
        assert_eq!(PaymentMethod::parse(" CASH "), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::parse("Transfer"), PaymentMethod::Transfer);
        assert_eq!(PaymentMethod::parse("cod"), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::parse(""), PaymentMethod::Unset);
        assert_eq!(PaymentMethod::parse("giro"), PaymentMethod::Unset);
    }

    #[test]
    fn payment_method_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&PaymentMethod::Cod).unwrap();
        assert_eq!(json, "\"cod\"");
        let parsed: PaymentMethod = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Unset);
    }

    #[test]
    fn consistent_record() {
        let r = record();
        assert_eq!(r.component_total(), 32000.0);
        assert!(r.is_consistent());
    }

    #[test]
    fn drifted_total_is_inconsistent() {
        let mut r = record();
        r.total = 31000.0;
        assert!(!r.is_consistent());
    }

    #[test]
    fn destination_text_omits_blank_subregion() {
        let mut r = record();
        assert_eq!(r.destination_text(), "Jakarta Utara / Koja");
        r.subregion = Some("  ".into());
        assert_eq!(r.destination_text(), "Jakarta Utara");
        r.subregion = None;
        assert_eq!(r.destination_text(), "Jakarta Utara");
    }

    #[test]
    fn record_json_defaults() {
        let json = r#"{
            "tracking_id": "SBY2601150001",
            "created_at": "2026-01-15T08:00:00",
            "branch": "SBY",
            "region": "Malang",
            "weight": 1.0,
            "price_per_unit": 12000.0,
            "admin_fee": 0.0,
            "packaging_fee": 0.0,
            "transit_fee": 0.0,
            "total": 12000.0
        }"#;
        let r: ShipmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.subregion, None);
        assert_eq!(r.payment_method, PaymentMethod::Unset);
        assert_eq!(r.state, PaymentState::Unpaid);
        assert!(r.is_consistent());
    }
}
