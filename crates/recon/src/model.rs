use serde::Serialize;
use waybill_core::PaymentMethod;

// ---------------------------------------------------------------------------
// Payment breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentBucket {
    pub method: PaymentMethod,
    pub count: usize,
    pub total: f64,
}

/// A record with money on it but no usable payment method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffendingRecord {
    pub tracking_id: String,
    pub total: f64,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    /// Always all four methods, in the order cash, transfer, cod, unset.
    pub buckets: Vec<PaymentBucket>,
    /// Sum over cash + transfer + cod.
    pub valid_total: f64,
    /// Sum of every recorded total.
    pub recorded_total: f64,
    /// `recorded_total - valid_total`.
    pub difference: f64,
    pub has_mismatch: bool,
    /// Populated only when `has_mismatch`.
    pub offending: Vec<OffendingRecord>,
}

impl PaymentBreakdown {
    pub fn bucket(&self, method: PaymentMethod) -> Option<&PaymentBucket> {
        self.buckets.iter().find(|b| b.method == method)
    }
}

// ---------------------------------------------------------------------------
// Area verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaTally {
    pub code: String,
    pub count: usize,
}

/// A record whose destination maps to no area code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemediationItem {
    pub tracking_id: String,
    /// Destination exactly as recorded.
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaVerification {
    /// Known codes first (declared order), then any undeclared code seen.
    pub tallies: Vec<AreaTally>,
    pub total: usize,
    pub classified: usize,
    pub unclassified_count: usize,
    /// `total - classified`.
    pub diff: usize,
    pub ok: bool,
    /// Populated only when not `ok`.
    pub needs_remediation: Vec<RemediationItem>,
}

impl AreaVerification {
    pub fn count(&self, code: &str) -> usize {
        self.tallies
            .iter()
            .find(|t| t.code == code)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Total drift
// ---------------------------------------------------------------------------

/// Recorded total disagrees with `weight × price + fees`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalDrift {
    pub tracking_id: String,
    pub recorded_total: f64,
    pub component_total: f64,
    pub difference: f64,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub input_records: usize,
    pub unique_records: usize,
    pub duplicates_dropped: usize,
    pub payment_mismatch: bool,
    pub unclassified: usize,
    pub total_drift: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_version: Option<u32>,
    pub engine_version: String,
}

/// Output of one reconciliation run. Carries no timestamps: the same batch
/// always yields an identical report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub payment_breakdown: PaymentBreakdown,
    pub area_verification: AreaVerification,
    pub total_drift: Vec<TotalDrift>,
}

impl ReconciliationReport {
    /// No payment mismatch and no unclassified destination.
    pub fn is_clean(&self) -> bool {
        !self.payment_breakdown.has_mismatch && self.area_verification.ok
    }
}
