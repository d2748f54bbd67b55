use serde::{Deserialize, Serialize};
use waybill_core::compute_total;

use crate::catalog::TariffBook;
use crate::error::TariffError;
use crate::normalize::normalize;

/// Destination and charges for a new waybill, before pricing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoteRequest {
    pub branch: String,
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub admin_fee: f64,
    #[serde(default)]
    pub packaging_fee: f64,
}

/// A fully priced destination. Everything intake needs to snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub branch: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    pub weight: f64,
    pub price_per_unit: f64,
    pub admin_fee: f64,
    pub packaging_fee: f64,
    pub transit_fee: f64,
    /// Pattern of the transit rule that fired, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_rule: Option<String>,
    pub total: f64,
    pub catalog_version: u32,
}

impl TariffBook {
    /// Price a destination. Fails rather than guessing when the destination
    /// is not in the branch catalog.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote, TariffError> {
        validate_charges(request.weight, request.admin_fee, request.packaging_fee)?;

        let subregion = request.subregion.as_deref();
        let price_per_unit = self.resolve_price(&request.branch, &request.region, subregion)?;
        let branch = self.branch(&request.branch)?;
        let hit = branch.transit().matching_rule(&request.region, subregion);
        let transit_fee = hit.map(|(_, rule)| rule.fee).unwrap_or(0.0);

        Ok(Quote {
            branch: normalize(&request.branch),
            region: request.region.trim().to_string(),
            subregion: subregion
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            weight: request.weight,
            price_per_unit,
            admin_fee: request.admin_fee,
            packaging_fee: request.packaging_fee,
            transit_fee,
            transit_rule: hit.map(|(_, rule)| rule.pattern.clone()),
            total: compute_total(
                request.weight,
                price_per_unit,
                request.admin_fee,
                request.packaging_fee,
                transit_fee,
            ),
            catalog_version: self.version,
        })
    }
}

/// Weight must be positive; fees may be zero but never negative.
pub fn validate_charges(weight: f64, admin_fee: f64, packaging_fee: f64) -> Result<(), TariffError> {
    check_charge("weight", weight, false)?;
    check_charge("admin fee", admin_fee, true)?;
    check_charge("packaging fee", packaging_fee, true)
}

fn check_charge(field: &'static str, value: f64, allow_zero: bool) -> Result<(), TariffError> {
    let ok = value.is_finite() && if allow_zero { value >= 0.0 } else { value > 0.0 };
    if ok {
        Ok(())
    } else {
        Err(TariffError::InvalidCharge { field, value })
    }
}
