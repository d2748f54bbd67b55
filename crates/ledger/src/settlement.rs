//! Settlement: closing a set of unpaid waybills in one payment, optionally
//! with a discount, and recording it in the ledger.
//!
//! All-or-nothing. Every referenced record is checked before the first
//! write. Each record moves Unpaid → Paid with `settled_total` set to its
//! share of the discounted amount. There is no reversal.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use waybill_core::{round_minor, PaymentState, ShipmentRecord};

use crate::error::LedgerError;
use crate::store::ShipmentStore;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettlementRequest {
    pub tracking_ids: Vec<String>,
    #[serde(default)]
    pub discount: f64,
    pub date: NaiveDate,
}

/// Ledger line written once per settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub id: String,
    pub date: NaiveDate,
    pub tracking_ids: Vec<String>,
    pub original_amount: f64,
    pub discount: f64,
    pub final_amount: f64,
}

pub fn settle<S: ShipmentStore + ?Sized>(
    store: &S,
    request: &SettlementRequest,
) -> Result<SettlementEntry, LedgerError> {
    if request.tracking_ids.is_empty() {
        return Err(LedgerError::EmptySettlement);
    }

    // Validate everything up front
    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(request.tracking_ids.len());
    for id in &request.tracking_ids {
        if !seen.insert(id.as_str()) {
            return Err(LedgerError::DuplicateTrackingId(id.clone()));
        }
        let record = store
            .get(id)?
            .ok_or_else(|| LedgerError::UnknownTrackingId(id.clone()))?;
        if record.is_paid() {
            return Err(LedgerError::AlreadyPaid(id.clone()));
        }
        records.push(record);
    }

    let original_amount = round_minor(records.iter().map(|r| r.total).sum());
    let discount = request.discount;
    if !discount.is_finite() || discount < 0.0 || discount > original_amount {
        return Err(LedgerError::InvalidDiscount {
            discount,
            original: original_amount,
        });
    }
    let final_amount = round_minor(original_amount - discount);

    let shares = split_proportionally(&records, final_amount);
    let entry = SettlementEntry {
        id: next_settlement_id(store, request.date)?,
        date: request.date,
        tracking_ids: request.tracking_ids.clone(),
        original_amount,
        discount,
        final_amount,
    };

    for (mut record, share) in records.into_iter().zip(shares) {
        record.state = PaymentState::Paid;
        record.settled_total = Some(share);
        store.update(record)?;
    }
    store.insert_settlement(entry.clone())?;

    log::info!(
        "settlement {}: {} shipment(s), {} - {} = {}",
        entry.id,
        entry.tracking_ids.len(),
        original_amount,
        discount,
        final_amount
    );
    Ok(entry)
}

/// Each record's share of `final_amount`, proportional to its total.
///
/// Works in minor units with the largest-remainder method: every record
/// gets the floor of its exact quota, then the leftover units go to the
/// largest fractional parts (earlier records first on ties). Shares are
/// never negative and sum exactly to `final_amount`.
fn split_proportionally(records: &[ShipmentRecord], final_amount: f64) -> Vec<f64> {
    let to_minor = |v: f64| (v * 100.0).round().max(0.0) as i128;
    let final_minor = to_minor(final_amount);
    let weights: Vec<i128> = records.iter().map(|r| to_minor(r.total)).collect();
    let denominator: i128 = weights.iter().sum();
    if denominator == 0 {
        return vec![0.0; records.len()];
    }

    let mut units = Vec::with_capacity(records.len());
    let mut remainders = Vec::with_capacity(records.len());
    for (i, weight) in weights.iter().enumerate() {
        let numerator = final_minor * weight;
        units.push(numerator / denominator);
        remainders.push((numerator % denominator, i));
    }

    let leftover = final_minor - units.iter().sum::<i128>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, i) in remainders.iter().take(leftover.max(0) as usize) {
        units[i] += 1;
    }

    units.into_iter().map(|u| u as f64 / 100.0).collect()
}

/// `STL-YYYYMMDD-NNN`, counted per day.
fn next_settlement_id<S: ShipmentStore + ?Sized>(store: &S, date: NaiveDate) -> Result<String, LedgerError> {
    let same_day = store.settlements()?.iter().filter(|e| e.date == date).count();
    Ok(format!("STL-{}-{:03}", date.format("%Y%m%d"), same_day + 1))
}
