use std::cmp::Ordering;
use std::collections::BTreeMap;

use waybill_core::ShipmentRecord;

/// Keep one record per tracking id: the one created last.
///
/// Equal timestamps fall back to a fixed field ordering so the winner never
/// depends on input order. Output is sorted by tracking id.
pub fn dedup_latest(records: &[ShipmentRecord]) -> Vec<ShipmentRecord> {
    let mut latest: BTreeMap<&str, &ShipmentRecord> = BTreeMap::new();

    for record in records {
        latest
            .entry(record.tracking_id.as_str())
            .and_modify(|kept| {
                if precedence(record, kept) == Ordering::Greater {
                    *kept = record;
                }
            })
            .or_insert(record);
    }

    latest.into_values().cloned().collect()
}

/// Union of independently fetched batches, deduplicated by tracking id.
///
/// Order-independent: any permutation of `batches` (or of the records inside
/// them) produces the same output.
pub fn merge_batches(batches: &[Vec<ShipmentRecord>]) -> Vec<ShipmentRecord> {
    let all: Vec<ShipmentRecord> = batches.iter().flatten().cloned().collect();
    dedup_latest(&all)
}

fn precedence(a: &ShipmentRecord, b: &ShipmentRecord) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.is_paid().cmp(&b.is_paid()))
        .then_with(|| a.total.total_cmp(&b.total))
        .then_with(|| a.payment_method.cmp(&b.payment_method))
        .then_with(|| a.region.cmp(&b.region))
        .then_with(|| a.subregion.cmp(&b.subregion))
        .then_with(|| a.weight.total_cmp(&b.weight))
        .then_with(|| a.price_per_unit.total_cmp(&b.price_per_unit))
        .then_with(|| a.admin_fee.total_cmp(&b.admin_fee))
        .then_with(|| a.packaging_fee.total_cmp(&b.packaging_fee))
        .then_with(|| a.transit_fee.total_cmp(&b.transit_fee))
        .then_with(|| a.branch.cmp(&b.branch))
        .then_with(|| cmp_opt_amount(a.settled_total, b.settled_total))
        .then_with(|| a.catalog_version.cmp(&b.catalog_version))
}

fn cmp_opt_amount(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
