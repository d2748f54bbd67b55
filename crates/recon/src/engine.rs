use waybill_core::{round_minor, ShipmentRecord};
use waybill_tariff::{normalize, AreaCodeClassifier, TariffBook, TariffError};

use crate::aggregate::dedup_latest;
use crate::classify::verify_areas;
use crate::model::{ReconMeta, ReconSummary, ReconciliationReport, TotalDrift};
use crate::payment::compute_payment_breakdown;

/// Reconcile a batch against one classifier.
///
/// Read-only and idempotent. Duplicated tracking ids collapse to the latest
/// record before anything is summed or classified.
pub fn reconcile(records: &[ShipmentRecord], classifier: &AreaCodeClassifier) -> ReconciliationReport {
    run(records, classifier, ReconMeta {
        branch: None,
        catalog_version: None,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Reconcile using a branch's classifier from the tariff book.
///
/// Only an unknown branch fails; the records themselves never do.
pub fn reconcile_branch(
    book: &TariffBook,
    branch: &str,
    records: &[ShipmentRecord],
) -> Result<ReconciliationReport, TariffError> {
    let catalog = book.branch(branch)?;
    Ok(run(records, catalog.classifier(), ReconMeta {
        branch: Some(normalize(branch)),
        catalog_version: Some(book.version),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

fn run(records: &[ShipmentRecord], classifier: &AreaCodeClassifier, meta: ReconMeta) -> ReconciliationReport {
    let unique = dedup_latest(records);
    let payment_breakdown = compute_payment_breakdown(&unique);
    let area_verification = verify_areas(&unique, classifier);
    let total_drift = find_total_drift(&unique);

    let summary = ReconSummary {
        input_records: records.len(),
        unique_records: unique.len(),
        duplicates_dropped: records.len() - unique.len(),
        payment_mismatch: payment_breakdown.has_mismatch,
        unclassified: area_verification.unclassified_count,
        total_drift: total_drift.len(),
    };

    log::info!(
        "reconciled {} records ({} unique): payment difference {}, {} unclassified, {} drifted totals",
        summary.input_records,
        summary.unique_records,
        payment_breakdown.difference,
        summary.unclassified,
        summary.total_drift,
    );
    if payment_breakdown.has_mismatch {
        log::warn!(
            "payment mismatch of {} across {} record(s) without a payment method",
            payment_breakdown.difference,
            payment_breakdown.offending.len()
        );
    }

    ReconciliationReport {
        meta,
        summary,
        payment_breakdown,
        area_verification,
        total_drift,
    }
}

fn find_total_drift(records: &[ShipmentRecord]) -> Vec<TotalDrift> {
    records
        .iter()
        .filter(|r| !r.is_consistent())
        .map(|r| {
            let component_total = r.component_total();
            TotalDrift {
                tracking_id: r.tracking_id.clone(),
                recorded_total: r.total,
                component_total,
                difference: round_minor(r.total - component_total),
            }
        })
        .collect()
}
