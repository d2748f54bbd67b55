use waybill_core::ShipmentRecord;
use waybill_tariff::{AreaCode, AreaCodeClassifier};

use crate::model::{AreaTally, AreaVerification, RemediationItem};

/// Classify every record and tally per area code.
///
/// Uses the same [`AreaCodeClassifier::classify`] as live filtering, so a
/// record that shows up under a code on screen is counted under it here.
/// Expects records already deduplicated.
pub fn verify_areas(records: &[ShipmentRecord], classifier: &AreaCodeClassifier) -> AreaVerification {
    let mut tallies: Vec<AreaTally> = classifier
        .known_codes()
        .iter()
        .map(|code| AreaTally {
            code: code.clone(),
            count: 0,
        })
        .collect();
    let mut unclassified = Vec::new();

    for record in records {
        match classifier.classify(&record.region, record.subregion.as_deref()) {
            AreaCode::Known(code) => match tallies.iter_mut().find(|t| t.code == code) {
                Some(tally) => tally.count += 1,
                None => tallies.push(AreaTally { code, count: 1 }),
            },
            AreaCode::Unclassified => unclassified.push(RemediationItem {
                tracking_id: record.tracking_id.clone(),
                destination: record.destination_text(),
            }),
        }
    }

    let total = records.len();
    let classified: usize = tallies.iter().map(|t| t.count).sum();
    let diff = total - classified;
    let ok = unclassified.is_empty();

    AreaVerification {
        tallies,
        total,
        classified,
        unclassified_count: unclassified.len(),
        diff,
        ok,
        needs_remediation: if ok { Vec::new() } else { unclassified },
    }
}
