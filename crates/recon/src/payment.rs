use waybill_core::{round_minor, PaymentMethod, ShipmentRecord, EPSILON};

use crate::model::{OffendingRecord, PaymentBreakdown, PaymentBucket};

const BUCKET_ORDER: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Transfer,
    PaymentMethod::Cod,
    PaymentMethod::Unset,
];

/// Partition by payment method and compare the valid buckets against the
/// sum of all recorded totals.
///
/// Expects records already deduplicated.
pub fn compute_payment_breakdown(records: &[ShipmentRecord]) -> PaymentBreakdown {
    let mut buckets: Vec<PaymentBucket> = BUCKET_ORDER
        .iter()
        .map(|&method| PaymentBucket {
            method,
            count: 0,
            total: 0.0,
        })
        .collect();

    let mut recorded_total = 0.0;
    for record in records {
        recorded_total += record.total;
        if let Some(bucket) = buckets.iter_mut().find(|b| b.method == record.payment_method) {
            bucket.count += 1;
            bucket.total += record.total;
        }
    }
    for bucket in &mut buckets {
        bucket.total = round_minor(bucket.total);
    }

    let valid_total = round_minor(
        buckets
            .iter()
            .filter(|b| b.method.is_valid())
            .map(|b| b.total)
            .sum(),
    );
    let recorded_total = round_minor(recorded_total);
    let difference = round_minor(recorded_total - valid_total);
    let has_mismatch = difference.abs() > EPSILON;

    let offending = if has_mismatch {
        records
            .iter()
            .filter(|r| r.total > 0.0 && !r.payment_method.is_valid())
            .map(|r| OffendingRecord {
                tracking_id: r.tracking_id.clone(),
                total: r.total,
                payment_method: r.payment_method,
            })
            .collect()
    } else {
        Vec::new()
    };

    PaymentBreakdown {
        buckets,
        valid_total,
        recorded_total,
        difference,
        has_mismatch,
        offending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use waybill_core::PaymentState;

    fn rec(id: &str, total: f64, method: &str) -> ShipmentRecord {
        ShipmentRecord {
            tracking_id: id.into(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            branch: "JKT".into(),
            region: "Jakarta Utara".into(),
            subregion: Some("Koja".into()),
            weight: 1.0,
            price_per_unit: total,
            admin_fee: 0.0,
            packaging_fee: 0.0,
            transit_fee: 0.0,
            payment_method: PaymentMethod::parse(method),
            total,
            state: PaymentState::Unpaid,
            settled_total: None,
            catalog_version: None,
        }
    }

    #[test]
    fn unset_method_with_money_is_a_mismatch() {
        let records = vec![rec("A1", 100000.0, "cash"), rec("A2", 50000.0, "")];
        let b = compute_payment_breakdown(&records);
        assert!(b.has_mismatch);
        assert_eq!(b.difference, 50000.0);
        assert_eq!(b.valid_total, 100000.0);
        assert_eq!(b.recorded_total, 150000.0);
        assert_eq!(b.offending.len(), 1);
        assert_eq!(b.offending[0].tracking_id, "A2");
        assert_eq!(b.offending[0].payment_method, PaymentMethod::Unset);
    }

    #[test]
    fn all_valid_methods_balance() {
        let records = vec![
            rec("A1", 10000.0, "cash"),
            rec("A2", 20000.0, "Transfer"),
            rec("A3", 30000.5, "COD"),
        ];
        let b = compute_payment_breakdown(&records);
        assert!(!b.has_mismatch);
        assert_eq!(b.difference, 0.0);
        assert!(b.offending.is_empty());
        assert_eq!(b.bucket(PaymentMethod::Cod).unwrap().total, 30000.5);
        assert_eq!(b.bucket(PaymentMethod::Transfer).unwrap().count, 1);
    }

    #[test]
    fn zero_total_unset_record_is_not_a_mismatch() {
        let records = vec![rec("A1", 10000.0, "cash"), rec("A2", 0.0, "")];
        let b = compute_payment_breakdown(&records);
        assert!(!b.has_mismatch);
        assert_eq!(b.bucket(PaymentMethod::Unset).unwrap().count, 1);
        assert!(b.offending.is_empty());
    }

    #[test]
    fn sub_epsilon_drift_is_ignored() {
        // 0.1 + 0.2 style float noise must not register.
        let records = vec![
            rec("A1", 0.1, "cash"),
            rec("A2", 0.2, "transfer"),
            rec("A3", 0.3, "cod"),
        ];
        let b = compute_payment_breakdown(&records);
        assert!(!b.has_mismatch);
    }

    #[test]
    fn buckets_always_present_in_fixed_order() {
        let b = compute_payment_breakdown(&[]);
        let methods: Vec<_> = b.buckets.iter().map(|b| b.method).collect();
        assert_eq!(methods, BUCKET_ORDER.to_vec());
        assert!(!b.has_mismatch);
    }
}
