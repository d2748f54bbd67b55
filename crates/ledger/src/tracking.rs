//! Tracking ids: `<BRANCH><YYMMDD><SEQ>`, sequence zero-padded to four
//! digits and counted per branch per day.

use chrono::NaiveDate;
use waybill_tariff::normalize;

use crate::error::LedgerError;
use crate::store::{RecordQuery, ShipmentStore};

const SEQ_WIDTH: usize = 4;

pub fn format_tracking_id(branch: &str, date: NaiveDate, seq: u32) -> String {
    format!("{}{}{:0width$}", normalize(branch), date.format("%y%m%d"), seq, width = SEQ_WIDTH)
}

/// Sequence part of `id` if it belongs to `branch` on `date`.
pub fn parse_sequence(id: &str, branch: &str, date: NaiveDate) -> Option<u32> {
    let prefix = format!("{}{}", normalize(branch), date.format("%y%m%d"));
    let seq = id.strip_prefix(&prefix)?;
    if seq.len() < SEQ_WIDTH || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

/// One past the highest sequence already stored for this branch and day.
///
/// Not a reservation: the store re-checks uniqueness at insert.
pub fn next_tracking_id<S: ShipmentStore + ?Sized>(
    store: &S,
    branch: &str,
    date: NaiveDate,
) -> Result<String, LedgerError> {
    let existing = store.query(&RecordQuery::new().branch(branch).between(date, date))?;
    let highest = existing
        .iter()
        .filter_map(|r| parse_sequence(&r.tracking_id, branch, date))
        .max()
        .unwrap_or(0);
    let next = highest.checked_add(1).ok_or_else(|| LedgerError::SequenceExhausted {
        branch: normalize(branch),
        date,
    })?;
    Ok(format_tracking_id(branch, date, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use waybill_core::{PaymentMethod, PaymentState, ShipmentRecord};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn rec(id: &str) -> ShipmentRecord {
        ShipmentRecord {
            tracking_id: id.into(),
            created_at: day().and_hms_opt(9, 0, 0).unwrap(),
            branch: "JKT".into(),
            region: "Jakarta Utara".into(),
            subregion: Some("Koja".into()),
            weight: 1.0,
            price_per_unit: 9000.0,
            admin_fee: 0.0,
            packaging_fee: 0.0,
            transit_fee: 0.0,
            payment_method: PaymentMethod::Cash,
            total: 9000.0,
            state: PaymentState::Unpaid,
            settled_total: None,
            catalog_version: None,
        }
    }

    #[test]
    fn format_pads_sequence() {
        assert_eq!(format_tracking_id("jkt", day(), 7), "JKT2601150007");
        assert_eq!(format_tracking_id("JKT", day(), 12345), "JKT26011512345");
    }

    #[test]
    fn parse_rejects_other_branch_or_day() {
        assert_eq!(parse_sequence("JKT2601150042", "JKT", day()), Some(42));
        assert_eq!(parse_sequence("SBY2601150042", "JKT", day()), None);
        assert_eq!(parse_sequence("JKT2601160042", "JKT", day()), None);
        assert_eq!(parse_sequence("JKT260115X042", "JKT", day()), None);
    }

    #[test]
    fn first_id_of_the_day() {
        let store = MemoryStore::new();
        assert_eq!(next_tracking_id(&store, "JKT", day()).unwrap(), "JKT2601150001");
    }

    #[test]
    fn next_id_skips_past_highest() {
        let store =
            MemoryStore::with_records(vec![rec("JKT2601150001"), rec("JKT2601150009"), rec("legacy-1")])
                .unwrap();
        assert_eq!(next_tracking_id(&store, "jkt", day()).unwrap(), "JKT2601150010");
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let store = MemoryStore::with_records(vec![rec("JKT2601154294967295")]).unwrap();
        assert_eq!(
            next_tracking_id(&store, "JKT", day()).unwrap_err(),
            LedgerError::SequenceExhausted { branch: "JKT".into(), date: day() }
        );
    }
}
