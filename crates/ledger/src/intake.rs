use chrono::NaiveDateTime;
use serde::Deserialize;
use waybill_core::{PaymentMethod, PaymentState, ShipmentRecord};
use waybill_tariff::normalize::normalize_opt;
use waybill_tariff::{normalize, validate_charges, QuoteRequest, TariffBook};

use crate::error::LedgerError;
use crate::store::ShipmentStore;
use crate::tracking::next_tracking_id;

/// A waybill as entered at the counter, before pricing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShipmentDraft {
    pub branch: String,
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub admin_fee: f64,
    #[serde(default)]
    pub packaging_fee: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub created_at: NaiveDateTime,
}

/// Field corrections for an unpaid waybill. `None` leaves a field as is;
/// `subregion: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Amendment {
    pub region: Option<String>,
    pub subregion: Option<Option<String>>,
    pub weight: Option<f64>,
    pub admin_fee: Option<f64>,
    pub packaging_fee: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
}

pub struct Intake<'a, S: ShipmentStore + ?Sized> {
    book: &'a TariffBook,
    store: &'a S,
}

impl<'a, S: ShipmentStore + ?Sized> Intake<'a, S> {
    pub fn new(book: &'a TariffBook, store: &'a S) -> Self {
        Self { book, store }
    }

    /// Price, number and store a new waybill.
    ///
    /// The price per unit and catalog version are frozen on the record. An
    /// unpriceable destination stops intake; nothing is written.
    pub fn create(&self, draft: &ShipmentDraft) -> Result<ShipmentRecord, LedgerError> {
        let quote = self.book.quote(&QuoteRequest {
            branch: draft.branch.clone(),
            region: draft.region.clone(),
            subregion: draft.subregion.clone(),
            weight: draft.weight,
            admin_fee: draft.admin_fee,
            packaging_fee: draft.packaging_fee,
        })?;
        let tracking_id = next_tracking_id(self.store, &quote.branch, draft.created_at.date())?;

        let record = ShipmentRecord {
            tracking_id,
            created_at: draft.created_at,
            branch: quote.branch,
            region: quote.region,
            subregion: quote.subregion,
            weight: quote.weight,
            price_per_unit: quote.price_per_unit,
            admin_fee: quote.admin_fee,
            packaging_fee: quote.packaging_fee,
            transit_fee: quote.transit_fee,
            payment_method: draft.payment_method,
            total: quote.total,
            state: PaymentState::Unpaid,
            settled_total: None,
            catalog_version: Some(quote.catalog_version),
        };
        self.store.insert(record.clone())?;
        log::info!(
            "created {} to {} (total {})",
            record.tracking_id,
            record.destination_text(),
            record.total
        );
        Ok(record)
    }

    /// Apply corrections to an unpaid waybill.
    ///
    /// Price and transit fee are looked up again only when the destination
    /// changes after normalization; otherwise the intake snapshot stays.
    /// The total is always recomputed from the stored fields.
    pub fn amend(&self, tracking_id: &str, amendment: &Amendment) -> Result<ShipmentRecord, LedgerError> {
        let mut record = self
            .store
            .get(tracking_id)?
            .ok_or_else(|| LedgerError::UnknownTrackingId(tracking_id.to_string()))?;
        if record.is_paid() {
            return Err(LedgerError::AlreadyPaid(record.tracking_id));
        }

        let region = amendment.region.as_deref().unwrap_or(&record.region).trim().to_string();
        let subregion = match &amendment.subregion {
            Some(sub) => sub.clone(),
            None => record.subregion.clone(),
        }
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
        let weight = amendment.weight.unwrap_or(record.weight);
        let admin_fee = amendment.admin_fee.unwrap_or(record.admin_fee);
        let packaging_fee = amendment.packaging_fee.unwrap_or(record.packaging_fee);
        validate_charges(weight, admin_fee, packaging_fee)?;

        let destination_changed = normalize(&region) != normalize(&record.region)
            || normalize_opt(subregion.as_deref()) != normalize_opt(record.subregion.as_deref());

        if destination_changed {
            let quote = self.book.quote(&QuoteRequest {
                branch: record.branch.clone(),
                region: region.clone(),
                subregion: subregion.clone(),
                weight,
                admin_fee,
                packaging_fee,
            })?;
            log::info!(
                "{}: destination changed to {}, repriced at {}",
                record.tracking_id,
                region,
                quote.price_per_unit
            );
            record.price_per_unit = quote.price_per_unit;
            record.transit_fee = quote.transit_fee;
            record.catalog_version = Some(quote.catalog_version);
        }

        record.region = region;
        record.subregion = subregion;
        record.weight = weight;
        record.admin_fee = admin_fee;
        record.packaging_fee = packaging_fee;
        if let Some(method) = amendment.payment_method {
            record.payment_method = method;
        }
        record.total = record.component_total();

        self.store.update(record.clone())?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RecordQuery};
    use waybill_tariff::TariffError;

    fn book() -> TariffBook {
        TariffBook::builtin().unwrap()
    }

    /// Same catalog with Jakarta Utara repriced, as a later version.
    fn repriced_book() -> TariffBook {
        let toml = TariffBook::builtin_source()
            .replace("version = 3", "version = 4")
            .replace("price = 9000", "price = 9500");
        TariffBook::from_toml(&toml).unwrap()
    }

    fn draft(region: &str, sub: Option<&str>, weight: f64) -> ShipmentDraft {
        ShipmentDraft {
            branch: "JKT".into(),
            region: region.into(),
            subregion: sub.map(Into::into),
            weight,
            admin_fee: 5000.0,
            packaging_fee: 0.0,
            payment_method: PaymentMethod::Cash,
            created_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn create_prices_and_numbers() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);

        let first = intake.create(&draft("Jakarta Utara", Some("Koja"), 2.0)).unwrap();
        assert_eq!(first.tracking_id, "JKT2601150001");
        assert_eq!(first.price_per_unit, 9000.0);
        assert_eq!(first.total, 23000.0);
        assert_eq!(first.catalog_version, Some(3));
        assert!(first.is_consistent());

        let second = intake
            .create(&draft("kepulauan seribu", Some("Kepulauan Seribu Utara"), 1.0))
            .unwrap();
        assert_eq!(second.tracking_id, "JKT2601150002");
        assert_eq!(second.transit_fee, 75000.0);
        assert_eq!(second.total, 105000.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_halts_on_ambiguous_destination() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let err = intake.create(&draft("Jakarta Utara", None, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Tariff(TariffError::AmbiguousDestination { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn create_halts_on_unknown_region() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let err = intake.create(&draft("Bogor", Some("Cibinong"), 1.0)).unwrap_err();
        assert!(matches!(err, LedgerError::Tariff(TariffError::NotFound { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_zero_weight() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let err = intake.create(&draft("Jakarta Utara", Some("Koja"), 0.0)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Tariff(TariffError::InvalidCharge { field: "weight", value: 0.0 })
        );
    }

    #[test]
    fn amend_weight_keeps_price_snapshot() {
        let (old_book, store) = (book(), MemoryStore::new());
        let created = Intake::new(&old_book, &store)
            .create(&draft("Jakarta Utara", Some("Koja"), 1.0))
            .unwrap();

        let new_book = repriced_book();
        let amended = Intake::new(&new_book, &store)
            .amend(&created.tracking_id, &Amendment {
                weight: Some(3.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(amended.price_per_unit, 9000.0);
        assert_eq!(amended.catalog_version, Some(3));
        assert_eq!(amended.total, 32000.0);
    }

    #[test]
    fn respelled_destination_is_not_repriced() {
        let (old_book, store) = (book(), MemoryStore::new());
        let created = Intake::new(&old_book, &store)
            .create(&draft("Jakarta Utara", Some("Koja"), 1.0))
            .unwrap();

        let new_book = repriced_book();
        let amended = Intake::new(&new_book, &store)
            .amend(&created.tracking_id, &Amendment {
                region: Some("  JAKARTA   utara".into()),
                subregion: Some(Some("koja ".into())),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(amended.price_per_unit, 9000.0);
        assert_eq!(amended.subregion.as_deref(), Some("koja"));
    }

    #[test]
    fn changed_destination_is_repriced() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let created = intake.create(&draft("Jakarta Utara", Some("Koja"), 2.0)).unwrap();

        let amended = intake
            .amend(&created.tracking_id, &Amendment {
                region: Some("Jakarta Barat".into()),
                subregion: Some(Some("Kalideres".into())),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(amended.price_per_unit, 10000.0);
        assert_eq!(amended.transit_fee, 5000.0);
        assert_eq!(amended.total, 30000.0);
        assert_eq!(store.get(&created.tracking_id).unwrap(), Some(amended));
    }

    #[test]
    fn amend_to_unpriceable_destination_leaves_record() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let created = intake.create(&draft("Jakarta Utara", Some("Koja"), 1.0)).unwrap();

        let err = intake
            .amend(&created.tracking_id, &Amendment {
                subregion: Some(None),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Tariff(_)));
        assert_eq!(store.get(&created.tracking_id).unwrap(), Some(created));
    }

    #[test]
    fn paid_record_cannot_be_amended() {
        let (book, store) = (book(), MemoryStore::new());
        let intake = Intake::new(&book, &store);
        let mut created = intake.create(&draft("Jakarta Utara", Some("Koja"), 1.0)).unwrap();
        created.state = PaymentState::Paid;
        store.update(created.clone()).unwrap();

        let err = intake
            .amend(&created.tracking_id, &Amendment {
                payment_method: Some(PaymentMethod::Transfer),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyPaid(created.tracking_id.clone()));
        let unpaid = store.query(&RecordQuery::new().state(PaymentState::Unpaid)).unwrap();
        assert!(unpaid.is_empty());
    }

    #[test]
    fn amend_unknown_id() {
        let (book, store) = (book(), MemoryStore::new());
        let err = Intake::new(&book, &store)
            .amend("JKT2601150099", &Amendment::default())
            .unwrap_err();
        assert_eq!(err, LedgerError::UnknownTrackingId("JKT2601150099".into()));
    }
}
