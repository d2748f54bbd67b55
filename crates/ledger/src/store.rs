use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use waybill_core::{PaymentMethod, PaymentState, ShipmentRecord};
use waybill_tariff::{normalize, AreaCodeClassifier};

use crate::error::LedgerError;
use crate::settlement::SettlementEntry;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Filter for [`ShipmentStore::query`]. Every unset field matches everything.
///
/// The area filter runs the same [`AreaCodeClassifier`] that reconciliation
/// uses, so a live filtered view and a batch report always agree on which
/// records belong to a code.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery<'a> {
    pub branch: Option<String>,
    /// Inclusive creation-date bounds.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub state: Option<PaymentState>,
    pub method: Option<PaymentMethod>,
    pub area: Option<(String, &'a AreaCodeClassifier)>,
}

impl<'a> RecordQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = Some(normalize(branch));
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn state(mut self, state: PaymentState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn area(mut self, code: &str, classifier: &'a AreaCodeClassifier) -> Self {
        self.area = Some((normalize(code), classifier));
        self
    }

    pub fn matches(&self, record: &ShipmentRecord) -> bool {
        if let Some(branch) = &self.branch {
            if normalize(&record.branch) != *branch {
                return false;
            }
        }
        let day = record.created_at.date();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        if self.state.is_some_and(|s| s != record.state) {
            return false;
        }
        if self.method.is_some_and(|m| m != record.payment_method) {
            return false;
        }
        if let Some((code, classifier)) = &self.area {
            let actual = classifier.classify(&record.region, record.subregion.as_deref());
            if actual.as_known().map(normalize).as_deref() != Some(code.as_str()) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistence seam for shipment records and settlement entries.
pub trait ShipmentStore {
    /// Matching records ordered by tracking id.
    fn query(&self, query: &RecordQuery<'_>) -> Result<Vec<ShipmentRecord>, LedgerError>;

    fn get(&self, tracking_id: &str) -> Result<Option<ShipmentRecord>, LedgerError>;

    /// Fails with [`LedgerError::DuplicateTrackingId`] if the id exists.
    fn insert(&self, record: ShipmentRecord) -> Result<(), LedgerError>;

    /// Replace an existing record. Fails with
    /// [`LedgerError::UnknownTrackingId`] if it isn't there.
    fn update(&self, record: ShipmentRecord) -> Result<(), LedgerError>;

    fn insert_settlement(&self, entry: SettlementEntry) -> Result<(), LedgerError>;

    fn settlements(&self) -> Result<Vec<SettlementEntry>, LedgerError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, ShipmentRecord>>,
    settlements: RwLock<Vec<SettlementEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from an existing batch. Later duplicates are rejected.
    pub fn with_records(records: impl IntoIterator<Item = ShipmentRecord>) -> Result<Self, LedgerError> {
        let store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ShipmentStore for MemoryStore {
    fn query(&self, query: &RecordQuery<'_>) -> Result<Vec<ShipmentRecord>, LedgerError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    fn get(&self, tracking_id: &str) -> Result<Option<ShipmentRecord>, LedgerError> {
        Ok(self.records.read().get(tracking_id).cloned())
    }

    fn insert(&self, record: ShipmentRecord) -> Result<(), LedgerError> {
        let mut records = self.records.write();
        if records.contains_key(&record.tracking_id) {
            return Err(LedgerError::DuplicateTrackingId(record.tracking_id));
        }
        records.insert(record.tracking_id.clone(), record);
        Ok(())
    }

    fn update(&self, record: ShipmentRecord) -> Result<(), LedgerError> {
        let mut records = self.records.write();
        match records.get_mut(&record.tracking_id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(LedgerError::UnknownTrackingId(record.tracking_id)),
        }
    }

    fn insert_settlement(&self, entry: SettlementEntry) -> Result<(), LedgerError> {
        self.settlements.write().push(entry);
        Ok(())
    }

    fn settlements(&self) -> Result<Vec<SettlementEntry>, LedgerError> {
        Ok(self.settlements.read().clone())
    }
}
