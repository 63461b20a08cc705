//! In-memory ledger of open paired positions.
//!
//! Only the control loop mutates the ledger, and only after every worker of
//! the current step has joined, so no locking is involved. The open-position
//! cap lives in the loop, not here.

use arbitrager_core::DealRecord;

#[derive(Debug, Clone, Default)]
pub struct DealLedger {
    records: Vec<DealRecord>,
}

impl DealLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, record: DealRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    /// Removes the record at `index`, shifting later records down.
    pub fn remove(&mut self, index: usize) -> Option<DealRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DealRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DealRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[DealRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DealRecord> for DealLedger {
    fn from_iter<I: IntoIterator<Item = DealRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
