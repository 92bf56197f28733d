//! Defect sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{DefectFilter, DefectRecord};
use crate::error::{Error, Result};

/// Append-only store for defect records.
///
/// Appends from concurrent putaways are independent; no ordering across
/// calls is required.
pub trait DefectSink: Send + Sync {
    /// Stores a record.
    fn append(&self, record: DefectRecord) -> Result<()>;

    /// Records passing `filter`, in append order.
    fn query(&self, filter: &DefectFilter) -> Result<Vec<DefectRecord>>;
}

impl<T: DefectSink + ?Sized> DefectSink for Arc<T> {
    fn append(&self, record: DefectRecord) -> Result<()> {
        (**self).append(record)
    }

    fn query(&self, filter: &DefectFilter) -> Result<Vec<DefectRecord>> {
        (**self).query(filter)
    }
}

impl<T: DefectSink + ?Sized> DefectSink for &T {
    fn append(&self, record: DefectRecord) -> Result<()> {
        (**self).append(record)
    }

    fn query(&self, filter: &DefectFilter) -> Result<Vec<DefectRecord>> {
        (**self).query(filter)
    }
}

/// Sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDefectSink;

impl DefectSink for NullDefectSink {
    fn append(&self, _record: DefectRecord) -> Result<()> {
        Ok(())
    }

    fn query(&self, _filter: &DefectFilter) -> Result<Vec<DefectRecord>> {
        Ok(Vec::new())
    }
}

/// In-process defect log. Rejects a record whose ID is already logged.
#[derive(Debug, Default)]
pub struct InMemoryDefectLog {
    records: Mutex<Vec<DefectRecord>>,
}

impl InMemoryDefectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of every record.
    pub fn records(&self) -> Vec<DefectRecord> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DefectSink for InMemoryDefectLog {
    fn append(&self, record: DefectRecord) -> Result<()> {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.defect_id == record.defect_id) {
            return Err(Error::DefectSink(format!(
                "defect {} already logged",
                record.defect_id
            )));
        }
        records.push(record);
        Ok(())
    }

    fn query(&self, filter: &DefectFilter) -> Result<Vec<DefectRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defects::{DefectType, FailurePoint};
    use crate::models::TransactionType;
    use std::thread;

    fn record(product: &str) -> DefectRecord {
        DefectRecord::zero_locations(product, TransactionType::InboundPo, FailurePoint::Phase1, vec![])
    }

    #[test]
    fn test_append_and_query() {
        let log = InMemoryDefectLog::new();
        log.append(record("A")).unwrap();
        log.append(record("B")).unwrap();
        assert_eq!(log.len(), 2);

        let hits = log.query(&DefectFilter::all().for_product("B")).unwrap();
        assert_eq!(hits.len(), 1);
        let all = log.query(&DefectFilter::all().of_type(DefectType::ZeroLocations)).unwrap();
        assert_eq!(all[0].product_id, "A");

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let log = InMemoryDefectLog::new();
        let first = record("A");
        log.append(first.clone()).unwrap();
        let err = log.append(first).unwrap_err();
        assert!(matches!(err, Error::DefectSink(_)));
        assert!(err.to_string().contains("already logged"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let log = Arc::new(InMemoryDefectLog::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for j in 0..25 {
                        log.append(record(&format!("P{i}-{j}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 100);
    }

    #[test]
    fn test_null_sink() {
        let sink = NullDefectSink;
        sink.append(record("A")).unwrap();
        assert!(sink.query(&DefectFilter::all()).unwrap().is_empty());
    }
}
