use batch_quality::config::ReportingConfig;
use batch_quality::workflows::quality::{
    AssessedBatch, BatchQualityService, RecordStore, RecordStoreError,
};
use chrono::{Local, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store keyed by batch number, so scans come back in batch
/// number order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    records: Arc<Mutex<BTreeMap<String, AssessedBatch>>>,
}

impl InMemoryRecordStore {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, AssessedBatch>>, RecordStoreError> {
        self.records
            .lock()
            .map_err(|_| RecordStoreError::Unavailable("record store mutex poisoned".to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, batch: AssessedBatch) -> Result<AssessedBatch, RecordStoreError> {
        let mut guard = self.lock()?;
        let key = batch.record.batch_number.clone();
        if guard.contains_key(&key) {
            return Err(RecordStoreError::Conflict(key));
        }
        guard.insert(key, batch.clone());
        Ok(batch)
    }

    fn update(&self, batch: AssessedBatch) -> Result<(), RecordStoreError> {
        let mut guard = self.lock()?;
        let key = batch.record.batch_number.clone();
        if guard.contains_key(&key) {
            guard.insert(key, batch);
            Ok(())
        } else {
            Err(RecordStoreError::NotFound(key))
        }
    }

    fn fetch(&self, batch_number: &str) -> Result<Option<AssessedBatch>, RecordStoreError> {
        Ok(self.lock()?.get(batch_number).cloned())
    }

    fn delete(&self, batch_number: &str) -> Result<(), RecordStoreError> {
        self.lock()?
            .remove(batch_number)
            .map(|_| ())
            .ok_or_else(|| RecordStoreError::NotFound(batch_number.to_string()))
    }

    fn scan(&self) -> Result<Vec<AssessedBatch>, RecordStoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

/// Service over `store`, pinned to `today` when one is given and reading the
/// clock otherwise.
pub(crate) fn quality_service(
    store: Arc<InMemoryRecordStore>,
    reporting: ReportingConfig,
    today: Option<NaiveDate>,
) -> BatchQualityService<InMemoryRecordStore> {
    let service = BatchQualityService::new(store, reporting);
    match today {
        Some(today) => service.with_reference(today, Utc::now()),
        None => service,
    }
}

pub(crate) fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_quality::workflows::quality::{BatchSnapshot, QualityEngine};

    fn assessed(batch_number: &str) -> AssessedBatch {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date");
        QualityEngine::new(today, Utc::now()).assess(
            BatchSnapshot {
                batch_number: batch_number.to_string(),
                ..BatchSnapshot::default()
            }
            .into_record(),
        )
    }

    #[test]
    fn store_scans_in_batch_number_order() {
        let store = InMemoryRecordStore::default();
        for number in ["C-3", "A-1", "B-2"] {
            store.insert(assessed(number)).expect("insert");
        }

        let numbers: Vec<String> = store
            .scan()
            .expect("scan")
            .into_iter()
            .map(|batch| batch.record.batch_number)
            .collect();
        assert_eq!(numbers, vec!["A-1", "B-2", "C-3"]);
    }

    #[test]
    fn store_rejects_duplicates_and_unknown_updates() {
        let store = InMemoryRecordStore::default();
        store.insert(assessed("A-1")).expect("insert");

        assert!(matches!(
            store.insert(assessed("A-1")),
            Err(RecordStoreError::Conflict(_))
        ));
        assert!(matches!(
            store.update(assessed("Z-9")),
            Err(RecordStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("Z-9"),
            Err(RecordStoreError::NotFound(_))
        ));
    }

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert_eq!(
            parse_date(" 2025-10-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date"))
        );
        let error = parse_date("10/01/2025").expect_err("invalid format");
        assert!(error.contains("10/01/2025"));
    }
}
