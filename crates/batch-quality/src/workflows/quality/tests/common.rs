use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::ReportingConfig;
use crate::workflows::quality::domain::{AssessedBatch, BatchSnapshot};
use crate::workflows::quality::store::{RecordStore, RecordStoreError};
use crate::workflows::quality::{quality_router, BatchQualityService, QualityEngine};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn engine() -> QualityEngine {
    QualityEngine::new(today(), now())
}

/// `[temperature, humidity, ph_level, contaminant_level, purity]`
pub(super) type Readings = [f64; 5];

pub(super) const EXCELLENT: Readings = [22.0, 50.0, 7.0, 0.0005, 99.5];
pub(super) const GOOD: Readings = [28.0, 65.0, 7.0, 0.0005, 99.5];
pub(super) const POOR: Readings = [22.0, 50.0, 7.0, 0.5, 85.0];
pub(super) const FAILING: Readings = [40.0, 90.0, 5.0, 12.0, 70.0];
pub(super) const OVERHEATED: Readings = [36.0, 50.0, 7.0, 0.02, 99.5];

pub(super) fn snapshot(
    batch_number: &str,
    readings: Readings,
    expires_in: i64,
    disposition: &str,
    supplier: &str,
) -> BatchSnapshot {
    let [temperature, humidity, ph_level, contaminant_level, purity] = readings;
    BatchSnapshot {
        batch_number: batch_number.to_string(),
        name: Some(format!("Product {batch_number}")),
        quantity: Some(100),
        temperature: Some(temperature),
        humidity: Some(humidity),
        ph_level: Some(ph_level),
        contaminant_level: Some(contaminant_level),
        active_ingredient_purity: Some(purity),
        manufacture_date: Some(today() - Duration::days(30)),
        expiry_date: Some(today() + Duration::days(expires_in)),
        accepted_or_rejected: Some(disposition.to_string()),
        supplier: Some(supplier.to_string()),
        manufacturer: Some("Northwind Pharma".to_string()),
        category: Some("Antibiotic".to_string()),
        price: Some(12.5),
        inspected_by: Some("QA Bench 2".to_string()),
        created_at: None,
    }
}

/// Six batches spanning every grade band except C and all three lifecycle
/// states.
pub(super) fn fleet() -> Vec<BatchSnapshot> {
    vec![
        snapshot("AMX-100", EXCELLENT, 200, "Accepted", "MedSupply"),
        snapshot("AMX-200", GOOD, 20, "accepted", "MedSupply"),
        snapshot("PAR-300", POOR, 5, "Rejected", "PharmaCo"),
        snapshot("IBU-400", FAILING, 90, "REJECTED", "PharmaCo"),
        snapshot("VIT-500", OVERHEATED, 60, "Accepted", "Acme Labs"),
        snapshot("ASP-600", EXCELLENT, -3, "Accepted", "Acme Labs"),
    ]
}

pub(super) fn build_service() -> (BatchQualityService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = BatchQualityService::new(store.clone(), ReportingConfig::default())
        .with_reference(today(), now());
    (service, store)
}

pub(super) fn seeded_service() -> (BatchQualityService<MemoryStore>, Arc<MemoryStore>) {
    let (service, store) = build_service();
    for snapshot in fleet() {
        service.create(snapshot).expect("seed batch");
    }
    (service, store)
}

pub(super) fn service_with<S: RecordStore + 'static>(store: S) -> BatchQualityService<S> {
    BatchQualityService::new(Arc::new(store), ReportingConfig::default())
        .with_reference(today(), now())
}

pub(super) fn router_with_service(service: BatchQualityService<MemoryStore>) -> axum::Router {
    quality_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<BTreeMap<String, AssessedBatch>>>,
    pub(super) writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub(super) fn writes(&self) -> usize {
        *self.writes.lock().expect("store mutex poisoned")
    }

    fn count_write(&self) {
        *self.writes.lock().expect("store mutex poisoned") += 1;
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, batch: AssessedBatch) -> Result<AssessedBatch, RecordStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let key = batch.record.batch_number.clone();
        if guard.contains_key(&key) {
            return Err(RecordStoreError::Conflict(key));
        }
        guard.insert(key, batch.clone());
        drop(guard);
        self.count_write();
        Ok(batch)
    }

    fn update(&self, batch: AssessedBatch) -> Result<(), RecordStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(batch.record.batch_number.clone(), batch);
        drop(guard);
        self.count_write();
        Ok(())
    }

    fn fetch(&self, batch_number: &str) -> Result<Option<AssessedBatch>, RecordStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(batch_number).cloned())
    }

    fn delete(&self, batch_number: &str) -> Result<(), RecordStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard
            .remove(batch_number)
            .map(|_| ())
            .ok_or_else(|| RecordStoreError::NotFound(batch_number.to_string()))
    }

    fn scan(&self) -> Result<Vec<AssessedBatch>, RecordStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct ConflictStore;

impl RecordStore for ConflictStore {
    fn insert(&self, batch: AssessedBatch) -> Result<AssessedBatch, RecordStoreError> {
        Err(RecordStoreError::Conflict(batch.record.batch_number))
    }

    fn update(&self, _batch: AssessedBatch) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _batch_number: &str) -> Result<Option<AssessedBatch>, RecordStoreError> {
        Ok(None)
    }

    fn delete(&self, batch_number: &str) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::NotFound(batch_number.to_string()))
    }

    fn scan(&self) -> Result<Vec<AssessedBatch>, RecordStoreError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn insert(&self, _batch: AssessedBatch) -> Result<AssessedBatch, RecordStoreError> {
        Err(RecordStoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _batch: AssessedBatch) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _batch_number: &str) -> Result<Option<AssessedBatch>, RecordStoreError> {
        Err(RecordStoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _batch_number: &str) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::Unavailable("database offline".to_string()))
    }

    fn scan(&self) -> Result<Vec<AssessedBatch>, RecordStoreError> {
        Err(RecordStoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
