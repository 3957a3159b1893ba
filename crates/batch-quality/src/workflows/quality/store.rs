use super::domain::AssessedBatch;

/// Storage abstraction for batch records. Implementations persist whatever
/// they are handed: `insert` and `update` are plain writes that never call
/// back into the engine, so persisting derived fields cannot trigger another
/// derivation.
pub trait RecordStore: Send + Sync {
    fn insert(&self, batch: AssessedBatch) -> Result<AssessedBatch, RecordStoreError>;
    fn update(&self, batch: AssessedBatch) -> Result<(), RecordStoreError>;
    fn fetch(&self, batch_number: &str) -> Result<Option<AssessedBatch>, RecordStoreError>;
    fn delete(&self, batch_number: &str) -> Result<(), RecordStoreError>;
    /// Every stored record, in a stable order chosen by the store.
    fn scan(&self) -> Result<Vec<AssessedBatch>, RecordStoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("batch {0} already exists")]
    Conflict(String),
    #[error("batch {0} not found")]
    NotFound(String),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
