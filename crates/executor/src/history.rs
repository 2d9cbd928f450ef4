//! Contains the append-only execution history store.
//!
//! Records are keyed by transaction hash and written by the worker when a
//! receipt lands. The store is optional: a worker without a data directory
//! simply keeps no history.

use crate::HistoryError;
use alloy_primitives::{Address, B256};
use rocksdb::{Options, DB};
use std::{collections::HashMap, path::PathBuf};

/// One executed workflow, as recorded at receipt time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExecutionRecord {
    /// The executed workflow.
    pub workflow_id: u64,
    /// The owner debited for the execution.
    pub owner: Address,
    /// The execution transaction hash.
    pub tx_hash: B256,
    /// True for receipt status 1.
    pub success: bool,
    /// The gas budget the job carried.
    pub gas_budget: u128,
    /// Unix seconds when the receipt was observed.
    pub executed_at: u64,
}

/// Describes the interface of the execution history store.
pub trait ExecutionHistory {
    /// Get the record for the given transaction hash.
    fn get(&self, tx_hash: B256) -> Result<Option<ExecutionRecord>, HistoryError>;

    /// Append a record. Hashes are unique, so overwrites do not occur in
    /// practice; last write wins if one does.
    fn put(&mut self, record: &ExecutionRecord) -> Result<(), HistoryError>;
}

/// An [ExecutionHistory] that stores records on disk using [rocksdb].
#[derive(Debug)]
pub struct DiskHistoryStore {
    db: DB,
}

impl DiskHistoryStore {
    /// Opens (or creates) the store in the given data directory.
    pub fn open(data_directory: PathBuf) -> Result<Self, HistoryError> {
        let db = DB::open(&Self::db_options(), data_directory.as_path())
            .map_err(|e| HistoryError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    /// Gets the [Options] for the underlying RocksDB instance.
    fn db_options() -> Options {
        let mut options = Options::default();
        options.set_compression_type(rocksdb::DBCompressionType::Snappy);
        options.create_if_missing(true);
        options
    }
}

impl ExecutionHistory for DiskHistoryStore {
    fn get(&self, tx_hash: B256) -> Result<Option<ExecutionRecord>, HistoryError> {
        let raw = self.db.get(tx_hash).map_err(|e| HistoryError::Database(e.to_string()))?;
        raw.map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|e| HistoryError::Codec(e.to_string()))
        })
        .transpose()
    }

    fn put(&mut self, record: &ExecutionRecord) -> Result<(), HistoryError> {
        let encoded =
            serde_json::to_vec(record).map_err(|e| HistoryError::Codec(e.to_string()))?;
        self.db
            .put(record.tx_hash, encoded)
            .map_err(|e| HistoryError::Database(e.to_string()))
    }
}

/// An [ExecutionHistory] that stores records in memory. Used in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    records: HashMap<B256, ExecutionRecord>,
}

impl MemoryHistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ExecutionHistory for MemoryHistoryStore {
    fn get(&self, tx_hash: B256) -> Result<Option<ExecutionRecord>, HistoryError> {
        Ok(self.records.get(&tx_hash).cloned())
    }

    fn put(&mut self, record: &ExecutionRecord) -> Result<(), HistoryError> {
        self.records.insert(record.tx_hash, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(byte: u8) -> ExecutionRecord {
        ExecutionRecord {
            workflow_id: 7,
            owner: Address::repeat_byte(0xAA),
            tx_hash: B256::repeat_byte(byte),
            success: true,
            gas_budget: 10u128.pow(17),
            executed_at: 1_700_000_500,
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryHistoryStore::new();
        let record = record(0x01);
        store.put(&record).unwrap();
        assert_eq!(store.get(record.tx_hash).unwrap(), Some(record));
        assert_eq!(store.get(B256::repeat_byte(0x02)).unwrap(), None);
    }

    #[test]
    fn test_records_serialize_stably() {
        let record = record(0x03);
        let encoded = serde_json::to_vec(&record).unwrap();
        let decoded: ExecutionRecord = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
