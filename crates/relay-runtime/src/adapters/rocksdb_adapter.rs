//! # RocksDB Storage Adapter
//!
//! Production RocksDB implementation of the transaction ledger's
//! `KeyValueStore` port.
//!
//! ## Features
//!
//! - Dedicated `tx_history` column family
//! - Snappy compression
//! - Bloom filters for point lookups
//! - Optional fsync on every write
//!
//! Each actor's history is one value under `tx_history:<actor>`, so a point
//! lookup reads a whole history and a prefix scan enumerates actors.

use lr_02_transaction_ledger::{KVStoreError, KeyValueStore};
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType, Direction,
    IteratorMode, Options, WriteOptions, DB,
};
use shared_types::{ActorId, HISTORY_KEY_PREFIX};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column family holding actor histories.
pub const CF_HISTORY: &str = "tx_history";

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: PathBuf,
    /// Block cache size in bytes (default: 32MB).
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 8MB).
    pub write_buffer_size: usize,
    /// Fsync after each write (default: true).
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/ledger-relay"),
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 8 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Small buffers, no fsync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(DBCompressionType::Snappy);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(DBCompressionType::Snappy);
        let cf = ColumnFamilyDescriptor::new(CF_HISTORY, cf_opts);

        let db = DB::open_cf_descriptors(&opts, &config.path, vec![cf]).map_err(|e| {
            KVStoreError::IOError {
                message: format!("Failed to open RocksDB: {}", e),
            }
        })?;
        info!(path = %config.path.display(), "Opened RocksDB ledger store");

        Ok(Self { db, config })
    }

    /// Open at `path` with default tuning.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Every key starting with `prefix`, with its value.
    pub fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let cf = self.cf()?;
        let mut results = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB scan failed: {}", e),
            })?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    /// Actors that have a stored history.
    pub fn actors(&self) -> Result<Vec<ActorId>, KVStoreError> {
        let prefix = format!("{}:", HISTORY_KEY_PREFIX);
        Ok(self
            .prefix_scan(prefix.as_bytes())?
            .into_iter()
            .filter_map(|(key, _)| {
                let key = String::from_utf8(key).ok()?;
                key.strip_prefix(&prefix).map(ActorId::new)
            })
            .collect())
    }

    fn cf(&self) -> Result<&ColumnFamily, KVStoreError> {
        self.db.cf_handle(CF_HISTORY).ok_or_else(|| KVStoreError::IOError {
            message: format!("missing column family {}", CF_HISTORY),
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db
            .get_cf(self.cf()?, key)
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB get failed: {}", e),
            })
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .put_cf_opt(self.cf()?, key, value, &self.write_opts())
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB put failed: {}", e),
            })
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .delete_cf_opt(self.cf()?, key, &self.write_opts())
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB delete failed: {}", e),
            })
    }
}
