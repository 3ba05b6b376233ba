use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// Cache persisted in a fjall partition, values stored as JSON.
///
/// Read and write failures are logged and treated as a miss.
pub struct DiskCache<K, V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(partition, PartitionCreateOptions::default())?;
        Ok(Self {
            keyspace,
            partition,
            _marker: PhantomData,
        })
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        match self.partition.get(serde_json::to_vec(key)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &K, value: &V) -> Result<()> {
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(value)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
            Err(e) => {
                debug!("DiskCache get error for key {:?}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: K, value: V) {
        match self.write(&key, &value) {
            Ok(()) => debug!("Cache SET for key: {:?}", key),
            Err(e) => debug!("DiskCache set error for key {:?}: {}", key, e),
        }
    }
}
