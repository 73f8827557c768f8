//! In-Memory Model Registry Implementation
//!
//! 每个 ModelKey 一个 OnceCell 槽位：并发首次使用时只有一个调用方执行加载，
//! 其余调用方等待同一结果。无淘汰，模型集合由已安装文件决定。

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::application::error::PipelineError;
use crate::application::ports::{
    ModelHandle, ModelLoadSpec, ModelRegistryPort, VoiceModelLoaderPort,
};
use crate::domain::speech::{ComputeDevice, ModelKey};

type Slot = Arc<OnceCell<Arc<ModelHandle>>>;

/// 内存模型注册表
pub struct InMemoryModelRegistry {
    loader: Arc<dyn VoiceModelLoaderPort>,
    device: ComputeDevice,
    /// ModelKey -> 加载槽位
    slots: DashMap<ModelKey, Slot>,
    load_count: AtomicU64,
}

impl InMemoryModelRegistry {
    pub fn new(loader: Arc<dyn VoiceModelLoaderPort>, device: ComputeDevice) -> Self {
        Self {
            loader,
            device,
            slots: DashMap::new(),
            load_count: AtomicU64::new(0),
        }
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    /// 实际执行过的加载次数
    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::Relaxed)
    }

    fn cached(&self, key: &ModelKey) -> Option<Arc<ModelHandle>> {
        self.slots.get(key).and_then(|slot| slot.get().cloned())
    }

    async fn load(&self, key: &ModelKey) -> Result<Arc<ModelHandle>, PipelineError> {
        let index_path = match key.index_path() {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => {
                tracing::warn!(
                    index = %path.display(),
                    "Index file not found, loading model without index"
                );
                None
            }
            None => None,
        };

        tracing::info!(
            model = %key.model_name(),
            index = ?index_path,
            device = %self.device,
            "Loading voice model"
        );

        let spec = ModelLoadSpec {
            model_path: key.model_path().to_path_buf(),
            index_path,
            device: self.device,
        };
        self.load_count.fetch_add(1, Ordering::Relaxed);

        let model = self.loader.load(&spec).await.map_err(|e| {
            tracing::error!(model = %key.model_name(), error = %e, "Failed to load voice model");
            PipelineError::ModelLoadFailed(e.to_string())
        })?;

        Ok(Arc::new(ModelHandle::new(
            key.clone(),
            self.device,
            spec.index_path.is_some(),
            model,
        )))
    }
}

#[async_trait]
impl ModelRegistryPort for InMemoryModelRegistry {
    async fn acquire(&self, key: &ModelKey) -> Result<Arc<ModelHandle>, PipelineError> {
        if let Some(handle) = self.cached(key) {
            tracing::debug!(model = %key.model_name(), "Using cached voice model");
            return Ok(handle);
        }

        if !key.model_path().is_file() {
            return Err(PipelineError::ModelNotFound(key.model_path().to_path_buf()));
        }

        // 克隆槽位后立即释放分片锁，不跨 await 持有
        let slot: Slot = self.slots.entry(key.clone()).or_default().clone();

        let result = slot.get_or_try_init(|| self.load(key)).await.cloned();
        if result.is_err() {
            // 失败的槽位不保留，后续请求可以重新尝试
            self.slots.remove_if(key, |_, s| !s.initialized());
        }
        result
    }

    fn is_cached(&self, key: &ModelKey) -> bool {
        self.cached(key).is_some()
    }

    fn cached_keys(&self) -> Vec<ModelKey> {
        self.slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FakeVoiceModelLoader;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn model_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bass.model"), b"weights").unwrap();
        std::fs::write(dir.path().join("bass.index"), b"index").unwrap();
        dir
    }

    fn key(dir: &Path, model: &str, index: Option<&str>) -> ModelKey {
        ModelKey::new(dir.join(model), index.map(|i| dir.join(i)))
    }

    #[tokio::test]
    async fn test_same_key_loads_once() {
        let dir = model_dir();
        let loader = Arc::new(FakeVoiceModelLoader::new());
        let registry = InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu);
        let key = key(dir.path(), "bass.model", Some("bass.index"));

        let first = registry.acquire(&key).await.unwrap();
        let second = registry.acquire(&key).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.load_count(), 1);
        assert_eq!(registry.load_count(), 1);
        assert!(first.index_applied());
        assert_eq!(first.device(), ComputeDevice::Cpu);
    }

    #[tokio::test]
    async fn test_index_presence_is_part_of_key() {
        let dir = model_dir();
        let loader = Arc::new(FakeVoiceModelLoader::new());
        let registry = InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu);

        let with_index = registry
            .acquire(&key(dir.path(), "bass.model", Some("bass.index")))
            .await
            .unwrap();
        let without_index = registry
            .acquire(&key(dir.path(), "bass.model", None))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&with_index, &without_index));
        assert_eq!(loader.load_count(), 2);
        assert_eq!(registry.cached_keys().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_model_is_not_cached() {
        let dir = model_dir();
        let loader = Arc::new(FakeVoiceModelLoader::new());
        let registry = InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu);
        let missing = key(dir.path(), "missing.model", None);

        let result = registry.acquire(&missing).await;
        assert!(matches!(result, Err(PipelineError::ModelNotFound(_))));
        assert!(!registry.is_cached(&missing));
        assert!(registry.cached_keys().is_empty());
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_index_degrades_gracefully() {
        let dir = model_dir();
        let registry =
            InMemoryModelRegistry::new(Arc::new(FakeVoiceModelLoader::new()), ComputeDevice::Cuda(0));
        let key = key(dir.path(), "bass.model", Some("absent.index"));

        let handle = registry.acquire(&key).await.unwrap();
        assert!(!handle.index_applied());
        assert_eq!(handle.key(), &key);
        assert!(registry.is_cached(&key));
    }

    #[tokio::test]
    async fn test_load_failure_is_wrapped_and_retryable() {
        let dir = model_dir();
        let loader = Arc::new(FakeVoiceModelLoader::new().failing_load("corrupt checkpoint"));
        let registry = InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu);
        let key = key(dir.path(), "bass.model", None);

        for _ in 0..2 {
            match registry.acquire(&key).await {
                Err(PipelineError::ModelLoadFailed(cause)) => {
                    assert!(cause.contains("corrupt checkpoint"))
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
        assert!(!registry.is_cached(&key));
        assert_eq!(loader.load_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_loads_once() {
        let dir = model_dir();
        let loader =
            Arc::new(FakeVoiceModelLoader::new().with_load_delay(Duration::from_millis(50)));
        let registry = Arc::new(InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu));
        let key = key(dir.path(), "bass.model", None);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let key = key.clone();
                tokio::spawn(async move { registry.acquire(&key).await.unwrap() })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        assert_eq!(loader.load_count(), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }
}
