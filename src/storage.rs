use crate::types::{HarvestError, Result, StoreConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Conversation,
    Insight,
}

/// Flat persistence seam: named JSON artifacts grouped by kind. Writing to
/// an existing name overwrites it.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn write(&self, kind: ArtifactKind, name: &str, value: &Value) -> Result<()>;
    async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Value>;
    async fn list(&self, kind: ArtifactKind) -> Result<Vec<String>>;
}

/// One directory per artifact kind, one pretty-printed JSON file per
/// artifact.
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Create the artifact directories up front so writes never race on
    /// directory creation.
    pub async fn ensure_directories(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.conversations_dir).await?;
        tokio::fs::create_dir_all(&self.config.insights_dir).await?;
        Ok(())
    }

    fn path_for(&self, kind: ArtifactKind, name: &str) -> PathBuf {
        let dir = match kind {
            ArtifactKind::Conversation => &self.config.conversations_dir,
            ArtifactKind::Insight => &self.config.insights_dir,
        };
        PathBuf::from(dir).join(name)
    }
}

#[async_trait]
impl ArtifactStore for JsonFileStore {
    async fn write(&self, kind: ArtifactKind, name: &str, value: &Value) -> Result<()> {
        let path = self.path_for(kind, name);
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        info!("Artifact saved: {}", path.display());
        Ok(())
    }

    async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Value> {
        let path = self.path_for(kind, name);
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn list(&self, kind: ArtifactKind) -> Result<Vec<String>> {
        let dir = self.path_for(kind, "");
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // A kind that was never written to lists as empty.
            Err(_) => return Ok(names),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        debug!("Listed {} artifacts of kind {:?}", names.len(), kind);
        Ok(names)
    }
}

/// In-memory store for tests and offline runs.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: RwLock<HashMap<(ArtifactKind, String), Value>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes always fail, for exercising persistence-failure
    /// paths.
    pub fn failing() -> Self {
        Self {
            artifacts: RwLock::new(HashMap::new()),
            fail_writes: true,
        }
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn write(&self, kind: ArtifactKind, name: &str, value: &Value) -> Result<()> {
        if self.fail_writes {
            return Err(HarvestError::General("write rejected".to_string()));
        }
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert((kind, name.to_string()), value.clone());
        Ok(())
    }

    async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Value> {
        let artifacts = self.artifacts.read().await;
        artifacts
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| HarvestError::General(format!("artifact not found: {}", name)))
    }

    async fn list(&self, kind: ArtifactKind) -> Result<Vec<String>> {
        let artifacts = self.artifacts.read().await;
        let mut names: Vec<String> = artifacts
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
