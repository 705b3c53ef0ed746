//! Destination for exported artifacts.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::artifact::{Artifact, ArtifactPath};
use crate::error::{HelpdeskError, Result};

/// Accepts exported artifacts. Implementations are shared by every concurrent worker, so writes must be safe to issue in parallel and must not block indefinitely.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn write(&self, artifact: Artifact) -> Result<()>;
}

#[async_trait]
impl<S> ArtifactSink for std::sync::Arc<S>
where
    S: ArtifactSink + ?Sized,
{
    async fn write(&self, artifact: Artifact) -> Result<()> {
        (**self).write(artifact).await
    }
}

/// Adapts a plain `(path, bytes)` callback into a sink.
pub struct FnSink<F> {
    callback: F,
}

impl<F> FnSink<F>
where
    F: Fn(&ArtifactPath, &Bytes) -> Result<()> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> ArtifactSink for FnSink<F>
where
    F: Fn(&ArtifactPath, &Bytes) -> Result<()> + Send + Sync,
{
    async fn write(&self, artifact: Artifact) -> Result<()> {
        (self.callback)(&artifact.path, &artifact.bytes)
    }
}

/// Keeps every artifact in memory, keyed by path. A rewrite of an existing path replaces it and is counted.
#[derive(Default)]
pub struct MemorySink {
    artifacts: Mutex<BTreeMap<String, Bytes>>,
    overwrites: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted list of written paths.
    pub fn paths(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .map(|artifacts| artifacts.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.artifacts
            .lock()
            .ok()
            .and_then(|artifacts| artifacts.get(path).cloned())
    }

    /// Number of writes that replaced an already written path.
    pub fn overwrites(&self) -> usize {
        self.overwrites.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn write(&self, artifact: Artifact) -> Result<()> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|err| HelpdeskError::Sink(err.to_string()))?;
        if artifacts
            .insert(artifact.path.as_str().to_string(), artifact.bytes)
            .is_some()
        {
            self.overwrites.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactSink, FnSink, MemorySink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::artifact::{Artifact, ArtifactPath, EntityId, EntityKind};
    use serde_json::json;

    #[tokio::test]
    async fn memory_sink_counts_rewritten_paths() {
        let sink = MemorySink::new();
        let id = EntityId::from_value(&json!(7)).unwrap();
        let path = ArtifactPath::entity_file(EntityKind::Users, &id, "user.json");

        sink.write(Artifact::new(path.clone(), b"{}".to_vec())).await.unwrap();
        sink.write(Artifact::new(path, b"{\"v\":2}".to_vec())).await.unwrap();

        assert_eq!(sink.paths(), vec!["users/7/user.json".to_string()]);
        assert_eq!(sink.overwrites(), 1);
        assert_eq!(&sink.get("users/7/user.json").unwrap()[..], br#"{"v":2}"#);
    }

    #[tokio::test]
    async fn callback_sink_sees_path_and_bytes() {
        let total = AtomicUsize::new(0);
        let sink = FnSink::new(|path, bytes| {
            assert_eq!(path.as_str(), "tickets/42/ticket.json");
            total.fetch_add(bytes.len(), Ordering::SeqCst);
            Ok(())
        });
        let id = EntityId::from_value(&json!(42)).unwrap();
        let path = ArtifactPath::entity_file(EntityKind::Tickets, &id, "ticket.json");

        sink.write(Artifact::new(path, b"abc".to_vec())).await.unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 3);
    }
}
