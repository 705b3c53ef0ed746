//! Directory-backed artifact sink.

use std::path::PathBuf;

use async_trait::async_trait;
use helpdesk_api::{Artifact, ArtifactSink, Result};
use tokio::fs;

/// Writes each artifact to `<root>/<artifact path>`, creating directories on demand. Existing files are overwritten.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target(&self, artifact: &Artifact) -> PathBuf {
        artifact
            .path
            .components()
            .fold(self.root.clone(), |path, component| path.join(component))
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn write(&self, artifact: Artifact) -> Result<()> {
        let target = self.target(&artifact);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &artifact.bytes).await?;
        Ok(())
    }
}
