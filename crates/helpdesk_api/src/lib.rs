//! Rate-limit aware fetch pipeline that exports a helpdesk REST API into a tree of artifacts.

pub mod artifact;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pages;
pub mod rate_limiter;
pub mod sink;
pub mod workgroup;

pub use artifact::{Artifact, ArtifactPath, EntityId, EntityKind};
pub use auth::Credentials;
pub use client::HelpdeskClient;
pub use config::HelpdeskConfig;
pub use endpoint::Endpoint;
pub use error::{HelpdeskError, Result};
pub use exporter::{ExportSummary, Exporter};
pub use models::{AttachmentMetadata, Comment};
pub use pages::{Page, PageIterator};
pub use sink::{ArtifactSink, FnSink, MemorySink};
pub use workgroup::WorkGroup;
