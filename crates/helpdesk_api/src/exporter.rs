//! Full-domain export: users, then organizations, then tickets with their comments and attachments.
//!
//! Pages of a collection are read one at a time; the records of each page are fanned out
//! through a [`WorkGroup`]. Everything discovered is handed to the [`ArtifactSink`] as soon
//! as it is fetched, so memory use is bounded by one page per worker.

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::artifact::{Artifact, ArtifactPath, EntityId, EntityKind};
use crate::client::HelpdeskClient;
use crate::endpoint::Endpoint;
use crate::error::{HelpdeskError, Result};
use crate::models::{AttachmentMetadata, Comment};
use crate::sink::ArtifactSink;
use crate::workgroup::WorkGroup;

/// Describes one top-level pass over a collection endpoint.
struct Collection {
    kind: EntityKind,
    list_path: &'static str,
    list_query: &'static [(&'static str, &'static str)],
    records_key: &'static str,
    label: &'static str,
    detail_file: &'static str,
    sub_collection: &'static str,
}

const USERS: Collection = Collection {
    kind: EntityKind::Users,
    list_path: "users.json",
    list_query: &[],
    records_key: "users",
    label: "user",
    detail_file: "user.json",
    sub_collection: "groups",
};

const ORGANIZATIONS: Collection = Collection {
    kind: EntityKind::Organizations,
    list_path: "organizations.json",
    list_query: &[],
    records_key: "organizations",
    label: "organization",
    detail_file: "organization.json",
    sub_collection: "users",
};

// Incremental export from the epoch, i.e. the full ticket history.
const TICKETS: Collection = Collection {
    kind: EntityKind::Tickets,
    list_path: "incremental/tickets.json",
    list_query: &[("start_time", "0")],
    records_key: "tickets",
    label: "ticket",
    detail_file: "ticket.json",
    sub_collection: "comments",
};

/// Counters reported once a run finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub artifacts: usize,
    pub users: usize,
    pub organizations: usize,
    pub tickets: usize,
    pub attachments: usize,
    pub skipped_entities: usize,
    pub skipped_files: usize,
}

#[derive(Default)]
struct Counters {
    artifacts: AtomicUsize,
    users: AtomicUsize,
    organizations: AtomicUsize,
    tickets: AtomicUsize,
    attachments: AtomicUsize,
    skipped_entities: AtomicUsize,
    skipped_files: AtomicUsize,
}

impl Counters {
    fn entity(&self, kind: EntityKind) -> &AtomicUsize {
        match kind {
            EntityKind::Users => &self.users,
            EntityKind::Organizations => &self.organizations,
            EntityKind::Tickets => &self.tickets,
            EntityKind::Attachments => &self.attachments,
        }
    }

    fn snapshot(&self) -> ExportSummary {
        ExportSummary {
            artifacts: self.artifacts.load(Ordering::Relaxed),
            users: self.users.load(Ordering::Relaxed),
            organizations: self.organizations.load(Ordering::Relaxed),
            tickets: self.tickets.load(Ordering::Relaxed),
            attachments: self.attachments.load(Ordering::Relaxed),
            skipped_entities: self.skipped_entities.load(Ordering::Relaxed),
            skipped_files: self.skipped_files.load(Ordering::Relaxed),
        }
    }
}

pub struct Exporter<S> {
    client: HelpdeskClient,
    sink: S,
    group: WorkGroup,
    counters: Counters,
}

impl<S> Exporter<S>
where
    S: ArtifactSink,
{
    pub fn new(client: HelpdeskClient, sink: S) -> Self {
        let group = WorkGroup::new(client.config().concurrency);
        Self {
            client,
            sink,
            group,
            counters: Counters::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the three passes in order. Only not-found entities and attachment files are skipped; any other failure aborts the run.
    pub async fn run(&self) -> Result<ExportSummary> {
        info!(domain = %self.client.config().domain, "pulling users");
        self.export_users().await?;
        info!("pulling organizations");
        self.export_organizations().await?;
        info!("pulling tickets");
        self.export_tickets().await?;

        let summary = self.counters.snapshot();
        info!(
            artifacts = summary.artifacts,
            skipped_entities = summary.skipped_entities,
            skipped_files = summary.skipped_files,
            "export finished"
        );
        Ok(summary)
    }

    pub async fn export_users(&self) -> Result<()> {
        self.export_collection(&USERS).await
    }

    pub async fn export_organizations(&self) -> Result<()> {
        self.export_collection(&ORGANIZATIONS).await
    }

    pub async fn export_tickets(&self) -> Result<()> {
        self.export_collection(&TICKETS).await
    }

    async fn export_collection(&self, collection: &Collection) -> Result<()> {
        let start = self
            .client
            .config()
            .endpoint(collection.list_path, collection.list_query)?;
        let mut pages = self.client.pages(start);
        let mut records = 0usize;
        while let Some(page) = pages.next_page().await? {
            let items = page.records(collection.records_key);
            debug!(
                kind = collection.kind.dir(),
                page = page.number,
                count = items.len(),
                "dispatching page"
            );
            records += items.len();
            self.group
                .run(items, |record| self.export_entity(collection, record))
                .await?;
        }
        info!(
            kind = collection.kind.dir(),
            pages = pages.pages_read(),
            records,
            exported = self.counters.entity(collection.kind).load(Ordering::Relaxed),
            "pass complete"
        );
        Ok(())
    }

    /// Per-item action: a not-found anywhere in one entity's export skips that entity only.
    async fn export_entity(&self, collection: &Collection, record: &Value) -> Result<()> {
        let Some(id) = EntityId::from_record(record) else {
            warn!(kind = collection.kind.dir(), %record, "record without a usable id, skipping");
            self.counters.skipped_entities.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };

        match self.export_entity_tree(collection, &id).await {
            Ok(()) => {
                self.counters.entity(collection.kind).fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(id = %id, error = %err, "could not find {} {}", collection.label, id);
                self.counters.skipped_entities.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn export_entity_tree(&self, collection: &Collection, id: &EntityId) -> Result<()> {
        let detail = self.entity_endpoint(collection, id, None)?;
        let body = self.client.fetch(&detail).await?;
        self.emit(
            ArtifactPath::entity_file(collection.kind, id, collection.detail_file),
            body,
        )
        .await?;

        let sub_pages = self.entity_endpoint(collection, id, Some(collection.sub_collection))?;
        let mut pages = self.client.pages(sub_pages);
        while let Some(page) = pages.next_page().await? {
            let path = ArtifactPath::page_file(collection.kind, id, collection.sub_collection, page.number);
            self.emit(path, page.to_bytes()?).await?;

            if collection.kind == EntityKind::Tickets {
                for raw in page.records("comments") {
                    let comment = Comment::from_value(raw)?;
                    for attachment in comment.attachments() {
                        self.export_attachment(attachment).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Emits the metadata first; a missing binary is logged and skipped without undoing it.
    async fn export_attachment(&self, raw: &Value) -> Result<()> {
        let metadata = AttachmentMetadata::from_value(raw)?;
        let id = EntityId::from_value(&metadata.id).ok_or_else(|| {
            HelpdeskError::Serialization(format!("attachment without a usable id: {raw}"))
        })?;

        self.emit(
            ArtifactPath::entity_file(EntityKind::Attachments, &id, "attachment.json"),
            serde_json::to_vec(raw)?,
        )
        .await?;
        self.counters.attachments.fetch_add(1, Ordering::Relaxed);

        let path = ArtifactPath::attachment_file(&id, &metadata.file_name);
        let content = Endpoint::parse(&metadata.content_url)?;
        debug!(
            %path,
            size = ?metadata.size,
            content_type = metadata.content_type.as_deref().unwrap_or("unknown"),
            "getting attachment file"
        );
        match self.client.fetch_attachment(&content).await {
            Ok(bytes) => self.emit(path, bytes).await,
            Err(err) if err.is_not_found() => {
                warn!(attachment = %id, file = %metadata.file_name, error = %err, "could not find attachment file");
                self.counters.skipped_files.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn entity_endpoint(&self, collection: &Collection, id: &EntityId, sub: Option<&str>) -> Result<Endpoint> {
        let path = match sub {
            Some(sub) => format!("{}/{}/{}.json", collection.kind.dir(), id, sub),
            None => format!("{}/{}.json", collection.kind.dir(), id),
        };
        self.client.endpoint(&path)
    }

    async fn emit(&self, path: ArtifactPath, bytes: impl Into<Bytes>) -> Result<()> {
        debug!(%path, "writing artifact");
        self.sink.write(Artifact::new(path, bytes)).await?;
        self.counters.artifacts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
