//! Output artifacts and their relative path grammar.

use std::fmt;

use bytes::Bytes;
use serde_json::Value;

/// Top-level directory an exported entity lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Users,
    Organizations,
    Tickets,
    Attachments,
}

impl EntityKind {
    pub fn dir(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Organizations => "organizations",
            EntityKind::Tickets => "tickets",
            EntityKind::Attachments => "attachments",
        }
    }
}

/// Relative POSIX path of one artifact. Only the constructors below can build one, so every path follows `<kind>/<id>/<file>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    /// `<kind>/<id>/<file>` for a fixed file name such as `user.json`.
    pub fn entity_file(kind: EntityKind, id: &EntityId, file: &str) -> Self {
        Self(format!("{}/{}/{}", kind.dir(), id, file))
    }

    /// `<kind>/<id>/<stem>-NNN.json`, with a zero-padded 1-based page number.
    pub fn page_file(kind: EntityKind, id: &EntityId, stem: &str, page: u32) -> Self {
        Self(format!("{}/{}/{}-{:03}.json", kind.dir(), id, stem, page))
    }

    /// `attachments/<id>/files/<name>`, with the server-supplied name reduced to one safe component.
    pub fn attachment_file(id: &EntityId, file_name: &str) -> Self {
        Self(format!(
            "{}/{}/files/{}",
            EntityKind::Attachments.dir(),
            id,
            sanitize_file_name(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path components, for sinks that build native paths.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of exported data handed to the sink.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub path: ArtifactPath,
    pub bytes: Bytes,
}

impl Artifact {
    pub fn new(path: ArtifactPath, bytes: impl Into<Bytes>) -> Self {
        Self {
            path,
            bytes: bytes.into(),
        }
    }
}

/// Entity identifier as rendered into a path. The API returns numbers, but strings are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(String);

impl EntityId {
    /// Reads `record["id"]`; `None` for a missing, null or unusable id.
    pub fn from_record(record: &Value) -> Option<Self> {
        Self::from_value(record.get("id")?)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let raw = match value {
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.trim().to_string(),
            _ => return None,
        };
        if raw.is_empty() || raw.contains(['/', '\\']) || raw == "." || raw == ".." {
            return None;
        }
        Some(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactPath, EntityId, EntityKind};
    use serde_json::json;

    fn id(value: serde_json::Value) -> EntityId {
        EntityId::from_value(&value).unwrap()
    }

    #[test]
    fn page_files_are_zero_padded() {
        let path = ArtifactPath::page_file(EntityKind::Users, &id(json!(7)), "groups", 1);
        assert_eq!(path.as_str(), "users/7/groups-001.json");

        let path = ArtifactPath::page_file(EntityKind::Tickets, &id(json!(42)), "comments", 12);
        assert_eq!(path.as_str(), "tickets/42/comments-012.json");
    }

    #[test]
    fn entity_files_follow_kind_and_id() {
        let path = ArtifactPath::entity_file(EntityKind::Organizations, &id(json!("15")), "organization.json");
        assert_eq!(path.as_str(), "organizations/15/organization.json");
    }

    #[test]
    fn attachment_names_cannot_escape_their_directory() {
        let path = ArtifactPath::attachment_file(&id(json!(99)), "../../etc/passwd");
        assert_eq!(path.as_str(), "attachments/99/files/.._.._etc_passwd");
        assert_eq!(path.components().count(), 4);

        let path = ArtifactPath::attachment_file(&id(json!(99)), "..");
        assert_eq!(path.as_str(), "attachments/99/files/_");

        let path = ArtifactPath::attachment_file(&id(json!(99)), "a.txt");
        assert_eq!(path.as_str(), "attachments/99/files/a.txt");
    }

    #[test]
    fn unusable_ids_are_rejected() {
        assert!(EntityId::from_record(&json!({"id": null})).is_none());
        assert!(EntityId::from_record(&json!({"name": "x"})).is_none());
        assert!(EntityId::from_record(&json!({"id": "../1"})).is_none());
        assert_eq!(EntityId::from_record(&json!({"id": 7})).unwrap().as_str(), "7");
    }
}
