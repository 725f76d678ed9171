//! Entity ↔ hash-record codecs.
//!
//! Every stored entity lives in the store as a flat map of string fields.
//! An [`EntityCodec`] is the per-kind strategy that maps a typed record to
//! and from that wire shape, plus the create/merge rules the generic
//! repositories drive:
//!
//! - `encode`/`decode` must satisfy the round-trip law
//!   `decode(encode(e)) == e` for every valid entity.
//! - `decode` tolerates missing optional fields by substituting defaults;
//!   it never sees an empty map (the repository treats that as "absent").
//! - `from_draft` generates an id when the draft carries none and defaults
//!   both timestamps; `apply_patch` merges partial fields over the current
//!   record, keeps `id`/`created_at` (and `owner_id`) immutable, and bumps
//!   `updated_at`.
//!
//! Field conventions: booleans as `"true"`/`"false"`, dates as RFC 3339,
//! nested structured fields as JSON text. The helpers in [`fields`] keep
//! those encodings uniform across codecs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A stored field the codec could not make sense of.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A field the record cannot exist without (id, timestamps).
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A required field whose stored value does not parse.
    #[error("invalid value in field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// A nested JSON field that does not parse.
    #[error("invalid JSON in field {field}: {source}")]
    Json {
        field: &'static str,
        source: serde_json::Error,
    },
}

/// Per-kind mapping between a typed entity and its hash record.
pub trait EntityCodec: Send + Sync + 'static {
    /// The stored record type.
    type Entity: Clone + Send + Sync + 'static;
    /// Input to `create`: the caller-supplied fields of a new record.
    type Draft: Send;
    /// Input to `update`: the partial fields to merge.
    type Patch: Send;

    /// Entity kind — the `{kind}` segment of every key.
    const KIND: &'static str;

    fn id(entity: &Self::Entity) -> &str;
    fn created_at(entity: &Self::Entity) -> DateTime<Utc>;

    /// Flattens the entity into its hash record.
    fn encode(entity: &Self::Entity) -> HashMap<String, String>;

    /// Rebuilds the entity from a non-empty hash record.
    fn decode(fields: &HashMap<String, String>) -> Result<Self::Entity, DecodeError>;

    /// Materializes a new entity from a draft (id and timestamps defaulted).
    fn from_draft(draft: Self::Draft) -> Self::Entity;

    /// Merges a patch over the current record, bumping `updated_at`.
    fn apply_patch(existing: &Self::Entity, patch: Self::Patch) -> Self::Entity;
}

/// An [`EntityCodec`] whose entities belong to one owner.
pub trait OwnedEntityCodec: EntityCodec {
    fn owner_id(entity: &Self::Entity) -> &str;
}

/// Generates a fresh entity id.
#[must_use]
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shared field encodings used by every codec.
pub mod fields {
    use super::DecodeError;
    use chrono::{DateTime, Utc};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::collections::HashMap;

    /// `true`/`false` literal.
    #[must_use]
    pub fn encode_bool(value: bool) -> String {
        value.to_string()
    }

    /// Reads a boolean field; anything but the literal `"true"` is `false`.
    #[must_use]
    pub fn decode_bool(record: &HashMap<String, String>, field: &str) -> bool {
        record.get(field).is_some_and(|v| v == "true")
    }

    /// RFC 3339 encoding.
    #[must_use]
    pub fn encode_date(value: DateTime<Utc>) -> String {
        value.to_rfc3339()
    }

    /// Reads a required date field.
    pub fn decode_date(
        record: &HashMap<String, String>,
        field: &'static str,
    ) -> Result<DateTime<Utc>, DecodeError> {
        let raw = record
            .get(field)
            .ok_or(DecodeError::MissingField(field))?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DecodeError::InvalidField {
                field,
                value: raw.clone(),
            })
    }

    /// Reads a required string field.
    pub fn require_str(
        record: &HashMap<String, String>,
        field: &'static str,
    ) -> Result<String, DecodeError> {
        record
            .get(field)
            .cloned()
            .ok_or(DecodeError::MissingField(field))
    }

    /// Reads an optional string field; absent and empty both mean `None`.
    #[must_use]
    pub fn opt_str(record: &HashMap<String, String>, field: &str) -> Option<String> {
        record.get(field).filter(|v| !v.is_empty()).cloned()
    }

    /// Encodes a nested structured field as JSON text.
    ///
    /// Serialization of plain data structures cannot fail; the JSON `null`
    /// literal is written if it ever does.
    #[must_use]
    pub fn encode_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
    }

    /// Reads a nested JSON field, substituting the default when absent.
    pub fn decode_json_or_default<T: DeserializeOwned + Default>(
        record: &HashMap<String, String>,
        field: &'static str,
    ) -> Result<T, DecodeError> {
        match record.get(field).filter(|v| !v.is_empty()) {
            None => Ok(T::default()),
            Some(raw) => {
                serde_json::from_str(raw).map_err(|source| DecodeError::Json { field, source })
            }
        }
    }
}
