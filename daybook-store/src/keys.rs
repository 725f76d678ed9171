//! Key construction for the Daybook namespace.
//!
//! Every key the repositories touch is built here, following a fixed
//! colon-delimited schema under a per-deployment prefix:
//!
//! - `{prefix}:{kind}:{id}` - entity hash record
//! - `{prefix}:{kind}:list` - global listing (sorted set)
//! - `{prefix}:{kind}:user:{owner}` - per-owner listing (sorted set)
//! - `{prefix}:{kind}:index:{field}:{value}` - global secondary index
//! - `{prefix}:{kind}:user:{owner}:index:{field}:{value}` - owner-scoped index

/// Default key prefix for a deployment.
pub const DEFAULT_KEY_PREFIX: &str = "daybook";

/// Delimiter between key segments.
const DELIMITER: char = ':';

/// Builds namespaced keys from an entity kind plus qualifiers.
///
/// Deterministic: the same `(kind, qualifiers)` tuple always yields the
/// same key, and distinct tuples yield distinct keys.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
}

impl KeyBuilder {
    /// Creates a builder with the given deployment prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the deployment prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds `{prefix}:{kind}:{qual1}:{qual2}:...`.
    #[must_use]
    pub fn key(&self, kind: &str, qualifiers: &[&str]) -> String {
        let mut key = String::with_capacity(
            self.prefix.len()
                + kind.len()
                + qualifiers.iter().map(|q| q.len() + 1).sum::<usize>()
                + 1,
        );
        key.push_str(&self.prefix);
        key.push(DELIMITER);
        key.push_str(kind);
        for qualifier in qualifiers {
            key.push(DELIMITER);
            key.push_str(qualifier);
        }
        key
    }

    /// Binds this builder to one entity kind.
    #[must_use]
    pub fn namespace(&self, kind: &'static str) -> KeySpace {
        KeySpace {
            builder: self.clone(),
            kind,
        }
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

/// A [`KeyBuilder`] bound to a single entity kind.
///
/// Repositories hold one of these so key shapes are never assembled ad hoc.
#[derive(Debug, Clone)]
pub struct KeySpace {
    builder: KeyBuilder,
    kind: &'static str,
}

impl KeySpace {
    /// The entity kind this space covers (the `{kind}` key segment).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Key of one entity's hash record: `{prefix}:{kind}:{id}`.
    #[must_use]
    pub fn primary(&self, id: &str) -> String {
        self.builder.key(self.kind, &[id])
    }

    /// Key of the global listing sorted set: `{prefix}:{kind}:list`.
    #[must_use]
    pub fn list(&self) -> String {
        self.builder.key(self.kind, &["list"])
    }

    /// Key of one owner's listing sorted set: `{prefix}:{kind}:user:{owner}`.
    #[must_use]
    pub fn owner_list(&self, owner: &str) -> String {
        self.builder.key(self.kind, &["user", owner])
    }

    /// Key of a global secondary index: `{prefix}:{kind}:index:{field}:{value}`.
    #[must_use]
    pub fn index(&self, field: &str, value: &str) -> String {
        self.builder.key(self.kind, &["index", field, value])
    }

    /// Key of an owner-scoped secondary index:
    /// `{prefix}:{kind}:user:{owner}:index:{field}:{value}`.
    #[must_use]
    pub fn owner_index(&self, owner: &str, field: &str, value: &str) -> String {
        self.builder
            .key(self.kind, &["user", owner, "index", field, value])
    }
}
