//! Account records with a unique e-mail lookup.
//!
//! Accounts are a global (not owner-scoped) kind. The e-mail index is a
//! plain string key under the `index` namespace — `SET index:email:{addr}
//! → id` — because an address maps to at most one account. Addresses are
//! normalized to lowercase before they touch a key.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_repository::{
    fields, generate_id, DecodeError, EntityCodec, EntityRepository, IndexHooks, RepoResult,
    Repository,
};
use daybook_store::{KeyBuilder, KeySpace, Pipeline, Store};

/// One registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a new account.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub profile_image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AccountDraft {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            display_name: display_name.into(),
            profile_image: None,
            created_at: None,
        }
    }
}

/// Partial update of an account.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub profile_image: Option<String>,
    pub is_active: Option<bool>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Codec for the `account` kind.
pub struct AccountCodec;

impl EntityCodec for AccountCodec {
    type Entity = Account;
    type Draft = AccountDraft;
    type Patch = AccountPatch;

    const KIND: &'static str = "account";

    fn id(entity: &Account) -> &str {
        &entity.id
    }

    fn created_at(entity: &Account) -> DateTime<Utc> {
        entity.created_at
    }

    fn encode(entity: &Account) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), entity.id.clone()),
            ("email".to_string(), entity.email.clone()),
            ("password_hash".to_string(), entity.password_hash.clone()),
            ("display_name".to_string(), entity.display_name.clone()),
            (
                "profile_image".to_string(),
                entity.profile_image.clone().unwrap_or_default(),
            ),
            ("is_active".to_string(), fields::encode_bool(entity.is_active)),
            ("created_at".to_string(), fields::encode_date(entity.created_at)),
            ("updated_at".to_string(), fields::encode_date(entity.updated_at)),
        ])
    }

    fn decode(record: &HashMap<String, String>) -> Result<Account, DecodeError> {
        let created_at = fields::decode_date(record, "created_at")?;
        Ok(Account {
            id: fields::require_str(record, "id")?,
            email: fields::require_str(record, "email")?,
            password_hash: fields::opt_str(record, "password_hash").unwrap_or_default(),
            display_name: fields::opt_str(record, "display_name").unwrap_or_default(),
            profile_image: fields::opt_str(record, "profile_image"),
            is_active: fields::decode_bool(record, "is_active"),
            created_at,
            updated_at: fields::decode_date(record, "updated_at").unwrap_or(created_at),
        })
    }

    fn from_draft(draft: AccountDraft) -> Account {
        let created_at = draft.created_at.unwrap_or_else(Utc::now);
        Account {
            id: generate_id(),
            email: normalize_email(&draft.email),
            password_hash: draft.password_hash,
            display_name: draft.display_name,
            profile_image: draft.profile_image,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    fn apply_patch(existing: &Account, patch: AccountPatch) -> Account {
        Account {
            id: existing.id.clone(),
            email: patch
                .email
                .map(|e| normalize_email(&e))
                .unwrap_or_else(|| existing.email.clone()),
            password_hash: patch
                .password_hash
                .unwrap_or_else(|| existing.password_hash.clone()),
            display_name: patch
                .display_name
                .unwrap_or_else(|| existing.display_name.clone()),
            profile_image: patch.profile_image.or_else(|| existing.profile_image.clone()),
            is_active: patch.is_active.unwrap_or(existing.is_active),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Unique e-mail index maintenance.
pub struct AccountIndexes;

impl IndexHooks<Account> for AccountIndexes {
    fn update_indexes(
        &self,
        batch: &mut Pipeline,
        keys: &KeySpace,
        new: &Account,
        old: Option<&Account>,
    ) {
        if let Some(old) = old {
            if old.email != new.email {
                batch.del(keys.index("email", &old.email));
            }
        }
        batch.set(keys.index("email", &new.email), &new.id);
    }

    fn remove_from_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, entity: &Account) {
        batch.del(keys.index("email", &entity.email));
    }
}

/// The account repository: the generic repository wired with
/// [`AccountIndexes`].
pub type AccountRepository<S> = EntityRepository<AccountCodec, S>;

/// Builds the account repository over the given store.
#[must_use]
pub fn account_repository<S: Store>(store: Arc<S>, keys: &KeyBuilder) -> AccountRepository<S> {
    EntityRepository::with_hooks(store, keys, Arc::new(AccountIndexes))
}

/// E-mail lookups backed by the unique index.
#[async_trait]
pub trait AccountQueries {
    /// Finds the account registered under an address, case-insensitively.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>>;

    /// Whether an address is already taken.
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;
}

#[async_trait]
impl<S: Store> AccountQueries for AccountRepository<S> {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let key = self.keys().index("email", &normalize_email(email));
        match self.store().get(&key).await? {
            Some(id) => self.find_by_id(&id).await,
            None => Ok(None),
        }
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let key = self.keys().index("email", &normalize_email(email));
        Ok(self.store().exists(&key).await?)
    }
}
