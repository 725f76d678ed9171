//! Todo records and their owner-scoped indexes.
//!
//! A todo belongs to one owner and is indexed three ways within that owner:
//! by category, by completion flag, and by due date (one scored set, due
//! time in epoch seconds, for calendar range queries). Category and
//! completion entries move when the field changes; the due index is
//! rescored on every write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_repository::{
    fields, generate_id, DecodeError, EntityCodec, IndexHooks, OwnedEntityCodec,
    OwnerEntityRepository, OwnerIndexHooks, RepoResult, Repository,
};
use daybook_store::{KeyBuilder, KeySpace, Pipeline, Store};

/// Importance of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parses a stored value, falling back to the default.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

/// Whether a todo renders as a calendar event or a floating task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoKind {
    #[default]
    Event,
    Task,
}

impl TodoKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TodoKind::Event => "event",
            TodoKind::Task => "task",
        }
    }

    /// Parses a stored value, falling back to the default.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "task" => TodoKind::Task,
            _ => TodoKind::Event,
        }
    }
}

/// Category a todo falls back to when the draft names none.
pub const DEFAULT_CATEGORY: &str = "personal";

/// One todo entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub category_id: String,
    pub kind: TodoKind,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a new todo.
#[derive(Debug, Clone)]
pub struct TodoDraft {
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category_id: Option<String>,
    pub kind: Option<TodoKind>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TodoDraft {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            description: None,
            priority: None,
            category_id: None,
            kind: None,
            due_date: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partial update of a todo.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category_id: Option<String>,
    pub kind: Option<TodoKind>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Codec for the `todo` kind.
pub struct TodoCodec;

impl EntityCodec for TodoCodec {
    type Entity = Todo;
    type Draft = TodoDraft;
    type Patch = TodoPatch;

    const KIND: &'static str = "todo";

    fn id(entity: &Todo) -> &str {
        &entity.id
    }

    fn created_at(entity: &Todo) -> DateTime<Utc> {
        entity.created_at
    }

    fn encode(entity: &Todo) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), entity.id.clone()),
            ("owner_id".to_string(), entity.owner_id.clone()),
            ("title".to_string(), entity.title.clone()),
            (
                "description".to_string(),
                entity.description.clone().unwrap_or_default(),
            ),
            ("completed".to_string(), fields::encode_bool(entity.completed)),
            ("priority".to_string(), entity.priority.as_str().to_string()),
            ("category_id".to_string(), entity.category_id.clone()),
            ("kind".to_string(), entity.kind.as_str().to_string()),
            ("due_date".to_string(), fields::encode_date(entity.due_date)),
            ("created_at".to_string(), fields::encode_date(entity.created_at)),
            ("updated_at".to_string(), fields::encode_date(entity.updated_at)),
        ])
    }

    fn decode(record: &HashMap<String, String>) -> Result<Todo, DecodeError> {
        let created_at = fields::decode_date(record, "created_at")?;
        Ok(Todo {
            id: fields::require_str(record, "id")?,
            owner_id: fields::require_str(record, "owner_id")?,
            title: fields::opt_str(record, "title").unwrap_or_default(),
            description: fields::opt_str(record, "description"),
            completed: fields::decode_bool(record, "completed"),
            priority: Priority::parse(record.get("priority").map_or("", String::as_str)),
            category_id: fields::opt_str(record, "category_id")
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            kind: TodoKind::parse(record.get("kind").map_or("", String::as_str)),
            due_date: fields::decode_date(record, "due_date")?,
            created_at,
            updated_at: fields::decode_date(record, "updated_at").unwrap_or(created_at),
        })
    }

    fn from_draft(draft: TodoDraft) -> Todo {
        let now = Utc::now();
        let created_at = draft.created_at.unwrap_or(now);
        Todo {
            id: generate_id(),
            owner_id: draft.owner_id,
            title: draft.title,
            description: draft.description,
            completed: false,
            priority: draft.priority.unwrap_or_default(),
            category_id: draft
                .category_id
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            kind: draft.kind.unwrap_or_default(),
            due_date: draft.due_date.unwrap_or(now),
            created_at,
            updated_at: created_at,
        }
    }

    fn apply_patch(existing: &Todo, patch: TodoPatch) -> Todo {
        Todo {
            id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            title: patch.title.unwrap_or_else(|| existing.title.clone()),
            description: patch.description.or_else(|| existing.description.clone()),
            completed: patch.completed.unwrap_or(existing.completed),
            priority: patch.priority.unwrap_or(existing.priority),
            category_id: patch
                .category_id
                .unwrap_or_else(|| existing.category_id.clone()),
            kind: patch.kind.unwrap_or(existing.kind),
            due_date: patch.due_date.unwrap_or(existing.due_date),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}

impl OwnedEntityCodec for TodoCodec {
    fn owner_id(entity: &Todo) -> &str {
        &entity.owner_id
    }
}

fn list_score(todo: &Todo) -> f64 {
    todo.created_at.timestamp_millis() as f64
}

/// Due-date index score: epoch seconds, matching calendar-range queries.
fn due_score(todo: &Todo) -> f64 {
    todo.due_date.timestamp() as f64
}

/// Owner-scoped index maintenance for todos.
pub struct TodoIndexes;

impl IndexHooks<Todo> for TodoIndexes {}

impl OwnerIndexHooks<Todo> for TodoIndexes {
    fn update_owner_indexes(
        &self,
        batch: &mut Pipeline,
        keys: &KeySpace,
        new: &Todo,
        old: Option<&Todo>,
    ) {
        let owner = &new.owner_id;
        if let Some(old) = old {
            if old.category_id != new.category_id {
                batch.zrem(keys.owner_index(owner, "category", &old.category_id), &new.id);
            }
            if old.completed != new.completed {
                batch.zrem(
                    keys.owner_index(owner, "completed", &old.completed.to_string()),
                    &new.id,
                );
            }
        }
        batch.zadd(
            keys.owner_index(owner, "category", &new.category_id),
            list_score(new),
            &new.id,
        );
        batch.zadd(
            keys.owner_index(owner, "completed", &new.completed.to_string()),
            list_score(new),
            &new.id,
        );
        // ZADD rescores an existing member, so a due-date change needs no
        // matching removal.
        batch.zadd(
            keys.owner_index(owner, "duedate", "all"),
            due_score(new),
            &new.id,
        );
    }

    fn remove_owner_entity_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, entity: &Todo) {
        let owner = &entity.owner_id;
        batch.zrem(
            keys.owner_index(owner, "category", &entity.category_id),
            &entity.id,
        );
        batch.zrem(
            keys.owner_index(owner, "completed", &entity.completed.to_string()),
            &entity.id,
        );
        batch.zrem(keys.owner_index(owner, "duedate", "all"), &entity.id);
    }

    fn remove_owner_indexes(&self, batch: &mut Pipeline, keys: &KeySpace, owner: &str) {
        // Fixed-value buckets can be dropped whole; the category buckets are
        // value-keyed and are cleaned per entity instead.
        batch.del(keys.owner_index(owner, "completed", "true"));
        batch.del(keys.owner_index(owner, "completed", "false"));
        batch.del(keys.owner_index(owner, "duedate", "all"));
    }
}

/// The todo repository: the owner-scoped generic repository wired with
/// [`TodoIndexes`].
pub type TodoRepository<S> = OwnerEntityRepository<TodoCodec, S>;

/// Builds the todo repository over the given store.
#[must_use]
pub fn todo_repository<S: Store>(store: Arc<S>, keys: &KeyBuilder) -> TodoRepository<S> {
    OwnerEntityRepository::with_hooks(store, keys, Arc::new(TodoIndexes))
}

/// Index-backed queries specific to todos.
#[async_trait]
pub trait TodoQueries {
    /// One owner's todos in a category, oldest first.
    async fn find_by_owner_and_category(
        &self,
        owner: &str,
        category_id: &str,
    ) -> RepoResult<Vec<Todo>>;

    /// One owner's todos by completion flag, oldest first.
    async fn find_by_owner_and_completed(
        &self,
        owner: &str,
        completed: bool,
    ) -> RepoResult<Vec<Todo>>;

    /// One owner's todos due within `[start, end]`, earliest due first.
    async fn find_by_due_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Todo>>;

    /// How many todos an owner has with the given completion flag.
    async fn count_by_owner_and_completed(&self, owner: &str, completed: bool) -> RepoResult<u64>;

    /// Re-points every todo of one category at another (category deletion).
    /// Returns the number of todos moved.
    async fn move_category_for_owner(&self, owner: &str, from: &str, to: &str) -> RepoResult<u64>;
}

#[async_trait]
impl<S: Store> TodoQueries for TodoRepository<S> {
    async fn find_by_owner_and_category(
        &self,
        owner: &str,
        category_id: &str,
    ) -> RepoResult<Vec<Todo>> {
        let key = self.keys().owner_index(owner, "category", category_id);
        let ids = self.store().zrange(&key, 0, -1).await?;
        self.find_by_ids(&ids).await
    }

    async fn find_by_owner_and_completed(
        &self,
        owner: &str,
        completed: bool,
    ) -> RepoResult<Vec<Todo>> {
        let key = self
            .keys()
            .owner_index(owner, "completed", &completed.to_string());
        let ids = self.store().zrange(&key, 0, -1).await?;
        self.find_by_ids(&ids).await
    }

    async fn find_by_due_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Todo>> {
        let key = self.keys().owner_index(owner, "duedate", "all");
        let ids = self
            .store()
            .zrange_by_score(&key, start.timestamp() as f64, end.timestamp() as f64)
            .await?;
        self.find_by_ids(&ids).await
    }

    async fn count_by_owner_and_completed(&self, owner: &str, completed: bool) -> RepoResult<u64> {
        let key = self
            .keys()
            .owner_index(owner, "completed", &completed.to_string());
        Ok(self.store().zcard(&key).await?)
    }

    async fn move_category_for_owner(&self, owner: &str, from: &str, to: &str) -> RepoResult<u64> {
        let key = self.keys().owner_index(owner, "category", from);
        let ids = self.store().zrange(&key, 0, -1).await?;

        let mut moved = 0;
        for id in &ids {
            let patch = TodoPatch {
                category_id: Some(to.to_string()),
                ..TodoPatch::default()
            };
            if self.update(id, patch).await?.is_some() {
                moved += 1;
            }
        }
        Ok(moved)
    }
}
