//! Per-user application settings.
//!
//! One record per owner, stored through the owner-scoped repository like
//! any other kind. The category palette is a nested structure and rides in
//! the hash as JSON text; everything else is flat fields.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_repository::{
    fields, generate_id, DecodeError, EntityCodec, OwnedEntityCodec, OwnerEntityRepository,
    OwnerRepository, RepoResult, Repository,
};
use daybook_store::{KeyBuilder, Store};
use serde::{Deserialize, Serialize};

/// UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::System,
        }
    }
}

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "en" => Language::En,
            _ => Language::Ko,
        }
    }
}

/// Clock rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[default]
    TwelveHour,
    TwentyFourHour,
}

impl TimeFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "12h",
            TimeFormat::TwentyFourHour => "24h",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "24h" => TimeFormat::TwentyFourHour,
            _ => TimeFormat::TwelveHour,
        }
    }
}

/// Date rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    #[default]
    YearMonthDay,
    MonthDayYear,
    DayMonthYear,
}

impl DateFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DateFormat::YearMonthDay => "YYYY-MM-DD",
            DateFormat::MonthDayYear => "MM/DD/YYYY",
            DateFormat::DayMonthYear => "DD/MM/YYYY",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "MM/DD/YYYY" => DateFormat::MonthDayYear,
            "DD/MM/YYYY" => DateFormat::DayMonthYear,
            _ => DateFormat::YearMonthDay,
        }
    }
}

/// First day of the calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
    Saturday,
}

impl WeekStart {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
            WeekStart::Saturday => "saturday",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "monday" => WeekStart::Monday,
            "saturday" => WeekStart::Saturday,
            _ => WeekStart::Sunday,
        }
    }
}

/// Calendar view opened on launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultView {
    #[default]
    Month,
    Week,
    Day,
}

impl DefaultView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DefaultView::Month => "month",
            DefaultView::Week => "week",
            DefaultView::Day => "day",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "week" => DefaultView::Week,
            "day" => DefaultView::Day,
            _ => DefaultView::Month,
        }
    }
}

/// Which completed todos stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletedTodoDisplay {
    #[default]
    All,
    Yesterday,
    None,
}

impl CompletedTodoDisplay {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CompletedTodoDisplay::All => "all",
            CompletedTodoDisplay::Yesterday => "yesterday",
            CompletedTodoDisplay::None => "none",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "yesterday" => CompletedTodoDisplay::Yesterday,
            "none" => CompletedTodoDisplay::None,
            _ => CompletedTodoDisplay::All,
        }
    }
}

/// One todo category in a user's palette. Nested into the settings hash as
/// JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_default: bool,
}

/// The palette a fresh account starts with.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    vec![Category {
        id: "personal".to_string(),
        name: "Personal".to_string(),
        color: "#3b82f6".to_string(),
        is_default: true,
    }]
}

/// One owner's settings record.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub id: String,
    pub owner_id: String,
    pub theme: Theme,
    pub language: Language,
    pub time_format: TimeFormat,
    pub date_format: DateFormat,
    pub timezone: String,
    pub week_start: WeekStart,
    pub default_view: DefaultView,
    pub show_weekends: bool,
    pub auto_move_todos: bool,
    pub old_todo_display_limit: u32,
    pub completed_todo_display: CompletedTodoDisplay,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_OLD_TODO_LIMIT: u32 = 14;

/// Caller-supplied fields of a new settings record; everything except the
/// owner falls back to defaults.
#[derive(Debug, Clone)]
pub struct SettingsDraft {
    pub owner_id: String,
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub timezone: Option<String>,
    pub categories: Option<Vec<Category>>,
}

impl SettingsDraft {
    #[must_use]
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            theme: None,
            language: None,
            timezone: None,
            categories: None,
        }
    }
}

/// Partial update of a settings record.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub time_format: Option<TimeFormat>,
    pub date_format: Option<DateFormat>,
    pub timezone: Option<String>,
    pub week_start: Option<WeekStart>,
    pub default_view: Option<DefaultView>,
    pub show_weekends: Option<bool>,
    pub auto_move_todos: Option<bool>,
    pub old_todo_display_limit: Option<u32>,
    pub completed_todo_display: Option<CompletedTodoDisplay>,
    pub categories: Option<Vec<Category>>,
}

/// Codec for the `settings` kind.
pub struct SettingsCodec;

impl EntityCodec for SettingsCodec {
    type Entity = UserSettings;
    type Draft = SettingsDraft;
    type Patch = SettingsPatch;

    const KIND: &'static str = "settings";

    fn id(entity: &UserSettings) -> &str {
        &entity.id
    }

    fn created_at(entity: &UserSettings) -> DateTime<Utc> {
        entity.created_at
    }

    fn encode(entity: &UserSettings) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), entity.id.clone()),
            ("owner_id".to_string(), entity.owner_id.clone()),
            ("theme".to_string(), entity.theme.as_str().to_string()),
            ("language".to_string(), entity.language.as_str().to_string()),
            ("time_format".to_string(), entity.time_format.as_str().to_string()),
            ("date_format".to_string(), entity.date_format.as_str().to_string()),
            ("timezone".to_string(), entity.timezone.clone()),
            ("week_start".to_string(), entity.week_start.as_str().to_string()),
            ("default_view".to_string(), entity.default_view.as_str().to_string()),
            (
                "show_weekends".to_string(),
                fields::encode_bool(entity.show_weekends),
            ),
            (
                "auto_move_todos".to_string(),
                fields::encode_bool(entity.auto_move_todos),
            ),
            (
                "old_todo_display_limit".to_string(),
                entity.old_todo_display_limit.to_string(),
            ),
            (
                "completed_todo_display".to_string(),
                entity.completed_todo_display.as_str().to_string(),
            ),
            (
                "categories".to_string(),
                fields::encode_json(&entity.categories),
            ),
            ("created_at".to_string(), fields::encode_date(entity.created_at)),
            ("updated_at".to_string(), fields::encode_date(entity.updated_at)),
        ])
    }

    fn decode(record: &HashMap<String, String>) -> Result<UserSettings, DecodeError> {
        let created_at = fields::decode_date(record, "created_at")?;
        Ok(UserSettings {
            id: fields::require_str(record, "id")?,
            owner_id: fields::require_str(record, "owner_id")?,
            theme: Theme::parse(record.get("theme").map_or("", String::as_str)),
            language: Language::parse(record.get("language").map_or("", String::as_str)),
            time_format: TimeFormat::parse(record.get("time_format").map_or("", String::as_str)),
            date_format: DateFormat::parse(record.get("date_format").map_or("", String::as_str)),
            timezone: fields::opt_str(record, "timezone")
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            week_start: WeekStart::parse(record.get("week_start").map_or("", String::as_str)),
            default_view: DefaultView::parse(record.get("default_view").map_or("", String::as_str)),
            show_weekends: fields::decode_bool(record, "show_weekends"),
            auto_move_todos: fields::decode_bool(record, "auto_move_todos"),
            old_todo_display_limit: record
                .get("old_todo_display_limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_OLD_TODO_LIMIT),
            completed_todo_display: CompletedTodoDisplay::parse(
                record.get("completed_todo_display").map_or("", String::as_str),
            ),
            categories: fields::decode_json_or_default(record, "categories")?,
            created_at,
            updated_at: fields::decode_date(record, "updated_at").unwrap_or(created_at),
        })
    }

    fn from_draft(draft: SettingsDraft) -> UserSettings {
        let created_at = Utc::now();
        UserSettings {
            id: generate_id(),
            owner_id: draft.owner_id,
            theme: draft.theme.unwrap_or_default(),
            language: draft.language.unwrap_or_default(),
            time_format: TimeFormat::default(),
            date_format: DateFormat::default(),
            timezone: draft.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            week_start: WeekStart::default(),
            default_view: DefaultView::default(),
            show_weekends: true,
            auto_move_todos: true,
            old_todo_display_limit: DEFAULT_OLD_TODO_LIMIT,
            completed_todo_display: CompletedTodoDisplay::default(),
            categories: draft.categories.unwrap_or_else(default_categories),
            created_at,
            updated_at: created_at,
        }
    }

    fn apply_patch(existing: &UserSettings, patch: SettingsPatch) -> UserSettings {
        UserSettings {
            id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            theme: patch.theme.unwrap_or(existing.theme),
            language: patch.language.unwrap_or(existing.language),
            time_format: patch.time_format.unwrap_or(existing.time_format),
            date_format: patch.date_format.unwrap_or(existing.date_format),
            timezone: patch.timezone.unwrap_or_else(|| existing.timezone.clone()),
            week_start: patch.week_start.unwrap_or(existing.week_start),
            default_view: patch.default_view.unwrap_or(existing.default_view),
            show_weekends: patch.show_weekends.unwrap_or(existing.show_weekends),
            auto_move_todos: patch.auto_move_todos.unwrap_or(existing.auto_move_todos),
            old_todo_display_limit: patch
                .old_todo_display_limit
                .unwrap_or(existing.old_todo_display_limit),
            completed_todo_display: patch
                .completed_todo_display
                .unwrap_or(existing.completed_todo_display),
            categories: patch
                .categories
                .unwrap_or_else(|| existing.categories.clone()),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        }
    }
}

impl OwnedEntityCodec for SettingsCodec {
    fn owner_id(entity: &UserSettings) -> &str {
        &entity.owner_id
    }
}

/// The settings repository: owner-scoped, no secondary indexes.
pub type SettingsRepository<S> = OwnerEntityRepository<SettingsCodec, S>;

/// Builds the settings repository over the given store.
#[must_use]
pub fn settings_repository<S: Store>(store: Arc<S>, keys: &KeyBuilder) -> SettingsRepository<S> {
    OwnerEntityRepository::new(store, keys)
}

/// Settings-specific conveniences.
#[async_trait]
pub trait SettingsQueries {
    /// One owner's settings record, if any.
    async fn find_for_owner(&self, owner: &str) -> RepoResult<Option<UserSettings>>;

    /// Returns the stored record, creating the defaults on first access.
    async fn find_or_create(&self, owner: &str) -> RepoResult<UserSettings>;
}

#[async_trait]
impl<S: Store> SettingsQueries for SettingsRepository<S> {
    async fn find_for_owner(&self, owner: &str) -> RepoResult<Option<UserSettings>> {
        Ok(self.find_by_owner(owner).await?.into_iter().next())
    }

    async fn find_or_create(&self, owner: &str) -> RepoResult<UserSettings> {
        if let Some(settings) = self.find_for_owner(owner).await? {
            return Ok(settings);
        }
        self.create(SettingsDraft::for_owner(owner)).await
    }
}
