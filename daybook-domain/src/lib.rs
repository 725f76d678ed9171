//! Daybook domain records.
//!
//! The concrete consumers of the generic repository layer. Each kind
//! supplies its codec and index strategy and gets CRUD, listing,
//! pagination, and owner scoping from `daybook-repository`; kind-specific
//! queries (category filters, e-mail lookup, find-or-create) are extension
//! traits over the wired repositories. Nothing here touches store keys
//! outside the shared key builder.

mod account;
mod session;
mod settings;
mod todo;

pub use account::{
    account_repository, Account, AccountCodec, AccountDraft, AccountIndexes, AccountPatch,
    AccountQueries, AccountRepository,
};
pub use session::SessionStore;
pub use settings::{
    default_categories, settings_repository, Category, CompletedTodoDisplay, DateFormat,
    DefaultView, Language, SettingsCodec, SettingsDraft, SettingsPatch, SettingsQueries,
    SettingsRepository, Theme, TimeFormat, UserSettings, WeekStart,
};
pub use todo::{
    todo_repository, Priority, Todo, TodoCodec, TodoDraft, TodoIndexes, TodoKind, TodoPatch,
    TodoQueries, TodoRepository, DEFAULT_CATEGORY,
};
