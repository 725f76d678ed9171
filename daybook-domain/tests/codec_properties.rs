//! Property tests for the round-trip law: for every valid entity,
//! `decode(encode(e))` reproduces `e` on all modeled fields.

use chrono::{DateTime, TimeZone, Utc};
use daybook_domain::{
    Account, AccountCodec, Category, CompletedTodoDisplay, DateFormat, DefaultView, Language,
    Priority, SettingsCodec, Theme, TimeFormat, Todo, TodoCodec, TodoKind, UserSettings, WeekStart,
};
use daybook_repository::EntityCodec;
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────

fn datetime_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // Millisecond precision between 1970 and 2100.
    (0i64..4_102_444_800_000).prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-f0-9]{8}-[a-f0-9]{4}").unwrap()
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ]{0,30}").unwrap()
}

fn nonempty_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,16}").unwrap()
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low)
    ]
}

fn kind_strategy() -> impl Strategy<Value = TodoKind> {
    prop_oneof![Just(TodoKind::Event), Just(TodoKind::Task)]
}

fn todo_strategy() -> impl Strategy<Value = Todo> {
    (
        (
            id_strategy(),
            nonempty_strategy(),
            text_strategy(),
            prop::option::of(nonempty_strategy()),
            any::<bool>(),
            priority_strategy(),
        ),
        (
            nonempty_strategy(),
            kind_strategy(),
            datetime_strategy(),
            datetime_strategy(),
            datetime_strategy(),
        ),
    )
        .prop_map(
            |(
                (id, owner_id, title, description, completed, priority),
                (category_id, kind, due_date, created_at, updated_at),
            )| Todo {
                id,
                owner_id,
                title,
                description,
                completed,
                priority,
                category_id,
                kind,
                due_date,
                created_at,
                updated_at,
            },
        )
}

fn account_strategy() -> impl Strategy<Value = Account> {
    (
        id_strategy(),
        prop::string::string_regex("[a-z]{1,10}@[a-z]{1,8}\\.com").unwrap(),
        text_strategy(),
        text_strategy(),
        prop::option::of(nonempty_strategy()),
        any::<bool>(),
        datetime_strategy(),
        datetime_strategy(),
    )
        .prop_map(
            |(id, email, password_hash, display_name, profile_image, is_active, created_at, updated_at)| {
                Account {
                    id,
                    email,
                    password_hash,
                    display_name,
                    profile_image,
                    is_active,
                    created_at,
                    updated_at,
                }
            },
        )
}

fn category_strategy() -> impl Strategy<Value = Category> {
    (
        nonempty_strategy(),
        text_strategy(),
        prop::string::string_regex("#[0-9a-f]{6}").unwrap(),
        any::<bool>(),
    )
        .prop_map(|(id, name, color, is_default)| Category {
            id,
            name,
            color,
            is_default,
        })
}

fn settings_strategy() -> impl Strategy<Value = UserSettings> {
    (
        (
            id_strategy(),
            nonempty_strategy(),
            prop_oneof![Just(Theme::Light), Just(Theme::Dark), Just(Theme::System)],
            prop_oneof![Just(Language::Ko), Just(Language::En)],
            prop_oneof![Just(TimeFormat::TwelveHour), Just(TimeFormat::TwentyFourHour)],
            prop_oneof![
                Just(DateFormat::YearMonthDay),
                Just(DateFormat::MonthDayYear),
                Just(DateFormat::DayMonthYear)
            ],
            prop::sample::select(vec!["UTC", "Asia/Seoul", "America/New_York"]),
        ),
        (
            prop_oneof![
                Just(WeekStart::Sunday),
                Just(WeekStart::Monday),
                Just(WeekStart::Saturday)
            ],
            prop_oneof![
                Just(DefaultView::Month),
                Just(DefaultView::Week),
                Just(DefaultView::Day)
            ],
            any::<bool>(),
            any::<bool>(),
            any::<u32>(),
            prop_oneof![
                Just(CompletedTodoDisplay::All),
                Just(CompletedTodoDisplay::Yesterday),
                Just(CompletedTodoDisplay::None)
            ],
            prop::collection::vec(category_strategy(), 0..4),
            datetime_strategy(),
            datetime_strategy(),
        ),
    )
        .prop_map(
            |(
                (id, owner_id, theme, language, time_format, date_format, timezone),
                (
                    week_start,
                    default_view,
                    show_weekends,
                    auto_move_todos,
                    old_todo_display_limit,
                    completed_todo_display,
                    categories,
                    created_at,
                    updated_at,
                ),
            )| UserSettings {
                id,
                owner_id,
                theme,
                language,
                time_format,
                date_format,
                timezone: timezone.to_string(),
                week_start,
                default_view,
                show_weekends,
                auto_move_todos,
                old_todo_display_limit,
                completed_todo_display,
                categories,
                created_at,
                updated_at,
            },
        )
}

// ── Round-trip laws ──────────────────────────────────────────────

proptest! {
    #[test]
    fn todo_roundtrip(todo in todo_strategy()) {
        let decoded = TodoCodec::decode(&TodoCodec::encode(&todo)).unwrap();
        prop_assert_eq!(decoded, todo);
    }

    #[test]
    fn account_roundtrip(account in account_strategy()) {
        let decoded = AccountCodec::decode(&AccountCodec::encode(&account)).unwrap();
        prop_assert_eq!(decoded, account);
    }

    #[test]
    fn settings_roundtrip(settings in settings_strategy()) {
        let decoded = SettingsCodec::decode(&SettingsCodec::encode(&settings)).unwrap();
        prop_assert_eq!(decoded, settings);
    }
}

// ── Decode tolerance ─────────────────────────────────────────────

#[test]
fn todo_decode_defaults_missing_optional_fields() {
    use std::collections::HashMap;

    let record = HashMap::from([
        ("id".to_string(), "t-1".to_string()),
        ("owner_id".to_string(), "u1".to_string()),
        ("due_date".to_string(), "2026-03-01T09:00:00+00:00".to_string()),
        ("created_at".to_string(), "2026-02-01T09:00:00+00:00".to_string()),
    ]);

    let todo = TodoCodec::decode(&record).unwrap();
    assert_eq!(todo.title, "");
    assert_eq!(todo.description, None);
    assert!(!todo.completed);
    assert_eq!(todo.priority, Priority::Medium);
    assert_eq!(todo.category_id, "personal");
    assert_eq!(todo.kind, TodoKind::Event);
    assert_eq!(todo.updated_at, todo.created_at);
}

#[test]
fn todo_decode_rejects_missing_identity() {
    use std::collections::HashMap;

    let record = HashMap::from([("title".to_string(), "orphan".to_string())]);
    assert!(TodoCodec::decode(&record).is_err());
}

#[test]
fn settings_decode_defaults_malformed_limit() {
    use std::collections::HashMap;

    let record = HashMap::from([
        ("id".to_string(), "s-1".to_string()),
        ("owner_id".to_string(), "u1".to_string()),
        ("old_todo_display_limit".to_string(), "not-a-number".to_string()),
        ("created_at".to_string(), "2026-02-01T09:00:00+00:00".to_string()),
    ]);

    let settings = SettingsCodec::decode(&record).unwrap();
    assert_eq!(settings.old_todo_display_limit, 14);
    assert!(settings.categories.is_empty());
}
