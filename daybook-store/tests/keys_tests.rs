use daybook_store::{KeyBuilder, DEFAULT_KEY_PREFIX};

// ── KeyBuilder ───────────────────────────────────────────────────

#[test]
fn key_joins_prefix_kind_and_qualifiers() {
    let builder = KeyBuilder::new("app");
    assert_eq!(builder.key("todo", &["abc"]), "app:todo:abc");
    assert_eq!(builder.key("todo", &["list"]), "app:todo:list");
    assert_eq!(builder.key("todo", &[]), "app:todo");
}

#[test]
fn key_is_deterministic() {
    let builder = KeyBuilder::new("app");
    assert_eq!(
        builder.key("user", &["index", "email", "a@b.c"]),
        builder.key("user", &["index", "email", "a@b.c"]),
    );
}

#[test]
fn distinct_tuples_yield_distinct_keys() {
    let builder = KeyBuilder::new("app");
    let keys = [
        builder.key("todo", &["1"]),
        builder.key("todo", &["2"]),
        builder.key("user", &["1"]),
        builder.key("todo", &["user", "1"]),
    ];
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn default_prefix() {
    let builder = KeyBuilder::default();
    assert_eq!(builder.prefix(), DEFAULT_KEY_PREFIX);
    assert_eq!(builder.key("todo", &["x"]), "daybook:todo:x");
}

// ── KeySpace shapes ──────────────────────────────────────────────

#[test]
fn keyspace_primary_and_list() {
    let space = KeyBuilder::new("app").namespace("todo");
    assert_eq!(space.kind(), "todo");
    assert_eq!(space.primary("t-1"), "app:todo:t-1");
    assert_eq!(space.list(), "app:todo:list");
}

#[test]
fn keyspace_owner_shapes() {
    let space = KeyBuilder::new("app").namespace("todo");
    assert_eq!(space.owner_list("u1"), "app:todo:user:u1");
    assert_eq!(
        space.owner_index("u1", "category", "work"),
        "app:todo:user:u1:index:category:work"
    );
}

#[test]
fn keyspace_global_index_shape() {
    let space = KeyBuilder::new("app").namespace("user");
    assert_eq!(
        space.index("email", "a@b.c"),
        "app:user:index:email:a@b.c"
    );
}
