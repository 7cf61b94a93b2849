use super::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct AddComment;

impl QueryHook for AddComment {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        HookAction::ModifySql {
            exec_sql: format!("/* {} */ {}", ctx.kind, ctx.exec_sql),
            canonical_sql: None,
        }
    }
}

struct BlockCount;

impl QueryHook for BlockCount {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        if ctx.kind == QueryKind::Count {
            HookAction::Abort("count blocked".to_string())
        } else {
            HookAction::Continue
        }
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl QueryHook for Recorder {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        self.0.lock().unwrap().push(ctx.exec_sql.clone());
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, _: Duration, outcome: &QueryOutcome) {
        self.0
            .lock()
            .unwrap()
            .push(format!("{} -> {}", ctx.kind, outcome));
    }
}

#[test]
fn test_composite_modify_is_seen_by_later_hooks() {
    let recorder = Arc::new(Recorder::default());
    let hook = CompositeHook::new()
        .add(AddComment)
        .add_arc(recorder.clone());
    let ctx = QueryContext::new("SELECT 1", 0, QueryKind::Page);

    assert_eq!(
        hook.before_query(&ctx),
        HookAction::ModifySql {
            exec_sql: "/* page */ SELECT 1".to_string(),
            canonical_sql: None,
        }
    );
    assert_eq!(
        recorder.0.lock().unwrap().as_slice(),
        ["/* page */ SELECT 1".to_string()]
    );
}

#[test]
fn test_composite_abort_stops_chain() {
    let recorder = Arc::new(Recorder::default());
    let hook = CompositeHook::new().add(BlockCount).add_arc(recorder.clone());

    let ctx = QueryContext::new("SELECT COUNT(*) FROM t", 0, QueryKind::Count);
    assert_eq!(
        hook.before_query(&ctx),
        HookAction::Abort("count blocked".to_string())
    );
    assert!(recorder.0.lock().unwrap().is_empty());

    let ctx = QueryContext::new("SELECT * FROM t", 0, QueryKind::Page);
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
}

#[test]
fn test_composite_after_query_fans_out() {
    let recorder = Arc::new(Recorder::default());
    let hook = CompositeHook::new().add_arc(recorder.clone());
    let ctx = QueryContext::new("SELECT 1", 0, QueryKind::Count);
    hook.after_query(&ctx, Duration::from_millis(3), &QueryOutcome::Rows(1));
    assert_eq!(
        recorder.0.lock().unwrap().as_slice(),
        ["count -> 1 rows".to_string()]
    );
}

#[test]
fn test_context_fields() {
    let ctx = QueryContext::new("SELECT 1", 2, QueryKind::Page)
        .with_tag("products.page")
        .with_field("page", 3)
        .with_field("size", 20);
    assert_eq!(ctx.tag.as_deref(), Some("products.page"));
    assert_eq!(ctx.fields.get("page").map(String::as_str), Some("3"));
    assert_eq!(ctx.fields.get("size").map(String::as_str), Some("20"));
}

#[test]
fn test_tracing_hook_truncation() {
    let hook = TracingSqlHook::new().max_sql_length(10);
    assert_eq!(hook.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(hook.truncate_sql("SELECT 1"), "SELECT 1");
    assert_eq!(
        TracingSqlHook::new().no_truncate().truncate_sql("SELECT * FROM users"),
        "SELECT * FROM users"
    );
    let ctx = QueryContext::new("SELECT 1", 0, QueryKind::Page);
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
}
