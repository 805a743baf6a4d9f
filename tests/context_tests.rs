use sqint::{
    context::{Role, SyntacticContext, resolve},
    scanner::scan_unit,
    source::SourceUnit
};

/// Resolve the context of the occurrence whose value matches `value`.
fn context_for(src: &str, value: &str) -> SyntacticContext {
    let unit = SourceUnit::new("test.py", src);
    let occurrences = scan_unit(&unit);
    let occ = occurrences
        .iter()
        .find(|o| o.value == value)
        .expect("occurrence with expected value");
    resolve(&unit, occ)
}

#[test]
fn test_simple_assignment() {
    let ctx = context_for("query = \"SELECT 1\"", "SELECT 1");
    assert_eq!(ctx.role, Role::Assignment);
    assert_eq!(ctx.bound_name.as_deref(), Some("query"));
    assert!(ctx.callee.is_none());
}

#[test]
fn test_attribute_assignment_uses_last_component() {
    let ctx = context_for("self.user_sql = \"SELECT 1\"", "SELECT 1");
    assert_eq!(ctx.role, Role::Assignment);
    assert_eq!(ctx.bound_name.as_deref(), Some("user_sql"));
}

#[test]
fn test_augmented_assignment() {
    let ctx = context_for("query += \" AND active = 1\"", " AND active = 1");
    assert_eq!(ctx.role, Role::Assignment);
    assert_eq!(ctx.bound_name.as_deref(), Some("query"));
}

#[test]
fn test_equality_comparison_is_not_assignment() {
    let ctx = context_for("if x == \"SELECT 1\":\n    pass\n", "SELECT 1");
    assert_eq!(ctx.role, Role::Other);
    assert!(ctx.bound_name.is_none());
}

#[test]
fn test_call_argument_callee() {
    let ctx = context_for("cursor.execute(\"SELECT 1\")", "SELECT 1");
    assert_eq!(ctx.role, Role::CallArgument);
    assert_eq!(ctx.callee.as_deref(), Some("execute"));
    assert!(ctx.bound_name.is_none());
}

#[test]
fn test_second_call_argument() {
    let ctx = context_for("run(conn, \"SELECT 1\")", "SELECT 1");
    assert_eq!(ctx.role, Role::CallArgument);
    assert_eq!(ctx.callee.as_deref(), Some("run"));
}

#[test]
fn test_dict_value_named_by_key() {
    let ctx = context_for("queries = {\"find_user\": \"SELECT 1\"}", "SELECT 1");
    assert_eq!(ctx.role, Role::DictValue);
    assert_eq!(ctx.bound_name.as_deref(), Some("find_user"));
}

#[test]
fn test_return_statement() {
    let src = "def build():\n    return \"SELECT 1\"\n";
    let ctx = context_for(src, "SELECT 1");
    assert_eq!(ctx.role, Role::Return);
    assert_eq!(ctx.enclosing.len(), 1);
    assert_eq!(ctx.enclosing[0].as_str(), "build");
}

#[test]
fn test_enclosing_chain_outermost_first() {
    let src = "class Repo:\n    def find(self):\n        query = \"SELECT 1\"\n";
    let ctx = context_for(src, "SELECT 1");
    assert_eq!(ctx.role, Role::Assignment);
    let names: Vec<&str> = ctx.enclosing.iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["Repo", "find"]);
}

#[test]
fn test_sibling_function_is_not_enclosing() {
    let src = "def other():\n    pass\n\ndef build():\n    q = \"SELECT 1\"\n";
    let ctx = context_for(src, "SELECT 1");
    let names: Vec<&str> = ctx.enclosing.iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["build"]);
}

#[test]
fn test_bare_literal_has_no_context() {
    let ctx = context_for("\"SELECT 1\"", "SELECT 1");
    assert_eq!(ctx.role, Role::Other);
    assert!(ctx.bound_name.is_none());
    assert!(ctx.callee.is_none());
    assert!(ctx.enclosing.is_empty());
}
