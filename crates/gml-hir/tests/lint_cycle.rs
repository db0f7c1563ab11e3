mod common;
use common::*;

#[test]
fn test_edit_replaces_local_declaration() {
    let index = index_in(WorkspaceIndexState::Ready);
    let uri = script_uri("scr_a");
    index.write().create_script("scr_a", uri.clone()).unwrap();
    let mut handler = script_handler("scr_a");

    let outcome = lint(&index, &mut handler, "var x = 1;", LintMode::Full);
    assert!(outcome.matched);
    {
        let reference = index.read();
        let sites = reference.variable_sites("x");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].scope, ScopeKind::Local);
        assert_eq!(sites[0].uri(), &uri);
    }

    lint(&index, &mut handler, "var y = 1;", LintMode::Full);
    let reference = index.read();
    assert!(reference.variable_sites("x").is_empty());
    assert_eq!(reference.variable_sites("y").len(), 1);
    assert_eq!(reference.resolve_local(&uri, "y").len(), 1);
}

#[test]
fn test_failed_parse_keeps_previous_contribution() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_player", "Create_0");

    lint(&index, &mut handler, "hp = 10;\nshow_debug_message(hp);", LintMode::Full);
    let before = index.read().contribution(handler.uri()).cloned();
    assert!(before.is_some());

    let outcome = lint(&index, &mut handler, "if (x ==", LintMode::Full);
    assert!(!outcome.matched);
    assert!(!outcome.stale);
    assert_eq!(codes(&outcome), vec!["E001"]);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.source, DiagnosticSource::Syntax);
    assert_eq!(u32::from(diagnostic.range.start()), 8);

    assert_eq!(index.read().contribution(handler.uri()).cloned(), before);
    assert_eq!(index.read().variable_sites("hp").len(), 1);
}

#[test]
fn test_never_parsed_document_contributes_nothing() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = script_handler("scr_broken");
    let outcome = lint(&index, &mut handler, "var = ;", LintMode::Full);
    assert!(!outcome.matched);
    assert!(index.read().contribution(handler.uri()).is_none());
}

#[test]
fn test_forward_reference_during_bootstrap() {
    let index = index_in(WorkspaceIndexState::Indexing);
    let a_uri = script_uri("scr_a");
    let b_uri = script_uri("scr_b");
    let mut a = script_handler("scr_a");
    let mut b = script_handler("scr_b");

    index.write().create_script("scr_a", a_uri).unwrap();
    let outcome = lint(&index, &mut a, "scr_b(1);", LintMode::Bootstrap);
    assert!(
        !codes(&outcome).contains(&"W101"),
        "unexpected: {:?}",
        outcome.diagnostics
    );

    index.write().create_script("scr_b", b_uri).unwrap();
    lint(&index, &mut b, "/// @param value\nreturn value;", LintMode::Bootstrap);
    index.advance(WorkspaceIndexState::Ready);

    let outcome = lint(&index, &mut a, "scr_b(1);", LintMode::Full);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
}

#[test]
fn test_unresolved_call_after_ready() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = script_handler("scr_a");
    let outcome = lint(&index, &mut handler, "scr_missing();", LintMode::Full);
    assert_eq!(codes(&outcome), vec!["W101"]);
    assert!(outcome.diagnostics[0].message.contains("scr_missing"));
}

#[test]
fn test_calls_to_names_declared_in_same_document_resolve() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_a", "Create_0");
    let outcome = lint(
        &index,
        &mut handler,
        "#macro LOG show_debug_message\ncallback = irandom;\ncallback(3);\nLOG(\"hi\");",
        LintMode::Full,
    );
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
}

#[test]
fn test_arity_against_manual_and_jsdoc() {
    let index = index_in(WorkspaceIndexState::Ready);
    let lib = script_uri("scr_move");
    index.write().create_script("scr_move", lib).unwrap();
    let mut lib_handler = script_handler("scr_move");
    lint(
        &index,
        &mut lib_handler,
        "/// scr_move(x, y, [speed])\nx += argument0;",
        LintMode::Full,
    );
    let signature = index.read().resolve_signature("scr_move").unwrap();
    assert_eq!(signature.label, "scr_move(x, y, [speed])");

    let mut caller = event_handler("obj_a", "Step_0");
    let outcome = lint(
        &index,
        &mut caller,
        "scr_move(1);\nscr_move(1, 2);\nscr_move(1, 2, 3, 4);\nirandom();",
        LintMode::Full,
    );
    assert_eq!(codes(&outcome), vec!["W102", "W102", "W102"]);
    assert!(outcome.diagnostics[0].message.contains("2 to 3"));
}

#[test]
fn test_removing_jsdoc_clears_signature() {
    let index = index_in(WorkspaceIndexState::Ready);
    index
        .write()
        .create_script("scr_log", script_uri("scr_log"))
        .unwrap();
    let mut handler = script_handler("scr_log");
    lint(&index, &mut handler, "/// @param msg\nshow_debug_message(msg);", LintMode::Full);
    assert!(index.read().resolve_signature("scr_log").is_some());

    lint(&index, &mut handler, "show_debug_message(argument0);", LintMode::Full);
    assert!(index.read().resolve_signature("scr_log").is_none());
}

#[test]
fn test_instance_and_global_scopes() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_player", "Create_0");
    lint(
        &index,
        &mut handler,
        "\
hp = 3;
self.mana = 2;
var tmp = 1;
tmp = 2;
globalvar score;
global.lives = 3;
with (obj_enemy) {
    target = other;
}
",
        LintMode::Full,
    );
    let reference = index.read();
    let scope_of = |name: &str| reference.variable_sites(name).first().map(|site| site.scope);
    assert_eq!(scope_of("hp"), Some(ScopeKind::Instance));
    assert_eq!(scope_of("mana"), Some(ScopeKind::Instance));
    assert_eq!(scope_of("tmp"), Some(ScopeKind::Local));
    assert_eq!(reference.variable_sites("tmp").len(), 1);
    assert_eq!(scope_of("score"), Some(ScopeKind::Global));
    assert_eq!(scope_of("lives"), Some(ScopeKind::Global));
    assert_eq!(scope_of("target"), None);
    assert!(reference.exists("lives"));
    assert!(!reference.exists("hp"));
}

#[test]
fn test_script_assignments_are_not_instance_declarations() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = script_handler("scr_reset");
    lint(&index, &mut handler, "hp = 0;", LintMode::Full);
    assert!(index.read().variable_sites("hp").is_empty());
    assert_eq!(index.read().list_references("hp").len(), 1);
}

#[test]
fn test_macro_collision_across_documents() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut first = script_handler("scr_config");
    let mut second = script_handler("scr_other");

    let outcome = lint(&index, &mut first, "#macro SPEED 4", LintMode::Full);
    assert!(outcome.diagnostics.is_empty());

    let outcome = lint(&index, &mut second, "#macro SPEED 8\n#macro SIZE 2", LintMode::Full);
    assert_eq!(codes(&outcome), vec!["E104"]);
    assert_eq!(outcome.diagnostics[0].source, DiagnosticSource::Variable);
    assert_eq!(u32::from(outcome.diagnostics[0].range.start()), 7);
    assert_eq!(index.read().macro_get("SPEED").unwrap().value, "4");
    assert!(index.read().exists("SIZE"));

    // Re-linting the owner keeps the macro.
    let outcome = lint(&index, &mut first, "#macro SPEED 4", LintMode::Full);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_shadowed_macro_survives_owner_dropping_it() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut first = script_handler("scr_a");
    let mut second = script_handler("scr_b");
    lint(&index, &mut first, "#macro SPEED 4", LintMode::Full);
    let outcome = lint(&index, &mut second, "#macro SPEED 8", LintMode::Full);
    assert_eq!(codes(&outcome), vec!["E104"]);

    lint(&index, &mut first, "x = 1;", LintMode::Full);
    assert!(index.read().exists("SPEED"));
    assert_eq!(index.read().macro_get("SPEED").unwrap().value, "8");

    let mut caller = script_handler("scr_c");
    let outcome = lint(&index, &mut caller, "SPEED(1);", LintMode::Full);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let outcome = lint(&index, &mut second, "#macro SPEED 8", LintMode::Full);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_function_declarations_are_callable_from_other_documents() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut library = script_handler("scr_math");
    let outcome = lint(
        &index,
        &mut library,
        "function clamp01(value) {\n    return value < 0 ? 0 : min_one(value);\n}\nfunction min_one(v) {\n    return v > 1 ? 1 : v;\n}\n",
        LintMode::Full,
    );
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    {
        let reference = index.read();
        let scope_of = |name: &str| reference.variable_sites(name).first().map(|site| site.scope);
        assert_eq!(scope_of("clamp01"), Some(ScopeKind::Global));
        assert_eq!(scope_of("value"), Some(ScopeKind::Local));
        assert!(reference.exists("clamp01"));
        assert!(!reference.exists("value"));
    }

    let mut caller = event_handler("obj_player", "Step_0");
    let outcome = lint(&index, &mut caller, "x = clamp01(x);", LintMode::Full);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
}

#[test]
fn test_diagnostics_are_grouped_by_pass() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut other = script_handler("scr_other");
    lint(&index, &mut other, "#macro DUP 1", LintMode::Full);

    let mut handler = script_handler("scr_a");
    let outcome = lint(
        &index,
        &mut handler,
        "/// @param {real x\n#macro DUP 2\nmissing();",
        LintMode::Full,
    );
    let sources: Vec<_> = outcome.diagnostics.iter().map(|d| d.source).collect();
    assert_eq!(
        sources,
        vec![
            DiagnosticSource::Function,
            DiagnosticSource::Variable,
            DiagnosticSource::JsDoc,
        ]
    );
}

#[test]
fn test_variable_pass_is_idempotent() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_a", "Step_0");
    let text = "var s = 2;\nx += s;\nif (x > room_speed) { x = 0; }";
    lint(&index, &mut handler, text, LintMode::Full);
    let first = index.read().contribution(handler.uri()).cloned();
    lint(&index, &mut handler, text, LintMode::Full);
    let second = index.read().contribution(handler.uri()).cloned();
    assert_eq!(first, second);
}

#[test]
fn test_partial_pass_selection() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_a", "Step_0");
    handler.set_input("hp = 1;\nmissing();");
    let ticket = index.begin_cycle(handler.uri());
    let outcome = run_lint_cycle(
        &mut handler,
        &index,
        &ticket,
        SemanticsOption::VARIABLE,
        LintMode::Full,
    );
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(index.read().variable_sites("hp").len(), 1);

    // A cycle without the doc pass leaves the script signature in place.
    index
        .write()
        .create_script("scr_log", script_uri("scr_log"))
        .unwrap();
    let mut script = script_handler("scr_log");
    let text = "/// @param msg\nshow_debug_message(msg);";
    lint(&index, &mut script, text, LintMode::Full);
    let label = || index.read().resolve_signature("scr_log").map(|s| s.label);
    assert_eq!(label(), Some("scr_log(msg)".to_string()));

    script.set_input(text);
    let ticket = index.begin_cycle(script.uri());
    run_lint_cycle(&mut script, &index, &ticket, SemanticsOption::VARIABLE, LintMode::Full);
    assert_eq!(label(), Some("scr_log(msg)".to_string()));
}

#[test]
fn test_stale_cycle_is_not_committed() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut handler = event_handler("obj_a", "Create_0");
    let older = index.begin_cycle(handler.uri());
    let newer = index.begin_cycle(handler.uri());

    handler.set_input("fresh = 1;");
    let outcome = run_lint_cycle(&mut handler, &index, &newer, SemanticsOption::ALL, LintMode::Full);
    assert!(!outcome.stale);

    handler.set_input("old = 1;");
    let outcome = run_lint_cycle(&mut handler, &index, &older, SemanticsOption::ALL, LintMode::Full);
    assert!(outcome.stale);

    let reference = index.read();
    assert_eq!(reference.variable_sites("fresh").len(), 1);
    assert!(reference.variable_sites("old").is_empty());
}
