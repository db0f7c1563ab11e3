mod common;
use common::*;
use expect_test::expect;

#[test]
fn test_var_statement_tree() {
    expect![[r#"
        SourceFile@0..10
          VarStmt@0..10
            KwVar@0..3 "var"
            VarDeclarator@4..9
              Name@4..5
                Ident@4..5 "x"
              Assign@6..7 "="
              Literal@8..9
                RealLiteral@8..9 "1"
            Semicolon@9..10 ";"
    "#]]
    .assert_eq(&snapshot_parse("var x = 1;"));
}

#[test]
fn test_var_with_multiple_declarators() {
    let root = parse_ok("var a = 1, b, c := 3");
    let declarators = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::VarDeclarator)
        .count();
    assert_eq!(declarators, 3);
}

#[test]
fn test_globalvar_and_enum() {
    let kinds = node_kinds("globalvar score, lives;\nenum Dir { Up, Down = 2, }");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::GlobalVarStmt,
            SyntaxKind::Name,
            SyntaxKind::Name,
            SyntaxKind::EnumDecl,
            SyntaxKind::Name,
            SyntaxKind::EnumMember,
            SyntaxKind::Name,
            SyntaxKind::EnumMember,
            SyntaxKind::Name,
            SyntaxKind::Literal,
        ]
    );
}

#[test]
fn test_macro_line_is_a_declaration() {
    let root = parse_ok("#macro MAX_HP 100\nhp = MAX_HP");
    let first = root.first_child().unwrap();
    assert_eq!(first.kind(), SyntaxKind::MacroDecl);
    assert_eq!(first.text(), "#macro MAX_HP 100");
}

#[test]
fn test_if_with_then_and_else() {
    parse_ok("if x > 0 then y = 1 else y = 2");
    let kinds = node_kinds("if (a) { b() } else if (c) d++; else exit;");
    assert_eq!(kinds[0], SyntaxKind::IfStmt);
    assert!(kinds.contains(&SyntaxKind::ElseBranch));
    assert!(kinds.contains(&SyntaxKind::PostfixExpr));
    assert!(kinds.contains(&SyntaxKind::ExitStmt));
}

#[test]
fn test_loops() {
    parse_ok("while (i < 10) i += 1;");
    parse_ok("do { i-- } until (i <= 0)");
    parse_ok("for (var i = 0; i < 10; i++) { total += i; }");
    parse_ok("for (;;) break;");
    parse_ok("repeat (3) instance_create(x, y, obj_spark)");
    let kinds = node_kinds("with (obj_enemy) { hp -= 1; continue }");
    assert_eq!(kinds[0], SyntaxKind::WithStmt);
    assert!(kinds.contains(&SyntaxKind::ContinueStmt));
}

#[test]
fn test_switch() {
    let root = parse_ok(
        r#"switch (state) {
    case 0:
    case 1: speed = 2; break;
    default:
        speed = 0
}"#,
    );
    let cases = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::CaseClause)
        .count();
    let defaults = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::DefaultClause)
        .count();
    assert_eq!((cases, defaults), (2, 1));
}

#[test]
fn test_return_with_and_without_value() {
    let kinds = node_kinds("return;\nreturn a + b");
    assert_eq!(kinds[0], SyntaxKind::ReturnStmt);
    assert_eq!(kinds[1], SyntaxKind::ReturnStmt);
    assert_eq!(kinds[2], SyntaxKind::BinaryExpr);
}

#[test]
fn test_assignment_forms() {
    for source in [
        "a = 1",
        "a := 1",
        "a += 1",
        "a -= 1",
        "a *= 2",
        "a /= 2",
        "a |= 1",
        "a &= 1",
        "a ^= 1",
        "self.a = 1",
        "global.score = 0",
        "list[| 0] = 1",
        "map[? \"k\"] = 1",
        "grid[# 1, 2] = 1",
        "arr[@ 3] = 1",
        "arr[1, 2] = 0",
    ] {
        let root = parse_ok(source);
        assert_eq!(
            root.first_child().map(|n| n.kind()),
            Some(SyntaxKind::AssignStmt),
            "{source}"
        );
    }
}

#[test]
fn test_equals_in_condition_is_comparison() {
    let root = parse_ok("if (a = 1) b = a = 2");
    let binaries = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::BinaryExpr)
        .count();
    assert_eq!(binaries, 2);
    let assigns = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::AssignStmt)
        .count();
    assert_eq!(assigns, 1);
}

#[test]
fn test_doc_comments_stay_in_tree() {
    let root = parse_ok("/// @param a\n/// @param b\nreturn a + b;");
    let docs = root
        .descendants_with_tokens()
        .filter(|e| e.kind() == SyntaxKind::DocComment)
        .count();
    assert_eq!(docs, 2);
}

#[test]
fn test_function_declaration() {
    let kinds = node_kinds("function add(a, b = 1) {\n    return a + b;\n}");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::FunctionDecl,
            SyntaxKind::Name,
            SyntaxKind::ParamList,
            SyntaxKind::Name,
            SyntaxKind::Name,
            SyntaxKind::Literal,
            SyntaxKind::Block,
            SyntaxKind::ReturnStmt,
            SyntaxKind::BinaryExpr,
            SyntaxKind::NameRef,
            SyntaxKind::NameRef,
        ]
    );
}

#[test]
fn test_function_literal_and_constructor() {
    let root = parse_ok("on_hit = function(damage) { hp -= damage; };");
    let assign = root.first_child().unwrap();
    assert_eq!(assign.kind(), SyntaxKind::AssignStmt);
    assert!(assign
        .children()
        .any(|child| child.kind() == SyntaxKind::FunctionExpr));

    parse_ok("function Vec2(x, y) constructor {\n    self.x = x;\n    self.y = y;\n}");
}

#[test]
fn test_function_without_body_is_an_error() {
    assert_eq!(
        first_error("function broken(a)"),
        Some("expected function body".to_string())
    );
}
