mod common;
use common::*;

use gml_hir::line_index::LineCol;
use gml_hir::reference::Reference;
use gml_hir::snapshot::{content_hash, SerializedIndex};
use gml_hir::symbols::{Contribution, Location, VariableRecord};

fn contribution(uri: &Uri, names: &[&str]) -> Contribution {
    Contribution {
        variables: names
            .iter()
            .enumerate()
            .map(|(line, name)| VariableRecord {
                name: (*name).into(),
                scope: ScopeKind::Instance,
                location: Location::new(
                    uri.clone(),
                    LineCol::new(line as u32, 0),
                    LineCol::new(line as u32, name.len() as u32),
                ),
            })
            .collect(),
        ..Contribution::default()
    }
}

#[test]
fn test_readers_never_see_mixed_contributions() {
    let index = SymbolIndex::default();
    let uri = event_uri("obj_a", "Step_0");
    let old = ["alpha", "beta", "gamma"];
    let new = ["delta", "epsilon", "zeta"];
    index.commit(
        &index.begin_cycle(&uri),
        CommitRequest {
            contribution: Some(contribution(&uri, &old)),
            ..CommitRequest::default()
        },
    );

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..500 {
                let names: &[&str] = if round % 2 == 0 { &new } else { &old };
                let ticket = index.begin_cycle(&uri);
                index.commit(
                    &ticket,
                    CommitRequest {
                        contribution: Some(contribution(&uri, names)),
                        ..CommitRequest::default()
                    },
                );
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..500 {
                    let reference = index.read();
                    let present: Vec<bool> = old
                        .iter()
                        .chain(new.iter())
                        .map(|name| !reference.variable_sites(name).is_empty())
                        .collect();
                    let all_old = present[..3].iter().all(|p| *p) && present[3..].iter().all(|p| !*p);
                    let all_new = present[..3].iter().all(|p| !*p) && present[3..].iter().all(|p| *p);
                    assert!(all_old || all_new, "mixed view: {present:?}");
                }
            });
        }
    });
}

#[test]
fn test_clear_contribution_removes_every_record_of_uri() {
    let index = index_in(WorkspaceIndexState::Ready);
    let mut create = event_handler("obj_a", "Create_0");
    let mut other = event_handler("obj_b", "Create_0");
    lint(
        &index,
        &mut create,
        "#macro MAX_HP 10\nhp = MAX_HP;\nglobal.count = 0;\nvar t = hp;",
        LintMode::Full,
    );
    lint(&index, &mut other, "hp = 5;", LintMode::Full);

    let uri = create.uri().clone();
    index.write().clear_contribution(&uri);

    let reference = index.read();
    for name in ["MAX_HP", "hp", "count", "t"] {
        assert!(
            reference.variable_sites(name).iter().all(|site| site.uri() != &uri),
            "{name} still declared"
        );
        assert!(
            reference
                .list_references(name)
                .iter()
                .all(|location| location.uri != uri),
            "{name} still referenced"
        );
    }
    assert!(reference.macro_get("MAX_HP").is_none());
    assert_eq!(reference.variable_sites("hp").len(), 1);
}

#[test]
fn test_queries_report_not_ready_until_indexed() {
    let index = index_in(WorkspaceIndexState::Indexing);
    let mut handler = script_handler("scr_a");
    lint(&index, &mut handler, "globalvar score;", LintMode::Bootstrap);

    assert_eq!(index.exists("score"), IndexQuery::NotReady);
    assert_eq!(index.resolve_definition("score"), IndexQuery::NotReady);
    assert_eq!(index.resolve_signature("irandom"), IndexQuery::NotReady);
    assert_eq!(index.list_references("score"), IndexQuery::NotReady);
    assert_eq!(index.hover_text("score", 1), IndexQuery::NotReady);
    assert_eq!(index.completions("sc"), IndexQuery::NotReady);

    index.advance(WorkspaceIndexState::Ready);
    assert_eq!(index.exists("score"), IndexQuery::Ready(true));
    let definitions = index.resolve_definition("score").ready().unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].start, LineCol::new(0, 10));
    assert!(index
        .completions("sc")
        .ready()
        .unwrap()
        .iter()
        .any(|entry| entry.label == "score"));
}

#[test]
fn test_snapshot_round_trip_preserves_exists() {
    let index = index_in(WorkspaceIndexState::Ready);
    {
        let mut reference = index.write();
        reference
            .create_script("scr_move", script_uri("scr_move"))
            .unwrap();
        reference.create_object("obj_player").unwrap();
        reference
            .object_add_event("obj_player", event_uri("obj_player", "Create_0"))
            .unwrap();
    }
    let mut script = script_handler("scr_move");
    let script_text = "/// scr_move(dx, dy)\n#macro STEP 4\nglobalvar moves;";
    lint(&index, &mut script, script_text, LintMode::Full);
    let mut create = event_handler("obj_player", "Create_0");
    lint(&index, &mut create, "hp = 3;\nglobal.lives = 2;", LintMode::Full);

    let json = index.read().snapshot_for_shutdown().to_json().unwrap();
    let snapshot = SerializedIndex::from_json(&json).unwrap();
    let mut restored = Reference::from_snapshot(snapshot).unwrap();
    restored.seed_builtins(Manual::from_markdown(MANUAL).unwrap());

    let original = index.read();
    for name in [
        "scr_move",
        "obj_player",
        "STEP",
        "moves",
        "lives",
        "hp",
        "irandom",
        "room_speed",
        "missing",
    ] {
        assert_eq!(restored.exists(name), original.exists(name), "{name}");
    }
    assert_eq!(
        restored.resolve_signature("scr_move").map(|s| s.label),
        Some("scr_move(dx, dy)".to_string())
    );
    assert_eq!(
        restored.content_hash(script.uri()),
        Some(content_hash(script_text))
    );
    assert_eq!(
        restored
            .object_get("obj_player")
            .map(|object| object.event_uris.len()),
        Some(1)
    );
    assert_eq!(restored.list_references("hp").len(), 1);
}
