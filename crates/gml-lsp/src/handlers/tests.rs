use super::*;
use crate::indexer::index_workspace;
use crate::state::ServerState;
use crate::test_support::{test_client, write_project};
use expect_test::expect;
use tower_lsp::lsp_types::*;

fn position_at(source: &str, needle: &str) -> Position {
    let offset = source
        .find(needle)
        .unwrap_or_else(|| panic!("missing needle '{needle}'"));
    super::lsp_utils::offset_to_position(source, offset as u32)
}

fn end_of(source: &str) -> Position {
    super::lsp_utils::offset_to_position(source, source.len() as u32)
}

fn script_uri(name: &str) -> Url {
    Url::parse(&format!("file:///game/scripts/{name}/{name}.gml")).unwrap()
}

fn text_position(uri: &Url, position: Position) -> TextDocumentPositionParams {
    TextDocumentPositionParams {
        text_document: TextDocumentIdentifier { uri: uri.clone() },
        position,
    }
}

fn hover_params(uri: &Url, position: Position) -> HoverParams {
    HoverParams {
        text_document_position_params: text_position(uri, position),
        work_done_progress_params: Default::default(),
    }
}

async fn open(client: &tower_lsp::Client, state: &ServerState, uri: &Url, text: &str) {
    did_open(
        client,
        state,
        DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "gml".to_string(),
                version: 1,
                text: text.to_string(),
            },
        },
    )
    .await;
}

/// A ready server without a workspace folder: only the bundled manual.
async fn ready_state(client: &tower_lsp::Client) -> ServerState {
    let state = ServerState::new();
    index_workspace(client, &state).await;
    assert!(state.index().is_ready());
    state
}

fn hover_value(hover: Hover) -> String {
    match hover.contents {
        HoverContents::Markup(markup) => markup.value,
        other => panic!("unexpected hover contents: {other:?}"),
    }
}

#[tokio::test]
async fn lsp_hover_is_null_until_indexed() {
    let client = test_client();
    let state = ServerState::new();
    let uri = script_uri("scr_a");
    let source = "show_debug_message(1);\n";
    open(&client, &state, &uri, source).await;

    let position = position_at(source, "show_debug");
    assert!(hover(&state, hover_params(&uri, position)).is_none());

    index_workspace(&client, &state).await;
    let value = hover_value(hover(&state, hover_params(&uri, position)).expect("hover"));
    assert!(value.contains("show_debug_message"), "{value}");
}

#[tokio::test]
async fn lsp_hover_macro() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_config");
    let source = "#macro MAX_HP 100\nhp = MAX_HP;\n";
    open(&client, &state, &uri, source).await;

    let result = hover(&state, hover_params(&uri, position_at(source, "MAX_HP;")))
        .expect("hover");
    assert_eq!(
        result.range,
        Some(Range {
            start: Position::new(1, 5),
            end: Position::new(1, 11),
        })
    );
    expect![[r#"
        ```gml
        #macro MAX_HP 100
        ```"#]]
    .assert_eq(&hover_value(result));
}

#[tokio::test]
async fn lsp_open_before_ready_is_linted_after_indexing() {
    let client = test_client();
    let root = write_project(
        "gml-lsp-deferred",
        &[
            ("gml-tools.toml", "[indexing]\ncache_enabled = false\n"),
            ("scripts/scr_a/scr_a.gml", "disk_only = 1;\n"),
        ],
    );
    let state = ServerState::new();
    state.set_workspace_folders(vec![Url::from_directory_path(&root).unwrap()]);

    let uri = Url::from_file_path(root.join("scripts/scr_a/scr_a.gml")).unwrap();
    let source = "var editor_only = 1;\n";
    open(&client, &state, &uri, source).await;
    assert!(state.get_document(&uri).unwrap().dirty);

    index_workspace(&client, &state).await;

    let doc = state.get_document(&uri).unwrap();
    assert_eq!(doc.content, source);
    assert!(!doc.dirty);
    assert!(doc.parse.is_some());
    let reference = state.index().read();
    let index_uri = crate::state::to_index_uri(&uri);
    assert_eq!(reference.resolve_local(&index_uri, "editor_only").len(), 1);
    assert!(reference.variable_sites("disk_only").is_empty());
    assert!(reference.script_get_package("scr_a").is_some());
    drop(reference);
    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn lsp_completion_includes_document_locals() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_counter");
    let source = "var counter = 1;\nshow_debug_message(co);\n";
    open(&client, &state, &uri, source).await;

    let mut position = position_at(source, "co);");
    position.character += 2;
    let response = completion(
        &state,
        CompletionParams {
            text_document_position: text_position(&uri, position),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        },
    )
    .expect("completion");
    let CompletionResponse::Array(items) = response else {
        panic!("expected completion array");
    };
    let counter = items
        .iter()
        .find(|item| item.label == "counter")
        .expect("local completion");
    assert_eq!(counter.kind, Some(CompletionItemKind::VARIABLE));
    assert!(items.iter().all(|item| item.label.starts_with("co")));
}

#[tokio::test]
async fn lsp_signature_help_tracks_active_parameter() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_spawn");
    let source = "instance_create_layer(1, 2, ";
    open(&client, &state, &uri, source).await;

    let help = signature_help(
        &state,
        SignatureHelpParams {
            context: None,
            text_document_position_params: text_position(&uri, end_of(source)),
            work_done_progress_params: Default::default(),
        },
    )
    .expect("signature help");
    assert_eq!(help.active_parameter, Some(2));
    assert!(help.signatures[0].label.starts_with("instance_create_layer("));
    assert!(help.signatures[0].parameters.as_ref().unwrap().len() >= 3);
}

#[tokio::test]
async fn lsp_goto_definition_of_script() {
    let client = test_client();
    let state = ready_state(&client).await;
    let callee = script_uri("scr_target");
    let caller = script_uri("scr_caller");
    open(&client, &state, &callee, "return 1;\n").await;
    let source = "var v = scr_target();\n";
    open(&client, &state, &caller, source).await;

    let response = goto_definition(
        &state,
        GotoDefinitionParams {
            text_document_position_params: text_position(&caller, position_at(source, "scr_target")),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        },
    )
    .expect("definition");
    let GotoDefinitionResponse::Scalar(location) = response else {
        panic!("expected a single location");
    };
    assert_eq!(location.uri, callee);
    assert_eq!(location.range.start, Position::new(0, 0));
}

#[tokio::test]
async fn lsp_goto_definition_prefers_local() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_shadow");
    let source = "var total = 0;\ntotal += 1;\n";
    open(&client, &state, &uri, source).await;

    let response = goto_definition(
        &state,
        GotoDefinitionParams {
            text_document_position_params: text_position(&uri, position_at(source, "total +=")),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        },
    )
    .expect("definition");
    let GotoDefinitionResponse::Scalar(location) = response else {
        panic!("expected a single location");
    };
    assert_eq!(location.uri, uri);
    assert_eq!(location.range.start, Position::new(0, 4));
}

#[tokio::test]
async fn lsp_references_of_macro() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_limits");
    let source = "#macro LIMIT 3\na = LIMIT;\nb = LIMIT;\n";
    open(&client, &state, &uri, source).await;

    let params = |include_declaration| ReferenceParams {
        text_document_position: text_position(&uri, position_at(source, "LIMIT;")),
        work_done_progress_params: Default::default(),
        partial_result_params: Default::default(),
        context: ReferenceContext {
            include_declaration,
        },
    };
    let all = references(&state, params(true)).expect("references");
    assert_eq!(all.len(), 3);
    let uses = references(&state, params(false)).expect("references");
    assert_eq!(uses.len(), 2);
    assert!(uses.iter().all(|location| location.range.start.line > 0));
}

#[tokio::test]
async fn lsp_change_replaces_contribution() {
    let client = test_client();
    let state = ready_state(&client).await;
    let uri = script_uri("scr_edit");
    open(&client, &state, &uri, "var x = 1;\n").await;

    did_change(
        &client,
        &state,
        DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: Some(Range {
                    start: Position::new(0, 4),
                    end: Position::new(0, 5),
                }),
                range_length: None,
                text: "y".to_string(),
            }],
        },
    )
    .await;

    let index_uri = crate::state::to_index_uri(&uri);
    let reference = state.index().read();
    assert!(reference.resolve_local(&index_uri, "x").is_empty());
    assert_eq!(reference.resolve_local(&index_uri, "y").len(), 1);
    drop(reference);
    assert_eq!(state.get_document(&uri).unwrap().version, 2);
}
