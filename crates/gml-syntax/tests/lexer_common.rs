use gml_syntax::lexer::{lex_with_text, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex_with_text(source)
        .into_iter()
        .map(|(token, _)| token.kind)
        .filter(|kind| !kind.is_trivia())
        .collect()
}

#[test]
fn test_statement_tokens() {
    assert_eq!(
        kinds("if (hp <= 0) instance_destroy();"),
        vec![
            TokenKind::KwIf,
            TokenKind::LParen,
            TokenKind::Ident,
            TokenKind::LtEq,
            TokenKind::RealLiteral,
            TokenKind::RParen,
            TokenKind::Ident,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_texts_cover_source() {
    let source = "/* c */ var s = \"a b\"; // end";
    let joined: String = lex_with_text(source).into_iter().map(|(_, text)| text).collect();
    assert_eq!(joined, source);
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("iffy doing variance"), vec![TokenKind::Ident; 3]);
}
