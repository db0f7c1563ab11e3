//! Identifier validation helpers for GameMaker resources.

/// Returns true if `name` is usable as a script or object name:
/// an ASCII letter or underscore followed by letters, digits or underscores.
#[must_use]
pub fn is_valid_resource_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Returns true if the identifier is a GML keyword.
#[must_use]
pub fn is_reserved_keyword(name: &str) -> bool {
    matches!(
        name,
        "var"
            | "globalvar"
            | "if"
            | "then"
            | "else"
            | "while"
            | "do"
            | "until"
            | "for"
            | "repeat"
            | "with"
            | "switch"
            | "case"
            | "default"
            | "break"
            | "continue"
            | "exit"
            | "return"
            | "enum"
            | "function"
            | "and"
            | "or"
            | "xor"
            | "not"
            | "div"
            | "mod"
            | "true"
            | "false"
            | "self"
            | "other"
            | "all"
            | "noone"
            | "global"
    )
}
