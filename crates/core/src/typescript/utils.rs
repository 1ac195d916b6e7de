//! Common utilities for TypeScript code generation.
//!
//! Identifier checks, quoting and escaping shared by the emitter and the
//! generators.

/// Words that cannot name a generated type, enum or function. Sorted.
const RESERVED_WORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in",
    "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` is a TypeScript reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

/// True when a field name cannot be written as `obj.name` or as a bare object
/// key: empty, leading digit, or anything outside `[A-Za-z0-9_$]`.
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` can be used as a declared TypeScript name (type, function, enum).
pub fn is_valid_identifier(name: &str) -> bool {
    !needs_bracket_notation(name) && !is_reserved_word(name)
}

/// Escape a string for use in JavaScript/TypeScript string literals.
/// Escapes backslashes, double quotes and line breaks.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Escape a string for use inside a template literal.
pub fn escape_template_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Property or enum key: bare when possible, otherwise a quoted string.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Format a member access expression (e.g., `root.foo` or `root["foo-bar"]`).
pub fn format_member_access(obj: &str, prop: &str) -> String {
    if needs_bracket_notation(prop) {
        format!("{obj}[\"{}\"]", escape_js_string(prop))
    } else {
        format!("{obj}.{prop}")
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a snake_case handler name to camelCase (`get_users_for_org` -> `getUsersForOrg`).
pub fn snake_to_camel(s: &str) -> String {
    let mut result = String::new();
    for (i, part) in s.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            result.push_str(part);
        } else {
            result.push_str(&capitalize_first(part));
        }
    }
    result
}
