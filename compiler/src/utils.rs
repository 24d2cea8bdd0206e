use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_IDENTIFIER: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

const KEYWORDS: [&str; 51] = [
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while",
];

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Renders `text` as a Rust string literal.
pub fn str_literal(text: &str) -> String {
    format!("{:?}", text)
}

/// Splits an identifier into lowercase words at underscores and case
/// boundaries. Runs of capitals stay together unless the last one starts a
/// new word (`HTTPRequest` becomes `http`, `request`).
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for part in s.split(|c: char| !c.is_alphanumeric()).filter(|p| !p.is_empty()) {
        let chars: Vec<char> = part.chars().collect();
        let mut word = String::new();
        for i in 0..chars.len() {
            let c = chars[i];
            if c.is_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
                if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                    words.push(std::mem::take(&mut word));
                }
            }
            word.extend(c.to_lowercase());
        }
        if !word.is_empty() {
            words.push(word);
        }
    }
    words
}

/// Converts a protobuf name to UpperCamelCase the way prost names types.
pub fn to_pascal_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// Converts a protobuf name to snake_case the way prost names modules.
pub fn to_snake_case(s: &str) -> String {
    words(s).join("_")
}

/// Escapes Rust keywords. `self`, `super`, `crate` and `Self` cannot be raw
/// identifiers and get a trailing underscore instead.
pub fn escape_rust_keyword(s: &str) -> String {
    match s {
        "self" | "super" | "crate" | "Self" => format!("{}_", s),
        _ if KEYWORDS.contains(&s) => format!("r#{}", s),
        _ => s.to_string(),
    }
}

/// Replaces anything that cannot appear in an identifier with `_`.
pub fn sanitize_identifier(s: &str) -> String {
    let cleaned = NON_IDENTIFIER.replace_all(s, "_").into_owned();
    match cleaned.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        None => "_".to_string(),
        _ => cleaned,
    }
}

/// Module path of a protobuf package, mirroring prost's one-module-per-segment
/// layout (`foo.bar_baz.v1` under `crate` is `crate::foo::bar_baz::v1`).
pub fn package_module_path(root: &str, package: &str) -> String {
    let mut segments = vec![root.to_string()];
    segments.extend(
        package
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| escape_rust_keyword(&to_snake_case(s))),
    );
    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("SayHello"), "say_hello");
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_snake_case("sessionID"), "session_id");
        assert_eq!(to_snake_case("GetV2Thing"), "get_v2_thing");
        assert_eq!(to_pascal_case("hello_request"), "HelloRequest");
        assert_eq!(to_pascal_case("HTTPRequest"), "HttpRequest");
        assert_eq!(to_pascal_case("HelloReply"), "HelloReply");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(escape_rust_keyword("type"), "r#type");
        assert_eq!(escape_rust_keyword("self"), "self_");
        assert_eq!(escape_rust_keyword("greeter"), "greeter");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("hello-world.v1"), "hello_world_v1");
        assert_eq!(sanitize_identifier("3d"), "_3d");
    }

    #[test]
    fn test_package_module_path() {
        assert_eq!(package_module_path("crate", "common.v1"), "crate::common::v1");
        assert_eq!(package_module_path("crate", ""), "crate");
        assert_eq!(package_module_path("::apis", "acme.Type"), "::apis::acme::r#type");
    }

    #[test]
    fn test_literals() {
        assert_eq!(str_literal("/v1/{name}"), "\"/v1/{name}\"");
        assert_eq!(quote("x"), "\"x\"");
    }
}
