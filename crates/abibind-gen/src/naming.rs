//! Identifier conversion and disambiguation

use std::collections::HashSet;

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Rust keywords (strict, reserved and edition-2018+)
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Keep ASCII alphanumerics and underscores only
fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn escape(mut ident: String, fallback: &str) -> String {
    if ident.is_empty() {
        return fallback.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_keyword(&ident) {
        ident.push('_');
    }
    ident
}

/// `setABI` -> `set_abi`, keywords get a trailing underscore
pub fn snake_ident(name: &str, fallback: &str) -> String {
    escape(sanitize(name).to_snake_case(), fallback)
}

/// `ENSRegistry` -> `EnsRegistry`
pub fn camel_ident(name: &str, fallback: &str) -> String {
    escape(sanitize(name).to_upper_camel_case(), fallback)
}

/// A set of taken identifiers.
///
/// [`Namespace::claim`] hands out the bare name first and appends `0`, `1`,
/// ... on later clashes, skipping any suffix already taken. Assignment order
/// is the order of calls.
#[derive(Debug, Default, Clone)]
pub struct Namespace {
    taken: HashSet<String>,
}

impl Namespace {
    /// Namespace with `names` already taken
    pub fn with_reserved<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: names.into_iter().map(str::to_string).collect(),
        }
    }

    /// Mark `name` as taken
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Whether `name` is taken
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Take `base`, or the first free `base{i}`
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut i = 0usize;
        loop {
            let candidate = format!("{}{}", base, i);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_ident() {
        assert_eq!(snake_ident("setABI", "f"), "set_abi");
        assert_eq!(snake_ident("supportsInterface", "f"), "supports_interface");
        assert_eq!(snake_ident("MIN_REGISTRATION_DURATION", "f"), "min_registration_duration");
        assert_eq!(snake_ident("_owner", "f"), "owner");
        assert_eq!(snake_ident("type", "f"), "type_");
        assert_eq!(snake_ident("self", "f"), "self_");
        assert_eq!(snake_ident("", "field0"), "field0");
    }

    #[test]
    fn test_camel_ident() {
        assert_eq!(camel_ident("ENSRegistry", "C"), "EnsRegistry");
        assert_eq!(camel_ident("ETHRegistrarController", "C"), "EthRegistrarController");
        assert_eq!(camel_ident("Price", "C"), "Price");
        assert_eq!(camel_ident("self", "C"), "Self_");
    }

    #[test]
    fn test_claim_in_order() {
        let mut ns = Namespace::default();
        assert_eq!(ns.claim("foo"), "foo");
        assert_eq!(ns.claim("foo"), "foo0");
        assert_eq!(ns.claim("foo"), "foo1");
    }

    #[test]
    fn test_claim_skips_taken_suffix() {
        let mut ns = Namespace::default();
        assert_eq!(ns.claim("foo"), "foo");
        assert_eq!(ns.claim("foo0"), "foo0");
        assert_eq!(ns.claim("foo"), "foo1");
    }

    #[test]
    fn test_reserved_names() {
        let mut ns = Namespace::with_reserved(["new", "address"]);
        assert!(ns.contains("new"));
        assert_eq!(ns.claim("address"), "address0");
    }
}
