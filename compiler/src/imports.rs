//! The per-file alias table for types imported from other packages.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;

use crate::types::Import;
use crate::utils::{escape_rust_keyword, package_module_path};

pub const PATH_SEPARATOR: &str = "::";

lazy_static! {
    /// Dependency paths that resolve to an equivalent well-known location
    /// before an alias is assigned.
    pub static ref CANONICAL_PATHS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("crate::google::protobuf", "::prost_types");
        m.insert("::pbjson_types", "::prost_types");
        m
    };

    /// Proto packages whose Rust types live in a fixed crate rather than
    /// under the module root.
    pub static ref CANONICAL_PACKAGES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("google.protobuf", "::prost_types");
        m
    };
}

/// Dependency path of `package` for a given module root.
pub fn dependency_path(module_root: &str, package: &str) -> String {
    match CANONICAL_PACKAGES.get(package) {
        Some(path) => path.to_string(),
        None => package_module_path(module_root, package),
    }
}

pub fn canonicalize(path: &str) -> &str {
    CANONICAL_PATHS.get(path).copied().unwrap_or(path)
}

/// The alias of an already canonical path: the last two segments run
/// together, or the whole path when it has a single segment.
///
/// Distinct paths ending in the same two segments share an alias. Raw
/// identifier prefixes are dropped before joining (`google::r#type` gives
/// `googletype`).
pub fn derive_alias(path: &str) -> String {
    let parts: Vec<&str> = path
        .split(PATH_SEPARATOR)
        .map(|part| part.trim_start_matches("r#"))
        .collect();
    let alias = if parts.len() < 2 {
        parts.concat()
    } else {
        parts[parts.len() - 2..].concat()
    };
    escape_rust_keyword(&alias)
}

/// Maps dependency paths to the short alias they are imported under. One
/// resolver lives for exactly one output file; entries are never removed.
#[derive(Debug, Default, Clone)]
pub struct ImportResolver {
    table: BTreeMap<String, String>,
}

impl ImportResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alias of `path`, assigning one on first sight.
    pub fn register(&mut self, path: &str) -> String {
        let path = canonicalize(path);
        if let Some(alias) = self.table.get(path) {
            return alias.clone();
        }
        let alias = derive_alias(path);
        self.table.insert(path.to_string(), alias.clone());
        alias
    }

    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.table.get(canonicalize(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The table as import declarations, sorted by path.
    pub fn imports(&self) -> Vec<Import> {
        self.table
            .iter()
            .map(|(path, alias)| Import {
                path:  path.clone(),
                alias: alias.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_is_last_two_segments() {
        let mut imports = ImportResolver::new();
        assert_eq!(imports.register("crate::common::v1"), "commonv1");
        assert_eq!(imports.register("standalone"), "standalone");
        assert_eq!(imports.lookup("crate::common::v1"), Some("commonv1"));
        assert_eq!(imports.lookup("crate::other::v1"), None);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut imports = ImportResolver::new();
        let first = imports.register("crate::billing::v2");
        let second = imports.register("crate::billing::v2");
        assert_eq!(first, second);
        assert_eq!(imports.len(), 1);
    }

    #[test]
    fn test_suffix_collision_is_kept() {
        let mut imports = ImportResolver::new();
        let a = imports.register("crate::acme::billing::v1");
        let b = imports.register("crate::globex::billing::v1");
        assert_eq!(a, "billingv1");
        assert_eq!(a, b);
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn test_canonicalization() {
        let mut modern = ImportResolver::new();
        let mut legacy = ImportResolver::new();
        assert_eq!(modern.register("crate::google::protobuf"), legacy.register("::prost_types"));
        assert_eq!(modern.register("::pbjson_types"), "prost_types");
        assert_eq!(modern.len(), 1);
        assert_eq!(modern.lookup("crate::google::protobuf"), Some("prost_types"));
    }

    #[test]
    fn test_alias_of_keyword_segment() {
        let mut imports = ImportResolver::new();
        assert_eq!(imports.register("crate::google::r#type"), "googletype");
        assert_eq!(imports.register("crate::pb::r#type::r#mod"), "typemod");
        assert_eq!(derive_alias("r#match"), "r#match");
    }

    #[test]
    fn test_dependency_path_canonicalizes_packages() {
        assert_eq!(dependency_path("crate", "google.protobuf"), "::prost_types");
        assert_eq!(dependency_path("crate::pb", "google.protobuf"), "::prost_types");
        assert_eq!(dependency_path("crate::pb", "google.type"), "crate::pb::google::r#type");
        assert_eq!(dependency_path("crate::pb", "common.v1"), "crate::pb::common::v1");
    }

    #[test]
    fn test_imports_are_sorted_by_path() {
        let mut imports = ImportResolver::new();
        imports.register("crate::zeta::v1");
        imports.register("crate::alpha::v1");
        let paths: Vec<String> = imports.imports().into_iter().map(|i| i.path).collect();
        assert_eq!(paths, vec!["crate::alpha::v1", "crate::zeta::v1"]);
    }
}
