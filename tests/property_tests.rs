#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests for route path assembly and import specifiers

use edgeroute::paths::{import_specifier, join_route_path, normalize_route_path};
use proptest::prelude::*;
use std::path::PathBuf;

fn segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z:/*_-]{0,12}").expect("valid regex")
}

fn module_dir() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..4)
}

proptest! {
    #[test]
    fn joined_paths_are_normalized(
        prefix in segment(),
        base in segment(),
        method in segment(),
    ) {
        let path = join_route_path(&[&prefix, &base, &method]);
        prop_assert!(path.starts_with('/'));
        prop_assert!(!path.contains("//"));
        prop_assert_eq!(normalize_route_path(&path), path.clone());
    }

    #[test]
    fn joining_keeps_every_non_slash_character(
        prefix in segment(),
        base in segment(),
        method in segment(),
    ) {
        let path = join_route_path(&[&prefix, &base, &method]);
        let strip = |s: &str| s.chars().filter(|c| *c != '/').collect::<String>();
        prop_assert_eq!(strip(&path), strip(&format!("{prefix}{base}{method}")));
    }

    #[test]
    fn import_specifiers_are_relative_and_extensionless(
        from in module_dir(),
        to in module_dir(),
        stem in "[a-z]{1,8}",
    ) {
        let root = PathBuf::from("/project");
        let from_dir = from.iter().fold(root.clone(), |p, s| p.join(s));
        let module = to.iter().fold(root, |p, s| p.join(s)).join(format!("{stem}.ts"));

        let specifier = import_specifier(&from_dir, &module);
        prop_assert!(specifier.starts_with("./") || specifier.starts_with("../"), "{}", specifier);
        prop_assert!(!specifier.ends_with(".ts"));
        prop_assert!(!specifier.contains('\\'));
        let expected_suffix = format!("/{}", stem);
        prop_assert!(specifier.ends_with(&expected_suffix), "{}", specifier);
    }
}
