//! # Path Helpers
//!
//! Two kinds of path show up while generating dispatch code:
//!
//! - **Route paths** - the URL pattern a route is registered under, assembled from
//!   the controller prefix, the base-path prefix and the method path.
//! - **Import specifiers** - the module path written into an `import` statement,
//!   relative to the directory of the generated file.
//!
//! Both are computed lexically. Nothing here touches the filesystem, so the same
//! input tree always yields the same output regardless of symlinks or the
//! current working directory.

use std::path::{Component, Path, PathBuf};

/// Join route path segments and normalize the result.
///
/// Segments are concatenated in the order given (controller prefix, base
/// prefix, method path), every run of `/` is collapsed to a single `/`, and a
/// leading `/` is added when missing. The result is never empty.
///
/// ```
/// use edgeroute::paths::join_route_path;
///
/// assert_eq!(join_route_path(&["/users/", "", "/list"]), "/users/list");
/// assert_eq!(join_route_path(&["api", "v1", "items"]), "/apiv1items");
/// assert_eq!(join_route_path(&["", "", ""]), "/");
/// ```
pub fn join_route_path(segments: &[&str]) -> String {
    let joined: String = segments.concat();
    normalize_route_path(&joined)
}

/// Collapse repeated `/` and guarantee exactly one leading `/`.
pub fn normalize_route_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    out.push('/');
    for ch in raw.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// preceding normal components.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Compute the path of `target` relative to the directory `from_dir`.
///
/// Both paths must be expressed against the same base (both absolute, or both
/// relative to the project root).
pub fn relative_path(from_dir: &Path, target: &Path) -> PathBuf {
    let from = clean_path(from_dir);
    let target = clean_path(target);
    let from_parts: Vec<_> = from.components().collect();
    let target_parts: Vec<_> = target.components().collect();

    let common = from_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

/// Build an ES module import specifier for `module_file`, as seen from a file
/// living in `from_dir`.
///
/// The relative path is computed on the full file name and only then loses its
/// extension, so a module named like a directory on the way (`src/routes.ts`
/// seen from `src/routes`) still resolves. Separators are always `/`, and a
/// `./` prefix is added unless the specifier already climbs with `../`.
///
/// ```
/// use edgeroute::paths::import_specifier;
/// use std::path::Path;
///
/// let specifier = import_specifier(
///     Path::new("src/generated"),
///     Path::new("src/controllers/user.controller.ts"),
/// );
/// assert_eq!(specifier, "../controllers/user.controller");
/// ```
pub fn import_specifier(from_dir: &Path, module_file: &Path) -> String {
    let rel = relative_path(from_dir, module_file).with_extension("");
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("../") {
        joined
    } else {
        format!("./{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_route_path_collapses_slashes() {
        assert_eq!(join_route_path(&["/users/", "", "/list"]), "/users/list");
        assert_eq!(join_route_path(&["//api//", "/v1/", "//items"]), "/api/v1/items");
        assert_eq!(join_route_path(&["/api", "", "/items"]), "/api/items");
    }

    #[test]
    fn test_join_route_path_adds_leading_slash() {
        assert_eq!(join_route_path(&["api", "", "items"]), "/apiitems");
        assert_eq!(join_route_path(&["api/", "", "items"]), "/api/items");
        assert_eq!(join_route_path(&["", "", ""]), "/");
        assert_eq!(join_route_path(&["", "", "///"]), "/");
    }

    #[test]
    fn test_normalize_keeps_trailing_slash() {
        assert_eq!(normalize_route_path("/users/"), "/users/");
        assert_eq!(normalize_route_path("users//:id"), "/users/:id");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean_path(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(clean_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("src/generated"), Path::new("src/controllers/a.ts")),
            PathBuf::from("../controllers/a.ts")
        );
        assert_eq!(
            relative_path(Path::new("src"), Path::new("src/controllers/a.ts")),
            PathBuf::from("controllers/a.ts")
        );
        assert_eq!(
            relative_path(Path::new("/p/out/deep"), Path::new("/p/src/a.ts")),
            PathBuf::from("../../src/a.ts")
        );
    }

    #[test]
    fn test_import_specifier() {
        assert_eq!(
            import_specifier(Path::new("src"), Path::new("src/controllers/user.controller.ts")),
            "./controllers/user.controller"
        );
        assert_eq!(
            import_specifier(Path::new("src/generated"), Path::new("src/generated/local.ts")),
            "./local"
        );
        assert_eq!(
            import_specifier(Path::new("src/generated"), Path::new("src/middleware/cors.ts")),
            "../middleware/cors"
        );
    }

    #[test]
    fn test_import_specifier_module_named_like_output_dir() {
        assert_eq!(
            import_specifier(Path::new("src/routes"), Path::new("src/routes.ts")),
            "../routes"
        );
        assert_eq!(
            import_specifier(Path::new("/project/l"), Path::new("/project/l.ts")),
            "../l"
        );
        assert_eq!(
            import_specifier(Path::new("src/generated"), Path::new("src/generated.ts")),
            "../generated"
        );
    }
}
