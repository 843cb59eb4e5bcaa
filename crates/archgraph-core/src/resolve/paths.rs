//! `/`-separated repo-relative path arithmetic.
//!
//! The repository root is the empty string. Nothing here touches the
//! filesystem.

/// Directory part of `path` (`""` for files at the root).
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name without its final extension.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Join without normalizing.
pub fn join(dir: &str, rel: &str) -> String {
    match (dir.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (_, true) => dir.to_string(),
        _ => format!("{}/{}", dir, rel),
    }
}

/// Collapse `.`, `..`, empty and leading `/` segments.
///
/// Returns `None` when the path climbs above the root.
pub fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// `dir` and each of its ancestors, nearest first, ending with the root.
pub fn ancestors(dir: &str) -> Vec<&str> {
    let mut out = vec![dir];
    let mut current = dir;
    while !current.is_empty() {
        current = parent_dir(current);
        out.push(current);
    }
    out
}

/// Strip a known extension from `path`.
pub fn strip_extension<'a>(path: &'a str, extensions: &[&str]) -> &'a str {
    extensions
        .iter()
        .filter(|ext| !ext.is_empty())
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_names() {
        assert_eq!(parent_dir("src/app/main.py"), "src/app");
        assert_eq!(parent_dir("main.py"), "");
        assert_eq!(file_name("src/app/main.py"), "main.py");
        assert_eq!(file_stem("src/app/main.py"), "main");
        assert_eq!(file_stem(".env"), ".env");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a.py"), "a.py");
        assert_eq!(join("src", ""), "src");
        assert_eq!(join("src", "a.py"), "src/a.py");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("src/./a/../b.ts").as_deref(), Some("src/b.ts"));
        assert_eq!(normalize("/lib/x.php").as_deref(), Some("lib/x.php"));
        assert_eq!(normalize("src/../../etc/passwd"), None);
        assert_eq!(normalize("a/..").as_deref(), Some(""));
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("a/b/c"), vec!["a/b/c", "a/b", "a", ""]);
        assert_eq!(ancestors(""), vec![""]);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("src/a.js", &[".ts", ".js"]), "src/a");
        assert_eq!(strip_extension("src/a", &[".ts"]), "src/a");
    }
}
