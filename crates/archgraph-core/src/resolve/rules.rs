//! Per-language resolution rules.

use super::external::classify;
use super::paths::{ancestors, file_name, file_stem, join, normalize, parent_dir, strip_extension};
use super::Target;
use crate::detect::ReferenceKind;
use crate::index::RepoIndex;
use crate::language::Language;

const JS_EMITTED: &[&str] = &[".js", ".jsx", ".mjs", ".cjs"];

/// The importing side of a reference.
pub(super) struct Context<'a> {
    pub index: &'a RepoIndex,
    pub from_file: &'a str,
    pub from_dir: &'a str,
    pub language: Language,
    pub kind: ReferenceKind,
}

impl Context<'_> {
    fn internal(&self, id: impl Into<String>) -> Option<Target> {
        let id = id.into();
        let language = self
            .index
            .language_of(&id)
            .or_else(|| self.index.namespace_language(&id))
            .unwrap_or(self.language);
        Some(Target::Internal { id, language })
    }

    fn external(&self, token: &str) -> Option<Target> {
        let ecosystem = classify(self.language, token);
        let package = ecosystem.package_root(token);
        if package.is_empty() {
            return None;
        }
        Some(Target::External {
            ecosystem,
            package,
            language: self.language,
        })
    }

    /// Resolve a path written relative to the importing file (or to the root
    /// when it starts with `/`). Unmatched paths inside the repository become
    /// internal nodes as written; paths above the root are dropped.
    fn relative(&self, token: &str, probe: impl Fn(&str) -> Option<String>) -> Option<Target> {
        let joined = if token.starts_with('/') {
            token.to_string()
        } else {
            join(self.from_dir, token)
        };
        let base = normalize(&joined)?;
        if let Some(path) = probe(&base) {
            return self.internal(path);
        }
        if base.is_empty() {
            return None;
        }
        self.internal(base)
    }
}

/// Match `base` against indexed files: as written, with each suffix, then as
/// a directory holding one of `index_names`.
fn probe(index: &RepoIndex, base: &str, suffixes: &[&str], index_names: &[&str]) -> Option<String> {
    if !base.is_empty() && index.contains(base) {
        return Some(base.to_string());
    }
    if !base.is_empty() {
        for suffix in suffixes {
            let candidate = format!("{}{}", base, suffix);
            if index.contains(&candidate) {
                return Some(candidate);
            }
        }
    }
    for name in index_names {
        for suffix in suffixes {
            let candidate = join(base, &format!("{}{}", name, suffix));
            if index.contains(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

// ============================================================================
// Python
// ============================================================================

pub(super) fn python(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let suffixes = Language::Python.source_suffixes();
    if token.starts_with('.') {
        let dots = token.chars().take_while(|c| *c == '.').count();
        let mut base = ctx.from_dir.to_string();
        for _ in 1..dots {
            if base.is_empty() {
                return None;
            }
            base = parent_dir(&base).to_string();
        }
        let module_path = join(&base, &token[dots..].replace('.', "/"));
        if let Some(path) = probe(ctx.index, &module_path, suffixes, &["__init__"]) {
            return ctx.internal(path);
        }
        if module_path.is_empty() {
            return None;
        }
        return ctx.internal(module_path);
    }

    let parts: Vec<&str> = token.split('.').collect();
    let mut roots = ancestors(ctx.from_dir);
    if !roots.contains(&"src") {
        roots.push("src");
    }
    for root in roots {
        for k in (1..=parts.len()).rev() {
            let module_path = join(root, &parts[..k].join("/"));
            if let Some(path) = probe(ctx.index, &module_path, suffixes, &["__init__"]) {
                return ctx.internal(path);
            }
        }
    }
    ctx.external(token)
}

// ============================================================================
// JavaScript / TypeScript
// ============================================================================

fn probe_js(index: &RepoIndex, base: &str) -> Option<String> {
    probe(index, base, Language::JavaScript.source_suffixes(), &["index"]).or_else(|| {
        // ESM sources import the emitted `.js` name of a `.ts` file
        let stem = strip_extension(base, JS_EMITTED);
        if stem.len() < base.len() {
            probe(index, stem, Language::JavaScript.source_suffixes(), &["index"])
        } else {
            None
        }
    })
}

pub(super) fn javascript(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let token = token.split(['?', '#']).next().unwrap_or(token);

    if token.starts_with('.') || token.starts_with('/') {
        return ctx.relative(token, |base| probe_js(ctx.index, base));
    }

    for alias in ["@/", "~/"] {
        if let Some(rest) = token.strip_prefix(alias) {
            for root in ["src", ""] {
                if let Some(path) = probe_js(ctx.index, &join(root, rest)) {
                    return ctx.internal(path);
                }
            }
        }
    }

    // baseUrl-style imports of repository paths
    if let Some(path) = normalize(token).and_then(|base| probe_js(ctx.index, &base)) {
        return ctx.internal(path);
    }

    ctx.external(token.strip_prefix("node:").unwrap_or(token))
}

// ============================================================================
// Go
// ============================================================================

pub(super) fn go(ctx: &Context<'_>, token: &str) -> Option<Target> {
    if token.starts_with('.') {
        return ctx.relative(token, |_| None);
    }
    if let Some(dir) = ctx.index.go_package_dir(token) {
        // the module root package is named by its module path
        return if dir.is_empty() {
            ctx.internal(token)
        } else {
            ctx.internal(dir)
        };
    }
    ctx.external(token)
}

// ============================================================================
// Java / Kotlin
// ============================================================================

pub(super) fn jvm(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let name = token.strip_suffix(".*").unwrap_or(token);
    let parts: Vec<&str> = name.split('.').collect();

    // Longest prefix first: static imports name a member after the class
    let min = if parts.len() > 1 { 2 } else { 1 };
    for k in (min..=parts.len()).rev() {
        let stem = parts[..k].join("/");
        for suffix in Language::Java.source_suffixes() {
            if let Some(path) = ctx.index.find_by_suffix(&format!("{}{}", stem, suffix)) {
                return ctx.internal(path);
            }
        }
    }

    for k in (1..=parts.len()).rev() {
        let package = parts[..k].join(".");
        if ctx.index.has_namespace(&package) {
            return ctx.internal(package);
        }
    }
    ctx.external(name)
}

// ============================================================================
// C#
// ============================================================================

pub(super) fn csharp(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let parts: Vec<&str> = token.split('.').collect();
    // `using static A.B.Type` names a type inside namespace A.B
    for k in (1..=parts.len()).rev() {
        let namespace = parts[..k].join(".");
        if ctx.index.has_namespace(&namespace) {
            return ctx.internal(namespace);
        }
    }
    ctx.external(token)
}

// ============================================================================
// PHP
// ============================================================================

pub(super) fn php(ctx: &Context<'_>, token: &str) -> Option<Target> {
    if ctx.kind == ReferenceKind::Use {
        return php_namespace(ctx, token.trim_start_matches('\\'));
    }

    let suffixes = Language::Php.source_suffixes();
    if token.starts_with("./") || token.starts_with("../") || token.starts_with('/') {
        return ctx.relative(token, |base| probe(ctx.index, base, suffixes, &[]));
    }

    // include_path lookup: the including file's directory, then the root
    for dir in [ctx.from_dir, ""] {
        if let Some(path) = normalize(&join(dir, token))
            .and_then(|base| probe(ctx.index, &base, suffixes, &[]))
        {
            return ctx.internal(path);
        }
    }
    ctx.external(token)
}

fn php_namespace(ctx: &Context<'_>, name: &str) -> Option<Target> {
    let parts: Vec<&str> = name.split('\\').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return None;
    }

    // PSR-4 roots map the vendor prefix to arbitrary directories
    let min = parts.len().min(2);
    for skip in 0..=(parts.len() - min) {
        let suffix = format!("{}.php", parts[skip..].join("/"));
        if let Some(path) = ctx.index.find_by_suffix(&suffix) {
            return ctx.internal(path);
        }
    }

    for k in (1..=parts.len()).rev() {
        let namespace = parts[..k].join("\\");
        if ctx.index.has_namespace(&namespace) {
            return ctx.internal(namespace);
        }
    }
    ctx.external(name)
}

// ============================================================================
// Ruby
// ============================================================================

pub(super) fn ruby(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let suffixes = Language::Ruby.source_suffixes();
    if token.starts_with("./") || token.starts_with("../") {
        return ctx.relative(token, |base| probe(ctx.index, base, suffixes, &[]));
    }
    for dir in [ctx.from_dir, "", "lib"] {
        if let Some(path) = normalize(&join(dir, token))
            .and_then(|base| probe(ctx.index, &base, suffixes, &[]))
        {
            return ctx.internal(path);
        }
    }
    ctx.external(token)
}

// ============================================================================
// Rust
// ============================================================================

/// Directory holding the child modules of `file`.
fn rust_module_dir(file: &str) -> String {
    match file_name(file) {
        "lib.rs" | "main.rs" | "mod.rs" => parent_dir(file).to_string(),
        _ => join(parent_dir(file), file_stem(file)),
    }
}

/// The file defining the module at `module_path`.
fn rust_module_file(index: &RepoIndex, module_path: &str) -> Option<String> {
    let own_file = (!module_path.is_empty()).then(|| format!("{}.rs", module_path));
    own_file
        .into_iter()
        .chain(["mod.rs", "lib.rs", "main.rs"].map(|name| join(module_path, name)))
        .find(|candidate| index.contains(candidate))
}

/// Nearest ancestor directory holding `lib.rs` or `main.rs`.
fn rust_crate_root(index: &RepoIndex, from_file: &str) -> String {
    let dir = parent_dir(from_file);
    ancestors(dir)
        .into_iter()
        .find(|d| index.contains(&join(d, "lib.rs")) || index.contains(&join(d, "main.rs")))
        .unwrap_or(dir)
        .to_string()
}

pub(super) fn rust(ctx: &Context<'_>, token: &str) -> Option<Target> {
    let segments: Vec<&str> = token.split("::").filter(|s| !s.is_empty()).collect();
    let first = *segments.first()?;

    let (base, rest): (String, &[&str]) = match first {
        "crate" => (rust_crate_root(ctx.index, ctx.from_file), &segments[1..]),
        "self" => (rust_module_dir(ctx.from_file), &segments[1..]),
        "super" => {
            let mut dir = rust_module_dir(ctx.from_file);
            let mut consumed = 0;
            while segments.get(consumed) == Some(&"super") {
                if dir.is_empty() {
                    return None;
                }
                dir = parent_dir(&dir).to_string();
                consumed += 1;
            }
            (dir, &segments[consumed..])
        }
        name => {
            // A child module in scope, or a crate-root module in 2015 paths
            let local = rust_module_dir(ctx.from_file);
            let root = rust_crate_root(ctx.index, ctx.from_file);
            if rust_module_file(ctx.index, &join(&local, name)).is_some() {
                (local, &segments[..])
            } else if rust_module_file(ctx.index, &join(&root, name)).is_some() {
                (root, &segments[..])
            } else {
                return ctx.external(token);
            }
        }
    };

    for k in (0..=rest.len()).rev() {
        let module_path = join(&base, &rest[..k].join("/"));
        if let Some(file) = rust_module_file(ctx.index, &module_path) {
            return ctx.internal(file);
        }
    }
    ctx.internal(join(&base, &rest.join("/")))
}

// ============================================================================
// C / C++
// ============================================================================

pub(super) fn cfamily(ctx: &Context<'_>, token: &str) -> Option<Target> {
    if let Some(header) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        if let Some(path) = ctx.index.find_by_suffix(header) {
            return ctx.internal(path);
        }
        return ctx.external(header);
    }

    for dir in [ctx.from_dir, ""] {
        if let Some(base) = normalize(&join(dir, token)) {
            if ctx.index.contains(&base) {
                return ctx.internal(base);
            }
        }
    }
    if let Some(path) = ctx.index.find_by_suffix(token.trim_start_matches("./")) {
        return ctx.internal(path);
    }
    if token.starts_with('.') {
        return ctx.relative(token, |_| None);
    }
    ctx.external(token)
}
