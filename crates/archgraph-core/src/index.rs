//! Repository Index
//!
//! Built once from the collected file set and manifests. Answers the lookups
//! the resolver needs: path membership, path-suffix search, namespaces and
//! packages declared in source, Go module roots and declared dependency
//! versions.

use std::collections::{BTreeMap, HashMap};

use crate::collector::SourceFile;
use crate::detect::{code_lines, CommentStyle};
use crate::language::{Ecosystem, Language};
use crate::manifest::{ManifestInfo, ManifestKind};
use crate::resolve::paths::{ancestors, file_name, join, parent_dir};

pattern!(JVM_PACKAGE, r"^\s*package\s+([A-Za-z_][\w.]*)");
pattern!(CSHARP_NAMESPACE, r"^\s*namespace\s+([A-Za-z_][\w.]*)");
pattern!(PHP_NAMESPACE, r"^\s*namespace\s+\\?([A-Za-z_][\w\\]*)\s*[;{]");

/// A Go module rooted inside the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    pub module_path: String,
    /// Directory containing `go.mod`
    pub dir: String,
}

#[derive(Debug, Clone, Default)]
pub struct RepoIndex {
    files: BTreeMap<String, Language>,
    /// file name → sorted paths ending in it
    by_file_name: HashMap<String, Vec<String>>,
    namespaces: BTreeMap<String, Language>,
    /// Longest module path first
    go_modules: Vec<GoModule>,
    /// manifest directory → manifests in it
    manifests: BTreeMap<String, Vec<ManifestInfo>>,
}

impl RepoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index collected files, the namespaces they declare, and manifests.
    pub fn build(files: &[SourceFile], manifests: &[ManifestInfo]) -> Self {
        let mut index = Self::new();
        for file in files {
            index.add_file(&file.path, file.language);
            for namespace in declared_namespaces(file) {
                index.add_namespace(namespace, file.language);
            }
        }
        for manifest in manifests {
            index.add_manifest(manifest.clone());
        }
        index
    }

    pub fn add_file(&mut self, path: &str, language: Language) {
        self.files.insert(path.to_string(), language);
        let paths = self
            .by_file_name
            .entry(file_name(path).to_string())
            .or_default();
        let pos = paths.binary_search_by(|p| p.as_str().cmp(path));
        if let Err(pos) = pos {
            paths.insert(pos, path.to_string());
        }
    }

    pub fn add_namespace(&mut self, namespace: impl Into<String>, language: Language) {
        self.namespaces.entry(namespace.into()).or_insert(language);
    }

    pub fn add_manifest(&mut self, manifest: ManifestInfo) {
        if manifest.kind == ManifestKind::GoMod {
            if let Some(module_path) = &manifest.module_path {
                self.go_modules.push(GoModule {
                    module_path: module_path.clone(),
                    dir: manifest.dir.clone(),
                });
                self.go_modules.sort_by(|a, b| {
                    b.module_path
                        .len()
                        .cmp(&a.module_path.len())
                        .then_with(|| a.module_path.cmp(&b.module_path))
                });
            }
        }
        let entries = self.manifests.entry(manifest.dir.clone()).or_default();
        entries.push(manifest);
        entries.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn language_of(&self, path: &str) -> Option<Language> {
        self.files.get(path).copied()
    }

    /// First indexed path (in sorted order) equal to `suffix` or ending in
    /// `/{suffix}`.
    pub fn find_by_suffix(&self, suffix: &str) -> Option<&str> {
        let suffix = suffix.trim_start_matches('/');
        let candidates = self.by_file_name.get(file_name(suffix))?;
        let boundary = format!("/{}", suffix);
        candidates
            .iter()
            .find(|p| p.as_str() == suffix || p.ends_with(&boundary))
            .map(String::as_str)
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    pub fn namespace_language(&self, namespace: &str) -> Option<Language> {
        self.namespaces.get(namespace).copied()
    }

    /// Package directory for a Go import under one of the repository's modules.
    pub fn go_package_dir(&self, import: &str) -> Option<String> {
        self.go_modules.iter().find_map(|module| {
            if import == module.module_path {
                Some(module.dir.clone())
            } else {
                import
                    .strip_prefix(&module.module_path)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| join(&module.dir, rest))
            }
        })
    }

    /// Version of `package` declared by the nearest manifest of `ecosystem`
    /// between `from_file` and the root.
    pub fn declared_version(
        &self,
        from_file: &str,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Option<&str> {
        ancestors(parent_dir(from_file)).into_iter().find_map(|dir| {
            self.manifests
                .get(dir)?
                .iter()
                .filter(|m| m.kind.ecosystem() == ecosystem)
                .find_map(|m| m.version_of(package))
        })
    }

    pub fn manifest_count(&self) -> usize {
        self.manifests.values().map(Vec::len).sum()
    }
}

/// Packages (Java/Kotlin) and namespaces (C#, PHP) a file declares.
fn declared_namespaces(file: &SourceFile) -> Vec<String> {
    let (pattern, style) = match file.language {
        Language::Java | Language::Kotlin => (JVM_PACKAGE.as_ref(), CommentStyle::Slash),
        Language::CSharp => (CSHARP_NAMESPACE.as_ref(), CommentStyle::Slash),
        Language::Php => (PHP_NAMESPACE.as_ref(), CommentStyle::SlashAndHash),
        _ => return Vec::new(),
    };
    let Some(pattern) = pattern else {
        return Vec::new();
    };
    code_lines(&file.content, style)
        .into_iter()
        .filter_map(|(_, text)| pattern.captures(text).map(|c| c[1].to_string()))
        .collect()
}
