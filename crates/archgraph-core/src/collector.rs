//! File Collector
//!
//! Selects the analyzable source files of a repository tree. The tree is
//! abstracted behind [`RepoTree`] so the same policy applies to a local
//! checkout ([`LocalTree`]) and to an in-memory snapshot ([`MemoryTree`]).
//!
//! Selection is deterministic: candidate paths are filtered and sorted,
//! extension-less files are kept only when their shebang names a supported
//! interpreter, and the survivors are sampled per directory and truncated at
//! the file cap. Fetches then fan out on a bounded rayon pool and are
//! re-joined in the sorted order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::language::Language;
use crate::manifest::{self, ManifestInfo, ManifestKind};

/// Directories never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "vendor",
    "third_party",
    "dist",
    "build",
    "out",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "bin",
    "obj",
    ".next",
    ".nuxt",
    ".gradle",
    "coverage",
    ".idea",
    ".vscode",
];

/// Extensions that are never source text.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "pdf", "zip", "gz", "tgz", "bz2",
    "xz", "7z", "tar", "jar", "war", "class", "so", "dll", "dylib", "exe", "o", "a", "lib",
    "pyc", "pyo", "wasm", "woff", "woff2", "ttf", "otf", "eot", "mp3", "mp4", "mov", "avi",
    "wav", "bin", "dat", "db", "sqlite",
];

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8192;

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Repository root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Repository is inaccessible: {0}")]
    Inaccessible(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No supported source files found ({considered} paths considered)")]
    NoSupportedSource { considered: usize },
}

/// A single file that could not be fetched.
///
/// Never fatal: the collector logs it at debug level and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("File not found in tree: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Binary content in {0}")]
    Binary(String),

    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },
}

// ============================================================================
// Repository trees
// ============================================================================

/// A repository file tree: a listing plus a content fetch.
///
/// Paths are repo-relative and `/`-separated.
pub trait RepoTree: Sync {
    /// Enumerate every file path in the tree.
    fn list_files(&self) -> Result<Vec<String>, CollectionError>;

    /// Fetch the raw bytes of one file.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;

    /// Size in bytes, when the tree knows it without reading the file.
    fn size_hint(&self, _path: &str) -> Option<u64> {
        None
    }

    /// First line of a file, used to sniff shebangs.
    fn first_line(&self, path: &str) -> Result<String, FetchError> {
        let bytes = self.fetch(path)?;
        let end = bytes.iter().position(|b| *b == b'\n').unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

/// A checkout on the local filesystem.
///
/// Honours `.gitignore`, `.git/info/exclude` and `.archgraphignore`, and prunes
/// the default excluded directories during the walk.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
    pruned_dirs: HashSet<String>,
}

impl LocalTree {
    /// Open a tree rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, CollectionError> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(CollectionError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(CollectionError::Inaccessible(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: root.canonicalize()?,
            pruned_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl RepoTree for LocalTree {
    fn list_files(&self) -> Result<Vec<String>, CollectionError> {
        let pruned = self.pruned_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .follow_links(false)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            // Honour .gitignore even when the checkout has no .git directory
            .require_git(false)
            .add_custom_ignore_filename(".archgraphignore")
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && pruned.contains(entry.file_name().to_string_lossy().as_ref()))
            })
            .build();

        // An unreadable root means nothing can be listed at all
        std::fs::read_dir(&self.root)
            .map_err(|e| CollectionError::Inaccessible(format!("{}: {}", self.root.display(), e)))?;

        let mut files = Vec::new();
        let mut walk_errors = 0usize;
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    walk_errors += 1;
                    warn!("Error walking {}: {}", self.root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            files.push(rel);
        }

        debug!(
            "Listed {} files under {} ({} walk errors)",
            files.len(),
            self.root.display(),
            walk_errors
        );
        Ok(files)
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        std::fs::read(self.root.join(path)).map_err(|source| FetchError::Io {
            path: path.to_string(),
            source,
        })
    }

    fn size_hint(&self, path: &str) -> Option<u64> {
        std::fs::metadata(self.root.join(path)).ok().map(|m| m.len())
    }

    fn first_line(&self, path: &str) -> Result<String, FetchError> {
        let io_error = |source| FetchError::Io {
            path: path.to_string(),
            source,
        };
        let file = std::fs::File::open(self.root.join(path)).map_err(io_error)?;
        let mut line = Vec::new();
        BufReader::new(file)
            .take(BINARY_SNIFF_LEN as u64)
            .read_until(b'\n', &mut line)
            .map_err(io_error)?;
        Ok(String::from_utf8_lossy(&line).trim_end().to_string())
    }
}

/// An in-memory tree, for embedding callers that already hold file contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, Vec<u8>>,
    unreadable: BTreeSet<String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// List a path whose fetch always fails.
    pub fn with_unreadable(mut self, path: impl Into<String>) -> Self {
        self.unreadable.insert(path.into());
        self
    }
}

impl RepoTree for MemoryTree {
    fn list_files(&self) -> Result<Vec<String>, CollectionError> {
        Ok(self
            .files
            .keys()
            .chain(self.unreadable.iter())
            .cloned()
            .collect())
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        if self.unreadable.contains(path) {
            return Err(FetchError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "unreadable"),
            });
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }

    fn size_hint(&self, path: &str) -> Option<u64> {
        self.files.get(path).map(|content| content.len() as u64)
    }
}

// ============================================================================
// Collection
// ============================================================================

/// A collected source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Repo-relative, `/`-separated path
    pub path: String,
    pub language: Language,
    pub content: String,
}

/// Collector settings.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Hard cap on collected source files
    pub max_files: usize,
    /// Cap on source files taken from one directory (`None` disables sampling)
    pub max_files_per_dir: Option<usize>,
    /// Glob patterns matched against repo-relative paths
    pub exclude_patterns: Vec<String>,
    /// Directory names skipped anywhere in a path
    pub exclude_dirs: HashSet<String>,
    /// Files above this size are skipped
    pub max_file_size_bytes: u64,
    /// Fetch pool size (`None` uses rayon's default)
    pub fetch_concurrency: Option<usize>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_files: 3000,
            max_files_per_dir: Some(20),
            exclude_patterns: Vec::new(),
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            max_file_size_bytes: 1024 * 1024,
            fetch_concurrency: None,
        }
    }
}

/// Everything the collector hands to the rest of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Selected source files in sorted path order
    pub files: Vec<SourceFile>,
    /// Parsed package manifests found outside excluded directories
    pub manifests: Vec<ManifestInfo>,
    /// Paths listed by the tree
    pub listed: usize,
    /// Candidates skipped because a fetch or decode failed
    pub skipped: usize,
}

/// A path chosen for fetching, before its content is known.
#[derive(Debug, Clone)]
struct Candidate {
    path: String,
    language: Language,
}

/// Collect source files and manifests from `tree`.
pub fn collect(tree: &dyn RepoTree, config: &CollectorConfig) -> Result<Collection, CollectionError> {
    let mut paths: Vec<String> = tree
        .list_files()?
        .into_iter()
        .map(|p| p.replace('\\', "/").trim_start_matches("./").to_string())
        .collect();
    paths.sort();
    paths.dedup();
    let listed = paths.len();

    let glob_set = build_exclude_glob_set(&config.exclude_patterns);

    let mut eligible: Vec<(&str, Option<Language>)> = Vec::new();
    let mut manifest_paths = Vec::new();

    for path in &paths {
        if in_excluded_dir(path, &config.exclude_dirs) || glob_set.is_match(path.as_str()) {
            continue;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        if ManifestKind::from_file_name(file_name).is_some() {
            manifest_paths.push(path.clone());
            continue;
        }

        if has_binary_extension(file_name) || file_name.ends_with(".min.js") {
            continue;
        }

        let language = Language::from_path(path);
        if language.is_none() && file_name.contains('.') {
            continue;
        }
        eligible.push((path.as_str(), language));
    }

    // Extension-less files only count against the caps once a shebang names
    // a supported interpreter.
    let sniffed: Vec<Option<Language>> = run_on_pool(config.fetch_concurrency, || {
        eligible
            .par_iter()
            .map(|(path, language)| language.or_else(|| sniff_shebang(tree, path)))
            .collect()
    });

    let mut candidates = Vec::new();
    let mut per_dir: HashMap<&str, usize> = HashMap::new();
    for ((path, _), language) in eligible.iter().zip(sniffed) {
        let Some(language) = language else {
            continue;
        };
        if candidates.len() >= config.max_files {
            break;
        }
        if let Some(cap) = config.max_files_per_dir {
            let count = per_dir.entry(parent_dir(path)).or_insert(0);
            if *count >= cap {
                continue;
            }
            *count += 1;
        }
        candidates.push(Candidate {
            path: path.to_string(),
            language,
        });
    }

    debug!(
        "Selected {} candidates and {} manifests from {} paths",
        candidates.len(),
        manifest_paths.len(),
        listed
    );

    let (fetched, manifests) = run_on_pool(config.fetch_concurrency, || {
        let fetched: Vec<Option<SourceFile>> = candidates
            .par_iter()
            .map(|candidate| load_source(tree, candidate, config.max_file_size_bytes))
            .collect();
        let manifests: Vec<Option<ManifestInfo>> = manifest_paths
            .par_iter()
            .map(|path| load_manifest(tree, path, config.max_file_size_bytes))
            .collect();
        (fetched, manifests)
    });

    let mut skipped = 0usize;
    let mut files = Vec::with_capacity(fetched.len());
    for loaded in fetched {
        match loaded {
            Some(file) => files.push(file),
            None => skipped += 1,
        }
    }
    let manifests: Vec<ManifestInfo> = manifests.into_iter().flatten().collect();

    if files.is_empty() {
        return Err(CollectionError::NoSupportedSource { considered: listed });
    }

    info!(
        "Collected {} source files ({} skipped) and {} manifests",
        files.len(),
        skipped,
        manifests.len()
    );

    Ok(Collection {
        files,
        manifests,
        listed,
        skipped,
    })
}

/// Run `op` on a dedicated pool when a size is requested.
fn run_on_pool<R: Send>(threads: Option<usize>, op: impl FnOnce() -> R + Send) -> R {
    let Some(threads) = threads.filter(|n| *n > 0) else {
        return op();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(op),
        Err(e) => {
            warn!("Failed to build fetch pool ({}), using global pool", e);
            op()
        }
    }
}

fn sniff_shebang(tree: &dyn RepoTree, path: &str) -> Option<Language> {
    match tree.first_line(path) {
        Ok(line) => Language::from_shebang(&line),
        Err(e) => {
            debug!("Skipping {}: {}", path, e);
            None
        }
    }
}

/// Fetch one candidate; `None` when the fetch or decode failed.
fn load_source(tree: &dyn RepoTree, candidate: &Candidate, limit: u64) -> Option<SourceFile> {
    match fetch_text(tree, &candidate.path, limit) {
        Ok(content) => Some(SourceFile {
            path: candidate.path.clone(),
            language: candidate.language,
            content,
        }),
        Err(e) => {
            debug!("Skipping {}: {}", candidate.path, e);
            None
        }
    }
}

fn load_manifest(tree: &dyn RepoTree, path: &str, limit: u64) -> Option<ManifestInfo> {
    let content = match fetch_text(tree, path, limit) {
        Ok(content) => content,
        Err(e) => {
            debug!("Skipping manifest {}: {}", path, e);
            return None;
        }
    };
    match manifest::parse(path, &content) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!("Ignoring manifest {}: {}", path, e);
            None
        }
    }
}

/// Fetch a file and decode it as text, rejecting binary and oversized content.
fn fetch_text(tree: &dyn RepoTree, path: &str, limit: u64) -> Result<String, FetchError> {
    let too_large = |size: u64| FetchError::TooLarge {
        path: path.to_string(),
        size,
        limit,
    };
    if let Some(size) = tree.size_hint(path).filter(|size| *size > limit) {
        return Err(too_large(size));
    }
    let bytes = tree.fetch(path)?;
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Err(FetchError::Binary(path.to_string()));
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Build a glob set from exclude patterns.
fn build_exclude_glob_set(patterns: &[String]) -> globset::GlobSet {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        match globset::Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e),
        }
    }
    builder
        .build()
        .unwrap_or_else(|_| globset::GlobSet::empty())
}

fn in_excluded_dir(path: &str, exclude_dirs: &HashSet<String>) -> bool {
    let mut components: Vec<&str> = path.split('/').collect();
    components.pop();
    components.iter().any(|c| exclude_dirs.contains(*c))
}

fn has_binary_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
