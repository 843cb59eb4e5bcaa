//! Language Detectors
//!
//! Each detector is a pure, line-oriented matcher that turns file content into
//! raw reference strings. Detectors never fail: lines that match nothing are
//! skipped. A minimal comment scanner removes line comments and block comments
//! first so commented-out imports are not reported.

pub mod cfamily;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

use serde::Serialize;

use crate::collector::SourceFile;
use crate::language::Language;

/// How a reference was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Import,
    Require,
    Include,
    Use,
}

/// A reference extracted verbatim from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReference {
    /// Repo-relative path of the importing file
    pub from_file: String,
    /// The referenced module/path as written
    pub raw_token: String,
    pub kind: ReferenceKind,
    /// 1-based line number
    pub line: usize,
}

/// A match inside file text, not yet tied to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub line: usize,
    pub token: String,
    pub kind: ReferenceKind,
}

impl Hit {
    pub(crate) fn new(line: usize, token: impl Into<String>, kind: ReferenceKind) -> Self {
        Self {
            line,
            token: token.into(),
            kind,
        }
    }
}

/// The closed set of detectors, one per module system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    Python,
    JavaScript,
    Go,
    Jvm,
    CSharp,
    Php,
    Ruby,
    Rust,
    CFamily,
}

impl Detector {
    /// Select the detector for a language.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Detector::Python,
            Language::JavaScript | Language::TypeScript => Detector::JavaScript,
            Language::Go => Detector::Go,
            Language::Java | Language::Kotlin => Detector::Jvm,
            Language::CSharp => Detector::CSharp,
            Language::Php => Detector::Php,
            Language::Ruby => Detector::Ruby,
            Language::Rust => Detector::Rust,
            Language::C | Language::Cpp => Detector::CFamily,
        }
    }

    /// Scan raw content.
    pub fn scan(&self, content: &str) -> Vec<Hit> {
        match self {
            Detector::Python => python::scan(content),
            Detector::JavaScript => javascript::scan(content),
            Detector::Go => go::scan(content),
            Detector::Jvm => java::scan(content),
            Detector::CSharp => csharp::scan(content),
            Detector::Php => php::scan(content),
            Detector::Ruby => ruby::scan(content),
            Detector::Rust => rust::scan(content),
            Detector::CFamily => cfamily::scan(content),
        }
    }

    /// Scan a collected file into raw references.
    pub fn detect(&self, file: &SourceFile) -> Vec<RawReference> {
        self.scan(&file.content)
            .into_iter()
            .filter(|hit| !hit.token.trim().is_empty())
            .map(|hit| RawReference {
                from_file: file.path.clone(),
                raw_token: hit.token,
                kind: hit.kind,
                line: hit.line,
            })
            .collect()
    }
}

/// Detect references in a file with the detector for its language.
pub fn detect(file: &SourceFile) -> Vec<RawReference> {
    Detector::for_language(file.language).detect(file)
}

// ============================================================================
// Comment scanning
// ============================================================================

/// Comment syntax of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommentStyle {
    /// `//` and `/* */`
    Slash,
    /// `//`, `/* */` and full-line `#`
    SlashAndHash,
    /// `#` and `=begin`/`=end`
    Hash,
    /// `#` and triple-quoted docstrings
    Python,
}

/// Yield `(line_number, code)` for every line with code left after comments
/// are removed.
pub(crate) fn code_lines(content: &str, style: CommentStyle) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut in_block = false;
    let mut docstring: Option<&'static str> = None;

    for (idx, raw) in content.lines().enumerate() {
        let mut line = raw;

        match style {
            CommentStyle::Slash | CommentStyle::SlashAndHash => {
                if in_block {
                    match line.find("*/") {
                        Some(pos) => {
                            line = &line[pos + 2..];
                            in_block = false;
                        }
                        None => continue,
                    }
                }
                if let Some(open) = line.find("/*") {
                    let before = &line[..open];
                    match line[open + 2..].find("*/") {
                        Some(close) if before.trim().is_empty() => {
                            line = &line[open + 2 + close + 2..];
                        }
                        Some(_) => line = before,
                        None => {
                            in_block = true;
                            line = before;
                        }
                    }
                }
                line = cut_line_comment(line, "//");
                if style == CommentStyle::SlashAndHash {
                    let trimmed = line.trim_start();
                    if trimmed.starts_with('#') && !trimmed.starts_with("#[") {
                        continue;
                    }
                }
            }
            CommentStyle::Hash => {
                if in_block {
                    if line.starts_with("=end") {
                        in_block = false;
                    }
                    continue;
                }
                if line.starts_with("=begin") {
                    in_block = true;
                    continue;
                }
                line = cut_line_comment(line, "#");
            }
            CommentStyle::Python => {
                if let Some(delim) = docstring {
                    match line.find(delim) {
                        Some(pos) => {
                            line = &line[pos + 3..];
                            docstring = None;
                        }
                        None => continue,
                    }
                }
                for delim in ["\"\"\"", "'''"] {
                    if line.matches(delim).count() % 2 == 1 {
                        if let Some(pos) = line.find(delim) {
                            line = &line[..pos];
                            docstring = Some(delim);
                        }
                        break;
                    }
                }
                line = cut_line_comment(line, "#");
            }
        }

        if !line.trim().is_empty() {
            out.push((idx + 1, line));
        }
    }
    out
}

/// Cut `line` at the first `marker` that starts the line or follows
/// whitespace or `;`. `https://` and `"#{x}"` survive.
fn cut_line_comment<'a>(line: &'a str, marker: &str) -> &'a str {
    let mut search_from = 0;
    while let Some(rel) = line[search_from..].find(marker) {
        let pos = search_from + rel;
        let prev = line[..pos].chars().next_back();
        if prev.is_none_or(|c| c.is_whitespace() || c == ';') {
            return &line[..pos];
        }
        search_from = pos + marker.len();
    }
    line
}
