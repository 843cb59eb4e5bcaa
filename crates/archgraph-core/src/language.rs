//! Supported languages and external package ecosystems.
//!
//! `Language` decides which detector runs over a file and which extension
//! suffixes the resolver tries. `Ecosystem` names the namespace an unresolved
//! reference lands in, together with the rule that collapses a deep import
//! path to its root package.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Languages with an import detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Kotlin,
    CSharp,
    Php,
    Ruby,
    Rust,
    C,
    Cpp,
}

impl Language {
    /// Get the language name as used in node metadata and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Detect language from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        get_extension_map()
            .get(ext.to_lowercase().as_str())
            .copied()
    }

    /// Detect language from a repo-relative path.
    pub fn from_path(path: &str) -> Option<Self> {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Detect language from the interpreter named on a `#!` line.
    pub fn from_shebang(first_line: &str) -> Option<Self> {
        let line = first_line.strip_prefix("#!")?;
        // Flags (`ruby -w`, `env -S`) and the `env` launcher itself are skipped
        let interpreter = line
            .split_whitespace()
            .filter(|w| !w.starts_with('-'))
            .find(|w| *w != "env" && !w.ends_with("/env"))?;
        let name = interpreter.rsplit('/').next().unwrap_or(interpreter);
        if name.starts_with("python") {
            Some(Language::Python)
        } else if name == "node" || name == "nodejs" || name == "deno" || name == "bun" {
            Some(Language::JavaScript)
        } else if name.starts_with("ruby") {
            Some(Language::Ruby)
        } else if name.starts_with("php") {
            Some(Language::Php)
        } else {
            None
        }
    }

    /// Extension suffixes tried, in order, when a reference omits the extension.
    pub fn source_suffixes(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &[".py", ".pyi"],
            Language::JavaScript | Language::TypeScript => {
                &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".mts", ".cts"]
            }
            Language::Go => &[".go"],
            Language::Java | Language::Kotlin => &[".java", ".kt"],
            Language::CSharp => &[".cs"],
            Language::Php => &[".php"],
            Language::Ruby => &[".rb"],
            Language::Rust => &[".rs"],
            Language::C | Language::Cpp => &["", ".h", ".hpp", ".hh"],
        }
    }

    /// The language this one is grouped with for filtering.
    ///
    /// TypeScript files import JavaScript packages and vice versa, so both sit
    /// in one family; likewise C/C++ and Java/Kotlin.
    pub fn family(&self) -> Language {
        match self {
            Language::TypeScript => Language::JavaScript,
            Language::Cpp => Language::C,
            Language::Kotlin => Language::Java,
            other => *other,
        }
    }

    /// External ecosystems whose nodes accompany this language's internal nodes.
    pub fn companion_ecosystems(&self) -> &'static [Ecosystem] {
        match self.family() {
            Language::Python => &[Ecosystem::Pypi, Ecosystem::PythonStdlib],
            Language::JavaScript => &[Ecosystem::Npm],
            Language::Go => &[Ecosystem::Go, Ecosystem::GoStdlib],
            Language::Java => &[Ecosystem::Maven, Ecosystem::Jdk],
            Language::CSharp => &[Ecosystem::Nuget, Ecosystem::Dotnet],
            Language::Php => &[Ecosystem::Composer],
            Language::Ruby => &[Ecosystem::Gem],
            Language::Rust => &[Ecosystem::Crates, Ecosystem::RustStd],
            _ => &[Ecosystem::System],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "npm" | "node" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "go" | "golang" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "csharp" | "cs" | "c#" | "dotnet" | ".net" => Ok(Language::CSharp),
            "php" => Ok(Language::Php),
            "ruby" | "rb" => Ok(Language::Ruby),
            "rust" | "rs" => Ok(Language::Rust),
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

/// Static extension to language mapping.
static EXTENSION_MAP: OnceLock<HashMap<&'static str, Language>> = OnceLock::new();

fn get_extension_map() -> &'static HashMap<&'static str, Language> {
    EXTENSION_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        // Python
        map.insert("py", Language::Python);
        map.insert("pyi", Language::Python);
        // JavaScript
        map.insert("js", Language::JavaScript);
        map.insert("jsx", Language::JavaScript);
        map.insert("mjs", Language::JavaScript);
        map.insert("cjs", Language::JavaScript);
        // TypeScript
        map.insert("ts", Language::TypeScript);
        map.insert("tsx", Language::TypeScript);
        map.insert("mts", Language::TypeScript);
        map.insert("cts", Language::TypeScript);
        // Go
        map.insert("go", Language::Go);
        // JVM
        map.insert("java", Language::Java);
        map.insert("kt", Language::Kotlin);
        map.insert("kts", Language::Kotlin);
        // C#
        map.insert("cs", Language::CSharp);
        // PHP
        map.insert("php", Language::Php);
        // Ruby
        map.insert("rb", Language::Ruby);
        // Rust
        map.insert("rs", Language::Rust);
        // C
        map.insert("c", Language::C);
        map.insert("h", Language::C);
        // C++
        map.insert("cpp", Language::Cpp);
        map.insert("cc", Language::Cpp);
        map.insert("cxx", Language::Cpp);
        map.insert("hpp", Language::Cpp);
        map.insert("hh", Language::Cpp);
        map.insert("hxx", Language::Cpp);
        map
    })
}

/// Selects which internal nodes survive in the rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageFilter {
    /// Keep every node.
    #[default]
    All,
    /// Keep one language family's internal nodes and its companion ecosystems.
    Only(Language),
}

impl std::str::FromStr for LanguageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            return Ok(LanguageFilter::All);
        }
        s.parse::<Language>().map(LanguageFilter::Only)
    }
}

impl std::fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageFilter::All => write!(f, "all"),
            LanguageFilter::Only(lang) => write!(f, "{}", lang),
        }
    }
}

// ============================================================================
// Ecosystems
// ============================================================================

/// Where an external reference lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ecosystem {
    /// npm registry packages (JavaScript/TypeScript)
    Npm,
    /// Python Package Index
    Pypi,
    /// Python standard library modules
    PythonStdlib,
    /// Go modules hosted outside the repository
    Go,
    /// Go standard library packages
    GoStdlib,
    /// Maven artifacts (Java/Kotlin)
    Maven,
    /// JDK platform packages
    Jdk,
    /// NuGet packages
    Nuget,
    /// .NET base class library namespaces
    Dotnet,
    /// Composer packages (PHP)
    Composer,
    /// RubyGems
    Gem,
    /// crates.io
    Crates,
    /// Rust `std`/`core`/`alloc`
    RustStd,
    /// C/C++ system or third-party headers
    System,
}

/// How a deep reference path collapses to its root package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootRule {
    /// Keep the first `count` segments split on `separator`.
    Segments {
        separator: &'static str,
        count: usize,
    },
    /// npm: `@scope/name` keeps two segments, anything else keeps one.
    Scoped,
    /// Go: hosted paths (`github.com/owner/repo/...`) keep three segments.
    HostedModule,
}

impl Ecosystem {
    /// Prefix used in external node ids (`"{prefix}:{package}"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "pypi",
            Ecosystem::PythonStdlib => "stdlib",
            Ecosystem::Go => "go",
            Ecosystem::GoStdlib => "gostd",
            Ecosystem::Maven => "maven",
            Ecosystem::Jdk => "jdk",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Dotnet => "dotnet",
            Ecosystem::Composer => "composer",
            Ecosystem::Gem => "gem",
            Ecosystem::Crates => "crates",
            Ecosystem::RustStd => "rust-std",
            Ecosystem::System => "system",
        }
    }

    /// Package manager reported in node metadata; `None` for platform libraries.
    pub fn package_manager(&self) -> Option<&'static str> {
        match self {
            Ecosystem::Npm => Some("npm"),
            Ecosystem::Pypi => Some("pip"),
            Ecosystem::Go => Some("go"),
            Ecosystem::Maven => Some("maven"),
            Ecosystem::Nuget => Some("nuget"),
            Ecosystem::Composer => Some("composer"),
            Ecosystem::Gem => Some("bundler"),
            Ecosystem::Crates => Some("cargo"),
            Ecosystem::PythonStdlib
            | Ecosystem::GoStdlib
            | Ecosystem::Jdk
            | Ecosystem::Dotnet
            | Ecosystem::RustStd
            | Ecosystem::System => None,
        }
    }

    /// The collapsing boundary for this ecosystem's namespace convention.
    pub fn root_rule(&self) -> RootRule {
        match self {
            Ecosystem::Npm => RootRule::Scoped,
            Ecosystem::Pypi | Ecosystem::PythonStdlib => RootRule::Segments {
                separator: ".",
                count: 1,
            },
            Ecosystem::Go => RootRule::HostedModule,
            Ecosystem::GoStdlib | Ecosystem::Gem | Ecosystem::System => RootRule::Segments {
                separator: "/",
                count: 1,
            },
            Ecosystem::Maven | Ecosystem::Jdk | Ecosystem::Nuget | Ecosystem::Dotnet => {
                RootRule::Segments {
                    separator: ".",
                    count: 2,
                }
            }
            Ecosystem::Composer => RootRule::Segments {
                separator: "\\",
                count: 2,
            },
            Ecosystem::Crates | Ecosystem::RustStd => RootRule::Segments {
                separator: "::",
                count: 1,
            },
        }
    }

    /// Collapse a raw reference to its root package name.
    ///
    /// `lodash/fp/map` becomes `lodash`, `@scope/pkg/deep` becomes `@scope/pkg`.
    pub fn package_root(&self, token: &str) -> String {
        let token = token.trim();
        match self.root_rule() {
            RootRule::Scoped => {
                if token.starts_with('@') {
                    token.splitn(3, '/').take(2).collect::<Vec<_>>().join("/")
                } else {
                    token.split('/').next().unwrap_or(token).to_string()
                }
            }
            RootRule::HostedModule => {
                let first = token.split('/').next().unwrap_or(token);
                let count = if first.contains('.') { 3 } else { 1 };
                token.split('/').take(count).collect::<Vec<_>>().join("/")
            }
            RootRule::Segments { separator, count } => {
                let trimmed = token.trim_start_matches(separator);
                // Composer include paths use `/`, namespaces use `\`
                if separator == "\\" && !trimmed.contains('\\') {
                    return trimmed.split('/').next().unwrap_or(trimmed).to_string();
                }
                trimmed
                    .split(separator)
                    .filter(|s| !s.is_empty())
                    .take(count)
                    .collect::<Vec<_>>()
                    .join(separator)
            }
        }
    }

    /// The language family this ecosystem serves.
    pub fn language(&self) -> Language {
        match self {
            Ecosystem::Npm => Language::JavaScript,
            Ecosystem::Pypi | Ecosystem::PythonStdlib => Language::Python,
            Ecosystem::Go | Ecosystem::GoStdlib => Language::Go,
            Ecosystem::Maven | Ecosystem::Jdk => Language::Java,
            Ecosystem::Nuget | Ecosystem::Dotnet => Language::CSharp,
            Ecosystem::Composer => Language::Php,
            Ecosystem::Gem => Language::Ruby,
            Ecosystem::Crates | Ecosystem::RustStd => Language::Rust,
            Ecosystem::System => Language::C,
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
