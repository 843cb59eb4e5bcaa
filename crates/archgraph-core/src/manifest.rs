//! Manifest Reader
//!
//! Parses package manifests into dependency name → version maps. The resolver
//! uses them for two things: Go `module` paths decide which imports are
//! internal, and declared dependency versions become external node metadata.
//!
//! ## Supported Manifest Files
//!
//! | Filename | Ecosystem | Format |
//! |----------|-----------|--------|
//! | package.json | npm | JSON |
//! | composer.json | composer | JSON |
//! | Cargo.toml | crates | TOML |
//! | pyproject.toml | pypi | TOML (PEP 621 and Poetry) |
//! | requirements.txt | pypi | line based |
//! | go.mod | go | line based |
//! | Gemfile | gem | line based |

use std::collections::BTreeMap;

use thiserror::Error;

use crate::language::Ecosystem;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during manifest parsing.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file type not recognized
    #[error("Unrecognized manifest file: {0}")]
    UnrecognizedManifest(String),

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Manifest kinds
// ============================================================================

/// Recognized manifest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    PackageJson,
    ComposerJson,
    CargoToml,
    PyprojectToml,
    Requirements,
    GoMod,
    Gemfile,
}

impl ManifestKind {
    /// Detect the manifest kind from a bare file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "package.json" => Some(ManifestKind::PackageJson),
            "composer.json" => Some(ManifestKind::ComposerJson),
            "Cargo.toml" => Some(ManifestKind::CargoToml),
            "pyproject.toml" => Some(ManifestKind::PyprojectToml),
            "go.mod" => Some(ManifestKind::GoMod),
            "Gemfile" => Some(ManifestKind::Gemfile),
            n if n.starts_with("requirements") && n.ends_with(".txt") => {
                Some(ManifestKind::Requirements)
            }
            _ => None,
        }
    }

    /// The ecosystem whose packages this manifest declares.
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::PackageJson => Ecosystem::Npm,
            ManifestKind::ComposerJson => Ecosystem::Composer,
            ManifestKind::CargoToml => Ecosystem::Crates,
            ManifestKind::PyprojectToml | ManifestKind::Requirements => Ecosystem::Pypi,
            ManifestKind::GoMod => Ecosystem::Go,
            ManifestKind::Gemfile => Ecosystem::Gem,
        }
    }
}

// ============================================================================
// Manifest Info
// ============================================================================

/// Information extracted from a manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Repo-relative path of the manifest
    pub path: String,
    /// Directory containing the manifest (`""` for the root)
    pub dir: String,
    pub kind: ManifestKind,
    /// Package/crate name, when declared
    pub name: Option<String>,
    /// Go module path from `module`
    pub module_path: Option<String>,
    /// Normalized dependency name → version requirement
    pub dependencies: BTreeMap<String, String>,
}

impl ManifestInfo {
    fn new(path: &str, kind: ManifestKind) -> Self {
        let dir = path.rsplit_once('/').map(|(d, _)| d).unwrap_or("").to_string();
        Self {
            path: path.to_string(),
            dir,
            kind,
            name: None,
            module_path: None,
            dependencies: BTreeMap::new(),
        }
    }

    /// Look up the declared version requirement of `package`.
    ///
    /// Names are compared after [`normalize_package_name`], so `serde_json`
    /// finds `serde-json` and `Symfony\Console` finds `symfony/console`.
    pub fn version_of(&self, package: &str) -> Option<&str> {
        let key = self.key_for(package);
        if let Some(version) = self.dependencies.get(&key) {
            return Some(version.as_str());
        }
        // go.mod requires modules; an import may name a package inside one
        if self.kind == ManifestKind::GoMod {
            return self
                .dependencies
                .iter()
                .filter(|(module, _)| key.starts_with(&format!("{}/", module)))
                .max_by_key(|(module, _)| module.len())
                .map(|(_, version)| version.as_str());
        }
        None
    }

    fn key_for(&self, name: &str) -> String {
        match self.kind {
            // Go module paths contain dots and dashes that are significant
            ManifestKind::GoMod => name.trim().to_lowercase(),
            _ => normalize_package_name(name),
        }
    }

    fn add_dependency(&mut self, name: &str, version: impl Into<String>) {
        let key = self.key_for(name);
        if key.is_empty() {
            return;
        }
        // first declaration wins: runtime dependencies are read before dev ones
        self.dependencies.entry(key).or_insert_with(|| version.into());
    }
}

/// Canonical form used when matching import names against manifest entries.
pub fn normalize_package_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\\')
        .to_lowercase()
        .replace('\\', "/")
        .replace(['-', '.'], "_")
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a manifest by path and content.
pub fn parse(path: &str, content: &str) -> Result<ManifestInfo, ManifestError> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let kind = ManifestKind::from_file_name(file_name)
        .ok_or_else(|| ManifestError::UnrecognizedManifest(path.to_string()))?;

    let mut info = ManifestInfo::new(path, kind);
    match kind {
        ManifestKind::PackageJson => parse_package_json(content, &mut info)?,
        ManifestKind::ComposerJson => parse_composer_json(content, &mut info)?,
        ManifestKind::CargoToml => parse_cargo_toml(content, &mut info)?,
        ManifestKind::PyprojectToml => parse_pyproject(content, &mut info)?,
        ManifestKind::Requirements => parse_requirements(content, &mut info),
        ManifestKind::GoMod => parse_go_mod(content, &mut info),
        ManifestKind::Gemfile => parse_gemfile(content, &mut info),
    }
    Ok(info)
}

fn parse_json(content: &str, info: &ManifestInfo) -> Result<serde_json::Value, ManifestError> {
    serde_json::from_str(content).map_err(|source| ManifestError::Json {
        path: info.path.clone(),
        source,
    })
}

fn parse_toml(content: &str, info: &ManifestInfo) -> Result<toml::Value, ManifestError> {
    content
        .parse::<toml::Value>()
        .map_err(|source| ManifestError::Toml {
            path: info.path.clone(),
            source,
        })
}

fn add_json_section(info: &mut ManifestInfo, value: &serde_json::Value, section: &str) {
    if let Some(deps) = value.get(section).and_then(|d| d.as_object()) {
        for (name, version) in deps {
            let version = version.as_str().unwrap_or("*");
            info.add_dependency(name, version);
        }
    }
}

fn parse_package_json(content: &str, info: &mut ManifestInfo) -> Result<(), ManifestError> {
    let value = parse_json(content, info)?;
    info.name = value.get("name").and_then(|n| n.as_str()).map(String::from);
    for section in [
        "dependencies",
        "peerDependencies",
        "optionalDependencies",
        "devDependencies",
    ] {
        add_json_section(info, &value, section);
    }
    Ok(())
}

fn parse_composer_json(content: &str, info: &mut ManifestInfo) -> Result<(), ManifestError> {
    let value = parse_json(content, info)?;
    info.name = value.get("name").and_then(|n| n.as_str()).map(String::from);
    add_json_section(info, &value, "require");
    add_json_section(info, &value, "require-dev");
    Ok(())
}

/// Version of a Cargo dependency entry: a string or a table with `version`.
fn cargo_version(entry: &toml::Value) -> String {
    match entry {
        toml::Value::String(v) => v.clone(),
        toml::Value::Table(t) => {
            if let Some(v) = t.get("version").and_then(|v| v.as_str()) {
                v.to_string()
            } else if let Some(p) = t.get("path").and_then(|v| v.as_str()) {
                format!("path:{}", p)
            } else if t.get("workspace").and_then(|v| v.as_bool()) == Some(true) {
                "workspace".to_string()
            } else if let Some(g) = t.get("git").and_then(|v| v.as_str()) {
                format!("git:{}", g)
            } else {
                "*".to_string()
            }
        }
        _ => "*".to_string(),
    }
}

fn parse_cargo_toml(content: &str, info: &mut ManifestInfo) -> Result<(), ManifestError> {
    let value = parse_toml(content, info)?;
    info.name = value
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(String::from);

    let sections = [
        value.get("dependencies"),
        value.get("build-dependencies"),
        value.get("dev-dependencies"),
        value.get("workspace").and_then(|w| w.get("dependencies")),
    ];
    for table in sections.into_iter().flatten().filter_map(|s| s.as_table()) {
        for (name, entry) in table {
            // `package = "real-name"` renames the crate; the key is what code imports
            info.add_dependency(name, cargo_version(entry));
        }
    }
    Ok(())
}

fn parse_pyproject(content: &str, info: &mut ManifestInfo) -> Result<(), ManifestError> {
    let value = parse_toml(content, info)?;
    let project = value.get("project");
    let poetry = value.get("tool").and_then(|t| t.get("poetry"));

    info.name = project
        .or(poetry)
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(String::from);

    // PEP 621: dependencies = ["requests>=2.31", ...]
    if let Some(deps) = project
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        for spec in deps.iter().filter_map(|d| d.as_str()) {
            if let Some((name, version)) = split_requirement(spec) {
                info.add_dependency(&name, version);
            }
        }
    }

    // Poetry: [tool.poetry.dependencies] requests = "^2.31"
    if let Some(deps) = poetry
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for (name, entry) in deps {
            if name == "python" {
                continue;
            }
            info.add_dependency(name, cargo_version(entry));
        }
    }
    Ok(())
}

pattern!(
    REQUIREMENT,
    r"^\s*([A-Za-z0-9][A-Za-z0-9._\-]*)\s*(?:\[[^\]]*\])?\s*([<>=!~][^;#]*)?"
);

/// Split `requests[socks]>=2.31 ; python_version>'3'` into name and version spec.
fn split_requirement(spec: &str) -> Option<(String, String)> {
    let caps = REQUIREMENT.as_ref()?.captures(spec)?;
    let name = caps.get(1)?.as_str().to_string();
    let version = caps
        .get(2)
        .map(|v| v.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "*".to_string());
    Some((name, version))
}

fn parse_requirements(content: &str, info: &mut ManifestInfo) {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some((name, version)) = split_requirement(line) {
            info.add_dependency(&name, version);
        }
    }
}

fn parse_go_mod(content: &str, info: &mut ManifestInfo) {
    let mut in_require = false;
    for line in content.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        if in_require {
            if line.starts_with(')') {
                in_require = false;
                continue;
            }
            add_go_requirement(line, info);
            continue;
        }
        if let Some(module) = line.strip_prefix("module ") {
            info.module_path = Some(module.trim().trim_matches('"').to_string());
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                in_require = true;
            } else {
                add_go_requirement(rest, info);
            }
        }
    }
    info.name = info.module_path.clone();
}

fn add_go_requirement(line: &str, info: &mut ManifestInfo) {
    let mut parts = line.split_whitespace();
    if let (Some(module), Some(version)) = (parts.next(), parts.next()) {
        info.add_dependency(module, version);
    }
}

pattern!(
    GEM,
    r#"^\s*gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#
);

fn parse_gemfile(content: &str, info: &mut ManifestInfo) {
    let Some(gem) = GEM.as_ref() else {
        return;
    };
    for line in content.lines() {
        if let Some(caps) = gem.captures(line) {
            let name = &caps[1];
            let version = caps.get(2).map(|v| v.as_str()).unwrap_or("*");
            info.add_dependency(name, version);
        }
    }
}
