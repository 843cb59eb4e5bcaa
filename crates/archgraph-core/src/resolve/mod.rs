//! Reference Resolver
//!
//! Maps each raw reference to an internal node (a repository path, a Go
//! package directory, or a declared package/namespace) or to an external
//! package in one of the known ecosystems. Resolution is pure: every lookup
//! goes through the [`RepoIndex`].
//!
//! References are dropped (resolve to `None`) when they are empty, when a
//! relative path climbs above the repository root, or when they point back at
//! the importing file.

pub mod external;
pub mod paths;
mod rules;

use crate::detect::RawReference;
use crate::index::RepoIndex;
use crate::language::{Ecosystem, Language};

/// Graph node identifier.
///
/// Internal: a repo-relative path or module name. External:
/// `"{ecosystem}:{package}"`.
pub type NodeId = String;

/// Where a reference points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Internal {
        id: NodeId,
        language: Language,
    },
    External {
        ecosystem: Ecosystem,
        package: String,
        /// Language of the importing file
        language: Language,
    },
}

impl Target {
    pub fn node_id(&self) -> NodeId {
        match self {
            Target::Internal { id, .. } => id.clone(),
            Target::External {
                ecosystem, package, ..
            } => format!("{}:{}", ecosystem.as_str(), package),
        }
    }
}

/// Resolves references against one repository index.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a RepoIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a RepoIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a RepoIndex {
        self.index
    }

    /// Resolve one reference, or `None` when it is dropped.
    pub fn resolve(&self, reference: &RawReference) -> Option<Target> {
        let token = reference.raw_token.trim();
        if token.is_empty() {
            return None;
        }
        let language = self
            .index
            .language_of(&reference.from_file)
            .or_else(|| Language::from_path(&reference.from_file))?;

        let ctx = rules::Context {
            index: self.index,
            from_file: &reference.from_file,
            from_dir: paths::parent_dir(&reference.from_file),
            language,
            kind: reference.kind,
        };

        let target = match language {
            Language::Python => rules::python(&ctx, token),
            Language::JavaScript | Language::TypeScript => rules::javascript(&ctx, token),
            Language::Go => rules::go(&ctx, token),
            Language::Java | Language::Kotlin => rules::jvm(&ctx, token),
            Language::CSharp => rules::csharp(&ctx, token),
            Language::Php => rules::php(&ctx, token),
            Language::Ruby => rules::ruby(&ctx, token),
            Language::Rust => rules::rust(&ctx, token),
            Language::C | Language::Cpp => rules::cfamily(&ctx, token),
        }?;

        match &target {
            Target::Internal { id, .. } if id == &reference.from_file || id.is_empty() => None,
            _ => Some(target),
        }
    }

    /// Declared version of an external package, seen from `from_file`.
    pub fn package_version(
        &self,
        from_file: &str,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Option<String> {
        self.index
            .declared_version(from_file, ecosystem, package)
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::SourceFile;
    use crate::detect::ReferenceKind;
    use crate::manifest;

    fn index_of(files: &[(&str, &str)]) -> RepoIndex {
        let sources: Vec<SourceFile> = files
            .iter()
            .filter_map(|(path, content)| {
                Language::from_path(path).map(|language| SourceFile {
                    path: path.to_string(),
                    language,
                    content: content.to_string(),
                })
            })
            .collect();
        let manifests: Vec<_> = files
            .iter()
            .filter_map(|(path, content)| manifest::parse(path, content).ok())
            .collect();
        RepoIndex::build(&sources, &manifests)
    }

    fn resolve(index: &RepoIndex, from: &str, token: &str) -> Option<String> {
        let kind = match Language::from_path(from) {
            Some(Language::Php) if !token.contains('\\') => ReferenceKind::Require,
            Some(Language::Php) | Some(Language::CSharp) | Some(Language::Rust) => ReferenceKind::Use,
            Some(Language::C) | Some(Language::Cpp) => ReferenceKind::Include,
            _ => ReferenceKind::Import,
        };
        let reference = RawReference {
            from_file: from.to_string(),
            raw_token: token.to_string(),
            kind,
            line: 1,
        };
        Resolver::new(index).resolve(&reference).map(|t| t.node_id())
    }

    #[test]
    fn test_python_absolute_and_relative() {
        let index = index_of(&[
            ("a.py", ""),
            ("b.py", ""),
            ("pkg/__init__.py", ""),
            ("pkg/models.py", ""),
            ("pkg/sub/views.py", ""),
        ]);
        assert_eq!(resolve(&index, "a.py", "b").as_deref(), Some("b.py"));
        assert_eq!(resolve(&index, "a.py", "os").as_deref(), Some("stdlib:os"));
        assert_eq!(resolve(&index, "a.py", "os.path").as_deref(), Some("stdlib:os"));
        assert_eq!(resolve(&index, "a.py", "requests.adapters").as_deref(), Some("pypi:requests"));
        assert_eq!(resolve(&index, "a.py", "pkg").as_deref(), Some("pkg/__init__.py"));
        assert_eq!(resolve(&index, "a.py", "pkg.models.User").as_deref(), Some("pkg/models.py"));
        assert_eq!(resolve(&index, "pkg/sub/views.py", "..models").as_deref(), Some("pkg/models.py"));
        assert_eq!(resolve(&index, "pkg/sub/views.py", "..").as_deref(), Some("pkg/__init__.py"));
        // unresolved but inside the repository
        assert_eq!(resolve(&index, "pkg/sub/views.py", ".missing").as_deref(), Some("pkg/sub/missing"));
        // escapes the root
        assert_eq!(resolve(&index, "a.py", "..up"), None);
    }

    #[test]
    fn test_self_reference_dropped() {
        let index = index_of(&[("pkg/models.py", "")]);
        assert_eq!(resolve(&index, "pkg/models.py", ".models"), None);
        assert_eq!(resolve(&index, "pkg/models.py", "pkg.models"), None);
    }

    #[test]
    fn test_javascript_rules() {
        let index = index_of(&[
            ("src/app.ts", ""),
            ("src/util.ts", ""),
            ("src/components/index.tsx", ""),
            ("src/lib/esm.ts", ""),
        ]);
        assert_eq!(resolve(&index, "src/app.ts", "./util").as_deref(), Some("src/util.ts"));
        assert_eq!(resolve(&index, "src/app.ts", "./components").as_deref(), Some("src/components/index.tsx"));
        assert_eq!(resolve(&index, "src/app.ts", "./lib/esm.js").as_deref(), Some("src/lib/esm.ts"));
        assert_eq!(resolve(&index, "src/app.ts", "@/util").as_deref(), Some("src/util.ts"));
        assert_eq!(resolve(&index, "src/app.ts", "src/util").as_deref(), Some("src/util.ts"));
        assert_eq!(resolve(&index, "src/app.ts", "lodash/fp/map").as_deref(), Some("npm:lodash"));
        assert_eq!(resolve(&index, "src/app.ts", "@scope/pkg/x").as_deref(), Some("npm:@scope/pkg"));
        assert_eq!(resolve(&index, "src/app.ts", "node:fs").as_deref(), Some("npm:fs"));
        assert_eq!(resolve(&index, "src/app.ts", "./styles.css").as_deref(), Some("src/styles.css"));
        assert_eq!(resolve(&index, "src/app.ts", "../../outside"), None);
    }

    #[test]
    fn test_go_rules() {
        let index = index_of(&[
            ("go.mod", "module github.com/acme/shop\n"),
            ("cmd/server/main.go", ""),
            ("internal/db/db.go", ""),
        ]);
        let from = "cmd/server/main.go";
        assert_eq!(resolve(&index, from, "github.com/acme/shop/internal/db").as_deref(), Some("internal/db"));
        assert_eq!(resolve(&index, from, "github.com/acme/shop").as_deref(), Some("github.com/acme/shop"));
        assert_eq!(resolve(&index, from, "net/http").as_deref(), Some("gostd:net"));
        assert_eq!(resolve(&index, from, "github.com/spf13/cobra/doc").as_deref(), Some("go:github.com/spf13/cobra"));
    }

    #[test]
    fn test_jvm_rules() {
        let index = index_of(&[
            ("src/main/java/com/acme/shop/Cart.java", "package com.acme.shop;\n"),
            ("src/main/java/com/acme/shop/model/Item.java", "package com.acme.shop.model;\n"),
            ("src/main/kotlin/app/data/Repo.kt", "package app.data\n"),
        ]);
        let from = "src/main/java/com/acme/shop/Cart.java";
        assert_eq!(
            resolve(&index, from, "com.acme.shop.model.Item").as_deref(),
            Some("src/main/java/com/acme/shop/model/Item.java")
        );
        assert_eq!(
            resolve(&index, "src/main/kotlin/app/data/Repo.kt", "com.acme.shop.Cart.TAX").as_deref(),
            Some("src/main/java/com/acme/shop/Cart.java")
        );
        assert_eq!(resolve(&index, from, "com.acme.shop.model.*").as_deref(), Some("com.acme.shop.model"));
        assert_eq!(resolve(&index, from, "java.util.List").as_deref(), Some("jdk:java.util"));
        assert_eq!(
            resolve(&index, from, "org.springframework.boot.SpringApplication").as_deref(),
            Some("maven:org.springframework")
        );
    }

    #[test]
    fn test_csharp_rules() {
        let index = index_of(&[
            ("Core/Models.cs", "namespace Acme.Core.Models;\n"),
            ("Web/Program.cs", "namespace Acme.Web;\n"),
        ]);
        let from = "Web/Program.cs";
        assert_eq!(resolve(&index, from, "Acme.Core.Models").as_deref(), Some("Acme.Core.Models"));
        assert_eq!(resolve(&index, from, "Acme.Core.Models.Order").as_deref(), Some("Acme.Core.Models"));
        assert_eq!(resolve(&index, from, "System.Text.Json").as_deref(), Some("dotnet:System.Text"));
        assert_eq!(resolve(&index, from, "Newtonsoft.Json").as_deref(), Some("nuget:Newtonsoft.Json"));
    }

    #[test]
    fn test_php_rules() {
        let index = index_of(&[
            ("public/index.php", ""),
            ("config.php", ""),
            ("lib/db.php", ""),
            ("app/Models/User.php", "<?php\nnamespace App\\Models;\n"),
        ]);
        let from = "public/index.php";
        assert_eq!(resolve(&index, from, "../config.php").as_deref(), Some("config.php"));
        assert_eq!(resolve(&index, from, "config.php").as_deref(), Some("config.php"));
        assert_eq!(resolve(&index, "lib/db.php", "./db.php"), None);
        assert_eq!(resolve(&index, from, "App\\Models\\User").as_deref(), Some("app/Models/User.php"));
        assert_eq!(resolve(&index, from, "App\\Models\\Post").as_deref(), Some("App\\Models"));
        assert_eq!(
            resolve(&index, from, "Monolog\\Handler\\StreamHandler").as_deref(),
            Some("composer:Monolog\\Handler")
        );
        assert_eq!(resolve(&index, from, "vendor/autoload.php").as_deref(), Some("composer:vendor"));
    }

    #[test]
    fn test_ruby_rules() {
        let index = index_of(&[("app.rb", ""), ("lib/shop/cart.rb", ""), ("models/user.rb", "")]);
        assert_eq!(resolve(&index, "app.rb", "./models/user").as_deref(), Some("models/user.rb"));
        assert_eq!(resolve(&index, "app.rb", "shop/cart").as_deref(), Some("lib/shop/cart.rb"));
        assert_eq!(resolve(&index, "app.rb", "active_support/core_ext").as_deref(), Some("gem:active_support"));
    }

    #[test]
    fn test_rust_rules() {
        let index = index_of(&[
            ("src/lib.rs", ""),
            ("src/config.rs", ""),
            ("src/graph/mod.rs", ""),
            ("src/graph/edge.rs", ""),
            ("Cargo.toml", "[package]\nname = \"demo\"\n[dependencies]\nserde = \"1.0\"\n"),
        ]);
        assert_eq!(resolve(&index, "src/lib.rs", "self::config").as_deref(), Some("src/config.rs"));
        assert_eq!(resolve(&index, "src/lib.rs", "self::graph").as_deref(), Some("src/graph/mod.rs"));
        assert_eq!(resolve(&index, "src/graph/mod.rs", "self::edge").as_deref(), Some("src/graph/edge.rs"));
        assert_eq!(resolve(&index, "src/graph/edge.rs", "super::super::config").as_deref(), Some("src/config.rs"));
        assert_eq!(resolve(&index, "src/graph/edge.rs", "crate::config::Config").as_deref(), Some("src/config.rs"));
        assert_eq!(resolve(&index, "src/config.rs", "crate::Error").as_deref(), Some("src/lib.rs"));
        assert_eq!(resolve(&index, "src/lib.rs", "config::Config").as_deref(), Some("src/config.rs"));
        assert_eq!(resolve(&index, "src/lib.rs", "std::collections").as_deref(), Some("rust-std:std"));
        assert_eq!(resolve(&index, "src/lib.rs", "serde::Serialize").as_deref(), Some("crates:serde"));
    }

    #[test]
    fn test_cfamily_rules() {
        let index = index_of(&[
            ("src/main.c", ""),
            ("src/util.h", ""),
            ("include/mylib/api.h", ""),
        ]);
        let from = "src/main.c";
        assert_eq!(resolve(&index, from, "util.h").as_deref(), Some("src/util.h"));
        assert_eq!(resolve(&index, from, "mylib/api.h").as_deref(), Some("include/mylib/api.h"));
        assert_eq!(resolve(&index, from, "<mylib/api.h>").as_deref(), Some("include/mylib/api.h"));
        assert_eq!(resolve(&index, from, "<stdio.h>").as_deref(), Some("system:stdio.h"));
        assert_eq!(resolve(&index, from, "<boost/asio.hpp>").as_deref(), Some("system:boost"));
        assert_eq!(resolve(&index, from, "../gen/version.h").as_deref(), Some("gen/version.h"));
    }

    #[test]
    fn test_package_version_lookup() {
        let index = index_of(&[
            ("web/index.js", ""),
            ("web/package.json", r#"{"dependencies": {"lodash": "^4.17.21"}}"#),
        ]);
        let resolver = Resolver::new(&index);
        assert_eq!(
            resolver.package_version("web/index.js", Ecosystem::Npm, "lodash").as_deref(),
            Some("^4.17.21")
        );
        assert_eq!(resolver.package_version("index.js", Ecosystem::Npm, "lodash"), None);
    }
}
