//! PHP: `require`/`require_once`/`include`/`include_once` with a literal path
//! (optionally prefixed by `__DIR__ .`), and top-level namespace `use`.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(
    INCLUDE,
    r#"\b(require_once|require|include_once|include)\b\s*\(?\s*(__DIR__\s*\.\s*|dirname\s*\(\s*__FILE__\s*\)\s*\.\s*)?['"]([^'"]+)['"]"#
);
// Trait `use` inside class bodies is indented; namespace imports are not
pattern!(
    USE,
    r"^use\s+(?:function\s+|const\s+)?\\?([A-Za-z_][\w\\]*)"
);

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (Some(include), Some(use_stmt)) = (INCLUDE.as_ref(), USE.as_ref()) else {
        return hits;
    };

    for (line, text) in code_lines(content, CommentStyle::SlashAndHash) {
        for caps in include.captures_iter(text) {
            let kind = if caps[1].starts_with("require") {
                ReferenceKind::Require
            } else {
                ReferenceKind::Include
            };
            let path = &caps[3];
            let token = if caps.get(2).is_some() {
                // __DIR__ . '/x.php' is relative to the including file
                format!(".{}{}", if path.starts_with('/') { "" } else { "/" }, path)
            } else {
                path.to_string()
            };
            hits.push(Hit::new(line, token, kind));
        }

        if let Some(caps) = use_stmt.captures(text) {
            let namespace = caps[1].trim_end_matches('\\');
            hits.push(Hit::new(line, namespace, ReferenceKind::Use));
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(content: &str) -> Vec<(String, ReferenceKind)> {
        scan(content).into_iter().map(|h| (h.token, h.kind)).collect()
    }

    #[test]
    fn test_includes() {
        let content = r#"<?php
require_once 'config.php';
include("views/header.php");
require __DIR__ . '/lib/db.php';
include_once dirname(__FILE__) . '/helpers.php';
// require 'old.php';
"#;
        assert_eq!(
            tokens(content),
            vec![
                ("config.php".to_string(), ReferenceKind::Require),
                ("views/header.php".to_string(), ReferenceKind::Include),
                ("./lib/db.php".to_string(), ReferenceKind::Require),
                ("./helpers.php".to_string(), ReferenceKind::Include),
            ]
        );
    }

    #[test]
    fn test_namespace_use() {
        let content = r#"<?php
namespace App\Http;

use App\Models\User;
use Illuminate\Support\{Arr, Str};
use function App\helpers\format_date;

class Controller {
    use Authorizes;
}
"#;
        let got: Vec<String> = tokens(content).into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            got,
            vec!["App\\Models\\User", "Illuminate\\Support", "App\\helpers\\format_date"]
        );
    }
}
