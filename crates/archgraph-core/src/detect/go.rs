//! Go: `import "x"`, `import alias "x"` and grouped `import ( … )` blocks.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(SINGLE, r#"^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#);
pattern!(BLOCK_OPEN, r"^\s*import\s*\((.*)$");
pattern!(SPEC, r#"^\s*(?:[\w.]+\s+)?"([^"]+)""#);
pattern!(QUOTED, r#""([^"]+)""#);

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (Some(single), Some(block_open), Some(spec), Some(quoted)) = (
        SINGLE.as_ref(),
        BLOCK_OPEN.as_ref(),
        SPEC.as_ref(),
        QUOTED.as_ref(),
    ) else {
        return hits;
    };

    let mut in_block = false;
    for (line, text) in code_lines(content, CommentStyle::Slash) {
        if in_block {
            if text.trim_start().starts_with(')') {
                in_block = false;
            } else if let Some(caps) = spec.captures(text) {
                hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
            }
            continue;
        }

        if let Some(caps) = block_open.captures(text) {
            // `import ("fmt"; "os")` on one line
            let rest = &caps[1];
            let (inside, closed) = match rest.find(')') {
                Some(pos) => (&rest[..pos], true),
                None => (rest, false),
            };
            for caps in quoted.captures_iter(inside) {
                hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
            }
            in_block = !closed;
        } else if let Some(caps) = single.captures(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(content: &str) -> Vec<String> {
        scan(content).into_iter().map(|h| h.token).collect()
    }

    #[test]
    fn test_single_imports() {
        let content = "package main\n\nimport \"fmt\"\nimport log \"github.com/sirupsen/logrus\"\n";
        assert_eq!(tokens(content), vec!["fmt", "github.com/sirupsen/logrus"]);
    }

    #[test]
    fn test_import_block() {
        let content = r#"package api

import (
	"context"
	"net/http"

	_ "github.com/lib/pq"
	chi "github.com/go-chi/chi/v5"
	// "github.com/unused/dep"
	. "github.com/acme/shop/internal/util"
)

func main() {}
"#;
        assert_eq!(
            tokens(content),
            vec![
                "context",
                "net/http",
                "github.com/lib/pq",
                "github.com/go-chi/chi/v5",
                "github.com/acme/shop/internal/util"
            ]
        );
    }

    #[test]
    fn test_one_line_block() {
        assert_eq!(tokens("import (\"fmt\"; \"os\")\nvar x = \"y\"\n"), vec!["fmt", "os"]);
    }
}
