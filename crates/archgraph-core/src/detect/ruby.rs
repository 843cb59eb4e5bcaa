//! Ruby: `require 'x'` and `require_relative 'x'` (reported as `./x`).

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(REQUIRE, r#"^\s*require\s*\(?\s*['"]([^'"]+)['"]"#);
pattern!(REQUIRE_RELATIVE, r#"^\s*require_relative\s*\(?\s*['"]([^'"]+)['"]"#);

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (Some(require), Some(require_relative)) = (REQUIRE.as_ref(), REQUIRE_RELATIVE.as_ref())
    else {
        return hits;
    };

    for (line, text) in code_lines(content, CommentStyle::Hash) {
        if let Some(caps) = require_relative.captures(text) {
            let path = &caps[1];
            let token = if path.starts_with("./") || path.starts_with("../") {
                path.to_string()
            } else {
                format!("./{}", path)
            };
            hits.push(Hit::new(line, token, ReferenceKind::Require));
        } else if let Some(caps) = require.captures(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Require));
        }
    }
    hits
}
