//! Rust: `use` paths (the prefix before any `{…}` group), `mod name;`
//! declarations (reported as `self::name`) and `extern crate`.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(
    USE,
    r"^\s*(?:pub(?:\s*\([^)]*\))?\s+)?use\s+(?:::)?([A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)"
);
pattern!(
    MOD_DECL,
    r"^\s*(?:pub(?:\s*\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)\s*;"
);
pattern!(EXTERN_CRATE, r"^\s*extern\s+crate\s+([A-Za-z_]\w*)");

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (Some(use_decl), Some(mod_decl), Some(extern_crate)) =
        (USE.as_ref(), MOD_DECL.as_ref(), EXTERN_CRATE.as_ref())
    else {
        return hits;
    };

    for (line, text) in code_lines(content, CommentStyle::Slash) {
        if let Some(caps) = use_decl.captures(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Use));
        } else if let Some(caps) = mod_decl.captures(text) {
            hits.push(Hit::new(line, format!("self::{}", &caps[1]), ReferenceKind::Use));
        } else if let Some(caps) = extern_crate.captures(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Use));
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rust_references() {
        let content = r#"extern crate libc;

mod config;
pub(crate) mod graph;
mod tests {
}

use std::collections::{HashMap, HashSet};
use crate::config::Config;
pub use self::graph::*;
use super::util;
use ::serde::Serialize;
// use hidden::Thing;
"#;
        let tokens: Vec<String> = scan(content).into_iter().map(|h| h.token).collect();
        assert_eq!(
            tokens,
            vec![
                "libc",
                "self::config",
                "self::graph",
                "std::collections",
                "crate::config::Config",
                "self::graph",
                "super::util",
                "serde::Serialize"
            ]
        );
    }
}
