//! C/C++: `#include "x"` and `#include <x>`. Angle includes keep their
//! brackets in the token so the resolver can tell the two forms apart.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(INCLUDE, r#"^\s*#\s*(?:include|import)\s*([<"])([^>"]+)[>"]"#);

pub fn scan(content: &str) -> Vec<Hit> {
    let Some(include) = INCLUDE.as_ref() else {
        return Vec::new();
    };
    code_lines(content, CommentStyle::Slash)
        .into_iter()
        .filter_map(|(line, text)| {
            let caps = include.captures(text)?;
            let path = caps[2].trim();
            let token = if &caps[1] == "<" {
                format!("<{}>", path)
            } else {
                path.to_string()
            };
            Some(Hit::new(line, token, ReferenceKind::Include))
        })
        .collect()
}
