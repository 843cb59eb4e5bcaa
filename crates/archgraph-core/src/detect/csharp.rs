//! C#: `using A.B;`, `using static A.B;`, `global using A.B;` and aliases,
//! where the aliased namespace is the token.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(
    USING,
    r"^\s*(?:global\s+)?using\s+(?:static\s+)?(?:[A-Za-z_]\w*\s*=\s*)?([A-Za-z_][\w.]*)\s*[;<]"
);

pub fn scan(content: &str) -> Vec<Hit> {
    let Some(using) = USING.as_ref() else {
        return Vec::new();
    };
    code_lines(content, CommentStyle::Slash)
        .into_iter()
        .filter_map(|(line, text)| {
            using
                .captures(text)
                .map(|caps| Hit::new(line, &caps[1], ReferenceKind::Use))
        })
        .collect()
}
