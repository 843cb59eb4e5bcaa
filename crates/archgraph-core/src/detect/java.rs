//! Java/Kotlin: `import a.b.C;`, `import static a.b.C.m;`, `import a.b.*;`,
//! and Kotlin's `import a.b.C as D`.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(
    IMPORT,
    r"^\s*import\s+(?:static\s+)?([A-Za-z_][\w]*(?:\.[A-Za-z_][\w]*)*(?:\.\*)?)"
);

pub fn scan(content: &str) -> Vec<Hit> {
    let Some(import) = IMPORT.as_ref() else {
        return Vec::new();
    };
    code_lines(content, CommentStyle::Slash)
        .into_iter()
        .filter_map(|(line, text)| {
            import
                .captures(text)
                .map(|caps| Hit::new(line, &caps[1], ReferenceKind::Import))
        })
        .collect()
}
