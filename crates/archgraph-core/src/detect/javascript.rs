//! JavaScript/TypeScript: ES imports and re-exports, `require()`, dynamic
//! `import()`. Multi-line `import { … } from 'x'` statements are followed to
//! their `from` clause.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(
    IMPORT_FROM,
    r#"^\s*import\s+(?:type\s+)?[^'"`]*?\bfrom\s*['"]([^'"]+)['"]"#
);
pattern!(IMPORT_BARE, r#"^\s*import\s*['"]([^'"]+)['"]"#);
pattern!(
    EXPORT_FROM,
    r#"^\s*export\s+[^'"`]*?\bfrom\s*['"]([^'"]+)['"]"#
);
pattern!(
    OPEN_BRACE,
    r"^\s*(?:import|export)\s+(?:type\s+)?(?:[\w$]+\s*,\s*)?\{[^}]*$"
);
pattern!(FROM_CLAUSE, r#"\bfrom\s*['"]([^'"]+)['"]"#);
pattern!(REQUIRE, r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#);
pattern!(DYNAMIC_IMPORT, r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#);

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (
        Some(import_from),
        Some(import_bare),
        Some(export_from),
        Some(open_brace),
        Some(from_clause),
        Some(require),
        Some(dynamic_import),
    ) = (
        IMPORT_FROM.as_ref(),
        IMPORT_BARE.as_ref(),
        EXPORT_FROM.as_ref(),
        OPEN_BRACE.as_ref(),
        FROM_CLAUSE.as_ref(),
        REQUIRE.as_ref(),
        DYNAMIC_IMPORT.as_ref(),
    )
    else {
        return hits;
    };

    let mut pending = false;
    for (line, text) in code_lines(content, CommentStyle::Slash) {
        if pending {
            if let Some(caps) = from_clause.captures(text) {
                hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
                pending = false;
                continue;
            }
            if text.contains(';') {
                pending = false;
            }
        }

        let statement = import_from
            .captures(text)
            .or_else(|| import_bare.captures(text))
            .or_else(|| export_from.captures(text));
        if let Some(caps) = statement {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
        } else if open_brace.is_match(text) {
            pending = true;
        }

        for caps in require.captures_iter(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Require));
        }
        for caps in dynamic_import.captures_iter(text) {
            hits.push(Hit::new(line, &caps[1], ReferenceKind::Import));
        }
    }
    hits
}
