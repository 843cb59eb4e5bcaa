//! Python: `import a, b.c as d`, `from x.y import z`, `from . import m`.

use super::{code_lines, CommentStyle, Hit, ReferenceKind};

pattern!(IMPORT, r"^\s*import\s+(.+)$");
pattern!(
    FROM_IMPORT,
    r"^\s*from\s+(\.+[A-Za-z_][\w.]*|\.+|[A-Za-z_][\w.]*)\s+import\s+(.+)$"
);

pub fn scan(content: &str) -> Vec<Hit> {
    let mut hits = Vec::new();
    let (Some(import), Some(from_import)) = (IMPORT.as_ref(), FROM_IMPORT.as_ref()) else {
        return hits;
    };

    for (line, text) in code_lines(content, CommentStyle::Python) {
        for statement in text.split(';') {
            if let Some(caps) = from_import.captures(statement) {
                let module = &caps[1];
                if module.chars().all(|c| c == '.') {
                    // `from . import a, b` names sibling modules
                    let names = imported_names(&caps[2]);
                    if names.is_empty() {
                        hits.push(Hit::new(line, module, ReferenceKind::Import));
                    }
                    for name in names {
                        hits.push(Hit::new(line, format!("{}{}", module, name), ReferenceKind::Import));
                    }
                } else {
                    hits.push(Hit::new(line, module, ReferenceKind::Import));
                }
            } else if let Some(caps) = import.captures(statement) {
                for name in imported_names(&caps[1]) {
                    hits.push(Hit::new(line, name, ReferenceKind::Import));
                }
            }
        }
    }
    hits
}

/// Names in an import list, without `as` aliases, parentheses or `*`.
fn imported_names(list: &str) -> Vec<&str> {
    list.trim()
        .trim_start_matches('(')
        .trim_end_matches(['\\', ')'])
        .split(',')
        .filter_map(|part| part.split_whitespace().next())
        .filter(|name| is_module_name(name))
        .collect()
}

fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}
