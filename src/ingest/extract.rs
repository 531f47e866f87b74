//! Pattern-based structural extraction for ECMAScript-family sources.
//!
//! This is deliberately not a parser. Each construct has its own matcher:
//! - static `import` (default, named, namespace and combined forms, `import type`)
//! - dynamic `import('<spec>')`
//! - CommonJS `require` bound to a plain or destructured name
//! - `export ... from '<spec>'` (an import and an export at once)
//! - named, default and list exports
//! - function and class definitions
//!
//! Comments are blanked out before matching so commented-out code yields
//! nothing. Template interpolations and other unusual formatting can still be
//! mis-extracted; extraction never fails, it only degrades.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One import statement, merged across all occurrences of its specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedImport {
    pub specifier: String,
    /// True iff the specifier starts with `.` or `/`
    pub is_relative: bool,
    /// True only if every occurrence of the specifier was a runtime `import()`
    pub is_dynamic: bool,
    pub imported_names: Vec<String>,
}

/// Imports, exports and definitions of one file, each in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFileStructure {
    pub imports: Vec<ParsedImport>,
    pub exports: Vec<String>,
    pub definitions: Vec<String>,
}

/// Marker recorded in exports for `export * from '<spec>'`.
pub const STAR_EXPORT: &str = "*";

/// Marker recorded for a default export with no declared name.
pub const DEFAULT_EXPORT: &str = "default";

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bimport\s+(?:type\s+)?(?:(?P<clause>(?:[A-Za-z_$][\w$]*\s*,\s*)?(?:\{[^}]*\}|\*\s*as\s+[A-Za-z_$][\w$]*)|[A-Za-z_$][\w$]*)\s*from\s*)?['"](?P<spec>[^'"\r\n]+)['"]"#,
    )
    .expect("static import regex")
});

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"](?P<spec>[^'"\r\n]+)['"]\s*[,)]"#)
        .expect("dynamic import regex")
});

static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:const|let|var|import)\s+(?:(?P<destructured>\{[^}]*\})|(?P<binding>[A-Za-z_$][\w$]*))\s*=\s*require\s*\(\s*['"](?P<spec>[^'"\r\n]+)['"]\s*\)"#,
    )
    .expect("require regex")
});

static EXPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bexport\s+(?:type\s+)?(?P<clause>\{[^}]*\}|\*(?:\s*as\s+(?P<ns>[A-Za-z_$][\w$]*))?)\s*from\s*['"](?P<spec>[^'"\r\n]+)['"]"#,
    )
    .expect("export-from regex")
});

static EXPORT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bexport\s+(?:type\s+)?\{(?P<names>[^}]*)\}"#).expect("export list regex")
});

static EXPORT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bexport\s+(?:declare\s+)?(?:(?:async\s+)?function\s*\*?|const\s+enum|abstract\s+class|const|let|var|class|enum|interface|type|namespace)\s+(?P<name>[A-Za-z_$][\w$]*)"#,
    )
    .expect("export declaration regex")
});

static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bexport\s+default\s+(?:(?:async\s+)?function\s*\*?\s*|(?:abstract\s+)?class\s+|interface\s+|const\s+|let\s+|var\s+)?(?P<name>[A-Za-z_$][\w$]*)?"#,
    )
    .expect("export default regex")
});

static FUNCTION_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bfunction\b\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)"#).expect("function regex")
});

static CLASS_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bclass\s+(?P<name>[A-Za-z_$][\w$]*)"#).expect("class regex")
});

/// Words that can follow `export default` or `class` without being a name.
const NOT_A_NAME: &[&str] = &[
    "async", "await", "class", "extends", "false", "function", "implements", "new", "null",
    "this", "true", "typeof", "undefined", "void", "yield",
];

/// A specifier is relative iff it starts with `.` or `/`.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/')
}

/// Extract the module structure of one file's text.
///
/// Pure and deterministic: identical text always yields an identical result.
pub fn extract(text: &str) -> ParsedFileStructure {
    if text.trim().is_empty() {
        return ParsedFileStructure::default();
    }
    let code = mask_comments(text);

    ParsedFileStructure {
        imports: extract_imports(&code),
        exports: extract_exports(&code),
        definitions: extract_definitions(&code),
    }
}

struct ImportOccurrence {
    offset: usize,
    specifier: String,
    dynamic: bool,
    names: Vec<String>,
}

fn extract_imports(code: &str) -> Vec<ParsedImport> {
    let mut found: Vec<ImportOccurrence> = Vec::new();

    for caps in STATIC_IMPORT.captures_iter(code) {
        let names = caps
            .name("clause")
            .map(|m| import_clause_names(m.as_str()))
            .unwrap_or_default();
        found.push(ImportOccurrence {
            offset: caps.get(0).map_or(0, |m| m.start()),
            specifier: caps["spec"].to_string(),
            dynamic: false,
            names,
        });
    }

    for caps in DYNAMIC_IMPORT.captures_iter(code) {
        found.push(ImportOccurrence {
            offset: caps.get(0).map_or(0, |m| m.start()),
            specifier: caps["spec"].to_string(),
            dynamic: true,
            names: Vec::new(),
        });
    }

    for caps in REQUIRE.captures_iter(code) {
        let names = if let Some(list) = caps.name("destructured") {
            destructured_names(list.as_str())
        } else {
            caps.name("binding")
                .map(|m| vec![m.as_str().to_string()])
                .unwrap_or_default()
        };
        found.push(ImportOccurrence {
            offset: caps.get(0).map_or(0, |m| m.start()),
            specifier: caps["spec"].to_string(),
            dynamic: false,
            names,
        });
    }

    for caps in EXPORT_FROM.captures_iter(code) {
        let clause = &caps["clause"];
        let names = if clause.starts_with('{') {
            brace_names(clause, Binding::Imported)
        } else {
            Vec::new()
        };
        found.push(ImportOccurrence {
            offset: caps.get(0).map_or(0, |m| m.start()),
            specifier: caps["spec"].to_string(),
            dynamic: false,
            names,
        });
    }

    found.sort_by_key(|occ| occ.offset);
    merge_imports(found)
}

/// Collapse occurrences by specifier, keeping first-seen order.
fn merge_imports(found: Vec<ImportOccurrence>) -> Vec<ParsedImport> {
    let mut imports: Vec<ParsedImport> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for occ in found {
        match index.get(&occ.specifier) {
            Some(&i) => {
                let existing = &mut imports[i];
                existing.is_dynamic &= occ.dynamic;
                for name in occ.names {
                    if !existing.imported_names.contains(&name) {
                        existing.imported_names.push(name);
                    }
                }
            }
            None => {
                index.insert(occ.specifier.clone(), imports.len());
                let mut names: Vec<String> = Vec::new();
                for name in occ.names {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                imports.push(ParsedImport {
                    is_relative: is_relative(&occ.specifier),
                    specifier: occ.specifier,
                    is_dynamic: occ.dynamic,
                    imported_names: names,
                });
            }
        }
    }
    imports
}

fn extract_exports(code: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in EXPORT_DECLARATION.captures_iter(code) {
        if let Some(name) = caps.name("name") {
            found.push((name.start(), name.as_str().to_string()));
        }
    }

    for caps in EXPORT_DEFAULT.captures_iter(code) {
        let offset = caps.get(0).map_or(0, |m| m.start());
        let name = caps
            .name("name")
            .map(|m| m.as_str())
            .filter(|name| !NOT_A_NAME.contains(name))
            .unwrap_or(DEFAULT_EXPORT);
        found.push((offset, name.to_string()));
    }

    for caps in EXPORT_LIST.captures_iter(code) {
        let offset = caps.get(0).map_or(0, |m| m.start());
        for name in brace_names(&caps["names"], Binding::Exported) {
            found.push((offset, name));
        }
    }

    for caps in EXPORT_FROM.captures_iter(code) {
        let offset = caps.get(0).map_or(0, |m| m.start());
        let clause = &caps["clause"];
        if clause.starts_with('*') {
            let name = caps.name("ns").map_or(STAR_EXPORT, |m| m.as_str());
            found.push((offset, name.to_string()));
        }
    }

    ordered_unique(found)
}

fn extract_definitions(code: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for regex in [&*FUNCTION_DEF, &*CLASS_DEF] {
        for caps in regex.captures_iter(code) {
            if let Some(name) = caps.name("name") {
                if !NOT_A_NAME.contains(&name.as_str()) {
                    found.push((name.start(), name.as_str().to_string()));
                }
            }
        }
    }

    ordered_unique(found)
}

/// Sort by offset (stable) and keep the first occurrence of each name.
fn ordered_unique(mut found: Vec<(usize, String)>) -> Vec<String> {
    found.sort_by_key(|(offset, _)| *offset);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, name)| seen.insert(name.clone()).then_some(name))
        .collect()
}

#[derive(Clone, Copy)]
enum Binding {
    /// `a as b` yields `a`
    Imported,
    /// `a as b` yields `b`
    Exported,
}

/// Names in a `{ ... }` list, with `type` modifiers dropped.
fn brace_names(list: &str, binding: Binding) -> Vec<String> {
    list.trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace())
        .split(',')
        .filter_map(|item| {
            let mut parts: Vec<&str> = item.split_whitespace().collect();
            if parts.len() > 1 && parts[0] == "type" {
                parts.remove(0);
            }
            match (binding, parts.as_slice()) {
                (_, []) => None,
                (Binding::Exported, [_, "as", alias, ..]) => Some(alias.to_string()),
                (_, [name, ..]) => Some(name.to_string()),
            }
        })
        .collect()
}

/// Names bound by an import clause: default, brace list, namespace.
fn import_clause_names(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let (default, rest) = match clause.find(|c: char| c == '{' || c == '*') {
        Some(pos) => (clause[..pos].trim().trim_end_matches(','), &clause[pos..]),
        None => (clause, ""),
    };

    let mut names: Vec<String> = Vec::new();
    let default = default.trim();
    if !default.is_empty() {
        names.push(default.to_string());
    }
    if rest.starts_with('{') {
        names.extend(brace_names(rest, Binding::Imported));
    } else if let Some(ns) = rest.split_whitespace().last().filter(|s| *s != "*" && *s != "as") {
        names.push(ns.trim_start_matches('*').to_string());
    }
    names
}

/// Keys of a destructuring pattern: `{ a, b: c, d = 1 }` yields `a, b, d`.
fn destructured_names(list: &str) -> Vec<String> {
    list.trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace())
        .split(',')
        .filter_map(|item| {
            let key = item.split(|c: char| c == ':' || c == '=').next()?.trim();
            (!key.is_empty()).then(|| key.to_string())
        })
        .collect()
}

/// Blank out line and block comments, keeping newlines and byte offsets.
///
/// String, template and regex literals are copied through untouched so
/// `"http://x"` and `/\/*$/` are not treated as comments. A quote or regex
/// left open at a newline is closed there, except inside a template literal.
pub fn mask_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(u8),
        Regex { in_class: bool },
    }

    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut state = State::Code;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'\'' | b'"' | b'`', _) => {
                    state = State::Str(b);
                    out.push(b);
                }
                (b'/', _) if regex_may_start(&out) => {
                    state = State::Regex { in_class: false };
                    out.push(b);
                }
                _ => out.push(b),
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    out.push(b'\n');
                } else {
                    out.push(b' ');
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                out.push(if b == b'\n' { b'\n' } else { b' ' });
            }
            State::Str(quote) => {
                out.push(b);
                if b == b'\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                } else if b == quote || (b == b'\n' && quote != b'`') {
                    state = State::Code;
                }
            }
            State::Regex { in_class } => {
                out.push(b);
                match b {
                    b'\\' => {
                        if let Some(escaped) = next {
                            out.push(escaped);
                            i += 2;
                            continue;
                        }
                    }
                    b'[' => state = State::Regex { in_class: true },
                    b']' => state = State::Regex { in_class: false },
                    b'/' if !in_class => state = State::Code,
                    b'\n' => state = State::Code,
                    _ => {}
                }
            }
        }
        i += 1;
    }

    // Only whole comment bodies are replaced, so multi-byte characters are
    // never split.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Keywords after which a `/` opens a regex literal rather than dividing.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Whether a `/` following `before` starts a regex literal.
///
/// Decided by the last significant byte: an operator, an opening bracket, a
/// statement boundary or the start of a line lets a regex start; an
/// identifier, a number or a closing bracket means division.
fn regex_may_start(before: &[u8]) -> bool {
    let mut end = before.len();
    while end > 0 && matches!(before[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    let Some(&last) = before[..end].last() else {
        return true;
    };
    match last {
        b'\n' | b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}'
        | b';' | b'+' | b'-' | b'*' | b'%' | b'>' | b'~' | b'^' => true,
        c if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' => {
            let start = before[..end]
                .iter()
                .rposition(|c| !(c.is_ascii_alphanumeric() || *c == b'_' || *c == b'$'))
                .map_or(0, |pos| pos + 1);
            let word = &before[start..end];
            REGEX_PRECEDING_KEYWORDS.iter().any(|kw| kw.as_bytes() == word)
        }
        _ => false,
    }
}
