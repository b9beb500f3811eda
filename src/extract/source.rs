use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use super::block::strip_comments;
use super::{FactSet, ImportFacts};

static EXPORTED_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s+(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)")
        .unwrap()
});

static EXPORTED_CONST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s+(?:const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap()
});

static TEST_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:test|it)(?:\.(?:only|skip|concurrent|todo))?\s*\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`((?:[^`\\]|\\.)*)`)"#,
    )
    .unwrap()
});

static IMPORT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)(?:\bfrom\s*|\bimport\s*\(\s*|\brequire\s*\(\s*|^[ \t]*import\s+)(?:'([^'\n]+)'|"([^"\n]+)")"#,
    )
    .unwrap()
});

static IMPORT_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:import\b.*|.*\brequire\s*\(.*)$").unwrap()
});

static PUBLISH_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:emit|publish)\s*\(\s*['"`]([^'"`\n]+)['"`]"#).unwrap()
});

static SUBSCRIBE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:on|subscribe)\s*\(\s*['"`]([^'"`\n]+)['"`]"#).unwrap()
});

/// Exported function and constant names, unioned from two independent scans.
pub fn exported_symbols(text: &str) -> BTreeSet<String> {
    let text = strip_comments(text);
    let functions = EXPORTED_FUNCTION
        .captures_iter(&text)
        .map(|c| c[1].to_string());
    let constants = EXPORTED_CONST.captures_iter(&text).map(|c| c[1].to_string());
    functions.chain(constants).collect()
}

/// Names of `test(...)` / `it(...)` declarations, in order of appearance.
pub fn test_names(text: &str) -> Vec<String> {
    let text = strip_comments(text);
    TEST_CALL
        .captures_iter(&text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| unescape(m.as_str()))
        .collect()
}

/// Module paths referenced by import/require statements.
pub fn import_paths(text: &str) -> BTreeSet<String> {
    let text = strip_comments(text);
    IMPORT_PATH
        .captures_iter(&text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lines that import or require another module
pub(crate) fn import_statements(text: &str) -> Vec<String> {
    IMPORT_STATEMENT
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Event names passed to publish-like and subscribe-like calls.
pub fn event_names(text: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let text = strip_comments(text);
    let collect = |re: &Regex| -> BTreeSet<String> {
        re.captures_iter(&text).map(|c| c[1].to_string()).collect()
    };
    (collect(&PUBLISH_CALL), collect(&SUBSCRIBE_CALL))
}

/// Facts observable in a logic artifact.
pub fn extract_logic(text: &str) -> FactSet {
    let (publishes, subscribes) = event_names(text);
    FactSet {
        exports: exported_symbols(text),
        imports: ImportFacts {
            framework: BTreeSet::new(),
            external: import_paths(text)
                .into_iter()
                .filter(|p| !p.starts_with('.'))
                .collect(),
        },
        publishes,
        subscribes,
        ..Default::default()
    }
}

/// Facts observable in a test artifact.
pub fn extract_tests(text: &str) -> FactSet {
    FactSet {
        tests: test_names(text),
        ..Default::default()
    }
}

/// Lower-case, collapse internal whitespace runs and trim.
///
/// Applied identically to both sides of every test-name comparison.
pub fn normalize_test_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const LOGIC: &str = indoc! {r#"
        import { authClass } from '@voilajsx/appkit/auth';
        import { format } from './format.helper';
        const zod = require("zod");

        // export function commentedOut() {}
        export async function getUser(req, res) {
          events.emit('user.read', { id });
        }
        export function* streamUsers() {}
        export const deleteUser = async (req, res) => {};
        export default function list() {}
        bus.subscribe("user.created", handler);
    "#};

    #[test]
    fn test_exported_symbols_union() {
        let exports: Vec<_> = exported_symbols(LOGIC).into_iter().collect();
        assert_eq!(exports, vec!["deleteUser", "getUser", "list", "streamUsers"]);
    }

    #[test]
    fn test_logic_facts() {
        let facts = extract_logic(LOGIC);
        assert_eq!(
            facts.imports.external.iter().collect::<Vec<_>>(),
            vec!["@voilajsx/appkit/auth", "zod"]
        );
        assert!(facts.publishes.contains("user.read"));
        assert!(facts.subscribes.contains("user.created"));
    }

    #[test]
    fn test_test_names_all_quote_styles() {
        let text = indoc! {r#"
            describe('users', () => {
              test('returns user', async () => {});
              it("handles \"quoted\" names", () => {});
              it.skip(`returns 404`, () => {});
              // test('commented out', () => {});
              submit('not a test');
            });
        "#};
        assert_eq!(
            test_names(text),
            vec!["returns user", "handles \"quoted\" names", "returns 404"]
        );
    }

    #[test]
    fn test_normalize_test_name() {
        assert_eq!(
            normalize_test_name("  Returns  404   when\tMissing "),
            "returns 404 when missing"
        );
        assert_eq!(
            normalize_test_name("Returns  404   when missing"),
            normalize_test_name("returns 404 when missing")
        );
    }

    #[test]
    fn test_import_statements() {
        let lines = import_statements("import a from 'a';\nconst b = require('b');\nconst c = 1;");
        assert_eq!(lines, vec!["import a from 'a';", "const b = require('b');"]);
    }
}
