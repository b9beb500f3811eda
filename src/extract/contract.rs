use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::block::{find_block, list_values, string_pairs, strip_comments};
use super::source::import_statements;
use super::{FactSet, ImportFacts};

/// Top-level sections of a contract declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Routes,
    Imports,
    Tests,
    Helpers,
    Publishes,
    Subscribes,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Routes,
        Section::Imports,
        Section::Tests,
        Section::Helpers,
        Section::Publishes,
        Section::Subscribes,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Routes => "routes",
            Self::Imports => "imports",
            Self::Tests => "tests",
            Self::Helpers => "helpers",
            Self::Publishes => "publishes",
            Self::Subscribes => "subscribes",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Facts declared by a contract artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractExtraction {
    pub facts: FactSet,
    /// Sections with no declaration block; absence is not an error
    pub absent: BTreeSet<Section>,
    /// Import or require statements, which a pure-data contract must not have
    pub import_statements: Vec<String>,
}

impl ContractExtraction {
    pub fn declares(&self, section: Section) -> bool {
        !self.absent.contains(&section)
    }
}

/// Extract every section of a contract declaration.
pub fn extract_contract(text: &str) -> ContractExtraction {
    let mut extraction = ContractExtraction {
        import_statements: import_statements(&strip_comments(text)),
        ..Default::default()
    };

    for section in Section::ALL {
        let Some(block) = find_block(text, section.keyword()) else {
            extraction.absent.insert(section);
            continue;
        };

        let facts = &mut extraction.facts;
        match section {
            Section::Routes => facts.routes = string_pairs(block.body).into_iter().collect(),
            Section::Imports => facts.imports = import_facts(block.body, block.is_list()),
            Section::Tests => facts.tests = list_values(block.body),
            Section::Helpers => facts.helpers = list_values(block.body),
            Section::Publishes => facts.publishes = list_values(block.body).into_iter().collect(),
            Section::Subscribes => {
                facts.subscribes = list_values(block.body).into_iter().collect()
            }
        }
    }

    extraction
}

/// `{ framework: [...], external: [...] }`, or a flat list treated as external
fn import_facts(body: &str, is_list: bool) -> ImportFacts {
    if is_list {
        return ImportFacts {
            framework: BTreeSet::new(),
            external: list_values(body).into_iter().collect(),
        };
    }

    let group = |keyword: &str| -> BTreeSet<String> {
        find_block(body, keyword)
            .map(|b| list_values(b.body).into_iter().collect())
            .unwrap_or_default()
    };

    ImportFacts {
        framework: group("framework"),
        external: group("external"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const CONTRACT: &str = indoc! {r#"
        export const CONTRACT = {
          routes: {
            "GET /users/:id": "getUser",
            'DELETE /users/:id': 'deleteUser',
          },
          imports: {
            framework: ['auth', "logger"],
            external: [],
          },
          tests: [
            'returns user when found',
            "Returns  404   when missing",
          ],
          helpers: ['format.helper.ts'],
          publishes: ['user.deleted'],
        };
    "#};

    #[test]
    fn test_extracts_all_declared_sections() {
        let extraction = extract_contract(CONTRACT);
        let facts = &extraction.facts;

        assert_eq!(facts.routes.len(), 2);
        assert_eq!(facts.routes["GET /users/:id"], "getUser");
        assert_eq!(facts.routes["DELETE /users/:id"], "deleteUser");
        assert_eq!(facts.handlers(), vec!["deleteUser", "getUser"]);
        assert_eq!(
            facts.imports.framework.iter().collect::<Vec<_>>(),
            vec!["auth", "logger"]
        );
        assert!(facts.imports.external.is_empty());
        assert_eq!(
            facts.tests,
            vec!["returns user when found", "Returns  404   when missing"]
        );
        assert_eq!(facts.helpers, vec!["format.helper.ts"]);
        assert!(facts.publishes.contains("user.deleted"));
        assert_eq!(
            extraction.absent.iter().copied().collect::<Vec<_>>(),
            vec![Section::Subscribes]
        );
        assert!(extraction.import_statements.is_empty());
    }

    #[test]
    fn test_empty_text_yields_empty_facts() {
        let extraction = extract_contract("");
        assert_eq!(extraction.facts, FactSet::default());
        assert_eq!(extraction.absent.len(), Section::ALL.len());
    }

    #[test]
    fn test_flat_import_list() {
        let extraction = extract_contract("export default { imports: ['zod', 'lodash'] }");
        assert!(extraction.facts.imports.framework.is_empty());
        assert_eq!(extraction.facts.imports.all(), vec!["lodash", "zod"]);
    }

    #[test]
    fn test_detects_import_statements() {
        let text = indoc! {r#"
            import { z } from 'zod';
            // import { nope } from 'commented';
            export const CONTRACT = { routes: {} };
        "#};
        let extraction = extract_contract(text);
        assert_eq!(extraction.import_statements, vec!["import { z } from 'zod';"]);
        assert!(extraction.declares(Section::Routes));
        assert!(extraction.facts.routes.is_empty());
    }
}
