//! Bidirectional reconciliation of declared versus observed facts.
//!
//! Missing items (declared but not observed) are always hard errors. Extra
//! items (observed but not declared) are warnings unless the caller treats
//! the category as informational. Every function here is pure and
//! deterministic.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::extract::normalize_test_name;

/// Outcome of comparing one fact category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation<T> {
    /// Declared but not observed, in declaration order
    pub missing: Vec<T>,
    /// Observed but not declared, in observation order
    pub extra: Vec<T>,
    pub matched: usize,
    pub expected: usize,
}

impl<T> Default for Reconciliation<T> {
    fn default() -> Self {
        Self {
            missing: Vec::new(),
            extra: Vec::new(),
            matched: 0,
            expected: 0,
        }
    }
}

impl<T> Reconciliation<T> {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// `"matched/expected"`, kept in manifests for auditability
    pub fn fraction(&self) -> String {
        format!("{}/{}", self.matched, self.expected)
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Reconciliation<U> {
        Reconciliation {
            missing: self.missing.into_iter().map(&f).collect(),
            extra: self.extra.into_iter().map(&f).collect(),
            matched: self.matched,
            expected: self.expected,
        }
    }
}

/// Compare two collections by a derived key, keeping the original items.
///
/// Duplicates collapse in `missing` and `extra`, so
/// `reconcile_by(d, o).missing == reconcile_by(o, d).extra` holds for any
/// inputs.
pub fn reconcile_by<T, K, F>(declared: &[T], observed: &[T], key: F) -> Reconciliation<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let declared_keys: BTreeSet<K> = declared.iter().map(&key).collect();
    let observed_keys: BTreeSet<K> = observed.iter().map(&key).collect();

    let mut matched = 0;
    let mut seen_missing = BTreeSet::new();
    let mut missing = Vec::new();
    for item in declared {
        let k = key(item);
        if observed_keys.contains(&k) {
            matched += 1;
        } else if seen_missing.insert(k) {
            missing.push(item.clone());
        }
    }

    let mut seen_extra = BTreeSet::new();
    let extra = observed
        .iter()
        .filter(|item| {
            let k = key(item);
            !declared_keys.contains(&k) && seen_extra.insert(k)
        })
        .cloned()
        .collect();

    Reconciliation {
        missing,
        extra,
        matched,
        expected: declared.len(),
    }
}

/// Exact comparison of comparable items.
pub fn reconcile<T: Clone + Ord>(declared: &[T], observed: &[T]) -> Reconciliation<T> {
    reconcile_by(declared, observed, |item| item.clone())
}

/// Test names compared after normalization on both sides.
pub fn reconcile_tests(declared: &[String], observed: &[String]) -> Reconciliation<String> {
    reconcile_by(declared, observed, |name| normalize_test_name(name))
}

/// A route string bound to its handler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RouteBinding {
    pub route: String,
    pub handler: String,
}

impl fmt::Display for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.route, self.handler)
    }
}

fn bindings(routes: &BTreeMap<String, String>) -> Vec<RouteBinding> {
    routes
        .iter()
        .map(|(route, handler)| RouteBinding {
            route: route.clone(),
            handler: handler.clone(),
        })
        .collect()
}

/// Route tables match only when both the route and its handler are equal.
///
/// A route bound to a different handler shows up once in `missing` and once
/// in `extra`.
pub fn reconcile_routes(
    declared: &BTreeMap<String, String>,
    observed: &BTreeMap<String, String>,
) -> Reconciliation<RouteBinding> {
    reconcile(&bindings(declared), &bindings(observed))
}

/// Whether a quoted module path in `source` refers to `module`.
///
/// Matches `'module'` and `'module/sub'` forms. Bare names such as `auth`
/// also match a scoped path ending in `/auth`. Unquoted occurrences of the
/// word never match.
pub fn quoted_path_matches(path: &str, module: &str) -> bool {
    if path == module || path.starts_with(&format!("{}/", module)) {
        return true;
    }
    let bare = !module.contains('/') && !module.starts_with('@');
    bare && (path.ends_with(&format!("/{}", module)) || path.contains(&format!("/{}/", module)))
}

/// Expected import fragments versus the module paths the logic file imports.
///
/// Only paths taken from import, `import()` and `require()` statements count;
/// a module name that merely appears in some other string literal is missing.
/// `extra` lists non-relative imports that no expected module accounts for.
pub fn reconcile_imports(expected: &[String], imported: &[String]) -> Reconciliation<String> {
    let mut result = Reconciliation {
        expected: expected.len(),
        ..Default::default()
    };
    for module in expected {
        if imported.iter().any(|path| quoted_path_matches(path, module)) {
            result.matched += 1;
        } else if !result.missing.contains(module) {
            result.missing.push(module.clone());
        }
    }

    result.extra = imported
        .iter()
        .filter(|path| !path.starts_with('.'))
        .filter(|path| !expected.iter().any(|m| quoted_path_matches(path, m)))
        .cloned()
        .collect();

    result
}
