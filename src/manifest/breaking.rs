use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two or more endpoints claiming one route string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCollision {
    pub route: String,
    /// `endpoint -> handler`
    pub claimants: BTreeMap<String, String>,
}

/// Distinct routes that can match the same request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOverlap {
    pub routes: [String; 2],
    pub endpoints: [String; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChangeAnalysis {
    pub route_collisions: Vec<RouteCollision>,
    /// Advisory only
    pub parameter_overlaps: Vec<ParameterOverlap>,
    pub conflicts_blocked: bool,
}

impl BreakingChangeAnalysis {
    pub fn has_collisions(&self) -> bool {
        !self.route_collisions.is_empty()
    }

    /// Collisions stop the pipeline unless the feature opted out
    pub fn blocks(&self) -> bool {
        self.conflicts_blocked && self.has_collisions()
    }
}

fn is_parameter(segment: &str) -> bool {
    segment.starts_with(':') || (segment.starts_with('{') && segment.ends_with('}')) || segment == "*"
}

/// Split `"GET /users/:id"` into its method and path segments
fn parse_route(route: &str) -> (Option<&str>, Vec<&str>) {
    let mut parts = route.split_whitespace();
    let (method, path) = match (parts.next(), parts.next()) {
        (Some(method), Some(path)) => (Some(method), path),
        (Some(path), None) => (None, path),
        _ => (None, ""),
    };
    let segments = path.split('/').filter(|s| !s.is_empty()).collect();
    (method, segments)
}

/// Whether two textually different routes can match the same request
fn overlaps(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    let (method_a, segments_a) = parse_route(a);
    let (method_b, segments_b) = parse_route(b);
    let same_method = match (method_a, method_b) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => true,
    };
    same_method
        && segments_a.len() == segments_b.len()
        && segments_a
            .iter()
            .zip(&segments_b)
            .all(|(x, y)| x == y || is_parameter(x) || is_parameter(y))
}

/// Detect route collisions and overlapping parameterized paths.
///
/// `claims` maps each endpoint to its `route -> handler` table.
pub fn analyze_breaking_changes(
    claims: &BTreeMap<String, BTreeMap<String, String>>,
    conflicts_blocked: bool,
) -> BreakingChangeAnalysis {
    let mut by_route: BTreeMap<&str, BTreeMap<String, String>> = BTreeMap::new();
    for (endpoint, routes) in claims {
        for (route, handler) in routes {
            by_route
                .entry(route.as_str())
                .or_default()
                .insert(endpoint.clone(), handler.clone());
        }
    }

    let route_collisions = by_route
        .iter()
        .filter(|(_, claimants)| claimants.len() > 1)
        .map(|(route, claimants)| RouteCollision {
            route: route.to_string(),
            claimants: claimants.clone(),
        })
        .collect();

    let owned: Vec<(&str, &str)> = claims
        .iter()
        .flat_map(|(endpoint, routes)| routes.keys().map(move |r| (endpoint.as_str(), r.as_str())))
        .collect();
    let mut parameter_overlaps = Vec::new();
    for (i, (endpoint_a, route_a)) in owned.iter().enumerate() {
        for (endpoint_b, route_b) in &owned[i + 1..] {
            if endpoint_a != endpoint_b && overlaps(route_a, route_b) {
                parameter_overlaps.push(ParameterOverlap {
                    routes: [route_a.to_string(), route_b.to_string()],
                    endpoints: [endpoint_a.to_string(), endpoint_b.to_string()],
                });
            }
        }
    }

    BreakingChangeAnalysis {
        route_collisions,
        parameter_overlaps,
        conflicts_blocked,
    }
}
