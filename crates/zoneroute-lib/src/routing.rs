//! Name-level queries used by the CLI and the HTTP service.
//!
//! These functions resolve zone names against a [`GraphSnapshot`], run the
//! index-based algorithms, and translate the results back into names.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{GraphSnapshot, ZoneIdx};
use crate::path::{compute_shortest_paths, reconstruct_path, Path};
use crate::reachability::{find_reachable, nothing_reachable};
use crate::window::find_within_budget;

/// Maximum number of "Did you mean" suggestions attached to lookup errors.
const MAX_SUGGESTIONS: usize = 3;

/// Shortest-path request between two named zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
}

impl RouteRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Minimum travel-time route between two zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub source: String,
    pub destination: String,
    /// Zone names from source to destination, both inclusive.
    pub path: Vec<String>,
    pub total_minutes: f64,
}

impl RoutePlan {
    /// Number of connections travelled.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn from_path(graph: &GraphSnapshot, path: &Path) -> Self {
        let names: Vec<String> = path
            .zones
            .iter()
            .map(|&zone| graph.name(zone).to_string())
            .collect();
        Self {
            source: names.first().cloned().unwrap_or_default(),
            destination: names.last().cloned().unwrap_or_default(),
            path: names,
            total_minutes: path.minutes,
        }
    }
}

/// Reachable and unreachable zones from one source, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityReport {
    pub source: String,
    pub accessible: Vec<String>,
    pub inaccessible: Vec<String>,
}

/// Compute the minimum travel-time route described by `request`.
pub fn plan_route(graph: &GraphSnapshot, request: &RouteRequest) -> Result<RoutePlan> {
    let source = resolve_source(graph, &request.from)?;
    let destination = graph
        .lookup(&request.to)
        .ok_or_else(|| Error::UnknownDestination {
            name: request.to.clone(),
            suggestions: graph.fuzzy_zone_matches(&request.to, MAX_SUGGESTIONS),
        })?;

    let tree = compute_shortest_paths(graph, source);
    let path = reconstruct_path(graph, &tree, destination)?;
    Ok(RoutePlan::from_path(graph, &path))
}

/// Partition every zone of `graph` by whether it can be reached from `from`.
///
/// An unknown source reaches nothing: every zone is reported inaccessible.
pub fn reachable_zones(graph: &GraphSnapshot, from: &str) -> ReachabilityReport {
    let set = match graph.lookup(from) {
        Some(source) => find_reachable(graph, source),
        None => nothing_reachable(graph),
    };

    ReachabilityReport {
        source: from.to_string(),
        accessible: sorted_names(graph, set.accessible()),
        inaccessible: sorted_names(graph, set.inaccessible()),
    }
}

/// Every zone reachable from `from` in strictly less than `budget_minutes`,
/// cheapest first (ties broken by name).
///
/// An unknown source yields an empty list once the budget has been validated.
pub fn zones_within(graph: &GraphSnapshot, from: &str, budget_minutes: f64) -> Result<Vec<RoutePlan>> {
    let Some(source) = graph.lookup(from) else {
        if !budget_minutes.is_finite() || budget_minutes <= 0.0 {
            return Err(Error::InvalidBudget {
                budget: budget_minutes,
            });
        }
        return Ok(Vec::new());
    };

    let mut plans: Vec<RoutePlan> = find_within_budget(graph, source, budget_minutes)?
        .values()
        .map(|path| RoutePlan::from_path(graph, path))
        .collect();
    plans.sort_by(|a, b| {
        a.total_minutes
            .total_cmp(&b.total_minutes)
            .then_with(|| a.destination.cmp(&b.destination))
    });
    Ok(plans)
}

fn resolve_source(graph: &GraphSnapshot, name: &str) -> Result<ZoneIdx> {
    graph.lookup(name).ok_or_else(|| Error::UnknownSource {
        name: name.to_string(),
        suggestions: graph.fuzzy_zone_matches(name, MAX_SUGGESTIONS),
    })
}

fn sorted_names(graph: &GraphSnapshot, zones: impl Iterator<Item = ZoneIdx>) -> Vec<String> {
    let mut names: Vec<String> = zones.map(|zone| graph.name(zone).to_string()).collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> GraphSnapshot {
        GraphSnapshot::builder()
            .edge("Centro", "Norte", 5.0, true)
            .and_then(|b| b.edge("Norte", "Puerto", 3.0, true))
            .and_then(|b| b.edge("Centro", "Puerto", 10.0, true))
            .and_then(|b| b.edge("Puerto", "Sur", 2.0, false))
            .map(|b| b.zone("Isla"))
            .expect("valid edges")
            .build()
    }

    #[test]
    fn plan_route_reports_names_and_cost() {
        let plan = plan_route(&city(), &RouteRequest::new("Centro", "Puerto")).unwrap();
        assert_eq!(plan.path, vec!["Centro", "Norte", "Puerto"]);
        assert_eq!(plan.total_minutes, 8.0);
        assert_eq!(plan.hop_count(), 2);
        assert_eq!(plan.source, "Centro");
        assert_eq!(plan.destination, "Puerto");
    }

    #[test]
    fn unknown_destination_carries_suggestions() {
        let err = plan_route(&city(), &RouteRequest::new("Centro", "Puerta")).unwrap_err();
        match err {
            Error::UnknownDestination { name, suggestions } => {
                assert_eq!(name, "Puerta");
                assert_eq!(suggestions.first().map(String::as_str), Some("Puerto"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_source_is_reported() {
        let err = plan_route(&city(), &RouteRequest::new("Ghost", "Puerto")).unwrap_err();
        assert!(matches!(err, Error::UnknownSource { .. }));
    }

    #[test]
    fn closed_street_makes_destination_unreachable() {
        let err = plan_route(&city(), &RouteRequest::new("Centro", "Sur")).unwrap_err();
        assert!(matches!(err, Error::Unreachable { .. }));
    }

    #[test]
    fn reachability_report_covers_every_zone() {
        let report = reachable_zones(&city(), "Centro");
        assert_eq!(report.accessible, vec!["Centro", "Norte", "Puerto"]);
        assert_eq!(report.inaccessible, vec!["Isla", "Sur"]);
    }

    #[test]
    fn unknown_source_reaches_nothing() {
        let report = reachable_zones(&city(), "Ghost");
        assert!(report.accessible.is_empty());
        assert_eq!(report.inaccessible.len(), 5);
    }

    #[test]
    fn zones_within_sorts_by_cost() {
        let plans = zones_within(&city(), "Centro", 60.0).unwrap();
        let summary: Vec<(&str, f64)> = plans
            .iter()
            .map(|plan| (plan.destination.as_str(), plan.total_minutes))
            .collect();
        assert_eq!(summary, vec![("Norte", 5.0), ("Puerto", 8.0)]);
    }

    #[test]
    fn zones_within_unknown_source_is_empty() {
        assert!(zones_within(&city(), "Ghost", 10.0).unwrap().is_empty());
        assert!(matches!(
            zones_within(&city(), "Ghost", 0.0),
            Err(Error::InvalidBudget { .. })
        ));
    }
}
