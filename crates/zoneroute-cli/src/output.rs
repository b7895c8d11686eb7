//! Output formatting for query results.
//!
//! Every renderer returns the full text so commands can print it in one go and
//! tests can inspect it without capturing stdout.

use std::fmt::Write as _;

use serde::Serialize;
use zoneroute_lib::{Connection, ReachabilityReport, RoutePlan, Zone, ZoneKind};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Serialize)]
struct WindowOutput<'a> {
    from: &'a str,
    budget_minutes: f64,
    destinations: &'a [RoutePlan],
}

/// Render a single route.
pub fn render_route(plan: &RoutePlan, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(plan);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Route from {} to {} ({} hops, {} min):",
        plan.source,
        plan.destination,
        plan.hop_count(),
        format_minutes(plan.total_minutes)
    );
    for (idx, zone) in plan.path.iter().enumerate() {
        let marker = if idx == 0 {
            "START"
        } else if idx + 1 == plan.path.len() {
            "GOAL "
        } else {
            "     "
        };
        let _ = writeln!(out, "  {} {}", marker, zone);
    }
    Ok(out)
}

/// Render the accessible/inaccessible split for one source.
pub fn render_reachability(
    report: &ReachabilityReport,
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(report);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "From {}: {} accessible, {} inaccessible",
        report.source,
        report.accessible.len(),
        report.inaccessible.len()
    );
    let _ = writeln!(out, "Accessible:");
    write_names(&mut out, &report.accessible);
    let _ = writeln!(out, "Inaccessible:");
    write_names(&mut out, &report.inaccessible);
    Ok(out)
}

/// Render every destination reachable within a budget, cheapest first.
pub fn render_window(
    from: &str,
    budget_minutes: f64,
    plans: &[RoutePlan],
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(&WindowOutput {
            from,
            budget_minutes,
            destinations: plans,
        });
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Zones reachable from {} in under {} min:",
        from,
        format_minutes(budget_minutes)
    );
    if plans.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for plan in plans {
        let _ = writeln!(
            out,
            "  {:<24} {:>8} min  via {}",
            plan.destination,
            format_minutes(plan.total_minutes),
            plan.path.join(" -> ")
        );
    }
    Ok(out)
}

/// Render the zone listing.
pub fn render_zones(zones: &[Zone], format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(zones);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} zones:", zones.len());
    for zone in zones {
        let detail = match &zone.kind {
            ZoneKind::Standard {
                category,
                population: Some(population),
            } => format!("{}, population {}", category, population),
            ZoneKind::Standard { category, .. } => category.clone(),
            ZoneKind::DistributionCenter { vehicle_capacity } => {
                format!("distribution center, {} vehicles", vehicle_capacity)
            }
        };
        let _ = writeln!(out, "  {} ({})", zone.name, detail);
    }
    Ok(out)
}

/// Render stored streets, one arc per line.
pub fn render_connections(
    connections: &[Connection],
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(connections);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} connections:", connections.len());
    for conn in connections {
        let _ = write!(
            out,
            "  {} -> {} ({} min",
            conn.source,
            conn.target,
            format_minutes(conn.travel_minutes)
        );
        if let Some(traffic) = &conn.traffic {
            let _ = write!(out, ", {} traffic", traffic);
        }
        if let Some(capacity) = conn.capacity {
            let _ = write!(out, ", capacity {}", capacity);
        }
        if !conn.accessible {
            let _ = write!(out, ", closed");
        }
        let _ = writeln!(out, ")");
    }
    Ok(out)
}

/// Whole minutes print without a fractional part.
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{:.0}", minutes)
    } else {
        format!("{:.2}", minutes)
    }
}

fn write_names(out: &mut String, names: &[String]) {
    if names.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for name in names {
        let _ = writeln!(out, "  - {}", name);
    }
}
