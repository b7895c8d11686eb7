mod common;

use std::collections::BTreeSet;

use zoneroute_lib::{
    compute_shortest_paths, find_reachable, find_within_budget, plan_route, reachable_zones,
    reconstruct_path, Error, GraphSnapshot, RouteRequest,
};

use common::{grid, triangle};

#[test]
fn detour_beats_direct_street() {
    let plan = plan_route(&triangle(true), &RouteRequest::new("A", "C")).expect("route exists");
    assert_eq!(plan.path, vec!["A", "B", "C"]);
    assert_eq!(plan.total_minutes, 8.0);
}

#[test]
fn closed_street_forces_direct_route() {
    let plan = plan_route(&triangle(false), &RouteRequest::new("A", "C")).expect("route exists");
    assert_eq!(plan.path, vec!["A", "C"]);
    assert_eq!(plan.total_minutes, 10.0);
}

#[test]
fn isolated_zone_is_reported_inaccessible() {
    let graph = GraphSnapshot::builder()
        .edge("A", "B", 1.0, true)
        .expect("valid edge")
        .zone("Z")
        .build();
    let report = reachable_zones(&graph, "A");
    assert_eq!(report.accessible, vec!["A", "B"]);
    assert_eq!(report.inaccessible, vec!["Z"]);
}

#[test]
fn nonexistent_destination_is_unknown() {
    let err = plan_route(&triangle(true), &RouteRequest::new("A", "Nonexistent"))
        .expect_err("unknown destination");
    assert!(matches!(err, Error::UnknownDestination { .. }));
}

#[test]
fn windowed_query_respects_strict_budget() {
    let graph = triangle(true);
    let a = graph.lookup("A").unwrap();
    let b = graph.lookup("B").unwrap();

    assert!(find_within_budget(&graph, a, 4.0).unwrap().is_empty());

    let within = find_within_budget(&graph, a, 6.0).unwrap();
    assert_eq!(within.keys().copied().collect::<Vec<_>>(), vec![b]);
    assert_eq!(within[&b].minutes, 5.0);
}

#[test]
fn reconstructed_paths_sum_to_their_distance() {
    let graph = grid(8);
    let source = graph.lookup("r0c0").unwrap();
    let tree = compute_shortest_paths(&graph, source);

    for zone in graph.zones().filter(|&zone| tree.is_reachable(zone)) {
        let path = reconstruct_path(&graph, &tree, zone).expect("reachable zone has a path");
        let sum: f64 = path
            .zones
            .windows(2)
            .map(|pair| {
                let edge = graph.edge_between(pair[0], pair[1]).expect("consecutive zones share an edge");
                assert!(edge.accessible, "paths never cross closed streets");
                edge.minutes
            })
            .sum();
        assert!((sum - path.minutes).abs() < 1e-9);
        assert_eq!(Some(path.minutes), tree.distance(zone));
        assert_eq!(path.zones.first(), Some(&source));
        assert_eq!(path.zones.last(), Some(&zone));
    }
}

#[test]
fn closing_a_street_never_shortens_any_route() {
    let open = triangle(true);
    let closed = triangle(false);
    let open_tree = compute_shortest_paths(&open, open.lookup("A").unwrap());
    let closed_tree = compute_shortest_paths(&closed, closed.lookup("A").unwrap());

    for name in ["A", "B", "C"] {
        let before = open_tree.distance(open.lookup(name).unwrap()).unwrap();
        let after = closed_tree.distance(closed.lookup(name).unwrap()).unwrap();
        assert!(after >= before, "{name}: {after} < {before}");
    }
}

#[test]
fn reachability_partitions_every_zone() {
    let graph = grid(6);
    for source in graph.zones() {
        let set = find_reachable(&graph, source);
        let accessible: BTreeSet<_> = set.accessible().collect();
        let inaccessible: BTreeSet<_> = set.inaccessible().collect();

        assert!(accessible.contains(&source));
        assert!(accessible.is_disjoint(&inaccessible));
        assert_eq!(accessible.len() + inaccessible.len(), graph.zone_count());
    }
}

#[test]
fn reachability_agrees_with_finite_distances() {
    let graph = grid(6);
    let source = graph.lookup("r1c1").unwrap();
    let set = find_reachable(&graph, source);
    let tree = compute_shortest_paths(&graph, source);
    for zone in graph.zones() {
        assert_eq!(set.is_accessible(zone), tree.is_reachable(zone));
    }
}

#[test]
fn repeated_queries_are_identical() {
    let graph = grid(7);
    let source = graph.lookup("r0c0").unwrap();
    let first = compute_shortest_paths(&graph, source);
    let second = compute_shortest_paths(&graph, source);
    assert_eq!(first.distances(), second.distances());
    assert_eq!(first.predecessors(), second.predecessors());

    let target = graph.lookup("r6c6").unwrap();
    assert_eq!(
        reconstruct_path(&graph, &first, target).ok(),
        reconstruct_path(&graph, &second, target).ok()
    );
}

#[test]
fn windowed_results_grow_with_the_budget() {
    let graph = grid(6);
    let source = graph.lookup("r0c0").unwrap();
    let tree = compute_shortest_paths(&graph, source);
    let reachable = find_reachable(&graph, source);

    let mut previous = BTreeSet::new();
    for budget in [1.0, 5.0, 10.0, 20.0, 40.0, 80.0] {
        let within = find_within_budget(&graph, source, budget).unwrap();
        let current: BTreeSet<_> = within.keys().copied().collect();
        assert!(previous.is_subset(&current), "budget {budget} dropped zones");

        let expected: BTreeSet<_> = reachable
            .accessible()
            .filter(|&zone| zone != source)
            .filter(|&zone| tree.distance(zone).is_some_and(|d| d < budget))
            .collect();
        assert_eq!(current, expected);
        previous = current;
    }
}
