#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use zoneroute_lib::{seed_from_json, GraphSnapshot, SqliteZoneStore};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Fresh store seeded with the sample city network.
pub fn seeded_store() -> (TempDir, SqliteZoneStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = SqliteZoneStore::create(dir.path().join("zones.db")).expect("create store");
    seed_from_json(&store, &fixtures_dir().join("city_seed.json")).expect("seed fixture");
    (dir, store)
}

/// `A->B (5)`, `B->C (3)`, `A->C (10)`, all open.
pub fn triangle(b_to_c_open: bool) -> GraphSnapshot {
    GraphSnapshot::builder()
        .edge("A", "B", 5.0, true)
        .and_then(|b| b.edge("B", "C", 3.0, b_to_c_open))
        .and_then(|b| b.edge("A", "C", 10.0, true))
        .expect("valid edges")
        .build()
}

/// Square grid with edges right and down, every cost derived from the cell.
pub fn grid(side: usize) -> GraphSnapshot {
    let mut builder = GraphSnapshot::builder();
    let name = |row: usize, col: usize| format!("r{row}c{col}");
    for row in 0..side {
        for col in 0..side {
            builder.add_zone(&name(row, col));
        }
    }
    for row in 0..side {
        for col in 0..side {
            let cost = ((row * 7 + col * 13) % 9 + 1) as f64;
            if col + 1 < side {
                builder
                    .add_edge(&name(row, col), &name(row, col + 1), cost, true)
                    .expect("valid edge");
            }
            if row + 1 < side {
                builder
                    .add_edge(&name(row, col), &name(row + 1, col), cost + 0.5, (row + col) % 5 != 0)
                    .expect("valid edge");
            }
        }
    }
    builder.build()
}
