use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection as SqliteConnection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::GraphSnapshot;
use crate::store::{SeedData, ZoneStore};
use crate::zone::{Connection, Direction, Zone, ZoneKind};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS zones (
    name TEXT PRIMARY KEY NOT NULL,
    kind TEXT NOT NULL,
    category TEXT,
    population INTEGER,
    vehicle_capacity INTEGER
);
CREATE TABLE IF NOT EXISTS connections (
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    travel_minutes REAL NOT NULL,
    traffic TEXT,
    capacity INTEGER,
    accessible INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (source, target)
);
";

const KIND_STANDARD: &str = "standard";
const KIND_DISTRIBUTION_CENTER: &str = "distribution_center";

/// Concurrent requests may hold write locks briefly; wait rather than fail.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed [`ZoneStore`].
///
/// Each operation opens its own connection, so snapshots taken by concurrent
/// requests never share state and always see the latest committed mutation.
#[derive(Debug, Clone)]
pub struct SqliteZoneStore {
    path: PathBuf,
}

impl SqliteZoneStore {
    /// Open an existing store. Fails with [`Error::StoreUnavailable`] when the
    /// file is missing or is not a usable database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::StoreUnavailable {
                message: "database file not found".to_string(),
                path,
            });
        }

        let store = Self { path };
        let connection = store.connect()?;
        connection.execute_batch(SCHEMA).map_err(|e| store.unavailable(e))?;
        debug!(path = %store.path.display(), "opened zone store");
        Ok(store)
    }

    /// Create the database file (and parent directories) if needed and make
    /// sure the schema exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let connection = SqliteConnection::open(&path).map_err(|e| Error::StoreUnavailable {
            path: path.clone(),
            message: e.to_string(),
        })?;
        connection.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "initialized zone store");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of zones currently stored.
    pub fn zone_count(&self) -> Result<usize> {
        let connection = self.connect()?;
        let count: i64 = connection.query_row("SELECT COUNT(*) FROM zones", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn connect(&self) -> Result<SqliteConnection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection =
            SqliteConnection::open_with_flags(&self.path, flags).map_err(|e| self.unavailable(e))?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| self.unavailable(e))?;
        Ok(connection)
    }

    fn unavailable(&self, error: rusqlite::Error) -> Error {
        Error::StoreUnavailable {
            path: self.path.clone(),
            message: error.to_string(),
        }
    }
}

impl ZoneStore for SqliteZoneStore {
    fn fetch_snapshot(&self) -> Result<GraphSnapshot> {
        let connection = self.connect()?;
        // One read transaction so zones and connections come from the same state.
        let tx = connection.unchecked_transaction()?;

        let mut builder = GraphSnapshot::builder();
        let mut known = HashSet::new();
        {
            let mut stmt = tx.prepare("SELECT name FROM zones ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for name in rows {
                let name = name?;
                builder.add_zone(&name);
                known.insert(name);
            }
        }

        let mut edges = 0usize;
        {
            let mut stmt = tx.prepare(
                "SELECT source, target, travel_minutes, accessible FROM connections \
                 ORDER BY source, target",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            })?;
            for row in rows {
                let (source, target, minutes, accessible) = row?;
                for endpoint in [&source, &target] {
                    if !known.contains(endpoint) {
                        return Err(Error::InconsistentData {
                            message: format!(
                                "connection {source} -> {target} references unknown zone {endpoint}"
                            ),
                        });
                    }
                }
                builder
                    .add_edge(&source, &target, minutes, accessible)
                    .map_err(|e| Error::InconsistentData {
                        message: e.to_string(),
                    })?;
                edges += 1;
            }
        }
        tx.finish()?;

        let snapshot = builder.build();
        debug!(zones = snapshot.zone_count(), edges, "fetched graph snapshot");
        Ok(snapshot)
    }

    fn list_zones(&self) -> Result<Vec<Zone>> {
        let connection = self.connect()?;
        let mut stmt = connection.prepare(
            "SELECT name, kind, category, population, vehicle_capacity FROM zones ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ZoneRow {
                name: row.get(0)?,
                kind: row.get(1)?,
                category: row.get(2)?,
                population: row.get(3)?,
                vehicle_capacity: row.get(4)?,
            })
        })?;

        let mut zones = Vec::new();
        for row in rows {
            zones.push(row?.into_zone()?);
        }
        Ok(zones)
    }

    fn list_connections(&self) -> Result<Vec<Connection>> {
        let connection = self.connect()?;
        let mut stmt = connection.prepare(&format!(
            "{CONNECTION_COLUMNS} ORDER BY source, target"
        ))?;
        let rows = stmt.query_map([], connection_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_connections_by_traffic(&self, traffic: &str) -> Result<Vec<Connection>> {
        let connection = self.connect()?;
        let mut stmt = connection.prepare(&format!(
            "{CONNECTION_COLUMNS} WHERE traffic = ?1 COLLATE NOCASE ORDER BY source, target"
        ))?;
        let rows = stmt.query_map(params![traffic.trim()], connection_from_row)?;
        let connections = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(traffic, count = connections.len(), "listed connections by traffic");
        Ok(connections)
    }

    fn create_zone(&self, zone: &Zone, connections: &[Connection]) -> Result<()> {
        let mut connection = self.connect()?;
        let tx = connection.transaction()?;
        insert_zone(&tx, zone)?;
        for conn in connections {
            insert_connection(&tx, conn)?;
        }
        tx.commit()?;

        info!(
            zone = %zone.name,
            kind = zone.kind.label(),
            connections = connections.len(),
            "created zone"
        );
        Ok(())
    }

    fn set_connection_accessible(&self, from: &str, to: &str, accessible: bool) -> Result<()> {
        let connection = self.connect()?;
        let updated = connection.execute(
            "UPDATE connections SET accessible = ?3 WHERE source = ?1 AND target = ?2",
            params![from, to, accessible],
        )?;
        if updated == 0 {
            return Err(connection_not_found(from, to));
        }

        info!(from, to, accessible, "updated connection accessibility");
        Ok(())
    }

    fn update_travel_time(&self, from: &str, to: &str, minutes: f64) -> Result<()> {
        Connection::new(from, to, minutes).validate()?;

        let connection = self.connect()?;
        let updated = connection.execute(
            "UPDATE connections SET travel_minutes = ?3 WHERE source = ?1 AND target = ?2",
            params![from, to, minutes],
        )?;
        if updated == 0 {
            return Err(connection_not_found(from, to));
        }

        info!(from, to, minutes, "updated connection travel time");
        Ok(())
    }

    fn apply_seed(&self, seed: &SeedData) -> Result<()> {
        let mut connection = self.connect()?;
        let tx = connection.transaction()?;
        for zone in &seed.zones {
            insert_zone(&tx, zone).map_err(|e| Error::InvalidSeed {
                message: e.to_string(),
            })?;
        }
        for conn in &seed.connections {
            insert_connection(&tx, conn).map_err(|e| Error::InvalidSeed {
                message: e.to_string(),
            })?;
        }
        tx.commit()?;

        info!(
            zones = seed.zones.len(),
            connections = seed.connections.len(),
            "applied seed data"
        );
        Ok(())
    }
}

const CONNECTION_COLUMNS: &str =
    "SELECT source, target, travel_minutes, traffic, capacity, accessible FROM connections";

/// Stored rows are single arcs, so they always read back as one-way.
fn connection_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Connection> {
    Ok(Connection {
        source: row.get(0)?,
        target: row.get(1)?,
        travel_minutes: row.get(2)?,
        traffic: row.get(3)?,
        capacity: row.get(4)?,
        direction: Direction::OneWay,
        accessible: row.get(5)?,
    })
}

struct ZoneRow {
    name: String,
    kind: String,
    category: Option<String>,
    population: Option<u32>,
    vehicle_capacity: Option<u32>,
}

impl ZoneRow {
    fn into_zone(self) -> Result<Zone> {
        let kind = match self.kind.as_str() {
            KIND_DISTRIBUTION_CENTER => ZoneKind::DistributionCenter {
                vehicle_capacity: self.vehicle_capacity.ok_or_else(|| Error::InconsistentData {
                    message: format!("distribution center {} has no vehicle capacity", self.name),
                })?,
            },
            KIND_STANDARD => ZoneKind::Standard {
                category: self.category.unwrap_or_default(),
                population: self.population,
            },
            other => {
                return Err(Error::InconsistentData {
                    message: format!("zone {} has unknown kind {other}", self.name),
                })
            }
        };
        Ok(Zone {
            name: self.name,
            kind,
        })
    }
}

fn insert_zone(conn: &SqliteConnection, zone: &Zone) -> Result<()> {
    zone.validate()?;
    if zone_exists(conn, &zone.name)? {
        return Err(Error::DuplicateZone {
            name: zone.name.clone(),
        });
    }

    match &zone.kind {
        ZoneKind::Standard {
            category,
            population,
        } => conn.execute(
            "INSERT INTO zones (name, kind, category, population) VALUES (?1, ?2, ?3, ?4)",
            params![zone.name, KIND_STANDARD, category, population],
        )?,
        ZoneKind::DistributionCenter { vehicle_capacity } => conn.execute(
            "INSERT INTO zones (name, kind, vehicle_capacity) VALUES (?1, ?2, ?3)",
            params![zone.name, KIND_DISTRIBUTION_CENTER, vehicle_capacity],
        )?,
    };
    Ok(())
}

fn insert_connection(conn: &SqliteConnection, connection: &Connection) -> Result<()> {
    connection.validate()?;
    for name in [&connection.source, &connection.target] {
        if !zone_exists(conn, name)? {
            return Err(Error::UnknownZone { name: name.clone() });
        }
    }

    for (from, to) in connection.arcs() {
        conn.execute(
            "INSERT OR REPLACE INTO connections \
             (source, target, travel_minutes, traffic, capacity, accessible) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                from,
                to,
                connection.travel_minutes,
                connection.traffic,
                connection.capacity,
                connection.accessible
            ],
        )?;
    }
    Ok(())
}

fn zone_exists(conn: &SqliteConnection, name: &str) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM zones WHERE name = ?1", [name], |_| Ok(()))
        .optional()?
        .is_some())
}

fn connection_not_found(from: &str, to: &str) -> Error {
    Error::ConnectionNotFound {
        from: from.to_string(),
        to: to.to_string(),
    }
}
