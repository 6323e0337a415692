use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::{SnapshotSource, StarmapStore};

/// Numeric identifier for a persisted star system.
pub type SystemId = i64;

/// Numeric identifier for a faction.
pub type FactionId = i64;

/// System row as read from the store, before its numeric fields are parsed.
///
/// Position and catapult radius stay textual here so that malformed rows can
/// be reported and skipped by the snapshot builder instead of failing the
/// whole read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRecord {
    pub id: SystemId,
    pub name: String,
    pub position: Option<String>,
    pub catapult_radius: Option<String>,
    pub owner: Option<FactionId>,
    pub region: Option<String>,
}

impl SystemRecord {
    /// Record without a catapult, owner, or region.
    pub fn new(id: SystemId, name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: Some(position.into()),
            catapult_radius: None,
            owner: None,
            region: None,
        }
    }

    pub fn with_catapult(mut self, radius: impl Into<String>) -> Self {
        self.catapult_radius = Some(radius.into());
        self
    }

    pub fn owned_by(mut self, faction: FactionId) -> Self {
        self.owner = Some(faction);
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Unordered wormhole link, stored as a canonical `(min, max)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WormholePair {
    a: SystemId,
    b: SystemId,
}

impl WormholePair {
    /// Canonicalise a pair of endpoints. A system cannot link to itself.
    pub fn new(a: SystemId, b: SystemId) -> Result<Self> {
        if a == b {
            return Err(Error::validation(
                "wormhole",
                format!("system {a} cannot be linked to itself"),
            ));
        }
        Ok(Self {
            a: a.min(b),
            b: a.max(b),
        })
    }

    pub fn a(&self) -> SystemId {
        self.a
    }

    pub fn b(&self) -> SystemId {
        self.b
    }

    pub fn contains(&self, system: SystemId) -> bool {
        self.a == system || self.b == system
    }
}

/// Diplomatic status between two factions. No record means neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Allied,
    War,
}

impl RelationshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipStatus::Allied => "allied",
            RelationshipStatus::War => "war",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allied" => Ok(RelationshipStatus::Allied),
            "war" => Ok(RelationshipStatus::War),
            other => Err(Error::validation(
                "relationship status",
                format!("expected 'allied' or 'war', got '{other}'"),
            )),
        }
    }
}

/// Relationship between two factions with canonical ordering `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactionRelationship {
    a: FactionId,
    b: FactionId,
    status: RelationshipStatus,
}

impl FactionRelationship {
    pub fn new(a: FactionId, b: FactionId, status: RelationshipStatus) -> Result<Self> {
        if a == b {
            return Err(Error::validation(
                "relationship",
                format!("faction {a} cannot hold a relationship with itself"),
            ));
        }
        Ok(Self {
            a: a.min(b),
            b: a.max(b),
            status,
        })
    }

    pub fn a(&self) -> FactionId {
        self.a
    }

    pub fn b(&self) -> FactionId {
        self.b
    }

    pub fn status(&self) -> RelationshipStatus {
        self.status
    }

    /// The counterpart of `faction` in this relationship, if it participates.
    pub fn other(&self, faction: FactionId) -> Option<FactionId> {
        if self.a == faction {
            Some(self.b)
        } else if self.b == faction {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Map a linear position onto the 2D display spiral.
///
/// The transform is for presentation only; routing costs always use the
/// exact decimal position.
pub fn spiral_coords(position: Decimal) -> (f64, f64) {
    let position = position.to_f64().unwrap_or(0.0);
    let angle = position * 0.1;
    let radius = position * 50.0 / 1000.0;
    (radius * angle.cos(), radius * angle.sin())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS factions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS systems (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    position TEXT NOT NULL UNIQUE,
    catapult_radius TEXT NOT NULL DEFAULT '0',
    owner_faction_id INTEGER REFERENCES factions (id),
    region TEXT
);
CREATE TABLE IF NOT EXISTS wormholes (
    system_a_id INTEGER NOT NULL REFERENCES systems (id),
    system_b_id INTEGER NOT NULL REFERENCES systems (id),
    PRIMARY KEY (system_a_id, system_b_id),
    CHECK (system_a_id < system_b_id)
);
CREATE TABLE IF NOT EXISTS faction_relationships (
    faction_a_id INTEGER NOT NULL,
    faction_b_id INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('allied', 'war')),
    PRIMARY KEY (faction_a_id, faction_b_id),
    CHECK (faction_a_id < faction_b_id)
);
CREATE TABLE IF NOT EXISTS faction_discovered_systems (
    faction_id INTEGER NOT NULL,
    system_id INTEGER NOT NULL REFERENCES systems (id),
    PRIMARY KEY (faction_id, system_id)
);
CREATE TABLE IF NOT EXISTS region_effects (
    region TEXT PRIMARY KEY,
    effect TEXT NOT NULL
);
";

/// Create the tables the reader expects. Existing tables and rows are left untouched.
pub fn initialize_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Read-only SQLite source for route snapshots.
///
/// Each call to [`SqliteStore::open`] opens a fresh connection and starts a
/// deferred read transaction, so all reads made through one
/// [`SqliteReader`] observe the same database state.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the database file if needed and ensure the schema exists.
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        let connection = Connection::open(&store.path)?;
        initialize_schema(&connection)?;
        debug!(path = %store.path.display(), "initialized starmap schema");
        Ok(store)
    }

    /// Open a reader bound to a single read transaction.
    pub fn open(&self) -> Result<SqliteReader> {
        if !self.path.exists() {
            return Err(Error::DatabaseNotFound {
                path: self.path.clone(),
            });
        }

        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        connection.execute_batch("BEGIN DEFERRED")?;
        let schema = detect_schema(&connection)?;
        debug!(path = %self.path.display(), ?schema, "opened starmap reader");

        Ok(SqliteReader { connection, schema })
    }
}

impl SnapshotSource for SqliteStore {
    fn reader(&self) -> Result<Box<dyn StarmapStore + '_>> {
        Ok(Box::new(self.open()?))
    }
}

/// Which optional columns and tables are present in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemaDefinition {
    catapult_column: bool,
    owner_column: bool,
    region_column: bool,
    wormholes_table: bool,
    relationships_table: bool,
    discovery_table: bool,
    region_effects_table: bool,
}

/// Connection holding an open read transaction. Dropping it ends the transaction.
pub struct SqliteReader {
    connection: Connection,
    schema: SchemaDefinition,
}

impl fmt::Debug for SqliteReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteReader")
            .field("schema", &self.schema)
            .finish()
    }
}

impl StarmapStore for SqliteReader {
    fn fetch_visible_systems(
        &self,
        faction: Option<FactionId>,
        unrestricted: bool,
    ) -> Result<Vec<SystemRecord>> {
        let schema = &self.schema;
        let selects = [
            "s.id".to_string(),
            "s.name".to_string(),
            "s.position".to_string(),
            optional_column(schema.catapult_column, "s.catapult_radius"),
            optional_column(schema.owner_column, "s.owner_faction_id"),
            optional_column(schema.region_column, "s.region"),
        ]
        .join(", ");

        let mut records = Vec::new();
        if unrestricted {
            let sql = format!("SELECT {selects} FROM systems s ORDER BY s.id");
            let mut stmt = self.connection.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_record)?;
            for row in rows {
                records.push(row?);
            }
        } else {
            let Some(faction) = faction else {
                return Ok(records);
            };
            if !schema.discovery_table {
                warn!("faction_discovered_systems table missing; no systems are visible");
                return Ok(records);
            }
            let sql = format!(
                "SELECT {selects} FROM systems s \
                 JOIN faction_discovered_systems fds ON s.id = fds.system_id \
                 WHERE fds.faction_id = ?1 ORDER BY s.id"
            );
            let mut stmt = self.connection.prepare(&sql)?;
            let rows = stmt.query_map([faction], row_to_record)?;
            for row in rows {
                records.push(row?);
            }
        }

        Ok(records)
    }

    fn fetch_wormholes(&self) -> Result<Vec<WormholePair>> {
        if !self.schema.wormholes_table {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .connection
            .prepare("SELECT system_a_id, system_b_id FROM wormholes")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut pairs = HashSet::new();
        let mut skipped = 0usize;
        for row in rows {
            let (a, b): (SystemId, SystemId) = row?;
            match WormholePair::new(a, b) {
                Ok(pair) => {
                    pairs.insert(pair);
                }
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "ignored self-linked wormhole rows");
        }

        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort_unstable();
        Ok(pairs)
    }

    fn fetch_relationships(
        &self,
        faction: FactionId,
    ) -> Result<HashMap<FactionId, RelationshipStatus>> {
        let mut relationships = HashMap::new();
        if !self.schema.relationships_table {
            return Ok(relationships);
        }

        let mut stmt = self.connection.prepare(
            "SELECT faction_a_id, faction_b_id, status FROM faction_relationships \
             WHERE faction_a_id = ?1 OR faction_b_id = ?1",
        )?;
        let rows = stmt.query_map([faction], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;

        for row in rows {
            let (a, b, status): (FactionId, FactionId, String) = row?;
            let other = if a == faction { b } else { a };
            match status.parse::<RelationshipStatus>() {
                Ok(status) => {
                    relationships.insert(other, status);
                }
                Err(err) => warn!(faction = other, error = %err, "skipping relationship row"),
            }
        }

        Ok(relationships)
    }

    fn fetch_region_effects(&self, effect: &str) -> Result<HashSet<String>> {
        if !self.schema.region_effects_table {
            return Ok(HashSet::new());
        }

        let mut stmt = self
            .connection
            .prepare("SELECT region FROM region_effects WHERE effect = ?1")?;
        let rows = stmt.query_map([effect], |row| row.get::<_, String>(0))?;

        let mut regions = HashSet::new();
        for row in rows {
            regions.insert(row?);
        }
        Ok(regions)
    }
}

fn optional_column(present: bool, column: &str) -> String {
    if present {
        column.to_string()
    } else {
        "NULL".to_string()
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SystemRecord> {
    Ok(SystemRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        position: value_to_text(row.get(2)?),
        catapult_radius: value_to_text(row.get(3)?),
        owner: row.get(4)?,
        region: row.get(5)?,
    })
}

/// Numeric columns may hold INTEGER, REAL or TEXT depending on who wrote the row.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(v) => Some(v.to_string()),
        Value::Real(v) => Some(v.to_string()),
        Value::Text(v) => Some(v),
    }
}

fn detect_schema(connection: &Connection) -> Result<SchemaDefinition> {
    if !table_exists(connection, "systems")?
        || !table_has_columns(connection, "systems", &["id", "name", "position"])?
    {
        return Err(Error::UnsupportedSchema);
    }

    Ok(SchemaDefinition {
        catapult_column: table_has_columns(connection, "systems", &["catapult_radius"])?,
        owner_column: table_has_columns(connection, "systems", &["owner_faction_id"])?,
        region_column: table_has_columns(connection, "systems", &["region"])?,
        wormholes_table: table_exists(connection, "wormholes")?,
        relationships_table: table_exists(connection, "faction_relationships")?,
        discovery_table: table_exists(connection, "faction_discovered_systems")?,
        region_effects_table: table_exists(connection, "region_effects")?,
    })
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
