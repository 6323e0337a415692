#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::{params, Connection};
use starlane_lib::{initialize_schema, Decimal};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

/// Row for [`write_fixture`]: id, name, position, radius, owner, region.
pub type SystemRow<'a> = (i64, &'a str, &'a str, &'a str, Option<i64>, Option<&'a str>);

/// Fixture database content.
#[derive(Default)]
pub struct Fixture<'a> {
    pub systems: Vec<SystemRow<'a>>,
    pub wormholes: Vec<(i64, i64)>,
    pub relationships: Vec<(i64, i64, &'a str)>,
    pub discovered: Vec<(i64, i64)>,
    pub region_effects: Vec<(&'a str, &'a str)>,
}

/// Create `starmap.db` under `dir` with the library schema and `fixture` rows.
pub fn write_fixture(dir: &Path, fixture: &Fixture<'_>) -> PathBuf {
    let path = dir.join("starmap.db");
    let conn = Connection::open(&path).expect("create fixture db");
    initialize_schema(&conn).expect("schema");

    for (id, name, position, radius, owner, region) in &fixture.systems {
        conn.execute(
            "INSERT INTO systems (id, name, position, catapult_radius, owner_faction_id, region) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, name, position, radius, owner, region],
        )
        .expect("insert system");
    }
    for (a, b) in &fixture.wormholes {
        conn.execute(
            "INSERT INTO wormholes (system_a_id, system_b_id) VALUES (?1, ?2)",
            params![a, b],
        )
        .expect("insert wormhole");
    }
    for (a, b, status) in &fixture.relationships {
        conn.execute(
            "INSERT INTO faction_relationships (faction_a_id, faction_b_id, status) VALUES (?1, ?2, ?3)",
            params![a, b, status],
        )
        .expect("insert relationship");
    }
    for (faction, system) in &fixture.discovered {
        conn.execute(
            "INSERT INTO faction_discovered_systems (faction_id, system_id) VALUES (?1, ?2)",
            params![faction, system],
        )
        .expect("insert discovery");
    }
    for (region, effect) in &fixture.region_effects {
        conn.execute(
            "INSERT INTO region_effects (region, effect) VALUES (?1, ?2)",
            params![region, effect],
        )
        .expect("insert region effect");
    }

    path
}
