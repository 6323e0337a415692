use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::cost::CostConfig;
use crate::db::{spiral_coords, FactionId, RelationshipStatus, SystemId, SystemRecord, WormholePair};
use crate::error::{Error, Result};
use crate::store::StarmapStore;

/// Identifier of a node in a route snapshot.
///
/// The canonical string form (the decimal id or a virtual token) is used for
/// tie-breaking during search and for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    System(SystemId),
    VirtualStart,
    VirtualEnd,
}

impl NodeId {
    pub fn system_id(self) -> Option<SystemId> {
        match self {
            NodeId::System(id) => Some(id),
            NodeId::VirtualStart | NodeId::VirtualEnd => None,
        }
    }

    pub fn is_virtual(self) -> bool {
        self.system_id().is_none()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::System(id) => write!(f, "{id}"),
            NodeId::VirtualStart => f.write_str("virtual_start"),
            NodeId::VirtualEnd => f.write_str("virtual_end"),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Route endpoint: a known system or a bare linear position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    System(SystemId),
    Position(Decimal),
}

impl Endpoint {
    /// Parse an endpoint literal, naming `field` in validation errors.
    ///
    /// Accepts `sys:<id>`, `pos:<decimal>`, or a bare integer system id.
    /// Positions may use scientific notation (`pos:1e3`, `pos:2.5e-1`).
    pub fn parse_field(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        if let Some(id) = value.strip_prefix("sys:") {
            return id
                .trim()
                .parse::<SystemId>()
                .map(Endpoint::System)
                .map_err(|_| Error::validation(field, format!("'{id}' is not a system id")));
        }
        if let Some(position) = value.strip_prefix("pos:") {
            let literal = position.trim();
            return Decimal::from_str(literal)
                .or_else(|_| Decimal::from_scientific(literal))
                .map(Endpoint::Position)
                .map_err(|_| {
                    Error::validation(field, format!("'{position}' is not a decimal position"))
                });
        }
        value.parse::<SystemId>().map(Endpoint::System).map_err(|_| {
            Error::validation(
                field,
                format!("'{value}' is not a valid endpoint; expected sys:<id> or pos:<decimal>"),
            )
        })
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Endpoint::parse_field("endpoint", value)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::System(id) => write!(f, "sys:{id}"),
            Endpoint::Position(position) => write!(f, "pos:{position}"),
        }
    }
}

/// Who is travelling, which determines visibility and access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Traveler {
    pub faction: Option<FactionId>,
    /// Developer travelers see every system regardless of discovery.
    pub unrestricted: bool,
}

impl Traveler {
    pub fn faction(faction: FactionId) -> Self {
        Self {
            faction: Some(faction),
            unrestricted: false,
        }
    }

    pub fn developer() -> Self {
        Self {
            faction: None,
            unrestricted: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.unrestricted && self.faction.is_none() {
            return Err(Error::validation(
                "faction_id",
                "a faction is required unless developer visibility is requested",
            ));
        }
        Ok(())
    }
}

/// System-like node inside a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub position: Decimal,
    /// Zero means no catapult.
    pub catapult_radius: Decimal,
    pub owner: Option<FactionId>,
    pub region: Option<String>,
}

/// Whole positions keep one decimal place: `Coordinate #37.0`.
fn coordinate_name(position: Decimal) -> String {
    let position = position.normalize();
    if position.scale() == 0 {
        format!("Coordinate #{position}.0")
    } else {
        format!("Coordinate #{position}")
    }
}

impl Node {
    fn virtual_coordinate(id: NodeId, position: Decimal) -> Self {
        Self {
            id,
            name: coordinate_name(position),
            position,
            catapult_radius: Decimal::ZERO,
            owner: None,
            region: None,
        }
    }

    /// Display coordinates on the spiral layout.
    pub fn coordinates(&self) -> (f64, f64) {
        spiral_coords(self.position)
    }

    pub fn has_catapult(&self) -> bool {
        self.catapult_radius > Decimal::ZERO
    }
}

/// Immutable, request-scoped routing snapshot.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    wormholes: HashSet<WormholePair>,
    relationships: HashMap<FactionId, RelationshipStatus>,
    slow_regions: HashSet<String>,
    traveler: Traveler,
    start: usize,
    goal: usize,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Real systems in the snapshot, excluding virtual endpoints.
    pub fn system_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.id, NodeId::System(_)))
            .count()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn goal(&self) -> usize {
        self.goal
    }

    pub fn traveler(&self) -> &Traveler {
        &self.traveler
    }

    pub fn wormhole_count(&self) -> usize {
        self.wormholes.len()
    }

    /// Whether a wormhole links the two nodes. Virtual nodes have none.
    pub fn is_wormhole(&self, a: NodeId, b: NodeId) -> bool {
        match (a.system_id(), b.system_id()) {
            (Some(a), Some(b)) => WormholePair::new(a, b)
                .map(|pair| self.wormholes.contains(&pair))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Relationship between the traveler's faction and `faction`, if any.
    pub fn relationship(&self, faction: FactionId) -> Option<RelationshipStatus> {
        self.relationships.get(&faction).copied()
    }

    pub fn is_slow_region(&self, region: Option<&str>) -> bool {
        region.is_some_and(|region| self.slow_regions.contains(region))
    }
}

/// Assemble the snapshot for one route request.
///
/// Reads the visible systems, wormholes, the traveler's relationships and
/// the regions carrying the configured slow effect, then injects virtual
/// nodes for position endpoints.
pub fn build_graph(
    store: &dyn StarmapStore,
    traveler: &Traveler,
    start: Endpoint,
    goal: Endpoint,
    config: &CostConfig,
) -> Result<Graph> {
    traveler.validate()?;

    let records = store.fetch_visible_systems(traveler.faction, traveler.unrestricted)?;
    let mut nodes = parse_records(records);

    if let Endpoint::Position(position) = start {
        nodes.push(Node::virtual_coordinate(NodeId::VirtualStart, position));
    }
    if let Endpoint::Position(position) = goal {
        nodes.push(Node::virtual_coordinate(NodeId::VirtualEnd, position));
    }

    let index: HashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id, idx))
        .collect();

    let resolve = |endpoint: Endpoint, virtual_id: NodeId| -> Result<usize> {
        let id = match endpoint {
            Endpoint::System(id) => NodeId::System(id),
            Endpoint::Position(_) => virtual_id,
        };
        index.get(&id).copied().ok_or(match endpoint {
            Endpoint::System(id) => Error::SystemNotFound { id },
            Endpoint::Position(_) => Error::validation("endpoint", "virtual node missing"),
        })
    };
    let start_idx = resolve(start, NodeId::VirtualStart)?;
    let goal_idx = resolve(goal, NodeId::VirtualEnd)?;

    let visible: HashSet<SystemId> = nodes.iter().filter_map(|n| n.id.system_id()).collect();
    let wormholes: HashSet<WormholePair> = store
        .fetch_wormholes()?
        .into_iter()
        .filter(|pair| visible.contains(&pair.a()) && visible.contains(&pair.b()))
        .collect();

    let relationships = match traveler.faction {
        Some(faction) => store.fetch_relationships(faction)?,
        None => HashMap::new(),
    };

    let slow_regions = store.fetch_region_effects(&config.slow_effect)?;

    debug!(
        nodes = nodes.len(),
        wormholes = wormholes.len(),
        relationships = relationships.len(),
        slow_regions = slow_regions.len(),
        %start,
        %goal,
        "built route snapshot"
    );

    Ok(Graph {
        nodes,
        index,
        wormholes,
        relationships,
        slow_regions,
        traveler: *traveler,
        start: start_idx,
        goal: goal_idx,
    })
}

/// Convert store records into nodes, skipping rows without a usable position.
pub(crate) fn parse_records(records: Vec<SystemRecord>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(records.len() + 2);
    let mut positions = HashSet::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(position) = record
            .position
            .as_deref()
            .and_then(|raw| Decimal::from_str(raw.trim()).ok())
        else {
            warn!(
                system_id = record.id,
                position = ?record.position,
                "skipping system with missing or malformed position"
            );
            skipped += 1;
            continue;
        };

        if !positions.insert(position) {
            warn!(system_id = record.id, %position, "duplicate system position");
        }

        nodes.push(Node {
            id: NodeId::System(record.id),
            name: record.name,
            position,
            catapult_radius: parse_radius(record.id, record.catapult_radius.as_deref()),
            owner: record.owner,
            region: record.region,
        });
    }

    if skipped > 0 {
        warn!(skipped, "ignored malformed system records");
    }

    nodes
}

fn parse_radius(system_id: SystemId, raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };
    match Decimal::from_str(raw.trim()) {
        Ok(radius) if radius >= Decimal::ZERO => radius,
        Ok(radius) => {
            warn!(system_id, %radius, "negative catapult radius treated as zero");
            Decimal::ZERO
        }
        Err(_) => {
            warn!(system_id, radius = raw, "malformed catapult radius treated as zero");
            Decimal::ZERO
        }
    }
}
