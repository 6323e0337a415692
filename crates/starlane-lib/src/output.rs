use std::fmt::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{FactionId, WormholePair};
use crate::error::Result;
use crate::graph::{parse_records, NodeId, Traveler};
use crate::routing::RoutePlan;
use crate::store::StarmapStore;

/// Presentation style for turning a [`RoutePlan`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
    InGameNote,
}

impl RoutePlan {
    /// Render the plan using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        if !self.is_reachable() {
            return "No route\n".to_string();
        }
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
            RouteRenderMode::InGameNote => self.render_note(),
        }
    }

    fn endpoints(&self) -> (&str, &str) {
        let start = self.path.first().map_or("<unknown>", |node| node.name.as_str());
        let goal = self.path.last().map_or("<unknown>", |node| node.name.as_str());
        (start, goal)
    }

    fn distance_text(&self) -> String {
        self.distance
            .map(|distance| distance.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let (start, goal) = self.endpoints();
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} hops, {} legs, distance {})",
            start,
            goal,
            self.hop_count(),
            self.legs.len(),
            self.distance_text()
        );
        for (index, node) in self.path.iter().enumerate() {
            let _ = writeln!(
                buffer,
                "{:>3}: {} ({}) @ {}",
                index, node.name, node.id, node.position
            );
        }
        let _ = writeln!(buffer, "Legs:");
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "  {} -> {} via {}",
                self.name_of(leg.from_id),
                self.name_of(leg.to_id),
                leg.method
            );
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let (start, goal) = self.endpoints();
        let _ = writeln!(
            buffer,
            "**Route** _{} -> {}_ ({} hops, distance `{}`)",
            start,
            goal,
            self.hop_count(),
            self.distance_text()
        );
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "* **{}** -> **{}** by `{}`",
                self.name_of(leg.from_id),
                self.name_of(leg.to_id),
                leg.method
            );
        }
        buffer
    }

    fn render_note(&self) -> String {
        let mut buffer = String::new();
        let (start, goal) = self.endpoints();
        let _ = writeln!(buffer, "Route:");
        let _ = writeln!(buffer, "{} -> {} ({})", start, goal, self.distance_text());
        for leg in &self.legs {
            let _ = writeln!(buffer, "{} {}", leg.method, self.name_of(leg.to_id));
        }
        buffer
    }

    fn name_of(&self, id: NodeId) -> &str {
        self.path
            .iter()
            .find(|node| node.id == id)
            .map_or("<unknown>", |node| node.name.as_str())
    }
}

/// Visible system as exposed by listing endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemSummary {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub position: Decimal,
    pub catapult_radius: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_faction_id: Option<FactionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Systems and wormholes visible to one traveler.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemListing {
    pub systems: Vec<SystemSummary>,
    pub wormholes: Vec<WormholePair>,
}

impl SystemListing {
    /// Read the visible starmap. Malformed records are skipped as in routing.
    pub fn load(store: &dyn StarmapStore, traveler: &Traveler) -> Result<Self> {
        traveler.validate()?;
        let records = store.fetch_visible_systems(traveler.faction, traveler.unrestricted)?;
        let systems: Vec<SystemSummary> = parse_records(records)
            .into_iter()
            .map(|node| {
                let (x, y) = node.coordinates();
                SystemSummary {
                    id: node.id,
                    name: node.name,
                    x,
                    y,
                    position: node.position,
                    catapult_radius: node.catapult_radius,
                    owner_faction_id: node.owner,
                    region: node.region,
                }
            })
            .collect();

        let wormholes = store
            .fetch_wormholes()?
            .into_iter()
            .filter(|pair| {
                let visible = |id| systems.iter().any(|s| s.id == NodeId::System(id));
                visible(pair.a()) && visible(pair.b())
            })
            .collect();

        Ok(Self { systems, wormholes })
    }

    pub fn render(&self) -> String {
        let mut buffer = String::new();
        for system in &self.systems {
            let _ = write!(
                buffer,
                "{:>6}  {:<24} {:>12}",
                system.id.to_string(),
                system.name,
                system.position.to_string()
            );
            if system.catapult_radius > Decimal::ZERO {
                let _ = write!(buffer, "  catapult {}", system.catapult_radius);
            }
            if let Some(owner) = system.owner_faction_id {
                let _ = write!(buffer, "  owner {owner}");
            }
            if let Some(region) = &system.region {
                let _ = write!(buffer, "  [{region}]");
            }
            buffer.push('\n');
        }
        let _ = writeln!(
            buffer,
            "{} systems, {} wormholes",
            self.systems.len(),
            self.wormholes.len()
        );
        buffer
    }
}
