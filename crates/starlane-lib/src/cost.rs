use std::env;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{FactionId, RelationshipStatus};
use crate::error::{Error, Result};
use crate::graph::{Graph, Node};

/// Multiplier applied by each avoidance penalty unless configured otherwise.
pub const DEFAULT_PENALTY_FACTOR: Decimal = Decimal::ONE_HUNDRED;

/// Region effect treated as slow unless configured otherwise.
pub const DEFAULT_SLOW_EFFECT: &str = "decay";

pub const PENALTY_FACTOR_ENV: &str = "STARLANE_PENALTY_FACTOR";
pub const SLOW_EFFECT_ENV: &str = "STARLANE_SLOW_EFFECT";

/// Tunables for edge costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostConfig {
    pub penalty_factor: Decimal,
    pub slow_effect: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            slow_effect: DEFAULT_SLOW_EFFECT.to_string(),
        }
    }
}

impl CostConfig {
    /// Defaults overridden by `STARLANE_PENALTY_FACTOR` and `STARLANE_SLOW_EFFECT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(PENALTY_FACTOR_ENV) {
            config = config.with_penalty_factor(parse_penalty_factor(&raw)?)?;
        }
        if let Some(effect) = lookup(SLOW_EFFECT_ENV) {
            let effect = effect.trim();
            if effect.is_empty() {
                return Err(Error::validation(SLOW_EFFECT_ENV, "must not be empty"));
            }
            config.slow_effect = effect.to_string();
        }
        Ok(config)
    }

    pub fn with_penalty_factor(mut self, factor: Decimal) -> Result<Self> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(Error::validation(
                "penalty_factor",
                format!("must be non-negative, got {factor}"),
            ));
        }
        self.penalty_factor = factor;
        Ok(self)
    }

    pub fn with_slow_effect(mut self, effect: impl Into<String>) -> Self {
        self.slow_effect = effect.into();
        self
    }
}

fn parse_penalty_factor(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| {
        Error::validation(PENALTY_FACTOR_ENV, format!("'{raw}' is not a decimal number"))
    })
}

/// Per-request avoidance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteOptions {
    pub avoid_slow_regions: bool,
    pub avoid_hostile: bool,
}

/// How a single hop is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMethod {
    Sublight,
    Catapult,
    CatapultSublight,
    Wormhole,
}

impl TravelMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMethod::Sublight => "sublight",
            TravelMethod::Catapult => "catapult",
            TravelMethod::CatapultSublight => "catapult_sublight",
            TravelMethod::Wormhole => "wormhole",
        }
    }
}

impl fmt::Display for TravelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost and method chosen for one directed hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCost {
    pub cost: Decimal,
    pub method: TravelMethod,
}

/// Evaluates directed hop costs against one snapshot.
///
/// Catapults are directional: only the origin's catapult is considered.
/// Wormholes are symmetric. Penalties multiply whatever cost was selected.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCostEvaluator<'a> {
    graph: &'a Graph,
    options: RouteOptions,
    config: &'a CostConfig,
}

impl<'a> EdgeCostEvaluator<'a> {
    pub fn new(graph: &'a Graph, options: RouteOptions, config: &'a CostConfig) -> Self {
        Self {
            graph,
            options,
            config,
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Cost of travelling from node index `from` to node index `to`.
    pub fn evaluate(&self, from: usize, to: usize) -> EdgeCost {
        self.evaluate_nodes(self.graph.node(from), self.graph.node(to))
    }

    pub fn evaluate_nodes(&self, from: &Node, to: &Node) -> EdgeCost {
        let distance = from
            .position
            .checked_sub(to.position)
            .map_or(Decimal::MAX, |d| d.abs());
        let mut best = EdgeCost {
            cost: distance,
            method: TravelMethod::Sublight,
        };

        if from.has_catapult() && self.catapult_allowed(from.owner) {
            if distance <= from.catapult_radius {
                if !best.cost.is_zero() {
                    best = EdgeCost {
                        cost: Decimal::ZERO,
                        method: TravelMethod::Catapult,
                    };
                }
            } else {
                let partial = distance - from.catapult_radius;
                if partial < best.cost {
                    best = EdgeCost {
                        cost: partial,
                        method: TravelMethod::CatapultSublight,
                    };
                }
            }
        }

        if self.graph.is_wormhole(from.id, to.id)
            && !self.at_war(from.owner)
            && !self.at_war(to.owner)
            && !best.cost.is_zero()
        {
            best = EdgeCost {
                cost: Decimal::ZERO,
                method: TravelMethod::Wormhole,
            };
        }

        if self.options.avoid_slow_regions
            && (self.graph.is_slow_region(from.region.as_deref())
                || self.graph.is_slow_region(to.region.as_deref()))
        {
            best.cost = best.cost.saturating_mul(self.config.penalty_factor);
        }

        if self.options.avoid_hostile && (self.at_war(from.owner) || self.at_war(to.owner)) {
            best.cost = best.cost.saturating_mul(self.config.penalty_factor);
        }

        best
    }

    /// Unowned, own-faction and allied catapults are usable. Neutral owners deny.
    fn catapult_allowed(&self, owner: Option<FactionId>) -> bool {
        let Some(owner) = owner else {
            return true;
        };
        self.graph.traveler().faction == Some(owner)
            || self.graph.relationship(owner) == Some(RelationshipStatus::Allied)
    }

    fn at_war(&self, owner: Option<FactionId>) -> bool {
        owner.is_some_and(|owner| self.graph.relationship(owner) == Some(RelationshipStatus::War))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FactionRelationship, SystemRecord, WormholePair};
    use crate::graph::{build_graph, Endpoint, Traveler};
    use crate::store::MemoryStore;

    const TRAVELER: FactionId = 1;
    const ALLY: FactionId = 2;
    const NEUTRAL: FactionId = 3;
    const ENEMY: FactionId = 4;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn base_store() -> MemoryStore {
        MemoryStore::new()
            .with_relationship(
                FactionRelationship::new(TRAVELER, ALLY, RelationshipStatus::Allied).unwrap(),
            )
            .with_relationship(
                FactionRelationship::new(TRAVELER, ENEMY, RelationshipStatus::War).unwrap(),
            )
    }

    fn graph(store: &MemoryStore) -> Graph {
        build_graph(
            store,
            &Traveler::faction(TRAVELER),
            Endpoint::System(1),
            Endpoint::System(2),
            &CostConfig::default(),
        )
        .unwrap()
    }

    fn cost(graph: &Graph, options: RouteOptions, from: usize, to: usize) -> EdgeCost {
        let config = CostConfig::default();
        EdgeCostEvaluator::new(graph, options, &config).evaluate(from, to)
    }

    fn pair(origin: SystemRecord) -> MemoryStore {
        base_store()
            .with_system(origin)
            .with_system(SystemRecord::new(2, "Far", "10"))
            .discovered_by(TRAVELER)
    }

    #[test]
    fn sublight_is_absolute_distance() {
        let store = pair(SystemRecord::new(1, "Near", "2.5"));
        let graph = graph(&store);
        let forward = cost(&graph, RouteOptions::default(), 0, 1);
        let backward = cost(&graph, RouteOptions::default(), 1, 0);
        assert_eq!(forward.cost, dec("7.5"));
        assert_eq!(forward.method, TravelMethod::Sublight);
        assert_eq!(forward, backward);
    }

    #[test]
    fn distance_between_extreme_positions_saturates() {
        let store = base_store()
            .with_system(SystemRecord::new(1, "Rim", "79228162514264337593543950335").in_region("Veil"))
            .with_system(SystemRecord::new(2, "Far Rim", "-79228162514264337593543950335"))
            .discovered_by(TRAVELER)
            .with_region_effect("Veil", "decay");
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 0, 1);
        assert_eq!(edge.cost, Decimal::MAX);
        assert_eq!(edge.method, TravelMethod::Sublight);

        let options = RouteOptions {
            avoid_slow_regions: true,
            ..RouteOptions::default()
        };
        assert_eq!(cost(&graph, options, 1, 0).cost, Decimal::MAX);
    }

    #[test]
    fn unowned_catapult_in_range_is_free() {
        let store = pair(SystemRecord::new(1, "Near", "0").with_catapult("10"));
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 0, 1);
        assert_eq!(edge.cost, Decimal::ZERO);
        assert_eq!(edge.method, TravelMethod::Catapult);
    }

    #[test]
    fn catapult_is_directional() {
        let store = pair(SystemRecord::new(1, "Near", "0").with_catapult("10"));
        let graph = graph(&store);
        let back = cost(&graph, RouteOptions::default(), 1, 0);
        assert_eq!(back.cost, dec("10"));
        assert_eq!(back.method, TravelMethod::Sublight);
    }

    #[test]
    fn catapult_out_of_range_shortens_sublight() {
        let store = pair(SystemRecord::new(1, "Near", "0").with_catapult("3"));
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 0, 1);
        assert_eq!(edge.cost, dec("7"));
        assert_eq!(edge.method, TravelMethod::CatapultSublight);
    }

    #[test]
    fn own_and_allied_catapults_are_usable() {
        for owner in [TRAVELER, ALLY] {
            let store = pair(
                SystemRecord::new(1, "Near", "0")
                    .with_catapult("10")
                    .owned_by(owner),
            );
            let graph = graph(&store);
            let edge = cost(&graph, RouteOptions::default(), 0, 1);
            assert_eq!(edge.method, TravelMethod::Catapult, "owner {owner}");
        }
    }

    #[test]
    fn neutral_and_hostile_catapults_are_denied() {
        for owner in [NEUTRAL, ENEMY] {
            let store = pair(
                SystemRecord::new(1, "Near", "0")
                    .with_catapult("10")
                    .owned_by(owner),
            );
            let graph = graph(&store);
            let edge = cost(&graph, RouteOptions::default(), 0, 1);
            assert_eq!(edge.method, TravelMethod::Sublight, "owner {owner}");
            assert_eq!(edge.cost, dec("10"));
        }
    }

    #[test]
    fn wormhole_is_free_in_both_directions() {
        let store = pair(SystemRecord::new(1, "Near", "0").owned_by(NEUTRAL))
            .with_wormhole(WormholePair::new(1, 2).unwrap());
        let graph = graph(&store);
        for (from, to) in [(0, 1), (1, 0)] {
            let edge = cost(&graph, RouteOptions::default(), from, to);
            assert_eq!(edge.cost, Decimal::ZERO);
            assert_eq!(edge.method, TravelMethod::Wormhole);
        }
    }

    #[test]
    fn wormhole_into_enemy_space_is_denied() {
        let store = pair(SystemRecord::new(1, "Near", "0").owned_by(ENEMY))
            .with_wormhole(WormholePair::new(1, 2).unwrap());
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 1, 0);
        assert_eq!(edge.method, TravelMethod::Sublight);
        assert_eq!(edge.cost, dec("10"));
    }

    #[test]
    fn catapult_wins_over_wormhole_when_both_are_free() {
        let store = pair(SystemRecord::new(1, "Near", "0").with_catapult("10"))
            .with_wormhole(WormholePair::new(1, 2).unwrap());
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 0, 1);
        assert_eq!(edge.method, TravelMethod::Catapult);
    }

    #[test]
    fn wormhole_replaces_partial_catapult() {
        let store = pair(SystemRecord::new(1, "Near", "0").with_catapult("3"))
            .with_wormhole(WormholePair::new(1, 2).unwrap());
        let graph = graph(&store);
        let edge = cost(&graph, RouteOptions::default(), 0, 1);
        assert_eq!(edge.method, TravelMethod::Wormhole);
        assert_eq!(edge.cost, Decimal::ZERO);
    }

    #[test]
    fn slow_region_penalty_multiplies() {
        let store = pair(SystemRecord::new(1, "Near", "9").in_region("Veil"))
            .with_region_effect("Veil", "decay");
        let graph = graph(&store);
        let options = RouteOptions {
            avoid_slow_regions: true,
            ..RouteOptions::default()
        };
        assert_eq!(cost(&graph, options, 0, 1).cost, dec("100"));
        assert_eq!(cost(&graph, RouteOptions::default(), 0, 1).cost, dec("1"));
    }

    #[test]
    fn penalties_stack_multiplicatively() {
        let store = pair(
            SystemRecord::new(1, "Near", "9")
                .in_region("Veil")
                .owned_by(ENEMY),
        )
        .with_region_effect("Veil", "decay");
        let graph = graph(&store);
        let options = RouteOptions {
            avoid_slow_regions: true,
            avoid_hostile: true,
        };
        assert_eq!(cost(&graph, options, 1, 0).cost, dec("10000"));
    }

    #[test]
    fn penalty_applies_to_partial_catapult_cost() {
        let store = pair(
            SystemRecord::new(1, "Near", "0")
                .with_catapult("6")
                .in_region("Veil"),
        )
        .with_region_effect("Veil", "decay");
        let graph = graph(&store);
        let options = RouteOptions {
            avoid_slow_regions: true,
            ..RouteOptions::default()
        };
        let edge = cost(&graph, options, 0, 1);
        assert_eq!(edge.method, TravelMethod::CatapultSublight);
        assert_eq!(edge.cost, dec("400"));
    }

    #[test]
    fn zero_cost_stays_zero_under_penalty() {
        let store = pair(
            SystemRecord::new(1, "Near", "0")
                .with_catapult("10")
                .in_region("Veil"),
        )
        .with_region_effect("Veil", "decay");
        let graph = graph(&store);
        let options = RouteOptions {
            avoid_slow_regions: true,
            avoid_hostile: true,
        };
        assert_eq!(cost(&graph, options, 0, 1).cost, Decimal::ZERO);
    }

    #[test]
    fn config_reads_overrides() {
        let config = CostConfig::from_lookup(|key| match key {
            PENALTY_FACTOR_ENV => Some("2.5".to_string()),
            SLOW_EFFECT_ENV => Some("nebula".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.penalty_factor, dec("2.5"));
        assert_eq!(config.slow_effect, "nebula");
    }

    #[test]
    fn config_rejects_bad_penalty_factor() {
        for raw in ["-1", "lots"] {
            let result = CostConfig::from_lookup(|key| {
                (key == PENALTY_FACTOR_ENV).then(|| raw.to_string())
            });
            assert!(matches!(result, Err(Error::Validation { .. })), "{raw}");
        }
    }

    #[test]
    fn config_defaults() {
        let config = CostConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CostConfig::default());
        assert_eq!(config.penalty_factor, dec("100"));
        assert_eq!(config.slow_effect, "decay");
    }
}
