mod common;

use common::dec;
use starlane_lib::{
    plan_route, CostConfig, Endpoint, Error, FactionRelationship, MemoryStore, NodeId,
    RelationshipStatus, RouteLeg, RouteOptions, RoutePlan, RouteRequest, SystemRecord,
    TravelMethod, Traveler, WormholePair,
};

fn three_systems(catapult_on: Option<i64>) -> MemoryStore {
    let mut s1 = SystemRecord::new(1, "S1", "0");
    let mut s2 = SystemRecord::new(2, "S2", "5");
    match catapult_on {
        Some(1) => s1 = s1.with_catapult("5"),
        Some(2) => s2 = s2.with_catapult("5"),
        _ => {}
    }
    MemoryStore::new()
        .with_system(s1)
        .with_system(s2)
        .with_system(SystemRecord::new(3, "S3", "12"))
}

fn route(store: &MemoryStore, start: &str, goal: &str) -> RoutePlan {
    let request = RouteRequest::parse(start, goal, Traveler::developer()).expect("valid request");
    plan_route(store, &request, &CostConfig::default()).expect("route planned")
}

fn ids(plan: &RoutePlan) -> Vec<NodeId> {
    plan.path.iter().map(|node| node.id).collect()
}

fn leg(from: NodeId, to: NodeId, method: TravelMethod) -> RouteLeg {
    RouteLeg {
        from_id: from,
        to_id: to,
        method,
    }
}

#[test]
fn wormhole_past_catapult_system_uses_sublight_first() {
    // The catapult sits on S2, so it cannot launch a jump out of S1.
    let store = three_systems(Some(2)).with_wormhole(WormholePair::new(2, 3).unwrap());
    let plan = route(&store, "sys:1", "sys:3");

    assert_eq!(
        ids(&plan),
        vec![NodeId::System(1), NodeId::System(2), NodeId::System(3)]
    );
    assert_eq!(
        plan.legs,
        vec![
            leg(NodeId::System(1), NodeId::System(2), TravelMethod::Sublight),
            leg(NodeId::System(2), NodeId::System(3), TravelMethod::Wormhole),
        ]
    );
    assert_eq!(plan.distance.unwrap().to_string(), "5.00");
}

#[test]
fn catapult_then_wormhole_is_free() {
    let store = three_systems(Some(1)).with_wormhole(WormholePair::new(2, 3).unwrap());
    let plan = route(&store, "sys:1", "sys:3");

    assert_eq!(
        ids(&plan),
        vec![NodeId::System(1), NodeId::System(2), NodeId::System(3)]
    );
    assert_eq!(
        plan.legs,
        vec![
            leg(NodeId::System(1), NodeId::System(2), TravelMethod::Catapult),
            leg(NodeId::System(2), NodeId::System(3), TravelMethod::Wormhole),
        ]
    );
    assert_eq!(plan.distance.unwrap().to_string(), "0.00");
}

#[test]
fn plain_sublight_route_is_direct() {
    let plan = route(&three_systems(None), "sys:1", "sys:3");

    assert_eq!(plan.distance.unwrap().to_string(), "12.00");
    assert_eq!(plan.legs.len(), 1);
    assert_eq!(plan.legs[0].method, TravelMethod::Sublight);
    assert_eq!(plan.legs[0].from_id, NodeId::System(1));
    assert_eq!(plan.legs[0].to_id, NodeId::System(3));
}

#[test]
fn hostile_penalty_multiplies_sublight() {
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "Home", "0"))
        .with_system(SystemRecord::new(2, "Enemy Hold", "10").owned_by(20))
        .with_relationship(FactionRelationship::new(10, 20, RelationshipStatus::War).unwrap())
        .discovered_by(10);
    let request = RouteRequest::new(Endpoint::System(1), Endpoint::System(2), Traveler::faction(10))
        .with_options(RouteOptions {
            avoid_hostile: true,
            ..RouteOptions::default()
        });

    let plan = plan_route(&store, &request, &CostConfig::default()).unwrap();
    assert_eq!(plan.distance.unwrap().to_string(), "1000.00");
    assert_eq!(plan.legs[0].method, TravelMethod::Sublight);
}

#[test]
fn position_endpoint_creates_virtual_node() {
    let plan = route(&three_systems(None), "pos:37.5", "sys:1");

    assert_eq!(plan.path.first().unwrap().id, NodeId::VirtualStart);
    assert_eq!(plan.path.first().unwrap().name, "Coordinate #37.5");
    assert_eq!(plan.path.first().unwrap().position, dec("37.5"));
    assert_eq!(plan.path.last().unwrap().id, NodeId::System(1));
    assert_eq!(plan.distance.unwrap().to_string(), "37.50");
}

#[test]
fn virtual_nodes_can_ride_wormholes_between_systems() {
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "West Gate", "-100"))
        .with_system(SystemRecord::new(2, "East Gate", "100"))
        .with_wormhole(WormholePair::new(1, 2).unwrap());

    let plan = route(&store, "pos:-99", "pos:99.5");
    assert_eq!(
        ids(&plan),
        vec![
            NodeId::VirtualStart,
            NodeId::System(1),
            NodeId::System(2),
            NodeId::VirtualEnd
        ]
    );
    assert_eq!(
        plan.legs.iter().map(|leg| leg.method).collect::<Vec<_>>(),
        vec![
            TravelMethod::Sublight,
            TravelMethod::Wormhole,
            TravelMethod::Sublight
        ]
    );
    assert_eq!(plan.distance, Some(dec("1.50")));
}

#[test]
fn identical_endpoints_yield_single_node() {
    let plan = route(&three_systems(None), "sys:2", "sys:2");

    assert_eq!(ids(&plan), vec![NodeId::System(2)]);
    assert!(plan.legs.is_empty());
    assert_eq!(plan.distance.unwrap().to_string(), "0.00");
}

#[test]
fn identical_positions_route_between_two_virtual_nodes() {
    let plan = route(&three_systems(None), "pos:4", "pos:4");

    assert_eq!(ids(&plan), vec![NodeId::VirtualStart, NodeId::VirtualEnd]);
    assert_eq!(plan.legs.len(), 1);
    assert_eq!(plan.distance.unwrap().to_string(), "0.00");
}

#[test]
fn empty_starmap_has_no_route() {
    let plan = route(&MemoryStore::new(), "pos:4", "pos:4");
    assert_eq!(plan, RoutePlan::no_route());

    let plan = route(&MemoryStore::new(), "pos:1", "pos:2");
    assert!(plan.path.is_empty());
    assert!(plan.legs.is_empty());
    assert_eq!(plan.distance, None);
}

#[test]
fn empty_starmap_still_reports_unknown_system() {
    let request = RouteRequest::parse("pos:1", "sys:7", Traveler::developer()).unwrap();
    let err = plan_route(&MemoryStore::new(), &request, &CostConfig::default()).unwrap_err();
    assert!(matches!(err, Error::SystemNotFound { id: 7 }));
}

#[test]
fn extreme_positions_saturate_instead_of_overflowing() {
    let store = MemoryStore::new().with_system(SystemRecord::new(1, "Hub", "0"));
    let plan = route(
        &store,
        "pos:79228162514264337593543950335",
        "pos:-79228162514264337593543950335",
    );

    assert_eq!(plan.distance, Some(dec("79228162514264337593543950335")));
    assert_eq!(plan.path.first().unwrap().id, NodeId::VirtualStart);
    assert_eq!(plan.path.last().unwrap().id, NodeId::VirtualEnd);
}

#[test]
fn unknown_endpoint_is_not_found() {
    let request = RouteRequest::parse("sys:1", "sys:42", Traveler::developer()).unwrap();
    let err = plan_route(&three_systems(None), &request, &CostConfig::default()).unwrap_err();
    assert!(matches!(err, Error::SystemNotFound { id: 42 }));
}

#[test]
fn neutral_catapult_is_not_used() {
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "Neutral Yard", "0").with_catapult("50").owned_by(30))
        .with_system(SystemRecord::new(2, "Target", "40"))
        .discovered_by(10);
    let request = RouteRequest::new(Endpoint::System(1), Endpoint::System(2), Traveler::faction(10));

    let plan = plan_route(&store, &request, &CostConfig::default()).unwrap();
    assert_eq!(plan.legs[0].method, TravelMethod::Sublight);
    assert_eq!(plan.distance.unwrap().to_string(), "40.00");
}

#[test]
fn allied_catapult_is_used() {
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "Allied Yard", "0").with_catapult("50").owned_by(30))
        .with_system(SystemRecord::new(2, "Target", "40"))
        .with_relationship(FactionRelationship::new(10, 30, RelationshipStatus::Allied).unwrap())
        .discovered_by(10);
    let request = RouteRequest::new(Endpoint::System(1), Endpoint::System(2), Traveler::faction(10));

    let plan = plan_route(&store, &request, &CostConfig::default()).unwrap();
    assert_eq!(plan.legs[0].method, TravelMethod::Catapult);
    assert_eq!(plan.distance.unwrap().to_string(), "0.00");
}

#[test]
fn slow_region_detour_is_preferred_when_avoiding() {
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "Origin", "0"))
        .with_system(SystemRecord::new(2, "Decaying", "10").in_region("Veil"))
        .with_system(SystemRecord::new(3, "Far Side", "11"))
        .with_system(SystemRecord::new(4, "Relay", "30"))
        .with_wormhole(WormholePair::new(1, 2).unwrap())
        .with_region_effect("Veil", "decay");

    let request = RouteRequest::parse("sys:1", "sys:3", Traveler::developer()).unwrap();
    let fast = plan_route(&store, &request, &CostConfig::default()).unwrap();
    assert_eq!(fast.distance.unwrap().to_string(), "1.00");
    assert_eq!(fast.path.len(), 3);

    let avoiding = request.with_options(RouteOptions {
        avoid_slow_regions: true,
        ..RouteOptions::default()
    });
    let slow = plan_route(&store, &avoiding, &CostConfig::default()).unwrap();
    assert_eq!(slow.distance.unwrap().to_string(), "11.00");
    assert_eq!(
        ids(&slow),
        vec![NodeId::System(1), NodeId::System(3)]
    );
}

#[test]
fn equal_cost_ties_break_on_id_string() {
    // Systems 10 and 9 are equally distant from 1; "10" sorts before "9".
    let store = MemoryStore::new()
        .with_system(SystemRecord::new(1, "Origin", "0"))
        .with_system(SystemRecord::new(9, "Nine", "5"))
        .with_system(SystemRecord::new(10, "Ten", "-5"))
        .with_system(SystemRecord::new(2, "Goal", "7"))
        .with_wormhole(WormholePair::new(9, 2).unwrap())
        .with_wormhole(WormholePair::new(10, 2).unwrap());

    let first = route(&store, "sys:1", "sys:2");
    assert_eq!(first.distance.unwrap().to_string(), "5.00");
    assert_eq!(
        ids(&first),
        vec![NodeId::System(1), NodeId::System(10), NodeId::System(2)]
    );

    for _ in 0..5 {
        assert_eq!(route(&store, "sys:1", "sys:2"), first);
    }
}

#[test]
fn plan_serialises_with_string_ids_and_labels() {
    let store = three_systems(Some(1)).with_wormhole(WormholePair::new(2, 3).unwrap());
    let plan = route(&store, "pos:-1", "sys:3");
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["path"][0]["id"], "virtual_start");
    assert_eq!(json["path"][1]["id"], "1");
    assert_eq!(json["legs"][0]["method"], "sublight");
    assert_eq!(json["legs"][1]["method"], "catapult");
    assert_eq!(json["distance"], "1.00");
}
