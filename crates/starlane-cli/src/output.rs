//! Output formatting for route and system listings.

use std::fmt::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;

use starlane_lib::{RoutePlan, RouteRenderMode, SystemListing};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly listing with colored method badges.
    #[default]
    Text,
    /// Markdown suitable for chat or issue trackers.
    Rich,
    /// Compact text for pasting into an in-game note.
    Note,
    /// Pretty-printed JSON, matching the HTTP service response.
    Json,
}

/// Render a planned route in the requested format.
pub fn render_route(plan: &RoutePlan, format: OutputFormat, palette: ColorPalette) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_route_text(plan, palette)),
        OutputFormat::Rich => Ok(plan.render(RouteRenderMode::RichText)),
        OutputFormat::Note => Ok(plan.render(RouteRenderMode::InGameNote)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(plan).context("failed to serialise route as JSON")
        }
    }
}

/// Render the visible systems listing.
pub fn render_systems(listing: &SystemListing, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(listing).context("failed to serialise systems as JSON")
        }
        OutputFormat::Text | OutputFormat::Rich | OutputFormat::Note => Ok(listing.render()),
    }
}

fn render_route_text(plan: &RoutePlan, palette: ColorPalette) -> String {
    let Some(distance) = plan.distance else {
        return "No route\n".to_string();
    };
    let p = palette;

    let mut buffer = String::new();
    let start = plan.path.first().map_or("<unknown>", |node| node.name.as_str());
    let goal = plan.path.last().map_or("<unknown>", |node| node.name.as_str());
    let _ = writeln!(
        buffer,
        "Route from {}{}{} to {}{}{} ({} hops):",
        p.white_bold,
        start,
        p.reset,
        p.white_bold,
        goal,
        p.reset,
        plan.hop_count()
    );

    for leg in &plan.legs {
        let from = name_of(plan, leg.from_id);
        let to = name_of(plan, leg.to_id);
        let _ = writeln!(
            buffer,
            "  {}{:^18}{} {} {}->{} {}",
            p.method_tag(leg.method),
            leg.method.as_str(),
            p.reset,
            from,
            p.gray,
            p.reset,
            to
        );
    }

    let _ = writeln!(buffer, "\nTotal distance: {}{}{}", p.cyan, distance, p.reset);
    buffer
}

fn name_of(plan: &RoutePlan, id: starlane_lib::NodeId) -> &str {
    plan.path
        .iter()
        .find(|node| node.id == id)
        .map_or("<unknown>", |node| node.name.as_str())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use starlane_lib::{Decimal, NodeId, PathNode, RouteLeg, TravelMethod};

    fn plan() -> RoutePlan {
        let node = |id, name: &str, position: &str| PathNode {
            id: NodeId::System(id),
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            position: Decimal::from_str(position).unwrap(),
        };
        RoutePlan {
            path: vec![node(1, "Haven", "0"), node(2, "Lantern", "5")],
            legs: vec![RouteLeg {
                from_id: NodeId::System(1),
                to_id: NodeId::System(2),
                method: TravelMethod::Catapult,
            }],
            distance: Some(Decimal::from_str("0.00").unwrap()),
        }
    }

    #[test]
    fn text_output_without_color_is_plain() {
        let text = render_route(&plan(), OutputFormat::Text, ColorPalette::plain()).unwrap();
        assert!(text.starts_with("Route from Haven to Lantern (1 hops):"));
        assert!(text.contains("catapult"));
        assert!(text.contains("Total distance: 0.00"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn text_output_with_color_tags_methods() {
        let text = render_route(&plan(), OutputFormat::Text, ColorPalette::colored()).unwrap();
        assert!(text.contains(crate::terminal::colors::TAG_CATAPULT));
    }

    #[test]
    fn json_output_matches_service_shape() {
        let text = render_route(&plan(), OutputFormat::Json, ColorPalette::plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["legs"][0]["method"], "catapult");
        assert_eq!(value["distance"], "0.00");
    }

    #[test]
    fn unreachable_plan_prints_no_route() {
        let text = render_route(&RoutePlan::no_route(), OutputFormat::Text, ColorPalette::plain())
            .unwrap();
        assert_eq!(text, "No route\n");
    }
}
