#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tool engine: player edits applied to the city between ticks.
//!
//! Tools see the city only through [`ToolEffect`], in coordinates local to
//! their footprint. The same stroke code drives real edits ([`MapEffect`])
//! and dry runs ([`PreviewEffect`]).

mod effect;
mod stroke;

use citysim_core::{CityLocation, CityRect, Event, ToolKind, ToolResult};
use citysim_tiles::TileRegistry;
use citysim_world::{query, TileMap, World};
use tracing::debug;

pub use effect::{MapEffect, PreviewEffect, Shortfall, ToolEffect, Translated};
pub use stroke::{ToolStroke, AUTO_BULLDOZE_COST, BRIDGE_COST};

/// Applies a tool anchored at a single tile.
///
/// An anchor outside the map yields [`ToolResult::UhOh`] and changes
/// nothing. Money is deducted for every cell processed, including cells
/// processed before a shortfall.
pub fn apply_tool(
    world: &mut World,
    registry: &TileRegistry,
    tool: ToolKind,
    location: CityLocation,
    out: &mut Vec<Event>,
) -> ToolResult {
    drag_tool(world, registry, tool, location, location, out)
}

/// Applies a tool along an L-shaped drag from `from` to `to`.
///
/// Line tools and the bulldozer follow the row of `from`, then the column of
/// `to`. Building tools are placed at `from`. An end outside the map is pulled
/// onto the nearest map tile.
pub fn drag_tool(
    world: &mut World,
    registry: &TileRegistry,
    tool: ToolKind,
    from: CityLocation,
    to: CityLocation,
    out: &mut Vec<Event>,
) -> ToolResult {
    let auto_bulldoze = query::options(world).auto_bulldoze;
    let map_bounds = query::map(world).bounds();
    if !map_bounds.contains(from) {
        debug!(tool = tool.name(), x = from.x(), y = from.y(), "tool anchor off the map");
        out.push(Event::ToolApplied {
            tool,
            area: CityRect::new(from, 1, 1),
            result: ToolResult::UhOh,
        });
        return ToolResult::UhOh;
    }

    let ctx = world.tick_context();
    let mut stroke = ToolStroke::new(tool, from)
        .drag_to(map_bounds.clamp(to))
        .auto_bulldoze(auto_bulldoze)
        .with_rng(ctx.rng);
    let area = stroke.bounds();

    let mut effect = MapEffect::new(ctx.map, registry, *ctx.funds, out);
    let result = stroke.apply(&mut effect, registry);
    let spent = effect.finish();

    debug!(tool = tool.name(), ?result, spent, "tool applied");
    if spent != 0 {
        *ctx.funds -= spent;
        out.push(Event::FundsChanged { funds: *ctx.funds });
    }
    out.push(Event::ToolApplied { tool, area, result });
    result
}

/// Outcome of a dry run of a tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPreview {
    /// Result the tool would report.
    pub result: ToolResult,
    /// Money the tool would spend.
    pub cost: i64,
    /// Tiles the tool would write, in row-major order.
    pub changes: Vec<(CityLocation, citysim_core::TileId)>,
}

/// Runs a tool against `map` without changing it.
///
/// Random tile variants are replaced by the first variant so previews are
/// stable and leave the city's random stream untouched. The drag end is
/// pulled onto the map as [`drag_tool`] does.
#[must_use]
pub fn preview_tool(
    map: &TileMap,
    registry: &TileRegistry,
    stroke: &mut ToolStroke<'_>,
    funds: i64,
) -> ToolPreview {
    if !map.test_bounds(stroke.anchor()) {
        return ToolPreview {
            result: ToolResult::UhOh,
            cost: 0,
            changes: Vec::new(),
        };
    }
    stroke.clamp_end(map.bounds());
    let mut effect = PreviewEffect::new(map, funds);
    let result = stroke.apply(&mut effect, registry);
    ToolPreview {
        result,
        cost: effect.spent(),
        changes: effect.changes(),
    }
}
