//! Per-tool cell logic, written against [`ToolEffect`] in local coordinates.

use citysim_core::{
    CityLocation, CityRect, CitySound, Network, TileId, ToolKind, ToolResult, ZoneKind,
};
use citysim_tiles::{
    well_known::{PARK_BASE, PARK_VARIANTS, RADIOACTIVE, RIVER, TINY_EXP_BASE},
    Category, TileRegistry,
};
use citysim_world::CityRng;

use crate::effect::{Shortfall, ToolEffect, Translated};

/// Extra charge for clearing one dozeable tile under a new building.
pub const AUTO_BULLDOZE_COST: i64 = 1;
/// Cost of one bridge tile.
pub const BRIDGE_COST: i64 = 50;

const RUBBLE_STUB_VARIANTS: u32 = 3;

/// Outcome of processing one cell.
enum Cell {
    Changed,
    Skipped,
}

/// One application of a tool: an anchor, an optional drag end and options.
#[derive(Debug)]
pub struct ToolStroke<'r> {
    tool: ToolKind,
    anchor: CityLocation,
    end: CityLocation,
    auto_bulldoze: bool,
    rng: Option<&'r mut CityRng>,
}

impl<'r> ToolStroke<'r> {
    /// Stroke covering the tool's footprint at `anchor`.
    #[must_use]
    pub fn new(tool: ToolKind, anchor: CityLocation) -> Self {
        Self {
            tool,
            anchor,
            end: anchor,
            auto_bulldoze: false,
            rng: None,
        }
    }

    /// Extends a line tool or the bulldozer along an L-shaped drag to `end`.
    ///
    /// Building tools ignore the drag.
    #[must_use]
    pub fn drag_to(mut self, end: CityLocation) -> Self {
        self.end = end;
        self
    }

    /// Pulls the drag end onto the nearest tile of `area`.
    pub fn clamp_end(&mut self, area: CityRect) {
        self.end = area.clamp(self.end);
    }

    /// Lets building tools clear trees, rubble, parks and flood water.
    #[must_use]
    pub fn auto_bulldoze(mut self, enabled: bool) -> Self {
        self.auto_bulldoze = enabled;
        self
    }

    /// Draws tile variants from `rng`; without one every variant is 0.
    #[must_use]
    pub fn with_rng(mut self, rng: &'r mut CityRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Tool being applied.
    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Tile the stroke is anchored at.
    #[must_use]
    pub fn anchor(&self) -> CityLocation {
        self.anchor
    }

    /// Rectangle of absolute cells the stroke may touch directly.
    #[must_use]
    pub fn bounds(&self) -> CityRect {
        if self.tool.zone().is_some() {
            CityRect::centered_on(self.anchor, self.tool.size())
        } else {
            CityRect::from_corners(self.anchor, self.end)
        }
    }

    /// Cells of the drag path relative to [`Self::bounds`]: along the row of
    /// the anchor first, then along the column of the end.
    fn path(&self) -> Vec<(i32, i32)> {
        let origin = self.bounds().origin();
        let step = |from: i32, to: i32| (i64::from(to) - i64::from(from)).signum() as i32;
        let step_x = step(self.anchor.x(), self.end.x());
        let step_y = step(self.anchor.y(), self.end.y());
        let mut cells = Vec::new();
        let mut x = self.anchor.x();
        loop {
            cells.push((x - origin.x(), self.anchor.y() - origin.y()));
            if x == self.end.x() {
                break;
            }
            x += step_x;
        }
        let mut y = self.anchor.y();
        while y != self.end.y() {
            y += step_y;
            cells.push((self.end.x() - origin.x(), y - origin.y()));
        }
        cells
    }

    /// Runs the tool through `effect`, whose origin is the map origin.
    ///
    /// Cells are charged and written one at a time. When funds run out the
    /// stroke stops and cells already written keep their new tiles.
    pub fn apply<E: ToolEffect>(&mut self, effect: E, registry: &TileRegistry) -> ToolResult {
        let origin = self.bounds().origin();
        let mut local = Translated::new(effect, origin.x(), origin.y());
        let outcome = match self.tool {
            ToolKind::Bulldozer => self.bulldoze(&mut local, registry),
            ToolKind::Road => self.lay_network(&mut local, registry, Network::Road),
            ToolKind::Wire => self.lay_network(&mut local, registry, Network::Wire),
            ToolKind::Rail => self.lay_network(&mut local, registry, Network::Rail),
            ToolKind::Park => self.plant_parks(&mut local),
            _ => match self.tool.zone() {
                Some(zone) => self.build(&mut local, registry, zone),
                None => Ok(false),
            },
        };
        match outcome {
            Ok(true) => ToolResult::Success,
            Ok(false) => ToolResult::None,
            Err(_) => ToolResult::InsufficientFunds,
        }
    }

    fn variant(&mut self, count: u32) -> u16 {
        self.rng
            .as_deref_mut()
            .map_or(0, |rng| rng.below(count) as u16)
    }

    fn bulldoze<E: ToolEffect>(
        &mut self,
        effect: &mut Translated<E>,
        registry: &TileRegistry,
    ) -> Result<bool, Shortfall> {
        let path = self.path();
        let mut changed = false;

        for &(dx, dy) in &path {
            let id = effect.get_tile(dx, dy);
            let Some(spec) = registry.get(id) else {
                continue;
            };
            if spec.category == Category::Zone || !spec.dozeable {
                continue;
            }
            effect.spend(ToolKind::Bulldozer.cost())?;
            let cleared = if spec.overwater { RIVER } else { TileId::DIRT };
            effect.set_tile(dx, dy, cleared);
            relink_around(effect, registry, dx, dy);
            if !changed {
                effect.make_sound(dx, dy, CitySound::Bulldozer);
            }
            changed = true;
        }

        for &(dx, dy) in &path {
            let Some((cx, cy)) = zone_center_near(effect, registry, dx, dy) else {
                continue;
            };
            effect.spend(ToolKind::Bulldozer.cost())?;
            self.doze_zone(effect, registry, cx, cy);
            changed = true;
        }
        Ok(changed)
    }

    fn doze_zone<E: ToolEffect>(
        &mut self,
        effect: &mut Translated<E>,
        registry: &TileRegistry,
        cx: i32,
        cy: i32,
    ) {
        let center_id = effect.get_tile(cx, cy);
        let Some(footprint) = registry.zone_footprint(CityLocation::new(cx, cy), center_id) else {
            return;
        };
        let origin = footprint.origin();
        let mut zone = effect.view(origin.x(), origin.y());

        let sound = match footprint.area() {
            area if area < 16 => CitySound::ExplosionHigh,
            area if area < 36 => CitySound::ExplosionLow,
            _ => CitySound::ExplosionBoth,
        };
        zone.make_sound(cx - origin.x(), cy - origin.y(), sound);

        for y in 0..footprint.height() as i32 {
            for x in 0..footprint.width() as i32 {
                let id = zone.get_tile(x, y);
                if id == TileId::CLEAR || id == TileId::DIRT || id == RADIOACTIVE {
                    continue;
                }
                let variant = self.variant(RUBBLE_STUB_VARIANTS);
                zone.set_tile(x, y, TINY_EXP_BASE.offset(variant));
            }
        }
    }

    fn lay_network<E: ToolEffect>(
        &mut self,
        effect: &mut Translated<E>,
        registry: &TileRegistry,
        network: Network,
    ) -> Result<bool, Shortfall> {
        let mut changed = false;
        for (dx, dy) in self.path() {
            if let Cell::Changed = self.lay_network_cell(effect, registry, network, dx, dy)? {
                relink_around(effect, registry, dx, dy);
                changed = true;
            }
        }
        Ok(changed)
    }

    fn lay_network_cell<E: ToolEffect>(
        &mut self,
        effect: &mut Translated<E>,
        registry: &TileRegistry,
        network: Network,
        dx: i32,
        dy: i32,
    ) -> Result<Cell, Shortfall> {
        let id = effect.get_tile(dx, dy);
        let Some(spec) = registry.get(id) else {
            return Ok(Cell::Skipped);
        };
        if spec.link(network).is_some() {
            return Ok(Cell::Skipped);
        }
        let mask = link_mask(effect, registry, network, dx, dy);

        let (tile, cost) = match spec.category {
            Category::Dirt => (registry.network_tile(network, mask), network_cost(network)),
            Category::Trees | Category::Rubble if self.auto_bulldoze => (
                registry.network_tile(network, mask),
                network_cost(network) + AUTO_BULLDOZE_COST,
            ),
            Category::Water if network == Network::Road => (registry.bridge_tile(mask), BRIDGE_COST),
            Category::Road | Category::Wire | Category::Rail if spec.network_count() == 1 => {
                let crossing = Network::ALL.into_iter().find_map(|other| {
                    let along = spec.link(other)?;
                    let ours = if along == citysim_tiles::HORIZONTAL {
                        citysim_tiles::VERTICAL
                    } else {
                        citysim_tiles::HORIZONTAL
                    };
                    registry.crossing_tile(network, ours, other)
                });
                (crossing, network_cost(network))
            }
            _ => (None, 0),
        };
        let Some(tile) = tile else {
            return Ok(Cell::Skipped);
        };
        effect.spend(cost)?;
        effect.set_tile(dx, dy, tile);
        Ok(Cell::Changed)
    }

    fn plant_parks<E: ToolEffect>(&mut self, effect: &mut Translated<E>) -> Result<bool, Shortfall> {
        let mut changed = false;
        for (dx, dy) in self.path() {
            if effect.get_tile(dx, dy) != TileId::DIRT {
                continue;
            }
            effect.spend(ToolKind::Park.cost())?;
            let variant = self.variant(u32::from(PARK_VARIANTS));
            effect.set_tile(dx, dy, PARK_BASE.offset(variant));
            changed = true;
        }
        Ok(changed)
    }

    fn build<E: ToolEffect>(
        &mut self,
        effect: &mut Translated<E>,
        registry: &TileRegistry,
        zone: ZoneKind,
    ) -> Result<bool, Shortfall> {
        let Some(anchor) = registry.building_for(zone, 0) else {
            return Ok(false);
        };
        let Some(building) = registry.get(anchor).and_then(|spec| spec.building.as_ref()) else {
            return Ok(false);
        };
        let size = self.tool.size() as i32;

        let mut clearing = 0;
        for y in 0..size {
            for x in 0..size {
                let id = effect.get_tile(x, y);
                if id == TileId::DIRT {
                    continue;
                }
                let clearable = self.auto_bulldoze
                    && matches!(
                        registry.category(id),
                        Some(Category::Trees | Category::Rubble | Category::Park | Category::Flood)
                    );
                if !clearable {
                    return Ok(false);
                }
                clearing += 1;
            }
        }

        effect.spend(self.tool.cost() + clearing * AUTO_BULLDOZE_COST)?;
        let cells = (0..size).flat_map(|y| (0..size).map(move |x| (x, y)));
        for ((x, y), member) in cells.zip(building.members.iter().copied()) {
            effect.set_tile(x, y, member);
        }
        let (cx, cy) = building.anchor_inset();
        effect.make_sound(cx, cy, CitySound::Build);
        Ok(true)
    }
}

fn network_cost(network: Network) -> i64 {
    match network {
        Network::Road => ToolKind::Road.cost(),
        Network::Wire => ToolKind::Wire.cost(),
        Network::Rail => ToolKind::Rail.cost(),
    }
}

fn network_category(network: Network) -> Category {
    match network {
        Network::Road => Category::Road,
        Network::Wire => Category::Wire,
        Network::Rail => Category::Rail,
    }
}

/// Neighbour mask (N=1, E=2, S=4, W=8) of cells carrying `network`.
fn link_mask<E: ToolEffect>(
    effect: &E,
    registry: &TileRegistry,
    network: Network,
    dx: i32,
    dy: i32,
) -> u8 {
    CityLocation::new(dx, dy)
        .neighbors4()
        .into_iter()
        .enumerate()
        .filter(|(_, next)| {
            registry
                .get(effect.get_tile(next.x(), next.y()))
                .is_some_and(|spec| spec.link(network).is_some())
        })
        .fold(0, |mask, (bit, _)| mask | (1 << bit))
}

/// Redraws plain network tiles next to `(dx, dy)` so their links match.
fn relink_around<E: ToolEffect>(effect: &mut E, registry: &TileRegistry, dx: i32, dy: i32) {
    for next in CityLocation::new(dx, dy).neighbors4() {
        let id = effect.get_tile(next.x(), next.y());
        let Some(spec) = registry.get(id) else {
            continue;
        };
        if spec.overwater || spec.network_count() != 1 {
            continue;
        }
        let Some(network) = Network::ALL
            .into_iter()
            .find(|network| spec.category == network_category(*network))
        else {
            continue;
        };
        let mask = link_mask(effect, registry, network, next.x(), next.y());
        if let Some(redrawn) = registry.network_tile(network, mask) {
            if redrawn != id {
                effect.set_tile(next.x(), next.y(), redrawn);
            }
        }
    }
}

/// Local position of the zone center that owns the cell, if the cell is part
/// of a building whose center is still standing.
fn zone_center_near<E: ToolEffect>(
    effect: &E,
    registry: &TileRegistry,
    dx: i32,
    dy: i32,
) -> Option<(i32, i32)> {
    let spec = registry.get(effect.get_tile(dx, dy))?;
    let (cx, cy) = if spec.is_zone_center() {
        (dx, dy)
    } else if spec.owner.is_some() {
        let (ox, oy) = spec.owner_offset;
        (dx - ox, dy - oy)
    } else {
        return None;
    };
    registry
        .get(effect.get_tile(cx, cy))
        .is_some_and(|center| center.is_zone_center())
        .then_some((cx, cy))
}
