//! Map edits shared by the systems that build and destroy buildings.

use citysim_core::{CityLocation, CityRect, TileId};
use citysim_tiles::{
    well_known::{RUBBLE_BASE, RUBBLE_VARIANTS},
    TileRegistry,
};

use crate::{CityRng, TileMap};

/// Writes every member of the building anchored by `anchor` around `center`.
///
/// Cells keep their power bit so a zone that changes level stays lit until the
/// next power pass. Returns the footprint, or `None` when `anchor` is not a
/// building.
pub fn place_building(
    map: &mut TileMap,
    registry: &TileRegistry,
    center: CityLocation,
    anchor: TileId,
) -> Option<CityRect> {
    let footprint = registry.zone_footprint(center, anchor)?;
    let members = registry.get(anchor)?.building.as_ref()?.members.clone();
    for (location, member) in footprint.locations().zip(members) {
        let powered = map.tile(location).is_some_and(|cell| cell.is_powered());
        map.set_tile(location, registry.cell_for(member).with_power(powered));
    }
    Some(footprint)
}

/// Replaces the whole building anchored at `center` with rubble.
///
/// Returns the footprint that was cleared, or `None` when no building is
/// anchored there.
pub fn rubble_zone(
    map: &mut TileMap,
    registry: &TileRegistry,
    rng: &mut CityRng,
    center: CityLocation,
) -> Option<CityRect> {
    let cell = map.tile(center).filter(|cell| cell.is_zone_center())?;
    let footprint = registry.zone_footprint(center, cell.id())?;
    for location in footprint.locations() {
        if map.test_bounds(location) {
            let variant = rng.below(u32::from(RUBBLE_VARIANTS)) as u16;
            map.set_tile(location, registry.cell_for(RUBBLE_BASE.offset(variant)));
        }
    }
    Some(footprint)
}

/// Uniformly chosen location on the map.
pub fn random_location(map: &TileMap, rng: &mut CityRng) -> CityLocation {
    let x = rng.below(map.width()) as i32;
    let y = rng.below(map.height()) as i32;
    CityLocation::new(x, y)
}

/// Reports whether any tile bordering `footprint` carries road or rail.
#[must_use]
pub fn has_road_access(map: &TileMap, registry: &TileRegistry, footprint: CityRect) -> bool {
    footprint
        .perimeter()
        .any(|location| is_travel_tile(registry, map.tile_id(location)))
}

/// Reports whether vehicles can drive over the tile.
#[must_use]
pub fn is_travel_tile(registry: &TileRegistry, id: TileId) -> bool {
    registry.get(id).is_some_and(|spec| {
        spec.link(citysim_core::Network::Road).is_some()
            || spec.link(citysim_core::Network::Rail).is_some()
    })
}
