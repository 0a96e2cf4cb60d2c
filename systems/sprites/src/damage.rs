use citysim_core::{CityLocation, TileId};
use citysim_tiles::{
    well_known::{FIRE_BASE, FIRE_VARIANTS, TINY_EXP_BASE},
    TileRegistry,
};
use citysim_world::{edit::rubble_zone, CityRng, TileMap};

use crate::Sprite;

/// Sets the tile on fire if it can burn.
///
/// Zone centers never ignite; bare dirt and combustible tiles do. Returns
/// whether a fire was started.
pub fn start_fire(
    map: &mut TileMap,
    registry: &TileRegistry,
    rng: &mut CityRng,
    location: CityLocation,
) -> bool {
    let Some(cell) = map.tile(location) else {
        return false;
    };
    if cell.is_zone_center() {
        return false;
    }
    if cell.id() != TileId::DIRT && !registry.is_combustible(cell.id()) {
        return false;
    }
    let variant = rng.below(u32::from(FIRE_VARIANTS)) as u16;
    map.set_tile(location, registry.cell_for(FIRE_BASE.offset(variant)));
    true
}

/// Wrecks whatever stands on the tile.
///
/// A building is reduced to rubble as a whole and an explosion is queued at
/// its center; a lone combustible tile becomes an explosion stub.
pub fn destroy_tile(
    map: &mut TileMap,
    registry: &TileRegistry,
    rng: &mut CityRng,
    location: CityLocation,
    spawned: &mut Vec<Sprite>,
) -> bool {
    if let Some(center) = map.zone_center_of(location, registry) {
        if rubble_zone(map, registry, rng, center).is_some() {
            spawned.push(Sprite::explosion(center));
            return true;
        }
    }
    if registry.is_combustible(map.tile_id(location)) {
        map.set_tile(location, registry.cell_for(TINY_EXP_BASE));
        return true;
    }
    false
}
