use citysim_core::{CityLocation, TileId};
use citysim_system_sprites::start_fire;
use citysim_tiles::{
    well_known::{FLOOD_BASE, FLOOD_VARIANTS, RADIOACTIVE, RUBBLE_BASE, RUBBLE_VARIANTS},
    Category, TileRegistry,
};
use citysim_world::{edit::rubble_zone, CityRng, Layer, TileMap};

const SPREAD_CHANCE: u32 = 8;
const FLOOD_RECEDE_CHANCE: u32 = 4;
const RADIATION_DECAY_CHANCE: u32 = 4_096;

/// Tiles of the given category, in row-major order.
pub(crate) fn tiles_in(map: &TileMap, registry: &TileRegistry, category: Category) -> Vec<CityLocation> {
    map.iter()
        .filter(|(_, cell)| registry.category(cell.id()) == Some(category))
        .map(|(location, _)| location)
        .collect()
}

/// One-in-this chance that a fire burns out, from fire station coverage.
#[must_use]
pub fn burn_out_rate(coverage: u8) -> u32 {
    match coverage {
        0 => 10,
        1..=20 => 3,
        21..=100 => 2,
        _ => 1,
    }
}

/// Spreads every burning tile to its neighbours and lets some burn out.
///
/// A neighbour that belongs to a building burns the whole building down.
/// Returns the number of buildings lost.
pub fn spread_fire(
    map: &mut TileMap,
    registry: &TileRegistry,
    rng: &mut CityRng,
    coverage: &Layer<u8>,
) -> usize {
    let mut buildings_lost = 0;
    for fire in tiles_in(map, registry, Category::Fire) {
        for next in fire.neighbors4() {
            if !rng.chance(SPREAD_CHANCE) {
                continue;
            }
            if let Some(center) = map.zone_center_of(next, registry) {
                if rubble_zone(map, registry, rng, center).is_some() {
                    buildings_lost += 1;
                }
            } else if registry.is_combustible(map.tile_id(next)) {
                let _ = start_fire(map, registry, rng, next);
            }
        }
        if rng.chance(burn_out_rate(coverage.get(fire))) {
            let variant = rng.below(u32::from(RUBBLE_VARIANTS)) as u16;
            map.set_tile(fire, registry.cell_for(RUBBLE_BASE.offset(variant)));
        }
    }
    buildings_lost
}

/// Reports whether flood water may cover the tile.
#[must_use]
pub fn is_floodable(registry: &TileRegistry, id: TileId) -> bool {
    id == TileId::DIRT
        || matches!(
            registry.category(id),
            Some(Category::Trees | Category::Rubble | Category::Park)
        )
}

/// Covers the tile with flood water of a random depth.
pub fn flood_tile(map: &mut TileMap, registry: &TileRegistry, rng: &mut CityRng, location: CityLocation) {
    let variant = rng.below(u32::from(FLOOD_VARIANTS)) as u16;
    map.set_tile(location, registry.cell_for(FLOOD_BASE.offset(variant)));
}

/// Spreads flood water while `rising`, otherwise lets it drain.
pub fn update_flood(map: &mut TileMap, registry: &TileRegistry, rng: &mut CityRng, rising: bool) {
    for water in tiles_in(map, registry, Category::Flood) {
        if rising {
            for next in water.neighbors4() {
                if is_floodable(registry, map.tile_id(next)) && rng.chance(SPREAD_CHANCE) {
                    flood_tile(map, registry, rng, next);
                }
            }
        } else if rng.chance(FLOOD_RECEDE_CHANCE) {
            map.set_tile(water, registry.cell_for(TileId::DIRT));
        }
    }
}

/// Lets contaminated tiles slowly return to dirt.
pub fn decay_radiation(map: &mut TileMap, registry: &TileRegistry, rng: &mut CityRng) {
    for location in tiles_in(map, registry, Category::Radioactive) {
        if map.tile_id(location) == RADIOACTIVE && rng.chance(RADIATION_DECAY_CHANCE) {
            map.set_tile(location, registry.cell_for(TileId::DIRT));
        }
    }
}

/// Advances every animated tile to its successor frame.
pub fn animate_tiles(map: &mut TileMap, registry: &TileRegistry) {
    let animated: Vec<(CityLocation, TileId)> = map
        .iter()
        .filter(|(_, cell)| cell.is_animated())
        .filter_map(|(location, cell)| {
            let next = registry.get(cell.id())?.animate?;
            Some((location, next))
        })
        .collect();
    for (location, next) in animated {
        map.set_tile(location, registry.cell_for(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citysim_tiles::well_known::{FIRE_BASE, TINY_EXP_BASE, TREE_BASE};

    fn registry() -> TileRegistry {
        TileRegistry::bundled().expect("bundled catalogue")
    }

    #[test]
    fn coverage_shortens_fires() {
        assert_eq!(burn_out_rate(0), 10);
        assert_eq!(burn_out_rate(5), 3);
        assert_eq!(burn_out_rate(60), 2);
        assert_eq!(burn_out_rate(200), 1);
    }

    #[test]
    fn covered_fires_burn_out_at_once() {
        let registry = registry();
        let mut map = TileMap::new(5, 5);
        let mut rng = CityRng::from_seed_u64(9);
        map.set_tile(CityLocation::new(2, 2), registry.cell_for(FIRE_BASE));
        let mut coverage = Layer::new(5, 5);
        coverage.fill(255);

        let _ = spread_fire(&mut map, &registry, &mut rng, &coverage);
        assert_eq!(
            registry.category(map.tile_id(CityLocation::new(2, 2))),
            Some(Category::Rubble)
        );
    }

    #[test]
    fn forests_eventually_catch() {
        let registry = registry();
        let mut map = TileMap::new(3, 1);
        let mut rng = CityRng::from_seed_u64(9);
        map.set_tile(CityLocation::new(0, 0), registry.cell_for(TREE_BASE));
        map.set_tile(CityLocation::new(2, 0), registry.cell_for(TREE_BASE));
        let coverage = Layer::new(3, 1);

        let mut caught = false;
        for _ in 0..200 {
            map.set_tile(CityLocation::new(1, 0), registry.cell_for(FIRE_BASE));
            let _ = spread_fire(&mut map, &registry, &mut rng, &coverage);
            caught |= [0, 2].into_iter().any(|x| {
                registry.category(map.tile_id(CityLocation::new(x, 0))) == Some(Category::Fire)
            });
        }
        assert!(caught);
    }

    #[test]
    fn explosions_animate_into_rubble() {
        let registry = registry();
        let mut map = TileMap::new(2, 2);
        map.set_tile(CityLocation::new(0, 0), registry.cell_for(TINY_EXP_BASE));
        for _ in 0..8 {
            animate_tiles(&mut map, &registry);
        }
        assert_eq!(map.tile_id(CityLocation::new(0, 0)), RUBBLE_BASE);
        animate_tiles(&mut map, &registry);
        assert_eq!(map.tile_id(CityLocation::new(0, 0)), RUBBLE_BASE);
    }

    #[test]
    fn floods_drain_once_the_water_stops_rising() {
        let registry = registry();
        let mut map = TileMap::new(4, 4);
        let mut rng = CityRng::from_seed_u64(1);
        flood_tile(&mut map, &registry, &mut rng, CityLocation::new(1, 1));
        for _ in 0..200 {
            update_flood(&mut map, &registry, &mut rng, false);
        }
        assert!(tiles_in(&map, &registry, Category::Flood).is_empty());
    }
}
