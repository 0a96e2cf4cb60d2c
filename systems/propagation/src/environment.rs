use citysim_core::{CityLocation, ZoneKind};
use citysim_tiles::{Category, TileRegistry};
use citysim_world::{DerivedMaps, Layer, TileMap};

/// Manhattan radius served by a police or fire station.
pub const SERVICE_RADIUS: i32 = 12;

const LAND_VALUE_BASE: i32 = 64;
const RADIOACTIVE_POLLUTION: u16 = 255;

/// Rebuilds pollution, service coverage, land value and crime from the tiles.
///
/// Traffic must already be up to date; road pollution is derived from it.
pub fn update_environment(map: &TileMap, registry: &TileRegistry, maps: &mut DerivedMaps) {
    update_pollution(map, registry, &maps.traffic, &mut maps.pollution);
    update_coverage(map, registry, ZoneKind::PoliceStation, &mut maps.police);
    update_coverage(map, registry, ZoneKind::FireStation, &mut maps.fire);
    update_land_value(map, registry, maps);
    update_crime(map, registry, maps);
}

fn update_pollution(
    map: &TileMap,
    registry: &TileRegistry,
    traffic: &Layer<u8>,
    pollution: &mut Layer<u8>,
) {
    let mut sources: Layer<u16> = Layer::new(map.width(), map.height());
    for (location, cell) in map.iter() {
        let Some(spec) = registry.get(cell.id()) else {
            continue;
        };
        let emitted = match spec.category {
            Category::Radioactive => RADIOACTIVE_POLLUTION,
            Category::Road | Category::Rail | Category::Crossing => {
                u16::from(traffic.get(location)) / 4
            }
            Category::Zone => map
                .zone_center_of(location, registry)
                .and_then(|center| registry.get(map.tile_id(center)))
                .map_or(0, |owner| u16::from(owner.pollution)),
            _ => 0,
        };
        sources.set(location, emitted);
    }

    for (location, _) in map.iter() {
        let own = u32::from(sources.get(location)) * 2;
        let around: u32 = location
            .neighbors4()
            .into_iter()
            .map(|neighbor| u32::from(sources.get(neighbor)))
            .sum();
        pollution.set(location, ((own + around) / 6).min(255) as u8);
    }
}

fn update_coverage(map: &TileMap, registry: &TileRegistry, station: ZoneKind, layer: &mut Layer<u8>) {
    layer.fill(0);
    for center in map.zone_centers() {
        if registry.zone_kind(map.tile_id(center)) != Some(station) {
            continue;
        }
        let powered = map.tile(center).is_some_and(|cell| cell.is_powered());
        for dy in -SERVICE_RADIUS..=SERVICE_RADIUS {
            let span = SERVICE_RADIUS - dy.abs();
            for dx in -span..=span {
                let location = center.offset(dx, dy);
                if !map.test_bounds(location) {
                    continue;
                }
                let distance = location.manhattan_distance(center) as i32;
                let mut strength = 255 * (SERVICE_RADIUS + 1 - distance) / (SERVICE_RADIUS + 1);
                if !powered {
                    strength /= 2;
                }
                let strength = strength.clamp(0, 255) as u8;
                if strength > layer.get(location) {
                    layer.set(location, strength);
                }
            }
        }
    }
}

fn update_land_value(map: &TileMap, registry: &TileRegistry, maps: &mut DerivedMaps) {
    for (location, cell) in map.iter() {
        let category = registry.category(cell.id());
        if matches!(category, Some(Category::Water)) {
            maps.land_value.set(location, 0);
            continue;
        }

        let (mut water, mut trees, mut parks) = (0, 0, 0);
        for dy in -2..=2 {
            for dx in -2..=2 {
                match registry.category(map.tile_id(location.offset(dx, dy))) {
                    Some(Category::Water) => water += 1,
                    Some(Category::Trees) => trees += 1,
                    Some(Category::Park) => parks += 1,
                    _ => {}
                }
            }
        }

        let value = LAND_VALUE_BASE + (water * 6).min(48) + (trees * 3).min(30) + (parks * 8).min(40)
            - i32::from(maps.pollution.get(location)) / 2
            - i32::from(maps.crime.get(location)) / 4;
        maps.land_value.set(location, value.clamp(0, 255) as u8);
    }
}

fn update_crime(map: &TileMap, registry: &TileRegistry, maps: &mut DerivedMaps) {
    for (location, _) in map.iter() {
        let crime = developed_population(map, registry, location).map_or(0, |population| {
            let base = 40 + population as i32 / 2 + (255 - i32::from(maps.land_value.get(location))) / 4;
            base - i32::from(maps.police.get(location)) / 2
        });
        maps.crime.set(location, crime.clamp(0, 255) as u8);
    }
}

fn developed_population(map: &TileMap, registry: &TileRegistry, location: CityLocation) -> Option<u32> {
    let center = map.zone_center_of(location, registry)?;
    let owner = registry.get(map.tile_id(center))?;
    owner
        .zone
        .filter(|zone| zone.is_growable() && owner.level > 0)
        .map(|_| owner.population)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citysim_tiles::well_known::{RADIOACTIVE, TREE_BASE};
    use citysim_world::edit::place_building;

    fn setup(width: u32, height: u32) -> (TileRegistry, TileMap, DerivedMaps) {
        let registry = TileRegistry::bundled().expect("bundled catalogue");
        (registry, TileMap::new(width, height), DerivedMaps::new(width, height))
    }

    #[test]
    fn industry_pollutes_its_surroundings() {
        let (registry, mut map, mut maps) = setup(12, 12);
        let factory = registry
            .building_for(ZoneKind::Industrial, 4)
            .expect("heavy industry");
        let _ = place_building(&mut map, &registry, CityLocation::new(5, 5), factory);
        update_environment(&map, &registry, &mut maps);

        assert!(maps.pollution.get(CityLocation::new(5, 5)) > 50);
        assert!(maps.pollution.get(CityLocation::new(7, 5)) > 0);
        assert_eq!(maps.pollution.get(CityLocation::new(0, 0)), 0);
    }

    #[test]
    fn stations_cover_a_diamond() {
        let (registry, mut map, mut maps) = setup(40, 40);
        let station = registry
            .building_for(ZoneKind::PoliceStation, 0)
            .expect("police");
        let center = CityLocation::new(20, 20);
        let _ = place_building(&mut map, &registry, center, station);
        update_environment(&map, &registry, &mut maps);

        assert!(maps.police.get(center) > maps.police.get(CityLocation::new(26, 20)));
        assert!(maps.police.get(CityLocation::new(32, 20)) > 0);
        assert_eq!(maps.police.get(CityLocation::new(33, 20)), 0);
        assert_eq!(maps.fire.get(center), 0);
    }

    #[test]
    fn trees_raise_and_radiation_lowers_land_value() {
        let (registry, mut map, mut maps) = setup(20, 10);
        map.set_tile(CityLocation::new(3, 3), registry.cell_for(TREE_BASE));
        map.set_tile(CityLocation::new(15, 3), registry.cell_for(RADIOACTIVE));
        update_environment(&map, &registry, &mut maps);

        let plain = maps.land_value.get(CityLocation::new(9, 8));
        assert!(maps.land_value.get(CityLocation::new(4, 3)) > plain);
        assert!(maps.land_value.get(CityLocation::new(15, 3)) < plain);
    }
}
