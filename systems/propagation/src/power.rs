use std::collections::VecDeque;

use citysim_core::CityLocation;
use citysim_tiles::TileRegistry;
use citysim_world::TileMap;

/// Recomputes the power bit of every cell.
///
/// Each plant floods outward over conductive cells, breadth first, for at most
/// its rated reach. Cells further away stay dark even when connected. The
/// result depends only on the tiles, so repeated calls on an unchanged map
/// produce the same powered set.
///
/// Returns the number of powered cells.
pub fn propagate_power(map: &mut TileMap, registry: &TileRegistry) -> usize {
    map.clear_power();

    let plants: Vec<(CityLocation, u32)> = map
        .zone_centers()
        .into_iter()
        .filter_map(|center| {
            let spec = registry.get(map.tile_id(center))?;
            let plant = spec.zone.is_some_and(|zone| zone.is_power_plant());
            (plant && spec.power_reach > 0).then_some((center, spec.power_reach))
        })
        .collect();

    let width = map.width() as usize;
    let mut stamps = vec![0u32; width * map.height() as usize];
    let mut frontier = VecDeque::new();

    for (stamp, (center, reach)) in (1u32..).zip(plants) {
        frontier.clear();
        frontier.push_back((center, 0u32));
        stamps[stamp_index(width, center)] = stamp;

        while let Some((location, depth)) = frontier.pop_front() {
            map.set_powered(location, true);
            if depth == reach {
                continue;
            }
            for next in location.neighbors4() {
                let Some(cell) = map.tile(next) else {
                    continue;
                };
                let index = stamp_index(width, next);
                if cell.is_conductive() && stamps[index] != stamp {
                    stamps[index] = stamp;
                    frontier.push_back((next, depth + 1));
                }
            }
        }
    }

    map.powered_count()
}

fn stamp_index(width: usize, location: CityLocation) -> usize {
    location.y() as usize * width + location.x() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use citysim_core::{Network, ZoneKind};
    use citysim_world::edit::place_building;

    fn wire_line(map: &mut TileMap, registry: &TileRegistry, y: i32, xs: std::ops::Range<i32>) {
        let wire = registry.network_tile(Network::Wire, 0).expect("wire");
        for x in xs {
            map.set_tile(CityLocation::new(x, y), registry.cell_for(wire));
        }
    }

    #[test]
    fn power_flows_over_conductive_cells_only() {
        let registry = TileRegistry::bundled().expect("bundled catalogue");
        let mut map = TileMap::new(20, 8);
        let plant = registry
            .building_for(ZoneKind::CoalPower, 0)
            .expect("plant");
        let _ = place_building(&mut map, &registry, CityLocation::new(2, 2), plant);
        wire_line(&mut map, &registry, 2, 5..10);

        let powered = propagate_power(&mut map, &registry);
        assert_eq!(powered, 16 + 5);
        assert!(map.tile(CityLocation::new(9, 2)).is_some_and(|c| c.is_powered()));
        assert!(!map.tile(CityLocation::new(10, 2)).is_some_and(|c| c.is_powered()));
        assert!(!map.tile(CityLocation::new(9, 3)).is_some_and(|c| c.is_powered()));
    }

    #[test]
    fn reach_limits_how_far_power_travels() {
        let registry = TileRegistry::bundled().expect("bundled catalogue");
        let mut map = TileMap::new(80, 6);
        let plant = registry
            .building_for(ZoneKind::CoalPower, 0)
            .expect("plant");
        let reach = registry.get(plant).map(|spec| spec.power_reach).expect("reach");
        let _ = place_building(&mut map, &registry, CityLocation::new(1, 1), plant);
        wire_line(&mut map, &registry, 1, 4..79);

        let _ = propagate_power(&mut map, &registry);
        let edge = 1 + reach as i32;
        assert!(map.tile(CityLocation::new(edge, 1)).is_some_and(|c| c.is_powered()));
        assert!(!map.tile(CityLocation::new(edge + 1, 1)).is_some_and(|c| c.is_powered()));
    }
}
