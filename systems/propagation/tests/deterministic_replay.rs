use citysim_core::{CityLocation, Command, Network, ZoneKind};
use citysim_system_propagation::{Propagation, PropagationConfig};
use citysim_tiles::TileRegistry;
use citysim_world::{self as world, edit::place_building, query, World};

fn seeded_city(registry: &TileRegistry) -> World {
    let mut world = World::new(32, 16, 42, 10_000);
    let map = world.map_mut();
    let plant = registry
        .building_for(ZoneKind::CoalPower, 0)
        .expect("coal plant");
    let _ = place_building(map, registry, CityLocation::new(2, 2), plant);
    for (center, zone) in [
        (CityLocation::new(8, 3), ZoneKind::Residential),
        (CityLocation::new(12, 3), ZoneKind::Commercial),
        (CityLocation::new(16, 3), ZoneKind::Industrial),
        (CityLocation::new(8, 7), ZoneKind::Residential),
    ] {
        let anchor = registry.building_for(zone, 2).expect("developed zone");
        let _ = place_building(map, registry, center, anchor);
    }
    let road = registry.network_tile(Network::Road, 10).expect("road");
    for x in 0..24 {
        map.set_tile(CityLocation::new(x, 5), registry.cell_for(road));
    }
    world
}

fn run(ticks: u32) -> (Vec<u16>, Vec<u8>, Vec<u8>) {
    let registry = TileRegistry::bundled().expect("bundled catalogue");
    let mut world = seeded_city(&registry);
    let mut propagation = Propagation::new(PropagationConfig::default());
    for _ in 0..ticks {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Step, &mut events);
        propagation.run(&mut world.tick_context(), &registry);
    }
    let maps = query::derived_maps(&world);
    (
        query::map(&world).as_raw(),
        maps.traffic.values().to_vec(),
        maps.pollution.values().to_vec(),
    )
}

#[test]
fn replay_with_the_same_seed_matches() {
    assert_eq!(run(20), run(20));
}

#[test]
fn power_is_idempotent_on_an_unchanged_map() {
    let registry = TileRegistry::bundled().expect("bundled catalogue");
    let mut world = seeded_city(&registry);
    let first = citysim_system_propagation::propagate_power(world.map_mut(), &registry);
    let raw = query::map(&world).as_raw();
    let second = citysim_system_propagation::propagate_power(world.map_mut(), &registry);
    assert_eq!(first, second);
    assert_eq!(raw, query::map(&world).as_raw());
    assert!(first > 16);
}

#[test]
fn developed_zones_send_traffic_onto_the_road() {
    let (_, traffic, _) = run(10);
    assert!(traffic.iter().any(|density| *density > 0));
}
