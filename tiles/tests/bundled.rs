use citysim_core::{CityLocation, Network, TileId, ZoneKind};
use citysim_tiles::{
    well_known::{FIRE_BASE, PARK_BASE, RUBBLE_BASE, TINY_EXP_BASE},
    Category, RegistryError, TileRegistry, HORIZONTAL, VERTICAL,
};

fn registry() -> TileRegistry {
    TileRegistry::bundled().expect("bundled catalogue loads")
}

#[test]
fn bundled_catalogue_is_contiguous_and_complete() {
    let registry = registry();
    assert_eq!(registry.len(), 326);
    for (index, spec) in registry.iter().enumerate() {
        assert_eq!(spec.id.index(), index);
    }
}

#[test]
fn every_zone_kind_has_a_ground_level_building() {
    let registry = registry();
    for zone in ZoneKind::ALL {
        let anchor = registry
            .building_for(zone, 0)
            .unwrap_or_else(|| panic!("{zone:?} has no building"));
        let spec = registry.get(anchor).expect("anchor registered");
        assert!(spec.is_zone_center());
        assert_eq!(registry.owner_of(anchor), Some((anchor, (0, 0))));
    }
}

#[test]
fn growable_zones_step_through_five_levels() {
    let registry = registry();
    for zone in [
        ZoneKind::Residential,
        ZoneKind::Commercial,
        ZoneKind::Industrial,
    ] {
        let mut current = registry.building_for(zone, 0).expect("level 0");
        for level in 1..5 {
            current = registry.next_variant(current).expect("next level");
            assert_eq!(registry.get(current).map(|spec| spec.level), Some(level));
        }
        assert_eq!(registry.next_variant(current), None);
        let back = registry.previous_variant(current).expect("previous level");
        assert_eq!(registry.get(back).map(|spec| spec.level), Some(3));
    }
    let fire = registry
        .building_for(ZoneKind::FireStation, 0)
        .expect("fire station");
    assert_eq!(registry.next_variant(fire), None);
}

#[test]
fn airport_members_resolve_to_their_anchor() {
    let registry = registry();
    let anchor = registry
        .building_for(ZoneKind::Airport, 0)
        .expect("airport");
    let building = registry
        .get(anchor)
        .and_then(|spec| spec.building.clone())
        .expect("airport layout");
    assert_eq!((building.width, building.height), (6, 6));

    let corner = building.members[35];
    assert_eq!(registry.owner_of(corner), Some((anchor, (4, 4))));

    let center = CityLocation::new(20, 20);
    let footprint = registry
        .zone_footprint(center, anchor)
        .expect("footprint");
    assert_eq!(footprint.origin(), CityLocation::new(19, 19));
    assert_eq!(footprint.area(), 36);
}

#[test]
fn network_tiles_cover_every_link_mask() {
    let registry = registry();
    for network in Network::ALL {
        for mask in 0..16u8 {
            let id = registry
                .network_tile(network, mask)
                .unwrap_or_else(|| panic!("{network:?} mask {mask}"));
            let spec = registry.get(id).expect("network tile registered");
            assert!(spec.link(network).is_some());
            assert!(!spec.overwater);
        }
    }
    assert!(registry.bridge_tile(HORIZONTAL).is_some());
    assert!(registry.bridge_tile(VERTICAL).is_some());
    assert_eq!(registry.bridge_tile(0b0011), None);
}

#[test]
fn crossings_exist_for_each_network_pair() {
    let registry = registry();
    let crossing = registry
        .crossing_tile(Network::Road, HORIZONTAL, Network::Rail)
        .expect("road over rail");
    assert_eq!(registry.category(crossing), Some(Category::Crossing));
    assert!(registry
        .crossing_tile(Network::Wire, VERTICAL, Network::Rail)
        .is_some());
    assert_eq!(
        registry.crossing_tile(Network::Road, 0b0011, Network::Wire),
        None
    );
}

#[test]
fn hazard_tiles_animate_in_loops() {
    let registry = registry();
    let mut id = FIRE_BASE;
    for _ in 0..4 {
        id = registry.get(id).and_then(|spec| spec.animate).expect("fire animates");
    }
    assert_eq!(id, FIRE_BASE);

    let mut id = TINY_EXP_BASE;
    for _ in 0..8 {
        id = registry
            .get(id)
            .and_then(|spec| spec.animate)
            .expect("explosion animates");
    }
    assert_eq!(id, RUBBLE_BASE);
    assert!(registry.cell_for(FIRE_BASE).is_animated());
    assert!(!registry.cell_for(PARK_BASE).is_animated());
}

#[test]
fn truncated_catalogue_fails_well_known_validation() {
    let error = TileRegistry::load("0 category=dirt\n1 category=water\n").expect_err("too small");
    assert!(matches!(error, RegistryError::BadWellKnownTile { id: 2, .. }));
}

#[test]
fn dirt_is_plain_land() {
    let registry = registry();
    let dirt = registry.get(TileId::DIRT).expect("dirt");
    assert_eq!(dirt.category, Category::Dirt);
    assert!(!dirt.dozeable);
    assert!(!dirt.combustible);
}
