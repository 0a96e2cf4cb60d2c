use citysim_core::{CityLocation, Event, Network, TileId, ToolKind, ToolResult, ZoneKind};
use citysim_system_tools::{apply_tool, drag_tool, preview_tool, ToolStroke};
use citysim_tiles::{
    well_known::{RADIOACTIVE, TINY_EXP_BASE},
    TileRegistry,
};
use citysim_world::{edit::place_building, query, World};
use proptest::prelude::*;

const WIDTH: u32 = 24;
const HEIGHT: u32 = 20;

fn registry() -> TileRegistry {
    TileRegistry::bundled().expect("bundled catalogue")
}

fn tool_strategy() -> impl Strategy<Value = ToolKind> {
    prop::sample::select(ToolKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn in_bounds_anchors_never_report_uh_oh(
        tool in tool_strategy(),
        x in 0..WIDTH as i32,
        y in 0..HEIGHT as i32,
    ) {
        let registry = registry();
        let mut world = World::new(WIDTH, HEIGHT, 7, 1_000_000);
        let mut events = Vec::new();
        let result = apply_tool(&mut world, &registry, tool, CityLocation::new(x, y), &mut events);
        prop_assert_ne!(result, ToolResult::UhOh);
    }

    #[test]
    fn out_of_bounds_anchors_change_nothing(
        tool in tool_strategy(),
        x in -10..WIDTH as i32 + 10,
        y in prop_oneof![-10..0i32, HEIGHT as i32..HEIGHT as i32 + 10],
    ) {
        let registry = registry();
        let mut world = World::new(WIDTH, HEIGHT, 7, 1_000_000);
        let before = query::map(&world).as_raw();
        let mut events = Vec::new();
        let result = apply_tool(&mut world, &registry, tool, CityLocation::new(x, y), &mut events);
        prop_assert_eq!(result, ToolResult::UhOh);
        prop_assert_eq!(query::map(&world).as_raw(), before);
        prop_assert_eq!(query::funds(&world), 1_000_000);
    }

    #[test]
    fn drags_toward_any_end_stay_on_the_map(
        tool in prop::sample::select(vec![ToolKind::Road, ToolKind::Wire, ToolKind::Rail]),
        x in 0..WIDTH as i32,
        y in 0..HEIGHT as i32,
        end_x in prop_oneof![any::<i32>(), -40..WIDTH as i32 + 40, Just(i32::MIN), Just(i32::MAX)],
        end_y in prop_oneof![any::<i32>(), -40..HEIGHT as i32 + 40, Just(i32::MIN), Just(i32::MAX)],
    ) {
        let registry = registry();
        let mut world = World::new(WIDTH, HEIGHT, 7, 1_000_000);
        let before = query::map(&world).as_raw();
        let from = CityLocation::new(x, y);
        let mut events = Vec::new();

        let result = drag_tool(
            &mut world,
            &registry,
            tool,
            from,
            CityLocation::new(end_x, end_y),
            &mut events,
        );
        prop_assert_ne!(result, ToolResult::UhOh);

        let corner = query::map(&world).bounds().clamp(CityLocation::new(end_x, end_y));
        let after = query::map(&world).as_raw();
        prop_assert_eq!(after.len(), before.len());
        for (index, (old, new)) in before.iter().zip(&after).enumerate() {
            if old == new {
                continue;
            }
            let cell = CityLocation::new(index as i32 % WIDTH as i32, index as i32 / WIDTH as i32);
            let on_row = cell.y() == y && (cell.x() - x) * (cell.x() - corner.x()) <= 0;
            let on_column = cell.x() == corner.x() && (cell.y() - y) * (cell.y() - corner.y()) <= 0;
            prop_assert!(on_row || on_column, "cell {:?} is off the drag path", cell);
        }
    }
}

#[test]
fn drags_to_the_far_left_stop_at_the_map_edge() {
    let registry = registry();
    let mut world = World::new(10, 10, 7, 1_000);
    let mut events = Vec::new();

    let result = drag_tool(
        &mut world,
        &registry,
        ToolKind::Road,
        CityLocation::new(5, 5),
        CityLocation::new(i32::MIN, 5),
        &mut events,
    );
    assert_eq!(result, ToolResult::Success);
    for x in 0..=5 {
        assert!(registry
            .get(query::tile_id(&world, CityLocation::new(x, 5)))
            .is_some_and(|spec| spec.link(Network::Road).is_some()));
    }
    assert_eq!(query::funds(&world), 1_000 - 6 * ToolKind::Road.cost());
}

#[test]
fn previews_clamp_the_drag_end_like_real_drags() {
    let registry = registry();
    let world = World::new(10, 10, 7, 1_000);
    let mut stroke =
        ToolStroke::new(ToolKind::Wire, CityLocation::new(2, 2)).drag_to(CityLocation::new(2, i32::MAX));
    let preview = preview_tool(query::map(&world), &registry, &mut stroke, 1_000);
    assert_eq!(preview.result, ToolResult::Success);
    assert_eq!(preview.changes.len(), 8);
    assert_eq!(preview.cost, 8 * ToolKind::Wire.cost());
}

#[test]
fn shortfall_keeps_cells_built_before_it() {
    let registry = registry();
    let funds = 3 * ToolKind::Road.cost() + 5;
    let mut world = World::new(WIDTH, HEIGHT, 7, funds);
    let mut events = Vec::new();

    let result = drag_tool(
        &mut world,
        &registry,
        ToolKind::Road,
        CityLocation::new(2, 2),
        CityLocation::new(9, 2),
        &mut events,
    );

    assert_eq!(result, ToolResult::InsufficientFunds);
    for x in 2..5 {
        let id = query::tile_id(&world, CityLocation::new(x, 2));
        assert!(registry.get(id).is_some_and(|spec| spec.link(Network::Road).is_some()));
    }
    for x in 5..10 {
        assert_eq!(query::tile_id(&world, CityLocation::new(x, 2)), TileId::DIRT);
    }
    assert_eq!(query::funds(&world), 5);
    assert!(events.contains(&Event::FundsChanged { funds: 5 }));
}

#[test]
fn bulldozing_a_member_levels_the_exact_footprint() {
    let registry = registry();
    let mut world = World::new(WIDTH, HEIGHT, 7, 1_000);
    let plant = registry
        .building_for(ZoneKind::CoalPower, 0)
        .expect("coal plant");
    let center = CityLocation::new(6, 6);
    let footprint =
        place_building(world.map_mut(), &registry, center, plant).expect("placed");
    world
        .map_mut()
        .set_tile(CityLocation::new(7, 7), registry.cell_for(RADIOACTIVE));

    let mut events = Vec::new();
    let result = apply_tool(
        &mut world,
        &registry,
        ToolKind::Bulldozer,
        CityLocation::new(8, 8),
        &mut events,
    );

    assert_eq!(result, ToolResult::Success);
    for location in footprint.locations() {
        let id = query::tile_id(&world, location);
        if location == CityLocation::new(7, 7) {
            assert_eq!(id, RADIOACTIVE);
        } else {
            assert!(id >= TINY_EXP_BASE && id < TINY_EXP_BASE.offset(3), "{location:?}");
        }
    }
    for location in footprint.perimeter() {
        assert_eq!(query::tile_id(&world, location), TileId::DIRT);
    }
    assert_eq!(query::funds(&world), 999);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::CitySound {
            sound: citysim_core::CitySound::ExplosionLow,
            ..
        }
    )));
}

#[test]
fn zones_placed_by_tools_carry_a_center() {
    let registry = registry();
    let mut world = World::new(WIDTH, HEIGHT, 7, 1_000);
    let mut events = Vec::new();
    let result = apply_tool(
        &mut world,
        &registry,
        ToolKind::Residential,
        CityLocation::new(5, 5),
        &mut events,
    );
    assert_eq!(result, ToolResult::Success);
    assert_eq!(
        registry.zone_kind(query::tile_id(&world, CityLocation::new(5, 5))),
        Some(ZoneKind::Residential)
    );
    assert_eq!(query::map(&world).zone_centers(), vec![CityLocation::new(5, 5)]);
    assert_eq!(query::funds(&world), 1_000 - ToolKind::Residential.cost());

    let overlapping = apply_tool(
        &mut world,
        &registry,
        ToolKind::Commercial,
        CityLocation::new(6, 6),
        &mut events,
    );
    assert_eq!(overlapping, ToolResult::None);
}

#[test]
fn previews_match_the_real_cost_without_editing() {
    let registry = registry();
    let mut world = World::new(WIDTH, HEIGHT, 7, 1_000);
    let mut stroke =
        ToolStroke::new(ToolKind::Rail, CityLocation::new(1, 1)).drag_to(CityLocation::new(1, 6));
    let preview = preview_tool(query::map(&world), &registry, &mut stroke, 1_000);
    assert_eq!(preview.result, ToolResult::Success);
    assert_eq!(preview.cost, 6 * ToolKind::Rail.cost());
    assert_eq!(query::tile_id(&world, CityLocation::new(1, 1)), TileId::DIRT);

    let mut events = Vec::new();
    let _ = drag_tool(
        &mut world,
        &registry,
        ToolKind::Rail,
        CityLocation::new(1, 1),
        CityLocation::new(1, 6),
        &mut events,
    );
    assert_eq!(query::funds(&world), 1_000 - preview.cost);
}
