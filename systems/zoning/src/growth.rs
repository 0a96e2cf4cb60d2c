use citysim_core::{CityLocation, CityRect, Demand, TileId, ZoneKind};
use citysim_tiles::TileRegistry;
use citysim_world::{
    edit::{has_road_access, place_building, rubble_zone},
    CityRng, DerivedMaps, TileMap, TripOutcome, TripReport,
};
use serde::Deserialize;

const TRIP_PENALTY: i32 = 20;

/// Tunables for zone growth and decline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ZoningConfig {
    /// A zone grows when its score is above this value.
    pub grow_threshold: i32,
    /// A zone declines when its score is below this value.
    pub decline_threshold: i32,
    /// An empty declining lot is demolished with a one-in-this chance.
    pub demolish_chance: u32,
    /// Most upgrades performed in a single tick.
    pub max_growth_per_tick: u32,
    /// Largest random adjustment added to a score, in either direction.
    pub score_jitter: i32,
}

impl Default for ZoningConfig {
    fn default() -> Self {
        Self {
            grow_threshold: 10,
            decline_threshold: -20,
            demolish_chance: 10,
            max_growth_per_tick: 4,
            score_jitter: 8,
        }
    }
}

/// What happened to a zone during one growth pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneChange {
    /// The zone moved up one level.
    Grew,
    /// The zone moved down one level.
    Declined,
    /// The empty lot was reduced to rubble.
    Demolished,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    center: CityLocation,
    kind: ZoneKind,
    id: TileId,
    footprint: CityRect,
}

/// Read-only inputs of a growth pass.
#[derive(Clone, Copy, Debug)]
pub struct GrowthInputs<'a> {
    /// Derived maps from the previous propagation pass.
    pub maps: &'a DerivedMaps,
    /// Trip outcomes from the previous traffic pass.
    pub trips: &'a TripReport,
    /// Demand valves from this tick's census.
    pub demand: Demand,
}

/// Scores every growable zone and upgrades, downgrades or demolishes it.
///
/// Zones are visited residential first, then commercial, then industrial,
/// each family in row-major order, and one jitter value is drawn per zone
/// whatever its fate. Returns the changes in visiting order.
pub fn grow_zones(
    map: &mut TileMap,
    registry: &TileRegistry,
    rng: &mut CityRng,
    inputs: GrowthInputs<'_>,
    config: &ZoningConfig,
) -> Vec<(CityLocation, ZoneChange)> {
    let mut candidates: Vec<Candidate> = map
        .zone_centers()
        .into_iter()
        .filter_map(|center| {
            let id = map.tile_id(center);
            let kind = registry.zone_kind(id).filter(|kind| kind.is_growable())?;
            let footprint = registry.zone_footprint(center, id)?;
            Some(Candidate {
                center,
                kind,
                id,
                footprint,
            })
        })
        .collect();
    candidates.sort_by_key(|candidate| (candidate.kind.precedence(), candidate.center));

    let mut changes = Vec::new();
    let mut growth_left = config.max_growth_per_tick;
    for candidate in candidates {
        let jitter = rng.range(-config.score_jitter, config.score_jitter);
        let score = zone_score(map, registry, &candidate, inputs) + jitter;
        let powered = map
            .tile(candidate.center)
            .is_some_and(|cell| cell.is_powered());

        if powered && score > config.grow_threshold {
            if growth_left == 0 || !has_road_access(map, registry, candidate.footprint) {
                continue;
            }
            let Some(next) = registry.next_variant(candidate.id) else {
                continue;
            };
            if place_building(map, registry, candidate.center, next).is_some() {
                growth_left -= 1;
                changes.push((candidate.center, ZoneChange::Grew));
            }
        } else if !powered || score < config.decline_threshold {
            if let Some(previous) = registry.previous_variant(candidate.id) {
                if place_building(map, registry, candidate.center, previous).is_some() {
                    changes.push((candidate.center, ZoneChange::Declined));
                }
            } else if score < config.decline_threshold
                && rng.chance(config.demolish_chance)
                && rubble_zone(map, registry, rng, candidate.center).is_some()
            {
                changes.push((candidate.center, ZoneChange::Demolished));
            }
        }
    }
    changes
}

fn zone_score(
    map: &TileMap,
    registry: &TileRegistry,
    candidate: &Candidate,
    inputs: GrowthInputs<'_>,
) -> i32 {
    let maps = inputs.maps;
    let center = candidate.center;
    let traffic = maps.traffic.mean_over(candidate.footprint.perimeter());
    let stranded = !has_road_access(map, registry, candidate.footprint)
        || matches!(
            inputs.trips.outcome(center),
            Some(TripOutcome::NoRoad | TripOutcome::NoDestination)
        );

    i32::from(inputs.demand.for_zone(candidate.kind)) / 20 + i32::from(maps.land_value.get(center)) / 4
        - i32::from(maps.pollution.get(center)) / 4
        - i32::from(maps.crime.get(center)) / 4
        - i32::from(traffic) / 8
        - if stranded { TRIP_PENALTY } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citysim_core::Network;
    use citysim_tiles::well_known::{RUBBLE_BASE, RUBBLE_VARIANTS};

    struct Fixture {
        registry: TileRegistry,
        map: TileMap,
        maps: DerivedMaps,
        trips: TripReport,
        rng: CityRng,
    }

    impl Fixture {
        fn new() -> Self {
            let mut maps = DerivedMaps::new(16, 12);
            maps.land_value.fill(64);
            Self {
                registry: TileRegistry::bundled().expect("bundled catalogue"),
                map: TileMap::new(16, 12),
                maps,
                trips: TripReport::default(),
                rng: CityRng::from_seed_u64(11),
            }
        }

        fn zone(&mut self, center: CityLocation, kind: ZoneKind, level: u8, powered: bool) {
            let anchor = self.registry.building_for(kind, level).expect("building");
            let footprint = place_building(&mut self.map, &self.registry, center, anchor)
                .expect("placed");
            for location in footprint.locations() {
                self.map.set_powered(location, powered);
            }
        }

        fn road_row(&mut self, y: i32) {
            let road = self
                .registry
                .network_tile(Network::Road, 10)
                .expect("road");
            for x in 0..16 {
                self.map
                    .set_tile(CityLocation::new(x, y), self.registry.cell_for(road));
            }
        }

        fn run(&mut self, demand: Demand, config: &ZoningConfig) -> Vec<(CityLocation, ZoneChange)> {
            grow_zones(
                &mut self.map,
                &self.registry,
                &mut self.rng,
                GrowthInputs {
                    maps: &self.maps,
                    trips: &self.trips,
                    demand,
                },
                config,
            )
        }

        fn level_at(&self, center: CityLocation) -> u8 {
            self.registry
                .get(self.map.tile_id(center))
                .map_or(0, |spec| spec.level)
        }
    }

    fn strong_demand() -> Demand {
        Demand {
            residential: 1_000,
            commercial: 1_000,
            industrial: 1_000,
        }
    }

    #[test]
    fn powered_zones_on_a_road_grow() {
        let mut fixture = Fixture::new();
        let center = CityLocation::new(2, 2);
        fixture.zone(center, ZoneKind::Residential, 0, true);
        fixture.road_row(4);

        let changes = fixture.run(strong_demand(), &ZoningConfig::default());
        assert_eq!(changes, vec![(center, ZoneChange::Grew)]);
        assert_eq!(fixture.level_at(center), 1);
        assert!(fixture.map.tile(center).is_some_and(|cell| cell.is_powered()));
    }

    #[test]
    fn zones_without_a_road_stay_put() {
        let mut fixture = Fixture::new();
        let center = CityLocation::new(2, 2);
        fixture.zone(center, ZoneKind::Residential, 0, true);

        let changes = fixture.run(strong_demand(), &ZoningConfig::default());
        assert!(changes.is_empty());
        assert_eq!(fixture.level_at(center), 0);
    }

    #[test]
    fn unpowered_developed_zones_decline() {
        let mut fixture = Fixture::new();
        let center = CityLocation::new(2, 2);
        fixture.zone(center, ZoneKind::Commercial, 3, false);
        fixture.road_row(4);

        let changes = fixture.run(strong_demand(), &ZoningConfig::default());
        assert_eq!(changes, vec![(center, ZoneChange::Declined)]);
        assert_eq!(fixture.level_at(center), 2);
    }

    #[test]
    fn growth_is_capped_and_follows_precedence() {
        let mut fixture = Fixture::new();
        let industry = CityLocation::new(2, 2);
        let housing = CityLocation::new(6, 2);
        let shops = CityLocation::new(10, 2);
        fixture.zone(industry, ZoneKind::Industrial, 0, true);
        fixture.zone(housing, ZoneKind::Residential, 0, true);
        fixture.zone(shops, ZoneKind::Commercial, 0, true);
        fixture.road_row(4);

        let config = ZoningConfig {
            max_growth_per_tick: 2,
            ..ZoningConfig::default()
        };
        let changes = fixture.run(strong_demand(), &config);
        assert_eq!(
            changes,
            vec![(housing, ZoneChange::Grew), (shops, ZoneChange::Grew)]
        );
        assert_eq!(fixture.level_at(industry), 0);
    }

    #[test]
    fn hopeless_empty_lots_are_demolished() {
        let mut fixture = Fixture::new();
        let center = CityLocation::new(2, 2);
        fixture.zone(center, ZoneKind::Industrial, 0, true);
        let config = ZoningConfig {
            demolish_chance: 1,
            ..ZoningConfig::default()
        };
        let demand = Demand {
            residential: 0,
            commercial: 0,
            industrial: -2_000,
        };

        let changes = fixture.run(demand, &config);
        assert_eq!(changes, vec![(center, ZoneChange::Demolished)]);
        let id = fixture.map.tile_id(center);
        assert!(id >= RUBBLE_BASE && id < RUBBLE_BASE.offset(RUBBLE_VARIANTS));
    }
}
