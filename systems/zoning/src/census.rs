use citysim_core::{Census, CityMessage, Demand, Event, Network, ZoneKind};
use citysim_tiles::{Category, TileRegistry};
use citysim_world::TileMap;

/// Total populations that trigger a milestone message when first crossed.
pub const POPULATION_MILESTONES: [u32; 6] = [500, 1_000, 2_000, 5_000, 10_000, 50_000];

const DEMAND_LIMIT: i64 = 2_000;

/// Counts buildings, residents, jobs and infrastructure on the map.
#[must_use]
pub fn take_census(map: &TileMap, registry: &TileRegistry) -> Census {
    let mut census = Census::default();
    for (_, cell) in map.iter() {
        let Some(spec) = registry.get(cell.id()) else {
            continue;
        };
        if spec.link(Network::Road).is_some() {
            census.road_tiles += 1;
        }
        if spec.link(Network::Rail).is_some() {
            census.rail_tiles += 1;
        }
        if spec.category == Category::Fire {
            census.fires += 1;
        }
        if !cell.is_zone_center() {
            continue;
        }
        let Some(zone) = spec.zone else {
            continue;
        };

        match zone {
            ZoneKind::Residential => {
                census.residential_zones += 1;
                census.residential_population += spec.population;
            }
            ZoneKind::Commercial => {
                census.commercial_zones += 1;
                census.commercial_jobs += spec.population;
            }
            ZoneKind::Industrial => {
                census.industrial_zones += 1;
                census.industrial_jobs += spec.population;
            }
            ZoneKind::Stadium => census.commercial_jobs += spec.population,
            ZoneKind::Seaport | ZoneKind::Airport => census.industrial_jobs += spec.population,
            ZoneKind::FireStation => census.fire_stations += 1,
            ZoneKind::PoliceStation => census.police_stations += 1,
            ZoneKind::CoalPower | ZoneKind::NuclearPower => census.power_plants += 1,
        }

        if !zone.is_power_plant() {
            if cell.is_powered() {
                census.powered_zones += 1;
            } else {
                census.unpowered_zones += 1;
            }
        }
    }
    census
}

/// Derives the demand valves from a census.
///
/// Housing follows jobs, shops follow residents and industry follows
/// residents more strongly. Every valve is clamped to ±2000.
#[must_use]
pub fn compute_demand(census: &Census) -> Demand {
    let residents = i64::from(census.residential_population);
    let jobs = i64::from(census.commercial_jobs) + i64::from(census.industrial_jobs);
    let valve = |value: i64| value.clamp(-DEMAND_LIMIT, DEMAND_LIMIT) as i16;
    Demand {
        residential: valve(jobs * 3 / 2 + 100 - residents),
        commercial: valve(residents / 2 + 50 - i64::from(census.commercial_jobs)),
        industrial: valve(residents * 2 / 3 + 50 - i64::from(census.industrial_jobs)),
    }
}

/// Emits one message for every milestone crossed on the way up.
pub fn announce_milestones(previous: u32, current: u32, out: &mut Vec<Event>) {
    for milestone in POPULATION_MILESTONES {
        if previous < milestone && current >= milestone {
            out.push(Event::CityMessage {
                message: CityMessage::PopulationMilestone {
                    population: milestone,
                },
                location: None,
            });
        }
    }
}
