use citysim_core::{CityLocation, ZoneKind};
use citysim_tiles::TileRegistry;
use citysim_world::{
    edit::is_travel_tile, CityRng, Layer, TileMap, TripOutcome, TripReport,
};
use serde::Deserialize;

/// Highest density a road cell can accumulate.
pub const MAX_DENSITY: u8 = 240;

/// Tunables for the traffic pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Longest walk a trip may take, in road cells.
    pub max_steps: u32,
    /// Share of density that evaporates every tick, in percent.
    pub decay_percent: u8,
    /// Density added to every cell of a successful trip.
    pub trip_density: u8,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            max_steps: 30,
            decay_percent: 10,
            trip_density: 50,
        }
    }
}

/// Zone kinds a trip from `origin` is looking for.
#[must_use]
pub fn destinations(origin: ZoneKind) -> &'static [ZoneKind] {
    match origin {
        ZoneKind::Residential => &[ZoneKind::Commercial, ZoneKind::Industrial],
        ZoneKind::Commercial => &[ZoneKind::Residential, ZoneKind::Industrial],
        ZoneKind::Industrial => &[ZoneKind::Residential],
        _ => &[],
    }
}

/// Decays traffic density and sends one trip from every developed zone.
///
/// Zones are visited in row-major order of their centers and every random
/// choice is drawn from `rng`, so a given seed always yields the same density.
pub fn simulate_traffic(
    map: &TileMap,
    registry: &TileRegistry,
    traffic: &mut Layer<u8>,
    trips: &mut TripReport,
    rng: &mut CityRng,
    config: &TrafficConfig,
) {
    let decay = u16::from(config.decay_percent.min(100));
    traffic.update(|density| {
        let density = u16::from(density);
        (density - density * decay / 100) as u8
    });
    trips.clear();

    for center in map.zone_centers() {
        let Some(spec) = registry.get(map.tile_id(center)) else {
            continue;
        };
        let Some(kind) = spec.zone.filter(|kind| kind.is_growable()) else {
            continue;
        };
        if spec.level == 0 {
            continue;
        }
        let Some(footprint) = registry.zone_footprint(center, spec.id) else {
            continue;
        };

        let entrances: Vec<CityLocation> = footprint
            .perimeter()
            .filter(|location| is_travel_tile(registry, map.tile_id(*location)))
            .collect();
        let Some(start) = rng.pick(&entrances) else {
            trips.record(center, TripOutcome::NoRoad);
            continue;
        };

        let walk = Walk {
            map,
            registry,
            origin: center,
            wanted: destinations(kind),
        };
        match walk.run(start, config.max_steps, rng) {
            Some(path) => {
                for location in path {
                    let density = traffic.get(location).saturating_add(config.trip_density);
                    traffic.set(location, density.min(MAX_DENSITY));
                }
                trips.record(center, TripOutcome::Reached);
            }
            None => trips.record(center, TripOutcome::NoDestination),
        }
    }
}

struct Walk<'a> {
    map: &'a TileMap,
    registry: &'a TileRegistry,
    origin: CityLocation,
    wanted: &'static [ZoneKind],
}

impl Walk<'_> {
    fn run(&self, start: CityLocation, max_steps: u32, rng: &mut CityRng) -> Option<Vec<CityLocation>> {
        let mut path = vec![start];
        let mut previous: Option<CityLocation> = None;
        let mut current = start;

        for _ in 0..=max_steps {
            if self.touches_destination(current) {
                return Some(path);
            }
            let options: Vec<CityLocation> = current
                .neighbors4()
                .into_iter()
                .filter(|next| Some(*next) != previous)
                .filter(|next| is_travel_tile(self.registry, self.map.tile_id(*next)))
                .collect();
            let next = rng.pick(&options)?;
            previous = Some(current);
            current = next;
            path.push(next);
        }
        None
    }

    fn touches_destination(&self, location: CityLocation) -> bool {
        location.neighbors4().into_iter().any(|neighbor| {
            self.map
                .zone_center_of(neighbor, self.registry)
                .filter(|center| *center != self.origin)
                .and_then(|center| self.registry.zone_kind(self.map.tile_id(center)))
                .is_some_and(|kind| self.wanted.contains(&kind))
        })
    }
}
