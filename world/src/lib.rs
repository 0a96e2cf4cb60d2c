#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative city state: the tile map, derived maps, treasury and clock.
//!
//! The world owns every piece of mutable simulation state. Hosts change it
//! through [`apply`] and read it through [`query`]; simulation systems borrow
//! the parts they need for one phase of a tick through [`World::tick_context`].

pub mod edit;
mod layer;
mod map;
mod rng;
pub mod save;

use std::collections::BTreeMap;

use citysim_core::{CityLocation, CityOptions, Census, Command, Demand, Evaluation, Event};

pub use layer::Layer;
pub use map::TileMap;
pub use rng::{CityRng, RngSnapshot};
pub use save::SaveError;

/// Per-tile maps recomputed by the propagation phase every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedMaps {
    /// Road and rail congestion, 0 to 240.
    pub traffic: Layer<u8>,
    /// Air pollution, 0 to 255.
    pub pollution: Layer<u8>,
    /// Desirability of land, 0 to 255.
    pub land_value: Layer<u8>,
    /// Crime rate, 0 to 255.
    pub crime: Layer<u8>,
    /// Police station coverage, 0 to 255.
    pub police: Layer<u8>,
    /// Fire station coverage, 0 to 255.
    pub fire: Layer<u8>,
}

impl DerivedMaps {
    /// Creates empty maps for a city of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            traffic: Layer::new(width, height),
            pollution: Layer::new(width, height),
            land_value: Layer::new(width, height),
            crime: Layer::new(width, height),
            police: Layer::new(width, height),
            fire: Layer::new(width, height),
        }
    }
}

/// Result of the most recent trip attempted from a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TripOutcome {
    /// The trip reached a suitable destination.
    Reached,
    /// No road or rail touches the zone.
    NoRoad,
    /// The walk ran out of steps or road before finding a destination.
    NoDestination,
}

/// Trip outcomes keyed by zone center, rebuilt on every traffic pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripReport {
    outcomes: BTreeMap<CityLocation, TripOutcome>,
}

impl TripReport {
    /// Forgets every recorded outcome.
    pub fn clear(&mut self) {
        self.outcomes.clear();
    }

    /// Records the outcome of a trip from the zone anchored at `center`.
    pub fn record(&mut self, center: CityLocation, outcome: TripOutcome) {
        let _ = self.outcomes.insert(center, outcome);
    }

    /// Outcome of the last trip from the zone anchored at `center`.
    #[must_use]
    pub fn outcome(&self, center: CityLocation) -> Option<TripOutcome> {
        self.outcomes.get(&center).copied()
    }

    /// Recorded outcomes in row-major order of their zone centers.
    pub fn iter(&self) -> impl Iterator<Item = (CityLocation, TripOutcome)> + '_ {
        self.outcomes.iter().map(|(center, outcome)| (*center, *outcome))
    }
}

/// Mutable borrows of world state lent to the systems for one phase of a tick.
#[derive(Debug)]
pub struct TickContext<'a> {
    /// Tile map shared by every phase.
    pub map: &'a mut TileMap,
    /// Derived per-tile maps.
    pub maps: &'a mut DerivedMaps,
    /// Trip outcomes from the last traffic pass.
    pub trips: &'a mut TripReport,
    /// Shared random source.
    pub rng: &'a mut CityRng,
    /// Treasury balance.
    pub funds: &'a mut i64,
    /// Latest census.
    pub census: &'a mut Census,
    /// Latest demand valves.
    pub demand: &'a mut Demand,
    /// Latest evaluation.
    pub evaluation: &'a mut Evaluation,
    /// Current city time in ticks.
    pub cycle: u32,
    /// Active gameplay options.
    pub options: CityOptions,
}

/// Represents the authoritative city state.
#[derive(Clone, Debug)]
pub struct World {
    map: TileMap,
    maps: DerivedMaps,
    trips: TripReport,
    rng: CityRng,
    funds: i64,
    cycle: u32,
    options: CityOptions,
    census: Census,
    demand: Demand,
    evaluation: Evaluation,
}

impl World {
    /// Creates a city of bare dirt.
    #[must_use]
    pub fn new(width: u32, height: u32, seed: u64, funds: i64) -> Self {
        Self::restore(
            TileMap::new(width, height),
            CityRng::from_seed_u64(seed),
            funds,
            0,
            CityOptions::default(),
        )
    }

    pub(crate) fn restore(
        map: TileMap,
        rng: CityRng,
        funds: i64,
        cycle: u32,
        options: CityOptions,
    ) -> Self {
        let maps = DerivedMaps::new(map.width(), map.height());
        Self {
            map,
            maps,
            trips: TripReport::default(),
            rng,
            funds,
            cycle,
            options,
            census: Census::default(),
            demand: Demand::default(),
            evaluation: Evaluation::default(),
        }
    }

    /// Mutable access to the tile map, for tools and disasters.
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    /// Splits the world into independent mutable borrows for a system phase.
    pub fn tick_context(&mut self) -> TickContext<'_> {
        TickContext {
            map: &mut self.map,
            maps: &mut self.maps,
            trips: &mut self.trips,
            rng: &mut self.rng,
            funds: &mut self.funds,
            census: &mut self.census,
            demand: &mut self.demand,
            evaluation: &mut self.evaluation,
            cycle: self.cycle,
            options: self.options,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Tool and disaster commands are executed by their systems, which borrow the
/// world through [`World::tick_context`]; they leave the world untouched here.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Step => {
            world.cycle = world.cycle.wrapping_add(1);
        }
        Command::SetOptions { options } => {
            if world.options != options {
                world.options = options;
                out_events.push(Event::OptionsChanged { options });
            }
        }
        Command::SetFunds { funds } => {
            if world.funds != funds {
                world.funds = funds;
                out_events.push(Event::FundsChanged { funds });
            }
        }
        Command::ApplyTool { .. } | Command::DragTool { .. } | Command::TriggerDisaster { .. } => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use citysim_core::{
        CityLocation, CityOptions, Census, Demand, Evaluation, Tile, TileId,
    };
    use citysim_tiles::TileRegistry;

    use super::{DerivedMaps, TileMap, TripOutcome, World};

    /// Read-only view of the tile map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Tile id at the location, or [`TileId::CLEAR`] outside the map.
    #[must_use]
    pub fn tile_id(world: &World, location: CityLocation) -> TileId {
        world.map.tile_id(location)
    }

    /// Raw cell at the location.
    #[must_use]
    pub fn tile(world: &World, location: CityLocation) -> Option<Tile> {
        world.map.tile(location)
    }

    /// Current treasury balance.
    #[must_use]
    pub fn funds(world: &World) -> i64 {
        world.funds
    }

    /// Ticks elapsed since the city was founded.
    #[must_use]
    pub fn cycle(world: &World) -> u32 {
        world.cycle
    }

    /// Active gameplay options.
    #[must_use]
    pub fn options(world: &World) -> CityOptions {
        world.options
    }

    /// Latest census.
    #[must_use]
    pub fn census(world: &World) -> Census {
        world.census
    }

    /// Latest demand valves.
    #[must_use]
    pub fn demand(world: &World) -> Demand {
        world.demand
    }

    /// Latest evaluation.
    #[must_use]
    pub fn evaluation(world: &World) -> Evaluation {
        world.evaluation
    }

    /// Every derived per-tile map.
    #[must_use]
    pub fn derived_maps(world: &World) -> &DerivedMaps {
        &world.maps
    }

    /// Traffic density at the location.
    #[must_use]
    pub fn traffic_density(world: &World, location: CityLocation) -> u8 {
        world.maps.traffic.get(location)
    }

    /// Pollution at the location.
    #[must_use]
    pub fn pollution(world: &World, location: CityLocation) -> u8 {
        world.maps.pollution.get(location)
    }

    /// Land value at the location.
    #[must_use]
    pub fn land_value(world: &World, location: CityLocation) -> u8 {
        world.maps.land_value.get(location)
    }

    /// Crime at the location.
    #[must_use]
    pub fn crime(world: &World, location: CityLocation) -> u8 {
        world.maps.crime.get(location)
    }

    /// Number of powered cells.
    #[must_use]
    pub fn powered_count(world: &World) -> usize {
        world.map.powered_count()
    }

    /// Outcome of the last trip from the zone anchored at `center`.
    #[must_use]
    pub fn trip_outcome(world: &World, center: CityLocation) -> Option<TripOutcome> {
        world.trips.outcome(center)
    }

    /// First cell, in row-major order, whose id has no registry entry.
    #[must_use]
    pub fn first_unregistered_tile(
        world: &World,
        registry: &TileRegistry,
    ) -> Option<(CityLocation, TileId)> {
        world
            .map
            .iter()
            .find(|(_, cell)| !registry.contains(cell.id()))
            .map(|(location, cell)| (location, cell.id()))
    }
}
