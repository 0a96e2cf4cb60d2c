#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Zone evaluator: census, demand, zone growth and the city budget.

mod budget;
mod census;
mod growth;

use citysim_core::Event;
use citysim_tiles::TileRegistry;
use citysim_world::TickContext;
use tracing::debug;

pub use budget::{evaluate, net_income, Budget, BudgetConfig};
pub use census::{announce_milestones, compute_demand, take_census, POPULATION_MILESTONES};
pub use growth::{grow_zones, GrowthInputs, ZoneChange, ZoningConfig};

/// System that scores every zone once per tick and grows or shrinks it.
#[derive(Debug, Default)]
pub struct ZoneEvaluator {
    config: ZoningConfig,
}

impl ZoneEvaluator {
    /// Creates the evaluator with the provided tunables.
    #[must_use]
    pub fn new(config: ZoningConfig) -> Self {
        Self { config }
    }

    /// Takes the census, refreshes demand, then applies growth and decline.
    ///
    /// Scores read the derived maps left by the previous propagation pass.
    pub fn run(&mut self, ctx: &mut TickContext<'_>, registry: &TileRegistry, out: &mut Vec<Event>) {
        let census = take_census(ctx.map, registry);
        if census != *ctx.census {
            announce_milestones(
                ctx.census.total_population(),
                census.total_population(),
                out,
            );
            *ctx.census = census;
            out.push(Event::CensusChanged { census });
        }

        let demand = compute_demand(&census);
        if demand != *ctx.demand {
            *ctx.demand = demand;
            out.push(Event::DemandChanged { demand });
        }

        let changes = grow_zones(
            ctx.map,
            registry,
            ctx.rng,
            GrowthInputs {
                maps: &*ctx.maps,
                trips: &*ctx.trips,
                demand,
            },
            &self.config,
        );
        debug!(cycle = ctx.cycle, changes = changes.len(), "zones evaluated");
    }
}
