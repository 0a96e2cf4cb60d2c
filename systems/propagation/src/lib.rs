#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic propagation pass: power, traffic and the environment maps.
//!
//! Power is a pure function of the tiles. Traffic consumes the shared random
//! source, so the order of the passes inside [`Propagation::run`] is part of
//! the replay contract.

mod environment;
mod power;
mod traffic;

use citysim_tiles::TileRegistry;
use citysim_world::TickContext;
use serde::Deserialize;
use tracing::debug;

pub use environment::{update_environment, SERVICE_RADIUS};
pub use power::propagate_power;
pub use traffic::{destinations, simulate_traffic, TrafficConfig, MAX_DENSITY};

/// Tunables for every propagation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Traffic pass settings.
    pub traffic: TrafficConfig,
}

/// System that refreshes power and the derived maps once per tick.
#[derive(Debug, Default)]
pub struct Propagation {
    config: PropagationConfig,
}

impl Propagation {
    /// Creates the system with the provided tunables.
    #[must_use]
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    /// Runs power, then traffic, then the environment maps.
    pub fn run(&mut self, ctx: &mut TickContext<'_>, registry: &TileRegistry) {
        let powered = propagate_power(ctx.map, registry);
        simulate_traffic(
            ctx.map,
            registry,
            &mut ctx.maps.traffic,
            ctx.trips,
            ctx.rng,
            &self.config.traffic,
        );
        update_environment(ctx.map, registry, ctx.maps);
        debug!(cycle = ctx.cycle, powered, "propagation complete");
    }
}
