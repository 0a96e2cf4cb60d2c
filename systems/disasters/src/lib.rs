#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Disaster controller and the ongoing hazards that follow disasters.
//!
//! One-shot disasters either spawn a sprite or edit the map directly. The
//! hazards pass keeps fires, floods, radiation and tile animation going from
//! tick to tick.

mod hazards;

use citysim_core::{CityLocation, CityMessage, CitySound, DisasterKind, Event, ZoneKind};
use citysim_system_sprites::{start_fire, Sprite, SpriteManager};
use citysim_tiles::{
    well_known::{RADIOACTIVE, RUBBLE_BASE, RUBBLE_VARIANTS},
    Category, TileRegistry,
};
use citysim_world::{edit::random_location, TickContext};
use serde::Deserialize;
use tracing::{debug, info};

pub use hazards::{
    animate_tiles, burn_out_rate, decay_radiation, flood_tile, is_floodable, spread_fire,
    update_flood,
};

/// Ticks flood water keeps rising after a flood starts.
pub const FLOOD_DURATION: u32 = 30;

const MELTDOWN_FALLOUT: u32 = 40;
const MELTDOWN_RADIUS: i32 = 8;

/// Tunables for disasters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisasterConfig {
    /// One-in-this chance per tick of a random disaster, when enabled.
    pub random_chance: u32,
    /// Fewest tiles an earthquake shakes.
    pub earthquake_min: i32,
    /// Most tiles an earthquake shakes.
    pub earthquake_max: i32,
}

impl Default for DisasterConfig {
    fn default() -> Self {
        Self {
            random_chance: 2_000,
            earthquake_min: 300,
            earthquake_max: 1_000,
        }
    }
}

/// Triggers disasters and runs the hazards they leave behind.
#[derive(Debug, Default)]
pub struct Disasters {
    config: DisasterConfig,
    flood_timer: u32,
}

impl Disasters {
    /// Creates the controller with the provided tunables.
    #[must_use]
    pub fn new(config: DisasterConfig) -> Self {
        Self {
            config,
            flood_timer: 0,
        }
    }

    /// Ticks of rising water left.
    #[must_use]
    pub fn flood_timer(&self) -> u32 {
        self.flood_timer
    }

    /// Forgets any flood in progress.
    pub fn reset(&mut self) {
        self.flood_timer = 0;
    }

    /// Triggers a disaster at `location`, or somewhere chosen with the city RNG.
    ///
    /// Returns whether anything happened.
    pub fn trigger(
        &mut self,
        kind: DisasterKind,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        sprites: &mut SpriteManager,
        out: &mut Vec<Event>,
    ) -> bool {
        let triggered = match kind {
            DisasterKind::Fire => self.fire(location, ctx, registry, out),
            DisasterKind::Flood => self.flood(location, ctx, registry, out),
            DisasterKind::Earthquake => self.earthquake(ctx, registry, out),
            DisasterKind::Monster => self.monster(location, ctx, sprites, out),
            DisasterKind::Meltdown => self.meltdown(location, ctx, registry, sprites, out),
            DisasterKind::Tornado => self.tornado(location, ctx, sprites, out),
        };
        debug!(?kind, triggered, "disaster requested");
        triggered
    }

    /// Sets a single tile on fire.
    pub fn fire(
        &mut self,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        out: &mut Vec<Event>,
    ) -> bool {
        let target = location.unwrap_or_else(|| random_location(ctx.map, ctx.rng));
        if !start_fire(ctx.map, registry, ctx.rng, target) {
            return false;
        }
        report(out, CityMessage::FireReported, target, Some(CitySound::Sirens));
        true
    }

    /// Floods the land around a river tile.
    ///
    /// Without a location, a river tile is searched for at random. The water
    /// keeps spreading for [`FLOOD_DURATION`] ticks and then drains.
    pub fn flood(
        &mut self,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        out: &mut Vec<Event>,
    ) -> bool {
        let source = match location {
            Some(location) => Some(location),
            None => {
                let cells = ctx.map.width() as usize * ctx.map.height() as usize;
                (0..cells.min(300)).find_map(|_| {
                    let candidate = random_location(ctx.map, ctx.rng);
                    (registry.category(ctx.map.tile_id(candidate)) == Some(Category::Water))
                        .then_some(candidate)
                })
            }
        };
        let Some(source) = source else {
            return false;
        };

        let mut flooded = false;
        for next in source.neighbors4() {
            if is_floodable(registry, ctx.map.tile_id(next)) {
                flood_tile(ctx.map, registry, ctx.rng, next);
                flooded = true;
            }
        }
        if flooded {
            self.flood_timer = FLOOD_DURATION;
            report(out, CityMessage::FloodReported, source, None);
        }
        flooded
    }

    /// Shakes a random number of tiles across the whole map.
    ///
    /// Shaken buildings and networks collapse into rubble or catch fire.
    /// Zone centers survive so damaged buildings can be rebuilt in place.
    pub fn earthquake(
        &mut self,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        out: &mut Vec<Event>,
    ) -> bool {
        let strength = ctx
            .rng
            .range(self.config.earthquake_min, self.config.earthquake_max);
        let epicenter = random_location(ctx.map, ctx.rng);
        for _ in 0..strength.max(0) {
            let target = random_location(ctx.map, ctx.rng);
            let Some(cell) = ctx.map.tile(target) else {
                continue;
            };
            let vulnerable = registry.is_combustible(cell.id()) || registry.is_dozeable(cell.id());
            if cell.is_zone_center() || registry.is_overwater(cell.id()) || !vulnerable {
                continue;
            }
            if ctx.rng.chance(4) {
                let _ = start_fire(ctx.map, registry, ctx.rng, target);
            } else {
                let variant = ctx.rng.below(u32::from(RUBBLE_VARIANTS)) as u16;
                ctx.map
                    .set_tile(target, registry.cell_for(RUBBLE_BASE.offset(variant)));
            }
        }
        info!(strength, "earthquake");
        report(
            out,
            CityMessage::EarthquakeReported,
            epicenter,
            Some(CitySound::ExplosionBoth),
        );
        true
    }

    /// Releases a monster.
    pub fn monster(
        &mut self,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        sprites: &mut SpriteManager,
        out: &mut Vec<Event>,
    ) -> bool {
        let target = location.unwrap_or_else(|| random_location(ctx.map, ctx.rng));
        if !ctx.map.test_bounds(target) {
            return false;
        }
        sprites.spawn(Sprite::monster(target));
        report(
            out,
            CityMessage::MonsterSighted,
            target,
            Some(CitySound::MonsterRoar),
        );
        true
    }

    /// Releases a tornado.
    pub fn tornado(
        &mut self,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        sprites: &mut SpriteManager,
        out: &mut Vec<Event>,
    ) -> bool {
        let target = location.unwrap_or_else(|| random_location(ctx.map, ctx.rng));
        if !ctx.map.test_bounds(target) {
            return false;
        }
        sprites.spawn(Sprite::tornado(target));
        report(out, CityMessage::TornadoSighted, target, None);
        true
    }

    /// Melts down a nuclear plant.
    ///
    /// With a location, the plant covering it melts down; otherwise one is
    /// chosen at random. The plant turns radioactive, explodes, and fallout
    /// lands on the open ground around it.
    pub fn meltdown(
        &mut self,
        location: Option<CityLocation>,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        sprites: &mut SpriteManager,
        out: &mut Vec<Event>,
    ) -> bool {
        let is_reactor = |id| registry.zone_kind(id) == Some(ZoneKind::NuclearPower);
        let center = match location {
            Some(location) => ctx
                .map
                .zone_center_of(location, registry)
                .filter(|center| is_reactor(ctx.map.tile_id(*center))),
            None => {
                let reactors: Vec<CityLocation> = ctx
                    .map
                    .zone_centers()
                    .into_iter()
                    .filter(|center| is_reactor(ctx.map.tile_id(*center)))
                    .collect();
                ctx.rng.pick(&reactors)
            }
        };
        let Some(center) = center else {
            return false;
        };
        let Some(footprint) = registry.zone_footprint(center, ctx.map.tile_id(center)) else {
            return false;
        };

        for location in footprint.locations() {
            ctx.map.set_tile(location, registry.cell_for(RADIOACTIVE));
        }
        for _ in 0..MELTDOWN_FALLOUT {
            let target = center.offset(
                ctx.rng.range(-MELTDOWN_RADIUS, MELTDOWN_RADIUS),
                ctx.rng.range(-MELTDOWN_RADIUS, MELTDOWN_RADIUS),
            );
            if is_floodable(registry, ctx.map.tile_id(target)) {
                ctx.map.set_tile(target, registry.cell_for(RADIOACTIVE));
            }
        }
        sprites.spawn(Sprite::explosion(center));
        info!(x = center.x(), y = center.y(), "nuclear meltdown");
        report(
            out,
            CityMessage::NuclearMeltdown,
            center,
            Some(CitySound::ExplosionBoth),
        );
        true
    }

    /// Advances fires, floods, radiation and tile animation by one tick.
    pub fn update_hazards(&mut self, ctx: &mut TickContext<'_>, registry: &TileRegistry) {
        let lost = spread_fire(ctx.map, registry, ctx.rng, &ctx.maps.fire);
        let rising = self.flood_timer > 0;
        update_flood(ctx.map, registry, ctx.rng, rising);
        self.flood_timer = self.flood_timer.saturating_sub(1);
        decay_radiation(ctx.map, registry, ctx.rng);
        animate_tiles(ctx.map, registry);
        if lost > 0 {
            debug!(cycle = ctx.cycle, lost, "buildings burned down");
        }
    }

    /// Rolls for a random disaster when disasters are enabled.
    pub fn random_disaster(
        &mut self,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        sprites: &mut SpriteManager,
        out: &mut Vec<Event>,
    ) -> bool {
        if !ctx.options.disasters || !ctx.rng.chance(self.config.random_chance) {
            return false;
        }
        let Some(kind) = ctx.rng.pick(&DisasterKind::ALL) else {
            return false;
        };
        self.trigger(kind, None, ctx, registry, sprites, out)
    }
}

fn report(out: &mut Vec<Event>, message: CityMessage, location: CityLocation, sound: Option<CitySound>) {
    out.push(Event::CityMessage {
        message,
        location: Some(location),
    });
    if let Some(sound) = sound {
        out.push(Event::CitySound { sound, location });
    }
}
