#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sprite manager: explosions, monsters and tornadoes moving over the map.
//!
//! Each sprite is a small state machine advanced once per tick. Sprites only
//! talk to the rest of the city through the tile map and the event queue.

mod damage;

use citysim_core::{
    CityLocation, CityMessage, CitySound, Event, SpriteKind, TILE_PIXELS,
};
use citysim_tiles::TileRegistry;
use citysim_world::{edit::random_location, TickContext};
use tracing::debug;

pub use damage::{destroy_tile, start_fire};

/// Ticks a monster stays on the map.
pub const MONSTER_LIFETIME: u32 = 200;
/// Ticks a tornado stays on the map.
pub const TORNADO_LIFETIME: u32 = 120;

const EXPLOSION_LAST_FRAME: u8 = 6;
const TORNADO_FRAMES: u8 = 3;
const MONSTER_ROAR_PERIOD: u32 = 50;

/// Mobile entity drawn over the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    /// Behaviour of the sprite.
    pub kind: SpriteKind,
    /// Horizontal position in pixels.
    pub x: i32,
    /// Vertical position in pixels.
    pub y: i32,
    /// Animation frame; zero once the sprite is finished.
    pub frame: u8,
    /// Ticks left before the sprite leaves on its own.
    pub lifetime: u32,
    /// Tile the sprite is heading for.
    pub destination: Option<CityLocation>,
}

impl Sprite {
    fn at(kind: SpriteKind, location: CityLocation, lifetime: u32) -> Self {
        Self {
            kind,
            x: location.x() * TILE_PIXELS,
            y: location.y() * TILE_PIXELS,
            frame: 1,
            lifetime,
            destination: None,
        }
    }

    /// Explosion centered on the tile.
    #[must_use]
    pub fn explosion(location: CityLocation) -> Self {
        Self::at(SpriteKind::Explosion, location, 0)
    }

    /// Monster standing on the tile.
    #[must_use]
    pub fn monster(location: CityLocation) -> Self {
        Self::at(SpriteKind::Monster, location, MONSTER_LIFETIME)
    }

    /// Tornado touching down on the tile.
    #[must_use]
    pub fn tornado(location: CityLocation) -> Self {
        Self::at(SpriteKind::Tornado, location, TORNADO_LIFETIME)
    }

    /// Tile under the sprite.
    #[must_use]
    pub fn location(&self) -> CityLocation {
        CityLocation::new(
            self.x.div_euclid(TILE_PIXELS),
            self.y.div_euclid(TILE_PIXELS),
        )
    }

    /// Reports whether the sprite has finished and will be removed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.frame == 0
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx * TILE_PIXELS;
        self.y += dy * TILE_PIXELS;
    }
}

/// Owns the live sprites and advances them once per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteManager {
    sprites: Vec<Sprite>,
}

impl SpriteManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sprite; it moves for the first time on the next pass.
    pub fn spawn(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    /// Live sprites in spawn order.
    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Reports whether a sprite of the kind is on the map.
    #[must_use]
    pub fn contains(&self, kind: SpriteKind) -> bool {
        self.sprites.iter().any(|sprite| sprite.kind == kind)
    }

    /// Removes every sprite.
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    /// Advances every sprite by one tick.
    ///
    /// Sprites created during the pass join the list afterwards and finished
    /// sprites are dropped at the end of the pass.
    pub fn advance_all(
        &mut self,
        ctx: &mut TickContext<'_>,
        registry: &TileRegistry,
        out: &mut Vec<Event>,
    ) {
        let mut spawned = Vec::new();
        for sprite in &mut self.sprites {
            match sprite.kind {
                SpriteKind::Explosion => advance_explosion(sprite, ctx, registry, out),
                SpriteKind::Monster => advance_monster(sprite, ctx, registry, &mut spawned, out),
                SpriteKind::Tornado => advance_tornado(sprite, ctx, registry, &mut spawned),
            }
        }
        let before = self.sprites.len();
        self.sprites.retain(|sprite| !sprite.is_terminal());
        let finished = before - self.sprites.len();
        if finished > 0 || !spawned.is_empty() {
            debug!(
                cycle = ctx.cycle,
                finished,
                spawned = spawned.len(),
                "sprites updated"
            );
        }
        self.sprites.extend(spawned);
    }
}

fn advance_explosion(
    sprite: &mut Sprite,
    ctx: &mut TickContext<'_>,
    registry: &TileRegistry,
    out: &mut Vec<Event>,
) {
    let location = sprite.location();
    if ctx.cycle % 2 == 0 {
        if sprite.frame == 1 {
            out.push(Event::CitySound {
                sound: CitySound::ExplosionHigh,
                location,
            });
            out.push(Event::CityMessage {
                message: CityMessage::ExplosionReport,
                location: Some(location),
            });
        }
        sprite.frame += 1;
    }

    if sprite.frame > EXPLOSION_LAST_FRAME {
        sprite.frame = 0;
        let _ = start_fire(ctx.map, registry, ctx.rng, location);
        for corner in location.diagonals() {
            let _ = start_fire(ctx.map, registry, ctx.rng, corner);
        }
    }
}

fn advance_monster(
    sprite: &mut Sprite,
    ctx: &mut TickContext<'_>,
    registry: &TileRegistry,
    spawned: &mut Vec<Sprite>,
    out: &mut Vec<Event>,
) {
    let here = sprite.location();
    let target = match sprite.destination {
        Some(target) if target != here => target,
        _ => {
            let target = random_location(ctx.map, ctx.rng);
            sprite.destination = Some(target);
            target
        }
    };
    sprite.move_by(
        (target.x() - here.x()).signum(),
        (target.y() - here.y()).signum(),
    );
    sprite.frame = sprite.frame % 4 + 1;
    sprite.lifetime = sprite.lifetime.saturating_sub(1);

    let location = sprite.location();
    if !ctx.map.test_bounds(location) || sprite.lifetime == 0 {
        sprite.frame = 0;
        return;
    }
    let _ = destroy_tile(ctx.map, registry, ctx.rng, location, spawned);
    if sprite.lifetime % MONSTER_ROAR_PERIOD == 0 {
        out.push(Event::CitySound {
            sound: CitySound::MonsterRoar,
            location,
        });
    }
}

fn advance_tornado(
    sprite: &mut Sprite,
    ctx: &mut TickContext<'_>,
    registry: &TileRegistry,
    spawned: &mut Vec<Sprite>,
) {
    let dx = ctx.rng.range(-1, 1);
    let dy = ctx.rng.range(-1, 1);
    sprite.move_by(dx, dy);
    sprite.frame = sprite.frame % TORNADO_FRAMES + 1;
    sprite.lifetime = sprite.lifetime.saturating_sub(1);

    let location = sprite.location();
    if !ctx.map.test_bounds(location) || sprite.lifetime == 0 {
        sprite.frame = 0;
        return;
    }
    let _ = destroy_tile(ctx.map, registry, ctx.rng, location, spawned);
}
