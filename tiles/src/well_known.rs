//! Tiles the simulation refers to by id.

use citysim_core::TileId;

use crate::{spec::Category, RegistryError, TileRegistry};

/// Open water.
pub const RIVER: TileId = TileId::new(1);
/// Shoreline; bulldozing it leaves open water.
pub const RIVER_EDGE: TileId = TileId::new(2);
/// First of the forest variants.
pub const TREE_BASE: TileId = TileId::new(3);
/// First of the rubble variants.
pub const RUBBLE_BASE: TileId = TileId::new(7);
/// First of the flood water variants.
pub const FLOOD_BASE: TileId = TileId::new(11);
/// Contaminated land.
pub const RADIOACTIVE: TileId = TileId::new(15);
/// First of the burning variants.
pub const FIRE_BASE: TileId = TileId::new(16);
/// First frame of the short explosion animation.
pub const TINY_EXP_BASE: TileId = TileId::new(20);
/// First of the park variants.
pub const PARK_BASE: TileId = TileId::new(322);

/// Number of forest variants.
pub const TREE_VARIANTS: u16 = 4;
/// Number of rubble variants.
pub const RUBBLE_VARIANTS: u16 = 4;
/// Number of flood variants.
pub const FLOOD_VARIANTS: u16 = 4;
/// Number of burning variants.
pub const FIRE_VARIANTS: u16 = 4;
/// Number of explosion animation frames.
pub const TINY_EXP_FRAMES: u16 = 8;
/// Number of park variants.
pub const PARK_VARIANTS: u16 = 4;

const EXPECTED: [(TileId, u16, Category, &str); 9] = [
    (TileId::DIRT, 1, Category::Dirt, "dirt"),
    (RIVER, 2, Category::Water, "water"),
    (TREE_BASE, TREE_VARIANTS, Category::Trees, "trees"),
    (RUBBLE_BASE, RUBBLE_VARIANTS, Category::Rubble, "rubble"),
    (FLOOD_BASE, FLOOD_VARIANTS, Category::Flood, "flood"),
    (RADIOACTIVE, 1, Category::Radioactive, "radioactive"),
    (FIRE_BASE, FIRE_VARIANTS, Category::Fire, "fire"),
    (TINY_EXP_BASE, TINY_EXP_FRAMES, Category::Explosion, "explosion"),
    (PARK_BASE, PARK_VARIANTS, Category::Park, "park"),
];

pub(crate) fn validate(registry: &TileRegistry) -> Result<(), RegistryError> {
    for (base, count, category, expected) in EXPECTED {
        for delta in 0..count {
            let id = base.offset(delta);
            if registry.category(id) != Some(category) {
                return Err(RegistryError::BadWellKnownTile {
                    id: id.get(),
                    expected,
                });
            }
        }
    }
    Ok(())
}
