//! Raw tile cell values and tile identifiers.

use serde::{Deserialize, Serialize};

/// Identifier of a registered tile type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u16);

impl TileId {
    /// Bare dirt; the clear, empty land every new map starts with.
    pub const DIRT: TileId = TileId(0);

    /// Sentinel returned for reads outside the map. Never stored in a cell.
    pub const CLEAR: TileId = TileId(u16::MAX);

    /// Creates a tile identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Identifier as an index into dense registry tables.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the identifier `delta` positions after this one.
    #[must_use]
    pub const fn offset(self, delta: u16) -> Self {
        Self(self.0 + delta)
    }
}

/// Raw value stored in a single map cell: tile id plus orthogonal status bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile(u16);

impl Tile {
    /// Bits holding the tile id.
    pub const ID_MASK: u16 = 0x03FF;
    /// Set while the cell receives power from a plant.
    pub const POWERED: u16 = 0x8000;
    /// Set when the cell carries power to its neighbours.
    pub const CONDUCTIVE: u16 = 0x4000;
    /// Set when the cell advances through an animation sequence every step.
    pub const ANIMATED: u16 = 0x0800;
    /// Set on the anchor cell of a multi-tile building.
    pub const ZONE_CENTER: u16 = 0x0400;

    /// Wraps a raw cell value exactly as stored.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Creates a cell holding `id` with no status bits.
    #[must_use]
    pub const fn from_id(id: TileId) -> Self {
        Self(id.get() & Self::ID_MASK)
    }

    /// Raw cell value including status bits.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Tile type stored in the cell.
    #[must_use]
    pub const fn id(&self) -> TileId {
        TileId::new(self.0 & Self::ID_MASK)
    }

    /// Reports whether the cell currently receives power.
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.0 & Self::POWERED != 0
    }

    /// Reports whether the cell conducts power.
    #[must_use]
    pub const fn is_conductive(&self) -> bool {
        self.0 & Self::CONDUCTIVE != 0
    }

    /// Reports whether the cell animates on its own.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.0 & Self::ANIMATED != 0
    }

    /// Reports whether the cell anchors a multi-tile building.
    #[must_use]
    pub const fn is_zone_center(&self) -> bool {
        self.0 & Self::ZONE_CENTER != 0
    }

    /// Returns the cell with the provided status bits set.
    #[must_use]
    pub const fn with_flags(self, flags: u16) -> Self {
        Self(self.0 | (flags & !Self::ID_MASK))
    }

    /// Returns the cell with the power bit set or cleared.
    #[must_use]
    pub const fn with_power(self, powered: bool) -> Self {
        if powered {
            Self(self.0 | Self::POWERED)
        } else {
            Self(self.0 & !Self::POWERED)
        }
    }
}
