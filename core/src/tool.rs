//! Player tool catalogue.

use serde::{Deserialize, Serialize};

use crate::ZoneKind;

/// Player-invocable map editing actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolKind {
    /// Clears rubble, forest and networks, and demolishes whole buildings.
    Bulldozer,
    /// Lays road tiles, bridging rivers where possible.
    Road,
    /// Lays power lines.
    Wire,
    /// Lays rail tiles.
    Rail,
    /// Plants a small park on bare dirt.
    Park,
    /// Zones an empty residential lot.
    Residential,
    /// Zones an empty commercial lot.
    Commercial,
    /// Zones an empty industrial lot.
    Industrial,
    /// Builds a fire station.
    FireStation,
    /// Builds a police station.
    PoliceStation,
    /// Builds a coal power plant.
    CoalPower,
    /// Builds a nuclear power plant.
    NuclearPower,
    /// Builds a stadium.
    Stadium,
    /// Builds a seaport.
    Seaport,
    /// Builds an airport.
    Airport,
}

impl ToolKind {
    /// Every tool in catalogue order.
    pub const ALL: [ToolKind; 15] = [
        Self::Bulldozer,
        Self::Road,
        Self::Wire,
        Self::Rail,
        Self::Park,
        Self::Residential,
        Self::Commercial,
        Self::Industrial,
        Self::FireStation,
        Self::PoliceStation,
        Self::CoalPower,
        Self::NuclearPower,
        Self::Stadium,
        Self::Seaport,
        Self::Airport,
    ];

    /// Stable name hosts use to select the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bulldozer => "bulldozer",
            Self::Road => "road",
            Self::Wire => "wire",
            Self::Rail => "rail",
            Self::Park => "park",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::FireStation => "fire",
            Self::PoliceStation => "police",
            Self::CoalPower => "coal",
            Self::NuclearPower => "nuclear",
            Self::Stadium => "stadium",
            Self::Seaport => "seaport",
            Self::Airport => "airport",
        }
    }

    /// Resolves a tool from its stable name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Edge length of the square footprint the tool affects.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Bulldozer | Self::Road | Self::Wire | Self::Rail | Self::Park => 1,
            Self::Residential
            | Self::Commercial
            | Self::Industrial
            | Self::FireStation
            | Self::PoliceStation => 3,
            Self::CoalPower | Self::NuclearPower | Self::Stadium | Self::Seaport => 4,
            Self::Airport => 6,
        }
    }

    /// Flat cost charged per application (per cell for line tools).
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::Bulldozer => 1,
            Self::Road => 10,
            Self::Wire => 5,
            Self::Rail => 20,
            Self::Park => 10,
            Self::Residential | Self::Commercial | Self::Industrial => 100,
            Self::FireStation | Self::PoliceStation => 500,
            Self::CoalPower | Self::Seaport => 3_000,
            Self::NuclearPower | Self::Stadium => 5_000,
            Self::Airport => 10_000,
        }
    }

    /// Building placed by the tool, if it is a building tool.
    #[must_use]
    pub const fn zone(self) -> Option<ZoneKind> {
        match self {
            Self::Residential => Some(ZoneKind::Residential),
            Self::Commercial => Some(ZoneKind::Commercial),
            Self::Industrial => Some(ZoneKind::Industrial),
            Self::FireStation => Some(ZoneKind::FireStation),
            Self::PoliceStation => Some(ZoneKind::PoliceStation),
            Self::CoalPower => Some(ZoneKind::CoalPower),
            Self::NuclearPower => Some(ZoneKind::NuclearPower),
            Self::Stadium => Some(ZoneKind::Stadium),
            Self::Seaport => Some(ZoneKind::Seaport),
            Self::Airport => Some(ZoneKind::Airport),
            Self::Bulldozer | Self::Road | Self::Wire | Self::Rail | Self::Park => None,
        }
    }
}

/// Outcome of a single tool application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolResult {
    /// Every eligible cell was processed.
    Success,
    /// The request was valid but nothing in the footprint was eligible.
    None,
    /// The anchor lies outside the map; nothing was changed.
    UhOh,
    /// Accumulated spend exceeded available funds. Cells processed before the
    /// shortfall keep their new values.
    InsufficientFunds,
}
