#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the city simulation engine.
//!
//! This crate defines the message surface that connects the host adapter, the
//! authoritative world, and the simulation systems. Hosts submit [`Command`]
//! values describing desired mutations, the engine executes those commands
//! against the world and its systems, and then broadcasts [`Event`] values so
//! listeners can react. Systems read the world through its query surface and
//! write to the tile map only while the engine lends it to them.

mod geometry;
mod tile;
mod tool;

pub use geometry::{CityLocation, CityRect};
pub use tile::{Tile, TileId};
pub use tool::{ToolKind, ToolResult};

use serde::{Deserialize, Serialize};

/// Number of pixels along the edge of a single tile.
pub const TILE_PIXELS: i32 = 16;

/// Commands that express all permissible host-driven mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one discrete tick.
    Step,
    /// Applies a tool anchored at a single tile.
    ApplyTool {
        /// Tool to apply.
        tool: ToolKind,
        /// Anchor tile of the application.
        location: CityLocation,
    },
    /// Applies a line tool along a drag from `from` to `to`.
    DragTool {
        /// Tool to apply.
        tool: ToolKind,
        /// Tile where the drag started.
        from: CityLocation,
        /// Tile where the drag ended.
        to: CityLocation,
    },
    /// Triggers a disaster at a chosen or random location.
    TriggerDisaster {
        /// Disaster to trigger.
        kind: DisasterKind,
        /// Explicit target; `None` lets the engine pick one with the city RNG.
        location: Option<CityLocation>,
    },
    /// Replaces the gameplay options.
    SetOptions {
        /// Options that become active.
        options: CityOptions,
    },
    /// Overwrites the treasury balance.
    SetFunds {
        /// New balance.
        funds: i64,
    },
}

/// Events broadcast to listeners after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A message the host should show to the player.
    CityMessage {
        /// Message to display.
        message: CityMessage,
        /// Tile the message refers to, if any.
        location: Option<CityLocation>,
    },
    /// A sound the host should play.
    CitySound {
        /// Sound to play.
        sound: CitySound,
        /// Tile the sound originates from.
        location: CityLocation,
    },
    /// Population or building counts changed.
    CensusChanged {
        /// Census after the change.
        census: Census,
    },
    /// Growth demand for one or more zone kinds changed.
    DemandChanged {
        /// Demand after the change.
        demand: Demand,
    },
    /// The treasury balance changed.
    FundsChanged {
        /// Balance after the change.
        funds: i64,
    },
    /// The periodic city evaluation was recomputed.
    EvaluationChanged {
        /// Evaluation after the recomputation.
        evaluation: Evaluation,
    },
    /// Gameplay options changed.
    OptionsChanged {
        /// Options after the change.
        options: CityOptions,
    },
    /// A tool application finished.
    ToolApplied {
        /// Tool that was applied.
        tool: ToolKind,
        /// Rectangle the application covered.
        area: CityRect,
        /// Outcome reported to the caller.
        result: ToolResult,
    },
}

/// Building families anchored by a zone-center tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Housing.
    Residential,
    /// Shops and offices.
    Commercial,
    /// Factories.
    Industrial,
    /// Fire station.
    FireStation,
    /// Police station.
    PoliceStation,
    /// Coal power plant.
    CoalPower,
    /// Nuclear power plant.
    NuclearPower,
    /// Stadium.
    Stadium,
    /// Seaport.
    Seaport,
    /// Airport.
    Airport,
}

impl ZoneKind {
    /// Every zone kind in declaration order.
    pub const ALL: [ZoneKind; 10] = [
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

    /// Name used by the tile resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
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

    /// Resolves a zone kind from its resource name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Reports whether the zone grows and declines on its own.
    #[must_use]
    pub const fn is_growable(self) -> bool {
        matches!(self, Self::Residential | Self::Commercial | Self::Industrial)
    }

    /// Reports whether the zone feeds the power grid.
    #[must_use]
    pub const fn is_power_plant(self) -> bool {
        matches!(self, Self::CoalPower | Self::NuclearPower)
    }

    /// Evaluation precedence; lower values are considered first.
    ///
    /// Residential precedes commercial, which precedes industrial, so that a
    /// given seed always grows the same zones.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Residential => 0,
            Self::Commercial => 1,
            Self::Industrial => 2,
            _ => 3,
        }
    }
}

/// Transport and utility networks drawn tile by tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Network {
    /// Roads.
    Road,
    /// Power lines.
    Wire,
    /// Railway.
    Rail,
}

impl Network {
    /// Every network in declaration order.
    pub const ALL: [Network; 3] = [Self::Road, Self::Wire, Self::Rail];

    /// Name used by the tile resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Wire => "wire",
            Self::Rail => "rail",
        }
    }
}

/// Disasters the host or the simulation can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisasterKind {
    /// Ignites a single tile.
    Fire,
    /// Seeds flood water next to a river.
    Flood,
    /// Scatters damage across the whole map.
    Earthquake,
    /// Releases a monster sprite.
    Monster,
    /// Melts down a nuclear power plant.
    Meltdown,
    /// Releases a tornado sprite.
    Tornado,
}

impl DisasterKind {
    /// Every disaster in declaration order.
    pub const ALL: [DisasterKind; 6] = [
        Self::Fire,
        Self::Flood,
        Self::Earthquake,
        Self::Monster,
        Self::Meltdown,
        Self::Tornado,
    ];
}

/// Mobile entity kinds managed by the sprite system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// Short-lived blast that ignites its surroundings when it ends.
    Explosion,
    /// Wandering monster that wrecks whatever it walks over.
    Monster,
    /// Erratic tornado that wrecks whatever it passes over.
    Tornado,
}

/// Sounds emitted for the host to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CitySound {
    /// Small demolition or explosion.
    ExplosionHigh,
    /// Medium demolition.
    ExplosionLow,
    /// Large demolition.
    ExplosionBoth,
    /// Bulldozer clearing a single tile.
    Bulldozer,
    /// A building was placed.
    Build,
    /// Emergency sirens.
    Sirens,
    /// Monster roar.
    MonsterRoar,
}

/// Messages emitted for the host to display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CityMessage {
    /// An explosion went off.
    ExplosionReport,
    /// A fire broke out.
    FireReported,
    /// Flooding started.
    FloodReported,
    /// An earthquake struck.
    EarthquakeReported,
    /// A monster appeared.
    MonsterSighted,
    /// A tornado appeared.
    TornadoSighted,
    /// A nuclear plant melted down.
    NuclearMeltdown,
    /// Many zones lack power.
    NeedElectricity,
    /// Roads are congested.
    HighTraffic,
    /// Pollution is high.
    HighPollution,
    /// Crime is high.
    HighCrime,
    /// Total population crossed a milestone.
    PopulationMilestone {
        /// Milestone that was crossed.
        population: u32,
    },
}

/// Population and building counts gathered by the zone evaluator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Census {
    /// Residents housed in residential zones.
    pub residential_population: u32,
    /// Jobs offered by commercial zones.
    pub commercial_jobs: u32,
    /// Jobs offered by industrial zones.
    pub industrial_jobs: u32,
    /// Residential zone centers.
    pub residential_zones: u32,
    /// Commercial zone centers.
    pub commercial_zones: u32,
    /// Industrial zone centers.
    pub industrial_zones: u32,
    /// Zone centers receiving power.
    pub powered_zones: u32,
    /// Zone centers without power.
    pub unpowered_zones: u32,
    /// Fire stations.
    pub fire_stations: u32,
    /// Police stations.
    pub police_stations: u32,
    /// Coal and nuclear plants.
    pub power_plants: u32,
    /// Road tiles, bridges and crossings included.
    pub road_tiles: u32,
    /// Rail tiles, crossings included.
    pub rail_tiles: u32,
    /// Burning tiles.
    pub fires: u32,
}

impl Census {
    /// Residents plus jobs, the figure used for milestones and taxes.
    #[must_use]
    pub const fn total_population(&self) -> u32 {
        self.residential_population + self.commercial_jobs + self.industrial_jobs
    }
}

/// Growth demand per zone family; positive values attract development.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Demand {
    /// Residential demand valve.
    pub residential: i16,
    /// Commercial demand valve.
    pub commercial: i16,
    /// Industrial demand valve.
    pub industrial: i16,
}

impl Demand {
    /// Demand valve for a growable zone kind; zero for service buildings.
    #[must_use]
    pub const fn for_zone(&self, kind: ZoneKind) -> i16 {
        match kind {
            ZoneKind::Residential => self.residential,
            ZoneKind::Commercial => self.commercial,
            ZoneKind::Industrial => self.industrial,
            _ => 0,
        }
    }
}

/// Periodic assessment of the city.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Evaluation {
    /// Overall score between 0 and 1000.
    pub score: u16,
    /// Mean crime over developed tiles, 0 to 255.
    pub average_crime: u8,
    /// Mean pollution over developed tiles, 0 to 255.
    pub average_pollution: u8,
    /// Mean traffic density over road tiles, 0 to 255.
    pub average_traffic: u8,
}

/// Gameplay options the host may toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CityOptions {
    /// Building tools clear dozeable tiles in their footprint for a small fee.
    pub auto_bulldoze: bool,
    /// Disasters may strike at random.
    pub disasters: bool,
}

impl Default for CityOptions {
    fn default() -> Self {
        Self {
            auto_bulldoze: true,
            disasters: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CityLocation, CityOptions, Demand, ToolKind, ZoneKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn location_and_options_round_trip_through_bincode() {
        assert_round_trip(&CityLocation::new(-3, 17));
        assert_round_trip(&CityOptions {
            auto_bulldoze: false,
            disasters: true,
        });
        assert_round_trip(&ToolKind::Airport);
    }

    #[test]
    fn zone_precedence_orders_residential_first() {
        let mut kinds = vec![
            ZoneKind::Industrial,
            ZoneKind::Residential,
            ZoneKind::Commercial,
        ];
        kinds.sort_by_key(|kind| kind.precedence());
        assert_eq!(
            kinds,
            vec![
                ZoneKind::Residential,
                ZoneKind::Commercial,
                ZoneKind::Industrial
            ]
        );
    }

    #[test]
    fn demand_for_service_buildings_is_zero() {
        let demand = Demand {
            residential: 40,
            commercial: -5,
            industrial: 12,
        };
        assert_eq!(demand.for_zone(ZoneKind::Commercial), -5);
        assert_eq!(demand.for_zone(ZoneKind::Stadium), 0);
    }

    #[test]
    fn zone_names_resolve_back_to_kinds() {
        for kind in ZoneKind::ALL {
            assert_eq!(ZoneKind::from_name(kind.name()), Some(kind));
        }
    }
}
