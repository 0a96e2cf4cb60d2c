use std::{collections::BTreeMap, path::Path};

use citysim_core::{CityLocation, CityRect, Network, Tile, TileId, ZoneKind};
use tracing::{info, warn};

use crate::{
    parser,
    spec::{Category, TileSpec},
    well_known, RegistryError,
};

const BUNDLED: &str = include_str!("../assets/tiles.rc");

/// Link mask of a straight east-west segment.
pub const HORIZONTAL: u8 = 0b1010;
/// Link mask of a straight north-south segment.
pub const VERTICAL: u8 = 0b0101;

/// Immutable catalogue of tile descriptors, indexed by tile id.
///
/// Built in two passes: every record is parsed into a dense arena first, then a
/// resolution pass assigns each building member its owning anchor and offset.
/// Nothing structural changes after parsing.
#[derive(Clone, Debug)]
pub struct TileRegistry {
    specs: Vec<TileSpec>,
    buildings: BTreeMap<(ZoneKind, u8), TileId>,
    networks: BTreeMap<(Network, u8), TileId>,
    bridges: BTreeMap<u8, TileId>,
}

impl TileRegistry {
    /// Parses the catalogue shipped with the engine.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::load(BUNDLED)
    }

    /// Reads and loads a catalogue from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&text)
    }

    /// Parses a catalogue and checks it provides every tile the simulation uses.
    pub fn load(resource: &str) -> Result<Self, RegistryError> {
        let registry = Self::parse(resource)?;
        well_known::validate(&registry)?;
        Ok(registry)
    }

    /// Parses a catalogue without checking for the simulation's well-known tiles.
    ///
    /// Ids must start at 0 and increase strictly. The catalogue ends at the first
    /// gap in the sequence; any later records are ignored.
    pub fn parse(resource: &str) -> Result<Self, RegistryError> {
        let mut specs: Vec<TileSpec> = Vec::new();
        let mut lines: Vec<usize> = Vec::new();
        let mut previous: Option<u16> = None;

        let mut remaining = resource.lines().enumerate();
        while let Some((index, text)) = remaining.next() {
            let line = index + 1;
            let Some(record) = parser::parse_line(line, text)? else {
                continue;
            };
            match previous {
                None if record.id != 0 => return Err(RegistryError::MissingTileZero),
                Some(previous) if record.id == previous => {
                    return Err(RegistryError::DuplicateId {
                        line,
                        id: record.id,
                    })
                }
                Some(previous) if record.id < previous => {
                    return Err(RegistryError::OutOfOrder {
                        line,
                        id: record.id,
                        previous,
                    })
                }
                Some(previous) if record.id > previous + 1 => {
                    let ignored = 1 + remaining
                        .by_ref()
                        .filter(|(_, text)| {
                            let text = text.trim();
                            !text.is_empty() && !text.starts_with('#')
                        })
                        .count();
                    warn!(
                        line,
                        missing = previous + 1,
                        ignored,
                        "tile ids are not contiguous, ignoring remaining records"
                    );
                    break;
                }
                _ => {}
            }
            if record.id > Tile::ID_MASK {
                return Err(RegistryError::Parse {
                    line,
                    reason: format!("tile id {} does not fit in a map cell", record.id),
                });
            }
            specs.push(TileSpec::from_record(&record)?);
            lines.push(line);
            previous = Some(record.id);
        }

        if specs.is_empty() {
            return Err(RegistryError::MissingTileZero);
        }

        for (spec, &line) in specs.iter().zip(&lines) {
            if let Some(next) = spec.animate {
                if next.index() >= specs.len() {
                    return Err(RegistryError::Parse {
                        line,
                        reason: format!("animates into unknown tile {}", next.get()),
                    });
                }
            }
        }

        resolve_owners(&mut specs)?;
        let registry = Self::index(specs);
        info!(tiles = registry.len(), "tile registry loaded");
        Ok(registry)
    }

    fn index(specs: Vec<TileSpec>) -> Self {
        let mut buildings = BTreeMap::new();
        let mut networks = BTreeMap::new();
        let mut bridges = BTreeMap::new();

        for spec in &specs {
            if let (Some(zone), true) = (spec.zone, spec.is_zone_center()) {
                let _ = buildings.entry((zone, spec.level)).or_insert(spec.id);
            }
            if spec.category == Category::Zone || spec.network_count() != 1 {
                continue;
            }
            for network in Network::ALL {
                if let Some(mask) = spec.link(network) {
                    if spec.overwater {
                        if network == Network::Road {
                            let _ = bridges.entry(mask).or_insert(spec.id);
                        }
                    } else {
                        let _ = networks.entry((network, mask)).or_insert(spec.id);
                    }
                }
            }
        }

        Self {
            specs,
            buildings,
            networks,
            bridges,
        }
    }

    /// Number of registered tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Reports whether the registry holds no tiles. Never true for a loaded registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Descriptor of a tile, if registered.
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&TileSpec> {
        self.specs.get(id.index())
    }

    /// Reports whether the id names a registered tile.
    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        id.index() < self.specs.len()
    }

    /// Iterates over every descriptor in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSpec> {
        self.specs.iter()
    }

    /// Fresh cell value for a tile, with status bits derived from its descriptor.
    ///
    /// Unknown ids produce a cell without status bits.
    #[must_use]
    pub fn cell_for(&self, id: TileId) -> Tile {
        let mut flags = 0;
        if let Some(spec) = self.get(id) {
            if spec.conductive {
                flags |= Tile::CONDUCTIVE;
            }
            if spec.animate.is_some() {
                flags |= Tile::ANIMATED;
            }
            if spec.is_zone_center() {
                flags |= Tile::ZONE_CENTER;
            }
        }
        Tile::from_id(id).with_flags(flags)
    }

    /// Behavioural family of a tile.
    #[must_use]
    pub fn category(&self, id: TileId) -> Option<Category> {
        self.get(id).map(|spec| spec.category)
    }

    /// Reports whether the bulldozer may clear the tile.
    #[must_use]
    pub fn is_dozeable(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|spec| spec.dozeable)
    }

    /// Reports whether fire may spread into the tile.
    #[must_use]
    pub fn is_combustible(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|spec| spec.combustible)
    }

    /// Reports whether the tile sits on water.
    #[must_use]
    pub fn is_overwater(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|spec| spec.overwater)
    }

    /// Anchor tile and offset from it for a building member.
    #[must_use]
    pub fn owner_of(&self, id: TileId) -> Option<(TileId, (i32, i32))> {
        let spec = self.get(id)?;
        spec.owner.map(|owner| (owner, spec.owner_offset))
    }

    /// Building family the tile belongs to.
    #[must_use]
    pub fn zone_kind(&self, id: TileId) -> Option<ZoneKind> {
        self.get(id).and_then(|spec| spec.zone)
    }

    /// Anchor tile of the building for a zone kind at a development level.
    #[must_use]
    pub fn building_for(&self, zone: ZoneKind, level: u8) -> Option<TileId> {
        self.buildings.get(&(zone, level)).copied()
    }

    /// Anchor of the same building one level up.
    #[must_use]
    pub fn next_variant(&self, id: TileId) -> Option<TileId> {
        let spec = self.get(id)?;
        self.variant(spec, spec.level.checked_add(1)?)
    }

    /// Anchor of the same building one level down.
    #[must_use]
    pub fn previous_variant(&self, id: TileId) -> Option<TileId> {
        let spec = self.get(id)?;
        self.variant(spec, spec.level.checked_sub(1)?)
    }

    fn variant(&self, spec: &TileSpec, level: u8) -> Option<TileId> {
        let layout = spec.building.as_ref()?;
        let candidate = self.building_for(spec.zone?, level)?;
        let other = self.get(candidate)?.building.as_ref()?;
        (other.width == layout.width && other.height == layout.height).then_some(candidate)
    }

    /// Single-network tile drawing `network` with the given neighbour links.
    ///
    /// Dead ends and isolated tiles are drawn as straight segments.
    #[must_use]
    pub fn network_tile(&self, network: Network, mask: u8) -> Option<TileId> {
        self.networks
            .get(&(network, straighten(mask)))
            .copied()
    }

    /// Bridge running along the given road links, if it is straight.
    #[must_use]
    pub fn bridge_tile(&self, mask: u8) -> Option<TileId> {
        self.bridges.get(&straighten(mask)).copied()
    }

    /// Crossing where `network` runs straight along `mask` over a perpendicular `other`.
    #[must_use]
    pub fn crossing_tile(&self, network: Network, mask: u8, other: Network) -> Option<TileId> {
        let mask = straighten(mask);
        let across = match mask {
            HORIZONTAL => VERTICAL,
            VERTICAL => HORIZONTAL,
            _ => return None,
        };
        self.specs
            .iter()
            .find(|spec| {
                spec.category == Category::Crossing
                    && spec.link(network) == Some(mask)
                    && spec.link(other) == Some(across)
            })
            .map(|spec| spec.id)
    }

    /// Footprint covered by the building anchored at `center` with tile `id`.
    #[must_use]
    pub fn zone_footprint(&self, center: CityLocation, id: TileId) -> Option<CityRect> {
        let building = self.get(id)?.building.as_ref()?;
        let (inset_x, inset_y) = building.anchor_inset();
        Some(CityRect::new(
            center.offset(-inset_x, -inset_y),
            building.width,
            building.height,
        ))
    }
}

/// Collapses dead-end and empty masks onto straight segments.
#[must_use]
pub fn straighten(mask: u8) -> u8 {
    match mask & 0b1111 {
        0 | 0b0010 | 0b1000 => HORIZONTAL,
        0b0001 | 0b0100 => VERTICAL,
        other => other,
    }
}

fn resolve_owners(specs: &mut [TileSpec]) -> Result<(), RegistryError> {
    for index in 0..specs.len() {
        let Some(building) = specs[index].building.clone() else {
            continue;
        };
        let anchor = specs[index].id;
        let (inset_x, inset_y) = building.anchor_inset();
        let width = building.width as usize;
        for (position, member) in building.members.iter().enumerate() {
            let Some(spec) = specs.get_mut(member.index()) else {
                return Err(RegistryError::UnknownMember {
                    building: anchor,
                    member: member.get(),
                });
            };
            if spec.owner.is_none() {
                spec.owner = Some(anchor);
                spec.owner_offset = (
                    (position % width) as i32 - inset_x,
                    (position / width) as i32 - inset_y,
                );
            }
        }
    }
    Ok(())
}
