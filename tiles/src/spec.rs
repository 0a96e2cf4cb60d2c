//! Tile descriptors built from parsed resource records.

use std::collections::BTreeMap;

use citysim_core::{Network, TileId, ZoneKind};

use crate::{
    parser::{RawRecord, RawValue},
    RegistryError,
};

/// Broad behavioural family of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Bare land.
    Dirt,
    /// River and shore tiles.
    Water,
    /// Forest.
    Trees,
    /// Debris left behind by demolition.
    Rubble,
    /// Flood water spreading over land.
    Flood,
    /// Contaminated land left by a meltdown.
    Radioactive,
    /// Burning tile.
    Fire,
    /// Short explosion animation that decays into rubble.
    Explosion,
    /// Road or bridge.
    Road,
    /// Power line.
    Wire,
    /// Railway.
    Rail,
    /// Two perpendicular networks sharing one tile.
    Crossing,
    /// Park.
    Park,
    /// Member of a multi-tile building.
    Zone,
}

impl Category {
    fn from_name(name: &str) -> Option<Self> {
        let category = match name {
            "dirt" => Self::Dirt,
            "water" => Self::Water,
            "trees" => Self::Trees,
            "rubble" => Self::Rubble,
            "flood" => Self::Flood,
            "radioactive" => Self::Radioactive,
            "fire" => Self::Fire,
            "explosion" => Self::Explosion,
            "road" => Self::Road,
            "wire" => Self::Wire,
            "rail" => Self::Rail,
            "crossing" => Self::Crossing,
            "park" => Self::Park,
            "zone" => Self::Zone,
            _ => return None,
        };
        Some(category)
    }
}

/// Layout of a multi-tile building declared on its anchor tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Building {
    /// Footprint width in tiles.
    pub width: u32,
    /// Footprint height in tiles.
    pub height: u32,
    /// Member tiles in row-major order, anchor included.
    pub members: Vec<TileId>,
}

impl Building {
    /// Offset of the anchor from the footprint's upper-left corner.
    #[must_use]
    pub const fn anchor_inset(&self) -> (i32, i32) {
        (
            if self.width >= 3 { 1 } else { 0 },
            if self.height >= 3 { 1 } else { 0 },
        )
    }
}

/// Immutable descriptor of a registered tile type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSpec {
    /// Identifier of the tile.
    pub id: TileId,
    /// Display name.
    pub name: String,
    /// Behavioural family.
    pub category: Category,
    /// The bulldozer may clear this tile.
    pub dozeable: bool,
    /// Fire may spread into this tile.
    pub combustible: bool,
    /// The tile carries power.
    pub conductive: bool,
    /// The tile sits on water; clearing it leaves river behind.
    pub overwater: bool,
    /// Tile the cell turns into on the next animation step.
    pub animate: Option<TileId>,
    /// Link masks per network, indexed by [`Network`] declaration order.
    pub links: [Option<u8>; 3],
    /// Building family the tile belongs to.
    pub zone: Option<ZoneKind>,
    /// Development level of a growable zone.
    pub level: u8,
    /// Layout declared on an anchor tile.
    pub building: Option<Building>,
    /// Residents or jobs housed by an anchor tile.
    pub population: u32,
    /// Pollution emitted by an anchor tile.
    pub pollution: u8,
    /// Distance power travels from a plant anchor, in conductive steps.
    pub power_reach: u32,
    /// Anchor tile of the building this tile belongs to. Set during resolution.
    pub owner: Option<TileId>,
    /// Position of this tile relative to its anchor. Set during resolution.
    pub owner_offset: (i32, i32),
    /// Attributes the engine does not interpret, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl TileSpec {
    fn blank(id: TileId) -> Self {
        Self {
            id,
            name: String::new(),
            category: Category::Dirt,
            dozeable: false,
            combustible: false,
            conductive: false,
            overwater: false,
            animate: None,
            links: [None; 3],
            zone: None,
            level: 0,
            building: None,
            population: 0,
            pollution: 0,
            power_reach: 0,
            owner: None,
            owner_offset: (0, 0),
            extra: BTreeMap::new(),
        }
    }

    /// Reports whether the tile anchors a multi-tile building.
    #[must_use]
    pub fn is_zone_center(&self) -> bool {
        self.building.is_some()
    }

    /// Reports whether the tile is part of a multi-tile building.
    #[must_use]
    pub fn is_zone_member(&self) -> bool {
        self.owner.is_some()
    }

    /// Link mask of the tile for a network, if it carries that network.
    #[must_use]
    pub fn link(&self, network: Network) -> Option<u8> {
        self.links[network_index(network)]
    }

    /// Number of networks the tile carries.
    #[must_use]
    pub fn network_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_some()).count()
    }

    pub(crate) fn from_record(record: &RawRecord) -> Result<Self, RegistryError> {
        let line = record.line;
        let mut spec = Self::blank(TileId::new(record.id));
        for (key, value) in &record.attributes {
            match key.as_str() {
                "name" => spec.name = text(line, key, value)?.to_owned(),
                "category" => {
                    let name = text(line, key, value)?;
                    spec.category = Category::from_name(name).ok_or_else(|| {
                        invalid(line, format!("unknown category {name:?}"))
                    })?;
                }
                "dozeable" => spec.dozeable = flag(line, key, value)?,
                "combustible" => spec.combustible = flag(line, key, value)?,
                "conductive" => spec.conductive = flag(line, key, value)?,
                "overwater" => spec.overwater = flag(line, key, value)?,
                "animate" => spec.animate = Some(TileId::new(number(line, key, value)?)),
                "road" => spec.links[network_index(Network::Road)] = Some(mask(line, key, value)?),
                "wire" => spec.links[network_index(Network::Wire)] = Some(mask(line, key, value)?),
                "rail" => spec.links[network_index(Network::Rail)] = Some(mask(line, key, value)?),
                "zone" => {
                    let name = text(line, key, value)?;
                    spec.zone = Some(
                        ZoneKind::from_name(name)
                            .ok_or_else(|| invalid(line, format!("unknown zone {name:?}")))?,
                    );
                }
                "level" => spec.level = number(line, key, value)?,
                "building" => {
                    let (width, height) = dimensions(line, text(line, key, value)?)?;
                    let members = spec.building.take().map(|b| b.members).unwrap_or_default();
                    spec.building = Some(Building {
                        width,
                        height,
                        members,
                    });
                }
                "members" => {
                    let RawValue::List(items) = value else {
                        return Err(invalid(line, "members must be a list".to_owned()));
                    };
                    let members = items
                        .iter()
                        .map(|item| {
                            item.parse::<u16>()
                                .map(TileId::new)
                                .map_err(|_| invalid(line, format!("bad member id {item:?}")))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    match spec.building.as_mut() {
                        Some(building) => building.members = members,
                        None => {
                            spec.building = Some(Building {
                                width: 0,
                                height: 0,
                                members,
                            })
                        }
                    }
                }
                "population" => spec.population = number(line, key, value)?,
                "pollution" => spec.pollution = number(line, key, value)?,
                "power" => spec.power_reach = number(line, key, value)?,
                _ => {
                    let raw = match value {
                        RawValue::Flag => "true".to_owned(),
                        RawValue::Text(text) => text.clone(),
                        RawValue::List(items) => items.join("|"),
                    };
                    let _ = spec.extra.insert(key.clone(), raw);
                }
            }
        }

        if let Some(building) = &spec.building {
            let expected = building.width as usize * building.height as usize;
            if expected == 0 {
                return Err(invalid(line, "members listed without a building size".to_owned()));
            }
            if building.members.len() != expected {
                return Err(invalid(
                    line,
                    format!(
                        "building {}x{} lists {} members",
                        building.width,
                        building.height,
                        building.members.len()
                    ),
                ));
            }
        }
        Ok(spec)
    }
}

pub(crate) const fn network_index(network: Network) -> usize {
    match network {
        Network::Road => 0,
        Network::Wire => 1,
        Network::Rail => 2,
    }
}

fn invalid(line: usize, reason: String) -> RegistryError {
    RegistryError::Parse { line, reason }
}

fn text<'v>(line: usize, key: &str, value: &'v RawValue) -> Result<&'v str, RegistryError> {
    match value {
        RawValue::Text(text) => Ok(text),
        _ => Err(invalid(line, format!("{key} expects a single value"))),
    }
}

fn flag(line: usize, key: &str, value: &RawValue) -> Result<bool, RegistryError> {
    match value {
        RawValue::Flag => Ok(true),
        RawValue::Text(text) if text == "true" => Ok(true),
        RawValue::Text(text) if text == "false" => Ok(false),
        _ => Err(invalid(line, format!("{key} expects true or false"))),
    }
}

fn number<T: std::str::FromStr>(line: usize, key: &str, value: &RawValue) -> Result<T, RegistryError> {
    let text = text(line, key, value)?;
    text.parse()
        .map_err(|_| invalid(line, format!("{key} expects a number, found {text:?}")))
}

fn mask(line: usize, key: &str, value: &RawValue) -> Result<u8, RegistryError> {
    let mask: u8 = number(line, key, value)?;
    if mask > 0b1111 {
        return Err(invalid(line, format!("{key} mask {mask} exceeds four directions")));
    }
    Ok(mask)
}

fn dimensions(line: usize, text: &str) -> Result<(u32, u32), RegistryError> {
    let parsed = text
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));
    match parsed {
        Some((width, height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(invalid(line, format!("building expects WxH, found {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn spec(text: &str) -> Result<TileSpec, RegistryError> {
        let record = parse_line(1, text)
            .expect("line parses")
            .expect("record present");
        TileSpec::from_record(&record)
    }

    #[test]
    fn interprets_known_attributes_and_keeps_unknown_ones() {
        let spec = spec(r#"28 name="Road" category=road road=10 dozeable conductive=false sound=thud"#)
            .expect("valid record");
        assert_eq!(spec.name, "Road");
        assert_eq!(spec.category, Category::Road);
        assert_eq!(spec.link(Network::Road), Some(10));
        assert_eq!(spec.link(Network::Rail), None);
        assert!(spec.dozeable);
        assert!(!spec.conductive);
        assert_eq!(spec.extra.get("sound").map(String::as_str), Some("thud"));
    }

    #[test]
    fn building_members_must_fill_footprint() {
        let error = spec("5 category=zone building=2x2 members=(5|6|7)").expect_err("short");
        assert!(matches!(error, RegistryError::Parse { line: 1, .. }));

        let ok = spec("5 category=zone building=2x1 members=(5|6)").expect("complete");
        assert!(ok.is_zone_center());
        assert_eq!(ok.building.map(|b| b.anchor_inset()), Some((0, 0)));
    }

    #[test]
    fn rejects_unknown_category_and_oversized_masks() {
        assert!(spec("1 category=lava").is_err());
        assert!(spec("1 category=road road=16").is_err());
        assert!(spec("1 building=3by3").is_err());
    }
}
