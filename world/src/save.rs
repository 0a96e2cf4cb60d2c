//! Binary city save format.
//!
//! Every integer is written big-endian regardless of host byte order:
//!
//! ```text
//! magic "CITY" | width u16 | height u16 | cycle u32 | funds i32 | options u16
//! | rng seed [u8; 32] | rng stream u64 | rng word position u128
//! | width * height raw cells as u16, row-major
//! ```
//!
//! Derived maps, the census and sprites are not stored; the next tick rebuilds
//! them from the tiles.

use bytes::{Buf, BufMut, BytesMut};
use citysim_core::{CityOptions, Tile};
use citysim_tiles::TileRegistry;
use thiserror::Error;
use tracing::debug;

use crate::{query, CityRng, RngSnapshot, TileMap, World};

/// Leading bytes of every save.
pub const MAGIC: [u8; 4] = *b"CITY";

const HEADER_LEN: usize = 4 + 2 + 2 + 4 + 4 + 2 + 32 + 8 + 16;
const OPTION_AUTO_BULLDOZE: u16 = 0b01;
const OPTION_DISASTERS: u16 = 0b10;

/// Reasons a save cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    /// The input ends before the record it declares.
    #[error("save is truncated: expected {expected} bytes, found {found}")]
    Truncated {
        /// Bytes the header promises.
        expected: usize,
        /// Bytes available.
        found: usize,
    },
    /// The input does not start with the save magic.
    #[error("not a city save")]
    BadMagic,
    /// The header declares an empty map.
    #[error("invalid map dimensions {width}x{height}")]
    BadDimensions {
        /// Declared width.
        width: u16,
        /// Declared height.
        height: u16,
    },
    /// A cell names a tile the registry does not know.
    #[error("unknown tile {id} at ({x}, {y})")]
    UnknownTile {
        /// Column of the cell.
        x: u32,
        /// Row of the cell.
        y: u32,
        /// Id found in the cell.
        id: u16,
    },
    /// Bytes follow the last cell.
    #[error("{extra} unexpected bytes after the tile data")]
    TrailingBytes {
        /// Number of surplus bytes.
        extra: usize,
    },
}

/// Serializes the city.
///
/// Funds outside the `i32` range are saturated; map dimensions must fit in `u16`.
#[must_use]
pub fn encode(world: &World) -> Vec<u8> {
    let map = query::map(world);
    let cells = map.as_raw();
    let mut out = BytesMut::with_capacity(HEADER_LEN + cells.len() * 2);

    out.put_slice(&MAGIC);
    out.put_u16(u16::try_from(map.width()).unwrap_or(u16::MAX));
    out.put_u16(u16::try_from(map.height()).unwrap_or(u16::MAX));
    out.put_u32(query::cycle(world));
    let funds = query::funds(world).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    out.put_i32(funds as i32);
    out.put_u16(encode_options(query::options(world)));

    let snapshot = world.rng.snapshot();
    out.put_slice(&snapshot.seed);
    out.put_u64(snapshot.stream);
    out.put_u128(snapshot.word_pos);

    for cell in cells {
        out.put_u16(cell);
    }
    debug!(bytes = out.len(), "city encoded");
    out.to_vec()
}

/// Restores a city, checking every cell against the registry.
pub fn decode(bytes: &[u8], registry: &TileRegistry) -> Result<World, SaveError> {
    if bytes.len() < HEADER_LEN {
        return Err(SaveError::Truncated {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }
    let mut input = bytes;
    if input[..MAGIC.len()] != MAGIC {
        return Err(SaveError::BadMagic);
    }
    input.advance(MAGIC.len());

    let width = input.get_u16();
    let height = input.get_u16();
    if width == 0 || height == 0 {
        return Err(SaveError::BadDimensions { width, height });
    }
    let cycle = input.get_u32();
    let funds = i64::from(input.get_i32());
    let options = decode_options(input.get_u16());

    let mut seed = [0u8; 32];
    input.copy_to_slice(&mut seed);
    let stream = input.get_u64();
    let word_pos = input.get_u128();

    let cell_count = usize::from(width) * usize::from(height);
    let expected = HEADER_LEN + cell_count * 2;
    if bytes.len() < expected {
        return Err(SaveError::Truncated {
            expected,
            found: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(SaveError::TrailingBytes {
            extra: bytes.len() - expected,
        });
    }

    let mut raw = Vec::with_capacity(cell_count);
    for index in 0..cell_count {
        let value = input.get_u16();
        let id = Tile::from_raw(value).id();
        if !registry.contains(id) {
            return Err(SaveError::UnknownTile {
                x: (index % usize::from(width)) as u32,
                y: (index / usize::from(width)) as u32,
                id: id.get(),
            });
        }
        raw.push(value);
    }

    let map = TileMap::from_raw(u32::from(width), u32::from(height), raw);
    let rng = CityRng::from_snapshot(RngSnapshot {
        seed,
        stream,
        word_pos,
    });
    debug!(width, height, cycle, "city decoded");
    Ok(World::restore(map, rng, funds, cycle, options))
}

fn encode_options(options: CityOptions) -> u16 {
    let mut bits = 0;
    if options.auto_bulldoze {
        bits |= OPTION_AUTO_BULLDOZE;
    }
    if options.disasters {
        bits |= OPTION_DISASTERS;
    }
    bits
}

fn decode_options(bits: u16) -> CityOptions {
    CityOptions {
        auto_bulldoze: bits & OPTION_AUTO_BULLDOZE != 0,
        disasters: bits & OPTION_DISASTERS != 0,
    }
}
