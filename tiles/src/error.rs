use std::path::PathBuf;

use citysim_core::TileId;
use thiserror::Error;

/// Failures that abort tile registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number of the offending record.
        line: usize,
        /// Human readable description of the problem.
        reason: String,
    },
    /// The resource does not start with a record for tile 0.
    #[error("resource has no record for tile 0")]
    MissingTileZero,
    /// A record id is lower than the id preceding it.
    #[error("line {line}: tile {id} follows tile {previous}")]
    OutOfOrder {
        /// One-based line number of the offending record.
        line: usize,
        /// Id found on the line.
        id: u16,
        /// Id of the preceding record.
        previous: u16,
    },
    /// Two records share an id.
    #[error("line {line}: tile {id} is defined twice")]
    DuplicateId {
        /// One-based line number of the second definition.
        line: usize,
        /// Repeated id.
        id: u16,
    },
    /// A building lists a member id that has no record.
    #[error("building {building:?} lists unknown member {member}")]
    UnknownMember {
        /// Anchor tile of the building.
        building: TileId,
        /// Member id without a record.
        member: u16,
    },
    /// A tile the simulation depends on is missing or has the wrong category.
    #[error("tile {id} must be {expected}")]
    BadWellKnownTile {
        /// Id that failed validation.
        id: u16,
        /// Description of what the simulation expects there.
        expected: &'static str,
    },
    /// The resource file could not be read.
    #[error("failed to read tile resource {path}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
