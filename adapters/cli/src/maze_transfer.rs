use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use oubliette_core::{CellKind, Grid, GridError};
use serde::{Deserialize, Serialize};

const TRANSFER_DOMAIN: &str = "oubliette";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded maze payload.
pub(crate) const TRANSFER_HEADER: &str = "oubliette:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

const WALL_SYMBOL: char = '#';
const PATH_SYMBOL: char = '.';

/// Encodes a maze grid into a single-line string suitable for sharing.
pub(crate) fn encode(grid: &Grid) -> Result<String, MazeTransferError> {
    let payload = SerializableMaze {
        rows: grid
            .cells()
            .chunks(usize::try_from(grid.columns()).unwrap_or(usize::MAX).max(1))
            .map(|row| {
                row.iter()
                    .map(|kind| match kind {
                        CellKind::Wall => WALL_SYMBOL,
                        CellKind::Path => PATH_SYMBOL,
                    })
                    .collect()
            })
            .collect(),
    };
    let json = serde_json::to_vec(&payload).map_err(MazeTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        grid.columns(),
        grid.rows()
    ))
}

/// Decodes a maze grid from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<Grid, MazeTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MazeTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(MazeTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(MazeTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(MazeTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(MazeTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(MazeTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(MazeTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(MazeTransferError::InvalidEncoding)?;
    let decoded: SerializableMaze =
        serde_json::from_slice(&bytes).map_err(MazeTransferError::InvalidPayload)?;

    let grid = Grid::parse(&decoded.rows.join("\n")).map_err(MazeTransferError::InvalidGrid)?;
    if grid.columns() != columns || grid.rows() != rows {
        return Err(MazeTransferError::DimensionMismatch {
            declared: (columns, rows),
            actual: (grid.columns(), grid.rows()),
        });
    }
    Ok(grid)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableMaze {
    rows: Vec<String>,
}

/// Errors that can occur while decoding maze transfer strings.
#[derive(Debug)]
pub(crate) enum MazeTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded maze.
    MissingPrefix,
    /// The encoded maze did not contain a version segment.
    MissingVersion,
    /// The encoded maze did not include grid dimensions.
    MissingDimensions,
    /// The encoded maze did not include the payload segment.
    MissingPayload,
    /// The encoded maze used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded maze used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded maze.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// The decoded rows do not describe a valid grid.
    InvalidGrid(GridError),
    /// The decoded grid disagrees with the declared dimensions.
    DimensionMismatch {
        /// Dimensions written in the header.
        declared: (u32, u32),
        /// Dimensions of the decoded rows.
        actual: (u32, u32),
    },
}

impl fmt::Display for MazeTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "maze string was empty"),
            Self::MissingPrefix => write!(f, "maze string is missing the prefix"),
            Self::MissingVersion => write!(f, "maze string is missing the version"),
            Self::MissingDimensions => write!(f, "maze string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "maze string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "maze prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "maze version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode maze payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not parse maze payload: {error}"),
            Self::InvalidGrid(error) => write!(f, "maze payload is not a valid grid: {error}"),
            Self::DimensionMismatch { declared, actual } => write!(
                f,
                "maze header declares {}x{} but the payload holds {}x{}",
                declared.0, declared.1, actual.0, actual.1
            ),
        }
    }
}

impl Error for MazeTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidGrid(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), MazeTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| MazeTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| MazeTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| MazeTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(MazeTransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
