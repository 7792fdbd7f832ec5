use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a Tiled map or one of its tilesets.
#[derive(Debug, Error)]
pub enum MapLoadError {
    /// Only Tiled JSON maps are supported
    #[error("unsupported map format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// File I/O error
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// JSON syntax or shape error
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The map is structurally invalid
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// Layer data is not a plain gid array
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding { layer: String, encoding: String },
    /// A layer's data length does not match width * height
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    InvalidLayerSize {
        layer: String,
        expected: usize,
        actual: usize,
    },
    /// A tile references a gid that no tileset covers
    #[error("layer '{layer}' references gid {gid}, highest known gid is {max_gid}")]
    InvalidTileGid { layer: String, gid: u32, max_gid: u32 },
    /// Tileset atlas could not be decoded
    #[error("failed to decode tileset image {}: {source}", path.display())]
    TilesetImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised while reading a collision/zone descriptor.
///
/// `MalformedEntry` is never returned from a load: such entries are logged
/// and skipped, and the registry keeps them for inspection.
#[derive(Debug, Error)]
pub enum ZoneConfigError {
    #[error("failed to read zone descriptor {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse zone descriptor {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("zone entry {index} is malformed: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

/// Errors raised while loading a single animation frame.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("animation frame {} is missing", .0.display())]
    Missing(PathBuf),
    #[error("failed to decode animation frame {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
