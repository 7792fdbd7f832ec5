// src/loader/descriptor.rs
//! Decoding of the collision/teleporter descriptor and of the alternate
//! coordinate-set zone list.
//!
//! Entries are kept as raw JSON until they are converted one by one, so a
//! single bad entry never fails the whole file.
use crate::error::ZoneConfigError;
use crate::spatial::TileCoord;
use crate::teleport::{TeleportZone, ZoneShape};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::Path;

fn default_teleporters_layer() -> String {
    "teleporters".to_owned()
}

/// `{ "layers": [...], "teleporters_layer": "...", "teleporters": [...] }`
#[derive(Debug, Clone, Deserialize)]
pub struct CollisionDescriptor {
    /// Names of the tile layers that block movement.
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default = "default_teleporters_layer")]
    pub teleporters_layer: String,
    #[serde(default)]
    pub teleporters: Vec<JsonValue>,
}

/// `{ "zones": [ { "coordinates": [[x,y],...], "target_map": "...", "spawn_position": [x,y] } ] }`
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneList {
    pub zones: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct RawRect {
    x: Option<i32>,
    y: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
}

#[derive(Deserialize)]
struct RawPoint {
    x: Option<i32>,
    y: Option<i32>,
}

#[derive(Deserialize)]
struct RawRectEntry {
    zone: Option<RawRect>,
    target_map: Option<String>,
    target_spawn: Option<RawPoint>,
}

#[derive(Deserialize)]
struct RawCoordinateEntry {
    coordinates: Option<Vec<(i32, i32)>>,
    target_map: Option<String>,
    spawn_position: Option<(i32, i32)>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ZoneConfigError> {
    let txt = std::fs::read_to_string(path).map_err(|source| ZoneConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ZoneConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_collision_descriptor(path: &Path) -> Result<CollisionDescriptor, ZoneConfigError> {
    read_json(path)
}

pub fn load_zone_list(path: &Path) -> Result<ZoneList, ZoneConfigError> {
    read_json(path)
}

fn malformed(index: usize, reason: impl Into<String>) -> ZoneConfigError {
    ZoneConfigError::MalformedEntry {
        index,
        reason: reason.into(),
    }
}

fn entry<T: DeserializeOwned>(index: usize, raw: &JsonValue) -> Result<T, ZoneConfigError> {
    T::deserialize(raw).map_err(|e| malformed(index, e.to_string()))
}

fn target_map(index: usize, target: Option<String>) -> Result<String, ZoneConfigError> {
    match target {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(malformed(index, "missing target_map")),
    }
}

/// Converts one `teleporters` entry. Geometry fields left out of a present
/// `zone` object default to a 1x1 rectangle at the origin; a `zone` with
/// none of `x`, `y`, `width`, `height` is rejected.
pub fn rect_zone(index: usize, raw: &JsonValue) -> Result<TeleportZone, ZoneConfigError> {
    let e: RawRectEntry = entry(index, raw)?;

    let zone = match e.zone {
        Some(z) if z.x.is_some() || z.y.is_some() || z.width.is_some() || z.height.is_some() => z,
        _ => return Err(malformed(index, "missing zone")),
    };
    let target_map = target_map(index, e.target_map)?;
    let spawn = match e.target_spawn {
        Some(p) if p.x.is_some() || p.y.is_some() => p,
        _ => return Err(malformed(index, "missing target_spawn")),
    };

    Ok(TeleportZone {
        shape: ZoneShape::Rectangle {
            x: zone.x.unwrap_or(0),
            y: zone.y.unwrap_or(0),
            width: zone.width.unwrap_or(1),
            height: zone.height.unwrap_or(1),
        },
        target_map,
        target_spawn: TileCoord::new(spawn.x.unwrap_or(0), spawn.y.unwrap_or(0)),
    })
}

/// Converts one `zones` entry of the coordinate-set form.
pub fn coordinate_zone(index: usize, raw: &JsonValue) -> Result<TeleportZone, ZoneConfigError> {
    let e: RawCoordinateEntry = entry(index, raw)?;

    let coordinates: HashSet<TileCoord> = match e.coordinates {
        Some(c) if !c.is_empty() => c.into_iter().map(TileCoord::from).collect(),
        _ => return Err(malformed(index, "missing coordinates")),
    };
    let target_map = target_map(index, e.target_map)?;
    let spawn = e
        .spawn_position
        .ok_or_else(|| malformed(index, "missing spawn_position"))?;

    Ok(TeleportZone {
        shape: ZoneShape::CoordinateSet(coordinates),
        target_map,
        target_spawn: TileCoord::from(spawn),
    })
}
