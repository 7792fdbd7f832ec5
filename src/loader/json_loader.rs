// src/loader/json_loader.rs
use crate::error::MapLoadError as MapError;
use crate::ir_map::*;
use crate::spatial::GID_MASK;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Layer `data`: a gid array, or a string when the layer is base64-encoded.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

impl Default for JsonLayerData {
    fn default() -> Self {
        JsonLayerData::Gids(Vec::new())
    }
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: JsonLayerData,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    objects: Vec<JsonObject>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTilesetRef {
    External {
        firstgid: u32,
        source: String,
    },
    Embedded {
        firstgid: u32,
        #[serde(flatten)]
        tileset: JsonTileset,
    },
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize)]
struct JsonTileset {
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    image: String,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
}

fn read_file(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn tileset_to_ir(first_gid: u32, ts: JsonTileset, base_dir: &Path) -> IrTileset {
    IrTileset {
        first_gid,
        image: base_dir.join(ts.image),
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        columns: ts.columns,
        spacing: ts.spacing,
        margin: ts.margin,
    }
}

fn load_tileset_ref(ts: JsonTilesetRef, map_dir: &Path) -> Result<IrTileset, MapError> {
    match ts {
        JsonTilesetRef::Embedded { firstgid, tileset } => {
            Ok(tileset_to_ir(firstgid, tileset, map_dir))
        }
        JsonTilesetRef::External { firstgid, source } => {
            if !source.ends_with(".json") {
                return Err(MapError::InvalidMap(format!(
                    "External tileset must be JSON: {source}"
                )));
            }
            let ts_path = map_dir.join(&source);
            let ext_txt = read_file(&ts_path)?;
            let ext: JsonTileset =
                serde_json::from_str(&ext_txt).map_err(|source| MapError::Json {
                    path: ts_path.clone(),
                    source,
                })?;
            // image paths inside an external tileset are relative to that file
            let ts_dir = ts_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| map_dir.to_path_buf());
            Ok(tileset_to_ir(firstgid, ext, &ts_dir))
        }
    }
}

fn layer_to_ir(l: JsonLayer, map: (u32, u32), max_gid: u32) -> Result<IrLayer, MapError> {
    let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => {
            let encoding = match (l.encoding.as_deref(), &l.data) {
                (Some(e), _) => e,
                (None, JsonLayerData::Encoded(_)) => "base64",
                (None, JsonLayerData::Gids(_)) => "csv",
            };
            let data = match l.data {
                JsonLayerData::Gids(gids) if encoding == "csv" => gids,
                _ => {
                    return Err(MapError::UnsupportedEncoding {
                        layer: l.name,
                        encoding: encoding.to_owned(),
                    });
                }
            };
            // Tiled omits layer sizes in some exports; fall back to the map's
            let width = if l.width == 0 { map.0 as usize } else { l.width };
            let height = if l.height == 0 { map.1 as usize } else { l.height };
            if data.len() != width * height {
                return Err(MapError::InvalidLayerSize {
                    layer: l.name,
                    expected: width * height,
                    actual: data.len(),
                });
            }
            for &raw_gid in &data {
                let gid = raw_gid & GID_MASK;
                if gid != 0 && gid > max_gid {
                    return Err(MapError::InvalidTileGid {
                        layer: l.name,
                        gid,
                        max_gid,
                    });
                }
            }
            IrLayerKind::Tiles {
                width,
                height,
                data,
            }
        }
        "objectgroup" => IrLayerKind::Objects {
            objects: l
                .objects
                .into_iter()
                .map(|o| IrObject {
                    id: o.id,
                    name: o.name,
                    x: o.x,
                    y: o.y,
                    width: o.width,
                    height: o.height,
                })
                .collect(),
        },
        other => IrLayerKind::Other {
            kind: other.to_owned(),
        },
    };

    Ok(IrLayer {
        name: l.name,
        visible: l.visible,
        kind,
    })
}

/// Decodes an in-memory Tiled JSON map. Relative tileset paths resolve
/// against `map_dir`; `origin` only labels errors.
pub fn decode_map_str(txt: &str, map_dir: &Path, origin: &Path) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(txt).map_err(|source| MapError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    if j.width == 0 || j.height == 0 || j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "map and tile dimensions must be non-zero: {}",
            origin.display()
        )));
    }

    let mut ir_tilesets = j
        .tilesets
        .into_iter()
        .map(|ts| load_tileset_ref(ts, map_dir))
        .collect::<Result<Vec<_>, _>>()?;

    // Sort by first_gid to make LUT building trivial
    ir_tilesets.sort_by_key(|t| t.first_gid);

    let max_gid = ir_tilesets.iter().map(IrTileset::last_gid).max().unwrap_or(0);

    let ir_layers = j
        .layers
        .into_iter()
        .map(|l| layer_to_ir(l, (j.width, j.height), max_gid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets: ir_tilesets,
        layers: ir_layers,
    })
}

pub fn decode_map_file_to_ir(path: &Path) -> Result<(IrMap, PathBuf), MapError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::UnsupportedFormat(path.to_path_buf()));
    }

    let txt = read_file(path)?;

    let map_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let ir = decode_map_str(&txt, &map_dir, path)?;
    Ok((ir, map_dir))
}
