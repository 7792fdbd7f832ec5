use std::path::Path;

use crate::error::MapLoadError;
use crate::ir_map::{IrLayerKind, IrMap, IrObject, IrTileset};
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::spatial::{TileCoord, TileId};

/// Layer kind, decided once at load.
#[derive(Debug, Clone)]
pub enum LayerKind {
    Tiles { width: usize, height: usize, data: Vec<TileId> },
    Objects(Vec<IrObject>),
    Other(String),
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub kind: LayerKind,
}

impl Layer {
    /// Gid at `(col, row)`, empty outside the layer or for non-tile layers.
    pub fn tile_at(&self, col: usize, row: usize) -> TileId {
        match &self.kind {
            LayerKind::Tiles { width, height, data } if col < *width && row < *height => {
                data[row * width + col]
            }
            _ => TileId::EMPTY,
        }
    }
}

/// Raw tile layers of one map plus its dimensions. Immutable after load.
#[derive(Debug, Clone)]
pub struct TileGrid {
    tile_w: u32,
    tile_h: u32,
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    tilesets: Vec<IrTileset>,
}

impl TileGrid {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapLoadError> {
        let (ir, _) = decode_map_file_to_ir(path.as_ref())?;
        Ok(Self::from_ir(ir))
    }

    pub fn from_ir(ir: IrMap) -> Self {
        let layers = ir
            .layers
            .into_iter()
            .map(|l| Layer {
                name: l.name,
                visible: l.visible,
                kind: match l.kind {
                    IrLayerKind::Tiles { width, height, data } => LayerKind::Tiles {
                        width,
                        height,
                        data: data.into_iter().map(TileId).collect(),
                    },
                    IrLayerKind::Objects { objects } => LayerKind::Objects(objects),
                    IrLayerKind::Other { kind } => LayerKind::Other(kind),
                },
            })
            .collect();

        Self {
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            width: ir.width,
            height: ir.height,
            layers,
            tilesets: ir.tilesets,
        }
    }

    #[inline] pub fn tile_width(&self) -> u32 { self.tile_w }
    #[inline] pub fn tile_height(&self) -> u32 { self.tile_h }
    #[inline] pub fn width(&self) -> u32 { self.width }
    #[inline] pub fn height(&self) -> u32 { self.height }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn tilesets(&self) -> &[IrTileset] {
        &self.tilesets
    }

    #[inline]
    pub fn in_bounds(&self, c: TileCoord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }

    /// Visible tile layers in draw order.
    pub fn visible_tile_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers
            .iter()
            .filter(|l| l.visible && matches!(l.kind, LayerKind::Tiles { .. }))
    }

    /// Every non-empty tile of every visible tile layer, layer by layer,
    /// row-major inside a layer.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &str, TileId)> + '_ {
        self.visible_tile_layers().flat_map(|layer| layer_tiles(layer))
    }
}

/// Non-empty tiles of a single tile layer.
pub fn layer_tiles(layer: &Layer) -> impl Iterator<Item = (TileCoord, &str, TileId)> + '_ {
    let (width, data): (usize, &[TileId]) = match &layer.kind {
        LayerKind::Tiles { width, data, .. } => (*width, data),
        _ => (1, &[]),
    };
    data.iter()
        .enumerate()
        .filter(|(_, id)| !id.is_empty())
        .map(move |(idx, id)| {
            let coord = TileCoord::new((idx % width) as i32, (idx / width) as i32);
            (coord, layer.name.as_str(), *id)
        })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn tiles_skip_empty_and_invisible_layers() {
        let mut hidden = tile_layer("hidden", 3, 2, &[(0, 0)]);
        hidden.visible = false;
        let grid = grid(
            3,
            2,
            vec![
                tile_layer("ground", 3, 2, &[(2, 0), (1, 1)]),
                hidden,
                crate::ir_map::IrLayer {
                    name: "spawns".to_owned(),
                    visible: true,
                    kind: IrLayerKind::Objects { objects: vec![] },
                },
            ],
        );

        let tiles: Vec<_> = grid.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                (TileCoord::new(2, 0), "ground", TileId(1)),
                (TileCoord::new(1, 1), "ground", TileId(1)),
            ]
        );
        assert!(matches!(grid.layers()[2].kind, LayerKind::Objects(_)));
    }

    #[test]
    fn bounds_follow_map_dimensions() {
        let grid = grid(10, 10, vec![]);
        assert!(grid.in_bounds(TileCoord::new(0, 0)));
        assert!(grid.in_bounds(TileCoord::new(9, 9)));
        assert!(!grid.in_bounds(TileCoord::new(10, 3)));
        assert!(!grid.in_bounds(TileCoord::new(3, -1)));
    }

    #[test]
    fn tile_at_reads_row_major() {
        let grid = grid(3, 2, vec![tile_layer("ground", 3, 2, &[(2, 1)])]);
        let layer = &grid.layers()[0];
        assert_eq!(layer.tile_at(2, 1), TileId(1));
        assert_eq!(layer.tile_at(1, 2), TileId::EMPTY);
    }
}
