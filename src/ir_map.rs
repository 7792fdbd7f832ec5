// src/ir_map.rs

/// Canonical, format-agnostic map.
#[derive(Debug, Clone)]
pub struct IrMap {
    pub width: u32,  // in tiles
    pub height: u32, // in tiles
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilesets: Vec<IrTileset>, // sorted by first_gid
    pub layers: Vec<IrLayer>,     // draw order: array order
}

/// One image atlas with a regular grid. `image` is already resolved against
/// the directory of the file that declared it.
#[derive(Debug, Clone)]
pub struct IrTileset {
    pub first_gid: u32,
    pub image: std::path::PathBuf,
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilecount: u32,
    pub columns: u32,
    pub spacing: u32, // 0 if not used
    pub margin: u32,  // 0 if not used
}

impl IrTileset {
    #[inline]
    pub fn last_gid(&self) -> u32 {
        self.first_gid + self.tilecount.saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub enum IrLayerKind {
    Tiles {
        width: usize,
        height: usize,
        data: Vec<u32>, // raw GIDs, flip flags kept
    },
    Objects {
        objects: Vec<IrObject>,
    },
    /// Image layers, groups and anything newer than this loader.
    Other { kind: String },
}

#[derive(Debug, Clone)]
pub struct IrLayer {
    pub name: String,
    pub visible: bool,
    pub kind: IrLayerKind,
}

/// Object-layer entry, kept as its bounding rectangle in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct IrObject {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
