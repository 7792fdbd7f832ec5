//! Tile-map exploration on Macroquad: Tiled JSON maps, grid-stepping
//! movement, layer-driven collisions and teleporters between maps.

pub mod animation;
pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
mod ir_map;
pub mod loader {
    pub mod descriptor;
    pub mod json_loader;
}
pub mod map;
pub mod player;
pub mod render {
    pub mod cull;
    pub mod tile_cache;
    pub mod tileset;
}
pub mod spatial;
pub mod teleport;
pub mod tile_grid;

pub use config::GameConfig;
pub use error::{AssetLoadError, MapLoadError, ZoneConfigError};
pub use game::{FileMapLoader, FrameReport, Game, MapLoader, MoveOutcome};
pub use ir_map::{IrLayer, IrLayerKind, IrMap, IrObject, IrTileset};
pub use map::MapInstance;
pub use player::{Direction, MotionConfig, MotionState, PlayerMotion};
pub use spatial::{TileCoord, TileId};
pub use teleport::{TeleportRegistry, TeleportZone, ZoneShape};
pub use tile_grid::TileGrid;
