mod coord;

pub use coord::{TileCoord, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
