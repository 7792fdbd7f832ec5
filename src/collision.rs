//! Blocking-tile set built from named tile layers.

use std::collections::{HashMap, HashSet};

use macroquad::prelude::ivec2;
use tracing::debug;

use crate::spatial::TileCoord;
use crate::tile_grid::{layer_tiles, TileGrid};

/// Rows between a collision-layer tile and the tile it blocks. The collision
/// layers of the shipped maps are painted one row below the walls they mark.
pub const COLLISION_ROW_OFFSET: i32 = -1;

/// What `CollisionIndex::build` did, per layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollisionReport {
    /// Tiles inserted, keyed by collidable layer name.
    pub added: HashMap<String, usize>,
    /// Visible tile layers that were not collidable.
    pub skipped: Vec<String>,
}

impl CollisionReport {
    pub fn total(&self) -> usize {
        self.added.values().sum()
    }
}

#[derive(Debug, Default, Clone)]
pub struct CollisionIndex {
    blocked: HashSet<TileCoord>,
}

impl CollisionIndex {
    pub fn build(grid: &TileGrid, collidable: &HashSet<String>) -> (Self, CollisionReport) {
        let mut blocked = HashSet::new();
        let mut report = CollisionReport::default();

        for layer in grid.visible_tile_layers() {
            if !collidable.contains(&layer.name) {
                debug!(layer = %layer.name, "layer ignored for collisions");
                report.skipped.push(layer.name.clone());
                continue;
            }

            let mut count = 0;
            for (coord, _, _) in layer_tiles(layer) {
                blocked.insert(coord.offset(ivec2(0, COLLISION_ROW_OFFSET)));
                count += 1;
            }
            debug!(layer = %layer.name, count, "tiles added as blocking");
            *report.added.entry(layer.name.clone()).or_insert(0) += count;
        }

        debug!(
            total = report.total(),
            distinct = blocked.len(),
            "collision index built"
        );
        (Self { blocked }, report)
    }

    pub fn from_tiles(tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        Self {
            blocked: tiles.into_iter().collect(),
        }
    }

    #[inline]
    pub fn is_blocked(&self, c: TileCoord) -> bool {
        self.blocked.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.blocked.iter().copied()
    }
}
