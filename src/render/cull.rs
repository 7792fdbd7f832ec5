use macroquad::prelude::*;
use std::ops::Range;

const CULL_MARGIN_TILES: i32 = 1;

/// Columns and rows of the map that intersect the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    pub cols: Range<u32>,
    pub rows: Range<u32>,
}

impl TileRange {
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty() || self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cols.len() * self.rows.len()
    }
}

/// Tiles of a `map_w x map_h` map, drawn at `tile_px` pixels each, that fall
/// inside the screen rectangle starting at `camera` of size `viewport`.
pub fn visible_tile_range(
    camera: Vec2,
    viewport: Vec2,
    tile_px: Vec2,
    map_w: u32,
    map_h: u32,
) -> TileRange {
    if tile_px.x <= 0.0 || tile_px.y <= 0.0 {
        return TileRange { cols: 0..0, rows: 0..0 };
    }

    let view_min = camera;
    let view_max = camera + viewport;

    let mut cx_min = (view_min.x / tile_px.x).floor() as i32;
    let mut cy_min = (view_min.y / tile_px.y).floor() as i32;
    let mut cx_max = (view_max.x / tile_px.x).floor() as i32;
    let mut cy_max = (view_max.y / tile_px.y).floor() as i32;

    if cx_min > cx_max {
        std::mem::swap(&mut cx_min, &mut cx_max);
    }
    if cy_min > cy_max {
        std::mem::swap(&mut cy_min, &mut cy_max);
    }

    cx_min -= CULL_MARGIN_TILES;
    cy_min -= CULL_MARGIN_TILES;
    cx_max += CULL_MARGIN_TILES;
    cy_max += CULL_MARGIN_TILES;

    let clamp = |v: i32, hi: u32| v.clamp(0, hi as i32) as u32;
    TileRange {
        cols: clamp(cx_min, map_w)..clamp(cx_max + 1, map_w),
        rows: clamp(cy_min, map_h)..clamp(cy_max + 1, map_h),
    }
}

/// Whether a screen-space rectangle overlaps the viewport at all.
#[inline]
pub fn on_screen(pos: Vec2, size: Vec2, viewport: Vec2) -> bool {
    pos.x + size.x >= 0.0 && pos.y + size.y >= 0.0 && pos.x <= viewport.x && pos.y <= viewport.y
}
