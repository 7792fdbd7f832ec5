use image::imageops::{self, FilterType};
use image::RgbaImage;
use macroquad::prelude::{FilterMode, Texture2D};
use tracing::debug;

use crate::error::MapLoadError;
use crate::ir_map::IrTileset;
use crate::render::tile_cache::TileImageSource;
use crate::spatial::TileId;

/// Decoded tileset atlas, kept on the CPU until a tile is first scaled.
pub struct TilesetInfo {
    pub first_gid: u32,
    pub tilecount: u32,
    pub cols: u32,
    pub atlas: RgbaImage,
    pub tile_w: u32,
    pub tile_h: u32,
    pub spacing: u32,
    pub margin: u32,
}

impl TilesetInfo {
    /// Source rectangle of the `local`-th tile inside the atlas.
    fn source_rect(&self, local: u32) -> (u32, u32, u32, u32) {
        let cols = self.cols.max(1);
        let col = local % cols;
        let row = local / cols;
        let sx = self.margin + col * (self.tile_w + self.spacing);
        let sy = self.margin + row * (self.tile_h + self.spacing);
        (sx, sy, self.tile_w, self.tile_h)
    }
}

/// Tile images of one map, looked up by gid.
pub struct TilesetImages {
    tilesets: Vec<TilesetInfo>,
    gid_lut: Vec<u16>,
}

impl TilesetImages {
    /// Decodes every atlas. Expects `tilesets` sorted by `first_gid`.
    pub fn load(tilesets: &[IrTileset]) -> Result<Self, MapLoadError> {
        let mut infos = Vec::with_capacity(tilesets.len());
        for t in tilesets {
            let atlas = image::open(&t.image)
                .map_err(|source| MapLoadError::TilesetImage {
                    path: t.image.clone(),
                    source,
                })?
                .to_rgba8();
            debug!(image = %t.image.display(), first_gid = t.first_gid, "tileset decoded");
            infos.push(TilesetInfo {
                first_gid: t.first_gid,
                tilecount: t.tilecount,
                cols: t.columns,
                atlas,
                tile_w: t.tile_w,
                tile_h: t.tile_h,
                spacing: t.spacing,
                margin: t.margin,
            });
        }
        Ok(Self::from_tilesets(infos))
    }

    pub fn from_tilesets(mut tilesets: Vec<TilesetInfo>) -> Self {
        tilesets.sort_unstable_by_key(|t| t.first_gid);

        let max_gid = tilesets
            .iter()
            .map(|t| t.first_gid + t.tilecount.saturating_sub(1))
            .max()
            .unwrap_or(0);

        let mut gid_lut = vec![u16::MAX; (max_gid + 1) as usize];

        for (i, t) in tilesets.iter().enumerate() {
            let start = t.first_gid;
            let end = t.first_gid + t.tilecount;
            for gid in start..end {
                gid_lut[gid as usize] = i as u16;
            }
        }

        Self { tilesets, gid_lut }
    }

    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(&TilesetInfo, u32)> {
        let clean = gid.clean() as usize;
        if clean >= self.gid_lut.len() {
            return None;
        }
        let idx = self.gid_lut[clean];
        if idx == u16::MAX {
            return None;
        }
        let ts = &self.tilesets[idx as usize];
        Some((ts, gid.clean() - ts.first_gid))
    }
}

impl TileImageSource for TilesetImages {
    type Image = RgbaImage;
    type Scaled = Texture2D;

    fn unscaled(&self, gid: TileId) -> Option<RgbaImage> {
        let (ts, local) = self.ts_for_gid(gid)?;
        let (sx, sy, w, h) = ts.source_rect(local);
        if sx + w > ts.atlas.width() || sy + h > ts.atlas.height() {
            return None;
        }
        Some(imageops::crop_imm(&ts.atlas, sx, sy, w, h).to_image())
    }

    fn scale(&self, image: &RgbaImage, width: u32, height: u32) -> Texture2D {
        let resized = imageops::resize(image, width, height, FilterType::Nearest);
        let tex = Texture2D::from_rgba8(width as u16, height as u16, resized.as_raw());
        tex.set_filter(FilterMode::Nearest);
        tex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn atlas() -> TilesetInfo {
        // 2x2 grid of 4px tiles, 1px margin and spacing; each tile a distinct colour
        let mut img = RgbaImage::new(11, 11);
        for (i, (cx, cy)) in [(1, 1), (6, 1), (1, 6), (6, 6)].into_iter().enumerate() {
            for y in cy..cy + 4 {
                for x in cx..cx + 4 {
                    img.put_pixel(x, y, Rgba([i as u8 * 60, 0, 0, 255]));
                }
            }
        }
        TilesetInfo {
            first_gid: 10,
            tilecount: 4,
            cols: 2,
            atlas: img,
            tile_w: 4,
            tile_h: 4,
            spacing: 1,
            margin: 1,
        }
    }

    #[test]
    fn gid_lookup_maps_to_local_index() {
        let images = TilesetImages::from_tilesets(vec![atlas()]);
        assert!(images.ts_for_gid(TileId(9)).is_none());
        assert_eq!(images.ts_for_gid(TileId(12)).map(|(_, l)| l), Some(2));
        assert!(images.ts_for_gid(TileId(14)).is_none());
    }

    #[test]
    fn unscaled_crops_with_margin_and_spacing() {
        let images = TilesetImages::from_tilesets(vec![atlas()]);
        let tile = images.unscaled(TileId(13)).expect("tile");
        assert_eq!(tile.dimensions(), (4, 4));
        assert!(tile.pixels().all(|p| p.0 == [180, 0, 0, 255]));
    }
}
