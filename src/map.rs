use crate::collision::{CollisionIndex, CollisionReport};
use crate::loader::descriptor::{CollisionDescriptor, ZoneList};
use crate::render::cull::{on_screen, visible_tile_range};
use crate::render::tile_cache::{TileImageCache, TileImageSource};
use crate::render::tileset::TilesetImages;
use crate::spatial::{TileCoord, TileId};
use crate::teleport::{TeleportRegistry, ZoneShape};
use crate::tile_grid::TileGrid;
use anyhow::Context;
use macroquad::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Everything that belongs to one loaded map. Replaced as a whole on
/// teleport, never patched in place.
pub struct MapInstance<S: TileImageSource> {
    id: String,
    grid: TileGrid,
    collision: CollisionIndex,
    teleports: TeleportRegistry,
    images: S,
    cache: TileImageCache<S::Scaled>,
}

impl MapInstance<TilesetImages> {
    /// Loads the Tiled map at `id` and builds its collision set and
    /// teleporters from `descriptor`, followed by the zones of `extra_zones`.
    pub fn load(
        id: &str,
        descriptor: &CollisionDescriptor,
        extra_zones: Option<&ZoneList>,
    ) -> anyhow::Result<Self> {
        let grid = TileGrid::load(Path::new(id)).with_context(|| format!("Loading map {id}"))?;
        let images = TilesetImages::load(grid.tilesets())
            .with_context(|| format!("Loading tilesets of map {id}"))?;

        let collidable: HashSet<String> = descriptor.layers.iter().cloned().collect();
        let (collision, report) = CollisionIndex::build(&grid, &collidable);

        let mut teleports = TeleportRegistry::from_descriptor(descriptor);
        if let Some(zones) = extra_zones {
            teleports.merge(TeleportRegistry::from_zone_list(zones));
        }

        info!(
            map = id,
            width = grid.width(),
            height = grid.height(),
            blocking = report.total(),
            teleporters = teleports.len(),
            teleporters_layer = %descriptor.teleporters_layer,
            "map loaded"
        );

        Ok(Self::new(id, grid, collision, teleports, images))
    }
}

impl<S: TileImageSource> MapInstance<S> {
    pub fn new(
        id: impl Into<String>,
        grid: TileGrid,
        collision: CollisionIndex,
        teleports: TeleportRegistry,
        images: S,
    ) -> Self {
        let cache = TileImageCache::new(grid.tile_width(), grid.tile_height());
        Self {
            id: id.into(),
            grid,
            collision,
            teleports,
            images,
            cache,
        }
    }

    /// Builds the collision set from `collidable` layer names of `grid`.
    pub fn with_collidable_layers(
        id: impl Into<String>,
        grid: TileGrid,
        collidable: &HashSet<String>,
        teleports: TeleportRegistry,
        images: S,
    ) -> (Self, CollisionReport) {
        let (collision, report) = CollisionIndex::build(&grid, collidable);
        (Self::new(id, grid, collision, teleports, images), report)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn collision(&self) -> &CollisionIndex {
        &self.collision
    }

    pub fn teleports(&self) -> &TeleportRegistry {
        &self.teleports
    }

    #[inline]
    pub fn in_bounds(&self, c: TileCoord) -> bool {
        self.grid.in_bounds(c)
    }

    #[inline]
    pub fn is_blocked(&self, c: TileCoord) -> bool {
        self.collision.is_blocked(c)
    }

    /// `preferred` if it lies on the map and is not blocked, otherwise the
    /// first free tile in row-major order, otherwise the origin.
    pub fn find_valid_spawn(&self, preferred: TileCoord) -> TileCoord {
        if self.in_bounds(preferred) && !self.is_blocked(preferred) {
            return preferred;
        }
        debug!(%preferred, "preferred spawn is blocked or off the map");

        let (w, h) = (self.grid.width() as i32, self.grid.height() as i32);
        for y in 0..h {
            for x in 0..w {
                let c = TileCoord::new(x, y);
                if !self.is_blocked(c) {
                    debug!(spawn = %c, "free spawn found");
                    return c;
                }
            }
        }
        debug!("no free tile on the map, spawning at the origin");
        TileCoord::default()
    }

    /// Scaled image of `gid` at `zoom`, from the cache when possible.
    pub fn scaled_tile(&mut self, gid: TileId, zoom: f32) -> Option<S::Scaled> {
        self.cache.get_scaled(&self.images, gid, zoom)
    }

    pub fn invalidate_tile_cache(&mut self) {
        self.cache.invalidate_all();
    }

    pub fn cached_tiles(&self) -> usize {
        self.cache.len()
    }

    /// Scaled tile size in pixels.
    #[inline]
    pub fn tile_px(&self, zoom: f32) -> Vec2 {
        vec2(
            self.grid.tile_width() as f32 * zoom,
            self.grid.tile_height() as f32 * zoom,
        )
    }

    /// Requests the scaled image of every tile in view, layer by layer, and
    /// hands each one to `draw` with its screen position.
    pub fn for_each_visible_tile(
        &mut self,
        camera: Vec2,
        viewport: Vec2,
        zoom: f32,
        mut draw: impl FnMut(&S::Scaled, Vec2),
    ) {
        let tile_px = self.tile_px(zoom);
        let range = visible_tile_range(
            camera,
            viewport,
            tile_px,
            self.grid.width(),
            self.grid.height(),
        );
        if range.is_empty() {
            return;
        }

        // borrow the grid and the cache separately
        let Self {
            grid, images, cache, ..
        } = self;
        for layer in grid.visible_tile_layers() {
            for row in range.rows.clone() {
                for col in range.cols.clone() {
                    let gid = layer.tile_at(col as usize, row as usize);
                    if gid.is_empty() {
                        continue;
                    }
                    if let Some(img) = cache.get_scaled(images, gid, zoom) {
                        let pos = vec2(col as f32 * tile_px.x, row as f32 * tile_px.y) - camera;
                        draw(&img, pos);
                    }
                }
            }
        }
    }
}

impl<S: TileImageSource<Scaled = Texture2D>> MapInstance<S> {
    pub fn draw_visible(&mut self, camera: Vec2, viewport: Vec2, zoom: f32) {
        self.for_each_visible_tile(camera, viewport, zoom, |tex, pos| {
            draw_texture(tex, pos.x, pos.y, WHITE);
        });
    }

    /// Red outline on every blocking tile.
    pub fn draw_collision_overlay(&self, camera: Vec2, viewport: Vec2, zoom: f32) {
        let size = self.tile_px(zoom);
        for c in self.collision.iter() {
            let pos = c.as_vec2() * size - camera;
            if on_screen(pos, size, viewport) {
                draw_rectangle_lines(pos.x, pos.y, size.x, size.y, 2.0, RED);
            }
        }
    }

    /// Blue outline on every teleport zone.
    pub fn draw_teleport_overlay(&self, camera: Vec2, viewport: Vec2, zoom: f32) {
        let tile = self.tile_px(zoom);
        for zone in self.teleports.zones() {
            match &zone.shape {
                ZoneShape::Rectangle {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let pos = vec2(*x as f32, *y as f32) * tile - camera;
                    let size = vec2(*width as f32, *height as f32) * tile;
                    if on_screen(pos, size, viewport) {
                        draw_rectangle_lines(pos.x, pos.y, size.x, size.y, 2.0, BLUE);
                    }
                }
                ZoneShape::CoordinateSet(tiles) => {
                    for c in tiles {
                        let pos = c.as_vec2() * tile - camera;
                        if on_screen(pos, tile, viewport) {
                            draw_rectangle_lines(pos.x, pos.y, tile.x, tile.y, 2.0, BLUE);
                        }
                    }
                }
            }
        }
    }
}
