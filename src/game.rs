//! Per-frame orchestration: input → collision check → motion → teleport.

use std::path::PathBuf;

use anyhow::Context;
use macroquad::prelude::*;
use tracing::{debug, info};

use crate::animation::{sprite_placement, DirectionFrames};
use crate::config::{clamp_zoom, GameConfig, ZOOM_STEP};
use crate::input::Command;
use crate::loader::descriptor::{load_collision_descriptor, load_zone_list};
use crate::map::MapInstance;
use crate::player::{Direction, PlayerMotion};
use crate::render::tile_cache::TileImageSource;
use crate::render::tileset::TilesetImages;
use crate::spatial::TileCoord;

/// Produces a fresh `MapInstance` for a map identifier.
pub trait MapLoader {
    type Images: TileImageSource;

    fn load(&mut self, map_id: &str) -> anyhow::Result<MapInstance<Self::Images>>;
}

/// Loads Tiled JSON maps from disk. The descriptor files are re-read on
/// every load.
#[derive(Debug, Clone)]
pub struct FileMapLoader {
    pub descriptor: PathBuf,
    pub zones: Option<PathBuf>,
}

impl FileMapLoader {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            descriptor: cfg.descriptor.clone(),
            zones: cfg.zones.clone().filter(|p| p.exists()),
        }
    }
}

impl MapLoader for FileMapLoader {
    type Images = TilesetImages;

    fn load(&mut self, map_id: &str) -> anyhow::Result<MapInstance<TilesetImages>> {
        let descriptor = load_collision_descriptor(&self.descriptor)?;
        let zones = self.zones.as_deref().map(load_zone_list).transpose()?;
        MapInstance::load(map_id, &descriptor, zones.as_ref())
    }
}

/// What happened to the movement request of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Started { from: TileCoord, to: TileCoord },
    OutOfBounds(TileCoord),
    Blocked(TileCoord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// `None` when there was no input or a step was already in flight.
    pub movement: Option<MoveOutcome>,
    /// Identifier of the map the player was teleported to.
    pub teleported_to: Option<String>,
}

/// View toggles and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub zoom: f32,
    pub sprite_scale: f32,
    pub collision_enabled: bool,
    pub show_teleporters: bool,
    pub show_collision_tiles: bool,
    pub center_sprite_vertically: bool,
}

impl ViewSettings {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            zoom: clamp_zoom(cfg.zoom),
            sprite_scale: cfg.sprite_scale,
            collision_enabled: true,
            show_teleporters: false,
            show_collision_tiles: cfg.show_collision_tiles,
            center_sprite_vertically: cfg.center_sprite_vertically,
        }
    }
}

pub struct Game<L: MapLoader> {
    loader: L,
    map: MapInstance<L::Images>,
    player: PlayerMotion,
    view: ViewSettings,
}

impl<L: MapLoader> Game<L> {
    /// Loads `start_map` and places the player on the first free tile
    /// closest in scan order to `cfg.preferred_spawn`.
    pub fn new(mut loader: L, start_map: &str, cfg: &GameConfig) -> anyhow::Result<Self> {
        let map = loader
            .load(start_map)
            .with_context(|| format!("Loading start map {start_map}"))?;
        let spawn = map.find_valid_spawn(cfg.spawn());
        info!(%spawn, "spawn validated");

        Ok(Self {
            loader,
            map,
            player: PlayerMotion::new(spawn, cfg.motion()),
            view: ViewSettings::from_config(cfg),
        })
    }

    pub fn map(&self) -> &MapInstance<L::Images> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapInstance<L::Images> {
        &mut self.map
    }

    pub fn player(&self) -> &PlayerMotion {
        &self.player
    }

    pub fn view(&self) -> ViewSettings {
        self.view
    }

    /// Applies a toggle/zoom command. `Quit` is left to the caller.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::ToggleCollision => {
                self.view.collision_enabled = !self.view.collision_enabled;
                debug!(enabled = self.view.collision_enabled, "collisions toggled");
            }
            Command::ToggleTeleporterOverlay => {
                self.view.show_teleporters = !self.view.show_teleporters;
                debug!(visible = self.view.show_teleporters, "teleporter overlay toggled");
            }
            Command::ZoomIn => self.set_zoom(self.view.zoom + ZOOM_STEP),
            Command::ZoomOut => self.set_zoom(self.view.zoom - ZOOM_STEP),
            Command::Quit => {}
        }
    }

    /// Changes the zoom and drops every scaled tile of the active map.
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = clamp_zoom(zoom);
        if zoom == self.view.zoom {
            return;
        }
        self.view.zoom = zoom;
        self.map.invalidate_tile_cache();
        debug!(zoom, "zoom changed");
    }

    /// One frame of game logic at time `now` (seconds).
    pub fn update(&mut self, input: IVec2, now: f64) -> anyhow::Result<FrameReport> {
        let mut report = FrameReport::default();

        if self.player.is_idle() {
            if let Some(direction) = Direction::from_vector(input) {
                report.movement = Some(self.try_step(direction, now));
            }
        }

        self.player.advance(now);

        let tile = self.player.tile();
        if let Some(zone) = self.map.teleports().find_zone_at(tile) {
            let target = zone.target_map.clone();
            let spawn = zone.target_spawn;
            self.teleport(&target, spawn)?;
            report.teleported_to = Some(target);
        }

        Ok(report)
    }

    fn try_step(&mut self, direction: Direction, now: f64) -> MoveOutcome {
        self.player.face(direction);
        let from = self.player.tile();
        let to = from.offset(direction.delta());

        if !self.map.in_bounds(to) {
            debug!(%to, "move rejected: outside the map");
            return MoveOutcome::OutOfBounds(to);
        }
        if self.view.collision_enabled && self.map.is_blocked(to) {
            debug!(%to, "move rejected: blocking tile");
            return MoveOutcome::Blocked(to);
        }

        debug!(%from, %to, "move accepted");
        self.player.start_step(direction, now);
        MoveOutcome::Started { from, to }
    }

    /// Swaps in `map_id` and puts the player on `spawn`. The old map is
    /// dropped only once the new one is in place.
    fn teleport(&mut self, map_id: &str, spawn: TileCoord) -> anyhow::Result<()> {
        let next = self
            .loader
            .load(map_id)
            .with_context(|| format!("Loading teleport target {map_id}"))?;
        let previous = std::mem::replace(&mut self.map, next);
        self.player.teleport_to(spawn);
        info!(from = previous.id(), to = map_id, %spawn, "player teleported");
        drop(previous);
        Ok(())
    }

    /// Top-left corner of the view in world pixels, centring the player.
    pub fn camera(&self, viewport: Vec2) -> Vec2 {
        self.player.position() * self.map.tile_px(self.view.zoom) - viewport / 2.0
    }
}

impl<L> Game<L>
where
    L: MapLoader,
    L::Images: TileImageSource<Scaled = Texture2D>,
{
    pub fn draw(&mut self, frames: &DirectionFrames<Texture2D>, now: f64) {
        let viewport = vec2(screen_width(), screen_height());
        let camera = self.camera(viewport);
        let zoom = self.view.zoom;

        self.map.draw_visible(camera, viewport, zoom);
        if self.view.show_collision_tiles {
            self.map.draw_collision_overlay(camera, viewport, zoom);
        }
        if self.view.show_teleporters {
            self.map.draw_teleport_overlay(camera, viewport, zoom);
        }

        if let Some(frame) = frames.current(&self.player, now) {
            let grid = self.map.grid();
            let placement = sprite_placement(
                self.player.position(),
                vec2(grid.tile_width() as f32, grid.tile_height() as f32),
                zoom,
                self.view.sprite_scale,
                camera,
                self.view.center_sprite_vertically,
            );
            draw_texture_ex(
                frame,
                placement.position.x,
                placement.position.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(placement.size),
                    ..Default::default()
                },
            );
        }

        let on_off = |flag: bool| if flag { "on" } else { "off" };
        draw_text(
            &format!(
                "{}  tile {}  zoom {:.1}  collisions {}  teleporters {}",
                self.map.id(),
                self.player.tile(),
                zoom,
                on_off(self.view.collision_enabled),
                on_off(self.view.show_teleporters),
            ),
            10.0,
            24.0,
            24.0,
            WHITE,
        );
    }
}
