use std::collections::HashMap;
use std::path::{Path, PathBuf};

use macroquad::prelude::{FilterMode, Texture2D, Vec2};
use tracing::{debug, error};

use crate::error::AssetLoadError;
use crate::player::{Direction, PlayerMotion};

pub const FRAMES_PER_DIRECTION: usize = 4;

/// `{root}/{direction}/{direction}_{index}.png`
pub fn frame_path(root: &Path, direction: Direction, index: usize) -> PathBuf {
    let name = direction.name();
    root.join(name).join(format!("{name}_{index}.png"))
}

/// Walk-cycle frames per facing direction. A direction may hold fewer than
/// `FRAMES_PER_DIRECTION` frames when some failed to load.
#[derive(Debug)]
pub struct DirectionFrames<T> {
    frames: HashMap<Direction, Vec<T>>,
}

impl DirectionFrames<Texture2D> {
    /// Loads every frame from disk. Needs a graphics context.
    pub fn load(root: &Path) -> Self {
        Self::load_with(root, load_frame_texture)
    }
}

impl<T> DirectionFrames<T> {
    /// Loads frames through `loader`; a frame that fails is logged and left
    /// out of its sequence.
    pub fn load_with(
        root: &Path,
        mut loader: impl FnMut(&Path) -> Result<T, AssetLoadError>,
    ) -> Self {
        let mut frames = HashMap::new();
        for direction in Direction::ALL {
            let mut seq = Vec::with_capacity(FRAMES_PER_DIRECTION);
            for i in 0..FRAMES_PER_DIRECTION {
                let path = frame_path(root, direction, i);
                match loader(&path) {
                    Ok(frame) => seq.push(frame),
                    Err(err) => error!("{err}"),
                }
            }
            debug!(%direction, frames = seq.len(), "animation loaded");
            frames.insert(direction, seq);
        }
        Self { frames }
    }

    pub fn frames(&self, direction: Direction) -> &[T] {
        self.frames.get(&direction).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frame to show for `player` at `now`.
    pub fn current(&self, player: &PlayerMotion, now: f64) -> Option<&T> {
        let seq = self.frames(player.facing());
        seq.get(player.frame_index(now, seq.len()))
    }
}

fn load_frame_texture(path: &Path) -> Result<Texture2D, AssetLoadError> {
    if !path.exists() {
        return Err(AssetLoadError::Missing(path.to_path_buf()));
    }
    let img = image::open(path)
        .map_err(|source| AssetLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let tex = Texture2D::from_rgba8(img.width() as u16, img.height() as u16, img.as_raw());
    tex.set_filter(FilterMode::Nearest);
    Ok(tex)
}

/// Where and how large the player sprite is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpritePlacement {
    pub position: Vec2,
    pub size: Vec2,
}

/// Sprite placement for a player standing at tile-space `position`. The
/// sprite is `tile * zoom * sprite_scale` pixels, truncated, and centred
/// horizontally on its tile; vertical centring is optional.
pub fn sprite_placement(
    position: Vec2,
    tile: Vec2,
    zoom: f32,
    sprite_scale: f32,
    camera: Vec2,
    center_vertically: bool,
) -> SpritePlacement {
    let tile_px = tile * zoom;
    let size = (tile * zoom * sprite_scale).trunc();
    let mut pos = position * tile_px - camera;
    pos.x -= (size.x - tile_px.x) / 2.0;
    if center_vertically {
        pos.y -= (size.y - tile_px.y) / 2.0;
    }
    SpritePlacement { position: pos, size }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MotionConfig;
    use crate::spatial::TileCoord;
    use macroquad::prelude::vec2;

    #[test]
    fn frame_paths_follow_the_asset_layout() {
        let p = frame_path(Path::new("assets/sprites"), Direction::Left, 2);
        assert_eq!(p, Path::new("assets/sprites/left/left_2.png"));
    }

    #[test]
    fn failed_frames_are_left_out() {
        let frames = DirectionFrames::load_with(Path::new("sprites"), |path| {
            if path.ends_with("up/up_1.png") || path.ends_with("up/up_3.png") {
                Err(AssetLoadError::Missing(path.to_path_buf()))
            } else {
                Ok(path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_owned())
            }
        });

        assert_eq!(frames.frames(Direction::Down).len(), 4);
        assert_eq!(frames.frames(Direction::Up), ["up_0.png", "up_2.png"]);
    }

    #[test]
    fn current_frame_clamps_to_short_sequences() {
        let frames = DirectionFrames::load_with(Path::new("s"), |path| {
            if path.ends_with("down/down_0.png") {
                Ok(0)
            } else if path.starts_with("s/down") {
                Err(AssetLoadError::Missing(path.to_path_buf()))
            } else {
                Ok(1)
            }
        });
        let config = MotionConfig {
            step_duration: 1.0,
            anim_speed: 4.0,
        };
        let mut player = PlayerMotion::new(TileCoord::new(0, 0), config);
        player.start_step(Direction::Down, 0.0);
        assert_eq!(frames.current(&player, 0.99), Some(&0));
    }

    #[test]
    fn sprite_is_centred_horizontally_only_by_default() {
        // 16px tiles, zoom 4, sprite scale 2 -> 128px sprite on a 64px tile
        let placement = sprite_placement(vec2(2.0, 1.0), vec2(16.0, 16.0), 4.0, 2.0, vec2(10.0, 20.0), false);
        assert_eq!(placement.size, vec2(128.0, 128.0));
        assert_eq!(placement.position, vec2(128.0 - 10.0 - 32.0, 64.0 - 20.0));

        let centred = sprite_placement(vec2(2.0, 1.0), vec2(16.0, 16.0), 4.0, 2.0, vec2(10.0, 20.0), true);
        assert_eq!(centred.position.y, 64.0 - 20.0 - 32.0);
    }
}
