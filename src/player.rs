//! Grid-stepping player motion.
//!
//! The player is either idle on an integer tile or stepping towards a
//! neighbouring one. A step always lasts `step_duration` seconds; the
//! position is interpolated linearly and snapped onto the target when the
//! step ends, so idle positions never carry float drift.

use std::fmt;

use macroquad::prelude::*;

use crate::spatial::TileCoord;

pub const DEFAULT_STEP_DURATION: f64 = 0.1;
/// Fraction of the walk cycle played during one step.
pub const DEFAULT_ANIM_SPEED: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => ivec2(0, -1),
            Direction::Down => ivec2(0, 1),
            Direction::Left => ivec2(-1, 0),
            Direction::Right => ivec2(1, 0),
        }
    }

    /// Direction of a discrete input vector. The vertical axis wins when
    /// both are set.
    pub fn from_vector(v: IVec2) -> Option<Self> {
        match (v.x.signum(), v.y.signum()) {
            (_, -1) => Some(Direction::Up),
            (_, 1) => Some(Direction::Down),
            (-1, _) => Some(Direction::Left),
            (1, _) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Asset folder name.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub start: Vec2,
    pub target: Vec2,
    pub started_at: f64,
    pub duration: f64,
}

impl Step {
    /// Share of the step elapsed at `now`, not clamped.
    #[inline]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (now - self.started_at) / self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    Idle,
    Stepping(Step),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub step_duration: f64,
    pub anim_speed: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_duration: DEFAULT_STEP_DURATION,
            anim_speed: DEFAULT_ANIM_SPEED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerMotion {
    position: Vec2,
    facing: Direction,
    state: MotionState,
    config: MotionConfig,
}

impl PlayerMotion {
    pub fn new(spawn: TileCoord, config: MotionConfig) -> Self {
        Self {
            position: spawn.as_vec2(),
            facing: Direction::Down,
            state: MotionState::Idle,
            config,
        }
    }

    #[inline] pub fn position(&self) -> Vec2 { self.position }
    #[inline] pub fn facing(&self) -> Direction { self.facing }
    #[inline] pub fn state(&self) -> MotionState { self.state }
    #[inline] pub fn config(&self) -> MotionConfig { self.config }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, MotionState::Idle)
    }

    /// Tile the player is (mostly) standing on.
    #[inline]
    pub fn tile(&self) -> TileCoord {
        TileCoord::round(self.position)
    }

    /// Turns in place. Ignored mid-step.
    pub fn face(&mut self, direction: Direction) {
        if self.is_idle() {
            self.facing = direction;
        }
    }

    /// Starts a one-tile step. Returns `false` and changes nothing when a
    /// step is already in flight.
    pub fn start_step(&mut self, direction: Direction, now: f64) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.facing = direction;
        self.state = MotionState::Stepping(Step {
            start: self.position,
            target: self.position + direction.delta().as_vec2(),
            started_at: now,
            duration: self.config.step_duration,
        });
        true
    }

    pub fn advance(&mut self, now: f64) {
        let MotionState::Stepping(step) = self.state else {
            return;
        };
        if now - step.started_at >= step.duration {
            self.position = step.target;
            self.state = MotionState::Idle;
        } else {
            let t = step.progress(now).clamp(0.0, 1.0) as f32;
            self.position = step.start.lerp(step.target, t);
        }
    }

    /// Puts the player on `spawn`, dropping any step in flight.
    pub fn teleport_to(&mut self, spawn: TileCoord) {
        self.position = spawn.as_vec2();
        self.state = MotionState::Idle;
    }

    /// Animation frame for a sequence of `frame_count` frames. With
    /// `anim_speed < 1` the last frames of the cycle are never shown.
    pub fn frame_index(&self, now: f64, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        match self.state {
            MotionState::Idle => 0,
            MotionState::Stepping(step) => {
                let ratio = step.progress(now).clamp(0.0, 1.0);
                let idx = (ratio * self.config.anim_speed * frame_count as f64).floor() as usize;
                idx.min(frame_count - 1)
            }
        }
    }
}
