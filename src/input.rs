//! Keyboard and gamepad input reduced to one discrete direction plus
//! toggle commands.
//!
//! The pure helpers (`keyboard_vector`, `stick_vector`, `merge_vectors`) hold
//! the mapping rules; `InputState` only polls devices.

use gilrs::{Axis, Button, EventType, Gilrs};
use macroquad::prelude::*;
use tracing::{debug, warn};

pub const DEFAULT_DEADZONE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleCollision,
    ToggleTeleporterOverlay,
    ZoomIn,
    ZoomOut,
    Quit,
}

/// Arrow keys, first match wins in the order left, right, up, down.
pub fn keyboard_vector(left: bool, right: bool, up: bool, down: bool) -> IVec2 {
    if left {
        ivec2(-1, 0)
    } else if right {
        ivec2(1, 0)
    } else if up {
        ivec2(0, -1)
    } else if down {
        ivec2(0, 1)
    } else {
        IVec2::ZERO
    }
}

/// Analog stick to a discrete vector; each axis is dead until it passes
/// `deadzone`. `y` grows downwards.
pub fn stick_vector(x: f32, y: f32, deadzone: f32) -> IVec2 {
    let axis = |v: f32| {
        if v < -deadzone {
            -1
        } else if v > deadzone {
            1
        } else {
            0
        }
    };
    ivec2(axis(x), axis(y))
}

/// Keyboard takes each axis it sets; the gamepad fills the others.
pub fn merge_vectors(keyboard: IVec2, gamepad: IVec2) -> IVec2 {
    ivec2(
        if keyboard.x != 0 { keyboard.x } else { gamepad.x },
        if keyboard.y != 0 { keyboard.y } else { gamepad.y },
    )
}

/// Device polling. The gamepad is optional: without gilrs support the game
/// runs on the keyboard alone.
pub struct InputState {
    gilrs: Option<Gilrs>,
    deadzone: f32,
}

impl InputState {
    pub fn new(deadzone: f32) -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                for (_, pad) in g.gamepads() {
                    debug!(name = pad.name(), "gamepad detected");
                }
                Some(g)
            }
            Err(err) => {
                warn!("gamepad support unavailable: {err}");
                None
            }
        };
        Self { gilrs, deadzone }
    }

    /// Drains pending device events and returns this frame's commands.
    pub fn poll_commands(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();

        if is_key_pressed(KeyCode::Escape) {
            commands.push(Command::Quit);
        }
        if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            commands.push(Command::ZoomIn);
        }
        if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            commands.push(Command::ZoomOut);
        }
        if is_key_pressed(KeyCode::C) {
            commands.push(Command::ToggleCollision);
        }
        if is_key_pressed(KeyCode::T) {
            commands.push(Command::ToggleTeleporterOverlay);
        }

        if let Some(gilrs) = self.gilrs.as_mut() {
            while let Some(event) = gilrs.next_event() {
                if let EventType::ButtonPressed(Button::South, _) = event.event {
                    commands.push(Command::ToggleCollision);
                }
            }
        }

        commands
    }

    /// Direction vector for this frame.
    pub fn direction(&self) -> IVec2 {
        let keyboard = keyboard_vector(
            is_key_down(KeyCode::Left),
            is_key_down(KeyCode::Right),
            is_key_down(KeyCode::Up),
            is_key_down(KeyCode::Down),
        );
        merge_vectors(keyboard, self.gamepad_vector())
    }

    fn gamepad_vector(&self) -> IVec2 {
        let Some(gilrs) = self.gilrs.as_ref() else {
            return IVec2::ZERO;
        };
        match gilrs.gamepads().next() {
            // gilrs reports stick Y growing upwards
            Some((_, pad)) => stick_vector(
                pad.value(Axis::LeftStickX),
                -pad.value(Axis::LeftStickY),
                self.deadzone,
            ),
            None => IVec2::ZERO,
        }
    }
}
