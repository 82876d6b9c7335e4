use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta},
    keyboard::{Key, NamedKey},
};

use crate::camera::{Axis, Direction, Preset};

/// What a key press asks the scene to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SelectPreset(Preset),
    Move(Direction),
    Rotate(Axis, f32),
    /// roll one step about the back axis; `true` is counter-clockwise
    Roll(bool),
    LevelHorizon,
    ToggleGrid,
    ToggleAnimation,
    ToggleTigerEye,
    ToggleTigerFollow,
    ZoomIn,
    ZoomOut,
    Exit,
}

/// Keyboard bindings. Letters are matched case-insensitively.
pub fn command_for_key(key: &Key) -> Option<Command> {
    let ch = match key {
        Key::Named(NamedKey::Escape) => return Some(Command::Exit),
        Key::Named(NamedKey::Space) => return Some(Command::Move(Direction::Up)),
        Key::Character(text) => text.chars().next()?.to_ascii_lowercase(),
        _ => return None,
    };
    let command = match ch {
        'f' => Command::ToggleGrid,
        '1' => Command::SelectPreset(Preset::Original),
        '2' => Command::SelectPreset(Preset::Bistro),
        '3' => Command::SelectPreset(Preset::Tree),
        '4' => Command::SelectPreset(Preset::Top),
        '5' => Command::SelectPreset(Preset::Front),
        '6' => Command::SelectPreset(Preset::Side),
        'u' => Command::SelectPreset(Preset::GateToTree),
        'i' => Command::SelectPreset(Preset::Gallery),
        'o' => Command::SelectPreset(Preset::StoreSide),
        'p' => Command::SelectPreset(Preset::ReversedTreeGate),
        'a' => Command::SelectPreset(Preset::User),
        's' => Command::Move(Direction::Forward),
        'x' => Command::Move(Direction::Backward),
        'z' => Command::Move(Direction::Left),
        'c' => Command::Move(Direction::Right),
        ' ' => Command::Move(Direction::Up),
        'v' => Command::Move(Direction::Down),
        'q' => Command::Roll(true),
        'e' => Command::Roll(false),
        'r' => Command::LevelHorizon,
        'l' => Command::ToggleAnimation,
        't' => Command::ToggleTigerEye,
        'g' => Command::ToggleTigerFollow,
        _ => return None,
    };
    Some(command)
}

pub const KEY_HELP: &[&str] = &[
    "'f' : draw x, y, z axes and grid",
    "'1'-'6', 'u', 'i', 'o', 'p', 'a' : camera presets",
    "'s'/'x' : forward/back, 'z'/'c' : left/right, space/'v' : up/down",
    "'q'/'e' : roll, 'r' : level the horizon",
    "'l' : pause/resume the tiger, 't' : tiger eye view, 'g' : follow the tiger",
    "left drag : turn, right drag : tilt, ctrl + wheel : zoom",
    "'ESC' : close",
];

/// Mouse buttons, modifiers and last cursor position, turned into camera commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointer {
    left: bool,
    right: bool,
    shift: bool,
    ctrl: bool,
    last: Option<(f64, f64)>,
}

impl Pointer {
    pub fn set_modifiers(&mut self, shift: bool, ctrl: bool) {
        self.shift = shift;
        self.ctrl = ctrl;
    }

    pub fn button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            _ => (),
        }
    }

    /// Rotations in units of drag pixels; the caller scales them by the rotate speed.
    pub fn moved(&mut self, x: f64, y: f64) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some((prev_x, prev_y)) = self.last {
            if self.left && !self.shift && x != prev_x {
                commands.push(Command::Rotate(Axis::V, (prev_x - x) as f32));
            }
            if self.right && y != prev_y {
                commands.push(Command::Rotate(Axis::U, (prev_y - y) as f32));
            }
        }
        self.last = Some((x, y));
        commands
    }

    /// Wheel only zooms while ctrl is held; scrolling up narrows the view.
    pub fn wheel(&self, delta: MouseScrollDelta) -> Option<Command> {
        if !self.ctrl {
            return None;
        }
        let dy = match delta {
            MouseScrollDelta::LineDelta(_, dy) => f64::from(dy),
            MouseScrollDelta::PixelDelta(position) => position.y,
        };
        if dy > 0.0 {
            Some(Command::ZoomIn)
        } else if dy < 0.0 {
            Some(Command::ZoomOut)
        } else {
            None
        }
    }
}
