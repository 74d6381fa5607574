use winit::keyboard::KeyCode;

use crate::{camera::Movement, config::DemoVariant};

/// One-shot actions triggered by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Exit,
    Reset,
    DumpDepthMap,
    /// Moves the Cornell camera eye by this many steps on x and y
    MoveEye { x: i8, y: i8 },
    /// Moves the Cornell light by this many steps on z
    MoveLight { z: i8 },
}

/// Keyboard state for one demo variant.
#[derive(Debug, Clone)]
pub struct Input {
    variant: DemoVariant,
    movement: Movement,
}

impl Input {
    pub fn new(variant: DemoVariant) -> Self {
        Self {
            variant,
            movement: Movement::default(),
        }
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Records a key transition. Returns the action for a fresh press.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<Action> {
        if self.variant == DemoVariant::Wonderland && self.set_held(key, pressed) {
            return None;
        }

        if !pressed {
            return None;
        }

        match (self.variant, key) {
            (_, KeyCode::Escape | KeyCode::KeyR | KeyCode::Space) if repeat => None,
            (_, KeyCode::Escape) => Some(Action::Exit),
            (_, KeyCode::KeyR) => Some(Action::Reset),
            (_, KeyCode::Space) => Some(Action::DumpDepthMap),
            // Cornell steps follow key repeat
            (DemoVariant::CornellWindow, key) => cornell_action(key),
            (DemoVariant::Wonderland, _) => None,
        }
    }

    /// Forgets held keys, used when the window loses focus.
    pub fn release_all(&mut self) {
        self.movement = Movement::default();
    }

    fn set_held(&mut self, key: KeyCode, pressed: bool) -> bool {
        let held = match key {
            KeyCode::KeyW => &mut self.movement.forward,
            KeyCode::KeyS => &mut self.movement.back,
            KeyCode::KeyA => &mut self.movement.left,
            KeyCode::KeyD => &mut self.movement.right,
            _ => return false,
        };
        *held = pressed;
        true
    }
}

fn cornell_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::ArrowLeft => Some(Action::MoveEye { x: -1, y: 0 }),
        KeyCode::ArrowRight => Some(Action::MoveEye { x: 1, y: 0 }),
        KeyCode::ArrowUp => Some(Action::MoveEye { x: 0, y: 1 }),
        KeyCode::ArrowDown => Some(Action::MoveEye { x: 0, y: -1 }),
        // W pushes the light away from the viewer
        KeyCode::KeyW => Some(Action::MoveLight { z: -1 }),
        KeyCode::KeyS => Some(Action::MoveLight { z: 1 }),
        _ => None,
    }
}
