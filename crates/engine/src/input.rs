use crate::prelude::*;

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Platform-independent input event, produced by the window layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    /// Absolute cursor position in window pixels
    CursorMoved { x: f32, y: f32 },
    /// Raw relative mouse motion, unaffected by cursor clamping
    MouseMotion { dx: f32, dy: f32 },
    /// Vertical scroll in lines, positive away from the user
    Scroll { dy: f32 },
    Focused(bool),
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Which pointer events drive mouse look.
///
/// Windowing systems report both absolute cursor positions and raw motion;
/// only one of them may feed the camera or the delta is counted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Cursor,
    RawMotion,
}

/// Resource that tracks keyboard and mouse input state
#[derive(Resource, Debug, Default)]
pub struct InputState {
    /// Currently pressed keys
    pub keys_pressed: HashSet<KeyCode>,
    /// Mouse delta accumulated this frame (x, y)
    pub mouse_delta: (f32, f32),
    /// Scroll accumulated this frame, in lines
    pub scroll_delta: f32,
    /// Last cursor sample, `None` until the first sample after activation
    pub last_cursor: Option<(f32, f32)>,
    pub pointer_source: PointerSource,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pointer_source(pointer_source: PointerSource) -> Self {
        Self {
            pointer_source,
            ..Default::default()
        }
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Reset per-frame state (call once the frame's input has been consumed)
    pub fn reset_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.keys_pressed.insert(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_pressed.remove(&key);
    }

    /// Record an absolute cursor sample.
    ///
    /// The first sample only establishes a baseline so the camera does not
    /// jump by the distance between the window origin and the cursor.
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        if let Some((previous_x, previous_y)) = self.last_cursor {
            self.add_mouse_delta(x - previous_x, y - previous_y);
        }
        self.last_cursor = Some((x, y));
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn add_scroll(&mut self, dy: f32) {
        self.scroll_delta += dy;
    }

    /// Forget held keys and the cursor baseline, e.g. when the window loses focus
    pub fn deactivate(&mut self) {
        self.keys_pressed.clear();
        self.last_cursor = None;
        self.reset_frame();
    }

    pub fn apply_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key { code, pressed } => {
                if pressed {
                    self.press_key(code);
                } else {
                    self.release_key(code);
                }
            }
            InputEvent::CursorMoved { x, y } => {
                if self.pointer_source == PointerSource::Cursor {
                    self.cursor_moved(x, y);
                }
            }
            InputEvent::MouseMotion { dx, dy } => {
                if self.pointer_source == PointerSource::RawMotion {
                    self.add_mouse_delta(dx, dy);
                }
            }
            InputEvent::Scroll { dy } => self.add_scroll(dy),
            InputEvent::Focused(true) => self.last_cursor = None,
            InputEvent::Focused(false) => self.deactivate(),
            InputEvent::Resized { .. } | InputEvent::CloseRequested => {}
        }
    }
}

/// Keyboard layout for camera movement
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    movement: Vec<(KeyCode, Movement)>,
    quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            movement: vec![
                (KeyCode::KeyW, Movement::Forward),
                (KeyCode::KeyS, Movement::Backward),
                (KeyCode::KeyA, Movement::Left),
                (KeyCode::KeyD, Movement::Right),
                (KeyCode::KeyQ, Movement::Up),
                (KeyCode::KeyE, Movement::Down),
            ],
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    /// Bind `key` to `movement`, replacing any previous binding of that key
    pub fn bind(mut self, key: KeyCode, movement: Movement) -> Self {
        self.movement.retain(|(bound, _)| *bound != key);
        self.movement.push((key, movement));
        self
    }

    pub fn with_quit(mut self, key: KeyCode) -> Self {
        self.quit = key;
        self
    }

    pub fn movement_for(&self, key: KeyCode) -> Option<Movement> {
        self.movement
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, movement)| *movement)
    }

    pub fn is_quit(&self, key: KeyCode) -> bool {
        self.quit == key
    }

    /// Movements whose keys are held, in binding order
    pub fn held_movements<'a>(
        &'a self,
        input: &'a InputState,
    ) -> impl Iterator<Item = Movement> + 'a {
        self.movement
            .iter()
            .filter(|(key, _)| input.is_key_pressed(*key))
            .map(|(_, movement)| *movement)
    }
}
