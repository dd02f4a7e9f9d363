//! Translation from winit events into engine [`InputEvent`]s.
//!
//! Window creation and cursor grabbing stay with the caller; this module only
//! maps the events the camera cares about.

use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::input::InputEvent;

/// Pixel scroll deltas (touchpads) are converted to lines with this factor.
pub const PIXELS_PER_LINE: f32 = 20.0;

/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
            PhysicalKey::Code(code) => Some(InputEvent::Key {
                code,
                pressed: event.state == ElementState::Pressed,
            }),
            PhysicalKey::Unidentified(_) => None,
        },
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
            dy: scroll_lines(delta),
        }),
        WindowEvent::Focused(focused) => Some(InputEvent::Focused(*focused)),
        WindowEvent::Resized(size) => Some(InputEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        _ => None,
    }
}

pub fn translate_device_event(event: &DeviceEvent) -> Option<InputEvent> {
    match event {
        DeviceEvent::MouseMotion { delta } => Some(InputEvent::MouseMotion {
            dx: delta.0 as f32,
            dy: delta.1 as f32,
        }),
        _ => None,
    }
}

pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn test_scroll_lines() {
        assert_eq!(scroll_lines(&MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        assert_eq!(
            scroll_lines(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0))),
            -2.0
        );
    }

    #[test]
    fn test_window_events() {
        assert_eq!(
            translate_window_event(&WindowEvent::CloseRequested),
            Some(InputEvent::CloseRequested)
        );
        assert_eq!(
            translate_window_event(&WindowEvent::Focused(false)),
            Some(InputEvent::Focused(false))
        );
        assert_eq!(
            translate_window_event(&WindowEvent::Resized(PhysicalSize::new(800, 600))),
            Some(InputEvent::Resized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(translate_window_event(&WindowEvent::RedrawRequested), None);
    }

    #[test]
    fn test_device_events() {
        assert_eq!(
            translate_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -1.5) }),
            Some(InputEvent::MouseMotion { dx: 3.0, dy: -1.5 })
        );
        assert_eq!(translate_device_event(&DeviceEvent::Added), None);
    }
}
