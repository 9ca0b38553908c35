use glam::Vec2;
use winit::event::{ElementState, WindowEvent};

use crate::scene::PointerEvent;

/// Adapter that bridges Winit events to pointer events
///
/// Winit reports button presses without a position, so the adapter remembers
/// the last cursor position and stamps it on presses.
#[derive(Debug, Clone, Default)]
pub struct PointerAdapter {
    /// Current cursor position (relative to window)
    cursor: Option<Vec2>,
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a window event; returns `None` for events that are not pointer input
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::MouseInput { state, .. } => Some(self.button(*state)),
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                None
            }
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> PointerEvent {
        let position = Vec2::new(x, y);
        self.cursor = Some(position);
        PointerEvent::Move(position)
    }

    /// Any mouse button starts or ends a drag
    pub fn button(&mut self, state: ElementState) -> PointerEvent {
        match state {
            ElementState::Pressed => PointerEvent::Down(self.cursor.unwrap_or(Vec2::ZERO)),
            ElementState::Released => PointerEvent::Up,
        }
    }
}
