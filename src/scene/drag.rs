use glam::Vec2;

use super::pivot::Pivot;

/// Radians of pivot rotation per pixel of pointer travel
pub const ROTATION_SPEED: f32 = 0.002;

/// Pointer input, already stripped of platform details
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Drag gesture in progress, if any
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    dragging: bool,
    previous: Vec2,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    pub fn press(&mut self, position: Vec2) {
        self.dragging = true;
        self.previous = position;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Rotate the pivot by the travel since the last position.
    ///
    /// Horizontal travel turns about Y, vertical travel about X. Rotation is
    /// unclamped. Without an active drag or a pivot nothing changes, not even
    /// the remembered position. Returns the applied delta.
    pub fn motion(&mut self, position: Vec2, pivot: Option<&mut Pivot>) -> Option<Vec2> {
        if !self.dragging {
            return None;
        }
        let pivot = pivot?;

        let delta = position - self.previous;
        pivot.rotation.y += delta.x * ROTATION_SPEED;
        pivot.rotation.x += delta.y * ROTATION_SPEED;
        self.previous = position;

        Some(delta)
    }

    pub fn handle(&mut self, event: PointerEvent, pivot: Option<&mut Pivot>) {
        match event {
            PointerEvent::Down(position) => self.press(position),
            PointerEvent::Move(position) => {
                self.motion(position, pivot);
            }
            PointerEvent::Up => self.release(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::ModelData;
    use crate::scene::pivot::Model;

    fn pivot() -> Pivot {
        Pivot::new(Model::prepare(ModelData::default()))
    }

    #[test]
    fn test_press_records_position() {
        let mut drag = DragState::new();
        drag.press(Vec2::new(10.0, 20.0));
        assert!(drag.is_dragging());
        assert_eq!(drag.previous(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_release_stops_drag() {
        let mut drag = DragState::new();
        drag.press(Vec2::ZERO);
        drag.release();
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_motion_rotates_pivot() {
        let mut drag = DragState::new();
        let mut pivot = pivot();

        drag.press(Vec2::new(100.0, 100.0));
        let delta = drag.motion(Vec2::new(150.0, 80.0), Some(&mut pivot));

        assert_eq!(delta, Some(Vec2::new(50.0, -20.0)));
        assert!((pivot.rotation.y - 0.1).abs() < 1e-6);
        assert!((pivot.rotation.x + 0.04).abs() < 1e-6);
        assert_eq!(pivot.rotation.z, 0.0);
        assert_eq!(drag.previous(), Vec2::new(150.0, 80.0));
    }

    #[test]
    fn test_motion_without_drag_is_ignored() {
        let mut drag = DragState::new();
        let mut pivot = pivot();

        assert_eq!(drag.motion(Vec2::new(50.0, 50.0), Some(&mut pivot)), None);
        assert_eq!(pivot.rotation, glam::Vec3::ZERO);
        assert_eq!(drag.previous(), Vec2::ZERO);
    }

    #[test]
    fn test_motion_without_pivot_keeps_previous() {
        let mut drag = DragState::new();
        drag.press(Vec2::new(1.0, 1.0));
        assert_eq!(drag.motion(Vec2::new(9.0, 9.0), None), None);
        assert_eq!(drag.previous(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_handle_dispatches_events() {
        let mut drag = DragState::new();
        let mut pivot = pivot();

        drag.handle(PointerEvent::Down(Vec2::ZERO), Some(&mut pivot));
        drag.handle(PointerEvent::Move(Vec2::new(500.0, 0.0)), Some(&mut pivot));
        drag.handle(PointerEvent::Up, Some(&mut pivot));
        drag.handle(PointerEvent::Move(Vec2::new(900.0, 0.0)), Some(&mut pivot));

        assert!((pivot.rotation.y - 1.0).abs() < 1e-6);
        assert!(!drag.is_dragging());
    }
}
