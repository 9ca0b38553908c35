//! Scene state and the per-frame update.
//!
//! All mutable state lives in [`SceneState`]; the event loop hands it pointer
//! events, resize events, the load outcome, and one `tick` per frame.

pub mod drag;
pub mod draw_list;
pub mod lights;
pub mod orbit;
pub mod pivot;

use glam::Vec3;
use log::{error, info};

use crate::camera::Camera;
use crate::loaders::ModelData;

pub use drag::{DragState, PointerEvent};
pub use draw_list::{build_draw_list, DrawItem, DrawState, DrawTarget};
pub use lights::Lights;
pub use orbit::{Card, CARD_COUNT};
pub use pivot::{Model, Pivot};

/// Result of the one-time asset load
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ModelData),
    Failed(anyhow::Error),
}

impl From<anyhow::Result<ModelData>> for LoadOutcome {
    fn from(result: anyhow::Result<ModelData>) -> Self {
        match result {
            Ok(model) => LoadOutcome::Loaded(model),
            Err(e) => LoadOutcome::Failed(e),
        }
    }
}

pub struct SceneState {
    pub camera: Camera,
    pub lights: Lights,
    pub pivot: Option<Pivot>,
    pub cards: Vec<Card>,
    pub drag: DragState,
    model_generation: u64,
}

impl SceneState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height),
            lights: Lights::default(),
            pivot: None,
            cards: Vec::new(),
            drag: DragState::new(),
            model_generation: 0,
        }
    }

    /// True once the model is in place and the cards exist
    pub fn is_loaded(&self) -> bool {
        self.pivot.is_some() && !self.cards.is_empty()
    }

    /// Bumped on every successful load; zero until the first one
    pub fn model_generation(&self) -> u64 {
        self.model_generation
    }

    /// Consume the load outcome. Returns whether a model is now in the scene.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        match outcome {
            LoadOutcome::Loaded(data) => {
                let model = Model::prepare(data);
                if let Some(bounds) = model.bounds() {
                    info!("Model centered, extent {:?}", bounds.size());
                }

                let pivot = Pivot::new(model);
                self.camera.look_at(pivot.position());
                self.pivot = Some(pivot);
                self.model_generation += 1;

                if self.cards.is_empty() {
                    self.cards = orbit::create_cards();
                }
                true
            }
            LoadOutcome::Failed(e) => {
                error!("Error loading model: {:#}", e);
                self.pivot.is_some()
            }
        }
    }

    /// Per-frame animation step; does nothing until the model is loaded
    pub fn tick(&mut self, time: f64) {
        if self.cards.is_empty() || self.pivot.is_none() {
            return;
        }
        orbit::update_cards(&mut self.cards, time);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.drag.handle(event, self.pivot.as_mut());
    }

    /// Track a new surface size; only the camera aspect changes
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn draw_list(&self) -> Vec<DrawItem> {
        build_draw_list(self)
    }

    /// Current pivot rotation, zero before load
    pub fn pivot_rotation(&self) -> Vec3 {
        self.pivot.as_ref().map(|p| p.rotation).unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_new_scene_is_empty() {
        let scene = SceneState::new(800, 600);
        assert!(!scene.is_loaded());
        assert!(scene.cards.is_empty());
        assert!(scene.draw_list().is_empty());
    }

    #[test]
    fn test_tick_before_load_is_noop() {
        let mut scene = SceneState::new(800, 600);
        scene.tick(123.0);
        assert!(scene.cards.is_empty());
        assert!(scene.pivot.is_none());
    }

    #[test]
    fn test_load_creates_pivot_and_cards() {
        let mut scene = SceneState::new(800, 600);
        assert!(scene.apply_load(LoadOutcome::Loaded(ModelData::default())));
        assert!(scene.is_loaded());
        assert_eq!(scene.cards.len(), CARD_COUNT);
        assert_eq!(scene.camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_failed_load_leaves_scene_empty() {
        let mut scene = SceneState::new(800, 600);
        let loaded = scene.apply_load(LoadOutcome::Failed(anyhow::anyhow!("missing file")));
        assert!(!loaded);
        assert!(!scene.is_loaded());

        scene.tick(10.0);
        assert!(scene.cards.is_empty());
    }

    #[test]
    fn test_second_load_keeps_card_batch() {
        let mut scene = SceneState::new(800, 600);
        scene.apply_load(LoadOutcome::Loaded(ModelData::default()));
        scene.tick(1.0);
        let cards = scene.cards.clone();

        scene.apply_load(LoadOutcome::Loaded(ModelData::default()));
        assert_eq!(scene.cards, cards);
    }

    #[test]
    fn test_each_load_starts_a_new_model_generation() {
        let mut scene = SceneState::new(800, 600);
        assert_eq!(scene.model_generation(), 0);

        scene.apply_load(LoadOutcome::Loaded(ModelData::default()));
        assert_eq!(scene.model_generation(), 1);

        scene.apply_load(LoadOutcome::Failed(anyhow::anyhow!("bad file")));
        assert_eq!(scene.model_generation(), 1);
        assert!(scene.is_loaded());

        scene.apply_load(LoadOutcome::Loaded(ModelData::default()));
        assert_eq!(scene.model_generation(), 2);
    }

    #[test]
    fn test_drag_before_load_records_press_only() {
        let mut scene = SceneState::new(800, 600);
        scene.handle_pointer(PointerEvent::Down(Vec2::new(5.0, 5.0)));
        scene.handle_pointer(PointerEvent::Move(Vec2::new(50.0, 5.0)));
        assert!(scene.drag.is_dragging());
        assert_eq!(scene.pivot_rotation(), Vec3::ZERO);
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: LoadOutcome = Ok(ModelData::default()).into();
        assert!(matches!(ok, LoadOutcome::Loaded(_)));

        let err: LoadOutcome = Err(anyhow::anyhow!("boom")).into();
        assert!(matches!(err, LoadOutcome::Failed(_)));
    }
}
