use std::sync::Arc;
use winit::window::Window as WinitWindow;

use crate::renderer::SceneRenderer;
use crate::scene::SceneState;

/// Wrapper around winit Window with imperative draw API
pub struct Window {
    inner: Arc<WinitWindow>,
}

impl Window {
    pub fn new(window: Arc<WinitWindow>) -> Self {
        Self { inner: window }
    }

    pub fn inner(&self) -> &Arc<WinitWindow> {
        &self.inner
    }

    /// Draw the scene as it stands after this frame's update
    pub fn draw(
        &self,
        renderer: &mut SceneRenderer,
        scene: &SceneState,
        fps: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        renderer.render(scene, &self.inner, fps)
    }

    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }
}
