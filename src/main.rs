use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, warn};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowId},
};

use model_carousel::cli::Cli;
use model_carousel::core::PointerAdapter;
use model_carousel::frame::{FpsCounter, FrameClock};
use model_carousel::loaders::load_model_file;
use model_carousel::renderer::SceneRenderer;
use model_carousel::scene::{orbit, LoadOutcome, SceneState};
use model_carousel::window::Window;

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;

/// Events sent to the event loop from outside it
#[derive(Debug)]
enum AppEvent {
    ModelLoaded(LoadOutcome),
}

struct App {
    cli: Cli,
    window: Option<Window>,
    renderer: Option<SceneRenderer>,
    scene: SceneState,
    pointer: PointerAdapter,
    clock: FrameClock,
    fps: FpsCounter,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            renderer: None,
            scene: SceneState::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT),
            pointer: PointerAdapter::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame = self.clock.tick();
        if let Some(fps) = self.fps.record(frame.delta) {
            debug!("Frame {}: {:.1} FPS", frame.number, fps);
        }

        self.scene.tick(frame.time);

        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        match window.draw(renderer, &self.scene, self.fps.fps()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WinitWindow::default_attributes()
                .with_title("Model Carousel")
                .with_transparent(true)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(SceneRenderer::new(window.clone(), self.cli.show_fps)) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = renderer.size();
        self.scene.resize(width, height);
        self.window = Some(Window::new(window));
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window.inner(), &event) {
                return;
            }
        }

        if let Some(pointer_event) = self.pointer.process_event(&event) {
            self.scene.handle_pointer(pointer_event);
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::ModelLoaded(outcome) => {
                if self.scene.apply_load(outcome) {
                    info!("Scene ready: {} cards", self.scene.cards.len());
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Load the model off the event loop thread and post the outcome back
fn spawn_loader(cli: &Cli, proxy: EventLoopProxy<AppEvent>) {
    let path = cli.model_path();

    std::thread::spawn(move || {
        info!("Loading {}", path.display());
        let outcome = LoadOutcome::from(load_model_file(&path));
        if proxy.send_event(AppEvent::ModelLoaded(outcome)).is_err() {
            warn!("Event loop closed before the model finished loading");
        }
    });
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(time) = cli.dump_layout {
        println!("{}", serde_json::to_string_pretty(&orbit::snapshot_at(time))?);
        return Ok(());
    }

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    spawn_loader(&cli, event_loop.create_proxy());

    let mut app = App::new(cli);
    info!("Model Carousel - drag to rotate, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
