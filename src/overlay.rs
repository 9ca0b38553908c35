use winit::window::Window;

/// egui FPS readout drawn over the scene
pub struct FpsOverlay {
    renderer: egui_wgpu::Renderer,
    state: egui_winit::State,
    ctx: egui::Context,
}

impl FpsOverlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            renderer,
            state,
            ctx,
        }
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Record the overlay into `encoder`, loading whatever is already in `view`
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        window: &Window,
        fps: f32,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("FPS")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0}", fps))
                            .size(48.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.label(egui::RichText::new("FPS").size(12.0).color(egui::Color32::GRAY));
                });
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, self.ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [window.inner_size().width, window.inner_size().height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // egui-wgpu wants a 'static pass; forget_lifetime ties it to the encoder at runtime
            let mut render_pass = render_pass.forget_lifetime();
            self.renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
