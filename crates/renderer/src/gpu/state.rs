use anyhow::{anyhow, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};

use crate::binding::{ProgramBackend, ProgramBinding};
use crate::uniforms::UniformState;

use super::context::GpuContext;
use super::pipeline::QuadPipeline;

/// wgpu-backed [`ProgramBackend`] presenting straight to a window surface.
pub struct GpuBackend {
    context: GpuContext,
}

impl GpuBackend {
    pub fn new<T>(target: &T, size: (u32, u32)) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size)?;
        debug!(
            width = context.config.width,
            height = context.config.height,
            format = ?context.surface_format,
            "gpu backend ready"
        );
        Ok(Self { context })
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.context.size()
    }

    fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture> {
        match self.context.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                warn!(error = %err, "surface out of date; reconfiguring");
                self.context.reconfigure();
                Err(anyhow!("surface was reconfigured: {err}"))
            }
            Err(err) => Err(anyhow!("failed to acquire surface texture: {err}")),
        }
    }
}

impl ProgramBackend for GpuBackend {
    type Program = QuadPipeline;

    fn compile(&mut self, program: &ProgramBinding) -> Result<QuadPipeline> {
        QuadPipeline::new(&self.context.device, self.context.surface_format, program)
    }

    fn render(&mut self, program: &QuadPipeline, uniforms: &UniformState) -> Result<()> {
        program.write_uniforms(&self.context.queue, uniforms);

        let frame = self.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quad encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            program.record(&mut pass);
        }
        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
