//! One viewing session: configuration snapshot, shader registry, render loop,
//! program binding and the frame scheduler they share.

use scheduler::{FrameQueue, FrameScheduler, FrameTicket};
use shaders::{RegistryError, ShaderRegistry};
use tracing::{error, info, warn};
use viewconfig::{ViewerConfig, DEFAULT_SHADER};

use crate::binding::{BindingError, ProgramBackend, ShaderBinding};
use crate::controller::{RenderLoop, RunState, TickOutcome};
use crate::runtime::{Clock, SystemClock};
use crate::uniforms::{default_decls, UniformState};

pub struct Viewer<B: ProgramBackend, C: Clock = SystemClock, S: FrameScheduler = FrameQueue> {
    config: ViewerConfig,
    viewport: (u32, u32),
    registry: ShaderRegistry,
    controller: RenderLoop<C>,
    binding: ShaderBinding<B>,
    scheduler: S,
}

impl<B: ProgramBackend, C: Clock, S: FrameScheduler> Viewer<B, C, S> {
    /// Builds the session, draws the first frame and auto-starts if configured.
    ///
    /// An unknown configured shader falls back to the default one; failing
    /// that, construction fails.
    pub fn new(
        config: ViewerConfig,
        viewport: (u32, u32),
        registry: ShaderRegistry,
        backend: B,
        clock: C,
        scheduler: S,
    ) -> Result<Self, BindingError> {
        let resolution = config.render_size(viewport);
        let requested = config.shader_or_default();
        let name = if registry.contains(requested) {
            requested.to_string()
        } else {
            warn!(
                shader = requested,
                fallback = DEFAULT_SHADER,
                "configured shader not found; using default"
            );
            DEFAULT_SHADER.to_string()
        };
        let fragment = registry.fragment(&name)?.to_string();

        let mut binding = ShaderBinding::new(backend);
        binding.bind(name.as_str(), registry.vertex(), fragment, default_decls());

        let mut viewer = Self {
            config: config.with_shader(&name),
            viewport,
            registry,
            controller: RenderLoop::new(resolution, clock),
            binding,
            scheduler,
        };
        info!(
            shader = %name,
            width = resolution.0,
            height = resolution.1,
            auto_start = viewer.config.auto_start,
            "viewer initialised"
        );

        viewer.controller.redraw(&mut viewer.binding);
        if viewer.config.auto_start {
            viewer.controller.start(&mut viewer.scheduler);
        }
        Ok(viewer)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Option string reproducing the current session.
    pub fn options(&self) -> String {
        self.config.to_fragment()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn registry(&self) -> &ShaderRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &RenderLoop<C> {
        &self.controller
    }

    pub fn binding(&self) -> &ShaderBinding<B> {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut ShaderBinding<B> {
        &mut self.binding
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn uniforms(&self) -> &UniformState {
        self.controller.uniforms()
    }

    pub fn run_state(&self) -> RunState {
        self.controller.run_state()
    }

    pub fn current_shader(&self) -> &str {
        self.config.shader_or_default()
    }

    pub fn start(&mut self) {
        self.controller.start(&mut self.scheduler);
    }

    pub fn stop(&mut self) {
        self.controller.stop(&mut self.binding);
    }

    pub fn toggle(&mut self) -> RunState {
        self.controller.toggle(&mut self.scheduler, &mut self.binding)
    }

    pub fn frame_tick(&mut self, ticket: FrameTicket) -> TickOutcome {
        self.controller
            .frame_tick(ticket, &mut self.scheduler, &mut self.binding)
    }

    /// Updates the normalised pointer; returns whether a frame was drawn.
    pub fn pointer_moved(&mut self, pointer: [f32; 2]) -> bool {
        self.controller.pointer_moved(pointer, &mut self.binding)
    }

    pub fn redraw(&mut self) {
        self.controller.redraw(&mut self.binding);
    }

    /// Swaps the fragment program to the registry entry `name` and redraws.
    ///
    /// Returns the option string for the new selection. Unknown names and
    /// programs that fail to compile are rejected and the session keeps its
    /// current selection; time and pointer are never reset.
    pub fn select_shader(&mut self, name: &str) -> Result<String, BindingError> {
        self.binding.select(&self.registry, name)?;
        match self.binding.draw(self.controller.uniforms()) {
            Ok(()) => {}
            Err(err @ BindingError::Compile { .. }) => {
                error!(error = %err, "shader selection rejected");
                return Err(err);
            }
            Err(err) => error!(error = %err, "frame skipped"),
        }
        self.config = self.config.with_shader(name);
        info!(shader = name, "shader selected");
        Ok(self.options())
    }

    /// Selects the registry entry after the current one, wrapping around.
    pub fn cycle_shader(&mut self) -> Result<String, BindingError> {
        let next = self
            .registry
            .next_after(self.current_shader())
            .unwrap_or(DEFAULT_SHADER)
            .to_string();
        self.select_shader(&next)
    }

    /// Selects the registry entry at zero-based `index`.
    pub fn select_index(&mut self, index: usize) -> Result<String, BindingError> {
        let Some(name) = self.registry.name_at(index).map(str::to_string) else {
            return Err(RegistryError::UnknownShader {
                name: format!("#{}", index + 1),
                known: self.registry.names().map(str::to_string).collect(),
            }
            .into());
        };
        self.select_shader(&name)
    }
}
