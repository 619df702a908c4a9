//! Shader program binding: which vertex/fragment pair is bound, whether it
//! needs relinking, and the last program that compiled.
//!
//! Compilation is deferred to the next draw. A failed compile consumes the
//! dirty flag and skips that frame; later draws keep using the last program
//! that compiled, so the viewer degrades to its previous picture instead of
//! going blank.

use shaders::{RegistryError, ShaderRegistry};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::controller::FrameTarget;
use crate::uniforms::{UniformDecl, UniformState};

/// Turns program sources into something drawable. Implemented by the GPU
/// backend and by test doubles.
pub trait ProgramBackend {
    type Program;

    fn compile(&mut self, program: &ProgramBinding) -> anyhow::Result<Self::Program>;

    fn render(&mut self, program: &Self::Program, uniforms: &UniformState) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("no program has been bound yet")]
    NothingBound,
    #[error("no program has compiled successfully yet")]
    NoCompiledProgram,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to compile shader '{shader}': {message}")]
    Compile { shader: String, message: String },
    #[error("failed to draw shader '{shader}': {message}")]
    Render { shader: String, message: String },
}

/// Sources and uniform declarations of the bound program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBinding {
    pub name: String,
    pub vertex_source: String,
    pub fragment_source: String,
    pub uniforms: Vec<UniformDecl>,
    dirty: bool,
}

impl ProgramBinding {
    pub fn new(
        name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
        uniforms: Vec<UniformDecl>,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            uniforms,
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

struct Compiled<P> {
    name: String,
    program: P,
}

pub struct ShaderBinding<B: ProgramBackend> {
    backend: B,
    bound: Option<ProgramBinding>,
    active: Option<Compiled<B::Program>>,
    draws: u64,
}

impl<B: ProgramBackend> ShaderBinding<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            bound: None,
            active: None,
            draws: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn program(&self) -> Option<&ProgramBinding> {
        self.bound.as_ref()
    }

    /// Name of the program the next draw renders with, once compiled.
    pub fn bound_name(&self) -> Option<&str> {
        self.bound.as_ref().map(|program| program.name.as_str())
    }

    /// Name of the last program that compiled successfully.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|compiled| compiled.name.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        self.bound.as_ref().is_some_and(ProgramBinding::is_dirty)
    }

    /// Number of successful draws so far.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Installs a complete program; it compiles on the next draw.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
        uniforms: Vec<UniformDecl>,
    ) {
        let program = ProgramBinding::new(name, vertex_source, fragment_source, uniforms);
        debug!(shader = %program.name, uniforms = program.uniforms.len(), "program bound");
        self.bound = Some(program);
    }

    /// Replaces only the fragment stage of the bound program.
    pub fn swap(&mut self, name: impl Into<String>, fragment_source: impl Into<String>) -> Result<(), BindingError> {
        let program = self.bound.as_mut().ok_or(BindingError::NothingBound)?;
        program.name = name.into();
        program.fragment_source = fragment_source.into();
        program.dirty = true;
        debug!(shader = %program.name, "fragment stage swapped");
        Ok(())
    }

    /// Swaps in the registry's fragment called `name`.
    ///
    /// An unknown name leaves the binding untouched.
    pub fn select(&mut self, registry: &ShaderRegistry, name: &str) -> Result<(), BindingError> {
        let source = registry.fragment(name)?;
        self.swap(name, source)
    }

    /// Renders one frame, recompiling first when the binding is dirty.
    pub fn draw(&mut self, uniforms: &UniformState) -> Result<(), BindingError> {
        let program = self.bound.as_mut().ok_or(BindingError::NothingBound)?;
        if program.dirty {
            program.dirty = false;
            match self.backend.compile(program) {
                Ok(compiled) => {
                    info!(shader = %program.name, "shader program compiled");
                    self.active = Some(Compiled {
                        name: program.name.clone(),
                        program: compiled,
                    });
                }
                Err(err) => {
                    return Err(BindingError::Compile {
                        shader: program.name.clone(),
                        message: format!("{err:#}"),
                    });
                }
            }
        }

        let active = self.active.as_ref().ok_or(BindingError::NoCompiledProgram)?;
        self.backend
            .render(&active.program, uniforms)
            .map_err(|err| BindingError::Render {
                shader: active.name.clone(),
                message: format!("{err:#}"),
            })?;
        self.draws += 1;
        Ok(())
    }
}

impl<B: ProgramBackend> FrameTarget for ShaderBinding<B> {
    fn draw_frame(&mut self, uniforms: &UniformState) {
        if let Err(err) = self.draw(uniforms) {
            error!(error = %err, "frame skipped");
        }
    }
}
