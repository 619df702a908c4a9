//! wgpu side of the viewer.
//!
//! - `context` owns instance/device/surface wiring.
//! - `pipeline` compiles a bound program into a render pipeline with a
//!   single uniform bind group sized from its declarations.
//! - `state` implements [`crate::binding::ProgramBackend`] on top of both.

mod context;
mod pipeline;
mod state;

pub use pipeline::QuadPipeline;
pub use state::GpuBackend;
