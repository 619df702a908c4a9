//! Renderer crate for quadview.
//!
//! Glues the render-loop state machine, the shader program binding and the
//! `wgpu` quad pipeline together. The overall flow is:
//!
//! ```text
//!   quadview CLI
//!          │ ViewerConfig + ShaderRegistry
//!          ▼
//!   run_window ──▶ Viewer ──▶ RenderLoop ──(FrameTicket)──▶ WindowScheduler
//!                    │            │                              │
//!                    │            └─▶ integrate time ◀── redraw ─┘
//!                    ▼
//!              ShaderBinding ──▶ ProgramBackend (GpuBackend) ──▶ GPU UBO + quad
//! ```
//!
//! `RenderLoop` owns the [`UniformState`] and is the only writer of time and
//! mode; the [`InputAdapter`] writes the pointer through [`Viewer`]. Everything
//! runs on the event-loop thread, so none of it is `Send`.

mod binding;
mod compile;
mod controller;
mod gpu;
mod input;
mod runtime;
mod stats;
mod types;
mod uniforms;
mod viewer;
mod window;

pub use binding::{BindingError, ProgramBackend, ProgramBinding, ShaderBinding};
pub use controller::{FrameTarget, RenderLoop, RunState, TickOutcome};
pub use gpu::{GpuBackend, QuadPipeline};
pub use input::{normalize_pointer, InputAdapter, InputEffect, InputEvent, InputKey};
pub use runtime::{Clock, ManualClock, SystemClock};
pub use stats::FrameStats;
pub use types::{WindowOptions, DEFAULT_VIEWPORT};
pub use uniforms::{
    default_decls, UniformDecl, UniformKind, UniformLayout, UniformState, MODE_ACTIVE, MODE_IDLE,
};
pub use viewer::Viewer;
pub use window::{run_window, WindowScheduler};
