mod builtin;
mod registry;

pub use builtin::{FRAGMENTS, PROJECTION_VERTEX};
pub use registry::{Origin, RegistryError, ShaderRegistry};
