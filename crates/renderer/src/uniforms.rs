//! Per-frame values fed to the bound program and their std140 packing.
//!
//! The uniform block is described by a list of [`UniformDecl`]s rather than a
//! fixed `#[repr(C)]` struct so the same description drives both the GLSL
//! declaration emitted by [`crate::compile`] and the bytes written to the GPU.

use tracing::debug;

/// Mode sent while the loop is animating.
pub const MODE_ACTIVE: i32 = 100;
/// Mode sent while the loop is stopped.
pub const MODE_IDLE: i32 = 1000;

/// Values the controller maintains for the bound program.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformState {
    /// Seconds of animated time; only advances while running.
    pub elapsed_time: f64,
    /// Render target size in pixels.
    pub resolution: (u32, u32),
    /// Pointer position normalised to `[-1, 1]` on both axes.
    pub pointer: [f32; 2],
    pub mode: i32,
}

impl UniformState {
    pub fn new(resolution: (u32, u32)) -> Self {
        Self {
            elapsed_time: 0.0,
            resolution,
            pointer: [0.0, 0.0],
            mode: MODE_IDLE,
        }
    }

    /// Value for the uniform called `name`, padded to three components.
    pub fn value(&self, name: &str) -> Option<[f32; 3]> {
        let value = match name {
            "time" => [self.elapsed_time as f32, 0.0, 0.0],
            "resolution" => [self.resolution.0 as f32, self.resolution.1 as f32, 0.0],
            "mouse" | "pointer" => [self.pointer[0], self.pointer[1], 0.0],
            "config" | "mode" => [self.mode as f32, 0.0, 0.0],
            _ => return None,
        };
        Some(value)
    }
}

/// GLSL type of a declared uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl UniformKind {
    pub fn glsl_type(self) -> &'static str {
        match self {
            UniformKind::Float => "float",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Vec4 => "vec4",
        }
    }

    pub fn components(self) -> usize {
        match self {
            UniformKind::Float => 1,
            UniformKind::Vec2 => 2,
            UniformKind::Vec3 => 3,
            UniformKind::Vec4 => 4,
        }
    }

    /// std140 base alignment in bytes.
    fn alignment(self) -> usize {
        match self {
            UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 => 16,
        }
    }
}

/// One uniform the bound program declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub kind: UniformKind,
}

impl UniformDecl {
    pub fn new(name: impl Into<String>, kind: UniformKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Uniforms every built-in program expects.
pub fn default_decls() -> Vec<UniformDecl> {
    vec![
        UniformDecl::new("time", UniformKind::Float),
        UniformDecl::new("resolution", UniformKind::Vec2),
        UniformDecl::new("mouse", UniformKind::Vec2),
        UniformDecl::new("config", UniformKind::Vec3),
    ]
}

/// Byte offsets of each declared uniform inside a std140 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    fields: Vec<(UniformDecl, usize)>,
    size: usize,
}

impl UniformLayout {
    pub fn new(decls: &[UniformDecl]) -> Self {
        let mut offset = 0usize;
        let mut fields = Vec::with_capacity(decls.len());
        for decl in decls {
            offset = align_to(offset, decl.kind.alignment());
            fields.push((decl.clone(), offset));
            offset += decl.kind.components() * 4;
        }
        // Uniform buffers must be a multiple of 16 bytes and never empty.
        let size = align_to(offset.max(16), 16);
        Self { fields, size }
    }

    /// Block size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|(decl, _)| decl.name == name)
            .map(|(_, offset)| *offset)
    }

    pub fn decls(&self) -> impl Iterator<Item = &UniformDecl> {
        self.fields.iter().map(|(decl, _)| decl)
    }

    /// Packs `state` into std140 words; unknown names are left zeroed.
    pub fn pack(&self, state: &UniformState) -> Vec<f32> {
        let mut words = vec![0.0f32; self.size / 4];
        for (decl, offset) in &self.fields {
            let Some(value) = state.value(&decl.name) else {
                debug!(uniform = %decl.name, "no value for declared uniform; sending zeros");
                continue;
            };
            let start = offset / 4;
            let count = decl.kind.components().min(value.len());
            words[start..start + count].copy_from_slice(&value[..count]);
        }
        words
    }
}

fn align_to(offset: usize, alignment: usize) -> usize {
    offset.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_follows_std140() {
        let layout = UniformLayout::new(&default_decls());
        assert_eq!(layout.offset_of("time"), Some(0));
        assert_eq!(layout.offset_of("resolution"), Some(8));
        assert_eq!(layout.offset_of("mouse"), Some(16));
        assert_eq!(layout.offset_of("config"), Some(32));
        assert_eq!(layout.size(), 48);
    }

    #[test]
    fn pack_places_values_at_offsets() {
        let layout = UniformLayout::new(&default_decls());
        let mut state = UniformState::new((640, 360));
        state.elapsed_time = 2.5;
        state.pointer = [0.25, -0.5];
        state.mode = MODE_ACTIVE;

        let words = layout.pack(&state);
        assert_eq!(words.len(), 12);
        assert_eq!(words[0], 2.5);
        assert_eq!(&words[2..4], &[640.0, 360.0]);
        assert_eq!(&words[4..6], &[0.25, -0.5]);
        assert_eq!(words[8], MODE_ACTIVE as f32);
    }

    #[test]
    fn unknown_uniform_is_zeroed() {
        let decls = vec![
            UniformDecl::new("brightness", UniformKind::Float),
            UniformDecl::new("time", UniformKind::Float),
        ];
        let layout = UniformLayout::new(&decls);
        let mut state = UniformState::new((1, 1));
        state.elapsed_time = 1.0;
        assert_eq!(layout.pack(&state), vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn new_state_is_idle_at_zero() {
        let state = UniformState::new((10, 20));
        assert_eq!(state.mode, MODE_IDLE);
        assert_eq!(state.elapsed_time, 0.0);
        assert_eq!(state.value("resolution"), Some([10.0, 20.0, 0.0]));
        assert_eq!(state.value("nope"), None);
    }
}
