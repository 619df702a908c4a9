//! Programs bundled with the viewer.
//!
//! Fragment sources are bare GLSL 450 bodies defining
//! `void mainImage(out vec4 fragColor, in vec2 fragCoord)`; the renderer
//! supplies the version line, uniform block and `main`.

/// Full-screen quad vertex program, paired with every fragment.
pub const PROJECTION_VERTEX: &str = include_str!("../glsl/projection.vert");

/// Built-in fragment programs in selector order.
pub const FRAGMENTS: [(&str, &str); 6] = [
    ("upstream", include_str!("../glsl/upstream.frag")),
    ("cube", include_str!("../glsl/cube.frag")),
    ("spongebob", include_str!("../glsl/spongebob.frag")),
    ("mountains", include_str!("../glsl/mountains.frag")),
    ("night", include_str!("../glsl/night.frag")),
    ("refraction", include_str!("../glsl/refraction.frag")),
];
