use std::borrow::Cow;
use std::fmt::Write as _;

use anyhow::{anyhow, Result};
use wgpu::naga::ShaderStage;

use crate::uniforms::{UniformDecl, UniformLayout};

/// Compiles a vertex program, surfacing validation errors instead of letting
/// wgpu's uncaptured error handler abort.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device, name: &str, source: &str) -> Result<wgpu::ShaderModule> {
    compile_glsl(device, &format!("{name} vertex"), source.to_string(), ShaderStage::Vertex)
}

/// Wraps a `mainImage` body with the uniform prelude and compiles it.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    name: &str,
    source: &str,
    layout: &UniformLayout,
) -> Result<wgpu::ShaderModule> {
    let wrapped = wrap_fragment(source, layout);
    compile_glsl(device, &format!("{name} fragment"), wrapped, ShaderStage::Fragment)
}

fn compile_glsl(device: &wgpu::Device, label: &str, source: String, stage: ShaderStage) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(anyhow!("{label}: {err}")),
        None => Ok(module),
    }
}

/// Produces a self-contained GLSL fragment shader from a `mainImage` body.
///
/// `#version` directives and plain `uniform` declarations of names the
/// prelude already provides are stripped; [`prelude`] is prepended and
/// [`footer`] appended.
pub(crate) fn wrap_fragment(source: &str, layout: &UniformLayout) -> String {
    let mut body = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        if trimmed.starts_with("uniform ") && declares_prelude_uniform(trimmed, layout) {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    format!("{}\n#line 1\n{body}{}", prelude(layout), footer(layout))
}

fn declares_prelude_uniform(line: &str, layout: &UniformLayout) -> bool {
    let declared = line
        .trim_end_matches(';')
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_end_matches(';');
    layout.decls().any(|decl| decl.name == declared)
}

/// Version line, outputs and the std140 block matching [`UniformLayout`].
///
/// Fields are named `_<name>` inside the block and exposed through macros so
/// shader code reads them by their plain names.
pub(crate) fn prelude(layout: &UniformLayout) -> String {
    let mut header = String::from(
        "#version 450\nlayout(location = 0) in vec2 v_uv;\nlayout(location = 0) out vec4 outColor;\n\n",
    );
    let decls: Vec<&UniformDecl> = layout.decls().collect();
    if decls.is_empty() {
        // An empty block is invalid GLSL; keep the binding alive with padding.
        header.push_str("layout(std140, set = 0, binding = 0) uniform QuadParams {\n    vec4 _padding;\n} quad;\n");
        return header;
    }

    header.push_str("layout(std140, set = 0, binding = 0) uniform QuadParams {\n");
    for decl in &decls {
        let _ = writeln!(header, "    {} _{};", decl.kind.glsl_type(), decl.name);
    }
    header.push_str("} quad;\n\n");
    for decl in &decls {
        let _ = writeln!(header, "#define {0} quad._{0}", decl.name);
    }
    header
}

/// Calls `mainImage` with a bottom-left origin when `resolution` is
/// declared, otherwise with raw window coordinates.
pub(crate) fn footer(layout: &UniformLayout) -> String {
    let flips = layout
        .decls()
        .any(|decl| decl.name == "resolution" && decl.kind.components() >= 2);
    let frag_coord = if flips {
        "vec2(gl_FragCoord.x, resolution.y - gl_FragCoord.y)"
    } else {
        "gl_FragCoord.xy"
    };
    format!(
        "\nvoid main() {{\n    vec2 fragCoord = {frag_coord};\n    vec4 color = vec4(0.0);\n    mainImage(color, fragCoord);\n    outColor = vec4(color.rgb, 1.0);\n}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{default_decls, UniformKind};

    #[test]
    fn prelude_declares_every_uniform() {
        let layout = UniformLayout::new(&default_decls());
        let header = prelude(&layout);
        assert!(header.starts_with("#version 450"));
        assert!(header.contains("    float _time;"));
        assert!(header.contains("    vec2 _resolution;"));
        assert!(header.contains("    vec2 _mouse;"));
        assert!(header.contains("    vec3 _config;"));
        assert!(header.contains("#define config quad._config"));
    }

    #[test]
    fn wrap_strips_version_and_duplicate_uniforms() {
        let source = "#version 300 es\nuniform float time;\nuniform float other;\nvoid mainImage(out vec4 fragColor, in vec2 fragCoord) {\n    fragColor = vec4(1.0);\n}\n";
        let layout = UniformLayout::new(&default_decls());
        let wrapped = wrap_fragment(source, &layout);
        assert!(!wrapped.contains("#version 300 es"));
        assert!(!wrapped.contains("uniform float time;"));
        assert!(wrapped.contains("uniform float other;"));
        assert!(wrapped.contains("#line 1\nuniform float other;"));
        assert!(wrapped.trim_end().ends_with('}'));
        assert!(wrapped.contains("mainImage(color, fragCoord);"));
    }

    #[test]
    fn custom_declarations_shape_the_block() {
        let layout = UniformLayout::new(&[
            UniformDecl::new("resolution", UniformKind::Vec2),
            UniformDecl::new("tint", UniformKind::Vec4),
        ]);
        let header = prelude(&layout);
        assert!(header.contains("    vec4 _tint;"));
        assert!(header.contains("#define tint quad._tint"));
        assert!(!header.contains("_time"));
    }

    #[test]
    fn footer_flips_only_with_resolution() {
        let with = footer(&UniformLayout::new(&default_decls()));
        assert!(with.contains("resolution.y - gl_FragCoord.y"));
        let without = footer(&UniformLayout::new(&[UniformDecl::new("time", UniformKind::Float)]));
        assert!(without.contains("vec2 fragCoord = gl_FragCoord.xy;"));
    }
}
