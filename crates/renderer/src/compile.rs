use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

/// Compiles the plane vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("gradient plane vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(vertex_source()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Compiles the gradient fragment shader that samples the touch texture.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("gradient fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment_source()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Compiles the full-screen pass that stretches the capped-resolution frame
/// over the swapchain.
pub(crate) fn compile_upscale_shaders(
    device: &wgpu::Device,
) -> Result<(wgpu::ShaderModule, wgpu::ShaderModule)> {
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("upscale vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(UPSCALE_VERTEX),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("upscale fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(UPSCALE_FRAGMENT),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    Ok((vertex, fragment))
}

fn vertex_source() -> String {
    format!("{HEADER}\n{VERTEX_BODY}")
}

fn fragment_source() -> String {
    format!("{HEADER}\n{FRAGMENT_BODY}")
}

/// Uniform block shared by both stages.
///
/// Layout must match `GradientUniforms` in `gpu/uniforms.rs` byte for byte.
const HEADER: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform GradientParams {
    mat4 uViewProjection;
    vec4 uColors[6];
    vec4 uDarkNavy;
    vec2 uResolution;
    float uTime;
    float uSpeed;
    float uIntensity;
    float uGradientSize;
    float uGrainIntensity;
    float uPadding0;
} ubo;
";

const VERTEX_BODY: &str = r"layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = uv;
    gl_Position = ubo.uViewProjection * vec4(position, 1.0);
}
";

const FRAGMENT_BODY: &str = r"layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 1, binding = 0) uniform texture2D uTouchTexture;
layout(set = 1, binding = 1) uniform sampler uTouchSampler;

float grain(vec2 uv, float time) {
    vec2 grainUv = uv * ubo.uResolution * 0.5;
    float grainValue = fract(sin(dot(grainUv + vec2(time), vec2(12.9898, 78.233))) * 43758.5453);
    return grainValue * 2.0 - 1.0;
}

vec3 gradientColor(vec2 uv, float time) {
    float ts = time * ubo.uSpeed;
    vec2 center1 = vec2(0.5 + sin(ts * 0.4) * 0.4, 0.5 + cos(ts * 0.5) * 0.4);
    vec2 center2 = vec2(0.5 + cos(ts * 0.6) * 0.5, 0.5 + sin(ts * 0.45) * 0.5);
    vec2 center3 = vec2(0.5 + sin(ts * 0.35) * 0.45, 0.5 + cos(ts * 0.55) * 0.45);
    vec2 center4 = vec2(0.5 + cos(ts * 0.5) * 0.4, 0.5 + sin(ts * 0.4) * 0.4);

    float influence1 = 1.0 - smoothstep(0.0, ubo.uGradientSize, length(uv - center1));
    float influence2 = 1.0 - smoothstep(0.0, ubo.uGradientSize, length(uv - center2));
    float influence3 = 1.0 - smoothstep(0.0, ubo.uGradientSize, length(uv - center3));
    float influence4 = 1.0 - smoothstep(0.0, ubo.uGradientSize, length(uv - center4));

    vec3 color = vec3(0.0);
    color += ubo.uColors[0].rgb * influence1 * (0.6 + 0.4 * sin(time));
    color += ubo.uColors[1].rgb * influence2 * (0.6 + 0.4 * cos(time));
    color += ubo.uColors[2].rgb * influence3;
    color += ubo.uColors[3].rgb * influence4;

    color = clamp(color, vec3(0.0), vec3(1.0)) * ubo.uIntensity;

    float mixFactor = max(length(color) * 1.2, 0.15);
    return mix(ubo.uDarkNavy.rgb, color, vec3(mixFactor));
}

void main() {
    vec2 uv = v_uv;
    vec4 touch = texture(sampler2D(uTouchTexture, uTouchSampler), uv);
    float intensity = touch.b;
    uv.x += -(touch.r * 2.0 - 1.0) * 0.8 * intensity;
    uv.y += -(touch.g * 2.0 - 1.0) * 0.8 * intensity;

    vec3 color = gradientColor(uv, ubo.uTime);
    color += vec3(grain(uv, ubo.uTime) * ubo.uGrainIntensity);

    outColor = vec4(color, 1.0);
}
";

// One oversized triangle; uv (0, 0) is the top-left texel of the source.
const UPSCALE_VERTEX: &str = r"#version 450

layout(location = 0) out vec2 v_uv;

void main() {
    int index = int(gl_VertexIndex);
    vec2 corner = vec2(float((index << 1) & 2), float(index & 2));
    v_uv = vec2(corner.x, 1.0 - corner.y);
    gl_Position = vec4(corner * 2.0 - 1.0, 0.0, 1.0);
}
";

const UPSCALE_FRAGMENT: &str = r"#version 450

layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D uSource;
layout(set = 0, binding = 1) uniform sampler uSourceSampler;

void main() {
    outColor = texture(sampler2D(uSource, uSourceSampler), v_uv);
}
";
