//! GPU side of the background renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `touch_channel` holds the 64×64 touch texture and its sampler.
//! - `pipeline` compiles the GLSL pair and builds the plane pipeline.
//! - `uniforms` mirrors the std140 block written every frame.
//! - `upscale` caps the shading resolution on very dense displays.
//! - `state` glues everything together behind `GpuState`.

mod context;
mod pipeline;
mod state;
mod touch_channel;
mod uniforms;
mod upscale;

pub(crate) use state::GpuState;
