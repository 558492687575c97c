use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info, trace, warn};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{Event, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{FrameClock, FrameScheduler};
use crate::scene::Scene;
use crate::types::RendererConfig;

/// Window, GPU state and scene for the interactive background.
pub(crate) struct WindowState {
    // Declared before `window` so the surface is dropped first.
    gpu: GpuState,
    window: Arc<Window>,
    scene: Scene,
    clock: FrameClock,
    primary_touch: Option<u64>,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let logical = size.to_logical::<f32>(window.scale_factor());
        let scene = Scene::new(
            config.gradient,
            config.camera,
            logical.width.max(1.0),
            logical.height.max(1.0),
        )
        .context("failed to build initial scene")?;
        let gpu = GpuState::new(
            window.as_ref(),
            size,
            window.scale_factor(),
            &config.gradient,
            config.antialiasing,
            config.color_space,
        )?;

        Ok(Self {
            gpu,
            window,
            scene,
            clock: FrameClock::new(),
            primary_touch: None,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            debug!(
                width = new_size.width,
                height = new_size.height,
                "ignoring zero-sized resize"
            );
            return;
        }
        self.gpu.resize(new_size, self.window.scale_factor());
        let logical = new_size.to_logical::<f32>(self.window.scale_factor());
        if let Err(err) = self.scene.resize(logical.width, logical.height) {
            warn!(error = %err, "scene rejected resize");
        }
    }

    pub(crate) fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let logical = position.to_logical::<f32>(self.window.scale_factor());
        self.scene.pointer_moved(logical.x, logical.y);
    }

    /// Follows the first finger only; other touches are ignored until it lifts.
    pub(crate) fn handle_touch(&mut self, touch: Touch) {
        match touch.phase {
            TouchPhase::Started => {
                self.primary_touch.get_or_insert(touch.id);
            }
            TouchPhase::Moved => {
                let primary = *self.primary_touch.get_or_insert(touch.id);
                if primary == touch.id {
                    self.handle_cursor_moved(touch.location);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.primary_touch == Some(touch.id) {
                    self.primary_touch = None;
                }
            }
        }
    }

    /// Advances the scene by the frame delta, then draws it.
    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let delta = self.clock.tick();
        trace!(frame = self.clock.frame(), delta, "rendering frame");
        let gpu = &mut self.gpu;
        self.scene.frame(delta, |scene| gpu.render(scene))
    }
}

pub(crate) fn run_window(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(width.max(1), height.max(1)))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state =
        WindowState::new(window, &config).context("failed to initialise window renderer")?;
    let mut scheduler = FrameScheduler::new(config.target_fps);
    if let Some(interval) = scheduler.interval() {
        info!(fps = config.target_fps, ?interval, "frame rate capped");
    }
    state.window().request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.handle_cursor_moved(position);
                }
                WindowEvent::Touch(touch) => {
                    state.handle_touch(touch);
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                }
                WindowEvent::RedrawRequested => match state.render_frame() {
                    Ok(()) => scheduler.mark_rendered(),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; exiting");
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!(error = ?other, "surface error; retrying next frame");
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if scheduler.ready_for_frame(now) {
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = scheduler.next_deadline() {
                trace!(
                    deadline_ms = deadline.saturating_duration_since(now).as_millis(),
                    "waiting until next frame"
                );
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
