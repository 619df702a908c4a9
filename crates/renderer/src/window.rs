use std::sync::Arc;

use anyhow::{anyhow, Result};
use scheduler::{FrameQueue, FrameScheduler, FrameTicket};
use shaders::ShaderRegistry;
use tracing::{info, trace};
use viewconfig::ViewerConfig;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuBackend;
use crate::input::{InputAdapter, InputEffect, InputEvent, InputKey};
use crate::runtime::SystemClock;
use crate::types::WindowOptions;
use crate::viewer::Viewer;

/// Delivers frame tickets on the window's next redraw.
pub struct WindowScheduler {
    window: Arc<Window>,
    pending: FrameQueue,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            pending: FrameQueue::new(),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn take_pending(&mut self) -> Vec<FrameTicket> {
        self.pending.drain()
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self, ticket: FrameTicket) {
        self.pending.request_frame(ticket);
        self.window.request_redraw();
    }
}

type WindowViewer = Viewer<GpuBackend, SystemClock, WindowScheduler>;

/// Opens the viewer window and runs until it is closed.
///
/// `on_options` receives the option string every time the selected shader
/// changes.
pub fn run_window<F>(
    config: ViewerConfig,
    registry: ShaderRegistry,
    options: WindowOptions,
    mut on_options: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let render_size = config.render_size(options.viewport);
    let window = WindowBuilder::new()
        .with_title(options.title_for(&config.to_fragment()))
        .with_inner_size(PhysicalSize::new(render_size.0, render_size.1))
        .with_resizable(false)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create viewer window: {err}"))?;
    let window = Arc::new(window);

    let backend = GpuBackend::new(window.as_ref(), render_size)
        .map_err(|err| anyhow!("failed to initialise renderer: {err:#}"))?;
    let mut viewer: WindowViewer = Viewer::new(
        config,
        options.viewport,
        registry,
        backend,
        SystemClock,
        WindowScheduler::new(window.clone()),
    )?;
    window.set_title(&options.title_for(&viewer.options()));

    let inner = window.inner_size();
    let mut input = InputAdapter::new((inner.width, inner.height));
    info!(
        shader = viewer.current_shader(),
        running = viewer.controller().is_running(),
        "viewer window open"
    );

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::Resized(size) => {
                input = InputAdapter::new((size.width, size.height));
            }
            WindowEvent::CursorMoved { position, .. } => {
                input.dispatch(
                    &mut viewer,
                    InputEvent::PointerMoved {
                        x: position.x,
                        y: position.y,
                    },
                );
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                input.dispatch(&mut viewer, InputEvent::Click);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && matches!(event.logical_key, Key::Named(NamedKey::Escape))
                {
                    elwt.exit();
                    return;
                }
                if event.repeat {
                    return;
                }
                let key = input_key(&event);
                let input_event = match event.state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                };
                if let InputEffect::ShaderSelected { options: selected, .. } =
                    input.dispatch(&mut viewer, input_event)
                {
                    window.set_title(&options.title_for(&selected));
                    on_options(&selected);
                }
            }
            WindowEvent::RedrawRequested => {
                let tickets = viewer.scheduler_mut().take_pending();
                if tickets.is_empty() {
                    if !viewer.controller().is_running() {
                        // Expose or first map while stopped.
                        viewer.redraw();
                    }
                    return;
                }
                for ticket in tickets {
                    let outcome = viewer.frame_tick(ticket);
                    trace!(?outcome, epoch = ticket.epoch(), "frame ticket delivered");
                }
            }
            _ => {}
        },
        Event::AboutToWait => elwt.set_control_flow(ControlFlow::Wait),
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

fn input_key(event: &KeyEvent) -> InputKey {
    match &event.logical_key {
        Key::Named(NamedKey::Space) => InputKey::Space,
        Key::Named(NamedKey::Tab) => InputKey::Tab,
        Key::Named(NamedKey::ArrowUp) => InputKey::Up,
        Key::Named(NamedKey::ArrowDown) => InputKey::Down,
        Key::Character(value) => character_key(value.as_str()),
        _ => InputKey::Other,
    }
}

fn character_key(value: &str) -> InputKey {
    let mut chars = value.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return InputKey::Other;
    };
    match ch.to_ascii_lowercase() {
        ' ' => InputKey::Space,
        'w' => InputKey::W,
        'a' => InputKey::A,
        's' => InputKey::S,
        'd' => InputKey::D,
        digit @ '1'..='9' => InputKey::Digit(digit as u8 - b'0'),
        _ => InputKey::Other,
    }
}
