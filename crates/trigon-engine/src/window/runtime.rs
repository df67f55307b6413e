use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent as WinitEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use super::{GraphicsContext, Key, KeyState, WindowEvent, WindowSystem};
use crate::device::{GpuInit, WgpuDevice};
use crate::error::SetupError;

/// Pumps allowed before the platform must have delivered `resumed`.
const STARTUP_PUMPS: usize = 16;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            initial_size: LogicalSize::new(width as f64, height as f64),
            ..Self::default()
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            resizable: true,
        }
    }
}

/// Opens a window and creates a GPU context for it.
///
/// On failure nothing stays alive: a window created before a device failure
/// is dropped before returning.
pub fn open(
    config: &WindowConfig,
    gpu_init: GpuInit,
) -> Result<GraphicsContext<WinitWindow, WgpuDevice>, SetupError> {
    let window = WinitWindow::create(config)?;
    let gpu = pollster::block_on(WgpuDevice::new(window.handle(), gpu_init))
        .map_err(|e| SetupError::WindowCreation(format!("{e:#}")))?;
    log::info!(
        "opened `{}` ({:?})",
        config.title,
        gpu.surface_format()
    );
    Ok(GraphicsContext::new(window, gpu))
}

/// Event handler driven by `pump_app_events`.
///
/// Collects events between pumps; the frame loop drains them.
struct Handler {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    creation_error: Option<String>,
    events: Vec<WindowEvent>,
    close_requested: bool,
}

impl Handler {
    fn new(attributes: WindowAttributes) -> Self {
        Self {
            attributes: Some(attributes),
            window: None,
            creation_error: None,
            events: Vec::new(),
            close_requested: false,
        }
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.creation_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WinitEvent) {
        match event {
            WinitEvent::CloseRequested => self.close_requested = true,

            WinitEvent::Resized(size) => self.events.push(WindowEvent::FramebufferResized {
                width: size.width,
                height: size.height,
            }),

            WinitEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.events.push(WindowEvent::FramebufferResized {
                        width: size.width,
                        height: size.height,
                    });
                }
            }

            WinitEvent::KeyboardInput { event, .. } => {
                let state = match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };
                self.events.push(WindowEvent::Key {
                    key: map_key(event.physical_key),
                    state,
                    repeat: event.repeat,
                });
            }

            _ => {}
        }
    }
}

/// winit-backed [`WindowSystem`].
///
/// The event loop is pumped rather than run so the frame loop keeps control.
pub struct WinitWindow {
    handler: Handler,
    window: Arc<Window>,
    // Dropped last.
    event_loop: EventLoop<()>,
}

impl WinitWindow {
    pub fn create(config: &WindowConfig) -> Result<Self, SetupError> {
        let mut event_loop =
            EventLoop::new().map_err(|e| SetupError::Init(format!("event loop: {e}")))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size)
            .with_resizable(config.resizable);
        let mut handler = Handler::new(attributes);

        for _ in 0..STARTUP_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut handler)
            {
                return Err(SetupError::WindowCreation(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
            if handler.window.is_some() || handler.creation_error.is_some() {
                break;
            }
        }

        if let Some(err) = handler.creation_error.take() {
            return Err(SetupError::WindowCreation(err));
        }
        let window = handler.window.clone().ok_or_else(|| {
            SetupError::WindowCreation("platform never resumed the application".to_string())
        })?;

        Ok(Self {
            handler,
            window,
            event_loop,
        })
    }

    /// Shared handle for surface creation.
    pub fn handle(&self) -> Arc<Window> {
        self.window.clone()
    }
}

impl WindowSystem for WinitWindow {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn should_close(&self) -> bool {
        self.handler.close_requested
    }

    fn set_should_close(&mut self, close: bool) {
        self.handler.close_requested = close;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler)
        {
            log::debug!("event loop exited (code {code})");
            self.handler.close_requested = true;
        }
        std::mem::take(&mut self.handler.events)
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(other) => Key::Unknown(other as u32),
        // NativeKeyCode is not a u32 in winit 0.30.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}
