use crate::gfx::GraphicsApi;

use super::events::{Key, KeyState, WindowEvent};

/// Windowing collaborator.
pub trait WindowSystem {
    /// Current framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, close: bool);

    /// Drains pending OS events without blocking.
    fn poll_events(&mut self) -> Vec<WindowEvent>;
}

/// Per-frame values written by the resize handler and read by the frame loop.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FrameState {
    pub width: u32,
    pub height: u32,
}

/// Owns the window and the GPU device bound to it.
///
/// Field order matters: the GPU device (and its surface) drops before the
/// window it presents to.
pub struct GraphicsContext<W, G> {
    gpu: G,
    window: W,
    frame: FrameState,
}

impl<W, G> GraphicsContext<W, G>
where
    W: WindowSystem,
    G: GraphicsApi,
{
    /// Binds a window and a GPU device, then matches the viewport to the
    /// current framebuffer.
    pub fn new(window: W, gpu: G) -> Self {
        let mut ctx = Self {
            gpu,
            window,
            frame: FrameState::default(),
        };

        let (width, height) = ctx.window.framebuffer_size();
        ctx.on_framebuffer_resized(width, height);
        ctx
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    pub fn request_close(&mut self) {
        self.window.set_should_close(true);
    }

    /// Drains window events and runs the key and resize handlers.
    pub fn poll_events(&mut self) {
        for event in self.window.poll_events() {
            match event {
                WindowEvent::Key { key, state, .. } => self.on_key(key, state),
                WindowEvent::FramebufferResized { width, height } => {
                    self.on_framebuffer_resized(width, height)
                }
            }
        }
    }

    fn on_key(&mut self, key: Key, state: KeyState) {
        if key == Key::Escape && state == KeyState::Pressed {
            log::debug!("escape pressed; closing window");
            self.request_close();
        }
    }

    fn on_framebuffer_resized(&mut self, width: u32, height: u32) {
        self.frame = FrameState { width, height };
        self.gpu.set_viewport(width, height);
    }

    /// Releases the GPU device, then the window.
    pub fn close(self) {
        let Self { gpu, window, .. } = self;
        drop(gpu);
        drop(window);
        log::info!("graphics context closed");
    }
}
