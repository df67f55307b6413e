/// Keys the lifecycle reacts to. Everything else is carried as a raw code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Window events delivered by [`super::WindowSystem::poll_events`].
///
/// OS close requests are not events: the window sets its close flag directly.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WindowEvent {
    Key {
        key: Key,
        state: KeyState,
        repeat: bool,
    },
    /// Framebuffer size in physical pixels.
    FramebufferResized { width: u32, height: u32 },
}
