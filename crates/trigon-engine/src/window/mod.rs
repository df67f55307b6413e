//! Window + graphics context ownership.
//!
//! [`GraphicsContext`] pairs the window with the GPU device and dispatches
//! window events. `runtime` provides the winit-backed window and `open`.

mod context;
mod events;
mod runtime;

pub use context::{FrameState, GraphicsContext, WindowSystem};
pub use events::{Key, KeyState, WindowEvent};
pub use runtime::{open, WindowConfig, WinitWindow};
