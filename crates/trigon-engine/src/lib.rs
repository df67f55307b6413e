//! Trigon engine crate.
//!
//! Owns the render-resource lifecycle shared by the trigon demos: window and
//! GPU context, shader program, mesh buffers, optional texture and the frame
//! loop that draws them.

pub mod device;
pub mod error;
pub mod frame;
pub mod gfx;
pub mod logging;
pub mod mesh;
pub mod pipeline;
pub mod resources;
pub mod shader;
pub mod texture;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AllocationKind, SetupError};
