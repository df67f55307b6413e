//! wgpu backend.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a requested context version
//! - creating & configuring the Surface (swapchain) and the optional depth target
//! - implementing [`crate::gfx::GraphicsApi`] on top of wgpu objects

mod error;
mod frame;
mod gpu;
mod init;
mod reflect;
mod surface;

pub use error::SurfaceErrorAction;
pub use gpu::WgpuDevice;
pub use init::{ContextVersion, GpuInit};
