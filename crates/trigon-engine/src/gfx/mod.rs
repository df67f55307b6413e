//! Backend-neutral graphics API contract.
//!
//! The lifecycle code (shader builder, uploaders, frame loop) only talks to
//! [`GraphicsApi`]. GPU objects are referred to by small copyable handles; the
//! backend owns the real objects behind them.
//!
//! `device::WgpuDevice` is the production backend.

mod api;
mod handle;
mod types;

pub use api::{BuildStatus, FrameStatus, GraphicsApi};
pub use handle::{BufferHandle, HandleAllocator, ProgramHandle, StageHandle, TextureHandle};
pub use types::{
    BufferUsage, ClearOp, Color, DrawCall, MipLevel, ProgramLayout, StageKind, TextureDesc,
    VertexAttribute, VertexLayout, FLOAT_SIZE,
};
