use crate::gfx::ClearOp;

/// Represents a single acquired frame.
///
/// This object is short-lived and must be presented promptly. Holding the
/// surface texture prevents acquisition of subsequent frames.
pub(super) struct PendingFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub clear: ClearOp,
    /// A render pass has been recorded; later passes load instead of clear.
    pub drawn: bool,
}

/// Current binds, sticky until replaced.
#[derive(Debug, Default, Copy, Clone)]
pub(super) struct Binds {
    pub program: Option<crate::gfx::ProgramHandle>,
    pub vertex: Option<crate::gfx::BufferHandle>,
    pub index: Option<crate::gfx::BufferHandle>,
    pub texture: Option<crate::gfx::TextureHandle>,
}

pub(super) fn color_load(frame: &PendingFrame) -> wgpu::LoadOp<wgpu::Color> {
    if frame.drawn {
        return wgpu::LoadOp::Load;
    }
    let c = frame.clear.color;
    wgpu::LoadOp::Clear(wgpu::Color {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    })
}

pub(super) fn depth_load(frame: &PendingFrame) -> wgpu::LoadOp<f32> {
    match frame.clear.depth {
        Some(depth) if !frame.drawn => wgpu::LoadOp::Clear(depth),
        _ => wgpu::LoadOp::Load,
    }
}
