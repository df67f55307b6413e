use super::handle::{BufferHandle, ProgramHandle, StageHandle, TextureHandle};
use super::types::{BufferUsage, ClearOp, DrawCall, ProgramLayout, StageKind, TextureDesc};

/// Result of a compile or link, as reported by the backend.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BuildStatus {
    Ok,
    /// Failure with the backend's diagnostic log (may be empty).
    Failed(String),
}

/// Outcome of a per-frame backend call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    Ready,
    /// Transient failure; drop this frame and carry on.
    Skipped,
    /// Unrecoverable surface failure; the application should close.
    Lost,
}

/// Graphics API collaborator.
///
/// Mirrors the stateful object model of classic GPU APIs: objects are created
/// and released explicitly, binds are sticky until the next frame, and every
/// call is only valid while the owning context is alive. Object creation
/// returns `None` when the API cannot allocate the object.
pub trait GraphicsApi {
    /// Creates and compiles a stage. A handle is returned even if compilation
    /// failed; query [`GraphicsApi::stage_status`] and release it.
    fn create_stage(&mut self, kind: StageKind, source: &str) -> Option<StageHandle>;
    fn stage_status(&self, stage: StageHandle) -> BuildStatus;
    fn release_stage(&mut self, stage: StageHandle);

    /// Links two compiled stages. As with stages, a failed link still yields a
    /// handle whose status carries the log.
    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
        layout: &ProgramLayout,
    ) -> Option<ProgramHandle>;
    fn program_status(&self, program: ProgramHandle) -> BuildStatus;
    fn release_program(&mut self, program: ProgramHandle);

    fn create_buffer(&mut self, usage: BufferUsage, contents: &[u8]) -> Option<BufferHandle>;
    fn release_buffer(&mut self, buffer: BufferHandle);

    /// Allocates and fills a 2D texture (repeat wrap, linear filtering).
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Option<TextureHandle>;
    fn release_texture(&mut self, texture: TextureHandle);

    /// Matches the drawable area to a new framebuffer size.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Starts a frame and schedules the clear.
    fn begin_frame(&mut self, clear: ClearOp) -> FrameStatus;
    fn bind_program(&mut self, program: ProgramHandle);
    fn bind_vertex_layout(&mut self, vertex: BufferHandle, index: Option<BufferHandle>);
    fn bind_texture(&mut self, texture: TextureHandle);
    /// Records one draw with the current binds. `Skipped` means the draw
    /// was rejected; the frame can still be presented.
    fn draw(&mut self, call: DrawCall) -> FrameStatus;
    /// Submits and presents the current frame.
    fn present(&mut self) -> FrameStatus;
}
