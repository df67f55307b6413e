use crate::gfx::FrameStatus;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl From<SurfaceErrorAction> for FrameStatus {
    fn from(action: SurfaceErrorAction) -> Self {
        match action {
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => FrameStatus::Skipped,
            SurfaceErrorAction::Fatal => FrameStatus::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fatal_surface_errors_lose_the_frame_loop() {
        assert_eq!(FrameStatus::from(SurfaceErrorAction::Reconfigured), FrameStatus::Skipped);
        assert_eq!(FrameStatus::from(SurfaceErrorAction::SkipFrame), FrameStatus::Skipped);
        assert_eq!(FrameStatus::from(SurfaceErrorAction::Fatal), FrameStatus::Lost);
    }
}
