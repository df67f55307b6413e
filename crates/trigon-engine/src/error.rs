use std::fmt;
use std::path::PathBuf;

use crate::gfx::StageKind;

/// Failure raised while bringing up the window, GPU context or scene resources.
///
/// Every setup step returns this immediately; nothing is retried. The caller
/// skips the frame loop and goes straight to teardown.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("windowing subsystem failed to initialize: {0}")]
    Init(String),

    #[error("failed to create window or graphics context: {0}")]
    WindowCreation(String),

    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: StageKind, log: String },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },

    #[error("failed to decode image `{}`: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("graphics API could not allocate a {width}x{height} texture")]
    TextureAllocation { width: u32, height: u32 },

    #[error("vertex layout mismatch: {0}")]
    LayoutMismatch(String),

    #[error("graphics API could not allocate the {what}")]
    Allocation { what: AllocationKind },
}

/// GPU object whose handle could not be allocated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AllocationKind {
    ShaderStage,
    ShaderProgram,
    VertexBuffer,
    IndexBuffer,
}

impl AllocationKind {
    pub fn stage(self) -> SetupStage {
        match self {
            AllocationKind::ShaderStage | AllocationKind::ShaderProgram => SetupStage::Shaders,
            AllocationKind::VertexBuffer | AllocationKind::IndexBuffer => SetupStage::Mesh,
        }
    }
}

impl fmt::Display for AllocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AllocationKind::ShaderStage => "shader stage",
            AllocationKind::ShaderProgram => "shader program",
            AllocationKind::VertexBuffer => "vertex buffer",
            AllocationKind::IndexBuffer => "index buffer",
        })
    }
}

/// Setup stage a [`SetupError`] originated from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetupStage {
    Window,
    Shaders,
    Mesh,
    Texture,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetupStage::Window => "window/context",
            SetupStage::Shaders => "shader program",
            SetupStage::Mesh => "mesh upload",
            SetupStage::Texture => "texture upload",
        })
    }
}

impl SetupError {
    /// Returns the setup stage that failed.
    pub fn stage(&self) -> SetupStage {
        match self {
            SetupError::Init(_) | SetupError::WindowCreation(_) => SetupStage::Window,
            SetupError::Compile { .. } | SetupError::Link { .. } => SetupStage::Shaders,
            SetupError::LayoutMismatch(_) => SetupStage::Mesh,
            SetupError::Decode { .. } | SetupError::TextureAllocation { .. } => SetupStage::Texture,
            SetupError::Allocation { what } => what.stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_message_carries_stage_and_log() {
        let err = SetupError::Compile {
            stage: StageKind::Fragment,
            log: "error: expected `;`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("fragment shader failed to compile"));
        assert!(msg.ends_with("error: expected `;`"));
        assert_eq!(err.stage(), SetupStage::Shaders);
    }

    #[test]
    fn allocation_errors_map_to_their_stage() {
        let stage_of = |what| SetupError::Allocation { what }.stage();
        assert_eq!(stage_of(AllocationKind::VertexBuffer), SetupStage::Mesh);
        assert_eq!(stage_of(AllocationKind::IndexBuffer), SetupStage::Mesh);
        assert_eq!(stage_of(AllocationKind::ShaderStage), SetupStage::Shaders);
        assert_eq!(stage_of(AllocationKind::ShaderProgram), SetupStage::Shaders);
        assert_eq!(
            SetupError::TextureAllocation { width: 4, height: 4 }.stage(),
            SetupStage::Texture
        );
    }

    #[test]
    fn allocation_message_names_the_object() {
        let err = SetupError::Allocation {
            what: AllocationKind::IndexBuffer,
        };
        assert_eq!(err.to_string(), "graphics API could not allocate the index buffer");
    }
}
