//! Shader program builder.
//!
//! Compiles a vertex and a fragment stage and links them into a program.
//! Stage handles never outlive the build: they are released on a compile
//! failure, after a successful link, and after a failed link.

use crate::error::{AllocationKind, SetupError};
use crate::gfx::{BuildStatus, GraphicsApi, ProgramHandle, ProgramLayout, StageHandle, StageKind};

/// Log substituted when the backend reports a failure without diagnostics.
const EMPTY_LOG: &str = "(no diagnostic log reported)";

/// Vertex/fragment source pair.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Linked program plus the layout it was linked against.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub handle: ProgramHandle,
    pub layout: ProgramLayout,
}

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        EMPTY_LOG.to_string()
    } else {
        log
    }
}

/// Compiles one stage.
///
/// On failure the stage is released before the error is returned.
pub fn compile_stage<G: GraphicsApi>(
    gpu: &mut G,
    kind: StageKind,
    source: &str,
) -> Result<StageHandle, SetupError> {
    log::debug!("compiling {kind} shader");

    let stage = gpu
        .create_stage(kind, source)
        .ok_or(SetupError::Allocation { what: AllocationKind::ShaderStage })?;

    match gpu.stage_status(stage) {
        BuildStatus::Ok => {
            log::debug!("{kind} shader compiled");
            Ok(stage)
        }
        BuildStatus::Failed(log) => {
            gpu.release_stage(stage);
            Err(SetupError::Compile {
                stage: kind,
                log: non_empty(log),
            })
        }
    }
}

/// Links two compiled stages into a program.
///
/// Both stages are consumed: they are released whether or not the link
/// succeeds.
pub fn link<G: GraphicsApi>(
    gpu: &mut G,
    vertex: StageHandle,
    fragment: StageHandle,
    layout: &ProgramLayout,
) -> Result<ProgramHandle, SetupError> {
    let program = gpu.link_program(vertex, fragment, layout);

    gpu.release_stage(vertex);
    gpu.release_stage(fragment);

    let program = program.ok_or(SetupError::Allocation {
        what: AllocationKind::ShaderProgram,
    })?;

    match gpu.program_status(program) {
        BuildStatus::Ok => Ok(program),
        BuildStatus::Failed(log) => {
            gpu.release_program(program);
            Err(SetupError::Link {
                log: non_empty(log),
            })
        }
    }
}

/// Compiles both stages and links them.
pub fn build_program<G: GraphicsApi>(
    gpu: &mut G,
    sources: &ShaderSources,
    layout: ProgramLayout,
) -> Result<ShaderProgram, SetupError> {
    let vertex = compile_stage(gpu, StageKind::Vertex, &sources.vertex)?;

    let fragment = match compile_stage(gpu, StageKind::Fragment, &sources.fragment) {
        Ok(fragment) => fragment,
        Err(e) => {
            gpu.release_stage(vertex);
            return Err(e);
        }
    };

    let handle = link(gpu, vertex, fragment, &layout)?;
    log::info!("shader program linked");

    Ok(ShaderProgram { handle, layout })
}
