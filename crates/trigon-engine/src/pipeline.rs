//! Scene pipeline.
//!
//! One configurable run: build the shader program, upload the mesh, load the
//! optional texture, run the frame loop, then release everything that was
//! created, newest first. A failed setup step skips the frame loop but still
//! goes through the same teardown.

use std::path::PathBuf;

use crate::error::SetupError;
use crate::frame::{DrawSet, FrameLoop, FrameReport};
use crate::gfx::{ClearOp, Color, GraphicsApi, ProgramLayout};
use crate::mesh::{self, MeshBuffer, MeshData};
use crate::resources::{GpuResource, ResourceLedger};
use crate::shader::{self, ShaderProgram, ShaderSources};
use crate::texture::{self, ImageDecoder, Texture, TextureSettings};
use crate::window::{GraphicsContext, WindowSystem};

/// Depth value the depth buffer is cleared to.
const DEPTH_CLEAR: f32 = 1.0;

/// Everything that distinguishes one demo from another.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub name: String,
    pub shaders: ShaderSources,
    pub mesh: MeshData,
    /// Image bound as the program's texture, if any.
    pub texture: Option<PathBuf>,
    pub texture_settings: TextureSettings,
    pub clear_color: Color,
    pub depth_test: bool,
}

impl SceneConfig {
    pub fn new(name: impl Into<String>, shaders: ShaderSources, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            shaders,
            mesh,
            texture: None,
            texture_settings: TextureSettings::default(),
            clear_color: Color::BLACK,
            depth_test: false,
        }
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn program_layout(&self) -> ProgramLayout {
        ProgramLayout {
            vertex: self.mesh.layout.clone(),
            textured: self.texture.is_some(),
            depth_test: self.depth_test,
        }
    }

    pub fn clear_op(&self) -> ClearOp {
        ClearOp {
            color: self.clear_color,
            depth: self.depth_test.then_some(DEPTH_CLEAR),
        }
    }
}

struct SceneResources {
    program: ShaderProgram,
    mesh: MeshBuffer,
    texture: Option<Texture>,
}

fn setup<G, D>(
    gpu: &mut G,
    scene: &SceneConfig,
    decoder: &D,
    ledger: &mut ResourceLedger,
) -> Result<SceneResources, SetupError>
where
    G: GraphicsApi,
    D: ImageDecoder + ?Sized,
{
    let program = shader::build_program(gpu, &scene.shaders, scene.program_layout())?;
    ledger.record(GpuResource::Program(program.handle));

    let mesh = mesh::upload_mesh(gpu, &scene.mesh)?;
    ledger.record(GpuResource::Buffer(mesh.vertex));
    if let Some(index) = mesh.index {
        ledger.record(GpuResource::Buffer(index));
    }

    let texture = match &scene.texture {
        Some(path) => {
            let texture = texture::load_texture(gpu, decoder, path, &scene.texture_settings)?;
            ledger.record(GpuResource::Texture(texture.handle));
            Some(texture)
        }
        None => None,
    };

    Ok(SceneResources {
        program,
        mesh,
        texture,
    })
}

/// Sets up `scene`, runs it until the window closes, and tears it down.
pub fn run_scene<W, G, D>(
    ctx: &mut GraphicsContext<W, G>,
    scene: &SceneConfig,
    decoder: &D,
) -> Result<FrameReport, SetupError>
where
    W: WindowSystem,
    G: GraphicsApi,
    D: ImageDecoder + ?Sized,
{
    log::info!("setting up scene `{}`", scene.name);

    let mut ledger = ResourceLedger::new();
    let result = setup(ctx.gpu_mut(), scene, decoder, &mut ledger).map(|resources| {
        let draw = DrawSet {
            program: &resources.program,
            mesh: &resources.mesh,
            texture: resources.texture.as_ref(),
            clear: scene.clear_op(),
        };
        FrameLoop::new(ctx, draw).run()
    });

    if let Err(e) = &result {
        log::error!("{} setup failed: {e}", e.stage());
    }

    let released = ledger.release_all(ctx.gpu_mut());
    log::debug!("released {released} GPU objects");

    result
}
