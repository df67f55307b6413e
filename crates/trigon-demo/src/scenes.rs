//! The three demo scenes.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use trigon_engine::gfx::{VertexAttribute, VertexLayout};
use trigon_engine::mesh::MeshData;
use trigon_engine::pipeline::SceneConfig;
use trigon_engine::shader::ShaderSources;

/// Checkerboard bundled with the demo crate.
pub const CHECKER_TEXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/checker.png");

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Position {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const TRIANGLE: [Position; 3] = [
    Position { position: [0.0, 0.5, 0.0] },
    Position { position: [0.5, -0.5, 0.0] },
    Position { position: [-0.5, -0.5, 0.0] },
];

const COLORED_TRIANGLE: [ColoredVertex; 3] = [
    ColoredVertex { position: [0.0, 0.5, 0.0], color: [1.0, 0.0, 0.0] },
    ColoredVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    ColoredVertex { position: [-0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0] },
];

const QUAD: [TexturedVertex; 4] = [
    TexturedVertex { position: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
    TexturedVertex { position: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
    TexturedVertex { position: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
    TexturedVertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

fn stride<V>() -> u64 {
    size_of::<V>() as u64
}

/// Solid purple triangle.
pub fn triangle() -> SceneConfig {
    let layout = VertexLayout::new(
        stride::<Position>(),
        [VertexAttribute::new(0, 3, offset_of!(Position, position) as u64)],
    );
    SceneConfig::new(
        "OpenGL Triangle",
        ShaderSources::new(
            include_str!("shaders/triangle.vert.wgsl"),
            include_str!("shaders/triangle.frag.wgsl"),
        ),
        MeshData::from_vertices(&TRIANGLE, None, layout),
    )
}

/// Triangle with red, green and blue corners interpolated across the face.
pub fn color_triangle() -> SceneConfig {
    let layout = VertexLayout::new(
        stride::<ColoredVertex>(),
        [
            VertexAttribute::new(0, 3, offset_of!(ColoredVertex, position) as u64),
            VertexAttribute::new(1, 3, offset_of!(ColoredVertex, color) as u64),
        ],
    );
    SceneConfig::new(
        "OpenGL Color Triangle",
        ShaderSources::new(
            include_str!("shaders/color_triangle.vert.wgsl"),
            include_str!("shaders/color_triangle.frag.wgsl"),
        ),
        MeshData::from_vertices(&COLORED_TRIANGLE, None, layout),
    )
}

/// Indexed quad sampling the bundled checkerboard.
pub fn textured_quad() -> SceneConfig {
    let layout = VertexLayout::new(
        stride::<TexturedVertex>(),
        [
            VertexAttribute::new(0, 3, offset_of!(TexturedVertex, position) as u64),
            VertexAttribute::new(1, 2, offset_of!(TexturedVertex, uv) as u64),
        ],
    );
    SceneConfig::new(
        "OpenGL Textured Quad",
        ShaderSources::new(
            include_str!("shaders/textured_quad.vert.wgsl"),
            include_str!("shaders/textured_quad.frag.wgsl"),
        ),
        MeshData::from_vertices(&QUAD, Some(&QUAD_INDICES), layout),
    )
    .with_texture(CHECKER_TEXTURE)
}
