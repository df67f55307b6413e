use std::fmt;

/// Byte size of one vertex component. Attributes are always `f32`.
pub const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        })
    }
}

/// Linear RGBA color used for framebuffer clears.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// What the start of a frame clears.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearOp {
    pub color: Color,
    /// Depth clear value; `None` when depth testing is disabled.
    pub depth: Option<f32>,
}

/// One vertex attribute: `components` consecutive `f32`s at `offset` bytes
/// into each vertex, fed to shader input `@location(location)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u8,
    pub offset: u64,
}

impl VertexAttribute {
    pub const fn new(location: u32, components: u8, offset: u64) -> Self {
        Self {
            location,
            components,
            offset,
        }
    }

    /// Size of the attribute in bytes.
    #[inline]
    pub fn byte_size(&self) -> u64 {
        self.components as u64 * FLOAT_SIZE
    }
}

/// Interleaved per-vertex layout of a vertex buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices.
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64, attributes: impl Into<Vec<VertexAttribute>>) -> Self {
        Self {
            stride,
            attributes: attributes.into(),
        }
    }

    /// Sum of all attribute sizes, i.e. the tightly packed vertex size.
    pub fn packed_size(&self) -> u64 {
        self.attributes.iter().map(VertexAttribute::byte_size).sum()
    }
}

/// Fixed-function state a program is linked against.
///
/// wgpu pipelines bake vertex layout, bindings and depth state at link time,
/// so they travel with the link request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProgramLayout {
    pub vertex: VertexLayout,
    /// Program samples one 2D texture (group 0: texture at 0, sampler at 1).
    pub textured: bool,
    pub depth_test: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Vertex,
    /// `u16` indices.
    Index,
}

/// One level of an RGBA8 mip chain.
#[derive(Debug, Copy, Clone)]
pub struct MipLevel<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

/// Texture upload request. Level 0 defines the texture size.
#[derive(Debug, Copy, Clone)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub levels: &'a [MipLevel<'a>],
}

impl TextureDesc<'_> {
    pub fn size(&self) -> (u32, u32) {
        self.levels
            .first()
            .map_or((0, 0), |l| (l.width, l.height))
    }
}

/// Single draw covering a whole mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    Arrays { vertex_count: u32 },
    Indexed { index_count: u32 },
}
