//! Mesh uploader.
//!
//! Validates interleaved vertex data against its declared layout, then
//! uploads it (plus optional `u16` indices) to GPU buffers.

use std::collections::HashSet;

use crate::error::{AllocationKind, SetupError};
use crate::gfx::{BufferHandle, BufferUsage, DrawCall, GraphicsApi, VertexLayout};

/// CPU-side mesh description.
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Interleaved vertex bytes, `stride` bytes per vertex.
    pub vertices: Vec<u8>,
    pub indices: Option<Vec<u16>>,
    pub layout: VertexLayout,
}

impl MeshData {
    /// Builds a mesh from `Pod` vertices.
    pub fn from_vertices<V: bytemuck::Pod>(
        vertices: &[V],
        indices: Option<&[u16]>,
        layout: VertexLayout,
    ) -> Self {
        Self {
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: indices.map(<[u16]>::to_vec),
            layout,
        }
    }

    /// Number of vertices, assuming a valid layout.
    pub fn vertex_count(&self) -> u64 {
        match self.layout.stride {
            0 => 0,
            stride => self.vertices.len() as u64 / stride,
        }
    }
}

/// Uploaded mesh.
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    pub vertex: BufferHandle,
    pub index: Option<BufferHandle>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub layout: VertexLayout,
}

impl MeshBuffer {
    /// The single draw that covers the whole mesh.
    pub fn draw_call(&self) -> DrawCall {
        match self.index {
            Some(_) => DrawCall::Indexed {
                index_count: self.index_count,
            },
            None => DrawCall::Arrays {
                vertex_count: self.vertex_count,
            },
        }
    }
}

fn mismatch(msg: String) -> SetupError {
    SetupError::LayoutMismatch(msg)
}

/// Checks `layout` on its own.
pub fn validate_layout(layout: &VertexLayout) -> Result<(), SetupError> {
    if layout.stride == 0 {
        return Err(mismatch("stride is zero".to_string()));
    }
    if layout.attributes.is_empty() {
        return Err(mismatch("layout declares no attributes".to_string()));
    }

    let mut locations = HashSet::new();
    // (start, end, location) byte spans within one vertex.
    let mut spans = Vec::with_capacity(layout.attributes.len());
    for attr in &layout.attributes {
        if !(1..=4).contains(&attr.components) {
            return Err(mismatch(format!(
                "attribute {} has {} components (expected 1..=4)",
                attr.location, attr.components
            )));
        }
        let end = match attr.offset.checked_add(attr.byte_size()) {
            Some(end) if end <= layout.stride => end,
            _ => {
                return Err(mismatch(format!(
                    "attribute {} at offset {} ({} bytes) runs past stride {}",
                    attr.location,
                    attr.offset,
                    attr.byte_size(),
                    layout.stride
                )));
            }
        };
        if !locations.insert(attr.location) {
            return Err(mismatch(format!("location {} declared twice", attr.location)));
        }
        spans.push((attr.offset, end, attr.location));
    }

    spans.sort_unstable();
    for pair in spans.windows(2) {
        let (_, prev_end, prev_location) = pair[0];
        let (start, _, location) = pair[1];
        if start < prev_end {
            return Err(mismatch(format!(
                "attribute {location} at offset {start} overlaps attribute {prev_location}"
            )));
        }
    }

    let packed = layout.packed_size();
    if packed != layout.stride {
        return Err(mismatch(format!(
            "stride {} does not match per-vertex size {packed}",
            layout.stride
        )));
    }

    Ok(())
}

/// Checks `mesh` data against its layout and indices against its vertices.
pub fn validate_mesh(mesh: &MeshData) -> Result<(), SetupError> {
    validate_layout(&mesh.layout)?;

    let len = mesh.vertices.len() as u64;
    if len == 0 {
        return Err(mismatch("vertex buffer is empty".to_string()));
    }
    if len % mesh.layout.stride != 0 {
        return Err(mismatch(format!(
            "vertex buffer length {len} is not a multiple of stride {}",
            mesh.layout.stride
        )));
    }

    let vertex_count = mesh.vertex_count();
    if vertex_count > u32::MAX as u64 {
        return Err(mismatch(format!("{vertex_count} vertices exceed the draw range")));
    }

    if let Some(indices) = &mesh.indices {
        if indices.is_empty() {
            return Err(mismatch("index buffer is empty".to_string()));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as u64 >= vertex_count) {
            return Err(mismatch(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
    }

    Ok(())
}

/// Validates and uploads `mesh`.
///
/// No GPU call is made unless validation passes. If the index buffer cannot
/// be allocated, the vertex buffer is released again.
pub fn upload_mesh<G: GraphicsApi>(gpu: &mut G, mesh: &MeshData) -> Result<MeshBuffer, SetupError> {
    validate_mesh(mesh)?;

    let vertex = gpu
        .create_buffer(BufferUsage::Vertex, &mesh.vertices)
        .ok_or(SetupError::Allocation { what: AllocationKind::VertexBuffer })?;

    let index = match &mesh.indices {
        Some(indices) => match gpu.create_buffer(BufferUsage::Index, bytemuck::cast_slice(indices)) {
            Some(buffer) => Some(buffer),
            None => {
                gpu.release_buffer(vertex);
                return Err(SetupError::Allocation { what: AllocationKind::IndexBuffer });
            }
        },
        None => None,
    };

    let vertex_count = mesh.vertex_count() as u32;
    let index_count = mesh.indices.as_ref().map_or(0, |i| i.len() as u32);

    log::debug!("uploaded mesh: {vertex_count} vertices, {index_count} indices");

    Ok(MeshBuffer {
        vertex,
        index,
        vertex_count,
        index_count,
        layout: mesh.layout.clone(),
    })
}
