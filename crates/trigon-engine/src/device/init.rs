/// Graphics API level the context is created for.
///
/// `Downlevel` matches the GL 3.0 class hardware the demos were written for and
/// may fall back to the GL backend. `Native` needs a modern backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ContextVersion {
    #[default]
    Downlevel,
    Native,
}

impl ContextVersion {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            ContextVersion::Downlevel => wgpu::Backends::all(),
            ContextVersion::Native => wgpu::Backends::PRIMARY,
        }
    }

    pub fn limits(self) -> wgpu::Limits {
        match self {
            ContextVersion::Downlevel => wgpu::Limits::downlevel_webgl2_defaults(),
            ContextVersion::Native => wgpu::Limits::default(),
        }
    }
}

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Requested API level; device creation fails if no adapter satisfies it.
    pub context: ContextVersion,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and matches a vsynced swap.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            context: ContextVersion::default(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downlevel_accepts_every_backend() {
        assert_eq!(ContextVersion::Downlevel.backends(), wgpu::Backends::all());
        assert!(ContextVersion::Native.backends().contains(wgpu::Backends::VULKAN));
        assert!(!ContextVersion::Native.backends().contains(wgpu::Backends::GL));
    }

    #[test]
    fn downlevel_limits_are_not_stricter_than_needed_for_demos() {
        let limits = ContextVersion::Downlevel.limits();
        assert!(limits.max_texture_dimension_2d >= 2048);
        assert!(limits.max_vertex_attributes >= 2);
    }
}
