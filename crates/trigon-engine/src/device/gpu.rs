use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::frame::{self, Binds, PendingFrame};
use super::reflect::{self, LinkedEntryPoints};
use super::surface::{self, DepthTarget, DEPTH_FORMAT};
use super::{GpuInit, SurfaceErrorAction};
use crate::gfx::{
    BufferHandle, BufferUsage, BuildStatus, ClearOp, DrawCall, FrameStatus, GraphicsApi,
    HandleAllocator, ProgramHandle, ProgramLayout, StageHandle, StageKind, TextureDesc,
    TextureHandle,
};

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

enum StageEntry {
    Compiled {
        kind: StageKind,
        module: naga::Module,
        shader: wgpu::ShaderModule,
    },
    Failed {
        log: String,
    },
}

struct ProgramEntry {
    /// `Err` carries the link log.
    pipeline: Result<wgpu::RenderPipeline, String>,
    textured: bool,
    depth_test: bool,
}

struct BufferEntry {
    buffer: wgpu::Buffer,
    usage: BufferUsage,
}

struct TextureEntry {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// wgpu implementation of [`GraphicsApi`].
///
/// Owns Instance/Adapter/Device/Queue plus the window surface, and maps the
/// handle-based object model onto wgpu resources:
/// - stages are naga modules plus `wgpu::ShaderModule`s
/// - programs are render pipelines
/// - a frame is an acquired surface texture plus one command encoder
pub struct WgpuDevice {
    /// In-flight frame; must not outlive the surface.
    frame: Option<PendingFrame>,

    /// Surface bound to the window. Drops before the device and the window
    /// reference.
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    /// Created lazily by the first depth-tested program.
    depth: Option<DepthTarget>,
    texture_layout: wgpu::BindGroupLayout,

    handles: HandleAllocator,
    stages: HashMap<StageHandle, StageEntry>,
    programs: HashMap<ProgramHandle, ProgramEntry>,
    buffers: HashMap<BufferHandle, BufferEntry>,
    textures: HashMap<TextureHandle, TextureEntry>,

    binds: Binds,

    window: Arc<Window>,
}

impl WgpuDevice {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.context.backends(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .with_context(|| format!("no GPU adapter supports {:?}", init.context))?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trigon device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.context.limits().using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .with_context(|| format!("failed to create a {:?} device", init.context))?;

        device.on_uncaptured_error(Arc::new(|e: wgpu::Error| {
            log::error!("wgpu uncaptured error: {e}");
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        let texture_layout = create_texture_layout(&device);

        Ok(Self {
            frame: None,
            surface,
            device,
            queue,
            config,
            size,
            depth: None,
            texture_layout,
            handles: HandleAllocator::default(),
            stages: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            binds: Binds::default(),
            window,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn ensure_depth(&mut self) {
        if self.depth.is_none() {
            self.depth = Some(surface::create_depth_target(
                &self.device,
                self.config.width,
                self.config.height,
            ));
        }
    }

    fn build_pipeline(
        &self,
        vertex: StageHandle,
        fragment: StageHandle,
        layout: &ProgramLayout,
    ) -> std::result::Result<wgpu::RenderPipeline, String> {
        let (vs_module, vs_shader) = self.compiled_stage(vertex, StageKind::Vertex)?;
        let (fs_module, fs_shader) = self.compiled_stage(fragment, StageKind::Fragment)?;
        let LinkedEntryPoints {
            vertex: vs_entry,
            fragment: fs_entry,
        } = reflect::link_interface(vs_module, fs_module, layout)?;

        create_pipeline(
            &self.device,
            &self.texture_layout,
            self.config.format,
            (vs_shader, &vs_entry),
            (fs_shader, &fs_entry),
            layout,
        )
    }

    fn compiled_stage(
        &self,
        handle: StageHandle,
        expected: StageKind,
    ) -> std::result::Result<(&naga::Module, &wgpu::ShaderModule), String> {
        match self.stages.get(&handle) {
            Some(StageEntry::Compiled {
                kind,
                module,
                shader,
            }) if *kind == expected => Ok((module, shader)),
            Some(StageEntry::Compiled { kind, .. }) => Err(format!(
                "stage {} is a {kind} stage, expected {expected}",
                handle.raw()
            )),
            Some(StageEntry::Failed { .. }) => Err(format!(
                "{expected} stage {} did not compile",
                handle.raw()
            )),
            None => Err(format!("unknown {expected} stage {}", handle.raw())),
        }
    }

    /// Records the draw into the pending frame; `Err` names why it was rejected.
    fn record_draw(&mut self, call: DrawCall) -> std::result::Result<(), String> {
        let Self {
            frame,
            programs,
            buffers,
            textures,
            binds,
            depth,
            size,
            ..
        } = self;
        let frame = frame.as_mut().ok_or("draw outside of a frame")?;

        let program_handle = binds.program.ok_or("no program bound")?;
        let program = programs.get(&program_handle).ok_or("bound program was released")?;
        let pipeline = program
            .pipeline
            .as_ref()
            .map_err(|_| "bound program failed to link".to_string())?;

        let vertex = binds
            .vertex
            .and_then(|h| buffers.get(&h))
            .filter(|b| b.usage == BufferUsage::Vertex)
            .ok_or("no vertex buffer bound")?;
        let index = match call {
            DrawCall::Indexed { .. } => Some(
                binds
                    .index
                    .and_then(|h| buffers.get(&h))
                    .filter(|b| b.usage == BufferUsage::Index)
                    .ok_or("indexed draw without an index buffer")?,
            ),
            DrawCall::Arrays { .. } => None,
        };
        let bind_group = if program.textured {
            let texture = binds
                .texture
                .and_then(|h| textures.get(&h))
                .ok_or("textured program without a bound texture")?;
            Some(&texture.bind_group)
        } else {
            None
        };
        let depth_stencil_attachment = if program.depth_test {
            let target = depth.as_ref().ok_or("depth-tested program without a depth target")?;
            Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.view,
                depth_ops: Some(wgpu::Operations {
                    load: frame::depth_load(frame),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            })
        } else {
            None
        };

        let color_load = frame::color_load(frame);
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_viewport(0.0, 0.0, size.width as f32, size.height as f32, 0.0, 1.0);
            rpass.set_pipeline(pipeline);
            if let Some(bind_group) = bind_group {
                rpass.set_bind_group(0, bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, vertex.buffer.slice(..));
            match (call, index) {
                (DrawCall::Indexed { index_count }, Some(index)) => {
                    rpass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..index_count, 0, 0..1);
                }
                (DrawCall::Arrays { vertex_count }, _) => rpass.draw(0..vertex_count, 0..1),
                (DrawCall::Indexed { .. }, None) => {}
            }
        }

        frame.drawn = true;
        Ok(())
    }
}

impl GraphicsApi for WgpuDevice {
    fn create_stage(&mut self, kind: StageKind, source: &str) -> Option<StageHandle> {
        let handle: StageHandle = self.handles.next()?;
        let entry = match reflect::compile(source) {
            Ok(module) => {
                let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
                let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(match kind {
                        StageKind::Vertex => "trigon vertex stage",
                        StageKind::Fragment => "trigon fragment stage",
                    }),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                });
                match pollster::block_on(scope.pop()) {
                    Some(err) => StageEntry::Failed {
                        log: err.to_string(),
                    },
                    None => StageEntry::Compiled {
                        kind,
                        module,
                        shader,
                    },
                }
            }
            Err(log) => StageEntry::Failed { log },
        };
        self.stages.insert(handle, entry);
        Some(handle)
    }

    fn stage_status(&self, stage: StageHandle) -> BuildStatus {
        match self.stages.get(&stage) {
            Some(StageEntry::Compiled { .. }) => BuildStatus::Ok,
            Some(StageEntry::Failed { log }) => BuildStatus::Failed(log.clone()),
            None => BuildStatus::Failed(format!("unknown stage {}", stage.raw())),
        }
    }

    fn release_stage(&mut self, stage: StageHandle) {
        if self.stages.remove(&stage).is_none() {
            log::warn!("release of unknown stage {}", stage.raw());
        }
    }

    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
        layout: &ProgramLayout,
    ) -> Option<ProgramHandle> {
        let handle: ProgramHandle = self.handles.next()?;
        if layout.depth_test {
            self.ensure_depth();
        }
        let pipeline = self.build_pipeline(vertex, fragment, layout);
        self.programs.insert(
            handle,
            ProgramEntry {
                pipeline,
                textured: layout.textured,
                depth_test: layout.depth_test,
            },
        );
        Some(handle)
    }

    fn program_status(&self, program: ProgramHandle) -> BuildStatus {
        match self.programs.get(&program).map(|p| &p.pipeline) {
            Some(Ok(_)) => BuildStatus::Ok,
            Some(Err(log)) => BuildStatus::Failed(log.clone()),
            None => BuildStatus::Failed(format!("unknown program {}", program.raw())),
        }
    }

    fn release_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("release of unknown program {}", program.raw());
        }
    }

    fn create_buffer(&mut self, usage: BufferUsage, contents: &[u8]) -> Option<BufferHandle> {
        if contents.is_empty() || contents.len() as u64 > self.device.limits().max_buffer_size {
            return None;
        }
        let handle: BufferHandle = self.handles.next()?;
        let (label, usages) = match usage {
            BufferUsage::Vertex => ("trigon vertex buffer", wgpu::BufferUsages::VERTEX),
            BufferUsage::Index => ("trigon index buffer", wgpu::BufferUsages::INDEX),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usages,
            });
        self.buffers.insert(handle, BufferEntry { buffer, usage });
        Some(handle)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(entry) => entry.buffer.destroy(),
            None => log::warn!("release of unknown buffer {}", buffer.raw()),
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Option<TextureHandle> {
        let (width, height) = desc.size();
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return None;
        }
        if desc
            .levels
            .iter()
            .any(|l| l.pixels.len() as u64 != 4 * l.width as u64 * l.height as u64)
        {
            log::warn!("texture `{}` has a level with the wrong pixel count", desc.label);
            return None;
        }
        let handle: TextureHandle = self.handles.next()?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in desc.levels.iter().enumerate() {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("trigon sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(desc.label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                bind_group,
            },
        );
        Some(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        match self.textures.remove(&texture) {
            Some(entry) => entry.texture.destroy(),
            None => log::warn!("release of unknown texture {}", texture.raw()),
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let new_size = PhysicalSize::new(width, height);
        let configured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
        if configured && self.depth.is_some() {
            self.depth = Some(surface::create_depth_target(&self.device, width, height));
        }
    }

    fn begin_frame(&mut self, clear: ClearOp) -> FrameStatus {
        if self.frame.take().is_some() {
            log::warn!("previous frame was never presented; discarding it");
        }
        self.binds = Binds::default();
        if self.size.width == 0 || self.size.height == 0 {
            return FrameStatus::Skipped;
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::map_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    err.clone(),
                );
                match action {
                    SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
                    _ => log::debug!("surface error: {err} -> {action:?}"),
                }
                return action.into();
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trigon frame encoder"),
            });

        self.frame = Some(PendingFrame {
            surface_texture,
            view,
            encoder,
            clear,
            drawn: false,
        });
        FrameStatus::Ready
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.binds.program = Some(program);
    }

    fn bind_vertex_layout(&mut self, vertex: BufferHandle, index: Option<BufferHandle>) {
        self.binds.vertex = Some(vertex);
        self.binds.index = index;
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.binds.texture = Some(texture);
    }

    fn draw(&mut self, call: DrawCall) -> FrameStatus {
        match self.record_draw(call) {
            Ok(()) => FrameStatus::Ready,
            Err(reason) => {
                log::warn!("draw rejected: {reason}");
                FrameStatus::Skipped
            }
        }
    }

    fn present(&mut self) -> FrameStatus {
        let Some(mut frame) = self.frame.take() else {
            return FrameStatus::Skipped;
        };

        if !frame.drawn {
            // Clear-only pass so a rejected draw still shows the clear color.
            let depth_stencil_attachment = match (frame.clear.depth, &self.depth) {
                (Some(depth), Some(target)) => Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                _ => None,
            };
            let color_load = frame::color_load(&frame);
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let PendingFrame {
            surface_texture,
            view,
            encoder,
            ..
        } = frame;
        self.window.pre_present_notify();
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
        FrameStatus::Ready
    }
}

fn create_texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("trigon texture layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Creates a render pipeline with wgpu validation captured in an error scope,
/// so a rejected pipeline becomes a link log instead of an uncaptured error.
fn create_pipeline(
    device: &wgpu::Device,
    texture_layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    vertex: (&wgpu::ShaderModule, &str),
    fragment: (&wgpu::ShaderModule, &str),
    layout: &ProgramLayout,
) -> std::result::Result<wgpu::RenderPipeline, String> {
    let attributes = layout
        .vertex
        .attributes
        .iter()
        .map(|a| {
            Ok(wgpu::VertexAttribute {
                format: vertex_format(a.components)?,
                offset: a.offset,
                shader_location: a.location,
            })
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;

    let bind_group_layouts: &[&wgpu::BindGroupLayout] = if layout.textured {
        &[texture_layout]
    } else {
        &[]
    };
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("trigon pipeline layout"),
        bind_group_layouts,
        immediate_size: 0,
    });

    let depth_stencil = layout.depth_test.then(|| wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    let pipeline = device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trigon pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex.0,
                entry_point: Some(vertex.1),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.vertex.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment.0,
                entry_point: Some(fragment.1),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err.to_string()),
        None => Ok(pipeline),
    }
}

fn vertex_format(components: u8) -> std::result::Result<wgpu::VertexFormat, String> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        n => Err(format!("unsupported attribute width: {n} floats")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_widths_map_to_float_formats() {
        assert_eq!(vertex_format(2), Ok(wgpu::VertexFormat::Float32x2));
        assert_eq!(vertex_format(3), Ok(wgpu::VertexFormat::Float32x3));
        assert!(vertex_format(0).is_err());
        assert!(vertex_format(5).is_err());
    }

    // ── pipeline creation ────────────────────────────────────────────────

    const UV_VS: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}
"#;

    const SAMPLING_FS: &str = r#"
@group(0) @binding(0) var tex: texture_2d<f32>;
@group(0) @binding(1) var tex_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(tex, tex_sampler, uv);
}
"#;

    /// Device without a surface; `None` on machines with no usable adapter.
    fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    fn uv_program(textured: bool) -> ProgramLayout {
        ProgramLayout {
            vertex: crate::gfx::VertexLayout::new(
                20,
                [
                    crate::gfx::VertexAttribute::new(0, 3, 0),
                    crate::gfx::VertexAttribute::new(1, 2, 12),
                ],
            ),
            textured,
            depth_test: false,
        }
    }

    fn build(device: &wgpu::Device, layout: &ProgramLayout) -> std::result::Result<(), String> {
        let module = |source: &str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: None,
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };
        let vs = module(UV_VS);
        let fs = module(SAMPLING_FS);
        create_pipeline(
            device,
            &create_texture_layout(device),
            wgpu::TextureFormat::Rgba8UnormSrgb,
            (&vs, "vs_main"),
            (&fs, "fs_main"),
            layout,
        )
        .map(drop)
    }

    #[test]
    fn textured_pipeline_is_created() {
        let Some((device, _queue)) = headless_device() else {
            log::warn!("no GPU adapter; skipping");
            return;
        };
        assert_eq!(build(&device, &uv_program(true)), Ok(()));
    }

    #[test]
    fn rejected_pipeline_becomes_a_log_instead_of_a_panic() {
        let Some((device, _queue)) = headless_device() else {
            log::warn!("no GPU adapter; skipping");
            return;
        };
        // The fragment stage samples group 0 but the layout has no bind group.
        let log = build(&device, &uv_program(false)).unwrap_err();
        assert!(!log.is_empty());
    }
}
