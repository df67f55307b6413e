//! Recording mock collaborators for lifecycle tests.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::gfx::{
    BufferHandle, BufferUsage, BuildStatus, ClearOp, DrawCall, FrameStatus, GraphicsApi,
    HandleAllocator, ProgramHandle, ProgramLayout, StageHandle, StageKind, TextureDesc,
    TextureHandle,
};
use crate::resources::GpuResource;
use crate::texture::{DecodedImage, ImageDecoder};
use crate::window::{WindowEvent, WindowSystem};

/// One recorded call into [`MockGpu`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateStage(StageKind, StageHandle),
    ReleaseStage(StageHandle),
    LinkProgram {
        vertex: StageHandle,
        fragment: StageHandle,
        program: ProgramHandle,
    },
    ReleaseProgram(ProgramHandle),
    CreateBuffer(BufferUsage, usize, BufferHandle),
    ReleaseBuffer(BufferHandle),
    CreateTexture {
        width: u32,
        height: u32,
        levels: usize,
        texture: TextureHandle,
    },
    ReleaseTexture(TextureHandle),
    SetViewport(u32, u32),
    BeginFrame(ClearOp),
    BindProgram(ProgramHandle),
    BindVertexLayout(BufferHandle, Option<BufferHandle>),
    BindTexture(TextureHandle),
    Draw(DrawCall),
    Present,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Kind {
    Stage,
    Program,
    Buffer,
    Texture,
}

impl GpuResource {
    /// The call that releases this resource.
    pub(crate) fn release_call(&self) -> Call {
        match *self {
            GpuResource::Program(h) => Call::ReleaseProgram(h),
            GpuResource::Buffer(h) => Call::ReleaseBuffer(h),
            GpuResource::Texture(h) => Call::ReleaseTexture(h),
        }
    }
}

/// [`GraphicsApi`] that records calls and tracks which objects are alive.
#[derive(Debug, Default)]
pub struct MockGpu {
    calls: Vec<Call>,
    handles: HandleAllocator,
    live: BTreeMap<u32, Kind>,
    invalid: Vec<Call>,

    stage_kinds: HashMap<StageHandle, StageKind>,
    failing_stages: HashMap<StageKind, String>,
    link_failure: Option<String>,
    failed_programs: HashSet<ProgramHandle>,

    deny_stages: bool,
    denied_buffers: HashSet<BufferUsage>,
    deny_textures: bool,
    fail_draws: bool,
    begin_frame_script: VecDeque<FrameStatus>,
}

impl MockGpu {
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn fail_compile(&mut self, kind: StageKind, log: &str) {
        self.failing_stages.insert(kind, log.to_string());
    }

    pub fn fail_link(&mut self, log: &str) {
        self.link_failure = Some(log.to_string());
    }

    pub fn deny_stage_allocation(&mut self) {
        self.deny_stages = true;
    }

    pub fn deny_buffer_allocation(&mut self, usage: BufferUsage) {
        self.denied_buffers.insert(usage);
    }

    pub fn deny_texture_allocation(&mut self) {
        self.deny_textures = true;
    }

    pub fn fail_draws(&mut self) {
        self.fail_draws = true;
    }

    pub fn script_begin_frame(&mut self, statuses: impl IntoIterator<Item = FrameStatus>) {
        self.begin_frame_script.extend(statuses);
    }

    fn live_of(&self, kind: Kind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn live_stages(&self) -> usize {
        self.live_of(Kind::Stage)
    }

    pub fn live_programs(&self) -> usize {
        self.live_of(Kind::Program)
    }

    pub fn live_buffers(&self) -> usize {
        self.live_of(Kind::Buffer)
    }

    pub fn live_textures(&self) -> usize {
        self.live_of(Kind::Texture)
    }

    /// Raw ids of objects never released.
    pub fn leaks(&self) -> Vec<u32> {
        self.live.keys().copied().collect()
    }

    /// Releases of unknown or already released handles.
    pub fn invalid_releases(&self) -> &[Call] {
        &self.invalid
    }

    /// Long-lived objects in creation order.
    pub fn created_resources(&self) -> Vec<GpuResource> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::LinkProgram { program, .. } => Some(GpuResource::Program(program)),
                Call::CreateBuffer(_, _, h) => Some(GpuResource::Buffer(h)),
                Call::CreateTexture { texture, .. } => Some(GpuResource::Texture(texture)),
                _ => None,
            })
            .collect()
    }

    /// Registers a live buffer without recording a call.
    pub fn create_buffer_for_test(&mut self, _usage: BufferUsage) -> BufferHandle {
        self.alloc(Kind::Buffer)
    }

    /// Registers a live, linked program without recording a call.
    pub fn link_for_test(&mut self) -> ProgramHandle {
        self.alloc(Kind::Program)
    }

    fn alloc<H: From<NonZeroU32>>(&mut self, kind: Kind) -> H {
        let raw: NonZeroU32 = self.handles.next().expect("mock handle space exhausted");
        self.live.insert(raw.get(), kind);
        H::from(raw)
    }

    fn release(&mut self, raw: u32, kind: Kind, call: Call) {
        if self.live.get(&raw) == Some(&kind) {
            self.live.remove(&raw);
        } else {
            self.invalid.push(call.clone());
        }
        self.calls.push(call);
    }
}

impl GraphicsApi for MockGpu {
    fn create_stage(&mut self, kind: StageKind, _source: &str) -> Option<StageHandle> {
        if self.deny_stages {
            return None;
        }
        let stage: StageHandle = self.alloc(Kind::Stage);
        self.stage_kinds.insert(stage, kind);
        self.calls.push(Call::CreateStage(kind, stage));
        Some(stage)
    }

    fn stage_status(&self, stage: StageHandle) -> BuildStatus {
        let failure = self
            .stage_kinds
            .get(&stage)
            .and_then(|kind| self.failing_stages.get(kind));
        match failure {
            Some(log) => BuildStatus::Failed(log.clone()),
            None => BuildStatus::Ok,
        }
    }

    fn release_stage(&mut self, stage: StageHandle) {
        self.release(stage.raw().get(), Kind::Stage, Call::ReleaseStage(stage));
    }

    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
        _layout: &ProgramLayout,
    ) -> Option<ProgramHandle> {
        let program: ProgramHandle = self.alloc(Kind::Program);
        if self.link_failure.is_some() {
            self.failed_programs.insert(program);
        }
        self.calls.push(Call::LinkProgram {
            vertex,
            fragment,
            program,
        });
        Some(program)
    }

    fn program_status(&self, program: ProgramHandle) -> BuildStatus {
        match (&self.link_failure, self.failed_programs.contains(&program)) {
            (Some(log), true) => BuildStatus::Failed(log.clone()),
            _ => BuildStatus::Ok,
        }
    }

    fn release_program(&mut self, program: ProgramHandle) {
        self.release(program.raw().get(), Kind::Program, Call::ReleaseProgram(program));
    }

    fn create_buffer(&mut self, usage: BufferUsage, contents: &[u8]) -> Option<BufferHandle> {
        if self.denied_buffers.contains(&usage) {
            return None;
        }
        let buffer: BufferHandle = self.alloc(Kind::Buffer);
        self.calls.push(Call::CreateBuffer(usage, contents.len(), buffer));
        Some(buffer)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.release(buffer.raw().get(), Kind::Buffer, Call::ReleaseBuffer(buffer));
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Option<TextureHandle> {
        if self.deny_textures {
            return None;
        }
        let texture: TextureHandle = self.alloc(Kind::Texture);
        let (width, height) = desc.size();
        self.calls.push(Call::CreateTexture {
            width,
            height,
            levels: desc.levels.len(),
            texture,
        });
        Some(texture)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.release(texture.raw().get(), Kind::Texture, Call::ReleaseTexture(texture));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::SetViewport(width, height));
    }

    fn begin_frame(&mut self, clear: ClearOp) -> FrameStatus {
        self.calls.push(Call::BeginFrame(clear));
        self.begin_frame_script
            .pop_front()
            .unwrap_or(FrameStatus::Ready)
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::BindProgram(program));
    }

    fn bind_vertex_layout(&mut self, vertex: BufferHandle, index: Option<BufferHandle>) {
        self.calls.push(Call::BindVertexLayout(vertex, index));
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn draw(&mut self, call: DrawCall) -> FrameStatus {
        self.calls.push(Call::Draw(call));
        if self.fail_draws {
            FrameStatus::Skipped
        } else {
            FrameStatus::Ready
        }
    }

    fn present(&mut self) -> FrameStatus {
        self.calls.push(Call::Present);
        FrameStatus::Ready
    }
}

/// [`WindowSystem`] that replays one scripted event batch per poll.
#[derive(Debug)]
pub struct MockWindow {
    size: (u32, u32),
    close: bool,
    script: VecDeque<Vec<WindowEvent>>,
    polls: usize,
}

impl MockWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            close: false,
            script: VecDeque::new(),
            polls: 0,
        }
    }

    /// Queues the events returned by the next unscripted poll.
    pub fn script(&mut self, events: Vec<WindowEvent>) {
        self.script.push_back(events);
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl WindowSystem for MockWindow {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn set_should_close(&mut self, close: bool) {
        self.close = close;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.polls += 1;
        self.script.pop_front().unwrap_or_default()
    }
}

/// [`ImageDecoder`] serving in-memory images by path.
#[derive(Debug, Default)]
pub struct MockDecoder {
    images: HashMap<PathBuf, DecodedImage>,
}

impl MockDecoder {
    pub fn insert(&mut self, path: &str, image: DecodedImage) {
        self.images.insert(PathBuf::from(path), image);
    }
}

impl ImageDecoder for MockDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }
}
