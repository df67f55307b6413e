//! Frame loop.
//!
//! Two states: `Running` and `Closing`. The close flag is checked once at the
//! top of every iteration, so a close requested while polling takes effect
//! only after the frame that was in flight has been presented.

use crate::gfx::{ClearOp, FrameStatus, GraphicsApi};
use crate::mesh::MeshBuffer;
use crate::shader::ShaderProgram;
use crate::texture::Texture;
use crate::window::{GraphicsContext, WindowSystem};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Counters collected over a loop run.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FrameReport {
    /// Frames that reached the screen.
    pub presented: u64,
    /// Frames dropped because the surface could not be acquired or presented.
    pub skipped: u64,
    /// Draw calls rejected by the backend; their frames were still presented.
    pub failed_draws: u64,
}

/// Everything one iteration binds and draws.
#[derive(Debug, Copy, Clone)]
pub struct DrawSet<'a> {
    pub program: &'a ShaderProgram,
    pub mesh: &'a MeshBuffer,
    pub texture: Option<&'a Texture>,
    pub clear: ClearOp,
}

pub struct FrameLoop<'a, W, G> {
    ctx: &'a mut GraphicsContext<W, G>,
    draw: DrawSet<'a>,
    state: LoopState,
    report: FrameReport,
}

impl<'a, W, G> FrameLoop<'a, W, G>
where
    W: WindowSystem,
    G: GraphicsApi,
{
    pub fn new(ctx: &'a mut GraphicsContext<W, G>, draw: DrawSet<'a>) -> Self {
        Self {
            ctx,
            draw,
            state: LoopState::Running,
            report: FrameReport::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn report(&self) -> FrameReport {
        self.report
    }

    /// Runs one iteration, or moves to `Closing` if the close flag is set.
    pub fn step(&mut self) -> LoopState {
        if self.state == LoopState::Closing {
            return self.state;
        }

        if self.ctx.should_close() {
            log::info!("close requested; leaving frame loop");
            self.state = LoopState::Closing;
            return self.state;
        }

        self.render();
        self.ctx.poll_events();

        self.state
    }

    /// Steps until `Closing` and returns the counters.
    pub fn run(mut self) -> FrameReport {
        log::info!("entering frame loop");
        while self.step() == LoopState::Running {}
        log::info!(
            "frame loop finished: {} presented, {} skipped, {} failed draws",
            self.report.presented,
            self.report.skipped,
            self.report.failed_draws
        );
        self.report
    }

    fn render(&mut self) {
        let DrawSet {
            program,
            mesh,
            texture,
            clear,
        } = self.draw;

        match self.ctx.gpu_mut().begin_frame(clear) {
            FrameStatus::Ready => {}
            status => {
                self.drop_frame(status);
                return;
            }
        }

        let gpu = self.ctx.gpu_mut();
        gpu.bind_program(program.handle);
        gpu.bind_vertex_layout(mesh.vertex, mesh.index);
        if let Some(texture) = texture {
            gpu.bind_texture(texture.handle);
        }

        if gpu.draw(mesh.draw_call()) != FrameStatus::Ready {
            self.report.failed_draws += 1;
        }

        match self.ctx.gpu_mut().present() {
            FrameStatus::Ready => self.report.presented += 1,
            status => self.drop_frame(status),
        }
    }

    fn drop_frame(&mut self, status: FrameStatus) {
        self.report.skipped += 1;
        if status == FrameStatus::Lost {
            log::error!("surface lost beyond recovery; closing");
            self.ctx.request_close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{BufferUsage, Color, DrawCall, ProgramLayout, VertexAttribute, VertexLayout};
    use crate::testing::{Call, MockGpu, MockWindow};
    use crate::window::{Key, KeyState, WindowEvent};

    const CLEAR: ClearOp = ClearOp {
        color: Color::BLACK,
        depth: None,
    };

    fn escape() -> WindowEvent {
        WindowEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            repeat: false,
        }
    }

    fn fixtures(gpu: &mut MockGpu, indexed: bool) -> (ShaderProgram, MeshBuffer) {
        let layout = VertexLayout::new(12, [VertexAttribute::new(0, 3, 0)]);
        let program = ShaderProgram {
            handle: gpu.link_for_test(),
            layout: ProgramLayout {
                vertex: layout.clone(),
                textured: false,
                depth_test: false,
            },
        };
        let mesh = MeshBuffer {
            vertex: gpu.create_buffer_for_test(BufferUsage::Vertex),
            index: indexed.then(|| gpu.create_buffer_for_test(BufferUsage::Index)),
            vertex_count: 4,
            index_count: if indexed { 6 } else { 0 },
            layout,
        };
        gpu.clear_calls();
        (program, mesh)
    }

    #[test]
    fn iteration_runs_clear_bind_draw_present_in_order() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, false);
        let mut ctx = GraphicsContext::new(MockWindow::new(640, 480), gpu);
        ctx.gpu_mut().clear_calls();

        let mut frames = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        );
        assert_eq!(frames.step(), LoopState::Running);
        drop(frames);

        assert_eq!(
            ctx.gpu().calls(),
            &[
                Call::BeginFrame(CLEAR),
                Call::BindProgram(program.handle),
                Call::BindVertexLayout(mesh.vertex, None),
                Call::Draw(DrawCall::Arrays { vertex_count: 4 }),
                Call::Present,
            ]
        );
        assert_eq!(ctx.window().polls(), 1);
    }

    #[test]
    fn escape_closes_after_current_iteration_completes() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, true);
        let mut window = MockWindow::new(640, 480);
        window.script(vec![]);
        window.script(vec![escape()]);
        let mut ctx = GraphicsContext::new(window, gpu);

        let mut frames = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        );
        assert_eq!(frames.step(), LoopState::Running);
        // Escape arrives during this iteration's poll; the frame still completes.
        assert_eq!(frames.step(), LoopState::Running);
        assert_eq!(frames.report().presented, 2);
        assert_eq!(frames.step(), LoopState::Closing);
        let report = frames.report();
        drop(frames);

        assert_eq!(report.presented, 2);
        assert_eq!(ctx.gpu().count(|c| matches!(c, Call::Draw(_))), 2);
        assert_eq!(ctx.gpu().count(|c| *c == Call::Present), 2);
        // Close flag is only read at the top of an iteration, never between draw and present.
        assert_eq!(ctx.gpu().calls().last(), Some(&Call::Present));
    }

    #[test]
    fn quad_issues_one_indexed_draw_of_six_indices_per_frame() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, true);
        let mut window = MockWindow::new(640, 480);
        window.script(vec![escape()]);
        let mut ctx = GraphicsContext::new(window, gpu);

        let report = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        )
        .run();

        assert_eq!(report.presented, 1);
        let draws: Vec<_> = ctx
            .gpu()
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Draw(_)))
            .cloned()
            .collect();
        assert_eq!(draws, vec![Call::Draw(DrawCall::Indexed { index_count: 6 })]);
    }

    #[test]
    fn skipped_frame_continues_loop_and_still_polls() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, false);
        gpu.script_begin_frame([FrameStatus::Skipped]);
        let mut window = MockWindow::new(640, 480);
        window.script(vec![]);
        window.script(vec![escape()]);
        let mut ctx = GraphicsContext::new(window, gpu);

        let report = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        )
        .run();

        assert_eq!(report, FrameReport { presented: 1, skipped: 1, failed_draws: 0 });
        assert_eq!(ctx.window().polls(), 2);
    }

    #[test]
    fn failed_draw_is_counted_and_frame_presented() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, false);
        gpu.fail_draws();
        let mut window = MockWindow::new(640, 480);
        window.script(vec![escape()]);
        let mut ctx = GraphicsContext::new(window, gpu);

        let report = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        )
        .run();

        assert_eq!(report, FrameReport { presented: 1, skipped: 0, failed_draws: 1 });
    }

    #[test]
    fn lost_surface_requests_close() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, false);
        gpu.script_begin_frame([FrameStatus::Lost]);
        let mut ctx = GraphicsContext::new(MockWindow::new(640, 480), gpu);

        let report = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        )
        .run();

        assert_eq!(report, FrameReport { presented: 0, skipped: 1, failed_draws: 0 });
        assert!(ctx.should_close());
    }

    #[test]
    fn closed_window_never_draws() {
        let mut gpu = MockGpu::default();
        let (program, mesh) = fixtures(&mut gpu, false);
        let mut ctx = GraphicsContext::new(MockWindow::new(640, 480), gpu);
        ctx.request_close();

        let report = FrameLoop::new(
            &mut ctx,
            DrawSet { program: &program, mesh: &mesh, texture: None, clear: CLEAR },
        )
        .run();

        assert_eq!(report, FrameReport::default());
        assert_eq!(ctx.gpu().count(|c| matches!(c, Call::BeginFrame(_))), 0);
    }
}
