use std::path::Path;
use std::time::{Duration, Instant};

use lge_assets::MeshData;
use lge_common::{Color565, DirtyRect, ScreenSize};
use lge_damage::DamageTracker;
use lge_render::{DrawBackend, text_extent};
use lge_scene::{Camera, DrawOutcome, InstanceId, Light, ModelId, Placement, Registry, SceneRenderer};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::timer::{FpsCounter, FrameTimer};

/// Present durations kept for profiling.
const TIMER_HISTORY: usize = 120;

/// What one `present` pushed to the display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PresentReport {
    pub rects: Vec<DirtyRect>,
    /// Total pixels blitted.
    pub pixels: u64,
}

/// The scripting boundary.
///
/// One engine drives one backend. Script-facing methods mirror the native
/// functions a host binds; [`Engine::invoke`] dispatches them by name.
pub struct Engine<B: DrawBackend> {
    backend: B,
    screen: ScreenSize,
    damage: Box<dyn DamageTracker>,
    registry: Registry,
    renderer: SceneRenderer,
    last_clear: Option<Color565>,
    profile_interval: u32,
    presents: u64,
    timer: FrameTimer,
    fps: FpsCounter,
    /// End of the last `delay` pause.
    last_delay: Instant,
}

impl<B: DrawBackend> Engine<B> {
    /// Build an engine around `backend`. The canvas size comes from the
    /// backend; a different size in `config` is logged and ignored.
    pub fn new(backend: B, config: &EngineConfig) -> Self {
        let screen = backend.size();
        if screen != config.screen() {
            tracing::warn!(
                backend = ?screen,
                config = ?config.screen(),
                "backend size differs from config, using backend size"
            );
        }
        let damage = config.damage.build(screen);
        tracing::info!(
            width = screen.width,
            height = screen.height,
            damage = damage.name(),
            "engine created"
        );
        Self {
            backend,
            screen,
            damage,
            registry: Registry::new(),
            renderer: SceneRenderer::new(
                Camera::new(config.camera.fov, config.camera.cam_distance),
                Light::default(),
            ),
            last_clear: None,
            profile_interval: config.profile_interval,
            presents: 0,
            timer: FrameTimer::new(TIMER_HISTORY),
            fps: FpsCounter::new(Instant::now()),
            last_delay: Instant::now(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn camera(&self) -> Camera {
        self.renderer.camera()
    }

    pub fn light(&self) -> Light {
        self.renderer.light()
    }

    /// Name of the active damage strategy.
    pub fn damage_strategy(&self) -> &'static str {
        self.damage.name()
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn set_3d_camera(&mut self, fov: f32, cam_distance: f32) {
        self.renderer.set_camera(Camera::new(fov, cam_distance));
    }

    /// A zero direction disables lighting.
    pub fn set_3d_light(&mut self, dx: f32, dy: f32, dz: f32, ambient: f32, diffuse: f32) {
        self.renderer
            .set_light(Light::new(dx, dy, dz, ambient, diffuse));
    }

    /// `faces` are 1-based.
    pub fn create_3d_model(&mut self, vertices: Vec<f32>, faces: &[i64]) -> ModelId {
        self.registry.create_model(vertices, faces)
    }

    /// Register a mesh JSON file written by `MeshData::save`.
    pub fn load_3d_model(&mut self, path: impl AsRef<Path>) -> Result<ModelId, EngineError> {
        let mesh = MeshData::load(path)?;
        Ok(self.create_3d_model_from(&mesh))
    }

    pub fn create_3d_model_from(&mut self, mesh: &MeshData) -> ModelId {
        self.registry
            .create_model(mesh.vertices.clone(), &mesh.faces_i64())
    }

    /// Colors are `#RRGGBB` strings, one per face.
    pub fn create_3d_instance<S: AsRef<str>>(
        &mut self,
        model: ModelId,
        colors: &[S],
    ) -> Result<InstanceId, EngineError> {
        let colors: Vec<Color565> = colors
            .iter()
            .map(|c| Color565::parse_hex(c.as_ref()))
            .collect();
        Ok(self.registry.create_instance(model, &colors)?)
    }

    /// Draw an instance and mark its screen bounds. Unknown handles do
    /// nothing.
    pub fn draw_3d_instance(&mut self, id: InstanceId, placement: &Placement) -> DrawOutcome {
        let outcome = self
            .renderer
            .draw(&self.registry, id, placement, &mut self.backend);
        if let Some(bounds) = outcome.bounds {
            self.mark(bounds);
        }
        outcome
    }

    /// Fill the back buffer. The full screen is marked only if the color
    /// differs from the last clear.
    pub fn clear_canvas(&mut self, color: &str) {
        let color = Color565::parse_hex(color);
        self.backend.fill_screen(color);
        if self.last_clear != Some(color) {
            self.damage
                .mark_region(0, 0, self.screen.width as i32, self.screen.height as i32);
            self.last_clear = Some(color);
            tracing::trace!(color = color.0, "clear color changed, full screen marked");
        }
    }

    pub fn draw_circle(&mut self, x: i32, y: i32, r: i32, color: &str) {
        let color = Color565::parse_hex(color);
        self.backend.fill_circle(x, y, r, color);
        if r >= 0 {
            let (x, y, r) = (x as i64, y as i64, r as i64);
            self.mark_bounds(x - r, y - r, x + r, y + r);
        }
    }

    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: &str) {
        let color = Color565::parse_hex(color);
        self.backend.fill_rect(x, y, w, h, color);
        self.damage.mark_region(x, y, w, h);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: &str,
    ) {
        let color = Color565::parse_hex(color);
        self.backend.fill_triangle(x0, y0, x1, y1, x2, y2, color);
        self.mark(DirtyRect::new(
            x0.min(x1).min(x2),
            y0.min(y1).min(y2),
            x0.max(x1).max(x2),
            y0.max(y1).max(y2),
        ));
    }

    /// Draw one line of text and mark its glyph cells.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: &str) {
        let color = Color565::parse_hex(color);
        self.backend.draw_text(x, y, text, color);
        let (w, h) = text_extent(text);
        if w > 0 {
            let (x, y) = (x as i64, y as i64);
            self.mark_bounds(x, y, x + w - 1, y + h - 1);
        }
    }

    pub fn get_canvas_size(&self) -> (u32, u32) {
        (self.screen.width, self.screen.height)
    }

    /// Frames per second over the last full second.
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Frame pacing: sleep for whatever is left of `ms` since the previous
    /// `delay` returned. Returns the time slept.
    pub fn delay(&mut self, ms: i64) -> Duration {
        let wait = self.pacing_wait(ms, Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        wait
    }

    fn pacing_wait(&mut self, ms: i64, now: Instant) -> Duration {
        let target = Duration::from_millis(ms.max(0) as u64);
        let wait = target.saturating_sub(now.saturating_duration_since(self.last_delay));
        self.last_delay = now + wait;
        tracing::trace!(?wait, "delay");
        wait
    }

    /// End the frame: blit every region the tracker reports, then rotate
    /// tracker state.
    pub fn present(&mut self) -> PresentReport {
        let _span = tracing::info_span!("present", frame = self.presents).entered();
        let start = Instant::now();

        let rects = {
            let view = self.backend.frame_view();
            self.damage.compute_update_regions(view.as_ref())
        };
        let mut pixels = 0u64;
        for r in &rects {
            self.backend.blit_region(r.x1, r.y1, r.width(), r.height());
            pixels += r.area();
        }
        self.damage.end_frame();

        let now = Instant::now();
        self.timer.record(now.duration_since(start));
        self.fps.tick(now);
        self.presents += 1;
        tracing::trace!(rects = rects.len(), pixels, "frame presented");
        if self.profile_interval > 0 && self.presents % self.profile_interval as u64 == 0 {
            tracing::debug!(
                presents = self.presents,
                avg = ?self.timer.average(),
                min = ?self.timer.min(),
                max = ?self.timer.max(),
                fps = self.fps.fps(),
                "present timing"
            );
        }

        PresentReport { rects, pixels }
    }

    fn mark(&mut self, rect: DirtyRect) {
        self.mark_bounds(rect.x1 as i64, rect.y1 as i64, rect.x2 as i64, rect.y2 as i64);
    }

    /// Mark inclusive bounds, clipped to the screen first so extreme
    /// coordinates still damage their visible part.
    fn mark_bounds(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        if let Some(r) = DirtyRect::clipped_bounds(x1, y1, x2, y2, self.screen) {
            self.damage.mark_region(r.x1, r.y1, r.width(), r.height());
        }
    }
}
