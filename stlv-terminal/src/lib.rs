/// Terminal front end: command line, filename prompt and an ASCII viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Vector3;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlv_core::{Camera, RotationState, Scene, Transform};

pub mod cli;
pub mod renderer;

pub use renderer::AsciiRenderer;

/// Radians per key press.
const ROTATE_STEP: f32 = 0.1;
/// Camera distance factor per zoom key press.
const ZOOM_STEP: f32 = 0.8;

pub const CONTROLS: &str = "Directions:
  Rotate view using arrows or WASD (E/R to roll)
  Zoom using + and -
  Toggle perspective using P
  Quit using Q or Esc";

const KEY_HINTS: &str = "Arrows/WASD=Rotate +/-=Zoom P=Projection Q=Quit";

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    normals: Option<Vec<[Vector3<f32>; 3]>>,
    rotation: RotationState,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(scene, width, height))
    }

    pub fn with_size(scene: Scene, width: u16, height: u16) -> Self {
        let normals = scene.config.smooth.then(|| scene.mesh.smooth_normals());
        let camera = Camera::framing(&scene.bounds, width as u32, height as u32);

        Self {
            scene,
            normals,
            rotation: RotationState::zero(),
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            let mut stdout = stdout();
            self.render_frame(&mut stdout)?;
            stdout.flush()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.rotation.rotate(ROTATE_STEP, 0.0, 0.0);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.rotation.rotate(-ROTATE_STEP, 0.0, 0.0);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.rotation.rotate(0.0, 0.0, -ROTATE_STEP);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.rotation.rotate(0.0, 0.0, ROTATE_STEP);
            }
            KeyCode::Char('e') => {
                self.rotation.rotate(0.0, ROTATE_STEP, 0.0);
            }
            KeyCode::Char('r') => {
                self.rotation.rotate(0.0, -ROTATE_STEP, 0.0);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.camera.zoom(ZOOM_STEP);
            }
            KeyCode::Char('-') => {
                self.camera.zoom(1.0 / ZOOM_STEP);
            }
            KeyCode::Char('p') => {
                self.camera.mode = self.camera.mode.toggled();
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer = AsciiRenderer::new(width as usize, height as usize);
        self.camera.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn render_frame<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let rotation = Transform::rotation_matrix(&self.rotation);

        self.renderer.clear();
        self.renderer
            .render_scene(&self.scene, self.normals.as_deref(), &rotation, &self.camera);

        queue!(out, cursor::MoveTo(0, 0))?;
        self.renderer.draw(out)?;

        // Draw UI overlay
        let dimensions = self.scene.dimensions();
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "stlv | {:?} | {} x {} x {} | FPS: {:.1} | {}",
                self.scene.mode, dimensions.x, dimensions.y, dimensions.z, self.fps, KEY_HINTS
            )),
            ResetColor
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use stlv_core::{Mesh, ProjectionMode, RenderMode, ViewOptions};

    fn app(view: ViewOptions) -> TerminalApp {
        let scene = Scene::build(Mesh::cube(2.0), &view, &mut StdRng::seed_from_u64(0)).unwrap();
        TerminalApp::with_size(scene, 80, 24)
    }

    fn press(app: &mut TerminalApp, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_smooth_normals_only_when_needed() {
        assert!(app(ViewOptions::default()).normals.is_some());
        assert!(app(ViewOptions::Mode(RenderMode::Sharp)).normals.is_none());
    }

    #[test]
    fn test_keys_drive_the_view() {
        let mut app = app(ViewOptions::default());
        let start = app.camera().distance();

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Up);
        assert!(app.rotation().z > 0.0 && app.rotation().x > 0.0);

        press(&mut app, KeyCode::Char('+'));
        assert!(app.camera().distance() < start);

        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.camera().mode, ProjectionMode::Orthographic);

        assert!(app.is_running());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_resize_rebuilds_renderer() {
        let mut app = app(ViewOptions::default());
        app.handle_event(Event::Resize(120, 40));
        assert_eq!(app.renderer.size(), (120, 40));
        assert!((app.camera().aspect - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_frame_includes_overlay() {
        let mut app = app(ViewOptions::Mode(RenderMode::Edge));
        let mut out = Vec::new();
        app.render_frame(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("stlv | Edge | 2 x 2 x 2"));
    }
}
