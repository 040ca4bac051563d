/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;
use stlv_core::{Blend, Camera, Coloring, GridLabel, GridPlane, Rgba, Scene, Shader};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const EDGE_CHAR: char = '#';
const EDGE_COLOR: Color = Color::Grey;
const GRID_CHAR: char = '.';
const GRID_COLOR: Color = Color::DarkGrey;
const LABEL_COLOR: Color = Color::Yellow;

/// Grid lines per plane axis.
const GRID_DIVISIONS: usize = 10;

/// Light every lit face receives regardless of orientation.
const AMBIENT: f32 = 0.15;

/// Edges win depth ties against the faces they border.
const EDGE_DEPTH_BIAS: f32 = 1e-4;

/// `(x, y, depth)` in screen space
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts a prepared scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    /// Additive light per cell, already weighted by alpha.
    glow_buffer: Vec<[f32; 3]>,
    labels: Vec<(u16, u16, String)>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            glow_buffer: vec![[0.0; 3]; size],
            labels: Vec::new(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
        self.glow_buffer.fill([0.0; 3]);
        self.labels.clear();
    }

    /// Render bed grids, labels and the model, with `rotation` applied to all of them.
    ///
    /// `normals` are the mesh's smoothed corner normals; without them every
    /// face is shaded flat.
    pub fn render_scene(
        &mut self,
        scene: &Scene,
        normals: Option<&[[Vector3<f32>; 3]]>,
        rotation: &Matrix4<f32>,
        camera: &Camera,
    ) {
        if let Some(bed) = &scene.bed {
            for plane in &bed.planes {
                self.render_grid(plane, rotation, camera);
            }
            for label in &bed.labels {
                self.place_label(label, rotation, camera);
            }
        }

        self.render_mesh(scene, normals, rotation, camera);
        self.resolve_glow();
    }

    fn render_mesh(
        &mut self,
        scene: &Scene,
        normals: Option<&[[Vector3<f32>; 3]]>,
        rotation: &Matrix4<f32>,
        camera: &Camera,
    ) {
        let config = &scene.config;
        let model = rotation * scene.model_matrix();
        let light = (camera.position - camera.target).normalize();

        for (index, triangle) in scene.mesh.triangles.iter().enumerate() {
            let Some(screen) = self.project_triangle(&triangle.vertices, &model, camera) else {
                continue; // Triangle is clipped
            };

            if config.draw_faces {
                let face_normal = rotation.transform_vector(&triangle.calculate_normal());
                let corner_normals = match normals {
                    Some(normals) if config.smooth => {
                        normals[index].map(|n| rotation.transform_vector(&n))
                    }
                    _ => [face_normal; 3],
                };
                let shade = corner_normals
                    .map(|n| brightness(config.shader, config.compute_normals, &n, &light));
                let color = face_color(scene, index, &face_normal);

                match config.blend {
                    Blend::Opaque => self.fill_triangle(&screen, shade, terminal_color(color)),
                    Blend::Additive => self.glow_triangle(&screen, shade, color),
                }
            }

            if config.draw_edges {
                for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                    self.draw_line(screen[a], screen[b], EDGE_CHAR, EDGE_COLOR, EDGE_DEPTH_BIAS);
                }
            }
        }
    }

    fn project_triangle(
        &self,
        vertices: &[Point3<f32>; 3],
        model: &Matrix4<f32>,
        camera: &Camera,
    ) -> Option<[ScreenPoint; 3]> {
        let project = |v: &Point3<f32>| {
            camera.project_to_screen(v, model, self.width as u32, self.height as u32)
        };
        Some([
            project(&vertices[0])?,
            project(&vertices[1])?,
            project(&vertices[2])?,
        ])
    }

    fn render_grid(&mut self, plane: &GridPlane, rotation: &Matrix4<f32>, camera: &Camera) {
        let matrix = rotation * plane.placement();
        let (w, h) = (self.width as u32, self.height as u32);
        for (from, to) in grid_lines(plane) {
            if let Some((a, b)) = camera.project_segment(&from, &to, &matrix, w, h) {
                self.draw_line(a, b, GRID_CHAR, GRID_COLOR, 0.0);
            }
        }
    }

    fn place_label(&mut self, label: &GridLabel, rotation: &Matrix4<f32>, camera: &Camera) {
        let (w, h) = (self.width as u32, self.height as u32);
        if let Some((x, y, _)) = camera.project_to_screen(&label.position, rotation, w, h) {
            if x >= 0.0 && y >= 0.0 && (x as usize) < self.width && (y as usize) < self.height {
                self.labels.push((x as u16, y as u16, label.text.clone()));
            }
        }
    }

    fn fill_triangle(&mut self, coords: &[ScreenPoint; 3], shade: [f32; 3], color: Color) {
        let depth_buffer = &mut self.depth_buffer;
        let char_buffer = &mut self.char_buffer;
        let color_buffer = &mut self.color_buffer;

        rasterize(self.width, self.height, coords, |idx, [w0, w1, w2]| {
            // Interpolate depth
            let depth = w0 * coords[0].2 + w1 * coords[1].2 + w2 * coords[2].2;
            if depth < depth_buffer[idx] {
                let light = w0 * shade[0] + w1 * shade[1] + w2 * shade[2];
                depth_buffer[idx] = depth;
                char_buffer[idx] = luminosity_char(light);
                color_buffer[idx] = color;
            }
        });
    }

    fn glow_triangle(&mut self, coords: &[ScreenPoint; 3], shade: [f32; 3], color: Rgba) {
        let glow_buffer = &mut self.glow_buffer;

        rasterize(self.width, self.height, coords, |idx, [w0, w1, w2]| {
            let light = (w0 * shade[0] + w1 * shade[1] + w2 * shade[2]) * color.a;
            let cell = &mut glow_buffer[idx];
            cell[0] += color.r * light;
            cell[1] += color.g * light;
            cell[2] += color.b * light;
        });
    }

    /// Fold accumulated additive light into the character cells.
    fn resolve_glow(&mut self) {
        for (idx, [r, g, b]) in self.glow_buffer.iter().copied().enumerate() {
            let peak = r.max(g).max(b);
            if peak <= 0.0 {
                continue;
            }
            let character = luminosity_char(peak.min(1.0));
            if character != ' ' {
                self.char_buffer[idx] = character;
                let hue = Rgba::new(r / peak, g / peak, b / peak, 1.0);
                self.color_buffer[idx] = terminal_color(hue);
            }
        }
    }

    fn draw_line(
        &mut self,
        a: ScreenPoint,
        b: ScreenPoint,
        character: char,
        color: Color,
        bias: f32,
    ) {
        let span = (b.0 - a.0).abs().max((b.1 - a.1).abs());
        // Endpoints far outside the viewport must not stall the frame.
        let limit = 8 * (self.width + self.height);
        let steps = (span.ceil() as usize).clamp(1, limit.max(1));

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }

            let depth = a.2 + (b.2 - a.2) * t;
            let idx = y * self.width + x;
            if depth - bias <= self.depth_buffer[idx] {
                self.depth_buffer[idx] = self.depth_buffer[idx].min(depth);
                self.char_buffer[idx] = character;
                self.color_buffer[idx] = color;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }

        writer.queue(SetForegroundColor(LABEL_COLOR))?;
        for (x, y, text) in &self.labels {
            writer.queue(MoveTo(*x, *y))?;
            writer.queue(Print(text))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    #[cfg(test)]
    fn rows(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width)
            .map(|row| row.iter().collect())
            .collect()
    }
}

/// Endpoints of a plane's grid lines in its local xy coordinates.
fn grid_lines(plane: &GridPlane) -> impl Iterator<Item = (Point3<f32>, Point3<f32>)> {
    let (size_x, size_y) = (plane.size.x, plane.size.y);
    let (half_x, half_y) = (size_x / 2.0, size_y / 2.0);

    (0..=GRID_DIVISIONS).flat_map(move |i| {
        let t = i as f32 / GRID_DIVISIONS as f32;
        let x = -half_x + size_x * t;
        let y = -half_y + size_y * t;
        [
            (Point3::new(x, -half_y, 0.0), Point3::new(x, half_y, 0.0)),
            (Point3::new(-half_x, y, 0.0), Point3::new(half_x, y, 0.0)),
        ]
    })
}

/// Scanline rasterization: calls `fragment` with the cell index and
/// barycentric weights of every covered cell.
fn rasterize<F>(width: usize, height: usize, coords: &[ScreenPoint; 3], mut fragment: F)
where
    F: FnMut(usize, [f32; 3]),
{
    if width == 0 || height == 0 {
        return;
    }
    let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

    // Bounding box
    let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
    let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
    let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
    let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

    // Clip to screen bounds
    let min_x = min_x.max(0);
    let max_x = max_x.min(width as i32 - 1);
    let min_y = min_y.max(0);
    let max_y = max_y.min(height as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            if let Some((w0, w1, w2)) =
                barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
            {
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    fragment(y as usize * width + x as usize, [w0, w1, w2]);
                }
            }
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Light reaching a surface with the given normal.
fn brightness(shader: Shader, lit: bool, normal: &Vector3<f32>, light: &Vector3<f32>) -> f32 {
    if !lit {
        return 1.0;
    }
    let facing = normal.dot(light);
    match shader {
        // Silhouettes glow, faces turned to the viewer fade out.
        Shader::Balloon => 1.0 - facing.abs(),
        Shader::Shaded => facing.max(0.0),
        Shader::Default | Shader::NormalColor => AMBIENT + (1.0 - AMBIENT) * facing.max(0.0),
    }
}

fn face_color(scene: &Scene, index: usize, normal: &Vector3<f32>) -> Rgba {
    if scene.config.shader == Shader::NormalColor {
        return Rgba::new(
            normal.x * 0.5 + 0.5,
            normal.y * 0.5 + 0.5,
            normal.z * 0.5 + 0.5,
            1.0,
        );
    }
    match scene.config.coloring {
        Coloring::Uniform(color) => color,
        Coloring::PerFace => scene.face_color(index).unwrap_or(Rgba::WHITE),
    }
}

fn luminosity_char(brightness: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (brightness.clamp(0.0, 1.0) * last as f32) as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

fn terminal_color(color: Rgba) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}
