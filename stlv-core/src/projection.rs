/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::geometry::BoundingBox;
use crate::transform::Transform;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Orthographic => Self::Perspective,
            Self::Perspective => Self::Orthographic,
        }
    }
}

/// Default viewing angles, looking down on the model from a corner.
const DEFAULT_ELEVATION_DEG: f32 = 30.0;
const DEFAULT_AZIMUTH_DEG: f32 = 45.0;

/// Camera configuration for 3D rendering
///
/// World space is z-up, like the STL files it looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::orbit(5.0, DEFAULT_ELEVATION_DEG, DEFAULT_AZIMUTH_DEG, width, height)
    }

    /// Camera on a sphere around the origin, angles in degrees.
    pub fn orbit(distance: f32, elevation: f32, azimuth: f32, width: u32, height: u32) -> Self {
        let (elevation, azimuth) = (elevation.to_radians(), azimuth.to_radians());
        let direction = Vector3::new(
            elevation.cos() * azimuth.cos(),
            elevation.cos() * azimuth.sin(),
            elevation.sin(),
        );

        let mut camera = Self {
            position: Point3::from(direction * distance),
            target: Point3::origin(),
            up: Vector3::z(),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        };
        camera.fit_clip_planes();
        camera
    }

    /// Camera framing a centered model: it stands one box diagonal away.
    pub fn framing(bounds: &BoundingBox, width: u32, height: u32) -> Self {
        let diagonal = bounds.diagonal();
        let distance = if diagonal > 0.0 { diagonal } else { 1.0 };
        Self::orbit(distance, DEFAULT_ELEVATION_DEG, DEFAULT_AZIMUTH_DEG, width, height)
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Move toward (`factor < 1`) or away from the target.
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        self.position = self.target + offset * factor;
        self.fit_clip_planes();
    }

    fn fit_clip_planes(&mut self) {
        let distance = self.distance();
        self.near = distance * 0.01;
        self.far = distance * 100.0;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = self.distance();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    fn mvp(&self, model_matrix: &Matrix4<f32>) -> Matrix4<f32> {
        Transform::mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix())
    }

    /// Project a 3D point to screen space as `(x, y, depth)`.
    ///
    /// Points behind the camera or outside the depth range yield `None`.
    /// Points beside the viewport are returned as-is; callers clip in 2D.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = self.mvp(model_matrix) * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        Some(to_screen(&ndc, width, height))
    }

    /// Project a line segment, trimming it to the near and far planes.
    ///
    /// Only a segment lying entirely in front of the near plane or beyond
    /// the far plane yields `None`.
    pub fn project_segment(
        &self,
        from: &Point3<f32>,
        to: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<((f32, f32, f32), (f32, f32, f32))> {
        let mvp = self.mvp(model_matrix);
        let mut a = mvp * from.to_homogeneous();
        let mut b = mvp * to.to_homogeneous();

        // Signed distances to the near (w + z) and far (w - z) planes.
        let planes: [fn(&Vector4<f32>) -> f32; 2] =
            [|c: &Vector4<f32>| c.w + c.z, |c: &Vector4<f32>| c.w - c.z];
        for distance in planes {
            let (da, db) = (distance(&a), distance(&b));
            if da < 0.0 && db < 0.0 {
                return None;
            }
            if da < 0.0 {
                a += (b - a) * (da / (da - db));
            } else if db < 0.0 {
                b += (a - b) * (db / (db - da));
            }
        }

        if a.w < 1e-6 || b.w < 1e-6 {
            return None;
        }
        let ndc_a = a.xyz() / a.w;
        let ndc_b = b.xyz() / b.w;
        Some((to_screen(&ndc_a, width, height), to_screen(&ndc_b, width, height)))
    }
}

/// Convert normalized device coordinates to screen space.
fn to_screen(ndc: &Vector3<f32>, width: u32, height: u32) -> (f32, f32, f32) {
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
    (screen_x, screen_y, ndc.z)
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
