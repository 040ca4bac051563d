/// Render-mode selection and the rendering parameters behind each mode
use rand::Rng;
use tracing::debug;

/// An RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// A color with every component drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random(), rng.random(), rng.random(), rng.random())
    }

    pub fn components(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Named shader programs understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    Default,
    Balloon,
    Shaded,
    NormalColor,
}

/// How overlapping fragments combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Opaque,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    /// One color for the whole mesh.
    Uniform(Rgba),
    /// One color per triangle, indexed in file order.
    PerFace,
}

/// Concrete parameters handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub smooth: bool,
    pub draw_edges: bool,
    pub draw_faces: bool,
    pub compute_normals: bool,
    pub coloring: Coloring,
    pub shader: Shader,
    pub blend: Blend,
}

/// The closed set of display styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Plain,
    Sharp,
    Wire,
    Balloon,
    Shaded,
    Edge,
    RandomColors,
}

impl RenderMode {
    /// Resolve a command-line token. Never fails: anything unknown is `Plain`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None | Some("1" | "plain") => Self::Plain,
            Some("2" | "sharp") => Self::Sharp,
            Some("3" | "wire") => Self::Wire,
            Some("4" | "balloon" | "xray") => Self::Balloon,
            Some("5" | "shaded" | "xrays") => Self::Shaded,
            Some("6" | "edge") => Self::Edge,
            Some("-1") => Self::RandomColors,
            Some(other) => {
                debug!(token = other, "unrecognized render mode, using plain");
                Self::Plain
            }
        }
    }

    pub fn config(self) -> RenderConfig {
        let white = Coloring::Uniform(Rgba::WHITE);
        let base = RenderConfig {
            smooth: true,
            draw_edges: false,
            draw_faces: true,
            compute_normals: true,
            coloring: white,
            shader: Shader::Default,
            blend: Blend::Opaque,
        };

        match self {
            Self::Plain => RenderConfig {
                draw_edges: true,
                ..base
            },
            Self::Sharp => RenderConfig {
                smooth: false,
                ..base
            },
            Self::Wire => RenderConfig {
                smooth: false,
                draw_edges: true,
                draw_faces: false,
                ..base
            },
            Self::Balloon => RenderConfig {
                coloring: Coloring::Uniform(Rgba::new(0.0, 1.0, 0.0, 0.2)),
                shader: Shader::Balloon,
                blend: Blend::Additive,
                ..base
            },
            Self::Shaded => RenderConfig {
                coloring: Coloring::Uniform(Rgba::new(1.0, 1.0, 1.0, 0.2)),
                shader: Shader::Shaded,
                blend: Blend::Additive,
                ..base
            },
            Self::Edge => RenderConfig {
                coloring: Coloring::Uniform(Rgba::new(1.0, 0.0, 0.0, 1.0)),
                shader: Shader::NormalColor,
                ..base
            },
            Self::RandomColors => RenderConfig {
                smooth: false,
                compute_normals: false,
                coloring: Coloring::PerFace,
                ..base
            },
        }
    }
}

/// One independent random color per triangle.
pub fn random_face_colors<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Rgba> {
    (0..count).map(|_| Rgba::random(rng)).collect()
}
