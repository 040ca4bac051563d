/// The load pipeline: decode, analyze, then either style the model or place a bed
use std::path::Path;

use nalgebra::{Matrix4, Vector3};
use rand::Rng;
use tracing::info;

use crate::bed::{BedGrid, BedSpec};
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Mesh};
use crate::render_mode::{random_face_colors, Coloring, RenderConfig, RenderMode, Rgba};
use crate::stl;
use crate::transform::Transform;

/// What the arguments after the file name ask for.
///
/// Choosing a render mode and showing a bed are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewOptions {
    Bed(BedSpec),
    Mode(RenderMode),
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::Bed(BedSpec::model_sized())
    }
}

impl ViewOptions {
    /// Disambiguate purely by argument count: one argument is a render
    /// mode token, two or three are bed extents.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBedDimension`] for a bad extent,
    /// [`Error::UnexpectedArguments`] for more than three arguments.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        match args {
            [] => Ok(Self::default()),
            [token] => Ok(Self::Mode(RenderMode::from_token(Some(token.as_ref())))),
            [_, _] | [_, _, _] => BedSpec::from_args(args).map(Self::Bed),
            _ => Err(Error::UnexpectedArguments { count: args.len() }),
        }
    }
}

/// A model ready to hand to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub mesh: Mesh,
    pub bounds: BoundingBox,
    /// Translation placing the bounding box center on the origin.
    pub centering: Vector3<f32>,
    pub mode: RenderMode,
    pub config: RenderConfig,
    /// One color per triangle when the config asks for per-face coloring.
    pub face_colors: Option<Vec<Rgba>>,
    pub bed: Option<BedGrid>,
}

impl Scene {
    /// Analyze a decoded mesh and configure its display.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyMesh`] when the mesh has no triangles.
    pub fn build<R: Rng + ?Sized>(mesh: Mesh, view: &ViewOptions, rng: &mut R) -> Result<Self> {
        let bounds = mesh.bounds()?;
        let dimensions = bounds.dimensions();
        info!(
            x = dimensions.x,
            y = dimensions.y,
            z = dimensions.z,
            "model dimensions"
        );

        let (mode, bed) = match view {
            ViewOptions::Mode(mode) => (*mode, None),
            ViewOptions::Bed(spec) => (RenderMode::Plain, Some(BedGrid::build(&dimensions, spec))),
        };

        let config = mode.config();
        let face_colors = match config.coloring {
            Coloring::PerFace => Some(random_face_colors(mesh.len(), rng)),
            Coloring::Uniform(_) => None,
        };

        Ok(Self {
            centering: bounds.centering_translation(),
            mesh,
            bounds,
            mode,
            config,
            face_colors,
            bed,
        })
    }

    pub fn dimensions(&self) -> Vector3<f32> {
        self.bounds.dimensions()
    }

    /// Matrix moving the mesh into its centered position.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(&self.centering)
    }

    /// Color of one triangle, if the scene colors faces individually.
    pub fn face_color(&self, index: usize) -> Option<Rgba> {
        self.face_colors.as_ref()?.get(index).copied()
    }
}

/// Run the whole pipeline on a file.
///
/// # Errors
///
/// Any decode error, or [`Error::EmptyMesh`] for a file with no triangles.
pub fn load_scene<P: AsRef<Path>, R: Rng + ?Sized>(
    path: P,
    view: &ViewOptions,
    rng: &mut R,
) -> Result<Scene> {
    let mesh = stl::load(path)?;
    Scene::build(mesh, view, rng)
}
