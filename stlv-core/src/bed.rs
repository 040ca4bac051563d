/// Bed grid planes and their placement around a centered model
///
/// Every plane is a grid in its own local xy plane, centered on the local
/// origin. Its world placement rotates first and then translates. The model
/// itself is assumed to be centered on the origin already, so its lowest
/// point sits at `-z_dimension / 2`.
use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Point3, Quaternion, Vector3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transform::{AxisAngle, Transform};

/// User-supplied bed extents; missing axes fall back to the model's size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BedSpec {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl BedSpec {
    /// A bed exactly the size of the model.
    pub fn model_sized() -> Self {
        Self::default()
    }

    pub fn footprint(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    pub fn volume(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Parse up to three positional extents, in x, y, z order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBedDimension`] for a value that is not a finite number,
    /// [`Error::UnexpectedArguments`] for more than three values.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() > 3 {
            return Err(Error::UnexpectedArguments { count: args.len() });
        }

        let mut values = args.iter().map(|arg| parse_dimension(arg.as_ref()));
        Ok(Self {
            x: values.next().transpose()?,
            y: values.next().transpose()?,
            z: values.next().transpose()?,
        })
    }

    /// Concrete bed extents for a model of the given dimensions.
    pub fn resolve(&self, dimensions: &Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.x.unwrap_or(dimensions.x),
            self.y.unwrap_or(dimensions.y),
            self.z.unwrap_or(dimensions.z),
        )
    }

    /// Vertical planes are only shown when the bed height was given.
    pub fn has_height(&self) -> bool {
        self.z.is_some()
    }
}

fn parse_dimension(value: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidBedDimension {
            value: value.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneKind {
    /// The floor, under the model.
    Xy,
    /// The back wall, facing the y axis.
    Xz,
    /// The side wall, facing the x axis.
    Yz,
}

/// One reference grid and its world placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlane {
    pub kind: PlaneKind,
    /// Local extents: two grid extents and a unit thickness.
    pub size: Vector3<f32>,
    pub translation: Vector3<f32>,
    pub rotation: Option<AxisAngle>,
}

impl GridPlane {
    pub fn placement(&self) -> Matrix4<f32> {
        Transform::placement_matrix(&self.translation, self.rotation.as_ref())
    }

    /// World-space normal of the grid surface.
    pub fn normal(&self) -> Vector3<f32> {
        match &self.rotation {
            Some(rotation) => rotation.to_rotation() * Vector3::z(),
            None => Vector3::z(),
        }
    }
}

/// A text annotation showing one bed extent
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub position: Point3<f32>,
    pub text: String,
}

impl GridLabel {
    fn new(position: Point3<f32>, value: f32) -> Self {
        Self {
            position,
            text: format!("{value}"),
        }
    }
}

/// Everything drawn to represent the bed
#[derive(Debug, Clone, PartialEq)]
pub struct BedGrid {
    /// Resolved bed extents.
    pub extents: Vector3<f32>,
    pub planes: Vec<GridPlane>,
    pub labels: Vec<GridLabel>,
}

impl BedGrid {
    /// Build the planes for a model of the given dimensions.
    pub fn build(dimensions: &Vector3<f32>, spec: &BedSpec) -> Self {
        let bed = spec.resolve(dimensions);
        let floor = -dimensions.z / 2.0;
        let wall_center = (bed.z - dimensions.z) / 2.0;

        let mut planes = vec![GridPlane {
            kind: PlaneKind::Xy,
            size: Vector3::new(bed.x, bed.y, 1.0),
            translation: Vector3::new(0.0, 0.0, floor),
            rotation: None,
        }];
        let mut labels = vec![
            GridLabel::new(Point3::new(bed.x / 2.0, 0.0, floor), bed.y),
            GridLabel::new(Point3::new(0.0, bed.y / 2.0, floor), bed.x),
        ];

        if spec.has_height() {
            planes.push(GridPlane {
                kind: PlaneKind::Xz,
                size: Vector3::new(bed.x, bed.z, 1.0),
                translation: Vector3::new(0.0, -bed.y / 2.0, wall_center),
                rotation: AxisAngle::from_quaternion(Quaternion::new(
                    0.0, 0.0, FRAC_PI_2, FRAC_PI_2,
                )),
            });
            planes.push(GridPlane {
                kind: PlaneKind::Yz,
                size: Vector3::new(bed.z, bed.y, 1.0),
                translation: Vector3::new(-bed.x / 2.0, 0.0, wall_center),
                rotation: AxisAngle::from_quaternion(Quaternion::new(
                    0.0, FRAC_PI_2, 0.0, FRAC_PI_2,
                )),
            });
            labels.push(GridLabel::new(Point3::new(-bed.x / 2.0, 0.0, bed.z / 2.0), bed.z));
        }

        debug!(
            x = bed.x,
            y = bed.y,
            z = bed.z,
            planes = planes.len(),
            "built bed grid"
        );

        Self {
            extents: bed,
            planes,
            labels,
        }
    }

    pub fn plane(&self, kind: PlaneKind) -> Option<&GridPlane> {
        self.planes.iter().find(|p| p.kind == kind)
    }
}
