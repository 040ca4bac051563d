/// 3D transformation matrices, axis-angle rotations and view rotation state
use nalgebra::{Matrix4, Quaternion, Translation3, Unit, UnitQuaternion, Vector3};

/// A rotation given as a unit axis and an angle in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: Unit<Vector3<f32>>,
    pub angle: f32,
}

impl AxisAngle {
    pub fn new(axis: Vector3<f32>, angle: f32) -> Self {
        Self {
            axis: Unit::new_normalize(axis),
            angle,
        }
    }

    /// Axis and angle of an arbitrary (not necessarily unit) quaternion.
    ///
    /// Returns `None` for the identity rotation and for a zero quaternion,
    /// neither of which has a defined axis.
    pub fn from_quaternion(q: Quaternion<f32>) -> Option<Self> {
        let unit = UnitQuaternion::try_new(q, f32::EPSILON)?;
        let (axis, angle) = unit.axis_angle()?;
        Some(Self { axis, angle })
    }

    pub fn to_rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&self.axis, self.angle)
    }
}

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Rotate first, then translate.
    pub fn placement_matrix(
        translation: &Vector3<f32>,
        rotation: Option<&AxisAngle>,
    ) -> Matrix4<f32> {
        let rotation = rotation.map_or_else(UnitQuaternion::identity, AxisAngle::to_rotation);
        (Translation3::from(*translation) * rotation).to_homogeneous()
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}
