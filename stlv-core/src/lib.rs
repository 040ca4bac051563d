/// stlv core library: binary STL decoding and scene preparation
///
/// Decodes binary STL files, measures the model, and works out how it should
/// be displayed: render style, bed grid planes and the camera framing it.

pub mod bed;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod render_mode;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use bed::{BedGrid, BedSpec, GridLabel, GridPlane, PlaneKind};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Mesh, Triangle};
pub use projection::{Camera, ProjectionMode};
pub use render_mode::{Blend, Coloring, RenderConfig, RenderMode, Rgba, Shader};
pub use scene::{load_scene, Scene, ViewOptions};
pub use transform::{AxisAngle, RotationState, Transform};
