/// Geometry primitives and bounds analysis for decoded meshes
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// A triangle facet as stored in a binary STL record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Facet normal exactly as stored in the file. Not validated.
    pub normal: Vector3<f32>,
    /// Corner positions `v1`, `v2`, `v3` in file order.
    pub vertices: [Point3<f32>; 3],
    /// The record's trailing attribute word.
    pub attribute: i16,
}

impl Triangle {
    pub fn new(normal: Vector3<f32>, v1: Point3<f32>, v2: Point3<f32>, v3: Point3<f32>) -> Self {
        Self {
            normal,
            vertices: [v1, v2, v3],
            attribute: 0,
        }
    }

    /// Calculate the face normal from the triangle's vertices
    ///
    /// Degenerate triangles yield a zero vector instead of NaNs.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        self.area_normal()
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Cross product of the two edges leaving `v1`; its length is twice the area.
    fn area_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }
}

/// A decoded mesh: triangles in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Every corner of every triangle, in file order.
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f32>> + '_ {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Axis-aligned bounds over all three corners of every triangle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMesh`] when the mesh has no triangles.
    pub fn bounds(&self) -> Result<BoundingBox> {
        let mut vertices = self.vertices();
        let first = *vertices.next().ok_or(Error::EmptyMesh)?;

        let (min, max) = vertices.fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        });

        Ok(BoundingBox { min, max })
    }

    /// Per-corner normals averaged across faces that share a vertex position.
    ///
    /// Faces are weighted by area. A corner whose neighbours cancel out
    /// falls back to its own face normal.
    pub fn smooth_normals(&self) -> Vec<[Vector3<f32>; 3]> {
        let mut sums: HashMap<[u32; 3], Vector3<f32>> = HashMap::with_capacity(self.len() * 3);

        for triangle in &self.triangles {
            let normal = triangle.area_normal();
            for vertex in &triangle.vertices {
                *sums.entry(position_key(vertex)).or_insert_with(Vector3::zeros) += normal;
            }
        }

        self.triangles
            .iter()
            .map(|triangle| {
                let face = triangle.calculate_normal();
                triangle.vertices.map(|vertex| {
                    sums.get(&position_key(&vertex))
                        .and_then(|sum| sum.try_normalize(f32::EPSILON))
                        .unwrap_or(face)
                })
            })
            .collect()
    }

    /// Create a simple cube mesh for testing
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = |x: f32, y: f32, z: f32| Point3::new(x, y, z);
        let faces = [
            // Front / back
            (Vector3::z(), [p(-h, -h, h), p(h, -h, h), p(h, h, h), p(-h, h, h)]),
            (-Vector3::z(), [p(-h, -h, -h), p(-h, h, -h), p(h, h, -h), p(h, -h, -h)]),
            // Top / bottom
            (Vector3::y(), [p(-h, h, -h), p(-h, h, h), p(h, h, h), p(h, h, -h)]),
            (-Vector3::y(), [p(-h, -h, -h), p(h, -h, -h), p(h, -h, h), p(-h, -h, h)]),
            // Right / left
            (Vector3::x(), [p(h, -h, -h), p(h, h, -h), p(h, h, h), p(h, -h, h)]),
            (-Vector3::x(), [p(-h, -h, -h), p(-h, -h, h), p(-h, h, h), p(-h, h, -h)]),
        ];

        let mut mesh = Self::with_capacity(12);
        for (normal, [a, b, c, d]) in faces {
            mesh.add_triangle(Triangle::new(normal, a, b, c));
            mesh.add_triangle(Triangle::new(normal, a, c, d));
        }
        mesh
    }
}

fn position_key(p: &Point3<f32>) -> [u32; 3] {
    // Fold -0.0 onto 0.0 so both hash alike.
    [p.x + 0.0, p.y + 0.0, p.z + 0.0].map(f32::to_bits)
}

/// Axis-aligned bounding box of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Extent along each axis, `max - min`.
    pub fn dimensions(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Translation that centers the box on the origin.
    pub fn centering_translation(&self) -> Vector3<f32> {
        -(self.dimensions() / 2.0 + self.min.coords)
    }

    /// Length of the box diagonal, used as the initial camera distance.
    pub fn diagonal(&self) -> f32 {
        self.dimensions().norm()
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}
