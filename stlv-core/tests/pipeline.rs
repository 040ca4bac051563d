//! End-to-end checks: STL bytes on disk through to a prepared scene.

use std::io::Write;

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stlv_core::{
    load_scene, stl, BedSpec, Error, Mesh, PlaneKind, RenderMode, Triangle, ViewOptions,
};
use tempfile::NamedTempFile;

fn encode(header: &[u8; 80], mesh: &Mesh) -> Vec<u8> {
    let mut data = header.to_vec();
    data.extend_from_slice(&(mesh.len() as u32).to_le_bytes());
    for t in &mesh.triangles {
        let corners = t.vertices.iter().map(|p| p.coords);
        for v in std::iter::once(t.normal).chain(corners) {
            for c in v.iter() {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&t.attribute.to_le_bytes());
    }
    data
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

fn odd_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.add_triangle(Triangle {
        attribute: i16::MIN,
        ..Triangle::new(
            Vector3::new(-0.0, f32::MIN_POSITIVE / 4.0, 1.0),
            Point3::new(1.5, -2.25, 3.125),
            Point3::new(f32::MAX, 0.1, -0.0),
            Point3::new(-1e-30, 7.0, 8.0),
        )
    });
    mesh.add_triangle(Triangle {
        attribute: 0x1234,
        ..Triangle::new(
            Vector3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        )
    });
    mesh
}

fn bits(t: &Triangle) -> Vec<u32> {
    let corners = t.vertices.iter().flat_map(|p| p.coords.iter().copied().collect::<Vec<_>>());
    t.normal.iter().copied().chain(corners).map(f32::to_bits).collect()
}

#[test]
fn round_trip_is_bit_identical() {
    let mesh = odd_mesh();
    let header = [0xABu8; 80];
    let decoded = stl::decode(&encode(&header, &mesh)).unwrap();

    assert_eq!(decoded.len(), mesh.len());
    for (original, decoded) in mesh.triangles.iter().zip(&decoded.triangles) {
        assert_eq!(bits(original), bits(decoded));
        assert_eq!(original.attribute, decoded.attribute);
    }
}

#[test]
fn load_from_disk() {
    let file = write_temp(&encode(&[0; 80], &Mesh::cube(10.0)));
    let mesh = stl::load(file.path()).unwrap();
    assert_eq!(mesh, Mesh::cube(10.0));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.stl");
    match stl::load(&path) {
        Err(Error::FileNotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(stl::load(dir.path()), Err(Error::Io(_))));
}

#[test]
fn truncated_file_on_disk() {
    let mut data = encode(&[0; 80], &Mesh::cube(1.0));
    data[80..84].copy_from_slice(&13u32.to_le_bytes());
    let file = write_temp(&data);

    let result = load_scene(file.path(), &ViewOptions::default(), &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(Error::TruncatedFile { .. })));
}

#[test]
fn zero_triangles_is_an_empty_mesh() {
    let file = write_temp(&encode(&[0; 80], &Mesh::new()));
    assert!(stl::load(file.path()).unwrap().is_empty());

    let result = load_scene(file.path(), &ViewOptions::default(), &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(Error::EmptyMesh)));
}

#[test]
fn dimensions_are_never_negative() {
    let mut rng = StdRng::seed_from_u64(99);
    let meshes = [Mesh::cube(3.0), odd_mesh()];
    for mesh in meshes {
        let decoded = stl::decode(&encode(&[0; 80], &mesh)).unwrap();
        let bounds = decoded.bounds().unwrap();
        let dimensions = bounds.dimensions();
        for axis in 0..3 {
            assert_eq!(dimensions[axis], bounds.max[axis] - bounds.min[axis]);
            assert!(dimensions[axis] >= 0.0);
        }

        let scene = stlv_core::Scene::build(decoded, &ViewOptions::default(), &mut rng).unwrap();
        assert!(scene.dimensions().iter().all(|d| *d >= 0.0));
    }
}

#[test]
fn full_pipeline_with_volume_bed() {
    // A 10 x 20 x 30 box sitting away from the origin.
    let mut mesh = Mesh::new();
    mesh.add_triangle(Triangle::new(
        Vector3::z(),
        Point3::new(5.0, 5.0, 5.0),
        Point3::new(15.0, 25.0, 5.0),
        Point3::new(5.0, 5.0, 35.0),
    ));
    let file = write_temp(&encode(&[0; 80], &mesh));

    let view = ViewOptions::from_args(&["50", "100", "150"]).unwrap();
    let scene = load_scene(file.path(), &view, &mut StdRng::seed_from_u64(0)).unwrap();

    assert_eq!(scene.dimensions(), Vector3::new(10.0, 20.0, 30.0));
    assert_eq!(scene.centering, Vector3::new(-10.0, -15.0, -20.0));
    assert_eq!(scene.mode, RenderMode::Plain);

    let bed = scene.bed.as_ref().unwrap();
    assert_eq!(bed.extents, Vector3::new(50.0, 100.0, 150.0));
    assert_eq!(bed.plane(PlaneKind::Xy).unwrap().translation, Vector3::new(0.0, 0.0, -15.0));
    assert_eq!(bed.plane(PlaneKind::Xz).unwrap().translation, Vector3::new(0.0, -50.0, 60.0));
    assert_eq!(bed.plane(PlaneKind::Yz).unwrap().translation, Vector3::new(-25.0, 0.0, 60.0));
}

#[test]
fn render_mode_suppresses_bed() {
    let file = write_temp(&encode(&[0; 80], &Mesh::cube(2.0)));
    let view = ViewOptions::from_args(&["-1"]).unwrap();
    let scene = load_scene(file.path(), &view, &mut StdRng::seed_from_u64(5)).unwrap();

    assert_eq!(scene.mode, RenderMode::RandomColors);
    assert!(scene.bed.is_none());
    let colors = scene.face_colors.as_ref().unwrap();
    assert_eq!(colors.len(), scene.mesh.len());
    assert!(colors
        .iter()
        .all(|c| c.components().iter().all(|v| (0.0..1.0).contains(v))));
}

#[test]
fn footprint_bed_keeps_model_height() {
    let file = write_temp(&encode(&[0; 80], &Mesh::cube(8.0)));
    let view = ViewOptions::Bed(BedSpec::footprint(200.0, 180.0));
    let scene = load_scene(file.path(), &view, &mut StdRng::seed_from_u64(0)).unwrap();

    let bed = scene.bed.as_ref().unwrap();
    assert_eq!(bed.planes.len(), 1);
    assert_eq!(bed.extents, Vector3::new(200.0, 180.0, 8.0));
}
