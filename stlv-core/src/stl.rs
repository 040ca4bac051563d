/// Binary STL decoder
///
/// ```text
/// UINT8[80]    header, ignored
/// UINT32       triangle count N
/// N records of 50 bytes:
///     REAL32[3]  normal
///     REAL32[3]  v1
///     REAL32[3]  v2
///     REAL32[3]  v3
///     INT16      attribute
/// ```
///
/// Everything is little-endian with no padding between records.
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f32, le_i16, le_u32},
    sequence::tuple,
    IResult,
};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::{Mesh, Triangle};

/// Size of the ignored header.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record.
pub const RECORD_SIZE: usize = 50;

/// Header plus the triangle count.
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Load and decode a binary STL file.
///
/// The file is read in full and closed before decoding starts.
///
/// # Errors
///
/// [`Error::FileNotFound`] or [`Error::Io`] when the file cannot be read,
/// plus everything [`decode`] returns.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    debug!(path = %path.display(), "reading STL file");
    decode_reader(file)
}

/// Read a source to the end and decode it.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<Mesh> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data)
}

/// Decode a binary STL image held in memory.
///
/// Only the structure is checked: normals are not compared with the
/// winding and degenerate facets are kept as they are.
///
/// # Errors
///
/// [`Error::TruncatedFile`] when the data ends before the triangle count
/// or before the last declared record.
pub fn decode(data: &[u8]) -> Result<Mesh> {
    let (body, triangle_count) = preamble(data).map_err(|_| Error::TruncatedFile {
        expected: PREAMBLE_SIZE as u64,
        actual: data.len() as u64,
    })?;

    let expected = PREAMBLE_SIZE as u64 + u64::from(triangle_count) * RECORD_SIZE as u64;
    if (data.len() as u64) < expected {
        return Err(Error::TruncatedFile {
            expected,
            actual: data.len() as u64,
        });
    }

    let (rest, triangles) =
        count(record, triangle_count as usize)(body).map_err(|_| Error::TruncatedFile {
            expected,
            actual: data.len() as u64,
        })?;

    if !rest.is_empty() {
        debug!(trailing = rest.len(), "ignoring bytes after the last record");
    }

    info!("Num. Faces: {}", triangles.len());
    Ok(Mesh { triangles })
}

fn preamble(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, _header) = take(HEADER_SIZE)(input)?;
    le_u32(input)
}

fn record(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (normal, v1, v2, v3, attribute)) =
        tuple((vector, point, point, point, le_i16))(input)?;
    Ok((
        input,
        Triangle {
            normal,
            vertices: [v1, v2, v3],
            attribute,
        },
    ))
}

fn vector(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn point(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    let (input, v) = vector(input)?;
    Ok((input, Point3::from(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_vec(out: &mut Vec<u8>, v: [f32; 3]) {
        for c in v {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }

    type Record = ([f32; 3], [[f32; 3]; 3], i16);

    fn encode(header: &[u8; HEADER_SIZE], declared: u32, records: &[Record]) -> Vec<u8> {
        let mut data = header.to_vec();
        data.extend_from_slice(&declared.to_le_bytes());
        for (normal, vertices, attribute) in records {
            push_vec(&mut data, *normal);
            for v in vertices {
                push_vec(&mut data, *v);
            }
            data.extend_from_slice(&attribute.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let data = encode(&[0u8; HEADER_SIZE], 0, &[]);
        let mesh = decode(&data).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_header_content_is_ignored() {
        // An ASCII-looking header is still decoded as binary.
        let mut header = [b' '; HEADER_SIZE];
        header[..5].copy_from_slice(b"solid");
        let records = [([0.0, 0.0, 1.0], [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], 0)];

        let mesh = decode(&encode(&header, 1, &records)).unwrap();
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_record_field_order() {
        let records = [(
            [0.5, -0.5, 1.5],
            [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
            -2,
        )];
        let data = encode(&[7u8; HEADER_SIZE], 1, &records);
        assert_eq!(data.len(), PREAMBLE_SIZE + RECORD_SIZE);

        let t = decode(&data).unwrap().triangles[0];
        assert_eq!(t.normal, Vector3::new(0.5, -0.5, 1.5));
        assert_eq!(t.vertices[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(t.vertices[1], Point3::new(4.0, 5.0, 6.0));
        assert_eq!(t.vertices[2], Point3::new(7.0, 8.0, 9.0));
        assert_eq!(t.attribute, -2);
    }

    #[test]
    fn test_normals_are_not_validated() {
        let records = [([9.0, 9.0, 9.0], [[0.0; 3]; 3], 0)];
        let t = decode(&encode(&[0; HEADER_SIZE], 1, &records)).unwrap().triangles[0];
        assert_eq!(t.normal, Vector3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn test_truncated_records() {
        let record = ([0.0; 3], [[1.0; 3]; 3], 0);
        let data = encode(&[0; HEADER_SIZE], 10, &[record; 3]);

        match decode(&data) {
            Err(Error::TruncatedFile { expected, actual }) => {
                assert_eq!(expected, 84 + 10 * 50);
                assert_eq!(actual, 84 + 3 * 50);
            }
            other => panic!("expected TruncatedFile, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_last_record() {
        let record = ([0.0; 3], [[1.0; 3]; 3], 0);
        let mut data = encode(&[0; HEADER_SIZE], 2, &[record; 2]);
        data.pop();
        assert!(matches!(decode(&data), Err(Error::TruncatedFile { .. })));
    }

    #[test]
    fn test_missing_triangle_count() {
        assert!(matches!(
            decode(&[0u8; 82]),
            Err(Error::TruncatedFile { expected: 84, actual: 82 })
        ));
    }

    #[test]
    fn test_huge_count_fails_before_allocating() {
        let data = encode(&[0; HEADER_SIZE], u32::MAX, &[]);
        assert!(matches!(decode(&data), Err(Error::TruncatedFile { .. })));
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let record = ([0.0; 3], [[1.0; 3]; 3], 0);
        let mut data = encode(&[0; HEADER_SIZE], 1, &[record; 2]);
        data.extend_from_slice(b"junk");
        assert_eq!(decode(&data).unwrap().len(), 1);
    }
}
